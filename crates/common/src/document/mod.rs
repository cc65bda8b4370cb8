//! Flat-directory document storage
//!
//! A [`DocumentStore`] owns exactly one root directory. Every file directly
//! inside that directory is a document, identified by its filename. There is
//! no index: the directory listing is the only source of truth, so anything
//! written to the directory out-of-band shows up immediately.
//!
//! Names coming from requests are untrusted. Before any filesystem call a
//! name must be a single, normal path component and must resolve (after
//! following symlinks) to a location inside the canonical root. Anything
//! else is refused with [`DocumentError::OutsideRoot`].
//!
//! Writes are not coordinated: two concurrent writers to the same document
//! race and the last one wins.

mod format;

use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::fs;

pub use format::Format;

/// A document loaded from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub content: Vec<u8>,
    pub format: Format,
}

impl Document {
    /// Content as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("a document name is required")]
    InvalidName,
    #[error("{0} does not exist")]
    NotFound(String),
    #[error("{0} resolves outside of the document root")]
    OutsideRoot(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Open the store over `root`, creating the directory if needed.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let root = root.as_ref();
        fs::create_dir_all(root).await?;
        let root = fs::canonicalize(root).await?;
        tracing::debug!(root = %root.display(), "opened document store");
        Ok(Self { root })
    }

    /// Canonical path of the document directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all regular files directly inside the root, sorted.
    pub async fn list(&self) -> Result<Vec<String>, DocumentError> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::debug!(name = ?raw, "skipping document with non utf-8 name");
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Whether `name` is a regular file inside the root.
    ///
    /// Names that fail validation simply do not exist.
    pub async fn exists(&self, name: &str) -> bool {
        let Ok(path) = self.resolve(name).await else {
            return false;
        };
        fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    pub async fn read(&self, name: &str) -> Result<Document, DocumentError> {
        let path = self.resolve(name).await?;

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(DocumentError::NotFound(name.to_string())),
            Err(e) => return Err(not_found_or_io(name, e)),
        }

        let content = fs::read(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))?;

        Ok(Document {
            name: name.to_string(),
            content,
            format: Format::from_name(name),
        })
    }

    /// Create an empty document, truncating any existing one.
    pub async fn create(&self, name: &str) -> Result<(), DocumentError> {
        let path = self.resolve(name).await?;
        fs::File::create(&path).await?;
        tracing::info!(document = name, "created document");
        Ok(())
    }

    /// Replace the whole content of `name`, creating it if absent.
    pub async fn write(&self, name: &str, content: impl AsRef<[u8]>) -> Result<(), DocumentError> {
        let path = self.resolve(name).await?;
        let content = content.as_ref();
        fs::write(&path, content).await?;
        tracing::info!(document = name, bytes = content.len(), "wrote document");
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> Result<(), DocumentError> {
        let path = self.resolve(name).await?;
        fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))?;
        tracing::info!(document = name, "deleted document");
        Ok(())
    }

    /// Map a document name onto a path that is guaranteed to live in the root.
    async fn resolve(&self, name: &str) -> Result<PathBuf, DocumentError> {
        if name.is_empty() {
            return Err(DocumentError::InvalidName);
        }
        if !is_single_component(name) {
            return Err(DocumentError::OutsideRoot(name.to_string()));
        }

        let candidate = self.root.join(name);
        match fs::canonicalize(&candidate).await {
            Ok(real) if real.starts_with(&self.root) => Ok(candidate),
            Ok(real) => {
                tracing::warn!(
                    document = name,
                    target = %real.display(),
                    "refusing document that escapes the root"
                );
                Err(DocumentError::OutsideRoot(name.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // a dangling symlink would let a write land anywhere
                match fs::symlink_metadata(&candidate).await {
                    Ok(_) => Err(DocumentError::OutsideRoot(name.to_string())),
                    Err(_) => Ok(candidate),
                }
            }
            Err(e) => Err(DocumentError::Io(e)),
        }
    }
}

fn is_single_component(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn not_found_or_io(name: &str, err: std::io::Error) -> DocumentError {
    if err.kind() == ErrorKind::NotFound {
        DocumentError::NotFound(name.to_string())
    } else {
        DocumentError::Io(err)
    }
}
