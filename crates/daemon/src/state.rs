use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "quire";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const USERS_FILE_NAME: &str = "users.txt";
pub const SESSIONS_DB_NAME: &str = "sessions.db";
pub const DATA_DIR_NAME: &str = "public/data";
pub const TEST_DATA_DIR_NAME: &str = "test/data";

/// Process-wide flag that selects the document root.
pub const ENVIRONMENT_VAR: &str = "QUIRE_ENV";

/// Which document root the process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Test,
}

impl Environment {
    /// Read [`ENVIRONMENT_VAR`]. Only the exact value `test` selects the test root.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(ENVIRONMENT_VAR).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("test") => Environment::Test,
            _ => Environment::Production,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the web server
    #[serde(default = "default_app_port")]
    pub app_port: u16,
    /// Production document directory (defaults to <quire_dir>/public/data)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Test document directory (defaults to <quire_dir>/test/data)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_data_dir: Option<PathBuf>,
    /// Credential file (defaults to <quire_dir>/users.txt)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users_file: Option<PathBuf>,
    /// Session database (defaults to <quire_dir>/sessions.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions_db: Option<PathBuf>,
    /// Session cookie signing secret, at least 64 bytes.
    /// A random key is generated on every start when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,
}

fn default_app_port() -> u16 {
    4567
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_port: default_app_port(),
            data_dir: None,
            test_data_dir: None,
            users_file: None,
            sessions_db: None,
            session_secret: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the quire directory (~/.quire)
    pub quire_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the quire directory path (custom or default ~/.quire)
    pub fn quire_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new quire state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let quire_dir = Self::quire_dir(custom_path)?;

        if quire_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&quire_dir)?;

        let config = config.unwrap_or_default();
        let config_path = quire_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        let state = Self {
            quire_dir,
            config_path,
            config,
        };

        fs::create_dir_all(state.data_dir(Environment::Production))?;
        fs::create_dir_all(state.data_dir(Environment::Test))?;

        // Accounts are provisioned by hand, start with none
        let users_path = state.users_path();
        if !users_path.exists() {
            fs::write(&users_path, "")?;
        }

        Ok(state)
    }

    /// Load existing state from the quire directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let quire_dir = Self::quire_dir(custom_path)?;

        if !quire_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = quire_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            quire_dir,
            config_path,
            config,
        })
    }

    /// Document directory for the given environment
    pub fn data_dir(&self, environment: Environment) -> PathBuf {
        let (configured, default) = match environment {
            Environment::Production => (&self.config.data_dir, DATA_DIR_NAME),
            Environment::Test => (&self.config.test_data_dir, TEST_DATA_DIR_NAME),
        };
        match configured {
            Some(path) => self.resolve(path),
            None => self.quire_dir.join(default),
        }
    }

    /// Credential file location
    pub fn users_path(&self) -> PathBuf {
        match &self.config.users_file {
            Some(path) => self.resolve(path),
            None => self.quire_dir.join(USERS_FILE_NAME),
        }
    }

    /// Session database location
    pub fn sessions_path(&self) -> PathBuf {
        match &self.config.sessions_db {
            Some(path) => self.resolve(path),
            None => self.quire_dir.join(SESSIONS_DB_NAME),
        }
    }

    // relative paths in the config are relative to the quire directory
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.quire_dir.join(path)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("quire directory not initialized. Run 'quire init' first")]
    NotInitialized,

    #[error("quire directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
