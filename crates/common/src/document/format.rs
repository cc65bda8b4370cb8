use std::fmt;

/// How a document is presented, derived from its filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `.md`, rendered to HTML inside the page layout
    Markdown,
    /// `.txt`, served verbatim as `text/plain`
    PlainText,
    /// Anything else, passed through untouched
    Raw,
}

impl Format {
    /// Classify a document by the text after the last `.` in its filename.
    ///
    /// A bare dotfile such as `.md` counts as markdown. This never touches
    /// the filesystem.
    pub fn from_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((_, "md")) => Format::Markdown,
            Some((_, "txt")) => Format::PlainText,
            _ => Format::Raw,
        }
    }

    /// Content type used when the document is served without a page layout.
    pub fn content_type(&self, name: &str) -> String {
        match self {
            Format::Markdown => "text/markdown; charset=utf-8".to_string(),
            Format::PlainText => "text/plain; charset=utf-8".to_string(),
            Format::Raw => mime_guess::from_path(name)
                .first_or_octet_stream()
                .to_string(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Format::Markdown => "markdown",
            Format::PlainText => "plaintext",
            Format::Raw => "raw",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(Format::from_name("notes.md"), Format::Markdown);
        assert_eq!(Format::from_name("about.txt"), Format::PlainText);
        assert_eq!(Format::from_name("archive.tar.md"), Format::Markdown);
    }

    #[test]
    fn test_dotfile_suffix() {
        assert_eq!(Format::from_name(".md"), Format::Markdown);
        assert_eq!(Format::from_name(".txt"), Format::PlainText);
        assert_eq!(Format::from_name("notes."), Format::Raw);
    }

    #[test]
    fn test_unknown_extensions_are_raw() {
        assert_eq!(Format::from_name("page.html"), Format::Raw);
        assert_eq!(Format::from_name("Makefile"), Format::Raw);
        assert_eq!(Format::from_name("md"), Format::Raw);
        assert_eq!(Format::from_name("notes.MD"), Format::Raw);
    }

    #[test]
    fn test_raw_content_type_is_guessed() {
        assert_eq!(Format::Raw.content_type("style.css"), "text/css");
        assert_eq!(
            Format::Raw.content_type("blob"),
            "application/octet-stream"
        );
        assert_eq!(
            Format::PlainText.content_type("a.txt"),
            "text/plain; charset=utf-8"
        );
    }
}
