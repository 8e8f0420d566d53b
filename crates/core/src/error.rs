use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Which stage of the pipeline a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document text could not be decoded; no model was produced.
    Parse,
    /// A model was produced but emitting the output failed.
    Render,
}

/// Errors that can occur while turning document text into output.
#[derive(Debug, Error)]
pub enum KyozaiError {
    /// The document text is not well-formed YAML.
    #[error("{message}")]
    Parse {
        /// First line of the YAML library's message
        message: String,
        /// Where the YAML parser gave up, when known
        location: Option<SourceLocation>,
    },
    /// The document decoded to something other than a mapping.
    #[error("Document root must be a mapping, found {found}")]
    InvalidRoot {
        /// Human-readable name of the value found at the root
        found: &'static str,
    },
    /// markdown-rs rejected a text field.
    #[error("Markdown error at {location}: {message}")]
    Markdown {
        /// Error message
        message: String,
        /// Position inside the text field
        location: SourceLocation,
    },
    /// Emission failed after the model was built.
    #[error("Render error: {0}")]
    Render(String),
    /// The document tree could not be packaged into its binary form.
    #[error("Packaging error: {0}")]
    Package(String),
    /// A renderer panicked; caught at the API boundary.
    #[error("Renderer panicked: {0}")]
    Panic(String),
}

impl KyozaiError {
    /// Create a parse error from a YAML library error, keeping only its first line.
    pub fn parse(err: &serde_yaml::Error) -> Self {
        let text = err.to_string();
        let message = text.lines().next().unwrap_or_default().to_string();
        let location = err
            .location()
            .map(|loc| SourceLocation::new(loc.line(), loc.column()));
        Self::Parse { message, location }
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Returns which pipeline stage produced this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KyozaiError::Parse { .. } => ErrorKind::Parse,
            KyozaiError::InvalidRoot { .. }
            | KyozaiError::Markdown { .. }
            | KyozaiError::Render(_)
            | KyozaiError::Package(_)
            | KyozaiError::Panic(_) => ErrorKind::Render,
        }
    }
}

/// Result type used throughout kyozai.
pub type Result<T> = std::result::Result<T, KyozaiError>;
