use serde::Serialize;
use std::fmt;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    UnrecognizedMethod { path: String },
    ParseError { path: String, message: String },
    QueryError(String),
    LanguageError(String),
    SerializationError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::UnrecognizedMethod { path } => {
                write!(f, "no HTTP method suffix in file name: {}", path)
            }
            Error::ParseError { path, message } => {
                write!(f, "parse error in {}: {}", path, message)
            }
            Error::QueryError(msg) => write!(f, "invalid structural query: {}", msg),
            Error::LanguageError(msg) => write!(f, "grammar could not be loaded: {}", msg),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<tree_sitter::QueryError> for Error {
    fn from(err: tree_sitter::QueryError) -> Self {
        Error::QueryError(format!("{} (row {}, column {})", err.message, err.row, err.column))
    }
}

impl From<tree_sitter::LanguageError> for Error {
    fn from(err: tree_sitter::LanguageError) -> Self {
        Error::LanguageError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}

/// What went wrong (or was skipped) for a single route file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// File name carries none of the recognised method suffixes; the file is dropped.
    UnrecognizedMethod,
    /// The grammar could not produce an error-free tree for the file.
    ParseFailure,
    /// The file was discovered but could not be read.
    ReadFailure,
    /// The run deadline elapsed before the file reached the manifest.
    DeadlineExceeded,
}

impl DiagnosticKind {
    /// Fatal diagnostics mean the manifest is missing a route that should be there.
    pub fn is_fatal(self) -> bool {
        !matches!(self, DiagnosticKind::UnrecognizedMethod)
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            DiagnosticKind::UnrecognizedMethod => "unrecognized method",
            DiagnosticKind::ParseFailure => "parse failure",
            DiagnosticKind::ReadFailure => "read failure",
            DiagnosticKind::DeadlineExceeded => "deadline exceeded",
        };
        f.write_str(s)
    }
}

/// Per-file outcome that is carried through the pipeline instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Logical path of the route file
    pub path: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(path: impl Into<String>, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Classifies an extraction error for the file at `path`.
    pub fn from_error(path: &str, err: &Error) -> Self {
        let kind = match err {
            Error::UnrecognizedMethod { .. } => DiagnosticKind::UnrecognizedMethod,
            Error::IoError(_) => DiagnosticKind::ReadFailure,
            _ => DiagnosticKind::ParseFailure,
        };
        Self::new(path, kind, err.to_string())
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.kind, self.message)
    }
}
