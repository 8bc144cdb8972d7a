use std::path::PathBuf;

/// Every failure the index and query engine can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("corrupt index: {reason}")]
    CorruptIndex { reason: String },

    #[error("truncated input: needed {needed} bytes for {field} at offset {offset}, {available} left")]
    TruncatedInput {
        field: &'static str,
        offset: usize,
        needed: u64,
        available: usize,
    },

    #[error("{field} {value} does not fit the on-disk format")]
    ValueOutOfRange { field: &'static str, value: u64 },

    #[error("malformed expression: {reason}")]
    MalformedExpression { reason: String },

    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Fieldless mirror of [`Error`] for branching on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidQuery,
    CorruptIndex,
    TruncatedInput,
    ValueOutOfRange,
    MalformedExpression,
    Io,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidQuery { .. } => ErrorKind::InvalidQuery,
            Error::CorruptIndex { .. } => ErrorKind::CorruptIndex,
            Error::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            Error::ValueOutOfRange { .. } => ErrorKind::ValueOutOfRange,
            Error::MalformedExpression { .. } => ErrorKind::MalformedExpression,
            Error::Io { .. } => ErrorKind::Io,
            Error::Config { .. } => ErrorKind::Config,
        }
    }

    pub(crate) fn invalid_query(reason: impl Into<String>) -> Self {
        Error::InvalidQuery { reason: reason.into() }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Error::CorruptIndex { reason: reason.into() }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedExpression { reason: reason.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
