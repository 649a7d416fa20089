use thiserror::Error;

/// Classifies decode failures for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// Not JSON, or JSON that is not a nested object of objects
    Syntax,
    /// A key that is empty or contains a dot
    InvalidLabel,
}

/// Suffix trie error types
#[derive(Error, Debug)]
pub enum TrieError {
    #[error("Malformed input: {message}")]
    MalformedInput {
        kind: MalformedKind,
        message: String,
    },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrieError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        TrieError::MalformedInput {
            kind: MalformedKind::Syntax,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_label(message: impl Into<String>) -> Self {
        TrieError::MalformedInput {
            kind: MalformedKind::InvalidLabel,
            message: message.into(),
        }
    }

    /// Returns the malformed-input kind, if this is a decode failure.
    pub fn malformed_kind(&self) -> Option<MalformedKind> {
        match self {
            TrieError::MalformedInput { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrieError>;
