use std::sync::Arc;

/// Error types for cql-named-bind
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Malformed named query; `offset` is the byte position of the offending colon
    #[error("invalid named query at byte {offset}: {reason}")]
    Compile { offset: usize, reason: String },

    /// A name could not be resolved against a struct or map bind source
    #[error("cannot resolve `{name}` on {target}")]
    Resolution { name: String, target: String },

    /// Destination type structurally incompatible with the value or row it received
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// Zero rows for a single-row fetch; a recognized outcome, not a hard failure
    #[error("not found")]
    NotFound,

    /// Opaque failure passed through unchanged from the row source
    #[error("row source error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// Rejected attempt to replace the default mapper after it was first used
    #[error("default mapper is already in use and cannot be replaced")]
    MapperFrozen,
}

impl Error {
    pub(crate) fn compile(offset: usize, reason: impl Into<String>) -> Self {
        Error::Compile {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn resolution(name: impl Into<String>, target: impl Into<String>) -> Self {
        Error::Resolution {
            name: name.into(),
            target: target.into(),
        }
    }

    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        Error::Shape(reason.into())
    }

    /// Wraps an error reported by the row source.
    pub fn transport(source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Error::Transport(Arc::from(source))
    }

    /// Distinguishes the empty single-row fetch outcome from hard failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}

/// Result type alias for cql-named-bind operations
pub type Result<T> = std::result::Result<T, Error>;
