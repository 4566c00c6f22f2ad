//! Common error types used throughout moneytracker.
//!
//! Image capabilities (codec, file store, sources) report failures with this
//! type. The image manager absorbs them at its own boundary.

/// Common error type for moneytracker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested file was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Image bytes could not be decoded (corrupt, truncated, unsupported format).
    #[error("Decode error: {0}")]
    Decode(String),

    /// A raster could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new Encode error.
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Io error from a message.
    pub fn io<S: Into<String>>(msg: S) -> Self {
        Self::Io(std::io::Error::other(msg.into()))
    }

    /// Whether this error means the target simply does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Whether this error means the target name was already taken.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::AlreadyExists)
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
