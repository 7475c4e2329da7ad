/// Convenience result type used across stackcanvas.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Fallback text shown to users for failures without a dedicated message.
pub const GENERIC_USER_MESSAGE: &str = "Something went wrong. Please try again.";

/// Top-level error taxonomy used by editor APIs.
#[derive(thiserror::Error, Debug)]
pub enum CanvasError {
    /// The drawing surface or another required collaborator is missing or unusable.
    #[error("setup error: {0}")]
    Setup(String),

    /// An asset could not be decoded or attached.
    #[error("asset error: {0}")]
    Asset(String),

    /// An upload used a file extension the editor cannot load.
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Persistence backend failures.
    #[error("storage error: {0}")]
    Storage(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// PNG/GIF encoding failures.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CanvasError {
    /// Build a [`CanvasError::Setup`] value.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Build a [`CanvasError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`CanvasError::UnsupportedExtension`] value.
    pub fn unsupported_extension(ext: impl Into<String>) -> Self {
        Self::UnsupportedExtension(ext.into())
    }

    /// Build a [`CanvasError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CanvasError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`CanvasError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`CanvasError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Whether this error aborts the calling operation's setup (as opposed to a recoverable
    /// data condition).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Setup(_))
    }

    /// Message suitable for an end-user notification.
    ///
    /// Known cases get a specific message; everything else collapses to
    /// [`GENERIC_USER_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Setup(msg) => format!("The canvas could not be initialized: {msg}"),
            Self::UnsupportedExtension(ext) => {
                format!("Files of type '.{ext}' are not supported.")
            }
            Self::Asset(_) => "That file could not be loaded.".to_owned(),
            _ => GENERIC_USER_MESSAGE.to_owned(),
        }
    }
}

impl From<serde_json::Error> for CanvasError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
