use thiserror::Error;

/// Main error type for the schema flattener
#[derive(Error, Debug)]
pub enum FlattenError {
    #[error("Structural error in object '{object}': {message}")]
    Structure { object: String, message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used across the crate
pub type FlattenResult<T> = Result<T, FlattenError>;

impl FlattenError {
    pub fn structure(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structure {
            object: object.into(),
            message: message.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export { message: message.into() }
    }

    /// Name of the offending object for structural errors
    pub fn object_name(&self) -> Option<&str> {
        match self {
            Self::Structure { object, .. } => Some(object),
            _ => None,
        }
    }
}
