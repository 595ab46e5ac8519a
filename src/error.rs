/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for document generation and manifest loading
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// A bound model could not produce a usable schema
    Reflection { model: String, message: String },
    /// The route manifest is malformed or references unknown names
    Manifest(String),
    InvalidArgument(String),
    SerializationError(String),
}

impl Error {
    pub(crate) fn reflection(model: &str, message: impl Into<String>) -> Self {
        Error::Reflection {
            model: model.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::Reflection { model, message } => {
                write!(f, "Failed to reflect model {}: {}", model, message)
            }
            Error::Manifest(msg) => write!(f, "Invalid route manifest: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
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

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML error: {}", err))
    }
}
