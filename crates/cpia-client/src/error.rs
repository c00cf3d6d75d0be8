use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection, timeout or body read failure
    Transport,
    /// Non-success HTTP status
    Status,
    /// Response body was not the expected JSON
    Decode,
    /// Rejected before anything was sent
    InvalidInput,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Status { .. } => ErrorKind::Status,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Config(_) | Error::Io(_) | Error::Toml(_) => ErrorKind::Config,
        }
    }

    /// HTTP status, when the service answered with one
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<cpia_core::Error> for Error {
    fn from(err: cpia_core::Error) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
