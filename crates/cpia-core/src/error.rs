use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read payload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid analysis request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;
