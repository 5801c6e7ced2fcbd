use thiserror::Error;

/// Errors produced while fetching or summarizing a transaction
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Failed to decode transaction: {0}")]
    MalformedTransaction(#[from] bitcoin::consensus::encode::Error),

    /// JSON-RPC error object from the node
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected RPC response (HTTP {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
