use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("flag file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("KV API error: {0}")]
    Api(String),

    #[error("not configured: {0}")]
    NotConfigured(String),
}
