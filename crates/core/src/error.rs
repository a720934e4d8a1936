use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration found ({0})")]
    Missing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("configuration store error: {0}")]
    Store(String),
}
