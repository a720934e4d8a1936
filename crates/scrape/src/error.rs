use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("markup could not be parsed: {0}")]
    Malformed(String),

    #[error("invalid selector: {0}")]
    Selector(String),
}
