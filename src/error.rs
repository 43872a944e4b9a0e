use thiserror::Error;

/// Failure kinds surfaced to the embedding UI.
///
/// Each variant maps to a different reaction: validation errors block the
/// submitting control inline, network errors become transient notices with the
/// prior state left untouched, clipboard errors become notices while the text
/// stays available for manual copying. None of them are fatal to the page.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("network request failed: {0}")]
    Network(String),

    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(format!("invalid JSON: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
