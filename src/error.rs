//! Error taxonomy for query compilation, store round trips and response walking.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The store could not be reached, timed out, or failed on its side (5xx).
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),
    /// The store rejected the compiled request (4xx) or answered with a body
    /// that does not have the shape the request asked for.
    #[error("malformed store response: {0}")]
    MalformedResponse(String),
    /// A caller-supplied identifier is absent, empty or of the wrong shape.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// A model or request body could not be converted to or from JSON.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::MalformedResponse(e.to_string())
        } else {
            Error::StoreUnavailable(e.to_string())
        }
    }
}
