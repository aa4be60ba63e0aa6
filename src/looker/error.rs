//! Vendor-side failures.

use thiserror::Error;

/// Error returned by a [`LookerApi`](super::LookerApi) implementation.
#[derive(Error, Debug)]
pub enum LookerError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("looker api returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("unable to decode looker response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Endpoint could not be turned into a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Service login failed or no usable credentials exist.
    #[error("looker login failed: {0}")]
    Login(String),
}
