//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to a Supabase project.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint configuration cannot be turned into a client.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The REST API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// A count response carried no usable `Content-Range` total.
    #[error("unusable Content-Range header: {0}")]
    ContentRange(String),

    /// Websocket transport error on the change feed.
    #[error("websocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The change feed misbehaved at the protocol level.
    #[error("change feed error: {0}")]
    Feed(String),
}
