use hyper::StatusCode;
use thiserror::Error;

/// Failures of the request/response exchange itself.
///
/// Pre-dispatch problems (bad URL, bad header bytes, TLS setup) are plain
/// `anyhow` errors and are reported with their own message.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a status line but the exchange still failed,
    /// e.g. the connection dropped before the body was complete
    #[error("{} {text}", .code.as_u16())]
    Status { code: StatusCode, text: String },

    /// The request went out but no response head came back
    #[error("No response received from server.")]
    NoResponse(#[source] Box<dyn std::error::Error + Send + Sync>),
}
