//! OBS Studio control over obs-websocket (protocol v5).

mod client;
mod protocol;

pub use client::ObsClient;
pub use protocol::auth_response;

use thiserror::Error;

/// OBS connection and request errors.
#[derive(Debug, Error)]
pub enum ObsError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("request '{request}' failed: {comment} (code {code})")]
    Request {
        request: String,
        code: u16,
        comment: String,
    },

    #[error("connection closed")]
    Closed,

    #[error("unexpected response: {0}")]
    BadResponse(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
}
