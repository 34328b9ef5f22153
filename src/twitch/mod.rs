//! Twitch chat connection (IRC over WebSocket) and Helix lookups.

mod api;
mod client;
mod message;

pub use api::HelixApi;
pub use client::{ChatEvent, TwitchChat};
pub use message::Line;

use thiserror::Error;

/// Chat connection errors.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("connection closed")]
    Closed,
}
