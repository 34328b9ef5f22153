//! Concrete leaf actions and the narrow backend contracts they call.
//!
//! Every action follows the same shape: evaluate its own gate, then
//! perform one side effect against a backend, wrapping the result in
//! the uniform outcome. Backends are reached only through the two
//! traits below, so tests substitute recording fakes.

pub mod say;
pub mod scene;
pub mod scene_item;
pub mod source;
pub mod wait;

use async_trait::async_trait;
use thiserror::Error;

/// A backend call failed; carries the backend's diagnostic text.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

/// The streaming-software control surface.
#[async_trait]
pub trait ObsControl: Send + Sync {
    /// Switch the program scene.
    async fn set_scene(&self, scene: &str) -> Result<(), BackendError>;

    /// Show or hide a source. `scene` of `None` means the current
    /// program scene.
    async fn set_source_visible(
        &self,
        scene: Option<&str>,
        source: &str,
        visible: bool,
    ) -> Result<(), BackendError>;
}

/// The chat message sink.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn say(&self, text: &str) -> Result<(), BackendError>;
}
