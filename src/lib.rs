//! cuebot: chat-driven automation cues for live streaming.
//!
//! Chat commands arriving over Twitch are dispatched through a
//! configurable command registry; permitted commands drive OBS Studio
//! over its websocket control API. Commands, their permission gates,
//! and their action sequences are declared in a JSON file and built
//! dynamically at load time.

pub mod actions;
pub mod bot;
pub mod config;
pub mod engine;
pub mod error;
pub mod obs;
pub mod twitch;
