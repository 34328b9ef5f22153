//! Viewer permission tiers.

use serde::Deserialize;

/// Permission tier required to trigger a command.
///
/// Tiers are totally ordered: `EVERYONE < FOLLOWER < SUBSCRIBER <
/// MODERATOR < BROADCASTER`. Config files use the uppercase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    Everyone,
    Follower,
    Subscriber,
    Moderator,
    Broadcaster,
}
