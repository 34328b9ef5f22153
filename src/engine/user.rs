//! Chat participant identity and status flags.

use super::permission::Permission;

/// A chat participant as seen by one incoming message.
///
/// Built by the chat layer from message tags (plus a Helix lookup for
/// follower status) and handed to the engine per dispatch; the engine
/// never stores users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Login name; also the identity key for vote accumulation.
    pub username: String,
    pub follower: bool,
    pub subscriber: bool,
    pub moderator: bool,
    pub broadcaster: bool,
}

impl User {
    /// A user with no status flags set.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            follower: false,
            subscriber: false,
            moderator: false,
            broadcaster: false,
        }
    }

    /// Effective permission tier: the highest flag that is set.
    pub fn status(&self) -> Permission {
        if self.broadcaster {
            Permission::Broadcaster
        } else if self.moderator {
            Permission::Moderator
        } else if self.subscriber {
            Permission::Subscriber
        } else if self.follower {
            Permission::Follower
        } else {
            Permission::Everyone
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_picks_highest_flag() {
        let mut user = User::new("viewer");
        assert_eq!(user.status(), Permission::Everyone);

        user.follower = true;
        assert_eq!(user.status(), Permission::Follower);

        user.subscriber = true;
        assert_eq!(user.status(), Permission::Subscriber);

        user.moderator = true;
        assert_eq!(user.status(), Permission::Moderator);

        // Broadcaster wins over every other flag
        user.broadcaster = true;
        assert_eq!(user.status(), Permission::Broadcaster);
    }
}
