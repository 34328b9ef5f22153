//! Gate predicate variants.
//!
//! Three gates ship with the engine: a status threshold, a vote
//! accumulator, and a whitelist. The vote accumulator is the one
//! stateful variant: its tally lives for as long as the owning
//! command does and is only reset by its own threshold rule.

use super::permission::Permission;
use super::user::User;
use super::Allow;
use crate::error::BuildError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

// ============================================================================
// UserStatus
// ============================================================================

/// Permits users at or above a minimum status tier.
pub struct UserStatusAllow {
    min_status: Permission,
}

#[derive(Deserialize)]
struct UserStatusArgs {
    #[serde(default = "default_min_status")]
    min_status: Permission,
}

fn default_min_status() -> Permission {
    Permission::Broadcaster
}

impl UserStatusAllow {
    pub fn new(min_status: Permission) -> Self {
        Self { min_status }
    }

    pub fn from_args(command: &str, args: &Value) -> Result<Self, BuildError> {
        let args: UserStatusArgs =
            serde_json::from_value(args.clone()).map_err(|source| BuildError::BadArgs {
                command: command.to_string(),
                tag: "UserStatus".into(),
                source,
            })?;
        Ok(Self::new(args.min_status))
    }
}

impl Allow for UserStatusAllow {
    fn permit(&mut self, user: &User) -> bool {
        user.status() >= self.min_status
    }
}

// ============================================================================
// Voting
// ============================================================================

/// Accumulates votes across calls and permits once the threshold is
/// met, resetting the tally on the permitting call.
///
/// With `uniques`, repeat votes from the same username collapse;
/// otherwise every call counts.
#[derive(Debug)]
pub struct VotingAllow {
    command: String,
    min_votes: usize,
    ballot: Ballot,
}

#[derive(Debug)]
enum Ballot {
    Unique(HashSet<String>),
    All(Vec<String>),
}

impl Ballot {
    fn new(uniques: bool) -> Self {
        if uniques {
            Ballot::Unique(HashSet::new())
        } else {
            Ballot::All(Vec::new())
        }
    }

    fn add(&mut self, username: &str) {
        match self {
            Ballot::Unique(votes) => {
                votes.insert(username.to_string());
            }
            Ballot::All(votes) => votes.push(username.to_string()),
        }
    }

    fn count(&self) -> usize {
        match self {
            Ballot::Unique(votes) => votes.len(),
            Ballot::All(votes) => votes.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            Ballot::Unique(votes) => votes.clear(),
            Ballot::All(votes) => votes.clear(),
        }
    }
}

#[derive(Deserialize)]
struct VotingArgs {
    #[serde(default = "default_min_votes")]
    min_votes: i64,
    #[serde(default = "default_uniques")]
    uniques: bool,
}

fn default_min_votes() -> i64 {
    9999
}

fn default_uniques() -> bool {
    true
}

impl VotingAllow {
    pub fn new(command: &str, min_votes: usize, uniques: bool) -> Self {
        Self {
            command: command.to_string(),
            min_votes,
            ballot: Ballot::new(uniques),
        }
    }

    pub fn from_args(command: &str, args: &Value) -> Result<Self, BuildError> {
        let args: VotingArgs =
            serde_json::from_value(args.clone()).map_err(|source| BuildError::BadArgs {
                command: command.to_string(),
                tag: "Voting".into(),
                source,
            })?;
        if args.min_votes < 0 {
            return Err(BuildError::invalid(
                command,
                format!("'min_votes' must be zero or greater, got {}", args.min_votes),
            ));
        }
        Ok(Self::new(command, args.min_votes as usize, args.uniques))
    }

    /// Current tally, for introspection and tests.
    pub fn votes(&self) -> usize {
        self.ballot.count()
    }
}

impl Allow for VotingAllow {
    fn permit(&mut self, user: &User) -> bool {
        self.ballot.add(&user.username);
        let count = self.ballot.count();
        if count >= self.min_votes {
            debug!(command = %self.command, "all votes received");
            self.ballot.clear();
            true
        } else {
            debug!(
                command = %self.command,
                received = count,
                required = self.min_votes,
                "insufficient votes"
            );
            false
        }
    }
}

// ============================================================================
// Whitelist
// ============================================================================

/// Permits exactly the listed usernames, case-sensitively.
pub struct WhitelistAllow {
    whitelist: HashSet<String>,
}

#[derive(Deserialize)]
struct WhitelistArgs {
    #[serde(default)]
    whitelist: Vec<String>,
}

impl WhitelistAllow {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            whitelist: names.into_iter().collect(),
        }
    }

    pub fn from_args(command: &str, args: &Value) -> Result<Self, BuildError> {
        let args: WhitelistArgs =
            serde_json::from_value(args.clone()).map_err(|source| BuildError::BadArgs {
                command: command.to_string(),
                tag: "Whitelist".into(),
                source,
            })?;
        Ok(Self::new(args.whitelist))
    }
}

impl Allow for WhitelistAllow {
    fn permit(&mut self, user: &User) -> bool {
        self.whitelist.contains(&user.username)
    }
}
