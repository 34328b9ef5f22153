//! The command registry: lookup, dispatch, lifecycle.
//!
//! Commands live in one of two maps, `active` or `disabled`, keyed
//! by name and by every alias, with all keys of one command sharing
//! the same instance. Lookup takes a brief read lock; mutation
//! (`load`, `reload`, `enable`, `disable`) takes a brief write lock.
//! Neither lock is ever held across an await: dispatch clones the
//! command handle out of the map, then runs it under the command's
//! own async mutex.

use super::catalog::{Catalog, CommandsSpec, Services};
use super::command::Command;
use super::outcome::{Message, Outcome};
use super::user::User;
use crate::error::BuildError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type CommandHandle = Arc<Mutex<Command>>;

#[derive(Default)]
struct Maps {
    active: HashMap<String, CommandHandle>,
    disabled: HashMap<String, CommandHandle>,
}

/// Name/alias → command mapping with an enable/disable split and
/// atomic wholesale reload.
pub struct CommandRegistry {
    catalog: Catalog,
    services: Services,
    maps: RwLock<Maps>,
}

impl CommandRegistry {
    pub fn new(catalog: Catalog, services: Services) -> Self {
        Self {
            catalog,
            services,
            maps: RwLock::new(Maps::default()),
        }
    }

    /// Merge commands from a definition list into the active map.
    ///
    /// Later entries overwrite earlier ones key by key (last wins),
    /// which is what makes `load` usable for incremental merges. A
    /// definition that fails to build aborts the merge at that point;
    /// entries already merged stay. For declare-the-full-state
    /// semantics use [`reload`](Self::reload).
    pub fn load(&self, spec: &CommandsSpec) -> Result<(), BuildError> {
        for command_spec in &spec.commands {
            let command = self.catalog.build_command(command_spec, &self.services)?;
            let keys: Vec<String> = command.keys().map(str::to_string).collect();
            let handle: CommandHandle = Arc::new(Mutex::new(command));

            let mut maps = self.maps.write();
            for key in keys {
                maps.active.insert(key, Arc::clone(&handle));
            }
        }
        info!(commands = spec.commands.len(), "commands loaded");
        Ok(())
    }

    /// Replace the entire active map with freshly built commands.
    ///
    /// All-or-nothing: if any definition fails to build, the existing
    /// active map is left untouched. Commands absent from the new
    /// definitions vanish. The disabled map is not reconciled;
    /// disabled commands keep their old definitions until re-enabled.
    pub fn reload(&self, spec: &CommandsSpec) -> Result<(), BuildError> {
        let mut candidate: HashMap<String, CommandHandle> = HashMap::new();
        for command_spec in &spec.commands {
            let command = match self.catalog.build_command(command_spec, &self.services) {
                Ok(command) => command,
                Err(err) => {
                    warn!(error = %err, "reload rejected; keeping current commands");
                    return Err(err);
                }
            };
            let keys: Vec<String> = command.keys().map(str::to_string).collect();
            let handle: CommandHandle = Arc::new(Mutex::new(command));
            for key in keys {
                candidate.insert(key, Arc::clone(&handle));
            }
        }

        let count = spec.commands.len();
        self.maps.write().active = candidate;
        info!(commands = count, "commands reloaded");
        Ok(())
    }

    /// Dispatch a chat command.
    ///
    /// The outer outcome reports whether dispatch found a command;
    /// the command's own outcome is nested inside it.
    pub async fn execute(&self, key: &str, user: &User, raw_args: Option<&str>) -> Outcome {
        let handle = { self.maps.read().active.get(key).cloned() };
        let Some(handle) = handle else {
            debug!(command = %key, "dispatch miss");
            return Outcome::failure(vec![Message::text(format!("{key} is not a command"))]);
        };

        let inner = handle.lock().await.execute(user, raw_args).await;
        Outcome::success(vec![Message::Nested(inner)])
    }

    /// Move a command and all its aliases out of the active map.
    pub async fn disable(&self, key: &str) -> Outcome {
        let handle = { self.maps.read().active.get(key).cloned() };
        let Some(handle) = handle else {
            return Outcome::failure(vec![Message::text(format!("{key} is not a command"))]);
        };
        let keys: Vec<String> = handle.lock().await.keys().map(str::to_string).collect();

        let mut maps = self.maps.write();
        for k in &keys {
            if let Some(command) = maps.active.remove(k) {
                maps.disabled.insert(k.clone(), command);
            }
        }
        info!(command = %key, "command disabled");
        Outcome::success(vec![Message::text(format!("{key} disabled"))])
    }

    /// Move a command and all its aliases back into the active map.
    pub async fn enable(&self, key: &str) -> Outcome {
        let handle = { self.maps.read().disabled.get(key).cloned() };
        let Some(handle) = handle else {
            return Outcome::failure(vec![Message::text(format!("{key} is not disabled"))]);
        };
        let keys: Vec<String> = handle.lock().await.keys().map(str::to_string).collect();

        let mut maps = self.maps.write();
        for k in &keys {
            if let Some(command) = maps.disabled.remove(k) {
                maps.active.insert(k.clone(), command);
            }
        }
        info!(command = %key, "command enabled");
        Outcome::success(vec![Message::text(format!("{key} enabled"))])
    }

    /// Number of active keys (names plus aliases).
    pub fn active_len(&self) -> usize {
        self.maps.read().active.len()
    }

    /// Whether a key currently dispatches.
    pub fn is_active(&self, key: &str) -> bool {
        self.maps.read().active.contains_key(key)
    }

    /// Whether a key is currently disabled.
    pub fn is_disabled(&self, key: &str) -> bool {
        self.maps.read().disabled.contains_key(key)
    }
}
