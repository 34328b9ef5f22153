//! Integration test common infrastructure.
//!
//! Recording backends for the two narrow service traits, plus
//! scriptable probe actions/allows that tests register in a catalog
//! and steer through a shared board.
#![allow(dead_code)]

use async_trait::async_trait;
use cuebot::actions::{BackendError, ChatSink, ObsControl};
use cuebot::engine::{Catalog, Execute, Gate, Outcome, Services, User};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Recording backends
// ============================================================================

/// Records every control call instead of talking to OBS.
#[derive(Default)]
pub struct RecordingObs {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ObsControl for RecordingObs {
    async fn set_scene(&self, scene: &str) -> Result<(), BackendError> {
        self.calls.lock().push(format!("set_scene:{scene}"));
        Ok(())
    }

    async fn set_source_visible(
        &self,
        scene: Option<&str>,
        source: &str,
        visible: bool,
    ) -> Result<(), BackendError> {
        self.calls.lock().push(format!(
            "set_source_visible:{}:{source}:{visible}",
            scene.unwrap_or("<current>")
        ));
        Ok(())
    }
}

/// Records chat lines instead of sending them.
#[derive(Default)]
pub struct RecordingChat {
    pub lines: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatSink for RecordingChat {
    async fn say(&self, text: &str) -> Result<(), BackendError> {
        self.lines.lock().push(text.to_string());
        Ok(())
    }
}

/// Services backed by recording fakes.
pub fn recording_services() -> (Services, Arc<RecordingObs>, Arc<RecordingChat>) {
    let obs = Arc::new(RecordingObs::default());
    let chat = Arc::new(RecordingChat::default());
    let services = Services {
        obs: obs.clone(),
        chat: chat.clone(),
    };
    (services, obs, chat)
}

// ============================================================================
// Probe actions and allows
// ============================================================================

#[derive(Default)]
struct ProbeState {
    calls: usize,
    fail: bool,
}

/// Shared board behind the `Probe` action tag: counts calls per probe
/// id and lets tests flip a probe between success and failure.
#[derive(Clone, Default)]
pub struct ProbeBoard {
    states: Arc<Mutex<HashMap<String, ProbeState>>>,
}

#[derive(Deserialize)]
struct ProbeArgs {
    id: String,
    #[serde(default)]
    fail: bool,
}

struct ProbeAction {
    id: String,
    gate: Gate,
    board: ProbeBoard,
}

#[async_trait]
impl Execute for ProbeAction {
    async fn execute(&mut self, user: &User, _args: &[String]) -> Outcome {
        if !self.gate.permit(user) {
            return Outcome::failed_allows();
        }
        let mut states = self.board.states.lock();
        let state = states.entry(self.id.clone()).or_default();
        state.calls += 1;
        if state.fail {
            Outcome::failure(Vec::new())
        } else {
            Outcome::success(Vec::new())
        }
    }
}

impl ProbeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the `Probe` action tag in a catalog. Args: `{id, fail?}`.
    pub fn register(&self, catalog: &mut Catalog) {
        let board = self.clone();
        catalog.register_action("Probe", move |ctx, spec| {
            let args: ProbeArgs = serde_json::from_value(spec.args.clone()).map_err(|source| {
                cuebot::error::BuildError::BadArgs {
                    command: ctx.command.to_string(),
                    tag: spec.tag.clone(),
                    source,
                }
            })?;
            board
                .states
                .lock()
                .entry(args.id.clone())
                .or_default()
                .fail = args.fail;
            Ok(Box::new(ProbeAction {
                id: args.id,
                gate: ctx.catalog.build_gate(ctx, &spec.allows)?,
                board: board.clone(),
            }))
        });
    }

    pub fn calls(&self, id: &str) -> usize {
        self.states
            .lock()
            .get(id)
            .map(|state| state.calls)
            .unwrap_or(0)
    }

    pub fn set_fail(&self, id: &str, fail: bool) {
        self.states.lock().entry(id.to_string()).or_default().fail = fail;
    }
}

/// Shared board behind the `ProbeAllow` allow tag: counts permit
/// calls per id and lets tests script the verdict.
#[derive(Clone, Default)]
pub struct AllowBoard {
    states: Arc<Mutex<HashMap<String, AllowState>>>,
}

#[derive(Default)]
struct AllowState {
    calls: usize,
    deny: bool,
}

#[derive(Deserialize)]
struct ProbeAllowArgs {
    id: String,
    #[serde(default)]
    deny: bool,
}

struct ProbeAllow {
    id: String,
    board: AllowBoard,
}

impl cuebot::engine::Allow for ProbeAllow {
    fn permit(&mut self, _user: &User) -> bool {
        let mut states = self.board.states.lock();
        let state = states.entry(self.id.clone()).or_default();
        state.calls += 1;
        !state.deny
    }
}

impl AllowBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the `ProbeAllow` allow tag in a catalog. Args:
    /// `{id, deny?}`.
    pub fn register(&self, catalog: &mut Catalog) {
        let board = self.clone();
        catalog.register_allow("ProbeAllow", move |ctx, spec| {
            let args: ProbeAllowArgs =
                serde_json::from_value(spec.args.clone()).map_err(|source| {
                    cuebot::error::BuildError::BadArgs {
                        command: ctx.command.to_string(),
                        tag: spec.tag.clone(),
                        source,
                    }
                })?;
            board
                .states
                .lock()
                .entry(args.id.clone())
                .or_default()
                .deny = args.deny;
            Ok(Box::new(ProbeAllow { id: args.id, board: board.clone() }))
        });
    }

    pub fn calls(&self, id: &str) -> usize {
        self.states
            .lock()
            .get(id)
            .map(|state| state.calls)
            .unwrap_or(0)
    }
}

// ============================================================================
// Users
// ============================================================================

pub fn viewer(name: &str) -> User {
    User::new(name)
}

pub fn moderator(name: &str) -> User {
    let mut user = User::new(name);
    user.moderator = true;
    user
}

pub fn broadcaster(name: &str) -> User {
    let mut user = User::new(name);
    user.broadcaster = true;
    user
}
