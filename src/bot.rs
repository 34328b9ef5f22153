//! The dispatch loop: chat events in, command executions out.
//!
//! One task consumes the chat event queue, so command invocations are
//! strictly serialized: a command's vote sets and gating cursors are
//! never raced, and a delayed action simply holds up the queue.

use crate::actions::ChatSink;
use crate::config;
use crate::engine::{CommandRegistry, Outcome, User};
use crate::twitch::ChatEvent;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Ties the chat stream to the command registry.
pub struct Bot {
    registry: Arc<CommandRegistry>,
    chat: Arc<dyn ChatSink>,
    commands_file: PathBuf,
}

impl Bot {
    pub fn new(
        registry: Arc<CommandRegistry>,
        chat: Arc<dyn ChatSink>,
        commands_file: PathBuf,
    ) -> Self {
        Self { registry, chat, commands_file }
    }

    /// Consume chat events until the connection closes.
    pub async fn run(&self, mut events: mpsc::Receiver<ChatEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        info!("chat event stream ended");
    }

    async fn handle(&self, event: ChatEvent) {
        let Some(rest) = event.text.strip_prefix('!') else {
            return;
        };
        let (key, raw_args) = match rest.split_once(char::is_whitespace) {
            Some((key, raw)) => (key, Some(raw)),
            None => (rest, None),
        };
        if key.is_empty() {
            return;
        }

        match key {
            "reload" | "enable" | "disable" => self.admin(key, raw_args, &event.user).await,
            _ => self.dispatch(key, raw_args, &event.user).await,
        }
    }

    async fn dispatch(&self, key: &str, raw_args: Option<&str>, user: &User) {
        debug!(command = %key, user = %user.username, "dispatching");
        let outcome = self.registry.execute(key, user, raw_args).await;

        if !outcome.is_success() {
            // Dispatch miss: tell chat the command doesn't exist
            if let Some(crate::engine::Message::Text(text)) = outcome.messages.first() {
                self.say(text).await;
            }
            return;
        }

        // Inner failures (denials, pending votes, backend errors) are
        // logged, not announced, or vote-style commands would spam
        // the channel on every trigger.
        match outcome.children().next() {
            Some(inner) if !inner.is_success() => {
                debug!(command = %key, user = %user.username, outcome = ?inner, "command failed");
            }
            _ => {}
        }
    }

    /// Registry lifecycle commands, restricted to the broadcaster and
    /// moderators.
    async fn admin(&self, key: &str, raw_args: Option<&str>, user: &User) {
        if !(user.broadcaster || user.moderator) {
            debug!(command = %key, user = %user.username, "admin command denied");
            return;
        }

        match key {
            "reload" => match config::load_commands(&self.commands_file) {
                Ok(spec) => match self.registry.reload(&spec) {
                    Ok(()) => self.say("commands reloaded").await,
                    Err(err) => {
                        warn!(error = %err, "reload failed");
                        self.say("reload failed; keeping current commands").await;
                    }
                },
                Err(err) => {
                    warn!(error = %err, "could not read commands file");
                    self.say("reload failed; keeping current commands").await;
                }
            },
            "enable" | "disable" => {
                let Some(target) = raw_args.map(str::trim).filter(|t| !t.is_empty()) else {
                    self.say(&format!("usage: !{key} <command>")).await;
                    return;
                };
                let outcome = if key == "enable" {
                    self.registry.enable(target).await
                } else {
                    self.registry.disable(target).await
                };
                self.announce(&outcome).await;
            }
            _ => {}
        }
    }

    async fn announce(&self, outcome: &Outcome) {
        if let Some(crate::engine::Message::Text(text)) = outcome.messages.first() {
            self.say(text).await;
        }
    }

    async fn say(&self, text: &str) {
        if let Err(err) = self.chat.say(text).await {
            warn!(error = %err, "could not reach chat");
        }
    }
}
