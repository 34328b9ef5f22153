//! Say: send configured messages to chat.

use super::ChatSink;
use crate::engine::catalog::{BuildCtx, NodeSpec};
use crate::engine::gate::Gate;
use crate::engine::outcome::{Message, Outcome};
use crate::engine::user::User;
use crate::engine::Execute;
use crate::error::BuildError;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Deserialize)]
struct SayArgs {
    messages: Vec<String>,
}

pub struct Say {
    gate: Gate,
    chat: Arc<dyn ChatSink>,
    messages: Vec<String>,
}

pub fn build(ctx: &BuildCtx<'_>, spec: &NodeSpec) -> Result<Box<dyn Execute>, BuildError> {
    let args: SayArgs =
        serde_json::from_value(spec.args.clone()).map_err(|source| BuildError::BadArgs {
            command: ctx.command.to_string(),
            tag: spec.tag.clone(),
            source,
        })?;
    if args.messages.is_empty() {
        return Err(BuildError::invalid(ctx.command, "'messages' must not be empty"));
    }
    Ok(Box::new(Say {
        gate: ctx.catalog.build_gate(ctx, &spec.allows)?,
        chat: Arc::clone(&ctx.services.chat),
        messages: args.messages,
    }))
}

#[async_trait]
impl Execute for Say {
    async fn execute(&mut self, user: &User, _args: &[String]) -> Outcome {
        if !self.gate.permit(user) {
            return Outcome::failed_allows();
        }
        for message in &self.messages {
            debug!(message = %message, "saying");
            if let Err(err) = self.chat.say(message).await {
                return Outcome::failure(vec![Message::text(format!("say failed: {err}"))]);
            }
        }
        Outcome::success(Vec::new())
    }
}
