//! SetScene: switch the program scene permanently.

use super::ObsControl;
use crate::engine::catalog::{BuildCtx, NodeSpec};
use crate::engine::gate::Gate;
use crate::engine::outcome::{Message, Outcome};
use crate::engine::user::User;
use crate::engine::Execute;
use crate::error::BuildError;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Deserialize)]
struct SetSceneArgs {
    scene: String,
}

pub struct SetScene {
    gate: Gate,
    obs: Arc<dyn ObsControl>,
    scene: String,
}

pub fn build(ctx: &BuildCtx<'_>, spec: &NodeSpec) -> Result<Box<dyn Execute>, BuildError> {
    let args: SetSceneArgs =
        serde_json::from_value(spec.args.clone()).map_err(|source| BuildError::BadArgs {
            command: ctx.command.to_string(),
            tag: spec.tag.clone(),
            source,
        })?;
    Ok(Box::new(SetScene {
        gate: ctx.catalog.build_gate(ctx, &spec.allows)?,
        obs: Arc::clone(&ctx.services.obs),
        scene: args.scene,
    }))
}

#[async_trait]
impl Execute for SetScene {
    async fn execute(&mut self, user: &User, _args: &[String]) -> Outcome {
        if !self.gate.permit(user) {
            return Outcome::failed_allows();
        }
        match self.obs.set_scene(&self.scene).await {
            Ok(()) => Outcome::success(Vec::new()),
            Err(err) => {
                warn!(scene = %self.scene, error = %err, "could not set scene");
                Outcome::failure(vec![Message::text(format!("could not set scene: {err}"))])
            }
        }
    }
}
