//! ShowSceneItem: show a scene item, wait, hide it again.

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
use std::time::Duration;
use tracing::warn;

#[derive(Deserialize)]
struct ShowSceneItemArgs {
    scene_item: String,
    duration: f64,
    #[serde(default)]
    scene: Option<String>,
}

pub struct ShowSceneItem {
    gate: Gate,
    obs: Arc<dyn ObsControl>,
    scene_item: String,
    duration: Duration,
    scene: Option<String>,
}

pub fn build(ctx: &BuildCtx<'_>, spec: &NodeSpec) -> Result<Box<dyn Execute>, BuildError> {
    let args: ShowSceneItemArgs =
        serde_json::from_value(spec.args.clone()).map_err(|source| BuildError::BadArgs {
            command: ctx.command.to_string(),
            tag: spec.tag.clone(),
            source,
        })?;
    if args.duration < 0.0 {
        return Err(BuildError::invalid(ctx.command, "'duration' must be zero or greater"));
    }
    Ok(Box::new(ShowSceneItem {
        gate: ctx.catalog.build_gate(ctx, &spec.allows)?,
        obs: Arc::clone(&ctx.services.obs),
        scene_item: args.scene_item,
        duration: Duration::from_secs_f64(args.duration),
        scene: args.scene,
    }))
}

#[async_trait]
impl Execute for ShowSceneItem {
    async fn execute(&mut self, user: &User, _args: &[String]) -> Outcome {
        if !self.gate.permit(user) {
            return Outcome::failed_allows();
        }
        let scene = self.scene.as_deref();

        if let Err(err) = self.obs.set_source_visible(scene, &self.scene_item, true).await {
            warn!(scene_item = %self.scene_item, error = %err, "could not show scene item");
            return Outcome::failure(vec![Message::text(format!(
                "could not show scene item {}: {err}",
                self.scene_item
            ))]);
        }
        tokio::time::sleep(self.duration).await;
        if let Err(err) = self.obs.set_source_visible(scene, &self.scene_item, false).await {
            warn!(scene_item = %self.scene_item, error = %err, "could not hide scene item");
            return Outcome::failure(vec![Message::text(format!(
                "could not hide scene item {}: {err}",
                self.scene_item
            ))]);
        }
        Outcome::success(Vec::new())
    }
}
