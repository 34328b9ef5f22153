//! ShowSource / HideSource: source visibility, with an optional
//! timed show-then-hide and a random pick from a source group.

use super::{BackendError, ObsControl};
use crate::engine::catalog::{BuildCtx, NodeSpec};
use crate::engine::gate::Gate;
use crate::engine::outcome::{Message, Outcome};
use crate::engine::user::User;
use crate::engine::Execute;
use crate::error::BuildError;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// A single source name or a group to pick from at random.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum SourcePick {
    One(String),
    Group(Vec<String>),
}

impl SourcePick {
    pub(crate) fn validate(&self, command: &str) -> Result<(), BuildError> {
        match self {
            SourcePick::Group(group) if group.is_empty() => {
                Err(BuildError::invalid(command, "'source' group must not be empty"))
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn pick(&self) -> &str {
        match self {
            SourcePick::One(name) => name,
            SourcePick::Group(group) => group
                .choose(&mut rand::thread_rng())
                .map(String::as_str)
                .unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct ShowSourceArgs {
    source: SourcePick,
    /// Seconds to keep the source visible; absent means leave it shown.
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    scene: Option<String>,
}

#[derive(Deserialize)]
struct HideSourceArgs {
    source: SourcePick,
    #[serde(default)]
    scene: Option<String>,
}

pub struct ShowSource {
    gate: Gate,
    obs: Arc<dyn ObsControl>,
    source: SourcePick,
    duration: Option<Duration>,
    scene: Option<String>,
}

pub struct HideSource {
    gate: Gate,
    obs: Arc<dyn ObsControl>,
    source: SourcePick,
    scene: Option<String>,
}

pub fn build_show(ctx: &BuildCtx<'_>, spec: &NodeSpec) -> Result<Box<dyn Execute>, BuildError> {
    let args: ShowSourceArgs =
        serde_json::from_value(spec.args.clone()).map_err(|source| BuildError::BadArgs {
            command: ctx.command.to_string(),
            tag: spec.tag.clone(),
            source,
        })?;
    args.source.validate(ctx.command)?;
    if args.duration.is_some_and(|duration| duration < 0.0) {
        return Err(BuildError::invalid(ctx.command, "'duration' must be zero or greater"));
    }
    Ok(Box::new(ShowSource {
        gate: ctx.catalog.build_gate(ctx, &spec.allows)?,
        obs: Arc::clone(&ctx.services.obs),
        source: args.source,
        duration: args.duration.map(Duration::from_secs_f64),
        scene: args.scene,
    }))
}

pub fn build_hide(ctx: &BuildCtx<'_>, spec: &NodeSpec) -> Result<Box<dyn Execute>, BuildError> {
    let args: HideSourceArgs =
        serde_json::from_value(spec.args.clone()).map_err(|source| BuildError::BadArgs {
            command: ctx.command.to_string(),
            tag: spec.tag.clone(),
            source,
        })?;
    args.source.validate(ctx.command)?;
    Ok(Box::new(HideSource {
        gate: ctx.catalog.build_gate(ctx, &spec.allows)?,
        obs: Arc::clone(&ctx.services.obs),
        source: args.source,
        scene: args.scene,
    }))
}

fn visibility_failure(source: &str, visible: bool, err: &BackendError) -> Outcome {
    let verb = if visible { "show" } else { "hide" };
    warn!(source = %source, error = %err, "could not {} source", verb);
    Outcome::failure(vec![Message::text(format!("could not {verb} source {source}: {err}"))])
}

#[async_trait]
impl Execute for ShowSource {
    async fn execute(&mut self, user: &User, _args: &[String]) -> Outcome {
        if !self.gate.permit(user) {
            return Outcome::failed_allows();
        }
        // One pick per trigger; the same source is shown and hidden
        let source = self.source.pick().to_string();
        let scene = self.scene.as_deref();

        if let Err(err) = self.obs.set_source_visible(scene, &source, true).await {
            return visibility_failure(&source, true, &err);
        }
        if let Some(duration) = self.duration {
            tokio::time::sleep(duration).await;
            if let Err(err) = self.obs.set_source_visible(scene, &source, false).await {
                return visibility_failure(&source, false, &err);
            }
        }
        Outcome::success(Vec::new())
    }
}

#[async_trait]
impl Execute for HideSource {
    async fn execute(&mut self, user: &User, _args: &[String]) -> Outcome {
        if !self.gate.permit(user) {
            return Outcome::failed_allows();
        }
        let source = self.source.pick().to_string();
        match self
            .obs
            .set_source_visible(self.scene.as_deref(), &source, false)
            .await
        {
            Ok(()) => Outcome::success(Vec::new()),
            Err(err) => visibility_failure(&source, false, &err),
        }
    }
}
