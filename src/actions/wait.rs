//! Wait: sleep between steps of an executor sequence.

use crate::engine::catalog::{BuildCtx, NodeSpec};
use crate::engine::gate::Gate;
use crate::engine::outcome::Outcome;
use crate::engine::user::User;
use crate::engine::Execute;
use crate::error::BuildError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct WaitArgs {
    duration: f64,
}

pub struct Wait {
    gate: Gate,
    duration: Duration,
}

pub fn build(ctx: &BuildCtx<'_>, spec: &NodeSpec) -> Result<Box<dyn Execute>, BuildError> {
    let args: WaitArgs =
        serde_json::from_value(spec.args.clone()).map_err(|source| BuildError::BadArgs {
            command: ctx.command.to_string(),
            tag: spec.tag.clone(),
            source,
        })?;
    if args.duration < 0.0 {
        return Err(BuildError::invalid(ctx.command, "'duration' must be zero or greater"));
    }
    Ok(Box::new(Wait {
        gate: ctx.catalog.build_gate(ctx, &spec.allows)?,
        duration: Duration::from_secs_f64(args.duration),
    }))
}

#[async_trait]
impl Execute for Wait {
    async fn execute(&mut self, user: &User, _args: &[String]) -> Outcome {
        if !self.gate.permit(user) {
            return Outcome::failed_allows();
        }
        tokio::time::sleep(self.duration).await;
        Outcome::success(Vec::new())
    }
}
