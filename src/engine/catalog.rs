//! Declarative command definitions and the type-tag catalog.
//!
//! Command definitions are trees of `{type, args}` nodes. The catalog
//! maps each type tag to a constructor in one of three categories
//! (allow, action, executor), populated by explicit registration at
//! startup. When an `execute` node could name either, executors are
//! tried before actions.

use super::allow::{UserStatusAllow, VotingAllow, WhitelistAllow};
use super::command::Command;
use super::executor::{ExecuteAll, ExecuteGated};
use super::gate::Gate;
use super::{Allow, Execute};
use crate::actions;
use crate::actions::{ChatSink, ObsControl};
use crate::error::BuildError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// External collaborators handed to action constructors.
#[derive(Clone)]
pub struct Services {
    pub obs: Arc<dyn ObsControl>,
    pub chat: Arc<dyn ChatSink>,
}

/// One `{type, args}` node in a command definition.
///
/// Leaf action nodes may carry their own `allows`; executors and
/// allow specs leave it empty.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    #[serde(rename = "type")]
    pub tag: String,
    pub args: Value,
    #[serde(default)]
    pub allows: Vec<NodeSpec>,
}

/// A full command definition.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub allows: OneOrMany,
    pub execute: NodeSpec,
}

/// The `commands` list that `load` and `reload` consume.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandsSpec {
    pub commands: Vec<CommandSpec>,
}

impl CommandsSpec {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// An allow spec may be written as one node or a list of nodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(NodeSpec),
    Many(Vec<NodeSpec>),
}

impl OneOrMany {
    pub fn as_slice(&self) -> &[NodeSpec] {
        match self {
            OneOrMany::One(spec) => std::slice::from_ref(spec),
            OneOrMany::Many(specs) => specs,
        }
    }
}

/// Context threaded through constructors while one command builds.
pub struct BuildCtx<'a> {
    /// Name of the enclosing command, for diagnostics.
    pub command: &'a str,
    pub services: &'a Services,
    pub catalog: &'a Catalog,
}

type AllowCtor =
    Box<dyn Fn(&BuildCtx<'_>, &NodeSpec) -> Result<Box<dyn Allow>, BuildError> + Send + Sync>;
type NodeCtor =
    Box<dyn Fn(&BuildCtx<'_>, &NodeSpec) -> Result<Box<dyn Execute>, BuildError> + Send + Sync>;

/// Maps type tags to constructors, one namespace per category.
pub struct Catalog {
    allows: HashMap<String, AllowCtor>,
    actions: HashMap<String, NodeCtor>,
    executors: HashMap<String, NodeCtor>,
}

impl Catalog {
    /// An empty catalog. Tests register their own types here.
    pub fn new() -> Self {
        Self {
            allows: HashMap::new(),
            actions: HashMap::new(),
            executors: HashMap::new(),
        }
    }

    /// The standard catalog with every shipped allow, action, and
    /// executor registered.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        catalog.register_allow("UserStatus", |ctx, spec| {
            Ok(Box::new(UserStatusAllow::from_args(ctx.command, &spec.args)?))
        });
        catalog.register_allow("Voting", |ctx, spec| {
            Ok(Box::new(VotingAllow::from_args(ctx.command, &spec.args)?))
        });
        catalog.register_allow("Whitelist", |ctx, spec| {
            Ok(Box::new(WhitelistAllow::from_args(ctx.command, &spec.args)?))
        });

        catalog.register_executor("ExecuteAll", |ctx, spec| {
            Ok(Box::new(ExecuteAll::new(build_children(ctx, spec)?)))
        });
        catalog.register_executor("ExecuteGated", |ctx, spec| {
            Ok(Box::new(ExecuteGated::new(build_children(ctx, spec)?)))
        });

        catalog.register_action("Say", actions::say::build);
        catalog.register_action("SetScene", actions::scene::build);
        catalog.register_action("ShowSource", actions::source::build_show);
        catalog.register_action("HideSource", actions::source::build_hide);
        catalog.register_action("ShowSceneItem", actions::scene_item::build);
        catalog.register_action("Wait", actions::wait::build);

        catalog
    }

    pub fn register_allow(
        &mut self,
        tag: &str,
        ctor: impl Fn(&BuildCtx<'_>, &NodeSpec) -> Result<Box<dyn Allow>, BuildError>
        + Send
        + Sync
        + 'static,
    ) {
        self.allows.insert(tag.to_string(), Box::new(ctor));
    }

    pub fn register_action(
        &mut self,
        tag: &str,
        ctor: impl Fn(&BuildCtx<'_>, &NodeSpec) -> Result<Box<dyn Execute>, BuildError>
        + Send
        + Sync
        + 'static,
    ) {
        self.actions.insert(tag.to_string(), Box::new(ctor));
    }

    pub fn register_executor(
        &mut self,
        tag: &str,
        ctor: impl Fn(&BuildCtx<'_>, &NodeSpec) -> Result<Box<dyn Execute>, BuildError>
        + Send
        + Sync
        + 'static,
    ) {
        self.executors.insert(tag.to_string(), Box::new(ctor));
    }

    /// Resolve and construct an allow node.
    pub fn build_allow(
        &self,
        ctx: &BuildCtx<'_>,
        spec: &NodeSpec,
    ) -> Result<Box<dyn Allow>, BuildError> {
        let ctor = self.allows.get(&spec.tag).ok_or_else(|| BuildError::UnknownType {
            command: ctx.command.to_string(),
            category: "allow",
            tag: spec.tag.clone(),
        })?;
        ctor(ctx, spec)
    }

    /// Resolve and construct an executable node.
    ///
    /// Executor tags shadow action tags: a tag present in both
    /// namespaces resolves to the executor.
    pub fn build_node(
        &self,
        ctx: &BuildCtx<'_>,
        spec: &NodeSpec,
    ) -> Result<Box<dyn Execute>, BuildError> {
        if let Some(ctor) = self.executors.get(&spec.tag) {
            return ctor(ctx, spec);
        }
        if let Some(ctor) = self.actions.get(&spec.tag) {
            return ctor(ctx, spec);
        }
        Err(BuildError::UnknownType {
            command: ctx.command.to_string(),
            category: "action or executor",
            tag: spec.tag.clone(),
        })
    }

    /// Build the gate for a leaf action from its `allows` list.
    pub fn build_gate(&self, ctx: &BuildCtx<'_>, specs: &[NodeSpec]) -> Result<Gate, BuildError> {
        let allows = specs
            .iter()
            .map(|spec| self.build_allow(ctx, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Gate::new(allows))
    }

    /// Build one full command from its definition.
    pub fn build_command(
        &self,
        spec: &CommandSpec,
        services: &Services,
    ) -> Result<Command, BuildError> {
        let ctx = BuildCtx { command: &spec.name, services, catalog: self };

        let allows = spec
            .allows
            .as_slice()
            .iter()
            .map(|allow_spec| self.build_allow(&ctx, allow_spec))
            .collect::<Result<Vec<_>, _>>()?;

        let executor = self.build_node(&ctx, &spec.execute)?;

        Ok(Command::new(
            spec.name.clone(),
            spec.description.clone(),
            spec.aliases.clone(),
            allows,
            executor,
        ))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct ExecutorArgs {
    actions: Vec<NodeSpec>,
}

/// Parse an executor's `{actions: [...]}` args and build each child.
fn build_children(
    ctx: &BuildCtx<'_>,
    spec: &NodeSpec,
) -> Result<Vec<Box<dyn Execute>>, BuildError> {
    let args: ExecutorArgs =
        serde_json::from_value(spec.args.clone()).map_err(|source| BuildError::BadArgs {
            command: ctx.command.to_string(),
            tag: spec.tag.clone(),
            source,
        })?;
    args.actions
        .iter()
        .map(|child| ctx.catalog.build_node(ctx, child))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_spec_accepts_single_or_list_allows() {
        let single: CommandSpec = serde_json::from_value(json!({
            "name": "solo",
            "allows": {"type": "UserStatus", "args": {"min_status": "EVERYONE"}},
            "execute": {"type": "Say", "args": {"messages": ["hi"]}},
        }))
        .unwrap();
        assert_eq!(single.allows.as_slice().len(), 1);

        let many: CommandSpec = serde_json::from_value(json!({
            "name": "multi",
            "allows": [
                {"type": "UserStatus", "args": {"min_status": "EVERYONE"}},
                {"type": "Voting", "args": {"min_votes": 2}},
            ],
            "execute": {"type": "Say", "args": {"messages": ["hi"]}},
        }))
        .unwrap();
        assert_eq!(many.allows.as_slice().len(), 2);
    }

    #[test]
    fn node_spec_requires_args() {
        let missing: Result<NodeSpec, _> =
            serde_json::from_value(json!({"type": "ExecuteAll"}));
        assert!(missing.is_err());
    }

    #[test]
    fn commands_spec_requires_the_commands_key() {
        assert!(CommandsSpec::parse("{}").is_err());
        assert!(CommandsSpec::parse("{\"commands\": []}").unwrap().commands.is_empty());
    }
}
