//! Command engine: gates, actions, executors, commands, registry.
//!
//! The engine turns declarative command definitions (see
//! [`catalog::CommandSpec`]) into live, stateful, re-executable
//! commands. Two node contracts hold the whole tree together:
//!
//! - [`Allow`]: a predicate gate over a [`User`]. Stateful variants
//!   (vote accumulators) advance their state inside `permit`; the
//!   call that answers is the call that tallies.
//! - [`Execute`]: anything that can run, leaf action or composite
//!   executor, returning the uniform [`Outcome`] value.
//!
//! One chat event is processed to completion before the next; every
//! command lives behind its own async mutex so its vote sets and
//! gating cursors are never touched concurrently.

pub mod allow;
pub mod catalog;
pub mod command;
pub mod executor;
pub mod gate;
pub mod outcome;
pub mod permission;
pub mod registry;
pub mod user;

pub use allow::{UserStatusAllow, VotingAllow, WhitelistAllow};
pub use catalog::{BuildCtx, Catalog, CommandSpec, CommandsSpec, NodeSpec, Services};
pub use command::Command;
pub use executor::{ExecuteAll, ExecuteGated};
pub use gate::Gate;
pub use outcome::{Message, Outcome, State};
pub use permission::Permission;
pub use registry::CommandRegistry;
pub use user::User;

use async_trait::async_trait;

/// A predicate gate evaluated against the triggering user.
///
/// Implementations may be stateful; `permit` takes `&mut self` so a
/// vote accumulator can record the caller in the same call that
/// reports the decision.
pub trait Allow: Send {
    fn permit(&mut self, user: &User) -> bool;
}

/// An executable node: a leaf action or a composite executor.
#[async_trait]
pub trait Execute: Send {
    /// Run this node for one dispatch and report the outcome.
    ///
    /// Never returns an error: denials and side-effect failures are
    /// `Failure` outcomes.
    async fn execute(&mut self, user: &User, args: &[String]) -> Outcome;

    /// Children not yet run in the node's current gating cycle.
    ///
    /// Leaves and cycle-free executors report zero. A gated executor
    /// reports its pending-queue length, which is how an enclosing
    /// gated executor knows to hold it at the head of its own queue
    /// until the inner cycle completes.
    fn pending(&self) -> usize {
        0
    }
}
