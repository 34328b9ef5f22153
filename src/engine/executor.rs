//! Composite execution strategies.
//!
//! Two strategies over an ordered child list. `ExecuteAll` runs every
//! child per invocation and stops at the first failure. `ExecuteGated`
//! runs exactly one child per invocation, round-robin: a failing child
//! is retried in place on the next invocation, a successful child sits
//! out until the whole cycle has completed. Gating is what lets a
//! toggle-style command alternate strictly on/off no matter how often
//! chat spams it.

use super::outcome::{Message, Outcome};
use super::user::User;
use super::Execute;
use async_trait::async_trait;
use std::collections::VecDeque;

/// Runs every child in declared order, short-circuiting on failure.
pub struct ExecuteAll {
    children: Vec<Box<dyn Execute>>,
}

impl ExecuteAll {
    pub fn new(children: Vec<Box<dyn Execute>>) -> Self {
        Self { children }
    }
}

#[async_trait]
impl Execute for ExecuteAll {
    async fn execute(&mut self, user: &User, args: &[String]) -> Outcome {
        let mut messages = Vec::with_capacity(self.children.len());
        for child in &mut self.children {
            let result = child.execute(user, args).await;
            let failed = !result.is_success();
            messages.push(Message::Nested(result));
            if failed {
                return Outcome::failure(messages);
            }
        }
        Outcome::success(messages)
    }
}

/// Runs exactly one child per invocation, round-robin.
///
/// Children not yet run this cycle wait in `pending`; children that
/// have succeeded sit in `done` until the cycle completes, at which
/// point `done` refills `pending` in the original relative order.
/// Both queues together always hold every child exactly once.
pub struct ExecuteGated {
    pending: VecDeque<Box<dyn Execute>>,
    done: Vec<Box<dyn Execute>>,
}

impl ExecuteGated {
    pub fn new(children: Vec<Box<dyn Execute>>) -> Self {
        Self {
            pending: children.into(),
            done: Vec::new(),
        }
    }
}

#[async_trait]
impl Execute for ExecuteGated {
    async fn execute(&mut self, user: &User, args: &[String]) -> Outcome {
        if self.pending.is_empty() {
            if self.done.is_empty() {
                // No children at all
                return Outcome::success(Vec::new());
            }
            // Cycle completed last call; start the next one
            self.pending.extend(self.done.drain(..));
        }

        let Some(mut selected) = self.pending.pop_front() else {
            return Outcome::success(Vec::new());
        };

        let result = selected.execute(user, args).await;
        let succeeded = result.is_success();
        // A nested executor mid-cycle keeps the head position even on
        // success; only a leaf or a fully-cycled executor moves on.
        let finished = selected.pending() == 0;
        let state = result.state;
        let outcome = Outcome { state, messages: vec![Message::Nested(result)] };

        if succeeded && finished {
            self.done.push(selected);
        } else {
            self.pending.push_front(selected);
        }

        outcome
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::outcome::State;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Leaf whose outcome is flipped by the test and whose calls are
    /// counted.
    struct Probe {
        succeed: Arc<AtomicBool>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Execute for Probe {
        async fn execute(&mut self, _user: &User, _args: &[String]) -> Outcome {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.succeed.load(Ordering::Relaxed) {
                Outcome::success(Vec::new())
            } else {
                Outcome::failure(Vec::new())
            }
        }
    }

    fn probe(succeed: bool) -> (Box<dyn Execute>, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let flag = Arc::new(AtomicBool::new(succeed));
        let leaf = Probe {
            succeed: Arc::clone(&flag),
            calls: Arc::clone(&calls),
        };
        (Box::new(leaf), calls, flag)
    }

    fn user() -> User {
        User::new("viewer")
    }

    #[tokio::test]
    async fn all_runs_every_child_in_order() {
        let (a, a_calls, _) = probe(true);
        let (b, b_calls, _) = probe(true);
        let mut executor = ExecuteAll::new(vec![a, b]);

        let outcome = executor.execute(&user(), &[]).await;
        assert_eq!(outcome.state, State::Success);
        assert_eq!(outcome.messages.len(), 2);
        assert_eq!(a_calls.load(Ordering::Relaxed), 1);
        assert_eq!(b_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn all_stops_at_first_failure() {
        let (a, a_calls, _) = probe(true);
        let (b, b_calls, _) = probe(true);
        let (c, c_calls, _) = probe(false);
        let (d, d_calls, _) = probe(true);
        let mut executor = ExecuteAll::new(vec![a, b, c, d]);

        let outcome = executor.execute(&user(), &[]).await;
        assert_eq!(outcome.state, State::Failure);
        assert_eq!(outcome.messages.len(), 3);
        assert_eq!(a_calls.load(Ordering::Relaxed), 1);
        assert_eq!(b_calls.load(Ordering::Relaxed), 1);
        assert_eq!(c_calls.load(Ordering::Relaxed), 1);
        assert_eq!(d_calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn gated_runs_one_child_per_call_and_cycles() {
        let (a, a_calls, _) = probe(true);
        let (b, b_calls, _) = probe(true);
        let (c, c_calls, _) = probe(true);
        let mut executor = ExecuteGated::new(vec![a, b, c]);

        for expected in [(1, 0, 0), (1, 1, 0), (1, 1, 1), (2, 1, 1)] {
            let outcome = executor.execute(&user(), &[]).await;
            assert_eq!(outcome.state, State::Success);
            assert_eq!(outcome.messages.len(), 1);
            assert_eq!(a_calls.load(Ordering::Relaxed), expected.0);
            assert_eq!(b_calls.load(Ordering::Relaxed), expected.1);
            assert_eq!(c_calls.load(Ordering::Relaxed), expected.2);
        }
    }

    #[tokio::test]
    async fn gated_retries_a_failing_child_in_place() {
        let (a, a_calls, _) = probe(true);
        let (b, b_calls, b_flag) = probe(false);
        let (c, c_calls, _) = probe(true);
        let mut executor = ExecuteGated::new(vec![a, b, c]);

        assert!(executor.execute(&user(), &[]).await.is_success());
        assert_eq!(a_calls.load(Ordering::Relaxed), 1);

        // b blocks the cycle until it succeeds
        for attempt in 1..=3 {
            let outcome = executor.execute(&user(), &[]).await;
            assert_eq!(outcome.state, State::Failure);
            assert_eq!(b_calls.load(Ordering::Relaxed), attempt);
            assert_eq!(c_calls.load(Ordering::Relaxed), 0);
        }

        b_flag.store(true, Ordering::Relaxed);
        assert!(executor.execute(&user(), &[]).await.is_success());
        assert_eq!(b_calls.load(Ordering::Relaxed), 4);

        // c runs next, then the cycle restarts at a
        assert!(executor.execute(&user(), &[]).await.is_success());
        assert_eq!(c_calls.load(Ordering::Relaxed), 1);
        assert!(executor.execute(&user(), &[]).await.is_success());
        assert_eq!(a_calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn gated_holds_a_nested_gated_child_until_its_cycle_completes() {
        let (a, a_calls, _) = probe(true);
        let (inner_one, inner_one_calls, _) = probe(true);
        let (inner_two, inner_two_calls, _) = probe(true);
        let (c, c_calls, _) = probe(true);
        let nested = Box::new(ExecuteGated::new(vec![inner_one, inner_two]));
        let mut executor = ExecuteGated::new(vec![a, nested, c]);

        // a, then both inner steps, then c, then back to a
        let expectations = [
            (1, 0, 0, 0),
            (1, 1, 0, 0),
            (1, 1, 1, 0),
            (1, 1, 1, 1),
            (2, 1, 1, 1),
            (2, 2, 1, 1),
        ];
        for expected in expectations {
            let outcome = executor.execute(&user(), &[]).await;
            assert_eq!(outcome.state, State::Success);
            assert_eq!(a_calls.load(Ordering::Relaxed), expected.0);
            assert_eq!(inner_one_calls.load(Ordering::Relaxed), expected.1);
            assert_eq!(inner_two_calls.load(Ordering::Relaxed), expected.2);
            assert_eq!(c_calls.load(Ordering::Relaxed), expected.3);
        }
    }

    #[tokio::test]
    async fn gated_with_no_children_is_a_noop() {
        let mut executor = ExecuteGated::new(Vec::new());
        let outcome = executor.execute(&user(), &[]).await;
        assert_eq!(outcome.state, State::Success);
        assert!(outcome.messages.is_empty());
    }
}
