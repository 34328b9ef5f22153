//! Shared gate plumbing for leaf actions.

use super::user::User;
use super::Allow;

/// The ordered allow set owned by a leaf action.
///
/// Evaluation is an AND over the allows in declaration order,
/// stopping at the first refusal. An empty gate permits: a leaf
/// inside an already-gated command defaults open, unlike the
/// command-level gate which fails closed when empty.
#[derive(Default)]
pub struct Gate {
    allows: Vec<Box<dyn Allow>>,
}

impl Gate {
    pub fn new(allows: Vec<Box<dyn Allow>>) -> Self {
        Self { allows }
    }

    pub fn permit(&mut self, user: &User) -> bool {
        self.allows.iter_mut().all(|allow| allow.permit(user))
    }

    pub fn is_empty(&self) -> bool {
        self.allows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        verdict: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Allow for Scripted {
        fn permit(&mut self, _user: &User) -> bool {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.verdict
        }
    }

    fn scripted(verdict: bool) -> (Box<dyn Allow>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Scripted { verdict, calls: Arc::clone(&calls) }),
            calls,
        )
    }

    #[test]
    fn empty_gate_permits() {
        let mut gate = Gate::default();
        assert!(gate.permit(&User::new("anyone")));
    }

    #[test]
    fn evaluation_short_circuits_at_first_refusal() {
        let (first, first_calls) = scripted(true);
        let (second, second_calls) = scripted(false);
        let (third, third_calls) = scripted(true);

        let mut gate = Gate::new(vec![first, second, third]);
        assert!(!gate.permit(&User::new("anyone")));

        assert_eq!(first_calls.load(Ordering::Relaxed), 1);
        assert_eq!(second_calls.load(Ordering::Relaxed), 1);
        assert_eq!(third_calls.load(Ordering::Relaxed), 0);
    }
}
