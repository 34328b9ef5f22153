//! The uniform outcome value returned by every executable node.
//!
//! Composite executors nest child outcomes inside their own message
//! list, so the outcome of a dispatch mirrors the executor tree and a
//! failing step can be located after the fact.

/// Terminal state of one `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Success,
    Failure,
}

/// One entry in an outcome's message list: free text or the outcome
/// of a child node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text(String),
    Nested(Outcome),
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text(text.into())
    }
}

/// Result of executing a command, executor, or action.
///
/// Runtime evaluation never returns `Err`: permission denials, votes
/// still pending, and backend failures are all expressed as a
/// `Failure` outcome with diagnostic messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub state: State,
    pub messages: Vec<Message>,
}

impl Outcome {
    pub fn success(messages: Vec<Message>) -> Self {
        Self { state: State::Success, messages }
    }

    pub fn failure(messages: Vec<Message>) -> Self {
        Self { state: State::Failure, messages }
    }

    /// The fixed denial outcome for a gate that did not permit.
    ///
    /// Deliberately does not say which gate failed.
    pub fn failed_allows() -> Self {
        Self::failure(vec![Message::text("Failed allows")])
    }

    pub fn is_success(&self) -> bool {
        self.state == State::Success
    }

    /// Child outcomes nested directly under this one, in order.
    pub fn children(&self) -> impl Iterator<Item = &Outcome> {
        self.messages.iter().filter_map(|m| match m {
            Message::Nested(o) => Some(o),
            Message::Text(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_allows_is_opaque() {
        let outcome = Outcome::failed_allows();
        assert_eq!(outcome.state, State::Failure);
        assert_eq!(outcome.messages, vec![Message::text("Failed allows")]);
    }

    #[test]
    fn children_skips_text_messages() {
        let outcome = Outcome::success(vec![
            Message::text("note"),
            Message::Nested(Outcome::success(vec![])),
            Message::Nested(Outcome::failure(vec![])),
        ]);
        assert_eq!(outcome.children().count(), 2);
        assert!(outcome.children().next().unwrap().is_success());
    }
}
