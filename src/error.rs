//! Command construction errors.
//!
//! Everything that can go wrong while turning a command definition
//! into a live command surfaces here, at build time. By the time a
//! command sits in the active registry it is structurally valid, and
//! runtime evaluation reports outcomes through [`Outcome`] values
//! instead of errors.
//!
//! [`Outcome`]: crate::engine::Outcome

use thiserror::Error;

/// A command definition could not be built.
///
/// Every variant names the enclosing command so a broken entry in a
/// large commands file can be found from the log line alone.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("command '{command}': unknown {category} type '{tag}'")]
    UnknownType {
        command: String,
        category: &'static str,
        tag: String,
    },

    #[error("command '{command}': bad args for '{tag}': {source}")]
    BadArgs {
        command: String,
        tag: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("command '{command}': {detail}")]
    Invalid { command: String, detail: String },
}

impl BuildError {
    pub fn invalid(command: &str, detail: impl Into<String>) -> Self {
        Self::Invalid {
            command: command.to_string(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_command() {
        let err = BuildError::UnknownType {
            command: "showscene".into(),
            category: "action",
            tag: "NoSuchAction".into(),
        };
        let text = err.to_string();
        assert!(text.contains("showscene"));
        assert!(text.contains("NoSuchAction"));
    }
}
