//! A named, aliasable, gated entry point bound to one executor tree.

use super::outcome::{Message, Outcome};
use super::user::User;
use super::{Allow, Execute};
use tracing::debug;

/// A chat command: name, aliases, a command-level gate, and the
/// executor tree that runs when the gate permits.
///
/// The command-level gate fails closed: a command with no allows is
/// never permitted, for anyone. Leaf actions inside the tree default
/// the other way (see [`Gate`]); a command must always be explicitly
/// gated while its inner steps run under the command's protection.
///
/// [`Gate`]: super::gate::Gate
pub struct Command {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    allows: Vec<Box<dyn Allow>>,
    executor: Box<dyn Execute>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("aliases", &self.aliases)
            .field("allows", &self.allows.len())
            .finish_non_exhaustive()
    }
}

impl Command {
    pub fn new(
        name: String,
        description: String,
        aliases: Vec<String>,
        allows: Vec<Box<dyn Allow>>,
        executor: Box<dyn Execute>,
    ) -> Self {
        Self { name, description, aliases, allows, executor }
    }

    /// Every key this command is reachable under: its name plus all
    /// aliases.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Gate, tokenize, delegate.
    pub async fn execute(&mut self, user: &User, raw_args: Option<&str>) -> Outcome {
        if !self.permit(user) {
            debug!(command = %self.name, user = %user.username, "denied");
            return Outcome::failed_allows();
        }

        let args = match raw_args {
            Some(raw) => match tokenize(raw) {
                Ok(args) => args,
                Err(detail) => return Outcome::failure(vec![Message::Text(detail)]),
            },
            None => Vec::new(),
        };

        self.executor.execute(user, &args).await
    }

    fn permit(&mut self, user: &User) -> bool {
        // Fail closed: no allows means no one may run this
        if self.allows.is_empty() {
            return false;
        }
        self.allows.iter_mut().all(|allow| allow.permit(user))
    }
}

/// Split a raw argument string into tokens, shell-style.
///
/// Whitespace separates tokens; single- or double-quoted stretches
/// join into one token with the quotes stripped. Quotes may open
/// mid-token (`a"b c"d` is one token `ab cd`).
fn tokenize(input: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err("unbalanced quote in arguments".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
