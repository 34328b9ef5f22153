//! IRCv3 line parsing for the Twitch chat dialect.
//!
//! Twitch speaks tagged IRC over a websocket; each text frame holds
//! one or more CRLF-terminated lines. Parsing here is pure so it can
//! be tested without a socket.

use std::collections::HashMap;

/// One parsed IRC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub tags: HashMap<String, String>,
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl Line {
    /// Nick portion of the prefix (`nick!user@host`).
    pub fn nick(&self) -> Option<&str> {
        self.prefix.as_deref().map(|p| match p.split_once('!') {
            Some((nick, _)) => nick,
            None => p,
        })
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Whether the `badges` tag carries a badge of the given kind.
    pub fn has_badge(&self, kind: &str) -> bool {
        self.tag("badges")
            .map(|badges| {
                badges
                    .split(',')
                    .any(|badge| badge.split('/').next() == Some(kind))
            })
            .unwrap_or(false)
    }
}

/// Parse one IRC line. Returns `None` for empty input.
pub fn parse(line: &str) -> Option<Line> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return None;
    }

    let mut rest = line;
    let mut tags = HashMap::new();
    if let Some(tagged) = rest.strip_prefix('@') {
        let (raw_tags, remainder) = tagged.split_once(' ')?;
        for pair in raw_tags.split(';') {
            match pair.split_once('=') {
                Some((key, value)) => tags.insert(key.to_string(), unescape_tag(value)),
                None => tags.insert(pair.to_string(), String::new()),
            };
        }
        rest = remainder;
    }

    let mut prefix = None;
    if let Some(prefixed) = rest.strip_prefix(':') {
        let (raw_prefix, remainder) = prefixed.split_once(' ')?;
        prefix = Some(raw_prefix.to_string());
        rest = remainder;
    }

    let mut params = Vec::new();
    let command;
    match rest.split_once(' ') {
        Some((cmd, mut tail)) => {
            command = cmd.to_string();
            loop {
                if let Some(trailing) = tail.strip_prefix(':') {
                    params.push(trailing.to_string());
                    break;
                }
                match tail.split_once(' ') {
                    Some((param, remainder)) => {
                        if !param.is_empty() {
                            params.push(param.to_string());
                        }
                        tail = remainder;
                    }
                    None => {
                        if !tail.is_empty() {
                            params.push(tail.to_string());
                        }
                        break;
                    }
                }
            }
        }
        None => command = rest.to_string(),
    }

    Some(Line { tags, prefix, command, params })
}

/// Undo IRCv3 tag-value escaping.
fn unescape_tag(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => out.push(other),
            None => break,
        }
    }
    out
}
