//! Configuration loading and management.

use crate::engine::CommandsSpec;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to parse commands file: {0}")]
    Commands(#[from] serde_json::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Twitch chat connection.
    pub twitch: TwitchConfig,
    /// OBS websocket connection.
    pub obs: ObsConfig,
    /// Path to the command definitions file.
    #[serde(default = "default_commands_file")]
    pub commands_file: PathBuf,
}

/// Twitch connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitchConfig {
    /// Channel to join (with or without the leading '#').
    pub channel: String,
    /// Bot account login.
    pub nick: String,
    /// OAuth token for the bot account.
    pub token: String,
    /// App client id for Helix lookups; without it, follower status
    /// is never resolved and the FOLLOWER tier behaves like a miss.
    #[serde(default)]
    pub client_id: Option<String>,
}

/// OBS websocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObsConfig {
    /// Websocket URL (e.g., "ws://localhost:4455").
    #[serde(default = "default_obs_url")]
    pub url: String,
    /// Password, if obs-websocket authentication is enabled.
    #[serde(default)]
    pub password: Option<String>,
}

fn default_commands_file() -> PathBuf {
    PathBuf::from("commands.json")
}

fn default_obs_url() -> String {
    "ws://localhost:4455".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Load command definitions from a JSON file.
pub fn load_commands<P: AsRef<Path>>(path: P) -> Result<CommandsSpec, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(CommandsSpec::parse(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn loads_a_minimal_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[twitch]\nchannel = \"streamer\"\nnick = \"cuebot\"\ntoken = \"oauth:abc\"\n\n[obs]\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.twitch.channel, "streamer");
        assert_eq!(config.obs.url, "ws://localhost:4455");
        assert_eq!(config.commands_file, PathBuf::from("commands.json"));
    }

    #[test]
    fn commands_file_must_have_a_commands_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"commands\": []}}").unwrap();
        assert!(load_commands(file.path()).unwrap().commands.is_empty());

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "{{}}").unwrap();
        assert!(matches!(load_commands(bad.path()), Err(ConfigError::Commands(_))));
    }
}
