//! cuebotd: chat-driven automation cues for live streaming.

use cuebot::bot::Bot;
use cuebot::config::{self, Config};
use cuebot::engine::{Catalog, CommandRegistry, Services};
use cuebot::obs::ObsClient;
use cuebot::twitch::{HelixApi, TwitchChat};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "cuebot.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        channel = %config.twitch.channel,
        obs = %config.obs.url,
        "Starting cuebotd"
    );

    // Connect to OBS
    let obs = ObsClient::connect(&config.obs.url, config.obs.password.as_deref()).await?;

    // Connect to Twitch chat
    let api = config
        .twitch
        .client_id
        .clone()
        .map(|client_id| HelixApi::new(client_id, config.twitch.token.clone()));
    let (chat, events) = TwitchChat::connect(
        &config.twitch.channel,
        &config.twitch.nick,
        &config.twitch.token,
        api,
    )
    .await?;
    let chat = Arc::new(chat);

    // Build the command registry from the commands file
    let services = Services {
        obs: Arc::new(obs),
        chat: chat.clone(),
    };
    let registry = Arc::new(CommandRegistry::new(Catalog::builtin(), services));

    let spec = config::load_commands(&config.commands_file).map_err(|e| {
        error!(path = %config.commands_file.display(), error = %e, "Failed to load commands");
        e
    })?;
    registry.load(&spec)?;

    // Run the dispatch loop until the chat connection drops
    let bot = Bot::new(registry, chat, config.commands_file.clone());
    bot.run(events).await;

    Ok(())
}
