//! The Twitch chat connection.
//!
//! Connects to Twitch's IRC-over-WebSocket endpoint, joins one
//! channel, and turns tagged PRIVMSG lines into [`ChatEvent`]s on an
//! mpsc channel, the single queue the dispatch loop consumes. That
//! queue is what serializes command execution.

use super::api::HelixApi;
use super::message::{self, Line};
use super::ChatError;
use crate::actions::{BackendError, ChatSink};
use crate::engine::User;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

const TWITCH_CHAT_URL: &str = "wss://irc-ws.chat.twitch.tv:443";

/// One chat message from the joined channel.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub user: User,
    pub text: String,
}

/// Handle to the chat connection; cheap to clone behind an `Arc`.
pub struct TwitchChat {
    outbound: mpsc::Sender<String>,
    channel: String,
}

impl TwitchChat {
    /// Connect, authenticate, join the channel, and spawn the socket
    /// driver. Returns the handle and the event stream.
    pub async fn connect(
        channel: &str,
        nick: &str,
        token: &str,
        api: Option<HelixApi>,
    ) -> Result<(Self, mpsc::Receiver<ChatEvent>), ChatError> {
        let channel = format!("#{}", channel.trim_start_matches('#'));
        let pass = if token.starts_with("oauth:") {
            token.to_string()
        } else {
            format!("oauth:{token}")
        };

        let (stream, _) = tokio_tungstenite::connect_async(TWITCH_CHAT_URL).await?;
        let (mut sink, mut source) = stream.split();

        for line in [
            "CAP REQ :twitch.tv/tags twitch.tv/commands".to_string(),
            format!("PASS {pass}"),
            format!("NICK {nick}"),
            format!("JOIN {channel}"),
        ] {
            sink.send(WsMessage::Text(line)).await?;
        }
        info!(channel = %channel, nick = %nick, "joining twitch chat");

        let (outbound, mut outbound_rx) = mpsc::channel::<String>(64);
        let (events_tx, events_rx) = mpsc::channel::<ChatEvent>(256);

        tokio::spawn(async move {
            'driver: loop {
                tokio::select! {
                    queued = outbound_rx.recv() => match queued {
                        Some(line) => {
                            if let Err(err) = sink.send(WsMessage::Text(line)).await {
                                warn!(error = %err, "chat send failed");
                                break 'driver;
                            }
                        }
                        None => break 'driver,
                    },
                    frame = source.next() => match frame {
                        Some(Ok(WsMessage::Text(text))) => {
                            for raw in text.split("\r\n") {
                                let Some(line) = message::parse(raw) else { continue };
                                match line.command.as_str() {
                                    "PING" => {
                                        let payload = line.params.first().cloned().unwrap_or_default();
                                        if sink
                                            .send(WsMessage::Text(format!("PONG :{payload}")))
                                            .await
                                            .is_err()
                                        {
                                            break 'driver;
                                        }
                                    }
                                    "PRIVMSG" => {
                                        if let Some(event) = chat_event(&line, api.as_ref()).await
                                            && events_tx.send(event).await.is_err()
                                        {
                                            break 'driver;
                                        }
                                    }
                                    _ => debug!(command = %line.command, "ignoring chat line"),
                                }
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            warn!(error = %err, "chat read failed");
                            break 'driver;
                        }
                        None => break 'driver,
                    },
                }
            }
            info!("twitch chat connection closed");
        });

        Ok((Self { outbound, channel }, events_rx))
    }
}

/// Build a [`ChatEvent`] from a PRIVMSG line, resolving follower
/// status through Helix when a client is available.
async fn chat_event(line: &Line, api: Option<&HelixApi>) -> Option<ChatEvent> {
    let text = line.params.get(1)?.clone();
    let mut user = user_from_line(line)?;

    if let (Some(api), Some(user_id), Some(room_id)) =
        (api, line.tag("user-id"), line.tag("room-id"))
    {
        user.follower = match api.is_follower(user_id, room_id).await {
            Ok(follower) => follower,
            Err(err) => {
                warn!(error = %err, user = %user.username, "follower lookup failed");
                false
            }
        };
    }

    Some(ChatEvent { user, text })
}

/// Status flags from message tags. Follower status is not in the
/// tags; the caller fills it in.
fn user_from_line(line: &Line) -> Option<User> {
    let username = line.nick()?.to_string();
    let mut user = User::new(username);
    user.broadcaster = line.has_badge("broadcaster");
    user.moderator = line.has_badge("moderator") || line.tag("mod") == Some("1");
    user.subscriber = line.has_badge("subscriber") || line.tag("subscriber") == Some("1");
    Some(user)
}

#[async_trait]
impl ChatSink for TwitchChat {
    async fn say(&self, text: &str) -> Result<(), BackendError> {
        self.outbound
            .send(format!("PRIVMSG {} :{}", self.channel, text))
            .await
            .map_err(|_| BackendError("chat connection closed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_flags_come_from_badges_and_tags() {
        let line = message::parse(
            "@badges=broadcaster/1;mod=0;subscriber=0 \
             :boss!boss@boss.tmi.twitch.tv PRIVMSG #c :!hi",
        )
        .unwrap();
        let user = user_from_line(&line).unwrap();
        assert_eq!(user.username, "boss");
        assert!(user.broadcaster);
        assert!(!user.moderator);

        let line = message::parse(
            "@badges=;mod=1;subscriber=1 :m!m@m.tmi.twitch.tv PRIVMSG #c :!hi",
        )
        .unwrap();
        let user = user_from_line(&line).unwrap();
        assert!(user.moderator);
        assert!(user.subscriber);
        assert!(!user.broadcaster);
    }
}
