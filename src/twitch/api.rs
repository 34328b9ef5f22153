//! Helix API lookups.
//!
//! Chat tags carry moderator/subscriber/broadcaster status but not
//! follower status; that takes a Helix call per message. Lookup
//! failures degrade to "not a follower" at the call site.

use serde::Deserialize;

const HELIX_FOLLOWERS_URL: &str = "https://api.twitch.tv/helix/channels/followers";

/// Minimal Helix client for follower checks.
pub struct HelixApi {
    http: reqwest::Client,
    client_id: String,
    token: String,
}

#[derive(Deserialize)]
struct FollowersResponse {
    data: Vec<serde_json::Value>,
}

impl HelixApi {
    pub fn new(client_id: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            token,
        }
    }

    /// Whether `user_id` follows `broadcaster_id`.
    pub async fn is_follower(
        &self,
        user_id: &str,
        broadcaster_id: &str,
    ) -> Result<bool, reqwest::Error> {
        let response: FollowersResponse = self
            .http
            .get(HELIX_FOLLOWERS_URL)
            .query(&[("user_id", user_id), ("broadcaster_id", broadcaster_id)])
            .header("Client-Id", &self.client_id)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(!response.data.is_empty())
    }
}
