//! Discord REST client.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    ChannelId, ChatClient, ChatDirectory, ChatMember, ChatUserId, DeliveryError, GuildId,
    LookupError,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

/// Discord REST API root, version included.
pub const DEFAULT_API_URL: &str = "https://discord.com/api/v10";

#[derive(Debug, Deserialize)]
struct GuildMemberEntry {
    #[serde(default)]
    user: Option<UserEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserEntry {
    id: String,
    username: String,
}

/// Bot-authenticated client for guild member listing and message creation.
#[derive(Clone)]
pub struct DiscordClient {
    client: reqwest::Client,
    base_url: String,
    token: SecretString,
    timeout: Duration,
}

impl DiscordClient {
    /// Creates a client against `base_url` (normally [`DEFAULT_API_URL`]).
    pub fn new(base_url: impl Into<String>, token: SecretString, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|error| {
                warn!(%error, "HTTP client builder failed; using defaults without timeouts");
                reqwest::Client::new()
            });
        Self {
            client,
            base_url: base_url.into(),
            token,
            timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token.expose_secret())
    }
}

#[async_trait]
impl ChatDirectory for DiscordClient {
    async fn list_members(
        &self,
        guild: &GuildId,
        limit: u16,
    ) -> Result<Vec<ChatMember>, LookupError> {
        let url = self.url(&format!("guilds/{guild}/members"));
        debug!(guild = %guild, limit, "Listing chat members");

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.authorization())
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout { after: self.timeout }
                } else {
                    LookupError::Transport {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let entries: Vec<GuildMemberEntry> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout { after: self.timeout }
            } else {
                LookupError::Decode {
                    message: e.to_string(),
                }
            }
        })?;

        Ok(entries
            .into_iter()
            .filter_map(|entry| entry.user)
            .filter_map(|user| {
                ChatUserId::new(user.id).map(|id| ChatMember {
                    id,
                    username: user.username,
                })
            })
            .collect())
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<(), DeliveryError> {
        let url = self.url(&format!("channels/{channel}/messages"));

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.authorization())
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout { after: self.timeout }
                } else {
                    DeliveryError::Transport {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
