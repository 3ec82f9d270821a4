//! Shortcut REST client.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{LookupError, MemberId, StoryId, TrackerDirectory};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

/// Public Shortcut API host.
pub const DEFAULT_API_URL: &str = "https://api.app.shortcut.com";

/// Header carrying the API token on every request.
pub const TOKEN_HEADER: &str = "Shortcut-Token";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MemberResponse {
    profile: MemberProfile,
    // Returned by the token-owner endpoint, which has no profile wrapper.
    mention_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MemberProfile {
    mention_name: String,
    name: String,
}

impl MemberResponse {
    fn into_display_name(self) -> String {
        [self.profile.mention_name, self.mention_name, self.profile.name]
            .into_iter()
            .find(|candidate| !candidate.is_empty())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoryResponse {
    name: String,
}

/// Client for the Shortcut member and story endpoints.
#[derive(Clone)]
pub struct ShortcutClient {
    client: reqwest::Client,
    base_url: String,
    token: SecretString,
    timeout: Duration,
}

impl ShortcutClient {
    /// Creates a client against `base_url` (normally [`DEFAULT_API_URL`]).
    ///
    /// `timeout` bounds each request end to end.
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

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LookupError> {
        let url = format!("{}/api/v3/{path}", self.base_url.trim_end_matches('/'));
        debug!(url = %url, "Tracker lookup");

        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, self.token.expose_secret())
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| self.lookup_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(|e| self.lookup_error(e))
    }

    fn lookup_error(&self, error: reqwest::Error) -> LookupError {
        if error.is_timeout() {
            LookupError::Timeout { after: self.timeout }
        } else if error.is_decode() {
            LookupError::Decode {
                message: error.to_string(),
            }
        } else {
            LookupError::Transport {
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl TrackerDirectory for ShortcutClient {
    async fn member_name(&self, member: &MemberId) -> Result<String, LookupError> {
        let response: MemberResponse = self.get_json(&format!("members/{member}")).await?;
        Ok(response.into_display_name())
    }

    async fn story_title(&self, story: &StoryId) -> Result<String, LookupError> {
        let response: StoryResponse = self.get_json(&format!("stories/{story}")).await?;
        Ok(response.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "sc-token";

    fn client(server: &MockServer) -> ShortcutClient {
        ShortcutClient::new(server.uri(), SecretString::new(TOKEN.into()), Duration::from_secs(2))
    }

    fn json(body: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json")
    }

    #[tokio::test]
    async fn member_name_reads_profile_mention_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/members/5f1d-ada"))
            .and(header(TOKEN_HEADER, TOKEN))
            .respond_with(json(serde_json::json!({
                "id": "5f1d-ada",
                "role": "member",
                "profile": {"mention_name": "ada", "name": "Ada Lovelace"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let name = client(&server)
            .member_name(&MemberId::new("5f1d-ada").unwrap())
            .await
            .unwrap();
        assert_eq!(name, "ada");
    }

    #[tokio::test]
    async fn member_name_falls_back_to_top_level_mention_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/members/m-2"))
            .respond_with(json(serde_json::json!({"mention_name": "grace"})))
            .mount(&server)
            .await;

        let name = client(&server)
            .member_name(&MemberId::new("m-2").unwrap())
            .await
            .unwrap();
        assert_eq!(name, "grace");
    }

    #[tokio::test]
    async fn story_title_reads_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/stories/42"))
            .and(header(TOKEN_HEADER, TOKEN))
            .respond_with(json(serde_json::json!({"id": 42, "name": "Login fails on Safari"})))
            .mount(&server)
            .await;

        let title = client(&server)
            .story_title(&StoryId::new("42").unwrap())
            .await
            .unwrap();
        assert_eq!(title, "Login fails on Safari");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/stories/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client(&server).story_title(&StoryId::new("404").unwrap()).await;
        assert!(matches!(result, Err(LookupError::Status { status: 404 })));
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/stories/7"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html>", "text/html"))
            .mount(&server)
            .await;

        let result = client(&server).story_title(&StoryId::new("7").unwrap()).await;
        assert!(matches!(result, Err(LookupError::Decode { .. })));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/stories/9"))
            .respond_with(
                json(serde_json::json!({"name": "late"})).set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let slow = ShortcutClient::new(
            server.uri(),
            SecretString::new(TOKEN.into()),
            Duration::from_millis(100),
        );
        let result = slow.story_title(&StoryId::new("9").unwrap()).await;
        assert!(matches!(result, Err(LookupError::Timeout { .. })));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let unreachable = ShortcutClient::new(
            "http://127.0.0.1:1",
            SecretString::new(TOKEN.into()),
            Duration::from_secs(2),
        );
        let result = unreachable.member_name(&MemberId::new("m").unwrap()).await;
        assert!(matches!(result, Err(LookupError::Transport { .. })));
    }
}
