//! Enrichment lookups: tracker member names, item titles, chat mentions.
//!
//! Every outbound call is bounded by the configured timeout. A timeout is
//! reported as [`LookupError::Timeout`] and handled like any other lookup
//! failure: the affected action degrades, the process and the request carry on.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use pipeline::{
    item_id_from_url, ChatDirectory, GuildId, LookupError, MemberId, ResolvedActor,
    TrackerDirectory,
};
use tracing::{debug, warn};

/// Maximum number of chat members fetched for a mention lookup.
pub const GUILD_MEMBER_LIMIT: u16 = 1000;

/// Resolves ids in a webhook payload into names fit for display.
#[derive(Clone)]
pub struct EnrichmentClient {
    tracker: Arc<dyn TrackerDirectory>,
    directory: Arc<dyn ChatDirectory>,
    timeout: Duration,
}

impl EnrichmentClient {
    /// Creates a client over the given ports. `timeout` bounds each call.
    pub fn new(
        tracker: Arc<dyn TrackerDirectory>,
        directory: Arc<dyn ChatDirectory>,
        timeout: Duration,
    ) -> Self {
        Self {
            tracker,
            directory,
            timeout,
        }
    }

    /// Display name of the tracker member `author_id`.
    pub async fn resolve_author_name(&self, author_id: &str) -> Result<String, LookupError> {
        let member = MemberId::new(author_id).ok_or(LookupError::MissingIdentifier {
            what: "author id",
        })?;
        within(self.timeout, self.tracker.member_name(&member)).await
    }

    /// Title of the item an item or comment URL points at.
    pub async fn resolve_item_title(&self, item_url: &str) -> Result<String, LookupError> {
        let story = item_id_from_url(item_url)?;
        within(self.timeout, self.tracker.story_title(&story)).await
    }

    /// Mention token for `display_name` in `guild`, or `display_name` unchanged.
    ///
    /// A miss is the normal case for bots and external collaborators and is
    /// not an error. A failed listing also falls back to the plain name.
    pub async fn resolve_chat_mention(&self, display_name: &str, guild: &GuildId) -> String {
        self.find_mention(display_name, guild)
            .await
            .unwrap_or_else(|| display_name.to_string())
    }

    /// Builds the actor for a display name, resolving a mention when a guild
    /// is configured.
    pub async fn resolve_actor(
        &self,
        display_name: String,
        guild: Option<&GuildId>,
    ) -> ResolvedActor {
        let chat_mention = match guild {
            Some(guild) => self.find_mention(&display_name, guild).await,
            None => None,
        };
        ResolvedActor {
            display_name,
            chat_mention,
        }
    }

    async fn find_mention(&self, display_name: &str, guild: &GuildId) -> Option<String> {
        if display_name.is_empty() {
            return None;
        }
        let listing = self.directory.list_members(guild, GUILD_MEMBER_LIMIT);
        let members = match within(self.timeout, listing).await {
            Ok(members) => members,
            Err(error) => {
                warn!(
                    guild = %guild,
                    error = %error,
                    "Chat member listing failed; using plain name"
                );
                return None;
            }
        };
        let mention = members
            .iter()
            .find(|member| member.username == display_name)
            .map(|member| member.mention());
        if mention.is_none() {
            debug!(display_name, "No chat member matches; using plain name");
        }
        mention
    }
}

/// Runs `call`, converting an elapsed deadline into [`LookupError::Timeout`].
pub(crate) async fn within<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, LookupError>>,
) -> Result<T, LookupError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| LookupError::Timeout { after: limit })?
}
