//! Port traits implemented by the infrastructure crates.
//!
//! | Trait | Implemented by |
//! |-------|----------------|
//! | [`TrackerDirectory`] | `tracker::ShortcutClient` |
//! | [`ChatDirectory`] | `chat::DiscordClient` |
//! | [`ChatClient`] | `chat::DiscordClient` |
//!
//! Implementations report failures as values; none of these calls may abort
//! the process. Bounding call duration is the caller's job.

use async_trait::async_trait;

use crate::{ChannelId, ChatMember, DeliveryError, GuildId, LookupError, MemberId, StoryId};

/// Read access to the tracker's REST API.
#[async_trait]
pub trait TrackerDirectory: Send + Sync {
    /// Display name (mention name) of a workspace member.
    async fn member_name(&self, member: &MemberId) -> Result<String, LookupError>;

    /// Title of a work item.
    async fn story_title(&self, story: &StoryId) -> Result<String, LookupError>;
}

/// Read access to the chat server's member directory.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    /// Lists up to `limit` members of `guild`.
    async fn list_members(
        &self,
        guild: &GuildId,
        limit: u16,
    ) -> Result<Vec<ChatMember>, LookupError>;
}

/// Message delivery to a chat channel.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Posts `content` to `channel`.
    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<(), DeliveryError>;
}
