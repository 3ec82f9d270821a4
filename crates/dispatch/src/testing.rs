//! In-memory port fakes.
//!
//! Enabled for this crate's tests and, through the `test-support` feature, for
//! downstream crates that need a working [`crate::Dispatcher`] without network
//! access.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    ChannelId, ChatClient, ChatDirectory, ChatMember, ChatUserId, DeliveryError, GuildId,
    LookupError, MemberId, StoryId, TrackerDirectory,
};

/// Tracker fake backed by maps. Unknown ids answer HTTP 404.
#[derive(Debug, Default)]
pub struct FakeTracker {
    members: HashMap<String, String>,
    stories: HashMap<String, String>,
    slow_members: HashSet<String>,
    calls: Mutex<usize>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, id: &str, mention_name: &str) -> Self {
        self.members.insert(id.to_string(), mention_name.to_string());
        self
    }

    pub fn with_story(mut self, id: &str, title: &str) -> Self {
        self.stories.insert(id.to_string(), title.to_string());
        self
    }

    /// Lookups of this member never finish.
    pub fn with_hanging_member(mut self, id: &str) -> Self {
        self.slow_members.insert(id.to_string());
        self
    }

    /// Number of lookups made so far.
    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("calls lock poisoned")
    }

    fn record_call(&self) {
        *self.calls.lock().expect("calls lock poisoned") += 1;
    }
}

#[async_trait]
impl TrackerDirectory for FakeTracker {
    async fn member_name(&self, member: &MemberId) -> Result<String, LookupError> {
        self.record_call();
        if self.slow_members.contains(member.as_str()) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.members
            .get(member.as_str())
            .cloned()
            .ok_or(LookupError::Status { status: 404 })
    }

    async fn story_title(&self, story: &StoryId) -> Result<String, LookupError> {
        self.record_call();
        self.stories
            .get(story.as_str())
            .cloned()
            .ok_or(LookupError::Status { status: 404 })
    }
}

/// Chat directory fake with a fixed member list.
#[derive(Debug, Default)]
pub struct FakeDirectory {
    members: Vec<ChatMember>,
    unavailable: bool,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, id: &str, username: &str) -> Self {
        self.members.push(ChatMember {
            id: ChatUserId::new(id).expect("non-empty chat user id"),
            username: username.to_string(),
        });
        self
    }

    /// Every listing fails with a transport error.
    pub fn unavailable() -> Self {
        Self {
            members: Vec::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl ChatDirectory for FakeDirectory {
    async fn list_members(
        &self,
        _guild: &GuildId,
        limit: u16,
    ) -> Result<Vec<ChatMember>, LookupError> {
        if self.unavailable {
            return Err(LookupError::Transport {
                message: "connection refused".to_string(),
            });
        }
        Ok(self.members.iter().take(usize::from(limit)).cloned().collect())
    }
}

/// Chat client fake that records every message it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<(ChannelId, String)>>,
    reject: bool,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records attempts but answers every send with HTTP 403.
    pub fn rejecting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    /// Contents of all attempted sends, in call order.
    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .iter()
            .map(|(_, content)| content.clone())
            .collect()
    }

    /// Channels of all attempted sends, in call order.
    pub fn channels(&self) -> Vec<ChannelId> {
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .iter()
            .map(|(channel, _)| channel.clone())
            .collect()
    }
}

#[async_trait]
impl ChatClient for RecordingChat {
    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .push((channel.clone(), content.to_string()));
        if self.reject {
            return Err(DeliveryError::Rejected {
                status: 403,
                body: "Missing Access".to_string(),
            });
        }
        Ok(())
    }
}
