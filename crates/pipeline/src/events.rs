//! Provider payload model.
//!
//! Every struct here is decoded leniently: unknown fields are ignored and
//! missing or `null` fields take their `Default` value, so a sparse payload
//! decodes into empty sequences and strings rather than failing. Only bodies that are not
//! JSON at all are rejected (see [`crate::decode`]).

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{OpaqueValue, Timestamp};

/// Treats an explicit JSON `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Source control (GitHub) push events
// ---------------------------------------------------------------------------

/// A `push` delivery from the source-control host.
///
/// When `commits` is non-empty the producer sets `head_commit` to the last
/// entry. Pushes that create no commits (tag pushes, branch deletions) carry
/// an empty list and a `null` head commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushEvent {
    /// Full ref that was pushed, e.g. `refs/heads/main`.
    #[serde(rename = "ref", default, deserialize_with = "null_as_default")]
    pub git_ref: String,
    /// Repository the push landed in.
    #[serde(default, deserialize_with = "null_as_default")]
    pub repository: Repository,
    /// Pushed commits, oldest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub commits: Vec<CommitRecord>,
    /// The most recent commit of the push.
    pub head_commit: Option<CommitRecord>,
}

impl PushEvent {
    /// The head commit, falling back to the last listed commit.
    pub fn head(&self) -> Option<&CommitRecord> {
        self.head_commit.as_ref().or_else(|| self.commits.last())
    }
}

/// Repository identity carried by a push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub html_url: String,
}

impl Repository {
    /// Link target for the repository; `url` is the browsable URL on push payloads.
    pub fn link(&self) -> &str {
        if self.url.is_empty() {
            &self.html_url
        } else {
            &self.url
        }
    }
}

/// One commit in a push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitRecord {
    /// Full commit SHA.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: CommitPerson,
    #[serde(default, deserialize_with = "null_as_default")]
    pub committer: CommitPerson,
}

impl CommitRecord {
    /// Source-control username of the commit author (may be empty).
    pub fn author_username(&self) -> &str {
        &self.author.username
    }

    /// Username of the author, or their name when the host sent no username.
    pub fn author_display_name(&self) -> &str {
        if self.author.username.is_empty() {
            &self.author.name
        } else {
            &self.author.username
        }
    }
}

/// Author or committer of a commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitPerson {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
}

// ---------------------------------------------------------------------------
// Tracker (Shortcut) events
// ---------------------------------------------------------------------------

/// A tracker webhook delivery: one or more actions plus a payload-local
/// reference table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerEvent {
    /// Unique id of the webhook event.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub changed_at: Option<Timestamp>,
    pub primary_id: Option<OpaqueValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub member_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    /// Change records, in producer order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<Action>,
    /// Names for opaque ids mentioned by `actions`; valid only for this payload.
    #[serde(default, deserialize_with = "null_as_default")]
    pub references: Vec<Reference>,
}

/// One discrete change within a tracker payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    pub id: Option<OpaqueValue>,
    /// Public id of the member who made the change.
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_id: String,
    /// What was changed, e.g. `story` or `story-comment`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity_type: String,
    /// How it changed, e.g. `create` or `update`.
    #[serde(rename = "action", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Browser URL of the changed entity.
    #[serde(default, deserialize_with = "null_as_default")]
    pub app_url: String,
    /// Changed fields keyed by field name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub changes: HashMap<String, Change>,
}

/// Before/after values of one changed field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Change {
    #[serde(rename = "new")]
    pub new_value: Option<OpaqueValue>,
    #[serde(rename = "old")]
    pub old_value: Option<OpaqueValue>,
}

/// An entry of the payload-local reference table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    pub id: Option<OpaqueValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}
