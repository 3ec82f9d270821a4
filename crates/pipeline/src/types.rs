//! Shared value types for the Hermes webhook domain.
//!
//! Unlike the payload structs in [`crate::events`], these types are produced or
//! consumed by the pipeline itself: the request envelope, opaque payload values,
//! resolved actors, and the rendered notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChannelId, ChatUserId};

// ---------------------------------------------------------------------------
// Request envelope
// ---------------------------------------------------------------------------

/// One inbound webhook delivery, exactly as it arrived on the wire.
///
/// `body` is never re-encoded: signature verification runs over these bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEnvelope {
    /// Raw request body.
    pub body: Vec<u8>,
    /// Value of the provider's signature header, if the request carried one.
    pub signature: Option<String>,
    /// Value of the provider's event-type header, if the provider sends one.
    pub event_type: Option<String>,
}

impl WebhookEnvelope {
    /// Creates an envelope from raw parts.
    pub fn new(
        body: impl Into<Vec<u8>>,
        signature: Option<String>,
        event_type: Option<String>,
    ) -> Self {
        Self {
            body: body.into(),
            signature,
            event_type,
        }
    }
}

// ---------------------------------------------------------------------------
// Opaque payload values
// ---------------------------------------------------------------------------

/// A payload value whose JSON type is not fixed by the producer.
///
/// The tracker sends workflow-state ids as numbers in some payloads and as
/// strings in others, both in `changes` and in the `references` table. Values
/// are kept in their original representation and compared with
/// [`OpaqueValue::same_identity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpaqueValue {
    /// A JSON number.
    Number(serde_json::Number),
    /// A JSON string.
    Text(String),
    /// Any other JSON value (bool, array, object).
    Other(serde_json::Value),
}

impl OpaqueValue {
    /// Returns `true` if both values denote the same identity.
    ///
    /// Numbers compare by numeric value (`500` equals `500.0`) and strings
    /// compare exactly. Values of different kinds never match; a number is
    /// not equal to its decimal string.
    pub fn same_identity(&self, other: &OpaqueValue) -> bool {
        match (self, other) {
            (OpaqueValue::Number(a), OpaqueValue::Number(b)) => numbers_equal(a, b),
            (OpaqueValue::Text(a), OpaqueValue::Text(b)) => a == b,
            (OpaqueValue::Other(a), OpaqueValue::Other(b)) => a == b,
            _ => false,
        }
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl From<i64> for OpaqueValue {
    fn from(value: i64) -> Self {
        OpaqueValue::Number(value.into())
    }
}

impl From<&str> for OpaqueValue {
    fn from(value: &str) -> Self {
        OpaqueValue::Text(value.to_string())
    }
}

impl std::fmt::Display for OpaqueValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpaqueValue::Number(n) => write!(f, "{n}"),
            OpaqueValue::Text(s) => write!(f, "{s}"),
            OpaqueValue::Other(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Enrichment results
// ---------------------------------------------------------------------------

/// A member of the chat server, as returned by the directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMember {
    /// Chat user id.
    pub id: ChatUserId,
    /// Account username (not the server nickname).
    pub username: String,
}

impl ChatMember {
    /// Returns the `<@id>` token the chat platform renders as a mention.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// The author of an action, resolved for display.
///
/// Recomputed per action; never cached across deliveries because the chat
/// directory can change between events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedActor {
    /// Name as known to the upstream provider.
    pub display_name: String,
    /// Chat mention token, when the name matched a chat member.
    pub chat_mention: Option<String>,
}

impl ResolvedActor {
    /// An actor with no chat mention.
    pub fn plain(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            chat_mention: None,
        }
    }

    /// The text rendered as `{user}` in notifications.
    pub fn as_user(&self) -> &str {
        self.chat_mention.as_deref().unwrap_or(&self.display_name)
    }
}

/// A rendered notification bound for exactly one chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// Destination channel.
    pub channel: ChannelId,
    /// Message text with embedded markdown links.
    pub content: String,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
