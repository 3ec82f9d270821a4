//! Newtype domain identifiers.
//!
//! Every identity that crosses a port boundary is a distinct newtype wrapping a
//! primitive. This prevents accidentally passing a chat [`ChannelId`] where a
//! [`GuildId`] is expected even though both are Discord snowflake strings.
//!
//! Payload structs in [`crate::events`] keep raw strings so decoding stays
//! schema-tolerant; conversion into these types happens at lookup time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies one inbound webhook delivery.
///
/// Generated fresh for every request; attached to the dispatch span so all
/// lookups and chat sends caused by one delivery can be correlated in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(Uuid);

impl DeliveryId {
    /// Generates a new random delivery identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — tracker (Shortcut)
// ---------------------------------------------------------------------------

string_id! {
    /// Public id of a tracker workspace member (a UUID string in Shortcut).
    MemberId
}

string_id! {
    /// Id of a tracker work item, as it appears in the item's URL path.
    StoryId
}

// ---------------------------------------------------------------------------
// Identifiers — chat (Discord snowflakes)
// ---------------------------------------------------------------------------

string_id! {
    /// The chat channel notifications for one provider are posted to.
    ChannelId
}

string_id! {
    /// The chat server (guild) whose member list backs mention resolution.
    GuildId
}

string_id! {
    /// A chat user; rendered into messages as a `<@id>` mention token.
    ChatUserId
}
