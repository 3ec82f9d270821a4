//! Core domain for Hermes, the webhook-to-chat relay.
//!
//! This crate contains the payload model, identifiers, error taxonomy, and the
//! pure stages of the webhook pipeline: signature verification, decoding, and
//! rendering. Infrastructure crates implement the port traits defined here;
//! they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`DeliveryId`, `ChannelId`, `StoryId`, etc.) |
//! | [`types`] | Envelope, opaque payload values, resolved actors, notifications |
//! | [`events`] | Provider payload structs (`PushEvent`, `TrackerEvent`) |
//! | [`errors`] | Request-wide, per-action, and startup errors |
//! | [`provider`] | Per-provider configuration record |
//! | [`signature`] | HMAC-SHA256 verification |
//! | [`decode`] | Raw body → [`StructuredEvent`] |
//! | [`references`] | Payload-local reference table and item URL parsing |
//! | [`format`] | Notification rendering |
//! | [`ports`] | Tracker, chat-directory, and chat-delivery traits |

pub mod decode;
pub mod errors;
pub mod events;
pub mod format;
pub mod identifiers;
pub mod ports;
pub mod provider;
pub mod references;
pub mod signature;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use decode::{decode, ProviderHint, StructuredEvent, PUSH_EVENT};
pub use errors::{DecodeError, DeliveryError, HermesError, IngestError, LookupError};
pub use events::{
    Action, Change, CommitPerson, CommitRecord, PushEvent, Reference, Repository, TrackerEvent,
};
pub use format::{classify_action, render_push, short_id, TrackerNotice, WorkflowTransition};
pub use identifiers::{ChannelId, ChatUserId, DeliveryId, GuildId, MemberId, StoryId};
pub use ports::{ChatClient, ChatDirectory, TrackerDirectory};
pub use provider::{
    ProviderConfig, ProviderKind, SignatureFormat, SignaturePolicy, SOURCE_CONTROL_EVENT_HEADER,
    SOURCE_CONTROL_SIGNATURE_HEADER, TRACKER_SIGNATURE_HEADER,
};
pub use references::{item_id_from_url, resolve_reference};
pub use types::{
    ChatMember, NotificationMessage, OpaqueValue, ResolvedActor, Timestamp, WebhookEnvelope,
};
