//! Per-provider configuration records.
//!
//! One [`ProviderConfig`] describes everything that differs between the
//! source-control host and the tracker: where deliveries arrive, how they are
//! signed, and which chat channel receives the notifications. The dispatcher
//! is shared; only this record varies.

use secrecy::SecretString;

use crate::{ChannelId, GuildId};

/// Which upstream produced a delivery. Decides the payload schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Source-control host (GitHub). Event type comes from a header.
    SourceControl,
    /// Project tracker (Shortcut). Event shape is implied by the payload.
    Tracker,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::SourceControl => write!(f, "source-control"),
            ProviderKind::Tracker => write!(f, "tracker"),
        }
    }
}

/// How the signature header encodes the HMAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFormat {
    /// Hex digest after an algorithm prefix, e.g. `sha256=<hex>`.
    Prefixed(&'static str),
    /// Bare hex digest.
    BareHex,
}

/// What to do with a delivery that has no signature header at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignaturePolicy {
    /// Reject unsigned deliveries.
    #[default]
    Required,
    /// Accept unsigned deliveries without verification. Present signatures are
    /// still verified.
    AllowUnsigned,
}

/// Source-control signature header (`X-Hub-Signature-256`).
pub const SOURCE_CONTROL_SIGNATURE_HEADER: &str = "x-hub-signature-256";
/// Source-control event-type header (`X-GitHub-Event`).
pub const SOURCE_CONTROL_EVENT_HEADER: &str = "x-github-event";
/// Tracker signature header (`Payload-Signature`).
pub const TRACKER_SIGNATURE_HEADER: &str = "payload-signature";

/// Everything the pipeline needs to know about one configured provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Payload schema.
    pub kind: ProviderKind,
    /// HTTP path deliveries are posted to.
    pub route: String,
    /// Header carrying the signature (lowercase).
    pub signature_header: &'static str,
    /// Encoding of the signature header value.
    pub signature_format: SignatureFormat,
    /// Handling of deliveries without a signature header.
    pub signature_policy: SignaturePolicy,
    /// Header carrying the event type, for providers that send one.
    pub event_type_header: Option<&'static str>,
    /// Shared HMAC secret.
    pub secret: SecretString,
    /// Channel receiving this provider's notifications.
    pub channel: ChannelId,
    /// Chat server used for mention lookups. `None` disables mentions.
    pub guild: Option<GuildId>,
}

impl ProviderConfig {
    /// Source-control host defaults: `POST /github`, `sha256=`-prefixed signatures.
    pub fn source_control(secret: SecretString, channel: ChannelId) -> Self {
        Self {
            kind: ProviderKind::SourceControl,
            route: "/github".to_string(),
            signature_header: SOURCE_CONTROL_SIGNATURE_HEADER,
            signature_format: SignatureFormat::Prefixed("sha256="),
            signature_policy: SignaturePolicy::default(),
            event_type_header: Some(SOURCE_CONTROL_EVENT_HEADER),
            secret,
            channel,
            guild: None,
        }
    }

    /// Tracker defaults: `POST /shortcut`, bare-hex signatures.
    pub fn tracker(secret: SecretString, channel: ChannelId) -> Self {
        Self {
            kind: ProviderKind::Tracker,
            route: "/shortcut".to_string(),
            signature_header: TRACKER_SIGNATURE_HEADER,
            signature_format: SignatureFormat::BareHex,
            signature_policy: SignaturePolicy::default(),
            event_type_header: None,
            secret,
            channel,
            guild: None,
        }
    }

    /// Enables mention resolution against `guild`.
    pub fn with_guild(mut self, guild: GuildId) -> Self {
        self.guild = Some(guild);
        self
    }

    /// Overrides the unsigned-delivery policy.
    pub fn with_signature_policy(mut self, policy: SignaturePolicy) -> Self {
        self.signature_policy = policy;
        self
    }
}
