//! Raw body → structured event.
//!
//! Decoding is tolerant of schema drift (see [`crate::events`]); the only
//! failure is a body that is not JSON.

use serde::de::IgnoredAny;
use tracing::debug;

use crate::{DecodeError, ProviderKind, PushEvent, TrackerEvent};

/// Source-control event type that produces notifications.
pub const PUSH_EVENT: &str = "push";

/// What the decoder could make of a delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredEvent {
    /// A source-control push.
    Push(PushEvent),
    /// A tracker delivery with zero or more actions.
    Tracker(TrackerEvent),
    /// Valid JSON of an event type that never produces a notification.
    Ignored {
        /// The declared event type (empty when the header was absent).
        event_type: String,
    },
}

/// Decoding hint taken from the provider configuration and request headers.
#[derive(Debug, Clone, Copy)]
pub struct ProviderHint<'a> {
    pub kind: ProviderKind,
    /// Provider-declared event type, for providers that send one.
    pub event_type: Option<&'a str>,
}

/// Decodes `body` according to `hint`.
///
/// Source-control deliveries are typed by their event header; anything other
/// than `push` is validated as JSON and reported as [`StructuredEvent::Ignored`].
/// Tracker deliveries carry no type header and always decode as
/// [`TrackerEvent`].
pub fn decode(body: &[u8], hint: ProviderHint<'_>) -> Result<StructuredEvent, DecodeError> {
    match hint.kind {
        ProviderKind::SourceControl => match hint.event_type {
            Some(PUSH_EVENT) => Ok(StructuredEvent::Push(serde_json::from_slice(body)?)),
            other => {
                serde_json::from_slice::<IgnoredAny>(body)?;
                debug!(
                    event_type = other.unwrap_or("<none>"),
                    "Source-control event type produces no notification"
                );
                Ok(StructuredEvent::Ignored {
                    event_type: other.unwrap_or_default().to_string(),
                })
            }
        },
        ProviderKind::Tracker => Ok(StructuredEvent::Tracker(serde_json::from_slice(body)?)),
    }
}
