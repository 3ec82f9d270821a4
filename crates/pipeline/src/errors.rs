//! Error taxonomy for the Hermes webhook pipeline.
//!
//! Errors split by blast radius:
//!
//! - [`IngestError`] is request-wide. Authentication and parsing apply to the
//!   whole payload, so these short-circuit a delivery before any dispatch.
//! - [`LookupError`] and [`DeliveryError`] are per action. The dispatcher logs
//!   them and moves on to the next action; they never fail the HTTP response.
//! - [`HermesError`] covers startup conditions that keep the service from
//!   running at all.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Request-wide errors
// ---------------------------------------------------------------------------

/// The body is not valid JSON.
#[derive(Debug, Error)]
#[error("payload is not valid JSON: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Conditions that reject a webhook delivery without dispatching anything.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The claimed signature does not match the body.
    #[error("Invalid signature")]
    Unauthorized,

    /// The provider requires signed deliveries and the signature header was absent.
    #[error("Missing signature header `{header}`")]
    MissingSignature {
        /// Header name that was expected.
        header: String,
    },

    /// The body could not be decoded.
    #[error("Error parsing request body: {0}")]
    MalformedPayload(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Per-action errors
// ---------------------------------------------------------------------------

/// An enrichment lookup failed. The affected action is skipped.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The request could not be sent or the connection failed.
    #[error("lookup transport failure: {message}")]
    Transport {
        /// Underlying client error.
        message: String,
    },

    /// The lookup did not complete within the configured bound.
    #[error("lookup timed out after {after:?}")]
    Timeout {
        /// The bound that was exceeded.
        after: Duration,
    },

    /// The remote API answered with a non-success status.
    #[error("lookup returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body did not have the expected shape.
    #[error("lookup response could not be decoded: {message}")]
    Decode {
        /// Decoder error.
        message: String,
    },

    /// An item URL did not contain an item id at the expected path segment.
    #[error("cannot extract an item id from `{url}`")]
    InvalidItemUrl {
        /// The offending URL.
        url: String,
    },

    /// An identifier needed for the lookup was empty.
    #[error("missing {what}")]
    MissingIdentifier {
        /// Which identifier was missing.
        what: &'static str,
    },
}

/// The chat API did not accept a message. Logged; never surfaced to the provider.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The request could not be sent or the connection failed.
    #[error("delivery transport failure: {message}")]
    Transport {
        /// Underlying client error.
        message: String,
    },

    /// The send did not complete within the configured bound.
    #[error("delivery timed out after {after:?}")]
    Timeout {
        /// The bound that was exceeded.
        after: Duration,
    },

    /// The chat API rejected the message.
    #[error("chat API rejected message with HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, for operator diagnostics.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// Startup errors
// ---------------------------------------------------------------------------

/// Errors that keep the service from starting.
#[derive(Debug, Error)]
pub enum HermesError {
    /// The runtime configuration is missing or invalid.
    ///
    /// Produced at load time; the service never starts with an invalid config.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },
}
