//! Hermes tracker infrastructure adapter.
//!
//! Implements the [`pipeline::TrackerDirectory`] trait for the Shortcut REST
//! API (v3). Every request authenticates with the `Shortcut-Token` header.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, and response
//! parsing live here. The [`pipeline`] crate sees only
//! [`pipeline::TrackerDirectory`].

mod client;

pub use client::{ShortcutClient, DEFAULT_API_URL, TOKEN_HEADER};
