//! Hermes chat infrastructure adapter.
//!
//! Implements [`pipeline::ChatDirectory`] and [`pipeline::ChatClient`] over the
//! Discord REST API (v10) using bot-token authentication.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, and response
//! parsing live here. The [`pipeline`] crate sees only the two port traits.
//!
//! No gateway connection is opened: listing guild members and creating
//! channel messages are plain REST calls. Listing members requires the bot to
//! hold the privileged *Server Members* intent in the developer portal.

mod client;

pub use client::{DiscordClient, DEFAULT_API_URL};
