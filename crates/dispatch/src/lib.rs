//! Hermes webhook orchestration.
//!
//! This crate sequences the pure stages in [`pipeline`] with the enrichment
//! and delivery ports: verify → decode → for each action, enrich → format →
//! deliver.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The [`Dispatcher`] sequences calls between business
//! logic in the [`pipeline`] crate and infrastructure traits (tracker API, chat
//! directory, chat delivery). It contains no rendering rules of its own.
//!
//! ## Failure isolation
//!
//! Signature and decoding failures reject the whole delivery. Everything after
//! that is per action: a failed lookup or send is logged at `warn` and the
//! remaining actions continue.

pub mod dispatcher;
pub mod enrichment;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use dispatcher::{authenticate, ActionOutcome, DispatchReport, Dispatcher};
pub use enrichment::{EnrichmentClient, GUILD_MEMBER_LIMIT};
