//! Hermes entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Load configuration** from the environment and validate it.
//! 2. **Wire observability**: `tracing-subscriber` with a JSON or pretty layer,
//!    plus an OpenTelemetry OTLP exporter when an endpoint is configured.
//! 3. **Construct infrastructure**: the Shortcut and Discord clients, injected
//!    into one [`dispatch::Dispatcher`] shared by every route.
//! 4. **Serve** the webhook routes until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use chat::DiscordClient;
use dispatch::Dispatcher;
use tracing::info;
use tracker::ShortcutClient;

mod config;
mod telemetry;

use config::HermesConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HermesConfig::from_env().context("invalid configuration")?;
    let tracer_provider = telemetry::init(config.log_format)?;

    let routes: Vec<&str> = config.providers.iter().map(|p| p.route.as_str()).collect();
    info!(
        port = config.port,
        routes = ?routes,
        lookup_timeout_secs = config.lookup_timeout.as_secs(),
        "Starting hermes"
    );

    let tracker = Arc::new(ShortcutClient::new(
        config.tracker_api_url.clone(),
        config.tracker_token.clone(),
        config.lookup_timeout,
    ));
    let discord = Arc::new(DiscordClient::new(
        config.chat_api_url.clone(),
        config.chat_token.clone(),
        config.lookup_timeout,
    ));
    let dispatcher = Dispatcher::new(tracker, discord.clone(), discord, config.lookup_timeout);

    let router = listener::build_router(Arc::new(dispatcher), config.providers.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let served = listener::serve(addr, router).await.context("webhook server failed");

    telemetry::shutdown(tracer_provider);
    served
}
