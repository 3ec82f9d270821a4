//! Runtime configuration, read once from the environment at startup.
//!
//! Each provider is enabled by setting its secret or channel variable. Names
//! prefixed `SC_` belong to the tracker; `HERMES_` names cover the
//! source-control provider and process-wide settings. Empty values count as
//! unset.

use std::time::Duration;

use pipeline::{ChannelId, GuildId, HermesError, ProviderConfig, SignaturePolicy};
use secrecy::SecretString;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Log output encoding for the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Environment variable names for one provider.
struct ProviderEnv {
    secret: &'static str,
    channel: &'static str,
    guild: &'static str,
}

const SOURCE_CONTROL_ENV: ProviderEnv = ProviderEnv {
    secret: "HERMES_WEBHOOK_SECRET",
    channel: "HERMES_DISCORD_CHANNEL",
    guild: "HERMES_DISCORD_SERVER",
};

const TRACKER_ENV: ProviderEnv = ProviderEnv {
    secret: "SC_WEBHOOK_SECRET",
    channel: "SC_DISCORD_CHANNEL",
    guild: "SC_DISCORD_SERVER",
};

/// Fully validated process configuration.
#[derive(Debug, Clone)]
pub struct HermesConfig {
    pub port: u16,
    pub chat_token: SecretString,
    /// Empty when the tracker provider is disabled; no tracker lookups happen then.
    pub tracker_token: SecretString,
    pub providers: Vec<ProviderConfig>,
    pub lookup_timeout: Duration,
    pub tracker_api_url: String,
    pub chat_api_url: String,
    pub log_format: LogFormat,
}

impl HermesConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, HermesError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HermesError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match get("HERMES_PORT").or_else(|| get("SC_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| config_error(format!("port `{raw}` is not a valid TCP port")))?,
            None => DEFAULT_PORT,
        };

        let chat_token = get("HERMES_DISCORD_TOKEN")
            .or_else(|| get("SC_DISCORD_TOKEN"))
            .map(secret)
            .ok_or_else(|| config_error("HERMES_DISCORD_TOKEN is not set"))?;

        let allow_unsigned = get("HERMES_ALLOW_UNSIGNED").is_some_and(|raw| is_truthy(&raw));
        let policy = if allow_unsigned {
            SignaturePolicy::AllowUnsigned
        } else {
            SignaturePolicy::Required
        };

        let mut providers = Vec::new();
        if let Some((secret, channel, guild)) =
            read_provider(&get, &SOURCE_CONTROL_ENV, allow_unsigned)?
        {
            let mut provider =
                ProviderConfig::source_control(secret, channel).with_signature_policy(policy);
            if let Some(guild) = guild {
                provider = provider.with_guild(guild);
            }
            providers.push(provider);
        }

        let mut tracker_token = secret(String::new());
        if let Some((secret_value, channel, guild)) =
            read_provider(&get, &TRACKER_ENV, allow_unsigned)?
        {
            tracker_token = get("SC_SHORTCUT_TOKEN").map(secret).ok_or_else(|| {
                config_error("SC_SHORTCUT_TOKEN is required when the tracker provider is enabled")
            })?;
            let mut provider =
                ProviderConfig::tracker(secret_value, channel).with_signature_policy(policy);
            if let Some(guild) = guild {
                provider = provider.with_guild(guild);
            }
            providers.push(provider);
        }

        if providers.is_empty() {
            return Err(config_error(format!(
                "no provider is enabled; set {} or {}",
                SOURCE_CONTROL_ENV.channel, TRACKER_ENV.channel
            )));
        }

        let lookup_timeout = match get("HERMES_LOOKUP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(config_error(format!(
                        "HERMES_LOOKUP_TIMEOUT_SECS `{raw}` must be a positive number of seconds"
                    )))
                }
            },
            None => DEFAULT_LOOKUP_TIMEOUT,
        };

        let log_format = match get("HERMES_LOG_FORMAT").map(|raw| raw.trim().to_ascii_lowercase()) {
            None => LogFormat::default(),
            Some(raw) if raw == "json" => LogFormat::Json,
            Some(raw) if raw == "pretty" => LogFormat::Pretty,
            Some(raw) => {
                return Err(config_error(format!(
                    "HERMES_LOG_FORMAT `{raw}` must be `json` or `pretty`"
                )))
            }
        };

        Ok(Self {
            port,
            chat_token,
            tracker_token,
            providers,
            lookup_timeout,
            tracker_api_url: get("HERMES_TRACKER_API_URL")
                .unwrap_or_else(|| tracker::DEFAULT_API_URL.to_string()),
            chat_api_url: get("HERMES_CHAT_API_URL")
                .unwrap_or_else(|| chat::DEFAULT_API_URL.to_string()),
            log_format,
        })
    }
}

/// Reads one provider block. `Ok(None)` when neither its secret nor its
/// channel is set.
fn read_provider(
    get: &impl Fn(&str) -> Option<String>,
    env: &ProviderEnv,
    allow_unsigned: bool,
) -> Result<Option<(SecretString, ChannelId, Option<GuildId>)>, HermesError> {
    let secret_value = get(env.secret);
    let channel = get(env.channel);
    if secret_value.is_none() && channel.is_none() {
        return Ok(None);
    }

    let channel = channel
        .and_then(|raw| ChannelId::new(raw.trim()))
        .ok_or_else(|| {
            config_error(format!(
                "{} is required when {} is set",
                env.channel, env.secret
            ))
        })?;

    let secret_value = match secret_value {
        Some(value) => value,
        None if allow_unsigned => String::new(),
        None => {
            return Err(config_error(format!(
                "{} is required unless HERMES_ALLOW_UNSIGNED is set",
                env.secret
            )))
        }
    };

    let guild = get(env.guild).and_then(|raw| GuildId::new(raw.trim()));
    Ok(Some((secret(secret_value), channel, guild)))
}

fn secret(value: String) -> SecretString {
    SecretString::new(value.into_boxed_str())
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn config_error(message: impl Into<String>) -> HermesError {
    HermesError::ConfigurationError {
        message: message.into(),
    }
}
