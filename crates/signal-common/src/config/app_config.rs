//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).
//! The configuration is read once at startup and is immutable afterwards.

use serde::Deserialize;
use signal_core::{GatewayIntents, Hue, IdentityError, KnownIdentityTable, Snowflake};
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: GatewayConfig,
    pub backoff: BackoffConfig,
    pub guild: GuildConfig,
    pub identities: IdentityConfig,
    pub provisioning: ProvisioningConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Gateway connection configuration
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_url")]
    pub url: String,
    pub token: String,
    #[serde(default)]
    pub intents: GatewayIntents,
    /// Skip server certificate validation
    #[serde(default)]
    pub insecure: bool,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_hello_timeout_ms")]
    pub hello_timeout_ms: u64,
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    /// Upper bound of the heartbeat jitter, as a percentage of the interval
    #[serde(default = "default_jitter_percent")]
    pub jitter_percent: u8,
}

// Keep the credential out of logs
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("intents", &self.intents)
            .field("insecure", &self.insecure)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("hello_timeout_ms", &self.hello_timeout_ms)
            .field("handshake_timeout_ms", &self.handshake_timeout_ms)
            .field("jitter_percent", &self.jitter_percent)
            .finish()
    }
}

/// Reconnect backoff configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackoffConfig {
    #[serde(default = "default_backoff_initial_ms")]
    pub initial_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: default_backoff_initial_ms(),
            max_ms: default_backoff_max_ms(),
        }
    }
}

/// The monitored guild and its control channel
#[derive(Debug, Clone, Deserialize)]
pub struct GuildConfig {
    pub guild_id: Snowflake,
    pub control_channel_id: Snowflake,
    #[serde(default)]
    pub special_role_id: Option<Snowflake>,
}

/// Known identities and their hues
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Flat identifier list; `None` entries are placeholders
    #[serde(default)]
    pub known_ids: Vec<Option<Snowflake>>,
    #[serde(default = "default_user_options")]
    pub user_options: usize,
    #[serde(default = "default_user_hues")]
    pub hues: Vec<Hue>,
}

/// WiFi provisioning parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisioningConfig {
    #[serde(default)]
    pub portal_ssid: String,
}

// Default value functions
fn default_app_name() -> String {
    "gateway-signal".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_hello_timeout_ms() -> u64 {
    10_000
}

fn default_handshake_timeout_ms() -> u64 {
    30_000
}

fn default_jitter_percent() -> u8 {
    10
}

fn default_backoff_initial_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    60_000
}

fn default_user_options() -> usize {
    2
}

fn default_user_hues() -> Vec<Hue> {
    vec![Hue::new(145), Hue::new(96), Hue::new(15)]
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        _ => Ok(default),
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingVar(key))
}

fn parse_snowflake(key: &'static str, raw: &str) -> Result<Snowflake, ConfigError> {
    Snowflake::parse(raw).map_err(|_| ConfigError::InvalidValue(key, raw.to_string()))
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key, raw.to_string())),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let intents = match lookup("GATEWAY_INTENTS") {
            Some(raw) if !raw.trim().is_empty() => GatewayIntents::parse(&raw)
                .map_err(|_| ConfigError::InvalidValue("GATEWAY_INTENTS", raw))?,
            _ => GatewayIntents::default(),
        };

        let insecure = match lookup("GATEWAY_INSECURE") {
            Some(raw) if !raw.trim().is_empty() => parse_bool("GATEWAY_INSECURE", &raw)?,
            _ => false,
        };

        let jitter_percent =
            parse_or(&lookup, "HEARTBEAT_JITTER_PERCENT", default_jitter_percent())?;
        if jitter_percent > 10 {
            return Err(ConfigError::InvalidValue(
                "HEARTBEAT_JITTER_PERCENT",
                jitter_percent.to_string(),
            ));
        }

        let backoff = BackoffConfig {
            initial_ms: parse_or(&lookup, "BACKOFF_INITIAL_MS", default_backoff_initial_ms())?,
            max_ms: parse_or(&lookup, "BACKOFF_MAX_MS", default_backoff_max_ms())?,
        };
        if backoff.initial_ms == 0 || backoff.max_ms < backoff.initial_ms {
            return Err(ConfigError::InvalidValue(
                "BACKOFF_MAX_MS",
                format!("{} (initial {})", backoff.max_ms, backoff.initial_ms),
            ));
        }

        let special_role_id = match lookup("SPECIAL_ROLE_ID") {
            Some(raw) if !raw.trim().is_empty() => Some(parse_snowflake("SPECIAL_ROLE_ID", &raw)?),
            _ => None,
        };

        let known_ids = match lookup("KNOWN_IDS") {
            Some(raw) if !raw.trim().is_empty() => raw
                .split(',')
                .map(str::trim)
                .map(|s| {
                    if s.is_empty() {
                        Ok(None)
                    } else {
                        parse_snowflake("KNOWN_IDS", s).map(Some)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };

        let hues = match lookup("USER_HUES") {
            Some(raw) if !raw.trim().is_empty() => raw
                .split(',')
                .map(|s| {
                    Hue::parse(s)
                        .ok_or_else(|| ConfigError::InvalidValue("USER_HUES", s.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => default_user_hues(),
        };

        let token = required(&lookup, "BOT_TOKEN")?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            gateway: GatewayConfig {
                url: lookup("GATEWAY_URL")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(default_gateway_url),
                token: token.strip_prefix("Bot ").unwrap_or(&token).to_string(),
                intents,
                insecure,
                connect_timeout_ms: parse_or(
                    &lookup,
                    "CONNECT_TIMEOUT_MS",
                    default_connect_timeout_ms(),
                )?,
                hello_timeout_ms: parse_or(
                    &lookup,
                    "HELLO_TIMEOUT_MS",
                    default_hello_timeout_ms(),
                )?,
                handshake_timeout_ms: parse_or(
                    &lookup,
                    "HANDSHAKE_TIMEOUT_MS",
                    default_handshake_timeout_ms(),
                )?,
                jitter_percent,
            },
            backoff,
            guild: GuildConfig {
                guild_id: parse_snowflake("GUILD_ID", &required(&lookup, "GUILD_ID")?)?,
                control_channel_id: parse_snowflake(
                    "CONTROL_CHANNEL_ID",
                    &required(&lookup, "CONTROL_CHANNEL_ID")?,
                )?,
                special_role_id,
            },
            identities: IdentityConfig {
                known_ids,
                user_options: parse_or(&lookup, "USER_OPTIONS", default_user_options())?,
                hues,
            },
            provisioning: ProvisioningConfig {
                portal_ssid: lookup("PORTAL_SSID").unwrap_or_default(),
            },
        })
    }

    /// Build the known-identity table described by this configuration
    pub fn identity_table(&self) -> Result<KnownIdentityTable, IdentityError> {
        KnownIdentityTable::from_flat(
            &self.identities.known_ids,
            self.identities.user_options,
            &self.identities.hues,
            self.guild.special_role_id,
        )
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
