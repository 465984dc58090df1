//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BackoffConfig, ConfigError, Environment, GatewayConfig, GuildConfig,
    IdentityConfig, ProvisioningConfig,
};
