//! Log subscriber installation
//!
//! `RUST_LOG` always wins; otherwise the directives of the chosen profile
//! apply. The websocket stack is noisy at debug level, so development keeps
//! it at info.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Environment;

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human oriented
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event, for log shippers
    Json,
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter directives used when `RUST_LOG` is unset
    pub directives: String,
    pub format: LogFormat,
    /// Attach file and line to every event
    pub source_location: bool,
    pub ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            directives: "info".to_string(),
            format: LogFormat::Compact,
            source_location: false,
            ansi: true,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn development() -> Self {
        Self {
            directives: "debug,tungstenite=info,tokio_tungstenite=info,rustls=info".to_string(),
            format: LogFormat::Pretty,
            source_location: true,
            ansi: true,
        }
    }

    #[must_use]
    pub fn production() -> Self {
        Self {
            directives: "info".to_string(),
            format: LogFormat::Json,
            source_location: false,
            ansi: false,
        }
    }

    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Staging => Self::default(),
            Environment::Production => Self::production(),
        }
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.directives)
                .map_err(|e| TracingError::InvalidDirectives(e.to_string())),
        }
    }
}

/// Install the subscriber for the default profile
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(&TracingConfig::default())
}

/// Install the subscriber; fails if one is already installed
pub fn try_init_tracing_with_config(config: &TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;
    let location = config.source_location;

    let layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_ansi(config.ansi)
            .with_file(location)
            .with_line_number(location)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_ansi(config.ansi)
            .with_file(location)
            .with_line_number(location)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(false)
            .with_file(location)
            .with_line_number(location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("a global subscriber is already installed")]
    AlreadyInitialized,

    #[error("invalid log directives: {0}")]
    InvalidDirectives(String),
}
