//! Signal gateway entry point
//!
//! Run with:
//! ```bash
//! cargo run -p signal-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use signal_common::{
    try_init_tracing, try_init_tracing_with_config, AppConfig, AppError, TracingConfig,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Err(e) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {e}");
            }
            let err = AppError::from(e);
            error!(error = %err, code = err.error_code(), "Failed to load configuration");
            std::process::exit(err.exit_code());
        }
    };

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        gateway = ?config.gateway,
        "Configuration loaded"
    );

    if let Err(e) = signal_gateway::run(config).await {
        error!(error = %e, code = e.error_code(), fatal = e.is_fatal(), "Gateway client failed");
        std::process::exit(e.exit_code());
    }
}
