//! # signal-gateway
//!
//! Long-lived chat gateway client that maps guild activity onto device signals.

pub mod dispatcher;
pub mod events;
pub mod protocol;
pub mod session;
pub mod signal;
pub mod transport;

use signal_common::{AppConfig, AppError, AppResult};
use tokio_util::sync::CancellationToken;

use crate::dispatcher::{DispatchScope, EventDispatcher};
use crate::session::{ClientSettings, GatewayClient};
use crate::signal::{DefaultEffectPolicy, LogEffectSink, SignalController};
use crate::transport::{TlsMode, WsConnector};

/// Run the gateway client until Ctrl-C or a fatal session error
pub async fn run(config: AppConfig) -> AppResult<()> {
    let identities = config.identity_table()?;
    let scope = DispatchScope::new(config.guild.guild_id, config.guild.control_channel_id);

    tracing::info!(
        guild_id = %scope.guild_id,
        control_channel_id = %scope.control_channel_id,
        identities = identities.len(),
        special_role = ?identities.special_role(),
        "Signal routing configured"
    );
    if !config.provisioning.portal_ssid.is_empty() {
        tracing::info!(ssid = %config.provisioning.portal_ssid, "Provisioning portal configured");
    }

    let settings = ClientSettings::from_config(&config.gateway, &config.backoff);
    if settings.tls_mode == TlsMode::Insecure {
        tracing::warn!("Server certificate validation is disabled");
    }

    let dispatcher = EventDispatcher::new(settings.intents, scope, identities);
    let controller = SignalController::new(LogEffectSink, DefaultEffectPolicy);

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown requested");
                trigger.cancel();
            }
            // Without a handler the client runs until the gateway ends it
            Err(e) => tracing::warn!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    let mut client = GatewayClient::new(
        WsConnector::new(),
        settings,
        dispatcher,
        controller,
        shutdown,
    );
    client.run().await.map_err(AppError::from)?;

    tracing::info!("Gateway client stopped");
    Ok(())
}
