//! Test fixtures and event payloads
//!
//! Provides the guild layout, identity table and client settings shared by
//! the gateway scenarios.

use serde_json::{json, Value};
use signal_common::BackoffConfig;
use signal_core::{GatewayIntents, Hue, KnownIdentityTable, Snowflake};
use signal_gateway::dispatcher::{DispatchScope, EventDispatcher};
use signal_gateway::session::ClientSettings;
use std::time::Duration;

pub const TOKEN: &str = "test-token";
pub const ENDPOINT: &str = "wss://gateway.test/?v=10&encoding=json";
pub const RESUME_URL: &str = "wss://resume.test";
pub const HEARTBEAT_INTERVAL_MS: u64 = 45_000;

pub const GUILD_ID: Snowflake = Snowflake::new(1000);
pub const CONTROL_CHANNEL_ID: Snowflake = Snowflake::new(2000);
pub const OTHER_CHANNEL_ID: Snowflake = Snowflake::new(2001);
pub const SPECIAL_ROLE_ID: Snowflake = Snowflake::new(3000);

/// Slot 0, first alias
pub const ALICE: Snowflake = Snowflake::new(111);
/// Slot 0, second alias
pub const ALICE_ALT: Snowflake = Snowflake::new(112);
/// Slot 1
pub const BOB: Snowflake = Snowflake::new(222);
pub const STRANGER: Snowflake = Snowflake::new(999);

pub const ALICE_HUE: Hue = Hue::new(145);
pub const BOB_HUE: Hue = Hue::new(96);

pub fn identity_table() -> KnownIdentityTable {
    KnownIdentityTable::from_flat(
        &[Some(ALICE), Some(ALICE_ALT), Some(BOB), None],
        2,
        &[ALICE_HUE, BOB_HUE],
        Some(SPECIAL_ROLE_ID),
    )
    .expect("fixture identity table is valid")
}

pub fn dispatcher() -> EventDispatcher {
    EventDispatcher::new(
        GatewayIntents::SIGNAL_DEFAULT,
        DispatchScope::new(GUILD_ID, CONTROL_CHANNEL_ID),
        identity_table(),
    )
}

/// Settings with fixed timeouts and no heartbeat jitter
pub fn settings() -> ClientSettings {
    let mut settings = ClientSettings::new(ENDPOINT, TOKEN, GatewayIntents::SIGNAL_DEFAULT);
    settings.connect_timeout = Duration::from_secs(5);
    settings.hello_timeout = Duration::from_secs(10);
    settings.handshake_timeout = Duration::from_secs(30);
    settings.jitter_percent = 0;
    settings.backoff = BackoffConfig {
        initial_ms: 1_000,
        max_ms: 8_000,
    };
    settings
}

// ============================================================================
// Dispatch payloads
// ============================================================================

pub fn ready(session_id: &str) -> Value {
    json!({
        "v": 10,
        "user": {"id": "1", "username": "signal", "bot": true},
        "guilds": [{"id": GUILD_ID.to_string(), "unavailable": true}],
        "session_id": session_id,
        "resume_gateway_url": RESUME_URL
    })
}

pub fn reaction_add(user: Snowflake, channel: Snowflake, roles: &[Snowflake]) -> Value {
    let roles: Vec<String> = roles.iter().map(ToString::to_string).collect();
    json!({
        "user_id": user.to_string(),
        "channel_id": channel.to_string(),
        "message_id": "5000",
        "guild_id": GUILD_ID.to_string(),
        "member": {"roles": roles, "user": {"id": user.to_string()}},
        "emoji": {"id": null, "name": "👍"}
    })
}

pub fn reaction_remove(user: Snowflake, channel: Snowflake) -> Value {
    json!({
        "user_id": user.to_string(),
        "channel_id": channel.to_string(),
        "message_id": "5000",
        "guild_id": GUILD_ID.to_string(),
        "emoji": {"id": null, "name": "👍"}
    })
}

pub fn typing_start(user: Snowflake, channel: Snowflake) -> Value {
    json!({
        "channel_id": channel.to_string(),
        "guild_id": GUILD_ID.to_string(),
        "user_id": user.to_string(),
        "timestamp": 1_700_000_000
    })
}

pub fn voice_state(user: Snowflake, channel: Option<Snowflake>) -> Value {
    json!({
        "guild_id": GUILD_ID.to_string(),
        "channel_id": channel.map(|c| c.to_string()),
        "user_id": user.to_string(),
        "session_id": "voice-session"
    })
}
