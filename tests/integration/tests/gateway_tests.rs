//! Gateway session integration tests
//!
//! Every test drives the client against the in-memory gateway on a paused
//! clock, so heartbeat, handshake and backoff timers fire deterministically.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use integration_tests::*;
use serde_json::{json, Value};
use signal_common::AppError;
use signal_core::CommandKind;
use signal_gateway::protocol::{GatewayMessage, OpCode};
use signal_gateway::session::{GatewayError, SessionState};
use signal_gateway::signal::{DeviceStatus, Effect, EffectTarget, Pattern};
use std::time::Duration;
use tokio::time::Instant;

fn resume_endpoint() -> String {
    format!("{RESUME_URL}/?v=10&encoding=json")
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_identify_carries_token_and_intents() {
    let mut harness = Harness::start();
    let mut server = harness.accept().await;

    let identify = harness.identify(&mut server, "session-a").await;
    let payload = identify.as_identify().expect("identify payload");
    assert_eq!(payload.token, TOKEN);
    assert_eq!(payload.intents.bits(), 3714);

    assert_eq!(harness.connector.endpoints(), vec![ENDPOINT.to_string()]);
    assert_eq!(*harness.states.borrow(), SessionState::Established);
    assert_eq!(
        harness.sink.statuses(),
        vec![DeviceStatus::Connecting, DeviceStatus::Online]
    );

    harness.stop();
    let (result, client) = harness.join().await;
    assert!(result.is_ok());
    assert_eq!(client.session().session_id(), Some("session-a"));
    assert_eq!(client.session().resume_url(), Some(RESUME_URL));
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_before_ready_is_ignored() {
    let mut harness = Harness::start();
    let mut server = harness.accept().await;

    server.hello();
    server.expect(OpCode::Identify).await;
    server.dispatch("MESSAGE_REACTION_ADD", 1, reaction_add(BOB, CONTROL_CHANNEL_ID, &[]));
    server.dispatch("READY", 2, ready("session-a"));
    harness.wait_status(DeviceStatus::Online).await;

    server.dispatch("MESSAGE_REACTION_ADD", 3, reaction_add(ALICE, CONTROL_CHANNEL_ID, &[]));
    let request = harness.next_effect().await;
    assert_eq!(request.target, EffectTarget::Identity { slot: 0 });
    assert_eq!(harness.sink.effects().len(), 1);

    harness.stop();
    let (_, client) = harness.join().await;
    assert_eq!(client.session().last_sequence(), Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_hello_timeout_reconnects() {
    let mut harness = Harness::start();
    let _silent = harness.accept().await;

    let started = Instant::now();
    let mut server = harness.accept().await;
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(11), "waited {waited:?}");
    assert!(waited < Duration::from_secs(12), "waited {waited:?}");

    harness.identify(&mut server, "session-a").await;
    assert_eq!(harness.connector.connects(), 2);
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_handshake_timeout_reconnects() {
    let mut harness = Harness::start();
    let mut stalled = harness.accept().await;
    stalled.hello();
    stalled.expect(OpCode::Identify).await;

    // No READY: the handshake deadline ends the link
    let mut server = harness.accept().await;
    let identify = harness.identify(&mut server, "session-a").await;
    assert_eq!(identify.op, OpCode::Identify);
    assert_eq!(harness.connector.connects(), 2);
    harness.stop();
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_known_reaction_lights_identity_hue() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;

    server.dispatch("MESSAGE_REACTION_ADD", 2, reaction_add(BOB, CONTROL_CHANNEL_ID, &[]));
    let first = harness.next_effect().await;
    assert_eq!(first.target, EffectTarget::Identity { slot: 1 });
    assert_eq!(first.kind, CommandKind::ReactionAdded);
    assert_eq!(first.effect, Effect::new(Pattern::Solid, Some(BOB_HUE)));

    // The same event delivered twice leaves the same state
    server.dispatch("MESSAGE_REACTION_ADD", 3, reaction_add(BOB, CONTROL_CHANNEL_ID, &[]));
    assert_eq!(harness.next_effect().await, first);

    server.dispatch("MESSAGE_REACTION_REMOVE", 4, reaction_remove(BOB, CONTROL_CHANNEL_ID));
    let cleared = harness.next_effect().await;
    assert_eq!(cleared.kind, CommandKind::ReactionRemoved);
    assert!(cleared.effect.is_off());

    harness.stop();
    let (_, client) = harness.join().await;
    assert_eq!(
        client.controller().desired(EffectTarget::Identity { slot: 1 }),
        Some(Effect::OFF)
    );
    assert_eq!(client.session().last_sequence(), Some(4));
}

#[tokio::test(start_paused = true)]
async fn test_events_outside_scope_produce_no_effect() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;

    server.dispatch("MESSAGE_REACTION_ADD", 2, reaction_add(ALICE, OTHER_CHANNEL_ID, &[]));
    server.dispatch("MESSAGE_REACTION_ADD", 3, reaction_add(STRANGER, CONTROL_CHANNEL_ID, &[]));
    server.dispatch("TYPING_START", 4, typing_start(ALICE, OTHER_CHANNEL_ID));
    server.dispatch("GUILD_CREATE", 5, json!({"id": GUILD_ID.to_string()}));

    // Frames are handled in order, so the first effect seen is this one
    server.dispatch("MESSAGE_REACTION_ADD", 6, reaction_add(ALICE_ALT, CONTROL_CHANNEL_ID, &[]));
    let request = harness.next_effect().await;
    assert_eq!(request.target, EffectTarget::Identity { slot: 0 });
    assert_eq!(request.effect.hue, Some(ALICE_HUE));
    assert_eq!(harness.sink.effects().len(), 1);

    harness.stop();
    let (_, client) = harness.join().await;
    assert_eq!(client.session().last_sequence(), Some(6));
}

#[tokio::test(start_paused = true)]
async fn test_special_role_reaction_uses_shared_light() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;

    server.dispatch(
        "MESSAGE_REACTION_ADD",
        2,
        reaction_add(STRANGER, CONTROL_CHANNEL_ID, &[SPECIAL_ROLE_ID]),
    );
    let request = harness.next_effect().await;
    assert_eq!(request.target, EffectTarget::SpecialRole);
    assert_eq!(request.effect, Effect::new(Pattern::Rainbow, None));
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_special_role_reaction_removal_clears_shared_light() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;

    server.dispatch(
        "MESSAGE_REACTION_ADD",
        2,
        reaction_add(ALICE, CONTROL_CHANNEL_ID, &[SPECIAL_ROLE_ID]),
    );
    assert_eq!(harness.next_effect().await.target, EffectTarget::SpecialRole);

    // Removals carry no member roles
    server.dispatch("MESSAGE_REACTION_REMOVE", 3, reaction_remove(ALICE, CONTROL_CHANNEL_ID));
    let cleared = harness.next_effect().await;
    assert_eq!(cleared.target, EffectTarget::SpecialRole);
    assert!(cleared.effect.is_off());

    harness.stop();
    let (_, client) = harness.join().await;
    assert_eq!(client.controller().desired(EffectTarget::SpecialRole), Some(Effect::OFF));
    assert_eq!(client.controller().desired(EffectTarget::Identity { slot: 0 }), None);
}

#[tokio::test(start_paused = true)]
async fn test_typing_and_voice_activity() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;

    server.dispatch("TYPING_START", 2, typing_start(ALICE, CONTROL_CHANNEL_ID));
    let typing = harness.next_effect().await;
    assert_eq!(typing.effect, Effect::new(Pattern::Blink, Some(ALICE_HUE)));

    server.dispatch("VOICE_STATE_UPDATE", 3, voice_state(BOB, Some(OTHER_CHANNEL_ID)));
    let joined = harness.next_effect().await;
    assert_eq!(joined.kind, CommandKind::VoiceJoined);
    assert_eq!(joined.effect, Effect::new(Pattern::Pulse, Some(BOB_HUE)));

    server.dispatch("VOICE_STATE_UPDATE", 4, voice_state(BOB, None));
    let left = harness.next_effect().await;
    assert_eq!(left.kind, CommandKind::VoiceLeft);
    assert!(left.effect.is_off());
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_malformed_frames_are_dropped() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;

    server.send_raw("not json");
    server.send_raw(r#"{"op":0,"t":"MESSAGE_REACTION_ADD","s":2,"d":{"user_id":"nope"}}"#);
    server.send_raw(r#"{"op":10,"d":{"interval":5}}"#);
    server.send_raw(r#"{"op":42}"#);
    server.dispatch("MESSAGE_REACTION_ADD", 3, reaction_add(BOB, CONTROL_CHANNEL_ID, &[]));

    let request = harness.next_effect().await;
    assert_eq!(request.target, EffectTarget::Identity { slot: 1 });
    assert_eq!(harness.connector.connects(), 1);

    harness.stop();
    let (_, client) = harness.join().await;
    assert_eq!(client.session().last_sequence(), Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_hello_is_dropped() {
    let mut settings = settings();
    settings.jitter_percent = 10;
    let mut harness = Harness::start_with(settings);
    let mut server = harness.accept().await;

    server.send_raw(r#"{"op":10,"d":{"heartbeat_interval":18446744073709551615}}"#);
    server.hello();
    server.expect(OpCode::Identify).await;
    server.dispatch("READY", 1, ready("session-a"));
    harness.wait_status(DeviceStatus::Online).await;

    // The jittered heartbeat comes from the valid Hello
    let started = Instant::now();
    server.next_heartbeat().await;
    let waited = started.elapsed();
    assert!(waited >= Duration::from_millis(40_500), "waited {waited:?}");
    assert!(waited <= Duration::from_millis(45_000), "waited {waited:?}");
    assert_eq!(harness.connector.connects(), 1);
    harness.stop();
}

// ============================================================================
// Heartbeat
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_acknowledged_heartbeats_keep_the_link() {
    let mut harness = Harness::start();
    let mut server = harness.establish("session-a").await;

    for _ in 0..3 {
        let heartbeat = server.next_heartbeat().await;
        assert_eq!(heartbeat.as_heartbeat_seq(), Some(Some(1)));
        server.ack();
    }

    assert_eq!(harness.connector.connects(), 1);
    assert_eq!(*harness.states.borrow(), SessionState::Established);
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_server_heartbeat_request_is_answered_immediately() {
    let mut harness = Harness::start();
    let mut server = harness.establish("session-a").await;

    let before = Instant::now();
    server.send(&GatewayMessage::heartbeat(None));
    let heartbeat = server.next_heartbeat().await;
    assert_eq!(heartbeat.as_heartbeat_seq(), Some(Some(1)));
    assert_eq!(before.elapsed(), Duration::ZERO);
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_missed_ack_resumes_with_last_sequence() {
    let mut harness = Harness::start();
    let mut server = harness.establish("session-a").await;

    server.dispatch("TYPING_START", 5, typing_start(ALICE, CONTROL_CHANNEL_ID));
    harness.next_effect().await;

    let heartbeat = server.next_heartbeat().await;
    assert_eq!(heartbeat.as_heartbeat_seq(), Some(Some(5)));

    // Never acknowledged: the next tick drops the link
    let mut resumed = harness.accept().await;
    resumed.hello();
    let resume = resumed.expect(OpCode::Resume).await;
    let payload = resume.as_resume().expect("resume payload");
    assert_eq!(payload.token, TOKEN);
    assert_eq!(payload.session_id, "session-a");
    assert_eq!(payload.seq, 5);

    resumed.dispatch("RESUMED", 6, Value::Null);
    harness.wait_status(DeviceStatus::Online).await;

    assert_eq!(harness.connector.connects(), 2);
    assert_eq!(harness.connector.endpoints()[1], resume_endpoint());
    assert!(harness.sink.statuses().contains(&DeviceStatus::Backoff));

    harness.stop();
    let (_, client) = harness.join().await;
    assert_eq!(client.session().session_id(), Some("session-a"));
    assert_eq!(client.session().last_sequence(), Some(6));
}

// ============================================================================
// Reconnect and invalidation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_reconnect_request_resumes() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;

    server.send(&GatewayMessage::reconnect());

    let mut resumed = harness.accept().await;
    resumed.hello();
    let payload = resumed
        .expect(OpCode::Resume)
        .await
        .as_resume()
        .expect("resume payload");
    assert_eq!(payload.seq, 1);
    resumed.dispatch("RESUMED", 2, Value::Null);
    harness.wait_status(DeviceStatus::Online).await;

    // Replayed events are routed while resuming and after
    resumed.dispatch("MESSAGE_REACTION_ADD", 3, reaction_add(BOB, CONTROL_CHANNEL_ID, &[]));
    assert_eq!(
        harness.next_effect().await.target,
        EffectTarget::Identity { slot: 1 }
    );
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_rejected_resume_identifies_on_same_link() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;
    server.send(&GatewayMessage::reconnect());

    let mut second = harness.accept().await;
    second.hello();
    second.expect(OpCode::Resume).await;
    second.send(&GatewayMessage::invalid_session(false));

    let identify = second.expect(OpCode::Identify).await;
    assert_eq!(identify.as_identify().expect("identify payload").token, TOKEN);
    second.dispatch("READY", 1, ready("session-b"));
    harness.wait_status(DeviceStatus::Online).await;

    assert_eq!(harness.connector.connects(), 2);
    harness.stop();
    let (_, client) = harness.join().await;
    assert_eq!(client.session().session_id(), Some("session-b"));
}

#[tokio::test(start_paused = true)]
async fn test_resumable_invalid_session_reconnects_to_resume() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;
    server.send(&GatewayMessage::invalid_session(true));

    let mut second = harness.accept().await;
    second.hello();
    let payload = second
        .expect(OpCode::Resume)
        .await
        .as_resume()
        .expect("resume payload");
    assert_eq!(payload.session_id, "session-a");
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_invalid_session_while_established_identifies_fresh() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;
    server.send(&GatewayMessage::invalid_session(false));

    let mut second = harness.accept().await;
    harness.identify(&mut second, "session-b").await;
    assert_eq!(
        harness.connector.endpoints(),
        vec![ENDPOINT.to_string(), ENDPOINT.to_string()]
    );
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_session_timeout_close_identifies_fresh() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;
    server.close(4009, "Session timed out.");

    let mut second = harness.accept().await;
    let identify = harness.identify(&mut second, "session-b").await;
    assert_eq!(identify.op, OpCode::Identify);
    assert_eq!(harness.connector.endpoints()[1], ENDPOINT);
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_abnormal_close_resumes() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;
    drop(server);

    let mut second = harness.accept().await;
    second.hello();
    second.expect(OpCode::Resume).await;
    assert_eq!(harness.connector.endpoints()[1], resume_endpoint());
    harness.stop();
}

// ============================================================================
// Backoff
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_refused_connects_back_off_exponentially() {
    let mut harness = Harness::start();
    harness
        .connector
        .plan([ConnectPlan::Refuse, ConnectPlan::Refuse]);

    let started = Instant::now();
    let mut server = harness.accept().await;
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(3), "waited {waited:?}");
    assert!(waited < Duration::from_secs(4), "waited {waited:?}");
    assert_eq!(harness.connector.connects(), 3);
    assert_eq!(
        harness.sink.statuses(),
        vec![
            DeviceStatus::Connecting,
            DeviceStatus::Backoff,
            DeviceStatus::Connecting,
            DeviceStatus::Backoff,
            DeviceStatus::Connecting,
        ]
    );

    // An established session resets the delay
    harness.identify(&mut server, "session-a").await;
    server.close(1006, "");
    let started = Instant::now();
    let _second = harness.accept().await;
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(1), "waited {waited:?}");
    assert!(waited < Duration::from_secs(2), "waited {waited:?}");
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_backoff_is_capped() {
    let mut harness = Harness::start();
    harness.connector.plan([ConnectPlan::Refuse; 6]);

    let started = Instant::now();
    let _server = harness.accept().await;
    // 1 + 2 + 4 + 8 + 8 + 8 seconds
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(31), "waited {waited:?}");
    assert!(waited < Duration::from_secs(32), "waited {waited:?}");
    harness.stop();
}

// ============================================================================
// Fatal closes
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_authentication_failure_is_fatal() {
    let mut harness = Harness::start();
    let connector = harness.connector.clone();
    let sink = harness.sink.clone();

    let mut server = harness.accept().await;
    server.hello();
    server.expect(OpCode::Identify).await;
    server.close(4004, "Authentication failed.");

    let (result, client) = harness.join().await;
    let err = result.expect_err("authentication failure ends the session");
    assert!(matches!(
        err,
        GatewayError::AuthenticationFailed(ref info) if info.code == 4004
    ));
    assert_eq!(AppError::from(err).exit_code(), 77);

    assert_eq!(connector.connects(), 1);
    let fatal = sink
        .statuses()
        .into_iter()
        .filter(|status| *status == DeviceStatus::Fatal)
        .count();
    assert_eq!(fatal, 1);
    assert_eq!(client.state(), SessionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_disallowed_intents_are_fatal() {
    let mut harness = Harness::start();
    let connector = harness.connector.clone();
    let server = harness.establish("session-a").await;
    server.close(4014, "Disallowed intent(s).");

    let (result, _) = harness.join().await;
    let err = result.expect_err("intent rejection ends the session");
    assert!(matches!(err, GatewayError::IntentsRejected(_)));
    assert!(AppError::from(err).is_fatal());
    assert_eq!(connector.connects(), 1);
}

// ============================================================================
// Stalled links
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_stalled_close_does_not_block_reconnect() {
    let mut harness = Harness::start();
    let mut server = harness.establish("session-a").await;
    server.stall_close();

    // Unacknowledged: the next tick drops the link, whose close never finishes
    server.next_heartbeat().await;
    let started = Instant::now();
    let mut resumed = harness.accept().await;
    // 45s to the missed tick, 5s close timeout, 1s backoff
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(51), "waited {waited:?}");
    assert!(waited < Duration::from_secs(52), "waited {waited:?}");

    resumed.hello();
    resumed.expect(OpCode::Resume).await;
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_stalled_write_reconnects_to_resume() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;
    server.stall_writes();

    let started = Instant::now();
    let mut resumed = harness.accept().await;
    // Heartbeat due at 45s, write timeout 5s, backoff 1s
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(51), "waited {waited:?}");
    assert!(waited < Duration::from_secs(52), "waited {waited:?}");

    resumed.hello();
    let resume = resumed.expect(OpCode::Resume).await;
    assert_eq!(resume.as_resume().expect("resume payload").session_id, "session-a");
    harness.stop();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_stalled_close() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;
    server.stall_close();
    let mut states = harness.states.clone();

    server.close(1006, "");
    states
        .wait_for(|state| *state == SessionState::Reconnecting)
        .await
        .expect("client alive");

    let stopped = Instant::now();
    harness.stop();
    let connector = harness.connector.clone();
    let (result, client) = harness.join().await;
    assert!(result.is_ok());
    assert!(stopped.elapsed() < Duration::from_secs(5));
    assert_eq!(connector.connects(), 1);
    assert_eq!(client.state(), SessionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_with_stalled_close_is_bounded() {
    let mut harness = Harness::start();
    let server = harness.establish("session-a").await;
    server.stall_close();

    let stopped = Instant::now();
    harness.stop();
    let (result, _) = harness.join().await;
    assert!(result.is_ok());
    let waited = stopped.elapsed();
    assert!(waited >= Duration::from_secs(5), "waited {waited:?}");
    assert!(waited < Duration::from_secs(6), "waited {waited:?}");
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_the_link() {
    let mut harness = Harness::start();
    let mut server = harness.establish("session-a").await;
    let states = harness.states.clone();
    let sink = harness.sink.clone();

    harness.stop();
    let (result, client) = harness.join().await;
    assert!(result.is_ok());
    server.closed().await;

    assert_eq!(client.state(), SessionState::Disconnected);
    assert_eq!(*states.borrow(), SessionState::Disconnected);
    assert!(!sink.statuses().contains(&DeviceStatus::Fatal));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_backoff() {
    let mut harness = Harness::start();
    harness.connector.plan([ConnectPlan::Refuse; 4]);
    let connector = harness.connector.clone();

    harness.wait_status(DeviceStatus::Backoff).await;
    harness.stop();
    let (result, _) = harness.join().await;
    assert!(result.is_ok());
    assert_eq!(connector.connects(), 1);
}
