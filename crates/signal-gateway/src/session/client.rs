//! Gateway client
//!
//! One task owns the link and drives the session state machine. Timers and
//! shutdown are raced against the next inbound frame, so frames are handled
//! strictly in arrival order and sequence/ACK tracking never interleaves with
//! frame processing.

use signal_common::{BackoffConfig, GatewayConfig};
use signal_core::GatewayIntents;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, sleep_until, timeout, Instant};
use tokio_util::sync::CancellationToken;

use super::{
    Backoff, GatewayError, GatewayResult, Heartbeat, HeartbeatTick, Session, SessionState,
};
use crate::dispatcher::{DispatchEvent, EventDispatcher, InboundEvent};
use crate::protocol::{
    disposition_for, CloseCode, CloseDisposition, ConnectionProperties, GatewayMessage,
    IdentifyPayload, OpCode,
};
use crate::signal::{DeviceStatus, EffectPolicy, EffectSink, SignalController};
use crate::transport::{CloseInfo, Connector, Inbound, Link, TlsMode};

/// Connection parameters for the client
#[derive(Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    pub token: String,
    pub intents: GatewayIntents,
    pub tls_mode: TlsMode,
    /// Bounds opening a link, every frame write and the closing handshake
    pub connect_timeout: Duration,
    pub hello_timeout: Duration,
    /// Time allowed between Hello and READY/RESUMED
    pub handshake_timeout: Duration,
    pub jitter_percent: u8,
    pub backoff: BackoffConfig,
    pub properties: ConnectionProperties,
}

impl ClientSettings {
    /// Settings with default timeouts, jitter and backoff
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        intents: GatewayIntents,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            intents,
            tls_mode: TlsMode::Verified,
            connect_timeout: Duration::from_secs(10),
            hello_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(30),
            jitter_percent: 10,
            backoff: BackoffConfig::default(),
            properties: ConnectionProperties::default(),
        }
    }

    #[must_use]
    pub fn from_config(gateway: &GatewayConfig, backoff: &BackoffConfig) -> Self {
        Self {
            endpoint: gateway.url.clone(),
            token: gateway.token.clone(),
            intents: gateway.intents,
            tls_mode: TlsMode::from_insecure_flag(gateway.insecure),
            connect_timeout: Duration::from_millis(gateway.connect_timeout_ms),
            hello_timeout: Duration::from_millis(gateway.hello_timeout_ms),
            handshake_timeout: Duration::from_millis(gateway.handshake_timeout_ms),
            jitter_percent: gateway.jitter_percent,
            backoff: backoff.clone(),
            properties: ConnectionProperties::default(),
        }
    }
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("intents", &self.intents)
            .field("tls_mode", &self.tls_mode)
            .field("connect_timeout", &self.connect_timeout)
            .field("hello_timeout", &self.hello_timeout)
            .field("handshake_timeout", &self.handshake_timeout)
            .field("jitter_percent", &self.jitter_percent)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

/// Endpoint for a resume connection
///
/// Resume URLs handed out in READY carry no query string; the configured
/// endpoint's version and encoding parameters are carried over.
#[must_use]
pub fn resume_endpoint(resume_url: &str, endpoint: &str) -> String {
    if resume_url.contains('?') {
        return resume_url.to_string();
    }
    match endpoint.split_once('?') {
        Some((_, query)) => format!("{}/?{query}", resume_url.trim_end_matches('/')),
        None => resume_url.to_string(),
    }
}

/// How one link ended
#[derive(Debug)]
enum LinkOutcome {
    Shutdown,
    Reconnect { resume: bool },
    Fatal(GatewayError),
}

/// Effect of one handled frame on the link loop
#[derive(Debug)]
enum FrameOutcome {
    Continue,
    /// READY or RESUMED arrived
    HandshakeComplete,
    /// A fresh Identify replaced a rejected Resume
    HandshakeRestarted,
    End(LinkOutcome),
}

/// Long-lived gateway session client
pub struct GatewayClient<C, S, P> {
    connector: C,
    settings: ClientSettings,
    session: Session,
    backoff: Backoff,
    dispatcher: EventDispatcher,
    controller: SignalController<S, P>,
    shutdown: CancellationToken,
    state_tx: watch::Sender<SessionState>,
}

impl<C, S, P> GatewayClient<C, S, P>
where
    C: Connector,
    S: EffectSink,
    P: EffectPolicy,
{
    pub fn new(
        connector: C,
        settings: ClientSettings,
        dispatcher: EventDispatcher,
        controller: SignalController<S, P>,
        shutdown: CancellationToken,
    ) -> Self {
        let backoff = Backoff::from(&settings.backoff);
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        Self {
            connector,
            settings,
            session: Session::new(),
            backoff,
            dispatcher,
            controller,
            shutdown,
            state_tx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn controller(&self) -> &SignalController<S, P> {
        &self.controller
    }

    /// Observe state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Run until shutdown is requested or the gateway ends the session for good
    ///
    /// Transient failures never surface here; they are retried with backoff.
    pub async fn run(&mut self) -> GatewayResult<()> {
        let result = loop {
            if self.shutdown.is_cancelled() {
                break Ok(());
            }

            self.transition(SessionState::Connecting);
            self.controller.indicate(DeviceStatus::Connecting);

            match self.connect_and_drive().await {
                LinkOutcome::Shutdown => break Ok(()),
                LinkOutcome::Fatal(err) => {
                    let explanation = CloseCode::from_u16(err.close_info().code)
                        .map_or("unrecognised close code", CloseCode::description);
                    tracing::error!(error = %err, explanation, "Gateway session ended fatally");
                    self.controller.indicate(DeviceStatus::Fatal);
                    break Err(err);
                }
                LinkOutcome::Reconnect { resume } => {
                    if !resume {
                        self.session.clear();
                    }

                    let delay = self.backoff.next_delay();
                    tracing::info!(
                        delay_ms = delay.as_millis() as u64,
                        attempt = self.backoff.attempts(),
                        resume = self.session.can_resume(),
                        "Reconnecting after backoff"
                    );
                    self.controller.indicate(DeviceStatus::Backoff);

                    tokio::select! {
                        () = sleep(delay) => {}
                        () = self.shutdown.cancelled() => break Ok(()),
                    }
                }
            }
        };

        self.transition(SessionState::Disconnected);
        result
    }

    async fn connect_and_drive(&mut self) -> LinkOutcome {
        let endpoint = match self.session.resume_url() {
            Some(url) if self.session.can_resume() => resume_endpoint(url, &self.settings.endpoint),
            _ => self.settings.endpoint.clone(),
        };
        tracing::info!(endpoint = %endpoint, "Connecting to gateway");

        let connect_timeout = self.settings.connect_timeout;
        let tls_mode = self.settings.tls_mode;
        let mut link = tokio::select! {
            result = timeout(connect_timeout, self.connector.connect(&endpoint, tls_mode)) => {
                match result {
                    Ok(Ok(link)) => link,
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Gateway connection failed");
                        self.transition(SessionState::Disconnected);
                        return LinkOutcome::Reconnect { resume: true };
                    }
                    Err(_) => {
                        tracing::warn!(
                            timeout_ms = connect_timeout.as_millis() as u64,
                            "Gateway connection timed out"
                        );
                        self.transition(SessionState::Disconnected);
                        return LinkOutcome::Reconnect { resume: true };
                    }
                }
            }
            () = self.shutdown.cancelled() => return LinkOutcome::Shutdown,
        };

        let outcome = self.drive(&mut link).await;
        self.close_link(&mut link, &outcome).await;
        outcome
    }

    /// Close the link, giving up after the connect timeout
    ///
    /// On the way to a reconnect a shutdown request also ends the wait.
    async fn close_link(&self, link: &mut C::Link, outcome: &LinkOutcome) {
        let limit = self.settings.connect_timeout;
        let closing = timeout(limit, link.close());

        let result = if matches!(outcome, LinkOutcome::Shutdown) {
            closing.await
        } else {
            tokio::select! {
                result = closing => result,
                () = self.shutdown.cancelled() => {
                    tracing::debug!("Shutdown requested while closing the link");
                    return;
                }
            }
        };

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(error = %e, "Closing link failed"),
            Err(_) => tracing::warn!(
                timeout_ms = limit.as_millis() as u64,
                "Closing link timed out; dropping it"
            ),
        }
    }

    async fn drive(&mut self, link: &mut C::Link) -> LinkOutcome {
        self.transition(SessionState::AwaitingHello);

        let interval_ms = match self.await_hello(link).await {
            Ok(interval_ms) => interval_ms,
            Err(outcome) => return outcome,
        };
        self.session.set_heartbeat_interval(interval_ms);
        let mut heartbeat =
            Heartbeat::start(interval_ms, self.settings.jitter_percent, Instant::now());
        tracing::debug!(interval_ms, "Hello received");

        if let Err(outcome) = self.begin_handshake(link).await {
            return outcome;
        }
        let mut handshake_deadline = Some(Instant::now() + self.settings.handshake_timeout);

        loop {
            let handshake_pending = handshake_deadline.is_some();
            let handshake_at = handshake_deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                biased;

                () = self.shutdown.cancelled() => {
                    self.transition(SessionState::Closing);
                    return LinkOutcome::Shutdown;
                }

                () = sleep_until(heartbeat.deadline()) => match heartbeat.tick(Instant::now()) {
                    HeartbeatTick::Send => {
                        if let Err(outcome) = self.send_heartbeat(link).await {
                            return outcome;
                        }
                    }
                    HeartbeatTick::Missed => {
                        tracing::warn!(
                            interval_ms,
                            seq = ?self.session.last_sequence(),
                            "Heartbeat not acknowledged; reconnecting"
                        );
                        self.transition(SessionState::Reconnecting);
                        return LinkOutcome::Reconnect { resume: true };
                    }
                },

                () = sleep_until(handshake_at), if handshake_pending => {
                    tracing::warn!(state = %self.state(), "Handshake timed out");
                    self.transition(SessionState::Reconnecting);
                    return LinkOutcome::Reconnect { resume: true };
                }

                inbound = link.receive() => match inbound {
                    Ok(Inbound::Frame(text)) => {
                        match self.handle_frame(link, &mut heartbeat, &text).await {
                            FrameOutcome::Continue => {}
                            FrameOutcome::HandshakeComplete => handshake_deadline = None,
                            FrameOutcome::HandshakeRestarted => {
                                handshake_deadline =
                                    Some(Instant::now() + self.settings.handshake_timeout);
                            }
                            FrameOutcome::End(outcome) => return outcome,
                        }
                    }
                    Ok(Inbound::Closed(info)) => return self.on_closed(info),
                    Err(e) => {
                        tracing::warn!(error = %e, "Gateway link failed");
                        self.transition(SessionState::Reconnecting);
                        return LinkOutcome::Reconnect { resume: true };
                    }
                },
            }
        }
    }

    /// Wait for Hello, returning the heartbeat interval
    async fn await_hello(&mut self, link: &mut C::Link) -> Result<u64, LinkOutcome> {
        let hello_timeout = self.settings.hello_timeout;
        let deadline = Instant::now() + hello_timeout;

        loop {
            tokio::select! {
                biased;

                () = self.shutdown.cancelled() => {
                    self.transition(SessionState::Closing);
                    return Err(LinkOutcome::Shutdown);
                }

                () = sleep_until(deadline) => {
                    tracing::warn!(
                        timeout_ms = hello_timeout.as_millis() as u64,
                        "No Hello received"
                    );
                    self.transition(SessionState::Disconnected);
                    return Err(LinkOutcome::Reconnect { resume: true });
                }

                inbound = link.receive() => match inbound {
                    Ok(Inbound::Frame(text)) => {
                        let message = match GatewayMessage::from_json(&text) {
                            Ok(message) => message,
                            Err(e) => {
                                tracing::warn!(error = %e, "Dropping undecodable frame");
                                continue;
                            }
                        };
                        match InboundEvent::decode(message) {
                            Ok(InboundEvent::Hello(hello)) => return Ok(hello.heartbeat_interval),
                            Ok(other) => {
                                tracing::debug!(event = ?other, "Ignoring frame before Hello");
                            }
                            Err(e) => tracing::warn!(error = %e, "Dropping malformed frame"),
                        }
                    }
                    Ok(Inbound::Closed(info)) => return Err(self.on_closed(info)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Gateway link failed before Hello");
                        self.transition(SessionState::Disconnected);
                        return Err(LinkOutcome::Reconnect { resume: true });
                    }
                },
            }
        }
    }

    async fn handle_frame(
        &mut self,
        link: &mut C::Link,
        heartbeat: &mut Heartbeat,
        text: &str,
    ) -> FrameOutcome {
        let message = match GatewayMessage::from_json(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping undecodable frame");
                return FrameOutcome::Continue;
            }
        };

        let op = message.op;
        if op == OpCode::Dispatch {
            if let Some(seq) = message.s {
                self.session.observe_sequence(seq);
            }
        }

        let event = match InboundEvent::decode(message) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(op = %op, error = %e, "Dropping malformed frame");
                return FrameOutcome::Continue;
            }
        };

        match event {
            InboundEvent::HeartbeatAck => {
                heartbeat.acknowledge();
                tracing::trace!("Heartbeat acknowledged");
                FrameOutcome::Continue
            }
            InboundEvent::HeartbeatRequest => match self.send_heartbeat(link).await {
                Ok(()) => FrameOutcome::Continue,
                Err(outcome) => FrameOutcome::End(outcome),
            },
            InboundEvent::Hello(_) => {
                tracing::debug!("Ignoring repeated Hello");
                FrameOutcome::Continue
            }
            InboundEvent::Reconnect => {
                tracing::info!("Gateway requested reconnect");
                self.transition(SessionState::Reconnecting);
                FrameOutcome::End(LinkOutcome::Reconnect { resume: true })
            }
            InboundEvent::InvalidSession { resumable } => {
                self.on_invalid_session(link, resumable).await
            }
            InboundEvent::Dispatch(event) => self.on_dispatch(event),
            InboundEvent::Unknown { op } => {
                tracing::debug!(op = %op, "Dropping frame with unhandled op");
                FrameOutcome::Continue
            }
        }
    }

    async fn on_invalid_session(&mut self, link: &mut C::Link, resumable: bool) -> FrameOutcome {
        if resumable && self.session.can_resume() {
            tracing::warn!("Session invalidated; reconnecting to resume");
            self.transition(SessionState::Reconnecting);
            return FrameOutcome::End(LinkOutcome::Reconnect { resume: true });
        }

        tracing::warn!(state = %self.state(), "Session invalidated; identifying from scratch");
        self.session.clear();

        if self.state() == SessionState::Resuming {
            return match self.send_identify(link).await {
                Ok(()) => FrameOutcome::HandshakeRestarted,
                Err(outcome) => FrameOutcome::End(outcome),
            };
        }

        self.transition(SessionState::Reconnecting);
        FrameOutcome::End(LinkOutcome::Reconnect { resume: false })
    }

    fn on_dispatch(&mut self, event: DispatchEvent) -> FrameOutcome {
        match event {
            DispatchEvent::Ready(ready) => {
                self.session.establish(&ready);
                tracing::info!(
                    session_id = %ready.session_id,
                    resume_url = ?self.session.resume_url(),
                    "Session established"
                );
                self.on_established();
                FrameOutcome::HandshakeComplete
            }
            DispatchEvent::Resumed => {
                tracing::info!(
                    session_id = ?self.session.session_id(),
                    seq = ?self.session.last_sequence(),
                    "Session resumed"
                );
                self.on_established();
                FrameOutcome::HandshakeComplete
            }
            event => {
                if !self.state().routes_dispatches() {
                    tracing::debug!(state = %self.state(), "Dropping dispatch before READY");
                    return FrameOutcome::Continue;
                }
                if let Some(command) = self.dispatcher.route(&event) {
                    self.controller.handle(command);
                }
                FrameOutcome::Continue
            }
        }
    }

    fn on_established(&mut self) {
        self.transition(SessionState::Established);
        self.backoff.reset();
        self.controller.indicate(DeviceStatus::Online);
    }

    fn on_closed(&mut self, info: Option<CloseInfo>) -> LinkOutcome {
        let disposition = disposition_for(info.as_ref().map(|i| i.code));

        match (disposition, info) {
            (CloseDisposition::Fatal, Some(info)) => {
                self.transition(SessionState::Disconnected);
                LinkOutcome::Fatal(GatewayError::from_close(info))
            }
            (CloseDisposition::Reidentify, info) => {
                tracing::warn!(
                    close = ?info,
                    "Gateway closed the session; identifying from scratch"
                );
                self.transition(SessionState::Reconnecting);
                LinkOutcome::Reconnect { resume: false }
            }
            (_, info) => {
                tracing::info!(close = ?info, "Gateway closed the link");
                self.transition(SessionState::Reconnecting);
                LinkOutcome::Reconnect { resume: true }
            }
        }
    }

    async fn begin_handshake(&mut self, link: &mut C::Link) -> Result<(), LinkOutcome> {
        match self.session.resume_payload(&self.settings.token) {
            Some(payload) => {
                self.transition(SessionState::Resuming);
                tracing::info!(
                    session_id = %payload.session_id,
                    seq = payload.seq,
                    "Resuming session"
                );
                self.send(link, &GatewayMessage::resume(&payload)).await
            }
            None => self.send_identify(link).await,
        }
    }

    async fn send_identify(&mut self, link: &mut C::Link) -> Result<(), LinkOutcome> {
        self.transition(SessionState::Identifying);
        let payload = IdentifyPayload::new(self.settings.token.clone(), self.settings.intents)
            .with_properties(self.settings.properties.clone());
        tracing::info!(intents = self.settings.intents.bits(), "Identifying");
        self.send(link, &GatewayMessage::identify(&payload)).await
    }

    async fn send_heartbeat(&mut self, link: &mut C::Link) -> Result<(), LinkOutcome> {
        let seq = self.session.last_sequence();
        tracing::trace!(seq = ?seq, "Sending heartbeat");
        self.send(link, &GatewayMessage::heartbeat(seq)).await
    }

    async fn send(
        &mut self,
        link: &mut C::Link,
        message: &GatewayMessage,
    ) -> Result<(), LinkOutcome> {
        let frame = match message.to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(op = %message.op, error = %e, "Failed to encode frame");
                self.transition(SessionState::Reconnecting);
                return Err(LinkOutcome::Reconnect { resume: true });
            }
        };

        let limit = self.settings.connect_timeout;
        let sent = tokio::select! {
            biased;

            () = self.shutdown.cancelled() => {
                self.transition(SessionState::Closing);
                return Err(LinkOutcome::Shutdown);
            }
            sent = timeout(limit, link.send(frame)) => sent,
        };

        match sent {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                tracing::warn!(op = %message.op, error = %e, "Failed to send frame");
                self.transition(SessionState::Reconnecting);
                Err(LinkOutcome::Reconnect { resume: true })
            }
            Err(_) => {
                tracing::warn!(
                    op = %message.op,
                    timeout_ms = limit.as_millis() as u64,
                    "Sending frame timed out"
                );
                self.transition(SessionState::Reconnecting);
                Err(LinkOutcome::Reconnect { resume: true })
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        let previous = self.session.transition(next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "Session state changed");
            self.state_tx.send_replace(next);
        }
    }
}
