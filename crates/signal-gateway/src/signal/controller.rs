//! Signal controller
//!
//! Applies routed commands to the effect sink. Every request describes the
//! desired end state of its target, and the controller keeps the last desired
//! state per target, so delivering the same command twice leaves the same state
//! as delivering it once.

use signal_core::RoutedCommand;
use std::collections::HashMap;

use super::{DeviceStatus, Effect, EffectPolicy, EffectRequest, EffectSink, EffectTarget};

pub struct SignalController<S, P> {
    sink: S,
    policy: P,
    desired: HashMap<EffectTarget, Effect>,
    status: Option<DeviceStatus>,
}

impl<S, P> SignalController<S, P>
where
    S: EffectSink,
    P: EffectPolicy,
{
    pub fn new(sink: S, policy: P) -> Self {
        Self {
            sink,
            policy,
            desired: HashMap::new(),
            status: None,
        }
    }

    /// Apply one routed command
    ///
    /// Commands without a resolved subject produce no effect.
    pub fn handle(&mut self, command: RoutedCommand) -> Option<EffectRequest> {
        let Some(subject) = command.subject else {
            tracing::debug!(kind = %command.kind, "Ignoring command without a known subject");
            return None;
        };

        let effect = self
            .policy
            .effect_for(command.kind, subject, command.color_hint);
        let request = EffectRequest {
            target: subject.into(),
            kind: command.kind,
            effect,
        };

        self.desired.insert(request.target, effect);
        self.sink.apply(request);
        Some(request)
    }

    /// Report connection health; repeated identical statuses are collapsed
    pub fn indicate(&mut self, status: DeviceStatus) {
        if self.status == Some(status) {
            return;
        }
        self.status = Some(status);
        self.sink.indicate(status);
    }

    /// Last desired effect for `target`
    pub fn desired(&self, target: EffectTarget) -> Option<Effect> {
        self.desired.get(&target).copied()
    }

    pub fn status(&self) -> Option<DeviceStatus> {
        self.status
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S, P> std::fmt::Debug for SignalController<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalController")
            .field("desired", &self.desired)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
