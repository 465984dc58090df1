//! Signal controller
//!
//! Turns routed commands into effect requests for the hardware sink.

mod controller;
mod policy;
mod sink;

pub use controller::SignalController;
pub use policy::{DefaultEffectPolicy, Effect, EffectPolicy, Pattern};
pub use sink::{DeviceStatus, EffectRequest, EffectSink, EffectTarget, LogEffectSink};
