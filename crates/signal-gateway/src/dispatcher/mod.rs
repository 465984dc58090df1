//! Event dispatcher
//!
//! Decodes inbound frames into typed events and narrows dispatches down to the
//! routed commands the signal controller acts on.

mod inbound;
mod router;

pub use inbound::{DecodeError, DispatchEvent, InboundEvent};
pub use router::{DispatchScope, EventDispatcher};
