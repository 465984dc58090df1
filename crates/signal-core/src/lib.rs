//! # signal-core
//!
//! Domain layer containing identifiers, gateway intents, the known-identity table,
//! and the routed commands exchanged between the dispatcher and the signal controller.
//! This crate has zero dependencies on infrastructure (transport, runtime, etc.).

pub mod commands;
pub mod error;
pub mod identity;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use commands::{CommandKind, RoutedCommand, Subject};
pub use error::IdentityError;
pub use identity::{IdentitySlot, KnownIdentityTable};
pub use value_objects::{GatewayIntents, Hue, Snowflake, SnowflakeParseError};
