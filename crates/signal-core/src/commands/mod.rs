//! Commands routed from the event dispatcher to the signal controller

mod routed_command;

pub use routed_command::{CommandKind, RoutedCommand, Subject};
