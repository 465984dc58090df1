//! Wire protocol
//!
//! Opcodes, close codes, the frame envelope and the payloads the client sends.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::{disposition_for, CloseCode, CloseDisposition};
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{ConnectionProperties, HelloPayload, IdentifyPayload, ResumePayload};
