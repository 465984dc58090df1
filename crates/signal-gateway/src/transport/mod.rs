//! Transport link
//!
//! The session drives a message-oriented link through the [`Connector`] and
//! [`Link`] traits. [`WsConnector`] is the WebSocket implementation used in
//! production; tests substitute scripted links.

mod link;
mod tls;
mod websocket;

pub use link::{CloseInfo, Connector, Inbound, Link, TlsMode, TransportError};
pub use tls::insecure_client_config;
pub use websocket::{WsConnector, WsLink};
