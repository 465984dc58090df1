//! WebSocket link over tokio-tungstenite

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async_tls_with_config, MaybeTlsStream, WebSocketStream};

use super::{insecure_client_config, CloseInfo, Connector, Inbound, Link, TlsMode, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket links, secure or plain depending on the endpoint scheme
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

impl WsConnector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Link = WsLink;

    async fn connect(&self, endpoint: &str, mode: TlsMode) -> Result<WsLink, TransportError> {
        let connector = match mode {
            TlsMode::Verified => None,
            TlsMode::Insecure => Some(tokio_tungstenite::Connector::Rustls(
                insecure_client_config()?,
            )),
        };

        let (stream, response) = connect_async_tls_with_config(endpoint, None, true, connector)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        tracing::debug!(status = %response.status(), "WebSocket handshake complete");

        Ok(WsLink { stream })
    }
}

/// An open WebSocket connection
pub struct WsLink {
    stream: WsStream,
}

impl std::fmt::Debug for WsLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsLink").finish_non_exhaustive()
    }
}

fn close_info(frame: Option<CloseFrame<'_>>) -> Option<CloseInfo> {
    frame.map(|f| CloseInfo::new(u16::from(f.code), f.reason.into_owned()))
}

#[async_trait]
impl Link for WsLink {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| match e {
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                    TransportError::Closed
                }
                other => TransportError::Send(other.to_string()),
            })
    }

    async fn receive(&mut self) -> Result<Inbound, TransportError> {
        loop {
            let Some(message) = self.stream.next().await else {
                return Ok(Inbound::Closed(None));
            };

            match message {
                Ok(Message::Text(text)) => return Ok(Inbound::Frame(text)),
                Ok(Message::Binary(data)) => match String::from_utf8(data) {
                    Ok(text) => return Ok(Inbound::Frame(text)),
                    Err(_) => {
                        tracing::warn!("Dropping non UTF-8 binary frame");
                    }
                },
                Ok(Message::Close(frame)) => return Ok(Inbound::Closed(close_info(frame))),
                // Ping replies are queued by tungstenite itself
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(Inbound::Closed(None));
                }
                Err(e) => return Err(TransportError::Receive(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.stream.close(None).await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(TransportError::Send(e.to_string())),
        }
    }
}
