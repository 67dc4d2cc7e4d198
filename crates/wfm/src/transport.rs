//! Notification transport primitives and the WebSocket production
//! implementation.
//!
//! The completion waiter and orchestrator only depend on the
//! [`NotificationChannel`] / [`NotificationConnector`] traits, so the
//! completion protocol can be exercised without a live transport.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::messages::{parse_event, NotificationEvent};

/// Errors from the notification transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to establish the connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A protocol-level failure on an established connection.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// A live, subscription-capable notification stream.
#[async_trait]
pub trait NotificationChannel: Send {
    /// Subscribe the channel to the given topic names.
    async fn subscribe(&mut self, topics: &[String]) -> Result<(), TransportError>;

    /// Next event from the stream, or `None` once the stream has ended.
    async fn next_event(&mut self) -> Option<NotificationEvent>;

    /// Close the subscription. Best-effort; errors are logged, not
    /// returned.
    async fn close(&mut self);
}

/// Opens [`NotificationChannel`]s scoped to a business unit.
#[async_trait]
pub trait NotificationConnector: Send + Sync {
    type Channel: NotificationChannel;

    async fn connect(&self, business_unit_id: &str) -> Result<Self::Channel, TransportError>;
}

// ---------------------------------------------------------------------------
// WebSocket implementation
// ---------------------------------------------------------------------------

/// WebSocket-backed notification connector.
pub struct WsNotificationConnector {
    ws_url: String,
}

impl WsNotificationConnector {
    /// Create a connector targeting the notification service.
    ///
    /// * `ws_url` - WebSocket base URL, e.g. `wss://host/notifications`.
    pub fn new(ws_url: String) -> Self {
        Self { ws_url }
    }
}

#[async_trait]
impl NotificationConnector for WsNotificationConnector {
    type Channel = WsNotificationChannel;

    /// Connect to the notification WebSocket endpoint.
    ///
    /// Generates a unique correlation id (UUID v4) and appends it as a
    /// query parameter so the service can address frames back to this
    /// specific client.
    async fn connect(&self, business_unit_id: &str) -> Result<WsNotificationChannel, TransportError> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        let url = format!("{}?correlationId={}", self.ws_url, correlation_id);

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            TransportError::Connection(format!(
                "Failed to connect to notification service at {}: {e}",
                self.ws_url
            ))
        })?;

        tracing::info!(
            business_unit_id,
            correlation_id = %correlation_id,
            "Connected to notification service at {}",
            self.ws_url,
        );

        Ok(WsNotificationChannel { ws_stream })
    }
}

/// A live WebSocket notification subscription.
pub struct WsNotificationChannel {
    ws_stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

#[async_trait]
impl NotificationChannel for WsNotificationChannel {
    async fn subscribe(&mut self, topics: &[String]) -> Result<(), TransportError> {
        let frame = serde_json::json!({
            "message": "subscribe",
            "topics": topics,
        });

        self.ws_stream
            .send(Message::Text(frame.to_string()))
            .await
            .map_err(|e| TransportError::Protocol(format!("Subscribe frame failed: {e}")))?;

        tracing::info!(?topics, "Subscription request sent");
        Ok(())
    }

    async fn next_event(&mut self) -> Option<NotificationEvent> {
        while let Some(msg_result) = self.ws_stream.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match parse_event(&text) {
                    Ok(event) => return Some(event),
                    Err(e) => {
                        // Heartbeats and subscription acks share the
                        // stream; skip anything that is not an event.
                        tracing::debug!(
                            error = %e,
                            raw_message = %text,
                            "Skipping non-event notification frame",
                        );
                    }
                },
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Handled automatically by tungstenite.
                }
                Ok(Message::Close(frame)) => {
                    tracing::info!(?frame, "Notification stream closed");
                    return None;
                }
                Ok(Message::Binary(_) | Message::Frame(_)) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Notification receive error");
                    return None;
                }
            }
        }
        None
    }

    async fn close(&mut self) {
        if let Err(e) = self.ws_stream.close(None).await {
            tracing::warn!(error = %e, "Error closing notification stream");
        }
    }
}
