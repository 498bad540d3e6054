/// WebSocket client for the simulation push channel
///
/// Provides automatic reconnection, heartbeat, and envelope parsing

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::shared::types::{FeedEvent, FeedMessage};

/// Push-channel status as shown in the dashboards
///
/// The client reconnects on its own, so a reconnect attempt reads as
/// Disconnected until it succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
}

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Push channel URL
    pub url: String,
    /// Ping interval to keep the connection alive
    pub ping_interval: Duration,
    /// Reconnection delay after disconnect
    pub reconnect_delay: Duration,
    /// Maximum channel buffer size for events
    pub channel_buffer_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:5000/ws".to_string(),
            ping_interval: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(2),
            channel_buffer_size: 1000,
        }
    }
}

impl FeedConfig {
    /// Create a new configuration with custom URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set ping interval
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Set reconnect delay
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set channel buffer size
    pub fn with_channel_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }
}

/// WebSocket client for simulation feed events
pub struct FeedClient {
    config: FeedConfig,
    event_tx: mpsc::Sender<FeedEvent>,
    event_rx: mpsc::Receiver<FeedEvent>,
}

impl FeedClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(FeedConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: FeedConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.channel_buffer_size);
        Self {
            config,
            event_tx,
            event_rx,
        }
    }

    /// Start the connection loop
    ///
    /// Returns the single ordered stream of feed events. Connection changes
    /// arrive inline as `Connected`/`Disconnected`, so appliers see them in
    /// the same order as the data they bracket.
    pub fn start(self) -> mpsc::Receiver<FeedEvent> {
        let config = self.config.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            run_feed_loop(config, event_tx).await;
        });

        self.event_rx
    }
}

impl Default for FeedClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Main connection loop with auto-reconnect
async fn run_feed_loop(config: FeedConfig, event_tx: mpsc::Sender<FeedEvent>) {
    info!("Starting feed client for {}", config.url);

    loop {
        match connect_async(&config.url).await {
            Ok((ws_stream, _)) => {
                info!("Connected to simulation feed at {}", config.url);
                if event_tx.send(FeedEvent::Connected).await.is_err() {
                    return;
                }

                let (mut write, mut read) = ws_stream.split();

                // Spawn ping task to keep the connection alive
                let ping_interval = config.ping_interval;
                let (ping_shutdown_tx, mut ping_shutdown_rx) = mpsc::channel::<()>(1);

                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(ping_interval);
                    loop {
                        tokio::select! {
                            _ = interval.tick() => {
                                if write.send(Message::Ping(vec![].into())).await.is_err() {
                                    debug!("Failed to send ping, connection likely dead");
                                    break;
                                }
                            }
                            _ = ping_shutdown_rx.recv() => {
                                debug!("Ping task shutting down");
                                break;
                            }
                        }
                    }
                });

                // Main message reading loop
                let mut receiver_gone = false;
                while let Some(msg) = read.next().await {
                    match msg {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<FeedMessage>(&text) {
                                Ok(message) => {
                                    if event_tx.send(message.into()).await.is_err() {
                                        warn!("Event receiver dropped, stopping client");
                                        receiver_gone = true;
                                        break;
                                    }
                                }
                                Err(e) => {
                                    // Unknown envelopes are skipped, not fatal
                                    debug!(
                                        "Skipping unparseable feed message: {} - {}",
                                        e,
                                        log_preview(&text, 100)
                                    );
                                }
                            }
                        }
                        Ok(Message::Close(_)) => {
                            info!("Server closed connection");
                            break;
                        }
                        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                            // Heartbeat messages - tungstenite handles these automatically
                        }
                        Err(e) => {
                            error!("WebSocket error: {}", e);
                            break;
                        }
                        _ => {}
                    }
                }

                // Stop ping task
                let _ = ping_shutdown_tx.send(()).await;

                if receiver_gone {
                    return;
                }

                if event_tx.send(FeedEvent::Disconnected).await.is_err() {
                    return;
                }
                warn!("Connection closed, will reconnect...");
            }
            Err(e) => {
                error!("Failed to connect to {}: {}", config.url, e);
                if event_tx.send(FeedEvent::Disconnected).await.is_err() {
                    return;
                }
            }
        }

        // Wait before reconnecting
        debug!("Waiting {:?} before reconnecting...", config.reconnect_delay);
        tokio::time::sleep(config.reconnect_delay).await;
    }
}

/// Clamp a frame preview for logging without splitting a UTF-8 character
fn log_preview(text: &str, max_bytes: usize) -> &str {
    let mut end = text.len().min(max_bytes);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = FeedConfig::new("ws://localhost:8080/ws")
            .with_ping_interval(Duration::from_secs(15))
            .with_reconnect_delay(Duration::from_secs(5))
            .with_channel_buffer_size(500);

        assert_eq!(config.url, "ws://localhost:8080/ws");
        assert_eq!(config.ping_interval, Duration::from_secs(15));
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
        assert_eq!(config.channel_buffer_size, 500);
    }

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.url, "ws://127.0.0.1:5000/ws");
        assert_eq!(config.ping_interval, Duration::from_secs(30));
        assert_eq!(config.reconnect_delay, Duration::from_secs(2));
        assert_eq!(config.channel_buffer_size, 1000);
    }

    #[test]
    fn test_log_preview_stops_on_char_boundary() {
        // Two-byte char straddling the cap backs off to the last full char
        let mut text = "a".repeat(99);
        text.push('é');
        assert_eq!(log_preview(&text, 100), "a".repeat(99));

        // Three-byte chars never line up with a 100-byte cap
        let wide = "€".repeat(40);
        assert_eq!(log_preview(&wide, 100).len(), 99);

        // Short frames come through untouched
        assert_eq!(log_preview("short", 100), "short");
        assert_eq!(log_preview("", 100), "");
    }
}
