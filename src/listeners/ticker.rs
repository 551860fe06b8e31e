// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Binance `<symbol>@ticker` stream over WebSocket.

use crate::error::TradeError;
use crate::listeners::{PriceFeed, Subscription, SubscriptionHandle, TickerEvent};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

pub const LIVE_WS_URL: &str = "wss://stream.binance.com:9443/ws";
pub const TESTNET_WS_URL: &str = "wss://stream.testnet.binance.vision/ws";

/// Ticks buffered between the socket task and the monitor.
const TICK_BUFFER: usize = 256;

#[derive(Debug, Deserialize)]
struct TickerMessage {
    #[serde(rename = "e")]
    event_type: String,
    #[serde(rename = "c")]
    last_price: Option<String>,
    #[serde(rename = "m")]
    message: Option<String>,
}

/// Parse one text frame. Frames that are not ticker events yield `None`.
pub fn parse_ticker_message(text: &str) -> Option<TickerEvent> {
    let msg: TickerMessage = serde_json::from_str(text).ok()?;

    if msg.event_type == "error" {
        return Some(TickerEvent::Error(
            msg.message.unwrap_or_else(|| "stream error".to_string()),
        ));
    }

    let last_price = msg.last_price?.parse::<f64>().ok()?;
    Some(TickerEvent::Price {
        event_type: msg.event_type,
        last_price,
    })
}

pub struct BinanceTickerFeed {
    ws_url: String,
}

impl BinanceTickerFeed {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn stream_url(&self, symbol: &str) -> String {
        format!("{}/{}@ticker", self.ws_url, symbol.to_lowercase())
    }
}

/// Forward ticks until the socket closes or the receiver goes away.
async fn run_stream(url: String, tx: mpsc::Sender<TickerEvent>) {
    info!("🔌 Connecting to ticker stream: {}", url);

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            error!("Ticker stream connection failed: {}", e);
            let _ = tx.send(TickerEvent::Error(format!("connect failed: {}", e))).await;
            return;
        }
    };
    info!("✅ Ticker stream connected");

    let (mut write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                debug!("Received: {}", text);
                if let Some(event) = parse_ticker_message(&text) {
                    if tx.send(event).await.is_err() {
                        debug!("Ticker receiver dropped, stopping stream");
                        return;
                    }
                }
            }
            Ok(Message::Ping(data)) => {
                let _ = write.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => {
                warn!("Ticker stream closed by server");
                let _ = tx.send(TickerEvent::Error("stream closed".into())).await;
                return;
            }
            Err(e) => {
                error!("Ticker stream receive error: {}", e);
                let _ = tx.send(TickerEvent::Error(e.to_string())).await;
                return;
            }
            _ => {}
        }
    }
}

#[async_trait]
impl PriceFeed for BinanceTickerFeed {
    async fn subscribe_ticker(&self, symbol: &str) -> Result<Subscription, TradeError> {
        let (tx, rx) = mpsc::channel(TICK_BUFFER);
        let task = tokio::spawn(run_stream(self.stream_url(symbol), tx));

        Ok(Subscription {
            ticks: rx,
            handle: SubscriptionHandle::new(symbol, task),
        })
    }

    async fn unsubscribe(&self, mut handle: SubscriptionHandle) {
        handle.abort();
        info!("🔕 Unsubscribed from {} ticker", handle.symbol());
    }
}
