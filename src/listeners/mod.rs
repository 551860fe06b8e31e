// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Price feed listeners.

pub mod ticker;

pub use ticker::{parse_ticker_message, BinanceTickerFeed};

use crate::error::TradeError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One message from a ticker stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerEvent {
    Price { event_type: String, last_price: f64 },
    /// The stream reported an error or went away.
    Error(String),
}

/// Identifies a live subscription; dropping it does not stop the stream.
#[derive(Debug)]
pub struct SubscriptionHandle {
    symbol: String,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn new(symbol: impl Into<String>, task: JoinHandle<()>) -> Self {
        Self {
            symbol: symbol.into(),
            task: Some(task),
        }
    }

    /// Handle for feeds that own no background task.
    pub fn detached(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            task: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Stop the background task, if any.
    pub fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct Subscription {
    pub ticks: mpsc::Receiver<TickerEvent>,
    pub handle: SubscriptionHandle,
}

/// Push feed of last-trade prices.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn subscribe_ticker(&self, symbol: &str) -> Result<Subscription, TradeError>;

    async fn unsubscribe(&self, handle: SubscriptionHandle);
}
