// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Run phase and live price state shared between the monitor and the sell path.

use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// `Init → Bought → Monitoring → {Sold | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Bought,
    Monitoring,
    Sold,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "INIT",
            Self::Bought => "BOUGHT",
            Self::Monitoring => "MONITORING",
            Self::Sold => "SOLD",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct LivePriceState {
    pub phase: Phase,
    pub last_price: Option<f64>,
    pub feed_error: bool,
    /// One-shot guard: set once a sell has been attempted.
    pub sold: bool,
}

impl Default for LivePriceState {
    fn default() -> Self {
        Self {
            phase: Phase::Init,
            last_price: None,
            feed_error: false,
            sold: false,
        }
    }
}

impl LivePriceState {
    pub fn transition(&mut self, next: Phase) {
        debug!("Phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Record a tick. Returns `false` when the price did not change.
    pub fn record_price(&mut self, price: f64) -> bool {
        if self.last_price == Some(price) {
            return false;
        }
        self.last_price = Some(price);
        true
    }

    pub fn record_error(&mut self) {
        self.feed_error = true;
    }
}

pub type SharedState = Arc<Mutex<LivePriceState>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_price_is_not_a_change() {
        let mut state = LivePriceState::default();
        assert!(state.record_price(1.0));
        assert!(!state.record_price(1.0));
        assert!(state.record_price(1.5));
        assert_eq!(state.last_price, Some(1.5));
    }
}
