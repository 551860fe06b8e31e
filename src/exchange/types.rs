// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exchange-facing domain types shared by every client implementation.

use std::fmt;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a market order is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderSize {
    /// Spend (buy) or receive (sell) this much of the quote asset.
    Quote(f64),
    /// Trade this quantity of the base asset.
    Base(f64),
}

/// Order status as reported by the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    PendingCancel,
    Rejected,
    Expired,
    Other(String),
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "NEW" => Self::New,
            "PARTIALLY_FILLED" => Self::PartiallyFilled,
            "FILLED" => Self::Filled,
            "CANCELED" => Self::Canceled,
            "PENDING_CANCEL" => Self::PendingCancel,
            "REJECTED" => Self::Rejected,
            "EXPIRED" => Self::Expired,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "NEW",
            Self::PartiallyFilled => "PARTIALLY_FILLED",
            Self::Filled => "FILLED",
            Self::Canceled => "CANCELED",
            Self::PendingCancel => "PENDING_CANCEL",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single partial execution of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub price: f64,
    pub qty: f64,
    pub commission: f64,
    pub commission_asset: String,
}

impl Fill {
    pub fn new(price: f64, qty: f64) -> Self {
        Self {
            price,
            qty,
            commission: 0.0,
            commission_asset: String::new(),
        }
    }
}

/// Exchange response to a market order submission.
#[derive(Debug, Clone)]
pub struct OrderReport {
    pub symbol: String,
    pub order_id: u64,
    pub side: Side,
    pub status: OrderStatus,
    pub executed_qty: f64,
    pub cummulative_quote_qty: f64,
    /// Exchange timestamp in milliseconds since the epoch.
    pub transact_time: i64,
    pub fills: Vec<Fill>,
}

impl OrderReport {
    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }
}

/// Tradable symbol metadata, including the lot-size constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInfo {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub status: String,
    pub step_size: f64,
    pub min_qty: f64,
}

impl SymbolInfo {
    pub fn is_trading(&self) -> bool {
        self.status == "TRADING"
    }
}
