// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error taxonomy for a buy/wait/sell run.

use crate::exchange::{OrderStatus, Side};
use thiserror::Error;

/// Every failure is terminal for the current run; nothing here is retried.
#[derive(Error, Debug)]
pub enum TradeError {
    /// Missing or invalid credentials, flags or environment.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("insufficient {asset} ({available} < {required})")]
    InsufficientFunds {
        asset: String,
        available: f64,
        required: f64,
    },

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// The exchange refused the order at submission time.
    #[error("order rejected: {0}")]
    OrderRejected(String),

    /// The exchange accepted the order but did not fill it.
    #[error("{side} order has not been filled (status {status})")]
    OrderNotFilled { side: Side, status: OrderStatus },

    #[error("price feed error: {0}")]
    Feed(String),

    /// Any other exchange API failure (balances, metadata, tickers).
    #[error("exchange error: {0}")]
    Exchange(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
