// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exchange client capability and its implementations.
//!
//! `BinanceClient` talks to the live or testnet REST API. `PaperExchange`
//! reads real market data through any [`MarketData`] source but keeps
//! balances and fills in memory.

pub mod binance;
pub mod paper;
pub mod types;

pub use binance::BinanceClient;
pub use paper::PaperExchange;
pub use types::{Fill, OrderReport, OrderSize, OrderStatus, Side, SymbolInfo};

use crate::error::TradeError;
use async_trait::async_trait;

/// Public, unauthenticated market data.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Symbol metadata, or `None` if the exchange does not list it.
    async fn get_symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>, TradeError>;

    /// All symbols quoted in `quote_asset`.
    async fn list_symbols(&self, quote_asset: &str) -> Result<Vec<SymbolInfo>, TradeError>;

    /// Last traded price.
    async fn get_ticker(&self, symbol: &str) -> Result<f64, TradeError>;
}

/// Account-level operations on top of market data.
#[async_trait]
pub trait ExchangeClient: MarketData {
    /// Free balance of `asset`; zero when the account holds none.
    async fn get_balance(&self, asset: &str) -> Result<f64, TradeError>;

    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        size: OrderSize,
    ) -> Result<OrderReport, TradeError>;
}
