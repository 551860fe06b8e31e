// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sandbox exchange: real market data, simulated account.
//!
//! Market orders fill in one piece at the current ticker price and move
//! balances held in memory. No fees are charged.

use crate::error::TradeError;
use crate::exchange::{
    ExchangeClient, Fill, MarketData, OrderReport, OrderSize, OrderStatus, Side, SymbolInfo,
};
use crate::position::floor_to_step;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::info;

pub struct PaperExchange<M: MarketData> {
    market: M,
    balances: Mutex<HashMap<String, f64>>,
    next_order_id: AtomicU64,
}

impl<M: MarketData> PaperExchange<M> {
    pub fn new(market: M) -> Self {
        Self {
            market,
            balances: Mutex::new(HashMap::new()),
            next_order_id: AtomicU64::new(1),
        }
    }

    /// Seed a starting balance.
    pub fn with_balance(mut self, asset: &str, amount: f64) -> Self {
        self.balances.get_mut().insert(asset.to_string(), amount);
        self
    }

    pub async fn set_balance(&self, asset: &str, amount: f64) {
        self.balances.lock().await.insert(asset.to_string(), amount);
    }
}

#[async_trait]
impl<M: MarketData> MarketData for PaperExchange<M> {
    async fn get_symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>, TradeError> {
        self.market.get_symbol_info(symbol).await
    }

    async fn list_symbols(&self, quote_asset: &str) -> Result<Vec<SymbolInfo>, TradeError> {
        self.market.list_symbols(quote_asset).await
    }

    async fn get_ticker(&self, symbol: &str) -> Result<f64, TradeError> {
        self.market.get_ticker(symbol).await
    }
}

#[async_trait]
impl<M: MarketData> ExchangeClient for PaperExchange<M> {
    async fn get_balance(&self, asset: &str) -> Result<f64, TradeError> {
        Ok(self.balances.lock().await.get(asset).copied().unwrap_or(0.0))
    }

    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        size: OrderSize,
    ) -> Result<OrderReport, TradeError> {
        let info = self
            .market
            .get_symbol_info(symbol)
            .await?
            .ok_or_else(|| TradeError::UnknownSymbol(symbol.to_string()))?;
        let price = self.market.get_ticker(symbol).await?;
        if price <= 0.0 {
            return Err(TradeError::OrderRejected(format!("no market price for {}", symbol)));
        }

        let qty = match size {
            OrderSize::Base(qty) => floor_to_step(qty, info.step_size),
            OrderSize::Quote(amount) => floor_to_step(amount / price, info.step_size),
        };
        if qty <= 0.0 || qty < info.min_qty {
            return Err(TradeError::OrderRejected(format!(
                "quantity {} below lot size for {}",
                qty, symbol
            )));
        }
        let quote_amount = qty * price;

        let mut balances = self.balances.lock().await;
        let (debit_asset, debit, credit_asset, credit) = match side {
            Side::Buy => (&info.quote_asset, quote_amount, &info.base_asset, qty),
            Side::Sell => (&info.base_asset, qty, &info.quote_asset, quote_amount),
        };

        let available = balances.get(debit_asset).copied().unwrap_or(0.0);
        if available < debit {
            return Err(TradeError::OrderRejected(format!(
                "account has insufficient {} ({} < {})",
                debit_asset, available, debit
            )));
        }
        balances.insert(debit_asset.clone(), available - debit);
        *balances.entry(credit_asset.clone()).or_insert(0.0) += credit;
        drop(balances);

        let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        info!(
            "📝 Paper {} #{}: {} {} @ {} {}",
            side, order_id, qty, info.base_asset, price, info.quote_asset
        );

        Ok(OrderReport {
            symbol: symbol.to_string(),
            order_id,
            side,
            status: OrderStatus::Filled,
            executed_qty: qty,
            cummulative_quote_qty: quote_amount,
            transact_time: chrono::Utc::now().timestamp_millis(),
            fills: vec![Fill::new(price, qty)],
        })
    }
}
