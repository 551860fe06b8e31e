// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use pump_bot::error::TradeError;
use pump_bot::exchange::{
    ExchangeClient, Fill, MarketData, OrderReport, OrderSize, OrderStatus, Side, SymbolInfo,
};
use pump_bot::position::floor_to_step;

#[derive(Debug, Clone)]
pub struct RecordedOrder {
    pub side: Side,
    pub size: OrderSize,
    pub at: Instant,
}

#[derive(Debug)]
pub struct MockState {
    pub balances: HashMap<String, f64>,
    pub symbols: Vec<SymbolInfo>,
    pub buy_price: f64,
    pub sell_price: f64,
    pub buy_status: OrderStatus,
    pub sell_status: OrderStatus,
    pub orders: Vec<RecordedOrder>,
}

/// In-memory exchange with scripted prices and statuses.
#[derive(Clone)]
pub struct MockExchange {
    pub state: Arc<Mutex<MockState>>,
}

pub fn symbol(base: &str, quote: &str, step_size: f64) -> SymbolInfo {
    SymbolInfo {
        symbol: format!("{}{}", base, quote),
        base_asset: base.to_string(),
        quote_asset: quote.to_string(),
        status: "TRADING".to_string(),
        step_size,
        min_qty: step_size,
    }
}

impl MockExchange {
    /// `XYZBTC` with a step of 1, priced at 0.0001 BTC.
    pub fn new(btc_balance: f64) -> Self {
        let mut balances = HashMap::new();
        balances.insert("BTC".to_string(), btc_balance);
        Self {
            state: Arc::new(Mutex::new(MockState {
                balances,
                symbols: vec![symbol("XYZ", "BTC", 1.0)],
                buy_price: 0.0001,
                sell_price: 0.0001,
                buy_status: OrderStatus::Filled,
                sell_status: OrderStatus::Filled,
                orders: Vec::new(),
            })),
        }
    }

    pub fn set_sell_price(&self, price: f64) {
        self.state.lock().unwrap().sell_price = price;
    }

    pub fn set_buy_status(&self, status: OrderStatus) {
        self.state.lock().unwrap().buy_status = status;
    }

    pub fn set_balance(&self, asset: &str, amount: f64) {
        self.state.lock().unwrap().balances.insert(asset.to_string(), amount);
    }

    pub fn orders(&self) -> Vec<RecordedOrder> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn orders_on(&self, side: Side) -> Vec<RecordedOrder> {
        self.orders().into_iter().filter(|o| o.side == side).collect()
    }
}

#[async_trait]
impl MarketData for MockExchange {
    async fn get_symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>, TradeError> {
        let state = self.state.lock().unwrap();
        Ok(state.symbols.iter().find(|s| s.symbol == symbol).cloned())
    }

    async fn list_symbols(&self, quote_asset: &str) -> Result<Vec<SymbolInfo>, TradeError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .symbols
            .iter()
            .filter(|s| s.quote_asset == quote_asset)
            .cloned()
            .collect())
    }

    async fn get_ticker(&self, _symbol: &str) -> Result<f64, TradeError> {
        Ok(self.state.lock().unwrap().buy_price)
    }
}

#[async_trait]
impl ExchangeClient for MockExchange {
    async fn get_balance(&self, asset: &str) -> Result<f64, TradeError> {
        Ok(self.state.lock().unwrap().balances.get(asset).copied().unwrap_or(0.0))
    }

    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        size: OrderSize,
    ) -> Result<OrderReport, TradeError> {
        let mut state = self.state.lock().unwrap();
        let info = state
            .symbols
            .iter()
            .find(|s| s.symbol == symbol)
            .cloned()
            .ok_or_else(|| TradeError::UnknownSymbol(symbol.to_string()))?;

        state.orders.push(RecordedOrder {
            side,
            size,
            at: Instant::now(),
        });

        let (price, status) = match side {
            Side::Buy => (state.buy_price, state.buy_status.clone()),
            Side::Sell => (state.sell_price, state.sell_status.clone()),
        };
        let order_id = state.orders.len() as u64;

        if status != OrderStatus::Filled {
            return Ok(OrderReport {
                symbol: symbol.to_string(),
                order_id,
                side,
                status,
                executed_qty: 0.0,
                cummulative_quote_qty: 0.0,
                transact_time: chrono::Utc::now().timestamp_millis(),
                fills: Vec::new(),
            });
        }

        let qty = match size {
            OrderSize::Quote(amount) => floor_to_step(amount / price, info.step_size),
            OrderSize::Base(qty) => qty,
        };
        let quote_amount = qty * price;
        let (debit_asset, debit, credit_asset, credit) = match side {
            Side::Buy => (info.quote_asset.clone(), quote_amount, info.base_asset.clone(), qty),
            Side::Sell => (info.base_asset.clone(), qty, info.quote_asset.clone(), quote_amount),
        };
        *state.balances.entry(debit_asset).or_insert(0.0) -= debit;
        *state.balances.entry(credit_asset).or_insert(0.0) += credit;

        // Split into two fills at the same price.
        let first = (qty * 0.6).floor();
        let fills = vec![Fill::new(price, first), Fill::new(price, qty - first)];

        Ok(OrderReport {
            symbol: symbol.to_string(),
            order_id,
            side,
            status,
            executed_qty: qty,
            cummulative_quote_qty: quote_amount,
            transact_time: chrono::Utc::now().timestamp_millis(),
            fills,
        })
    }
}
