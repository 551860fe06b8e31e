// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sell execution for closing the position, at most once per run.

use crate::error::TradeError;
use crate::exchange::{ExchangeClient, OrderSize, Side, SymbolInfo};
use crate::executor::state::{Phase, SharedState};
use crate::position::{floor_to_step, FillReport};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// What ended the monitoring phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SellTrigger {
    Timer,
    Threshold { pct_increase: f64 },
}

impl fmt::Display for SellTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timer => f.write_str("timer expiry"),
            Self::Threshold { pct_increase } => {
                write!(f, "percentage increase reached ({:.4}%)", pct_increase)
            }
        }
    }
}

/// Sell executor guarding the exit leg.
pub struct SellExecutor {
    exchange: Arc<dyn ExchangeClient>,
    state: SharedState,
}

impl SellExecutor {
    pub fn new(exchange: Arc<dyn ExchangeClient>, state: SharedState) -> Self {
        Self { exchange, state }
    }

    /// Sell the whole position unless a sell was already attempted.
    ///
    /// The state lock is held from the guard check until the order returns,
    /// so concurrent callers submit exactly one order. `Ok(None)` means
    /// another caller got there first.
    pub async fn sell_once(
        &self,
        symbol: &SymbolInfo,
        trigger: SellTrigger,
    ) -> Result<Option<FillReport>, TradeError> {
        let mut state = self.state.lock().await;
        if state.sold {
            debug!("Sell already attempted, ignoring {}", trigger);
            return Ok(None);
        }
        state.sold = true;

        let balance = self.exchange.get_balance(&symbol.base_asset).await?;
        let qty = floor_to_step(balance, symbol.step_size);
        if qty <= 0.0 {
            return Err(TradeError::OrderRejected(format!(
                "no {} to sell (balance {})",
                symbol.base_asset, balance
            )));
        }

        info!("🔴 Executing SELL: {} {} due to {}", qty, symbol.base_asset, trigger);

        let order = self
            .exchange
            .submit_market_order(&symbol.symbol, Side::Sell, OrderSize::Base(qty))
            .await?;

        if !order.is_filled() {
            error!("❌ SELL not filled: {} status {}", symbol.symbol, order.status);
            return Err(TradeError::OrderNotFilled {
                side: Side::Sell,
                status: order.status,
            });
        }

        let report = FillReport::from_order(&order)?;
        state.transition(Phase::Sold);
        info!(
            "✅ SELL FILLED: {} {} @ {} ({} fills)",
            report.executed_qty, symbol.base_asset, report.avg_price, report.fills
        );
        Ok(Some(report))
    }
}
