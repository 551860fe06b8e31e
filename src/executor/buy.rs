// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Market buy for the entry leg.

use crate::error::TradeError;
use crate::exchange::{ExchangeClient, OrderSize, Side, SymbolInfo};
use crate::position::{floor_to_step, FillReport};
use crate::strategies::{BuySizing, TradeIntent};
use std::sync::Arc;
use tracing::{error, info};

pub struct BuyExecutor {
    exchange: Arc<dyn ExchangeClient>,
}

impl BuyExecutor {
    pub fn new(exchange: Arc<dyn ExchangeClient>) -> Self {
        Self { exchange }
    }

    /// Order size for the intent's budget.
    pub async fn order_size(
        &self,
        intent: &TradeIntent,
        symbol: &SymbolInfo,
    ) -> Result<OrderSize, TradeError> {
        match intent.sizing {
            BuySizing::Quote => Ok(OrderSize::Quote(intent.budget)),
            BuySizing::Base => {
                let price = self.exchange.get_ticker(&symbol.symbol).await?;
                let qty = floor_to_step(intent.budget / price, symbol.step_size);
                if !qty.is_finite() || qty <= 0.0 {
                    return Err(TradeError::OrderRejected(format!(
                        "budget {} {} buys less than one lot of {}",
                        intent.budget, intent.quote_asset, symbol.base_asset
                    )));
                }
                Ok(OrderSize::Base(qty))
            }
        }
    }

    /// Execute the buy and require a complete fill.
    pub async fn buy(
        &self,
        intent: &TradeIntent,
        symbol: &SymbolInfo,
    ) -> Result<FillReport, TradeError> {
        let size = self.order_size(intent, symbol).await?;
        info!("🚀 Executing BUY: {} ({:?})", symbol.symbol, size);

        let order = self
            .exchange
            .submit_market_order(&symbol.symbol, Side::Buy, size)
            .await?;

        if !order.is_filled() {
            error!("❌ BUY not filled: {} status {}", symbol.symbol, order.status);
            return Err(TradeError::OrderNotFilled {
                side: Side::Buy,
                status: order.status,
            });
        }

        let report = FillReport::from_order(&order)?;
        info!(
            "✅ BUY FILLED: {} {} @ {} ({} fills)",
            report.executed_qty, symbol.base_asset, report.avg_price, report.fills
        );
        Ok(report)
    }
}
