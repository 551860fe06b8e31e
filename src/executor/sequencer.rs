// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Trade sequencer: buy, race the timer against the gain trigger, sell once.

use crate::error::TradeError;
use crate::exchange::{ExchangeClient, SymbolInfo};
use crate::executor::buy::BuyExecutor;
use crate::executor::sell::{SellExecutor, SellTrigger};
use crate::executor::state::{LivePriceState, Phase, SharedState};
use crate::listeners::{PriceFeed, TickerEvent};
use crate::position::FillReport;
use crate::strategies::{GainTrigger, TradeIntent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, info, warn};

/// Five checks per second.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct SequenceResult {
    pub symbol: String,
    pub buy: FillReport,
    pub sell: FillReport,
    /// `(sell_total - buy_total) / buy_total * 100`.
    pub profit_pct: f64,
    pub trigger: SellTrigger,
    /// Exchange transact time minus local submit time.
    pub buy_latency_ms: i64,
    pub sell_latency_ms: i64,
}

pub fn profit_pct(buy: &FillReport, sell: &FillReport) -> f64 {
    (sell.quote_total - buy.quote_total) / buy.quote_total * 100.0
}

pub struct TradeSequencer {
    exchange: Arc<dyn ExchangeClient>,
    feed: Arc<dyn PriceFeed>,
    poll_interval: Duration,
    state: SharedState,
    buyer: BuyExecutor,
    seller: SellExecutor,
}

impl TradeSequencer {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        feed: Arc<dyn PriceFeed>,
        poll_interval: Duration,
    ) -> Self {
        let state: SharedState = Arc::new(Mutex::new(LivePriceState::default()));
        Self {
            buyer: BuyExecutor::new(Arc::clone(&exchange)),
            seller: SellExecutor::new(Arc::clone(&exchange), Arc::clone(&state)),
            exchange,
            feed,
            poll_interval,
            state,
        }
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    /// Run one intent to completion.
    ///
    /// Each run starts from fresh price state and a fresh sell guard.
    pub async fn execute(&mut self, intent: &TradeIntent) -> Result<SequenceResult, TradeError> {
        self.state = Arc::new(Mutex::new(LivePriceState::default()));
        self.seller = SellExecutor::new(Arc::clone(&self.exchange), Arc::clone(&self.state));

        let result = self.run(intent).await;
        if result.is_err() {
            self.state.lock().await.transition(Phase::Failed);
        }
        result
    }

    /// Balance and symbol checks before any order goes out.
    async fn preflight(&self, intent: &TradeIntent) -> Result<SymbolInfo, TradeError> {
        intent.validate()?;

        let available = self.exchange.get_balance(&intent.quote_asset).await?;
        if available < intent.budget {
            return Err(TradeError::InsufficientFunds {
                asset: intent.quote_asset.clone(),
                available,
                required: intent.budget,
            });
        }

        let symbol = intent.symbol();
        let info = self
            .exchange
            .get_symbol_info(&symbol)
            .await?
            .ok_or(TradeError::UnknownSymbol(symbol))?;

        if !info.is_trading() {
            return Err(TradeError::OrderRejected(format!(
                "{} is not trading (status {})",
                info.symbol, info.status
            )));
        }
        Ok(info)
    }

    async fn run(&self, intent: &TradeIntent) -> Result<SequenceResult, TradeError> {
        let symbol = self.preflight(intent).await?;

        let buy_submitted_ms = chrono::Utc::now().timestamp_millis();
        let buy = self.buyer.buy(intent, &symbol).await?;
        let t0 = Instant::now();
        self.state.lock().await.transition(Phase::Bought);

        let subscription = match self.feed.subscribe_ticker(&symbol.symbol).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                warn!("⚠️ Price feed unavailable, selling on timer only: {}", e);
                self.state.lock().await.record_error();
                None
            }
        };

        let (ticks, handle) = match subscription {
            Some(s) => (Some(s.ticks), Some(s.handle)),
            None => (None, None),
        };

        self.state.lock().await.transition(Phase::Monitoring);
        info!(
            "👀 Monitoring {} for {:?}{}",
            symbol.symbol,
            intent.wait,
            match &intent.gain {
                Some(g) => format!(" or +{}% (±{}%)", g.threshold_pct, g.tolerance_pct),
                None => String::new(),
            }
        );

        let deadline = t0 + intent.wait.min(TradeIntent::MAX_WAIT);
        let trigger = self.monitor(ticks, buy.avg_price, deadline, intent.gain).await;

        let sell_submitted_ms = chrono::Utc::now().timestamp_millis();
        let sold = self.seller.sell_once(&symbol, trigger).await;

        if let Some(handle) = handle {
            self.feed.unsubscribe(handle).await;
        }

        let sell = sold?.ok_or_else(|| {
            TradeError::OrderRejected("sell was already attempted for this run".into())
        })?;

        Ok(SequenceResult {
            symbol: symbol.symbol,
            profit_pct: profit_pct(&buy, &sell),
            buy_latency_ms: buy.transact_time - buy_submitted_ms,
            sell_latency_ms: sell.transact_time - sell_submitted_ms,
            buy,
            sell,
            trigger,
        })
    }

    /// Wait for whichever trigger fires first.
    ///
    /// The feed is polled with a timeout of one poll interval so the
    /// deadline is checked between ticks. A closed or failing feed leaves
    /// only the timer.
    async fn monitor(
        &self,
        mut ticks: Option<mpsc::Receiver<TickerEvent>>,
        buy_price: f64,
        deadline: Instant,
        gain: Option<GainTrigger>,
    ) -> SellTrigger {
        loop {
            let now = Instant::now();
            if now >= deadline {
                return SellTrigger::Timer;
            }

            let Some(rx) = ticks.as_mut() else {
                sleep_until(deadline).await;
                return SellTrigger::Timer;
            };

            let wait = self.poll_interval.min(deadline - now);
            let next = timeout(wait, rx.recv()).await;
            match next {
                Err(_) => continue,
                Ok(None) => {
                    warn!("⚠️ Price feed closed, selling on timer only");
                    self.state.lock().await.record_error();
                    ticks = None;
                }
                Ok(Some(TickerEvent::Error(msg))) => {
                    warn!("⚠️ Price feed error: {}", msg);
                    self.state.lock().await.record_error();
                }
                Ok(Some(TickerEvent::Price { last_price, .. })) => {
                    let mut state = self.state.lock().await;
                    if !state.record_price(last_price) {
                        continue;
                    }
                    let Some(gain) = gain else { continue };
                    let pct = GainTrigger::pct_increase(buy_price, last_price);
                    debug!("Price {} ({:+.4}%)", last_price, pct);
                    if gain.is_met(pct) {
                        info!("🎯 Gain target reached: {:.4}%", pct);
                        return SellTrigger::Threshold { pct_increase: pct };
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::Side;

    fn report(side: Side, quote_total: f64) -> FillReport {
        FillReport {
            side,
            executed_qty: 1.0,
            avg_price: quote_total,
            quote_total,
            transact_time: 0,
            fills: 1,
        }
    }

    #[test]
    fn profit_is_relative_to_buy_total() {
        let buy = report(Side::Buy, 0.01);
        assert!((profit_pct(&buy, &report(Side::Sell, 0.011)) - 10.0).abs() < 1e-9);
        assert!((profit_pct(&buy, &report(Side::Sell, 0.0095)) + 5.0).abs() < 1e-9);
    }
}
