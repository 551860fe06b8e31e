// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! The immutable description of one buy/wait/sell run.

use crate::error::TradeError;
use crate::strategies::GainTrigger;
use std::time::Duration;

/// How the buy order is sized from the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BuySizing {
    /// Spend exactly the budget in the quote asset.
    #[default]
    Quote,
    /// Convert the budget to a base quantity at the current ticker price.
    Base,
}

/// Trade Intent.
#[derive(Debug, Clone)]
pub struct TradeIntent {
    pub quote_asset: String,
    pub base_asset: String,
    /// Amount of quote asset to spend.
    pub budget: f64,
    pub sizing: BuySizing,
    /// Delay between buy completion and the timer-triggered sell.
    pub wait: Duration,
    pub gain: Option<GainTrigger>,
}

impl TradeIntent {
    /// Longest supported wait between buy and sell.
    pub const MAX_WAIT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

    /// Exchange symbol, e.g. `XYZBTC`.
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base_asset, self.quote_asset)
    }

    /// Checks that need no exchange round trip.
    pub fn validate(&self) -> Result<(), TradeError> {
        self.validate_parameters()?;
        if self.base_asset.is_empty() || self.quote_asset.is_empty() {
            return Err(TradeError::Configuration("base and quote assets are required".into()));
        }
        Ok(())
    }

    /// Wait, budget and gain checks; the base asset may still be unknown.
    pub fn validate_parameters(&self) -> Result<(), TradeError> {
        if self.wait.is_zero() {
            return Err(TradeError::Configuration(
                "wait duration must be non-zero".into(),
            ));
        }
        if self.wait > Self::MAX_WAIT {
            return Err(TradeError::Configuration(format!(
                "wait of {}s exceeds the {}s maximum",
                self.wait.as_secs(),
                Self::MAX_WAIT.as_secs()
            )));
        }
        if !(self.budget.is_finite() && self.budget > 0.0) {
            return Err(TradeError::Configuration(format!(
                "budget must be positive, got {}",
                self.budget
            )));
        }
        if let Some(gain) = &self.gain {
            if gain.tolerance_pct < 0.0 || !gain.threshold_pct.is_finite() {
                return Err(TradeError::Configuration(format!(
                    "invalid gain trigger: {}% +/- {}%",
                    gain.threshold_pct, gain.tolerance_pct
                )));
            }
        }
        Ok(())
    }
}
