// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Early-exit trigger on percentage gain over the buy price.

/// Fires when the price gain is within `tolerance_pct` of `threshold_pct`.
///
/// The band is evaluated as `gain + tolerance >= threshold` or
/// `gain - tolerance >= threshold`, which admits a gain up to `tolerance`
/// points short of the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainTrigger {
    pub threshold_pct: f64,
    pub tolerance_pct: f64,
}

impl GainTrigger {
    /// Sell factors below this disable the trigger.
    pub const MIN_SELL_FACTOR: f64 = 1.1;
    pub const MAX_SELL_FACTOR: f64 = 20.0;

    pub fn new(threshold_pct: f64, tolerance_pct: f64) -> Self {
        Self {
            threshold_pct,
            tolerance_pct,
        }
    }

    /// Trigger from a `sell price / buy price` ratio, clamped to
    /// `[MIN_SELL_FACTOR, MAX_SELL_FACTOR]`. Below the minimum, no trigger.
    pub fn from_sell_factor(sell_factor: f64) -> Option<Self> {
        if sell_factor.is_nan() || sell_factor < Self::MIN_SELL_FACTOR {
            return None;
        }
        let factor = sell_factor.min(Self::MAX_SELL_FACTOR);
        Some(Self::new((factor - 1.0) * 100.0, 0.0))
    }

    /// The `last / buy` ratio at which the trigger fires, ignoring tolerance.
    pub fn sell_factor(&self) -> f64 {
        self.threshold_pct / 100.0 + 1.0
    }

    /// Percentage change from `buy_price` to `last_price`.
    pub fn pct_increase(buy_price: f64, last_price: f64) -> f64 {
        (last_price - buy_price) / buy_price * 100.0
    }

    pub fn is_met(&self, pct_increase: f64) -> bool {
        pct_increase + self.tolerance_pct >= self.threshold_pct
            || pct_increase - self.tolerance_pct >= self.threshold_pct
    }

    /// Returns the gain when the trigger fires for this price.
    pub fn check(&self, buy_price: f64, last_price: f64) -> Option<f64> {
        let pct = Self::pct_increase(buy_price, last_price);
        self.is_met(pct).then_some(pct)
    }
}
