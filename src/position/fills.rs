// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Fill reports derived from exchange order responses.

use crate::error::TradeError;
use crate::exchange::{Fill, OrderReport, Side};

/// Summary of one filled order.
#[derive(Debug, Clone, PartialEq)]
pub struct FillReport {
    pub side: Side,
    pub executed_qty: f64,
    /// Quantity-weighted average over all partial fills.
    pub avg_price: f64,
    /// Quote asset paid (buy) or received (sell): `Σ price * qty`.
    pub quote_total: f64,
    /// Exchange timestamp in milliseconds.
    pub transact_time: i64,
    pub fills: usize,
}

/// `Σ(price_i * qty_i) / Σ(qty_i)`, or `None` for an empty or zero-quantity list.
pub fn weighted_average_price(fills: &[Fill]) -> Option<f64> {
    let qty: f64 = fills.iter().map(|f| f.qty).sum();
    if qty <= 0.0 {
        return None;
    }
    Some(quote_total(fills) / qty)
}

pub fn quote_total(fills: &[Fill]) -> f64 {
    fills.iter().map(|f| f.price * f.qty).sum()
}

impl FillReport {
    /// Build a report from a filled order.
    pub fn from_order(order: &OrderReport) -> Result<Self, TradeError> {
        let avg_price = weighted_average_price(&order.fills).ok_or_else(|| {
            TradeError::Exchange(format!(
                "{} order {} reported no fills",
                order.side, order.order_id
            ))
        })?;

        Ok(Self {
            side: order.side,
            executed_qty: order.executed_qty,
            avg_price,
            quote_total: quote_total(&order.fills),
            transact_time: order.transact_time,
            fills: order.fills.len(),
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]
        #[test]
        fn average_is_quantity_weighted_and_bounded(
            legs in prop::collection::vec((1e-8..1e5f64, 1e-6..1e6f64), 1..20)
        ) {
            let fills: Vec<Fill> = legs.iter().map(|&(price, qty)| Fill::new(price, qty)).collect();
            let avg = weighted_average_price(&fills).unwrap();

            let notional: f64 = legs.iter().map(|(p, q)| p * q).sum();
            let qty: f64 = legs.iter().map(|(_, q)| q).sum();
            let expected = notional / qty;
            prop_assert!((avg - expected).abs() <= 1e-9 * expected);

            let lo = legs.iter().map(|(p, _)| *p).fold(f64::INFINITY, f64::min);
            let hi = legs.iter().map(|(p, _)| *p).fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(avg >= lo * (1.0 - 1e-12));
            prop_assert!(avg <= hi * (1.0 + 1e-12));
        }
    }
}
