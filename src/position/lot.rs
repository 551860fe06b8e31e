// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lot-size arithmetic for sellable quantities.

/// Absorbs float noise such as `0.3 / 0.1 == 2.9999999999999996`.
const STEP_EPSILON: f64 = 1e-9;

/// Count decimal places in a step string like `"0.00100000"`.
pub fn decimals_from_str(raw: &str) -> u32 {
    match raw.trim().split_once('.') {
        Some((_, frac)) => frac.trim_end_matches('0').len() as u32,
        None => 0,
    }
}

/// Number of decimal places needed to represent `step` exactly.
///
/// `f64` display is the shortest string that round-trips and never uses an
/// exponent, so this matches the exchange's own `stepSize` string.
pub fn step_decimals(step: f64) -> u32 {
    decimals_from_str(&step.to_string())
}

/// Floor `qty` to the nearest multiple of `step`.
///
/// The result is rounded to the step's precision so the exchange receives
/// `10.234` rather than `10.234000000000002`. A non-positive step leaves the
/// quantity untouched.
pub fn floor_to_step(qty: f64, step: f64) -> f64 {
    if step <= 0.0 || qty <= 0.0 {
        return qty.max(0.0);
    }

    let steps = (qty / step + STEP_EPSILON).floor();
    let scale = 10f64.powi(step_decimals(step) as i32);
    (steps * step * scale).round() / scale
}
