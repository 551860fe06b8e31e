// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Trading strategy inputs: the intent and its sell triggers.

pub mod gain;
pub mod intent;

pub use gain::GainTrigger;
pub use intent::{BuySizing, TradeIntent};
