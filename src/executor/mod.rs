// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Order execution: the buy leg, the guarded sell leg and the sequencer
//! that ties them together.

pub mod buy;
pub mod sell;
pub mod sequencer;
pub mod state;

pub use buy::BuyExecutor;
pub use sell::{SellExecutor, SellTrigger};
pub use sequencer::{SequenceResult, TradeSequencer, DEFAULT_POLL_INTERVAL};
pub use state::{LivePriceState, Phase, SharedState};
