// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Position accounting: fill reports and lot-size sizing.

pub mod fills;
pub mod lot;

pub use fills::{weighted_average_price, FillReport};
pub use lot::floor_to_step;
