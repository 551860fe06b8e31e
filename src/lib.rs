// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pump Bot - buy a coin, sell it on a timer or a gain target.

pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod exchange;
pub mod executor;
pub mod listeners;
pub mod position;
pub mod strategies;
pub mod telegram;

pub use error::TradeError;
