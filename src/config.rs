// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration module - loads settings from environment variables.

use crate::credentials::{DEFAULT_KEY_FILE, TESTNET_KEY_FILE};
use crate::error::TradeError;
use crate::exchange::binance::{LIVE_API_URL, TESTNET_API_URL};
use crate::listeners::ticker::{LIVE_WS_URL, TESTNET_WS_URL};
use std::path::PathBuf;
use std::time::Duration;

/// Which exchange implementation backs the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// Real orders on the live exchange.
    #[default]
    Live,
    /// Real orders against the exchange's spot testnet.
    Testnet,
    /// Live market data, simulated balances and fills.
    Paper,
}

/// Runtime settings that are not per-trade flags.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,

    // Endpoints
    pub api_url: String,
    pub ws_url: String,
    pub recv_window_ms: u64,

    // Credentials
    pub key_file: PathBuf,

    // Monitoring
    pub poll_interval_ms: u64,

    // Notifications
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env(mode: Mode) -> Result<Self, TradeError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(mode, |name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(mode: Mode, lookup: F) -> Result<Self, TradeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (default_api, default_ws, default_keys) = match mode {
            Mode::Live | Mode::Paper => (LIVE_API_URL, LIVE_WS_URL, DEFAULT_KEY_FILE),
            Mode::Testnet => (TESTNET_API_URL, TESTNET_WS_URL, TESTNET_KEY_FILE),
        };
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let poll_interval_ms = parse_u64("POLL_INTERVAL_MS", &var_or("POLL_INTERVAL_MS", "200"))?;
        if poll_interval_ms == 0 {
            return Err(TradeError::Configuration("POLL_INTERVAL_MS must be non-zero".into()));
        }

        Ok(Self {
            mode,
            api_url: var_or("BINANCE_API_URL", default_api),
            ws_url: var_or("BINANCE_WS_URL", default_ws),
            recv_window_ms: parse_u64("RECV_WINDOW_MS", &var_or("RECV_WINDOW_MS", "5000"))?,
            key_file: PathBuf::from(var_or("KEY_FILE", default_keys)),
            poll_interval_ms,
            telegram_token: lookup("TELEGRAM_BOT_TOKEN").filter(|v| !v.is_empty()),
            telegram_chat_id: lookup("TELEGRAM_CHAT_ID").filter(|v| !v.is_empty()),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_u64(name: &str, raw: &str) -> Result<u64, TradeError> {
    raw.trim()
        .parse()
        .map_err(|e| TradeError::Configuration(format!("Invalid {} {:?}: {}", name, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_follow_mode() {
        let live = Config::from_lookup(Mode::Live, lookup(&[])).unwrap();
        assert_eq!(live.api_url, LIVE_API_URL);
        assert_eq!(live.key_file, PathBuf::from(DEFAULT_KEY_FILE));
        assert_eq!(live.poll_interval(), Duration::from_millis(200));

        let testnet = Config::from_lookup(Mode::Testnet, lookup(&[])).unwrap();
        assert_eq!(testnet.api_url, TESTNET_API_URL);
        assert_eq!(testnet.ws_url, TESTNET_WS_URL);
        assert_eq!(testnet.key_file, PathBuf::from(TESTNET_KEY_FILE));
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(
            Mode::Paper,
            lookup(&[
                ("BINANCE_API_URL", "http://localhost:9000"),
                ("POLL_INTERVAL_MS", "50"),
                ("TELEGRAM_BOT_TOKEN", "token"),
                ("TELEGRAM_CHAT_ID", ""),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.telegram_token.as_deref(), Some("token"));
        assert_eq!(config.telegram_chat_id, None);
    }

    #[test]
    fn invalid_numbers_are_configuration_errors() {
        let bad = Config::from_lookup(Mode::Live, lookup(&[("POLL_INTERVAL_MS", "fast")]));
        assert!(matches!(bad, Err(TradeError::Configuration(_))));
        let zero = Config::from_lookup(Mode::Live, lookup(&[("POLL_INTERVAL_MS", "0")]));
        assert!(zero.is_err());
    }
}
