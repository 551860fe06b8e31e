// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command-line flags, the interactive coin prompt and status lines.

use crate::config::Mode;
use crate::error::TradeError;
use crate::executor::SequenceResult;
use crate::position::FillReport;
use crate::strategies::{BuySizing, GainTrigger, TradeIntent};
use clap::Parser;
use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::time::Duration;

/// Buy a coin, then sell it after a delay or once a gain target is hit.
#[derive(Debug, Parser)]
#[command(name = "pump-bot", version)]
pub struct Args {
    /// Amount of quote asset to spend on the buy.
    #[arg(long, alias = "btc", alias = "quote")]
    pub budget: f64,

    /// Seconds to wait between buy and sell (non-zero).
    #[arg(long)]
    pub wait: u64,

    /// Gain over the buy price, in percent, that triggers an early sell.
    #[arg(long, conflicts_with = "sell_factor")]
    pub pct: Option<f64>,

    /// Band around --pct, in percentage points.
    #[arg(long, default_value_t = 1.0)]
    pub tolerance: f64,

    /// Sell price / buy price ratio that triggers an early sell (1.1 to 20).
    #[arg(long = "sell-factor", alias = "sf")]
    pub sell_factor: Option<f64>,

    /// Base asset to buy; prompted for when absent.
    #[arg(long)]
    pub coin: Option<String>,

    #[arg(long = "quote-asset", default_value = "BTC")]
    pub quote_asset: String,

    #[arg(long = "size-by", value_enum, default_value_t = BuySizing::Quote)]
    pub size_by: BuySizing,

    #[arg(long, value_enum, default_value_t = Mode::Live)]
    pub mode: Mode,

    /// Starting quote balance in paper mode (defaults to the budget).
    #[arg(long = "paper-balance")]
    pub paper_balance: Option<f64>,
}

impl Args {
    pub fn quote_asset(&self) -> String {
        self.quote_asset.trim().to_uppercase()
    }

    /// Gain trigger from --pct or --sell-factor, if either is usable.
    pub fn gain_trigger(&self) -> Option<GainTrigger> {
        match (self.pct, self.sell_factor) {
            (Some(pct), _) => Some(GainTrigger::new(pct, self.tolerance)),
            (None, Some(sf)) => GainTrigger::from_sell_factor(sf),
            (None, None) => None,
        }
    }

    /// One-line description of the early-sell setting.
    pub fn gain_banner(&self) -> String {
        match (self.pct, self.gain_trigger()) {
            (Some(pct), _) => format!("Selling early at +{}% (±{}%)", pct, self.tolerance),
            (None, Some(gain)) => format!("Using a sell factor of {}", gain.sell_factor()),
            (None, None) => "Not using a sell factor".to_string(),
        }
    }

    pub fn intent(&self, base_asset: String) -> TradeIntent {
        TradeIntent {
            quote_asset: self.quote_asset(),
            base_asset,
            budget: self.budget,
            sizing: self.size_by,
            wait: Duration::from_secs(self.wait),
            gain: self.gain_trigger(),
        }
    }
}

pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Check a coin given on the command line.
pub fn check_base_asset(raw: &str, tradable: &HashSet<String>) -> Result<String, TradeError> {
    let coin = normalize_symbol(raw);
    if tradable.contains(&coin) {
        Ok(coin)
    } else {
        Err(TradeError::UnknownSymbol(coin))
    }
}

/// Prompt until the operator names a tradable coin.
///
/// End of input is an `UnknownSymbol` error.
pub fn resolve_base_asset<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    tradable: &HashSet<String>,
) -> Result<String, TradeError> {
    write!(output, "Ready. Awaiting coin input (Base asset): ")?;
    output.flush()?;

    let mut last = String::new();
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(TradeError::UnknownSymbol(last));
        }

        let coin = normalize_symbol(&line);
        if tradable.contains(&coin) {
            return Ok(coin);
        }

        write!(output, "Coin {} does not exist. Try again: ", coin)?;
        output.flush()?;
        last = coin;
    }
}

fn clock(transact_time: i64) -> String {
    chrono::DateTime::from_timestamp_millis(transact_time)
        .map(|t| t.format("%H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| transact_time.to_string())
}

pub fn fill_line(verb: &str, report: &FillReport, base: &str, quote: &str, latency_ms: i64) -> String {
    format!(
        "{} {} {} for {:.8} {} in {} ms ({} fills @ {})",
        verb,
        report.executed_qty,
        base,
        report.quote_total,
        quote,
        latency_ms,
        report.fills,
        clock(report.transact_time)
    )
}

/// Human-readable summary printed at the end of a run.
pub fn status_lines(result: &SequenceResult, base: &str, quote: &str) -> Vec<String> {
    vec![
        fill_line("Bought", &result.buy, base, quote, result.buy_latency_ms),
        format!(
            "{} due to {}",
            fill_line("Sold", &result.sell, base, quote, result.sell_latency_ms),
            result.trigger
        ),
        format!("Profit: {:.4}%", result.profit_pct),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::Side;
    use std::io::Cursor;

    fn tradable() -> HashSet<String> {
        ["XYZ", "ABC"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reprompts_until_valid() {
        let mut input = Cursor::new("nope\n  \nxyz\n");
        let mut output = Vec::new();
        let coin = resolve_base_asset(&mut input, &mut output, &tradable()).unwrap();

        assert_eq!(coin, "XYZ");
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Coin NOPE does not exist. Try again:"));
        assert_eq!(text.matches("Try again").count(), 2);
    }

    #[test]
    fn end_of_input_is_unknown_symbol() {
        let mut input = Cursor::new("nope\n");
        let result = resolve_base_asset(&mut input, &mut Vec::new(), &tradable());
        assert!(matches!(result, Err(TradeError::UnknownSymbol(s)) if s == "NOPE"));
    }

    #[test]
    fn flag_coin_is_checked() {
        assert_eq!(check_base_asset(" abc ", &tradable()).unwrap(), "ABC");
        assert!(check_base_asset("zzz", &tradable()).is_err());
    }

    #[test]
    fn gain_trigger_from_flags() {
        let args = Args::parse_from(["pump-bot", "--btc", "0.01", "--wait", "60", "--pct", "10"]);
        assert_eq!(args.gain_trigger(), Some(GainTrigger::new(10.0, 1.0)));

        let args = Args::parse_from(["pump-bot", "--budget", "0.01", "--wait", "60", "--sf", "1.05"]);
        assert_eq!(args.gain_trigger(), None);

        let args = Args::parse_from(["pump-bot", "--budget", "0.01", "--wait", "60"]);
        let intent = args.intent("XYZ".into());
        assert_eq!(intent.symbol(), "XYZBTC");
        assert_eq!(intent.wait, Duration::from_secs(60));
        assert!(intent.gain.is_none());
    }

    #[test]
    fn banner_shows_clamped_sell_factor() {
        let args = Args::parse_from(["pump-bot", "--budget", "0.01", "--wait", "60", "--sell-factor", "35"]);
        assert_eq!(args.gain_banner(), "Using a sell factor of 20");

        let args = Args::parse_from(["pump-bot", "--budget", "0.01", "--wait", "60", "--sf", "1.05"]);
        assert_eq!(args.gain_banner(), "Not using a sell factor");
    }

    #[test]
    fn flag_errors_surface_before_coin_is_known() {
        let args = Args::parse_from(["pump-bot", "--budget", "0.01", "--wait", "0"]);
        let template = args.intent(String::new());
        assert!(matches!(
            template.validate_parameters(),
            Err(TradeError::Configuration(_))
        ));

        let args = Args::parse_from(["pump-bot", "--budget", "0.01", "--wait", "60"]);
        assert!(args.intent(String::new()).validate_parameters().is_ok());
    }

    #[test]
    fn pct_and_sell_factor_conflict() {
        let parsed = Args::try_parse_from([
            "pump-bot", "--budget", "0.01", "--wait", "60", "--pct", "10", "--sell-factor", "2",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn fill_line_formats_clock() {
        let report = FillReport {
            side: Side::Buy,
            executed_qty: 100.0,
            avg_price: 0.0001,
            quote_total: 0.01,
            transact_time: 3_723_456,
            fills: 2,
        };
        assert_eq!(
            fill_line("Bought", &report, "XYZ", "BTC", 84),
            "Bought 100 XYZ for 0.01000000 BTC in 84 ms (2 fills @ 01:02:03.456)"
        );
    }
}
