// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pump Bot - fast market buy, timed or target-triggered market sell.

use anyhow::Context;
use clap::Parser;
use pump_bot::cli::{check_base_asset, resolve_base_asset, status_lines, Args};
use pump_bot::config::{Config, Mode};
use pump_bot::credentials::CredentialStore;
use pump_bot::error::TradeError;
use pump_bot::exchange::{BinanceClient, ExchangeClient, PaperExchange};
use pump_bot::executor::TradeSequencer;
use pump_bot::listeners::BinanceTickerFeed;
use pump_bot::strategies::TradeIntent;
use pump_bot::telegram::TelegramNotifier;
use std::collections::HashSet;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {}", e);
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn connect(args: &Args, config: &Config, quote: &str) -> anyhow::Result<Arc<dyn ExchangeClient>> {
    let exchange: Arc<dyn ExchangeClient> = match config.mode {
        Mode::Paper => {
            let balance = args.paper_balance.unwrap_or(args.budget);
            info!("📝 Paper trading with {} {}", balance, quote);
            let market = BinanceClient::public(config.api_url.as_str())?;
            Arc::new(PaperExchange::new(market).with_balance(quote, balance))
        }
        Mode::Live | Mode::Testnet => {
            let store = CredentialStore::new(config.key_file.clone());
            let credentials = store
                .load_or_prompt()
                .with_context(|| format!("loading keys from {}", store.path().display()))?;
            Arc::new(BinanceClient::new(
                config.api_url.as_str(),
                Some(credentials),
                config.recv_window_ms,
            )?)
        }
    };
    Ok(exchange)
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env(args.mode)?;
    let quote = args.quote_asset();

    info!("🚀 Starting Pump Bot");
    info!("Mode: {:?}", config.mode);
    info!("API: {}", config.api_url);
    info!("Budget: {} {}", args.budget, quote);
    info!("Wait: {}s", args.wait);

    // Reject bad wait, budget or gain flags before anything is asked of the operator.
    let template = args.intent(String::new());
    template.validate_parameters()?;

    println!("{}", args.gain_banner());

    let notifier = TelegramNotifier::new(config.telegram_token.clone(), config.telegram_chat_id.clone());
    let exchange = connect(&args, &config, &quote)?;
    println!("Session initiated with Binance API");

    // Fail fast before the operator is asked for a coin.
    let available = exchange.get_balance(&quote).await?;
    if available < args.budget {
        return Err(TradeError::InsufficientFunds {
            asset: quote,
            available,
            required: args.budget,
        }
        .into());
    }

    let tradable: HashSet<String> = exchange
        .list_symbols(&quote)
        .await?
        .into_iter()
        .filter(|s| s.is_trading())
        .map(|s| s.base_asset)
        .collect();
    info!("📋 {} tradable {} pairs", tradable.len(), quote);

    let base = match &args.coin {
        Some(coin) => check_base_asset(coin, &tradable)?,
        None => tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            resolve_base_asset(&mut stdin.lock(), &mut stdout, &tradable)
        })
        .await??,
    };

    let intent = TradeIntent {
        base_asset: base.clone(),
        ..template
    };
    let feed = Arc::new(BinanceTickerFeed::new(config.ws_url.as_str()));
    let mut sequencer = TradeSequencer::new(exchange, feed, config.poll_interval());

    match sequencer.execute(&intent).await {
        Ok(result) => {
            for line in status_lines(&result, &base, &quote) {
                println!("{}", line);
            }
            if notifier.is_enabled() {
                notifier.notify_result(&result, &quote).await;
            }
            Ok(())
        }
        Err(e) => {
            if notifier.is_enabled() {
                notifier.notify_failure(&intent.symbol(), &e).await;
            }
            Err(e.into())
        }
    }
}
