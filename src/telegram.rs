// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Telegram notifier module.

use crate::error::TradeError;
use crate::executor::SequenceResult;
use teloxide::prelude::*;
use tracing::{error, info};

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Option<Bot>,
    chat_id: Option<ChatId>,
}

impl TelegramNotifier {
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
        info!(
            "📱 Initializing Telegram: token={}, chat_id={}",
            token.as_ref().map(|_| "SET").unwrap_or("NONE"),
            chat_id.as_ref().map(|_| "SET").unwrap_or("NONE")
        );

        let bot = token.map(Bot::new);
        // An unparseable chat id disables sending.
        let chat_id = chat_id.and_then(|id| id.parse::<i64>().ok()).map(ChatId);

        Self { bot, chat_id }
    }

    pub fn is_enabled(&self) -> bool {
        self.bot.is_some() && self.chat_id.is_some()
    }

    pub async fn send_message(&self, message: &str) {
        if let (Some(bot), Some(chat_id)) = (&self.bot, &self.chat_id) {
            match bot.send_message(*chat_id, message).await {
                Ok(_) => info!("📤 Sent Telegram message"),
                Err(e) => error!("Failed to send Telegram message: {}", e),
            }
        }
    }

    pub async fn notify_result(&self, result: &SequenceResult, quote_asset: &str) {
        self.send_message(&result_message(result, quote_asset)).await;
    }

    pub async fn notify_failure(&self, symbol: &str, err: &TradeError) {
        self.send_message(&format!("❌ {} run failed\n{}", symbol, err)).await;
    }
}

pub fn result_message(result: &SequenceResult, quote_asset: &str) -> String {
    format!(
        "🟢 BUY {} @ {:.8} {q}\n🔴 SELL {} @ {:.8} {q} ({})\nProfit: {:.4}%",
        result.buy.executed_qty,
        result.buy.avg_price,
        result.sell.executed_qty,
        result.sell.avg_price,
        result.trigger,
        result.profit_pct,
        q = quote_asset,
    )
}
