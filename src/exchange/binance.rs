// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Binance spot REST client (live or testnet endpoints).

use crate::credentials::Credentials;
use crate::error::TradeError;
use crate::exchange::{
    ExchangeClient, Fill, MarketData, OrderReport, OrderSize, OrderStatus, Side, SymbolInfo,
};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, instrument};

pub const LIVE_API_URL: &str = "https://api.binance.com";
pub const TESTNET_API_URL: &str = "https://testnet.binance.vision";

/// Binance error code for an unknown symbol.
const INVALID_SYMBOL: i64 = -1121;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfoBody {
    symbols: Vec<SymbolBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolBody {
    symbol: String,
    status: String,
    base_asset: String,
    quote_asset: String,
    #[serde(default)]
    filters: Vec<FilterBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterBody {
    filter_type: String,
    step_size: Option<String>,
    min_qty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountBody {
    balances: Vec<BalanceBody>,
}

#[derive(Debug, Deserialize)]
struct BalanceBody {
    asset: String,
    free: String,
}

#[derive(Debug, Deserialize)]
struct TickerPriceBody {
    price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderBody {
    symbol: String,
    order_id: u64,
    transact_time: i64,
    executed_qty: String,
    cummulative_quote_qty: String,
    status: String,
    side: String,
    #[serde(default)]
    fills: Vec<FillBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FillBody {
    price: String,
    qty: String,
    #[serde(default)]
    commission: Option<String>,
    #[serde(default)]
    commission_asset: Option<String>,
}

/// Failure of one API call, before it is mapped onto [`TradeError`].
#[derive(Debug)]
enum ApiFailure {
    /// The exchange answered with an error body.
    Api { code: i64, msg: String },
    Transport(TradeError),
}

impl From<reqwest::Error> for ApiFailure {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(TradeError::Http(e))
    }
}

impl From<ApiFailure> for TradeError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Api { code, msg } => TradeError::Exchange(format!("{}: {}", code, msg)),
            ApiFailure::Transport(e) => e,
        }
    }
}

fn parse_num(field: &str, raw: &str) -> Result<f64, TradeError> {
    raw.parse::<f64>()
        .map_err(|e| TradeError::Exchange(format!("invalid {} {:?}: {}", field, raw, e)))
}

impl TryFrom<SymbolBody> for SymbolInfo {
    type Error = TradeError;

    fn try_from(body: SymbolBody) -> Result<Self, Self::Error> {
        let lot = body.filters.iter().find(|f| f.filter_type == "LOT_SIZE");
        let step_size = match lot.and_then(|f| f.step_size.as_deref()) {
            Some(raw) => parse_num("stepSize", raw)?,
            None => 0.0,
        };
        let min_qty = match lot.and_then(|f| f.min_qty.as_deref()) {
            Some(raw) => parse_num("minQty", raw)?,
            None => 0.0,
        };

        Ok(Self {
            symbol: body.symbol,
            base_asset: body.base_asset,
            quote_asset: body.quote_asset,
            status: body.status,
            step_size,
            min_qty,
        })
    }
}

impl TryFrom<OrderBody> for OrderReport {
    type Error = TradeError;

    fn try_from(body: OrderBody) -> Result<Self, Self::Error> {
        let side = match body.side.as_str() {
            "BUY" => Side::Buy,
            "SELL" => Side::Sell,
            other => return Err(TradeError::Exchange(format!("unknown order side {}", other))),
        };

        let fills = body
            .fills
            .into_iter()
            .map(|f| -> Result<Fill, TradeError> {
                Ok(Fill {
                    price: parse_num("fill price", &f.price)?,
                    qty: parse_num("fill qty", &f.qty)?,
                    commission: match f.commission.as_deref() {
                        Some(raw) => parse_num("commission", raw)?,
                        None => 0.0,
                    },
                    commission_asset: f.commission_asset.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            symbol: body.symbol,
            order_id: body.order_id,
            side,
            status: OrderStatus::parse(&body.status),
            executed_qty: parse_num("executedQty", &body.executed_qty)?,
            cummulative_quote_qty: parse_num("cummulativeQuoteQty", &body.cummulative_quote_qty)?,
            transact_time: body.transact_time,
            fills,
        })
    }
}

/// HMAC-SHA256 of `payload`, hex encoded.
pub fn sign(secret: &str, payload: &str) -> Result<String, TradeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| TradeError::Configuration(format!("invalid secret key: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(mac
        .finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect())
}

/// Query string for a market order, without `recvWindow`/`timestamp`.
pub fn market_order_query(symbol: &str, side: Side, size: OrderSize) -> String {
    let sizing = match size {
        OrderSize::Quote(amount) => format!("quoteOrderQty={}", amount),
        OrderSize::Base(qty) => format!("quantity={}", qty),
    };
    format!(
        "symbol={}&side={}&type=MARKET&{}&newOrderRespType=FULL",
        symbol,
        side.as_str(),
        sizing
    )
}

#[derive(Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
    credentials: Option<Credentials>,
    recv_window_ms: u64,
}

impl BinanceClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
        recv_window_ms: u64,
    ) -> Result<Self, TradeError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            recv_window_ms,
        })
    }

    /// Client restricted to public market-data endpoints.
    pub fn public(base_url: impl Into<String>) -> Result<Self, TradeError> {
        Self::new(base_url, None, 5_000)
    }

    async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, ApiFailure> {
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| ApiFailure::Transport(e.into()));
        }
        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err) => Err(ApiFailure::Api {
                code: err.code,
                msg: err.msg,
            }),
            Err(_) => Err(ApiFailure::Transport(TradeError::Exchange(format!(
                "HTTP {}: {}",
                status, body
            )))),
        }
    }

    async fn public_get<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<T, ApiFailure> {
        let url = if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        };
        let resp = self.http.get(&url).send().await?;
        Self::read(resp).await
    }

    async fn signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &str,
    ) -> Result<T, ApiFailure> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            ApiFailure::Transport(TradeError::Configuration(
                "API keys are required for account endpoints".into(),
            ))
        })?;

        let timestamp = chrono::Utc::now().timestamp_millis();
        let mut query = if params.is_empty() {
            String::new()
        } else {
            format!("{}&", params)
        };
        query.push_str(&format!("recvWindow={}&timestamp={}", self.recv_window_ms, timestamp));
        let signature = sign(&credentials.secret_key, &query).map_err(ApiFailure::Transport)?;

        let url = format!("{}{}?{}&signature={}", self.base_url, path, query, signature);
        let resp = self
            .http
            .request(method, &url)
            .header("X-MBX-APIKEY", &credentials.api_key)
            .send()
            .await?;
        Self::read(resp).await
    }
}

#[async_trait]
impl MarketData for BinanceClient {
    #[instrument(skip(self), level = "debug")]
    async fn get_symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>, TradeError> {
        let query = format!("symbol={}", symbol);
        let info: ExchangeInfoBody = match self.public_get("/api/v3/exchangeInfo", &query).await {
            Ok(info) => info,
            Err(ApiFailure::Api { code: INVALID_SYMBOL, .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        info.symbols
            .into_iter()
            .find(|s| s.symbol == symbol)
            .map(SymbolInfo::try_from)
            .transpose()
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_symbols(&self, quote_asset: &str) -> Result<Vec<SymbolInfo>, TradeError> {
        let info: ExchangeInfoBody = self.public_get("/api/v3/exchangeInfo", "").await?;
        let symbols = info
            .symbols
            .into_iter()
            .filter(|s| s.quote_asset == quote_asset)
            .map(SymbolInfo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = symbols.len(), "binance symbols listed");
        Ok(symbols)
    }

    async fn get_ticker(&self, symbol: &str) -> Result<f64, TradeError> {
        let query = format!("symbol={}", symbol);
        let ticker: TickerPriceBody = self.public_get("/api/v3/ticker/price", &query).await?;
        parse_num("price", &ticker.price)
    }
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    async fn get_balance(&self, asset: &str) -> Result<f64, TradeError> {
        let account: AccountBody = self.signed(Method::GET, "/api/v3/account", "").await?;
        match account.balances.iter().find(|b| b.asset == asset) {
            Some(balance) => parse_num("free balance", &balance.free),
            None => Ok(0.0),
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        size: OrderSize,
    ) -> Result<OrderReport, TradeError> {
        let params = market_order_query(symbol, side, size);
        let body: OrderBody = match self.signed(Method::POST, "/api/v3/order", &params).await {
            Ok(body) => body,
            Err(ApiFailure::Api { code, msg }) => {
                return Err(TradeError::OrderRejected(format!("{}: {}", code, msg)))
            }
            Err(ApiFailure::Transport(e)) => return Err(e),
        };
        OrderReport::try_from(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_published_example() {
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            sign(secret, query).unwrap(),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn market_order_query_uses_size_kind() {
        assert_eq!(
            market_order_query("XYZBTC", Side::Buy, OrderSize::Quote(0.01)),
            "symbol=XYZBTC&side=BUY&type=MARKET&quoteOrderQty=0.01&newOrderRespType=FULL"
        );
        assert_eq!(
            market_order_query("XYZBTC", Side::Sell, OrderSize::Base(10.234)),
            "symbol=XYZBTC&side=SELL&type=MARKET&quantity=10.234&newOrderRespType=FULL"
        );
    }

    #[test]
    fn parses_full_order_response() {
        let json = r#"{
            "symbol": "XYZBTC",
            "orderId": 28,
            "orderListId": -1,
            "clientOrderId": "6gCrw2kRUAF9CvJDGP16IP",
            "transactTime": 1507725176595,
            "price": "0.00000000",
            "origQty": "10.00000000",
            "executedQty": "10.00000000",
            "cummulativeQuoteQty": "0.00030000",
            "status": "FILLED",
            "timeInForce": "GTC",
            "type": "MARKET",
            "side": "BUY",
            "fills": [
                {"price": "0.00002000", "qty": "5.00000000", "commission": "0.005", "commissionAsset": "XYZ", "tradeId": 56},
                {"price": "0.00004000", "qty": "5.00000000", "commission": "0.005", "commissionAsset": "XYZ", "tradeId": 57}
            ]
        }"#;
        let body: OrderBody = serde_json::from_str(json).unwrap();
        let report = OrderReport::try_from(body).unwrap();

        assert!(report.is_filled());
        assert_eq!(report.side, Side::Buy);
        assert_eq!(report.order_id, 28);
        assert_eq!(report.executed_qty, 10.0);
        assert_eq!(report.fills.len(), 2);
        assert_eq!(report.fills[1].price, 0.00004);
        assert_eq!(report.fills[0].commission_asset, "XYZ");
    }

    #[test]
    fn unfilled_status_is_preserved() {
        let json = r#"{"symbol":"XYZBTC","orderId":1,"transactTime":1,"executedQty":"0","cummulativeQuoteQty":"0","status":"EXPIRED","side":"SELL"}"#;
        let report = OrderReport::try_from(serde_json::from_str::<OrderBody>(json).unwrap()).unwrap();
        assert_eq!(report.status, OrderStatus::Expired);
        assert!(report.fills.is_empty());
    }

    #[test]
    fn symbol_info_reads_lot_size_filter() {
        let json = r#"{
            "symbol": "XYZBTC",
            "status": "TRADING",
            "baseAsset": "XYZ",
            "quoteAsset": "BTC",
            "filters": [
                {"filterType": "PRICE_FILTER", "minPrice": "0.00000001", "maxPrice": "1000.0", "tickSize": "0.00000001"},
                {"filterType": "PERCENT_PRICE", "multiplierUp": "5", "multiplierDown": "0.2", "avgPriceMins": 5},
                {"filterType": "LOT_SIZE", "minQty": "0.00100000", "maxQty": "900000.0", "stepSize": "0.00100000"}
            ]
        }"#;
        let info = SymbolInfo::try_from(serde_json::from_str::<SymbolBody>(json).unwrap()).unwrap();
        assert_eq!(info.step_size, 0.001);
        assert_eq!(info.min_qty, 0.001);
        assert!(info.is_trading());
    }
}
