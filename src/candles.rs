// src/candles.rs
// Binance futures klines passthrough. The upstream returns an array of
// heterogeneous arrays with most numbers encoded as strings; each row is
// coerced into a typed candle record.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}
fn default_interval() -> String {
    "1d".to_string()
}
fn default_limit() -> u32 {
    500
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandleQuery {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,
    pub quote_asset_volume: f64,
    pub number_of_trades: u64,
}

/// GET the kline series and coerce every row. Transport failure and
/// non-2xx surface as `Upstream`; a malformed body or row as `Decode`.
/// Either way the whole request fails.
pub async fn fetch_candles(
    http: &reqwest::Client,
    base_url: &str,
    query: &CandleQuery,
) -> std::result::Result<Vec<Candle>, AppError> {
    let resp = klines_request(http, base_url, query)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to fetch data from Binance: {e}")))?
        .error_for_status()
        .map_err(|e| AppError::Upstream(format!("Failed to fetch data from Binance: {e}")))?;

    let rows: Vec<Vec<Value>> = resp
        .json()
        .await
        .map_err(|e| AppError::Decode(format!("Failed to decode Binance klines: {e}")))?;

    candles_from_rows(&rows)
}

/// Query parameters go through `.query` so a hostile `symbol` value is
/// percent-encoded instead of smuggling extra parameters.
fn klines_request(
    http: &reqwest::Client,
    base_url: &str,
    query: &CandleQuery,
) -> reqwest::RequestBuilder {
    let limit = query.limit.to_string();
    http.get(format!("{base_url}/fapi/v1/klines")).query(&[
        ("symbol", query.symbol.as_str()),
        ("interval", query.interval.as_str()),
        ("limit", limit.as_str()),
    ])
}

pub fn candles_from_rows(rows: &[Vec<Value>]) -> std::result::Result<Vec<Candle>, AppError> {
    rows.iter()
        .map(|row| {
            candle_from_row(row)
                .map_err(|e| AppError::Decode(format!("Failed to decode Binance klines: {e:#}")))
        })
        .collect()
}

/// One upstream row is `[open_time, open, high, low, close, volume,
/// close_time, quote_asset_volume, number_of_trades, ...]`; numeric
/// strings become floats or integers per field.
pub fn candle_from_row(row: &[Value]) -> Result<Candle> {
    if row.len() < 9 {
        return Err(anyhow!("kline row has {} fields, expected at least 9", row.len()));
    }
    Ok(Candle {
        open_time: as_i64(&row[0]).context("open_time")?,
        open: as_f64(&row[1]).context("open")?,
        high: as_f64(&row[2]).context("high")?,
        low: as_f64(&row[3]).context("low")?,
        close: as_f64(&row[4]).context("close")?,
        volume: as_f64(&row[5]).context("volume")?,
        close_time: as_i64(&row[6]).context("close_time")?,
        quote_asset_volume: as_f64(&row[7]).context("quote_asset_volume")?,
        number_of_trades: as_u64(&row[8]).context("number_of_trades")?,
    })
}

fn as_f64(v: &Value) -> Result<f64> {
    match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| anyhow!("number out of range")),
        Value::String(s) => s.parse::<f64>().map_err(|e| anyhow!("'{s}': {e}")),
        other => Err(anyhow!("expected number, got {other}")),
    }
}

fn as_i64(v: &Value) -> Result<i64> {
    match v {
        Value::Number(n) => n.as_i64().ok_or_else(|| anyhow!("number out of range")),
        Value::String(s) => s.parse::<i64>().map_err(|e| anyhow!("'{s}': {e}")),
        other => Err(anyhow!("expected number, got {other}")),
    }
}

fn as_u64(v: &Value) -> Result<u64> {
    match v {
        Value::Number(n) => n.as_u64().ok_or_else(|| anyhow!("number out of range")),
        Value::String(s) => s.parse::<u64>().map_err(|e| anyhow!("'{s}': {e}")),
        other => Err(anyhow!("expected number, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_with_string_numerics_is_coerced() {
        let row = json!([
            1700000000000i64,
            "42000.10",
            "42500.00",
            "41800.55",
            "42100.00",
            "1234.5",
            1700003599999i64,
            "51900000.75",
            98765,
            "ignored",
            "ignored",
            "0"
        ]);
        let candle = candle_from_row(row.as_array().unwrap()).unwrap();
        assert_eq!(candle.open_time, 1700000000000);
        assert_eq!(candle.close, 42100.0);
        assert_eq!(candle.quote_asset_volume, 51900000.75);
        assert_eq!(candle.number_of_trades, 98765);
    }

    #[test]
    fn short_row_is_rejected() {
        let row = json!([1, "2", "3"]);
        assert!(candle_from_row(row.as_array().unwrap()).is_err());
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let row = json!([1, "abc", "3", "4", "5", "6", 7, "8", 9]);
        let err = candle_from_row(row.as_array().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("open"));
    }

    #[test]
    fn malformed_row_reports_a_decode_error() {
        let rows = vec![vec![json!(1), json!("abc")]];
        let err = candles_from_rows(&rows).unwrap_err();
        assert!(matches!(err, AppError::Decode(_)), "got: {err:?}");
    }

    #[test]
    fn hostile_symbol_stays_a_single_encoded_parameter() {
        let http = reqwest::Client::new();
        let query = CandleQuery {
            symbol: "BTC&limit=1".to_string(),
            interval: "1d".to_string(),
            limit: 500,
        };
        let req = klines_request(&http, "http://host.example", &query)
            .build()
            .unwrap();
        let pairs: Vec<(String, String)> = req
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("symbol".to_string(), "BTC&limit=1".to_string()),
                ("interval".to_string(), "1d".to_string()),
                ("limit".to_string(), "500".to_string()),
            ]
        );
    }

    #[test]
    fn close_serializes_as_a_json_number() {
        let candle = Candle {
            open_time: 1,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
            close_time: 2,
            quote_asset_volume: 15.0,
            number_of_trades: 3,
        };
        let v = serde_json::to_value(&candle).unwrap();
        assert!(v["close"].is_f64());
    }
}
