//! Ingress boundary: loosely-typed producer records to [`PriceObservation`].
//!
//! Every record coming from a producer passes through [`normalize`] before it
//! can reach the history store. Accepted keys are `product_name`, `price`,
//! `observed_at` and `source_url`, plus the legacy scraper keys `title`,
//! `timestamp` and `url`.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::{PricewatchError, Result};
use crate::models::{to_fixed, PriceObservation};

/// A raw producer record.
pub type RawObservation = Map<String, Value>;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Normalize a raw record, stamping it with the current time if it has none.
pub fn normalize(raw: &RawObservation) -> Result<PriceObservation> {
    normalize_at(raw, Utc::now())
}

/// Normalize a raw record, using `ingested_at` when no timestamp is supplied.
pub fn normalize_at(raw: &RawObservation, ingested_at: DateTime<Utc>) -> Result<PriceObservation> {
    let product_name = match field(raw, "product_name", "title") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.trim(),
        Some(Value::String(_)) => return Err(invalid("product_name must not be empty")),
        Some(other) => {
            return Err(invalid(format!("product_name must be a string, got {}", other)))
        }
        None => return Err(invalid("missing product_name")),
    };

    let price = match raw.get("price") {
        Some(Value::String(text)) => parse_price(text)?,
        Some(Value::Number(n)) => parse_amount(&n.to_string())?,
        Some(Value::Null) | None => {
            return Err(invalid(format!("missing price for '{}'", product_name)))
        }
        Some(other) => return Err(invalid(format!("price must be a string or number, got {}", other))),
    };

    let observed_at = match field(raw, "observed_at", "timestamp") {
        None | Some(Value::Null) => ingested_at,
        Some(Value::String(text)) if text.trim().is_empty() => ingested_at,
        Some(Value::String(text)) => parse_timestamp(text)?,
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| invalid(format!("invalid unix timestamp: {}", n)))?,
        Some(other) => return Err(invalid(format!("unsupported timestamp value: {}", other))),
    };

    let observation = PriceObservation::new(product_name, price, observed_at)?;
    match field(raw, "source_url", "url") {
        Some(Value::String(url)) => Ok(observation.with_source_url(url.as_str())),
        _ => Ok(observation),
    }
}

/// Parse scraped price text such as `"$1,299.00"` or `"EUR 12.5"`.
///
/// Currency symbols, labels and thousands separators are ignored; the first
/// numeric run is the amount. A minus sign or opening parenthesis before the
/// amount marks it negative, which is rejected.
pub fn parse_price(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    let start = trimmed
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| invalid(format!("no numeric price in '{}'", text)))?;
    let start = if trimmed[..start].ends_with('.') { start - 1 } else { start };

    let prefix = &trimmed[..start];
    let negative = prefix.contains('-') || prefix.contains('(');

    let token: String = trimmed[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();
    let token = token.trim_end_matches('.');
    let token = if token.starts_with('.') {
        format!("0{}", token)
    } else {
        token.to_string()
    };

    let value = Decimal::from_str(&token)
        .map_err(|e| invalid(format!("invalid price '{}': {}", text, e)))?;
    if negative && !value.is_zero() {
        return Err(invalid(format!("price must not be negative: '{}'", text)));
    }
    Ok(to_fixed(value))
}

/// Parse a plain decimal amount (no currency decoration), rejecting negatives.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let text = text.trim();
    let value = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| invalid(format!("invalid price '{}': {}", text, e)))?;
    if value < Decimal::ZERO {
        return Err(invalid(format!("price must not be negative: '{}'", text)));
    }
    Ok(to_fixed(value))
}

/// Parse an ISO-8601-like timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| invalid(format!("invalid timestamp '{}'", text)))
}

fn field<'a>(raw: &'a RawObservation, key: &str, legacy: &str) -> Option<&'a Value> {
    raw.get(key).or_else(|| raw.get(legacy))
}

fn invalid(message: impl Into<String>) -> PricewatchError {
    PricewatchError::Validation(message.into())
}
