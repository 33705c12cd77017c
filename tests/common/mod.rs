//! Shared fixtures for the pricewatch integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use pricewatch::{HistoryStore, PriceObservation};
use rust_decimal::Decimal;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn ts(s: &str) -> DateTime<Utc> {
    pricewatch::normalize::parse_timestamp(s).unwrap()
}

pub fn obs(name: &str, price: &str, at: &str) -> PriceObservation {
    PriceObservation::new(name, dec(price), ts(at)).unwrap()
}

/// Path to a not-yet-created history file inside a fresh temp directory.
///
/// The caller must keep the `TempDir` alive for the duration of the test.
pub fn history_path() -> (PathBuf, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("data").join("price_history.csv");
    (path, tmp_dir)
}

pub fn empty_store() -> (HistoryStore, tempfile::TempDir) {
    let (path, tmp_dir) = history_path();
    (HistoryStore::open(path).unwrap(), tmp_dir)
}

/// The Widget history: 10.00, 12.00, 9.00 on consecutive days.
pub fn widget_history() -> Vec<PriceObservation> {
    vec![
        obs("Widget", "10.00", "2024-03-01"),
        obs("Widget", "12.00", "2024-03-02"),
        obs("Widget", "9.00", "2024-03-03"),
    ]
}

/// Sort key for order-insensitive comparison of observation sets.
pub fn sorted(mut observations: Vec<PriceObservation>) -> Vec<PriceObservation> {
    observations.sort_by(|a, b| {
        (a.product_name(), a.observed_at(), a.price(), a.source_url())
            .cmp(&(b.product_name(), b.observed_at(), b.price(), b.source_url()))
    });
    observations
}
