//! Chart-ready series and the cross-product snapshot.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{PriceObservation, SeriesPoint, Snapshot, TimeSeries};
use crate::ordering::{chronological, group_chronologically};

/// Chronological series for one product. Empty when the product has no data.
pub fn build_series(history: &[PriceObservation], product_name: &str) -> TimeSeries {
    to_series(product_name.trim(), &chronological(history, product_name))
}

/// Series for every product present in `history`.
pub fn build_all_series(history: &[PriceObservation]) -> BTreeMap<String, TimeSeries> {
    group_chronologically(history)
        .into_iter()
        .map(|(name, observations)| (name.to_string(), to_series(name, &observations)))
        .collect()
}

/// Latest price per product, using the same ordering as `current_price`.
pub fn build_snapshot(history: &[PriceObservation]) -> Snapshot {
    group_chronologically(history)
        .into_iter()
        .filter_map(|(name, observations)| {
            observations
                .last()
                .map(|latest| (name.to_string(), latest.price()))
        })
        .collect()
}

/// Snapshot ordered by price, highest first. Equal prices sort by name.
pub fn ranked_snapshot(history: &[PriceObservation]) -> Vec<(String, Decimal)> {
    let mut ranked: Vec<(String, Decimal)> = build_snapshot(history).into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

fn to_series(product_name: &str, observations: &[&PriceObservation]) -> TimeSeries {
    TimeSeries {
        product_name: product_name.to_string(),
        points: observations
            .iter()
            .map(|o| SeriesPoint {
                observed_at: o.observed_at(),
                price: o.price(),
            })
            .collect(),
    }
}
