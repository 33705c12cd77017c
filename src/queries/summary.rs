//! Per-product summary statistics.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{PricewatchError, Result};
use crate::models::{PriceObservation, ProductSummary};
use crate::ordering::{chronological, group_chronologically};

/// Summary for one requested product, or the reason it has none.
pub type SummaryOutcome = Result<ProductSummary>;

/// Summarize one product's history.
///
/// Fails with [`PricewatchError::EmptyHistory`] when the product has no
/// observations, and with [`PricewatchError::Overflow`] when its prices are
/// too large to aggregate. `change_pct` is zero when the first price is zero.
pub fn summarize(history: &[PriceObservation], product_name: &str) -> Result<ProductSummary> {
    let observations = chronological(history, product_name);
    summarize_sorted(product_name.trim(), &observations)
}

/// Summaries for every product present in `history`.
///
/// A product whose summary fails is logged and left out; the others are
/// still computed.
pub fn summarize_all(history: &[PriceObservation]) -> BTreeMap<String, ProductSummary> {
    let mut summaries = BTreeMap::new();
    for (name, observations) in group_chronologically(history) {
        match summarize_sorted(name, &observations) {
            Ok(summary) => {
                summaries.insert(name.to_string(), summary);
            }
            Err(e) => tracing::warn!("No summary for '{}': {}", name, e),
        }
    }
    summaries
}

/// Summaries for an explicit product list, keeping failures per product so
/// a caller can report "no data" instead of aborting.
pub fn summarize_products<S: AsRef<str>>(
    history: &[PriceObservation],
    product_names: &[S],
) -> BTreeMap<String, SummaryOutcome> {
    product_names
        .iter()
        .map(|name| {
            let name = name.as_ref().trim();
            (name.to_string(), summarize(history, name))
        })
        .collect()
}

fn summarize_sorted(product_name: &str, observations: &[&PriceObservation]) -> Result<ProductSummary> {
    let (first, last) = match (observations.first(), observations.last()) {
        (Some(first), Some(last)) => (first.price(), last.price()),
        _ => return Err(PricewatchError::EmptyHistory(product_name.to_string())),
    };

    let mut min_price = first;
    let mut max_price = first;
    let mut total = Decimal::ZERO;
    for observation in observations {
        let price = observation.price();
        min_price = min_price.min(price);
        max_price = max_price.max(price);
        total = total
            .checked_add(price)
            .ok_or_else(|| overflow(product_name, "sum of prices"))?;
    }

    let record_count = observations.len();
    let change_abs = last - first;
    let change_pct = if first.is_zero() {
        Decimal::ZERO
    } else {
        change_abs
            .checked_div(first)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| overflow(product_name, "percentage change"))?
    };
    let avg_price = total
        .checked_div(Decimal::from(record_count))
        .ok_or_else(|| overflow(product_name, "average price"))?;

    Ok(ProductSummary {
        product_name: product_name.to_string(),
        current_price: last,
        min_price,
        max_price,
        avg_price,
        change_abs,
        change_pct,
        record_count,
    })
}

fn overflow(product_name: &str, quantity: &str) -> PricewatchError {
    PricewatchError::Overflow(format!("{} for '{}' exceeds decimal range", quantity, product_name))
}
