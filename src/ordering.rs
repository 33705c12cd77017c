//! The single chronological ordering rule shared by statistics and charts.
//!
//! Observations are ordered ascending by `observed_at`. The sort is stable, so
//! observations with equal timestamps keep their insertion (storage) order and
//! the later-inserted one is treated as the more recent.

use std::collections::BTreeMap;

use crate::models::PriceObservation;

/// Stable ascending sort by observation time.
pub fn sort_chronologically(observations: &mut [&PriceObservation]) {
    observations.sort_by_key(|o| o.observed_at());
}

/// Observations of one product, in chronological order.
pub fn chronological<'a>(
    history: &'a [PriceObservation],
    product_name: &str,
) -> Vec<&'a PriceObservation> {
    let product_name = product_name.trim();
    let mut matching: Vec<&PriceObservation> = history
        .iter()
        .filter(|o| o.product_name() == product_name)
        .collect();
    sort_chronologically(&mut matching);
    matching
}

/// Every product's observations in chronological order, keyed by product name.
pub fn group_chronologically(history: &[PriceObservation]) -> BTreeMap<&str, Vec<&PriceObservation>> {
    let mut groups: BTreeMap<&str, Vec<&PriceObservation>> = BTreeMap::new();
    for observation in history {
        groups
            .entry(observation.product_name())
            .or_default()
            .push(observation);
    }
    for observations in groups.values_mut() {
        sort_chronologically(observations);
    }
    groups
}
