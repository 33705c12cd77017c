use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::config::PRICE_SCALE;
use crate::error::{PricewatchError, Result};

// ---------------------------------------------------------------------------
// Fixed-point helpers
// ---------------------------------------------------------------------------

/// Round to the stored price precision and pin the scale, so `12` prints as `12.00`.
pub fn to_fixed(value: Decimal) -> Decimal {
    let mut fixed = value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    fixed.rescale(PRICE_SCALE);
    if fixed.is_zero() {
        fixed.set_sign_positive(true);
    }
    fixed
}

// ---------------------------------------------------------------------------
// PriceObservation — one captured (product, price, time) fact
// ---------------------------------------------------------------------------

/// A validated, immutable price observation.
///
/// Only constructible through [`PriceObservation::new`], which enforces a
/// non-empty product name and a non-negative price. Corrections are recorded
/// as new observations; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PriceObservation {
    product_name: String,
    price: Decimal,
    observed_at: DateTime<Utc>,
    source_url: Option<String>,
}

impl PriceObservation {
    /// Create an observation. The name is trimmed and the price rounded to cents.
    pub fn new(
        product_name: impl Into<String>,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Result<Self> {
        let product_name = product_name.into().trim().to_string();
        check_fields(&product_name, price)?;
        Ok(Self {
            product_name,
            price: to_fixed(price),
            observed_at,
            source_url: None,
        })
    }

    /// Attach provenance. Blank URLs are dropped.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into().trim().to_string();
        self.source_url = if url.is_empty() { None } else { Some(url) };
        self
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Re-check the invariants.
    pub fn validate(&self) -> Result<()> {
        check_fields(&self.product_name, self.price)
    }
}

fn check_fields(product_name: &str, price: Decimal) -> Result<()> {
    if product_name.trim().is_empty() {
        return Err(PricewatchError::Validation(
            "product_name must not be empty".to_string(),
        ));
    }
    if price < Decimal::ZERO {
        return Err(PricewatchError::Validation(format!(
            "price must not be negative for '{}': {}",
            product_name, price
        )));
    }
    Ok(())
}
