use rust_decimal::Decimal;
use serde::Serialize;

use super::observation::to_fixed;

// ---------------------------------------------------------------------------
// ProductSummary — aggregate statistics for one product
// ---------------------------------------------------------------------------

/// Statistics derived from a product's full history. Never persisted.
///
/// `avg_price` and `change_pct` keep full precision; use the `_rounded`
/// accessors when displaying them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub product_name: String,
    pub current_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub avg_price: Decimal,
    pub change_abs: Decimal,
    pub change_pct: Decimal,
    pub record_count: usize,
}

impl ProductSummary {
    pub fn avg_price_rounded(&self) -> Decimal {
        to_fixed(self.avg_price)
    }

    pub fn change_pct_rounded(&self) -> Decimal {
        to_fixed(self.change_pct)
    }
}
