use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Latest price per product, keyed by product name.
pub type Snapshot = BTreeMap<String, Decimal>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub observed_at: DateTime<Utc>,
    pub price: Decimal,
}

// ---------------------------------------------------------------------------
// TimeSeries — chronological (time, price) points for one product
// ---------------------------------------------------------------------------

/// Points sorted ascending by time; equal timestamps keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    pub product_name: String,
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Earliest point holding the lowest price.
    pub fn min_point(&self) -> Option<&SeriesPoint> {
        self.points
            .iter()
            .fold(None, |best: Option<&SeriesPoint>, p| match best {
                Some(b) if b.price <= p.price => Some(b),
                _ => Some(p),
            })
    }

    /// Earliest point holding the highest price.
    pub fn max_point(&self) -> Option<&SeriesPoint> {
        self.points
            .iter()
            .fold(None, |best: Option<&SeriesPoint>, p| match best {
                Some(b) if b.price >= p.price => Some(b),
                _ => Some(p),
            })
    }
}
