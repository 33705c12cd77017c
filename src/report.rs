//! Presentation payloads: a printable summary table and chart data.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;
use crate::models::{to_fixed, PriceObservation, ProductSummary, Snapshot, TimeSeries};
use crate::queries::{build_all_series, build_snapshot, ranked_snapshot, summarize_products};

pub const NO_DATA: &str = "no data";

const TABLE_HEADERS: [&str; 8] = [
    "Product",
    "Current Price",
    "Min Price",
    "Max Price",
    "Avg Price",
    "Price Change",
    "Change %",
    "Records",
];

// ---------------------------------------------------------------------------
// SummaryRow — formatted statistics for one product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub product: String,
    pub current_price: String,
    pub min_price: String,
    pub max_price: String,
    pub avg_price: String,
    pub price_change: String,
    pub change_pct: String,
    pub records: usize,
}

impl From<&ProductSummary> for SummaryRow {
    fn from(s: &ProductSummary) -> Self {
        Self {
            product: s.product_name.clone(),
            current_price: money(s.current_price),
            min_price: money(s.min_price),
            max_price: money(s.max_price),
            avg_price: money(s.avg_price),
            price_change: format!("${}", signed(s.change_abs)),
            change_pct: format!("{}%", signed(s.change_pct)),
            records: s.record_count,
        }
    }
}

impl SummaryRow {
    /// Row for a product that could not be summarized.
    pub fn no_data(product: &str) -> Self {
        Self {
            product: product.to_string(),
            current_price: NO_DATA.to_string(),
            min_price: "-".to_string(),
            max_price: "-".to_string(),
            avg_price: "-".to_string(),
            price_change: "-".to_string(),
            change_pct: "-".to_string(),
            records: 0,
        }
    }

    fn cells(&self) -> [String; 8] {
        [
            self.product.clone(),
            self.current_price.clone(),
            self.min_price.clone(),
            self.max_price.clone(),
            self.avg_price.clone(),
            self.price_change.clone(),
            self.change_pct.clone(),
            self.records.to_string(),
        ]
    }
}

/// `$12.50`
pub fn money(value: Decimal) -> String {
    format!("${}", to_fixed(value))
}

/// `+1.50` / `-1.50`, rounded to two digits.
pub fn signed(value: Decimal) -> String {
    let fixed = to_fixed(value);
    if fixed.is_sign_negative() {
        format!("-{}", fixed.abs())
    } else {
        format!("+{}", fixed)
    }
}

/// One row per product in `history`, plus a "no data" row for each name in
/// `tracked` that has no observations.
pub fn summary_rows<S: AsRef<str>>(history: &[PriceObservation], tracked: &[S]) -> Vec<SummaryRow> {
    let names: Vec<String> = history
        .iter()
        .map(|o| o.product_name().to_string())
        .chain(tracked.iter().map(|n| n.as_ref().trim().to_string()))
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    summarize_products(history, &names)
        .into_iter()
        .map(|(name, outcome)| match outcome {
            Ok(summary) => SummaryRow::from(&summary),
            Err(e) => {
                tracing::warn!("Reporting '{}' as no data: {}", name, e);
                SummaryRow::no_data(&name)
            }
        })
        .collect()
}

/// Render rows as an aligned plain-text table.
pub fn render_summary_table(rows: &[SummaryRow]) -> String {
    let cells: Vec<[String; 8]> = rows.iter().map(SummaryRow::cells).collect();

    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |line: Vec<&str>| -> String {
        line.iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == 0 {
                    format!("{:<width$}", cell, width = widths[i])
                } else {
                    format!("{:>width$}", cell, width = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![format_line(TABLE_HEADERS.to_vec())];
    for row in &cells {
        out.push(format_line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

// ---------------------------------------------------------------------------
// ChartData — series, snapshot and comparison for a chart renderer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonBar {
    pub product_name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    /// Per-product trend lines.
    pub series: BTreeMap<String, TimeSeries>,
    /// Latest price per product.
    pub snapshot: Snapshot,
    /// Latest prices, highest first.
    pub comparison: Vec<ComparisonBar>,
}

impl ChartData {
    pub fn from_history(history: &[PriceObservation]) -> Self {
        Self {
            series: build_all_series(history),
            snapshot: build_snapshot(history),
            comparison: ranked_snapshot(history)
                .into_iter()
                .map(|(product_name, price)| ComparisonBar { product_name, price })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Everything the presentation layer needs from one history snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub summary: Vec<SummaryRow>,
    pub charts: ChartData,
}

impl Report {
    pub fn from_history<S: AsRef<str>>(history: &[PriceObservation], tracked: &[S]) -> Self {
        Self {
            summary: summary_rows(history, tracked),
            charts: ChartData::from_history(history),
        }
    }

    pub fn summary_table(&self) -> String {
        render_summary_table(&self.summary)
    }
}
