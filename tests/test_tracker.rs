//! End-to-end tests through the `PriceTracker` facade.

mod common;

use std::fs;

use common::{dec, history_path};
use pricewatch::producer::{Producer, SyntheticProducer};
use pricewatch::{PriceTracker, ProductTarget, RawObservation, Result, TrackerConfig};
use serde_json::json;

fn raw(value: serde_json::Value) -> RawObservation {
    value.as_object().unwrap().clone()
}

fn tracker() -> (PriceTracker, tempfile::TempDir) {
    let (path, tmp) = history_path();
    (PriceTracker::builder().history_file(path).build().unwrap(), tmp)
}

struct FixedProducer(Vec<RawObservation>);

impl Producer for FixedProducer {
    fn produce(&mut self) -> Result<Vec<RawObservation>> {
        Ok(self.0.clone())
    }
}

#[test]
fn ingest_then_summarize() {
    let (mut tracker, _tmp) = tracker();
    for (price, at) in [("$10.00", "2024-03-01"), ("$12.00", "2024-03-02"), ("$9.00", "2024-03-03")] {
        tracker
            .ingest(&raw(json!({"product_name": "Widget", "price": price, "observed_at": at})))
            .unwrap();
    }

    let s = tracker.summary("Widget").unwrap();
    assert_eq!(s.current_price, dec("9.00"));
    assert_eq!(s.avg_price_rounded(), dec("10.33"));
    assert_eq!(s.change_pct_rounded(), dec("-10.00"));
    assert_eq!(tracker.series("Widget").unwrap().len(), 3);
    assert_eq!(tracker.snapshot().unwrap()["Widget"], dec("9.00"));
}

#[test]
fn invalid_ingest_stores_nothing() {
    let (mut tracker, _tmp) = tracker();
    let err = tracker
        .ingest(&raw(json!({"product_name": "Widget", "price": "-5.00"})))
        .unwrap_err();
    assert!(err.is_validation());
    assert!(tracker.history().unwrap().is_empty());
}

#[test]
fn batch_rejects_individual_records_only() {
    let (mut tracker, _tmp) = tracker();
    let report = tracker
        .ingest_batch(&[
            raw(json!({"product_name": "Widget", "price": "10.00", "observed_at": "2024-03-01"})),
            raw(json!({"product_name": "Widget", "price": "oops"})),
            raw(json!({"price": "3.00"})),
            raw(json!({"product_name": "Gadget", "price": 4, "observed_at": "2024-03-01"})),
        ])
        .unwrap();

    assert_eq!(report.stored.len(), 2);
    let rejected: Vec<usize> = report.rejected.iter().map(|r| r.index).collect();
    assert_eq!(rejected, vec![1, 2]);
    assert_eq!(tracker.history().unwrap(), report.stored);
}

#[test]
fn collect_from_producer() {
    let (mut tracker, _tmp) = tracker();
    let mut producer = FixedProducer(vec![
        raw(json!({"product_name": "Widget", "price": "10.00", "observed_at": "2024-03-01"})),
        raw(json!({"product_name": "Widget", "price": "11.00", "observed_at": "2024-03-02"})),
    ]);
    let report = tracker.collect(&mut producer).unwrap();
    assert_eq!(report.stored.len(), 2);
    assert!(report.rejected.is_empty());
    assert_eq!(tracker.summaries().unwrap()["Widget"].record_count, 2);
}

#[test]
fn synthetic_demo_run() {
    let (mut tracker, _tmp) = tracker();
    let report = tracker
        .collect(&mut SyntheticProducer::new().seed(42).days(30))
        .unwrap();
    assert_eq!(report.stored.len(), 150);

    let summaries = tracker.summaries().unwrap();
    assert_eq!(summaries.len(), 5);
    for summary in summaries.values() {
        assert_eq!(summary.record_count, 30);
        assert!(summary.min_price <= summary.avg_price && summary.avg_price <= summary.max_price);
    }
    assert_eq!(tracker.all_series().unwrap().len(), 5);
}

#[test]
fn corrupt_row_does_not_stop_analytics() {
    let (path, _tmp) = history_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "product_name,price,observed_at,source_url\n\
         Widget,10.00,2024-03-01T00:00:00Z,\n\
         Widget,12.00,2024-03-02T00:00:00Z,\n\
         Widget,twelve,2024-03-02T12:00:00Z,\n\
         Widget,9.00,2024-03-03T00:00:00Z,\n",
    )
    .unwrap();

    let tracker = PriceTracker::builder().history_file(&path).build().unwrap();
    assert_eq!(tracker.history().unwrap().len(), 3);
    assert_eq!(tracker.summary("Widget").unwrap().current_price, dec("9.00"));
}

#[test]
fn report_lists_tracked_products_without_data() {
    let (path, _tmp) = history_path();
    let config = TrackerConfig {
        products: vec![ProductTarget {
            name: "Gadget".to_string(),
            url: "https://example.com/gadget".to_string(),
            price_marker: None,
        }],
        ..TrackerConfig::default()
    };
    let mut tracker = PriceTracker::builder()
        .config(config)
        .history_file(&path)
        .build()
        .unwrap();
    tracker
        .ingest(&raw(json!({"product_name": "Widget", "price": "10.00"})))
        .unwrap();

    let report = tracker.report().unwrap();
    let products: Vec<&str> = report.summary.iter().map(|r| r.product.as_str()).collect();
    assert_eq!(products, vec!["Gadget", "Widget"]);
    assert_eq!(report.summary[0].current_price, "no data");
    assert_eq!(report.summary[1].current_price, "$10.00");
    assert!(!report.charts.snapshot.contains_key("Gadget"));
    assert!(tracker.summary("Gadget").unwrap_err().is_empty_history());
}

#[test]
fn display_names_history_file() {
    let (tracker, _tmp) = tracker();
    let shown = tracker.to_string();
    assert!(shown.starts_with("PriceTracker(history_file="));
    assert!(shown.contains("price_history.csv"));
}
