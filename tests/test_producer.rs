//! Producer tests. No network: page extraction runs on inline HTML.

mod common;

use chrono::{Datelike, Timelike};
use common::{dec, ts};
use pricewatch::config::default_price_markers;
use pricewatch::normalize::normalize;
use pricewatch::producer::{extract_price_text, PageProducer, Producer, SyntheticProducer};
use pricewatch::TrackerConfig;

// ---------------------------------------------------------------------------
// SyntheticProducer
// ---------------------------------------------------------------------------

#[test]
fn synthetic_records_normalize() {
    let records = SyntheticProducer::new()
        .seed(1)
        .days(3)
        .ending_at(ts("2024-03-10T08:00:00Z"))
        .produce()
        .unwrap();
    assert_eq!(records.len(), 15);

    let observations: Vec<_> = records.iter().map(|r| normalize(r).unwrap()).collect();
    let first = &observations[0];
    assert_eq!(first.product_name(), "Laptop Computer");
    assert_eq!(first.observed_at(), ts("2024-03-07T12:00:00Z"));
    assert_eq!(first.source_url(), Some("https://example.com/laptop-computer"));

    let last = observations.last().unwrap();
    assert_eq!(last.observed_at().day(), 9);
    assert_eq!(last.observed_at().hour(), 12);
}

#[test]
fn synthetic_prices_stay_within_ten_percent() {
    let records = SyntheticProducer::new()
        .products(vec![("Widget".to_string(), dec("100.00"))])
        .days(60)
        .seed(9)
        .produce()
        .unwrap();
    assert_eq!(records.len(), 60);
    for record in &records {
        let price = normalize(record).unwrap().price();
        assert!(price >= dec("90.00") && price <= dec("110.00"), "{}", price);
    }
}

#[test]
fn synthetic_seed_is_reproducible() {
    let end = ts("2024-03-10");
    let a = SyntheticProducer::new().seed(5).ending_at(end).produce().unwrap();
    let b = SyntheticProducer::new().seed(5).ending_at(end).produce().unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// extract_price_text
// ---------------------------------------------------------------------------

#[test]
fn extracts_element_text() {
    let html = r#"<html><body><h1>Widget</h1><span class="price">$1,299.99</span></body></html>"#;
    assert_eq!(
        extract_price_text(html, &[r#"class="price""#]),
        Some("$1,299.99".to_string())
    );
}

#[test]
fn extracts_attribute_values() {
    let html = r#"<div data-price="49.95" class="buy">Buy now</div>"#;
    assert_eq!(extract_price_text(html, &["data-price"]), Some("49.95".to_string()));

    let html = r#"<meta itemprop="price" content="19.99"><span>ignored</span>"#;
    assert_eq!(
        extract_price_text(html, &[r#"itemprop="price""#]),
        Some("19.99".to_string())
    );
}

#[test]
fn skips_nested_tags_and_non_prices() {
    let html = r#"<p class="price"><b>Sale</b></p><p class="price"><span>$5.00</span></p>"#;
    assert_eq!(
        extract_price_text(html, &[r#"class="price""#]),
        Some("$5.00".to_string())
    );
}

#[test]
fn markers_are_tried_in_order() {
    let html = r#"<span class="price">$10.00</span><span id="priceblock_ourprice">$8.00</span>"#;
    let markers = [r#"id="priceblock_ourprice""#, r#"class="price""#];
    assert_eq!(extract_price_text(html, &markers), Some("$8.00".to_string()));
}

#[test]
fn blank_markers_are_ignored() {
    assert_eq!(extract_price_text("<b>Sale</b>", &[""]), None);

    let html = r#"<span class="price">$7.25</span>"#;
    assert_eq!(
        extract_price_text(html, &["", "   ", r#"class="price""#]),
        Some("$7.25".to_string())
    );
}

#[test]
fn no_price_found() {
    let html = "<html><body><h1>Out of stock</h1></body></html>";
    let markers = default_price_markers();
    let markers: Vec<&str> = markers.iter().map(String::as_str).collect();
    assert_eq!(extract_price_text(html, &markers), None);
}

#[test]
fn page_producer_without_targets_is_empty() {
    let mut producer = PageProducer::new(&TrackerConfig::default()).unwrap();
    assert!(producer.produce().unwrap().is_empty());
}
