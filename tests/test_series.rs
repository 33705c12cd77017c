//! Series builder tests: chart series and the latest-price snapshot.

mod common;

use common::{dec, obs, ts, widget_history};
use pricewatch::queries::{build_all_series, build_series, build_snapshot, ranked_snapshot, summarize};

#[test]
fn series_is_sorted_ascending() {
    let history = vec![
        obs("Widget", "9.00", "2024-03-03"),
        obs("Widget", "10.00", "2024-03-01"),
        obs("Gadget", "1.00", "2024-03-01"),
        obs("Widget", "12.00", "2024-03-02"),
    ];
    let series = build_series(&history, "Widget");

    assert_eq!(series.product_name, "Widget");
    assert_eq!(series.len(), 3);
    let prices: Vec<_> = series.points.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![dec("10.00"), dec("12.00"), dec("9.00")]);
    assert_eq!(series.points[0].observed_at, ts("2024-03-01"));
}

#[test]
fn ties_keep_insertion_order() {
    let history = vec![
        obs("Widget", "1.00", "2024-03-02"),
        obs("Widget", "2.00", "2024-03-01"),
        obs("Widget", "3.00", "2024-03-02"),
    ];
    let prices: Vec<_> = build_series(&history, "Widget")
        .points
        .iter()
        .map(|p| p.price)
        .collect();
    assert_eq!(prices, vec![dec("2.00"), dec("1.00"), dec("3.00")]);
}

#[test]
fn unknown_product_gives_empty_series() {
    let series = build_series(&widget_history(), "Gadget");
    assert!(series.is_empty());
    assert_eq!(series.product_name, "Gadget");
    assert!(series.min_point().is_none());
    assert!(build_series(&[], "Widget").is_empty());
}

#[test]
fn min_and_max_points() {
    let series = build_series(&widget_history(), "Widget");
    let min = series.min_point().unwrap();
    let max = series.max_point().unwrap();
    assert_eq!(min.price, dec("9.00"));
    assert_eq!(min.observed_at, ts("2024-03-03"));
    assert_eq!(max.price, dec("12.00"));
    assert_eq!(max.observed_at, ts("2024-03-02"));
}

#[test]
fn all_series_has_one_entry_per_product() {
    let mut history = widget_history();
    history.push(obs("Gadget", "5.00", "2024-03-01"));
    let all = build_all_series(&history);
    assert_eq!(all.len(), 2);
    assert_eq!(all["Widget"].len(), 3);
    assert_eq!(all["Gadget"].len(), 1);
}

#[test]
fn snapshot_matches_summary_current_price() {
    let history = vec![
        obs("Widget", "10.00", "2024-03-01"),
        obs("Gadget", "7.00", "2024-03-05"),
        obs("Widget", "11.00", "2024-03-04"),
        obs("Gadget", "8.00", "2024-03-02"),
        obs("Widget", "13.00", "2024-03-04"),
    ];
    let snapshot = build_snapshot(&history);

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["Widget"], dec("13.00"));
    assert_eq!(snapshot["Gadget"], dec("7.00"));
    for (name, price) in &snapshot {
        assert_eq!(summarize(&history, name).unwrap().current_price, *price);
    }
    assert!(build_snapshot(&[]).is_empty());
}

#[test]
fn ranked_snapshot_is_highest_first() {
    let history = vec![
        obs("Mouse", "29.99", "2024-03-01"),
        obs("Laptop", "899.99", "2024-03-01"),
        obs("Hub", "49.99", "2024-03-01"),
    ];
    let names: Vec<String> = ranked_snapshot(&history).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["Laptop", "Hub", "Mouse"]);
}
