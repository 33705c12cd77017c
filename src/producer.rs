//! Observation producers: where raw price records come from.
//!
//! Producers emit loosely-typed [`RawObservation`]s; nothing they return is
//! trusted until it passes [`normalize`](crate::normalize::normalize).
//! Retry and backoff around a producer are the caller's concern.

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::{ProductTarget, TrackerConfig};
use crate::error::Result;
use crate::models::to_fixed;
use crate::normalize::{parse_price, RawObservation};

/// A source of raw price observations.
pub trait Producer {
    fn produce(&mut self) -> Result<Vec<RawObservation>>;
}

fn raw_record(
    product_name: &str,
    price: String,
    observed_at: Option<DateTime<Utc>>,
    source_url: &str,
) -> RawObservation {
    let mut raw = RawObservation::new();
    raw.insert("product_name".into(), Value::String(product_name.to_string()));
    raw.insert("price".into(), Value::String(price));
    if let Some(at) = observed_at {
        raw.insert("observed_at".into(), Value::String(at.to_rfc3339()));
    }
    raw.insert("source_url".into(), Value::String(source_url.to_string()));
    raw
}

// ---------------------------------------------------------------------------
// SyntheticProducer
// ---------------------------------------------------------------------------

/// Demo catalogue: product name and base price in cents.
const DEMO_PRODUCTS: [(&str, i64); 5] = [
    ("Laptop Computer", 89999),
    ("Wireless Mouse", 2999),
    ("Mechanical Keyboard", 8999),
    ("USB-C Hub", 4999),
    ("27\" Monitor", 29999),
];

/// Generates a daily price history that fluctuates up to 10% around a base price.
pub struct SyntheticProducer {
    products: Vec<(String, Decimal)>,
    days: u32,
    end: DateTime<Utc>,
    rng: StdRng,
}

impl Default for SyntheticProducer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticProducer {
    /// Demo catalogue, 30 days ending today.
    pub fn new() -> Self {
        Self {
            products: DEMO_PRODUCTS
                .iter()
                .map(|(name, cents)| (name.to_string(), Decimal::new(*cents, 2)))
                .collect(),
            days: 30,
            end: Utc::now(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the catalogue with `(name, base_price)` pairs.
    pub fn products(mut self, products: Vec<(String, Decimal)>) -> Self {
        self.products = products;
        self
    }

    pub fn days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    /// Day the generated history runs up to (exclusive).
    pub fn ending_at(mut self, end: DateTime<Utc>) -> Self {
        self.end = end;
        self
    }

    /// Make the generated prices reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Producer for SyntheticProducer {
    fn produce(&mut self) -> Result<Vec<RawObservation>> {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
        let mut records = Vec::with_capacity(self.products.len() * self.days as usize);

        for offset in (1..=self.days).rev() {
            let day = (self.end - ChronoDuration::days(i64::from(offset))).date_naive();
            let observed_at = day.and_time(noon).and_utc();

            for (name, base) in &self.products {
                // Basis points in [-1000, 1000], i.e. +/-10%.
                let variation = Decimal::new(self.rng.gen_range(-1000..=1000), 4);
                let price = to_fixed(*base * (Decimal::ONE + variation));
                let slug = name.to_lowercase().replace(' ', "-");
                records.push(raw_record(
                    name,
                    price.to_string(),
                    Some(observed_at),
                    &format!("https://example.com/{}", slug),
                ));
            }
        }

        tracing::info!("Generated {} demo price records", records.len());
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// PageProducer
// ---------------------------------------------------------------------------

/// Fetches configured product pages and pulls the price out of the markup.
///
/// Records carry no timestamp, so they are stamped at ingestion time. Targets
/// that fail to load, or whose page has no recognizable price, are logged and
/// skipped.
pub struct PageProducer {
    client: Client,
    targets: Vec<ProductTarget>,
    price_markers: Vec<String>,
}

impl PageProducer {
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        if let Ok(agent) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            targets: config.products.clone(),
            price_markers: config.price_markers.clone(),
        })
    }

    fn fetch(&self, target: &ProductTarget) -> Result<Option<String>> {
        tracing::debug!("Fetching {}", target.url);
        let body = self
            .client
            .get(&target.url)
            .send()?
            .error_for_status()?
            .text()?;

        let markers: Vec<&str> = target
            .price_marker
            .iter()
            .map(String::as_str)
            .chain(self.price_markers.iter().map(String::as_str))
            .collect();
        Ok(extract_price_text(&body, &markers))
    }
}

impl Producer for PageProducer {
    fn produce(&mut self) -> Result<Vec<RawObservation>> {
        let mut records = Vec::new();
        for target in &self.targets {
            match self.fetch(target) {
                Ok(Some(price_text)) => {
                    records.push(raw_record(&target.name, price_text, None, &target.url));
                }
                Ok(None) => tracing::warn!("No price found on {}", target.url),
                Err(e) => tracing::warn!("Failed to fetch {}: {}", target.url, e),
            }
        }
        Ok(records)
    }
}

/// Locate price text in an HTML page.
///
/// Each marker is a fragment of the price element's opening tag, e.g.
/// `class="price"` or `itemprop="price"`. Markers are tried in order; for a
/// match the price is taken from the marker's own attribute value
/// (`data-price="12.99"`), then a `content` attribute on the same tag, then the
/// element's text. The first candidate that parses as a price wins. Blank
/// markers are ignored.
pub fn extract_price_text(html: &str, markers: &[&str]) -> Option<String> {
    for marker in markers.iter().filter(|m| !m.trim().is_empty()) {
        let mut from = 0;
        while let Some(found) = html[from..].find(marker) {
            let at = from + found;
            from = at + marker.len();
            let tag_end = match html[from..].find('>') {
                Some(end) => from + end,
                None => break,
            };

            let candidates = [
                attribute_value(&html[from..tag_end]),
                html[at..tag_end]
                    .find("content=")
                    .and_then(|pos| attribute_value(&html[at + pos + "content".len()..tag_end])),
                element_text(&html[tag_end + 1..]),
            ];
            if let Some(text) = candidates
                .into_iter()
                .flatten()
                .find(|text| parse_price(text).is_ok())
            {
                return Some(text);
            }
        }
    }
    None
}

/// Value of `="..."` or `='...'` at the start of `rest`.
fn attribute_value(rest: &str) -> Option<String> {
    let rest = rest.strip_prefix('=')?;
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &rest[1..];
    let end = body.find(quote)?;
    Some(body[..end].trim().to_string()).filter(|v| !v.is_empty())
}

/// Text up to the next tag, skipping nested opening tags with no text.
fn element_text(after_tag: &str) -> Option<String> {
    let mut rest = after_tag;
    loop {
        let end = rest.find('<').unwrap_or(rest.len());
        let text = rest[..end].trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
        let next = rest[end..].find('>')?;
        rest = &rest[end + next + 1..];
        if rest.is_empty() {
            return None;
        }
    }
}
