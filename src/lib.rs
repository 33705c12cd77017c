//! Price history ingestion and trend analytics.
//!
//! Raw price observations from a producer (a page scraper or a synthetic
//! generator) are normalized into validated [`PriceObservation`]s, appended to
//! a CSV-backed [`HistoryStore`], and read back as an immutable snapshot from
//! which per-product statistics, chart series and a latest-price snapshot are
//! derived.
//!
//! # Quick start
//!
//! ```no_run
//! use pricewatch::PriceTracker;
//! use pricewatch::producer::SyntheticProducer;
//!
//! let mut tracker = PriceTracker::builder()
//!     .history_file("data/price_history.csv")
//!     .build()
//!     .unwrap();
//!
//! tracker.collect(&mut SyntheticProducer::new().seed(7)).unwrap();
//!
//! let report = tracker.report().unwrap();
//! println!("{}", report.summary_table());
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod ordering;
pub mod producer;
pub mod queries;
pub mod report;
pub mod store;

pub use config::{ProductTarget, TrackerConfig};
pub use error::{PricewatchError, Result};
pub use models::{PriceObservation, ProductSummary, SeriesPoint, Snapshot, TimeSeries};
pub use normalize::RawObservation;
pub use producer::Producer;
pub use report::{ChartData, Report, SummaryRow};
pub use store::HistoryStore;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// PriceTrackerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`PriceTracker`].
#[derive(Default)]
pub struct PriceTrackerBuilder {
    config: TrackerConfig,
    history_file: Option<PathBuf>,
}

impl PriceTrackerBuilder {
    /// Use a full configuration value.
    pub fn config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the history file location.
    ///
    /// If neither this nor [`config`](Self::config) sets one, the platform data
    /// directory is used (e.g. `~/.local/share/pricewatch/price_history.csv`
    /// on Linux).
    pub fn history_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.history_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Open the history store and build the tracker.
    pub fn build(self) -> Result<PriceTracker> {
        let mut config = self.config;
        if let Some(path) = self.history_file {
            config.history_file = path;
        }
        let store = HistoryStore::open(&config.history_file)?;
        Ok(PriceTracker { store, config })
    }
}

// ---------------------------------------------------------------------------
// IngestReport
// ---------------------------------------------------------------------------

/// A raw record that failed normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// Position of the record in the ingested batch.
    pub index: usize,
    pub reason: String,
}

/// Outcome of ingesting a batch of raw records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub stored: Vec<PriceObservation>,
    pub rejected: Vec<Rejected>,
}

// ---------------------------------------------------------------------------
// PriceTracker
// ---------------------------------------------------------------------------

/// The main entry point: owns the history store and the configuration.
///
/// Writes go through `&mut self`; all read-side methods load a fresh snapshot
/// of the store and derive their results from it.
pub struct PriceTracker {
    store: HistoryStore,
    config: TrackerConfig,
}

impl PriceTracker {
    pub fn builder() -> PriceTrackerBuilder {
        PriceTrackerBuilder::default()
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // -- Ingestion ---------------------------------------------------------

    /// Normalize one raw record and append it.
    pub fn ingest(&mut self, raw: &RawObservation) -> Result<PriceObservation> {
        let observation = normalize::normalize(raw)?;
        self.store.append(&observation)?;
        Ok(observation)
    }

    /// Normalize and append a batch.
    ///
    /// Records that fail normalization are rejected individually and do not
    /// stop the rest. A storage failure aborts the batch; records appended
    /// before it stay in the store.
    pub fn ingest_batch(&mut self, raws: &[RawObservation]) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        for (index, raw) in raws.iter().enumerate() {
            match normalize::normalize(raw) {
                Ok(observation) => report.stored.push(observation),
                Err(e) => {
                    tracing::warn!("Rejected raw observation #{}: {}", index, e);
                    report.rejected.push(Rejected {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }
        self.store.append_batch(&report.stored)?;

        tracing::info!(
            "Ingested {} observations ({} rejected)",
            report.stored.len(),
            report.rejected.len()
        );
        Ok(report)
    }

    /// Pull records from a producer and ingest them.
    pub fn collect(&mut self, producer: &mut dyn Producer) -> Result<IngestReport> {
        let raws = producer.produce()?;
        self.ingest_batch(&raws)
    }

    // -- Queries -----------------------------------------------------------

    /// Immutable snapshot of every stored observation, in storage order.
    pub fn history(&self) -> Result<Vec<PriceObservation>> {
        self.store.load_all()
    }

    pub fn summary(&self, product_name: &str) -> Result<ProductSummary> {
        queries::summarize(&self.history()?, product_name)
    }

    pub fn summaries(&self) -> Result<BTreeMap<String, ProductSummary>> {
        Ok(queries::summarize_all(&self.history()?))
    }

    pub fn series(&self, product_name: &str) -> Result<TimeSeries> {
        Ok(queries::build_series(&self.history()?, product_name))
    }

    pub fn all_series(&self) -> Result<BTreeMap<String, TimeSeries>> {
        Ok(queries::build_all_series(&self.history()?))
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(queries::build_snapshot(&self.history()?))
    }

    /// Summary rows and chart data. Configured products without data appear
    /// as "no data" rows.
    pub fn report(&self) -> Result<Report> {
        let tracked: Vec<&str> = self.config.products.iter().map(|p| p.name.as_str()).collect();
        Ok(Report::from_history(&self.history()?, &tracked))
    }
}

impl fmt::Display for PriceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PriceTracker(history_file={}, products={})",
            self.store.path().display(),
            self.config.products.len()
        )
    }
}
