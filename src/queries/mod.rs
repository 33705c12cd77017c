//! Read-side analytics over an immutable history snapshot.
//!
//! Every function here is a pure function of the slice it is given; obtain
//! the slice from [`HistoryStore::load_all`](crate::store::HistoryStore::load_all).

pub mod series;
pub mod summary;

pub use series::{build_all_series, build_series, build_snapshot, ranked_snapshot};
pub use summary::{summarize, summarize_all, summarize_products, SummaryOutcome};
