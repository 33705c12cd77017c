use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Column names of the durable history file, in order.
pub const HISTORY_COLUMNS: [&str; 4] = ["product_name", "price", "observed_at", "source_url"];

/// Number of leading columns every history row must carry.
pub const REQUIRED_COLUMNS: usize = 3;

/// Fractional digits kept on every stored price.
pub const PRICE_SCALE: u32 = 2;

pub const HISTORY_FILE_NAME: &str = "price_history.csv";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Markup markers tried, in order, when locating a price on a product page.
pub fn default_price_markers() -> Vec<String> {
    [
        r#"itemprop="price""#,
        "data-price",
        r#"class="price""#,
        r#"class="a-price-whole""#,
        r#"class="product-price""#,
        r#"class="price-current""#,
        r#"id="priceblock_dealprice""#,
        r#"id="priceblock_ourprice""#,
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("pricewatch")
    } else {
        PathBuf::from(".pricewatch")
    }
}

pub fn default_history_file() -> PathBuf {
    default_data_dir().join(HISTORY_FILE_NAME)
}

/// A product page to observe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTarget {
    pub name: String,
    pub url: String,
    /// Marker tried before the configured `price_markers`.
    #[serde(default)]
    pub price_marker: Option<String>,
}

/// Explicit configuration handed to every component at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub history_file: PathBuf,
    pub products: Vec<ProductTarget>,
    pub price_markers: Vec<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_file: default_history_file(),
            products: Vec::new(),
            price_markers: default_price_markers(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl TrackerConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
