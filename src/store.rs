//! Append-only, CSV-backed history of price observations.
//!
//! One row per observation with the columns
//! `product_name,price,observed_at,source_url` under a header row. Rows are
//! kept in append order. Loading is tolerant: a malformed row is logged and
//! skipped while the rest of the file still loads.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use csv::StringRecord;

use crate::config::{HISTORY_COLUMNS, REQUIRED_COLUMNS};
use crate::error::{PricewatchError, Result};
use crate::models::PriceObservation;
use crate::normalize::{parse_amount, parse_timestamp};

/// A row that was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the history file.
    pub line: u64,
    pub reason: String,
}

/// Result of loading the history file.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Valid observations, in storage order.
    pub observations: Vec<PriceObservation>,
    pub skipped: Vec<SkippedRow>,
}

/// Durable, append-only store of [`PriceObservation`]s.
///
/// Writes take `&mut self`: the store is the only writer of its file, and
/// concurrent writers (other processes included) are not supported.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Open a store at `path`, creating parent directories as needed.
    ///
    /// The file itself is created on first append; a missing file reads as
    /// an empty history.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.is_dir() {
            return Err(storage_err(&path, "path is a directory"));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| storage_err(parent, e))?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and durably append one observation.
    ///
    /// No deduplication is performed: identical observations are all kept.
    pub fn append(&mut self, observation: &PriceObservation) -> Result<()> {
        self.append_batch(std::slice::from_ref(observation)).map(|_| ())
    }

    /// Append observations in order. Returns how many were written.
    ///
    /// Not atomic: if the element at position `i` cannot be written, elements
    /// `[0, i)` are already in the file. Each element is re-validated before it
    /// is written, but a [`PriceObservation`] built through its constructor
    /// always passes, so in practice only I/O failures stop a batch midway.
    ///
    /// A file whose last row lacks a line terminator (an interrupted write or
    /// a hand edit) is terminated first, so the new rows start on their own line.
    pub fn append_batch(&mut self, observations: &[PriceObservation]) -> Result<usize> {
        if observations.is_empty() {
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| storage_err(&self.path, e))?;
        let len = file
            .metadata()
            .map_err(|e| storage_err(&self.path, e))?
            .len();
        let needs_header = len == 0;

        let terminated = needs_header
            || ends_with_line_break(&mut file, len).map_err(|e| storage_err(&self.path, e))?;
        if !terminated {
            file.write_all(b"\n").map_err(|e| storage_err(&self.path, e))?;
            tracing::warn!("Terminated unfinished last row in {}", self.path.display());
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer
                .write_record(HISTORY_COLUMNS)
                .map_err(|e| storage_err(&self.path, e))?;
            tracing::info!("Created price history file {}", self.path.display());
        }

        let mut written = 0;
        for observation in observations {
            if let Err(e) = observation.validate() {
                writer.flush().map_err(|e| storage_err(&self.path, e))?;
                return Err(e);
            }
            writer
                .write_record(to_record(observation))
                .map_err(|e| storage_err(&self.path, e))?;
            written += 1;
        }

        writer.flush().map_err(|e| storage_err(&self.path, e))?;
        Ok(written)
    }

    /// Every stored observation, in storage order. Corrupt rows are skipped.
    pub fn load_all(&self) -> Result<Vec<PriceObservation>> {
        Ok(self.load_report()?.observations)
    }

    /// Load the history, reporting which rows were skipped and why.
    ///
    /// Fails with [`PricewatchError::Storage`] if the file cannot be read or its
    /// header is not the expected one.
    pub fn load_report(&self) -> Result<LoadReport> {
        if !self.path.exists() {
            return Ok(LoadReport::default());
        }

        let file = File::open(&self.path).map_err(|e| storage_err(&self.path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = reader.records();
        let header = match records.next() {
            None => return Ok(LoadReport::default()),
            Some(Ok(header)) => header,
            Some(Err(e)) => return Err(storage_err(&self.path, e)),
        };
        check_header(&header).map_err(|e| storage_err(&self.path, e))?;

        let mut report = LoadReport::default();
        for (idx, result) in records.enumerate() {
            // Header is line 1.
            let fallback_line = idx as u64 + 2;
            let outcome = match result {
                Ok(record) => {
                    let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);
                    parse_row(&record).map_err(|reason| SkippedRow { line, reason })
                }
                Err(e) if e.is_io_error() => return Err(storage_err(&self.path, e)),
                Err(e) => Err(SkippedRow {
                    line: e.position().map(|p| p.line()).unwrap_or(fallback_line),
                    reason: e.to_string(),
                }),
            };
            match outcome {
                Ok(observation) => report.observations.push(observation),
                Err(skipped) => {
                    tracing::warn!(
                        "Skipping corrupt row {} in {}: {}",
                        skipped.line,
                        self.path.display(),
                        skipped.reason
                    );
                    report.skipped.push(skipped);
                }
            }
        }

        tracing::info!(
            "Loaded {} price records from {} ({} skipped)",
            report.observations.len(),
            self.path.display(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Names of all products with at least one stored observation.
    pub fn distinct_products(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|o| o.product_name().to_string())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Row codec
// ---------------------------------------------------------------------------

fn to_record(observation: &PriceObservation) -> [String; 4] {
    [
        observation.product_name().to_string(),
        observation.price().to_string(),
        observation
            .observed_at()
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        observation.source_url().unwrap_or_default().to_string(),
    ]
}

fn check_header(header: &StringRecord) -> std::result::Result<(), String> {
    let names: Vec<&str> = header
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}'))
        .collect();
    let expected = &HISTORY_COLUMNS[..names.len().min(HISTORY_COLUMNS.len())];
    if names.len() < REQUIRED_COLUMNS || names.len() > HISTORY_COLUMNS.len() || names != expected {
        return Err(format!(
            "unexpected header [{}], expected [{}]",
            names.join(","),
            HISTORY_COLUMNS.join(",")
        ));
    }
    Ok(())
}

fn parse_row(record: &StringRecord) -> std::result::Result<PriceObservation, String> {
    if record.len() < REQUIRED_COLUMNS || record.len() > HISTORY_COLUMNS.len() {
        return Err(format!(
            "expected {} or {} fields, found {}",
            REQUIRED_COLUMNS,
            HISTORY_COLUMNS.len(),
            record.len()
        ));
    }
    let price = parse_amount(&record[1]).map_err(|e| e.to_string())?;
    let observed_at = parse_timestamp(&record[2]).map_err(|e| e.to_string())?;
    let observation =
        PriceObservation::new(&record[0], price, observed_at).map_err(|e| e.to_string())?;
    Ok(match record.get(3) {
        Some(url) => observation.with_source_url(url),
        None => observation,
    })
}

fn ends_with_line_break(file: &mut File, len: u64) -> io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n' || last[0] == b'\r')
}

fn storage_err(path: &Path, err: impl Display) -> PricewatchError {
    PricewatchError::Storage(format!("{}: {}", path.display(), err))
}
