//! On-disk cache of bar tables.
//!
//! One CSV file per (source, symbol, interval) key, holding the full
//! timestamp-indexed table. Loads never fail the acquisition: a missing,
//! unreadable, or corrupt file is treated as "no cache" (with a warning
//! for the corrupt case). Saves rewrite the whole file atomically via a
//! temp file and rename, so a crash mid-write never leaves a torn cache
//! visible to the next load.
//!
//! The engine assumes single-writer access per key; concurrent saves on
//! the same key must be serialized by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};

use crate::errors::{AcquisitionError, Result};
use crate::table::{BarTable, CacheMetadata};
use candlecache_market_data::{Bar, Interval};

/// Identifies one cached series.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheKey {
    /// Provider id the data came from (e.g. "BINANCE").
    pub source: String,
    /// Provider-form symbol (e.g. "BTCUSDT").
    pub symbol: String,
    /// Bar granularity.
    pub interval: Interval,
}

impl CacheKey {
    pub fn new(source: impl Into<String>, symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            source: source.into(),
            symbol: symbol.into(),
            interval,
        }
    }

    /// Canonical string form, used in metadata and log messages.
    pub fn source_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.source.to_lowercase(),
            self.symbol,
            self.interval
        )
    }
}

/// Filesystem-backed store of cached bar tables.
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory does not need to exist yet; it is created on the
    /// first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the cache file for a key.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root
            .join(key.source.to_lowercase())
            .join(format!("{}_{}.csv", key.symbol, key.interval))
    }

    /// Load the cached table for a key, if a valid one exists.
    ///
    /// Returns `None` when the file is missing (silently) or when it is
    /// corrupt - unreadable, empty, unparseable fields, or a broken
    /// timestamp index (which also covers any stray timezone-suffixed
    /// legacy values, since only naive epoch-ms integers parse). Corruption
    /// is logged as a warning and the acquisition proceeds as if no cache
    /// existed; it is never fatal.
    pub fn load(&self, key: &CacheKey) -> Option<(BarTable, CacheMetadata)> {
        let path = self.path_for(key);

        if !path.exists() {
            debug!("No cache file for {}", key.source_key());
            return None;
        }

        let table = match read_table(&path) {
            Ok(table) => table,
            Err(reason) => {
                warn!(
                    "Cache for {} at {} is corrupt ({}); treating as absent",
                    key.source_key(),
                    path.display(),
                    reason
                );
                return None;
            }
        };

        if table.is_empty() {
            warn!(
                "Cache for {} at {} is empty; treating as absent",
                key.source_key(),
                path.display()
            );
            return None;
        }

        let byte_size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let metadata = table.metadata(&key.source_key(), byte_size)?;

        debug!(
            "Loaded cache for {}: {} rows covering [{}, {}]",
            key.source_key(),
            metadata.row_count,
            metadata.covered_start,
            metadata.covered_end
        );

        Some((table, metadata))
    }

    /// Persist the full table for a key, atomically.
    ///
    /// Writes to a sibling temp file, then renames it over the target, so
    /// the previous cache stays intact until the new one is complete.
    /// Calling this with an empty table is a caller contract violation and
    /// aborts the save.
    pub fn save(&self, key: &CacheKey, table: &BarTable) -> Result<()> {
        if table.is_empty() {
            error!(
                "Refusing to save empty cache table for {}",
                key.source_key()
            );
            return Err(AcquisitionError::EmptySave(key.source_key()));
        }

        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("csv.tmp");
        write_table(&tmp_path, table)?;
        fs::rename(&tmp_path, &path)?;

        debug!(
            "Saved cache for {}: {} rows to {}",
            key.source_key(),
            table.len(),
            path.display()
        );

        Ok(())
    }
}

/// Read and validate a cache file. Any failure is returned as a reason
/// string; the caller downgrades it to a warning.
fn read_table(path: &Path) -> std::result::Result<BarTable, String> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| e.to_string())?;

    let mut rows: Vec<Bar> = Vec::new();
    for record in reader.deserialize() {
        let bar: Bar = record.map_err(|e| e.to_string())?;
        rows.push(bar);
    }

    BarTable::try_new(rows).map_err(|e| e.to_string())
}

fn write_table(path: &Path, table: &BarTable) -> std::io::Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(std::io::Error::other)?;
    for bar in table.rows() {
        writer.serialize(bar).map_err(std::io::Error::other)?;
    }
    writer.flush()?;
    Ok(())
}
