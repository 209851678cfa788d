//! Timestamp-indexed bar tables.
//!
//! [`BarTable`] is the in-memory representation of one cached or merged
//! series. It can only be constructed in a validated state: timestamps
//! unique and strictly increasing. Everything downstream (reconciliation,
//! merging, slicing) leans on that invariant instead of re-checking it.

use candlecache_market_data::Bar;
use thiserror::Error;

/// Why a set of rows was rejected as a table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Two rows share a timestamp, or a later row precedes an earlier one.
    #[error("Timestamps not strictly increasing at row {row}")]
    NotStrictlyIncreasing {
        /// Index of the offending row
        row: usize,
    },
}

/// Coverage metadata derived from a table at load time.
///
/// Never persisted separately from the data - always recomputed from the
/// rows actually present, so it cannot drift from the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheMetadata {
    /// First covered timestamp, epoch ms (inclusive).
    pub covered_start: i64,
    /// Last covered timestamp, epoch ms (inclusive).
    pub covered_end: i64,
    /// Number of rows in the table.
    pub row_count: usize,
    /// Size of the persisted file in bytes (0 for in-memory tables).
    pub byte_size: u64,
    /// The (source, symbol, interval) key this table belongs to.
    pub source_key: String,
}

/// A validated, timestamp-indexed table of bars.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BarTable {
    rows: Vec<Bar>,
}

impl BarTable {
    /// Build a table from rows, validating the index invariant.
    pub fn try_new(rows: Vec<Bar>) -> Result<Self, TableError> {
        for (i, pair) in rows.windows(2).enumerate() {
            if pair[0].timestamp >= pair[1].timestamp {
                return Err(TableError::NotStrictlyIncreasing { row: i + 1 });
            }
        }
        Ok(Self { rows })
    }

    /// Build a table from rows already known to be sorted and deduplicated.
    ///
    /// Only the merger uses this, immediately after it has sorted and
    /// deduplicated the rows itself.
    pub(crate) fn from_sorted_rows(rows: Vec<Bar>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self { rows }
    }

    /// An empty table.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Bar] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Bar> {
        self.rows
    }

    /// The inclusive `[start, end]` span covered by this table, or `None`
    /// if the table is empty.
    pub fn coverage(&self) -> Option<(i64, i64)> {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Derive coverage metadata for this table.
    ///
    /// Returns `None` for an empty table - empty tables have no coverage
    /// and are never persisted.
    pub fn metadata(&self, source_key: &str, byte_size: u64) -> Option<CacheMetadata> {
        self.coverage().map(|(covered_start, covered_end)| CacheMetadata {
            covered_start,
            covered_end,
            row_count: self.rows.len(),
            byte_size,
            source_key: source_key.to_string(),
        })
    }
}
