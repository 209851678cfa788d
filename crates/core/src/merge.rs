//! Combining cached rows with freshly fetched chunks.

use log::debug;

use crate::table::BarTable;
use candlecache_market_data::Bar;

/// Merge the cache with fetched chunks into one validated table.
///
/// Concatenates the cache (first, so it wins ties) with the chunks in the
/// order produced, stable-sorts by timestamp, and drops duplicate
/// timestamps keeping the first occurrence. Duplicates are expected at
/// page boundaries and wherever a conservative full-range refetch
/// overlapped the cache.
///
/// Returns the merged table and the number of duplicate rows removed.
/// Idempotent: merging the same inputs in the same order always yields
/// the same table.
pub fn combine(cache: Option<&BarTable>, chunks: &[Vec<Bar>]) -> (BarTable, usize) {
    let capacity =
        cache.map_or(0, BarTable::len) + chunks.iter().map(Vec::len).sum::<usize>();
    let mut rows: Vec<Bar> = Vec::with_capacity(capacity);

    if let Some(cache) = cache {
        rows.extend_from_slice(cache.rows());
    }
    for chunk in chunks {
        rows.extend_from_slice(chunk);
    }

    let before = rows.len();
    // Stable sort keeps the cache row first among equal timestamps, so
    // dedup's keep-first rule gives the cache precedence.
    rows.sort_by_key(|bar| bar.timestamp);
    rows.dedup_by_key(|bar| bar.timestamp);
    let duplicates_removed = before - rows.len();

    if duplicates_removed > 0 {
        debug!("Merge removed {} duplicate rows", duplicates_removed);
    }

    (BarTable::from_sorted_rows(rows), duplicates_removed)
}
