//! Extracting the exact requested window from a merged table.

use crate::table::BarTable;

/// The requested window of a table, with an explicit empty marker.
///
/// An empty slice is a normal outcome ("no data in range"), distinct from
/// an acquisition failure - failures travel in
/// [`AcquisitionResult::error`](crate::acquire::AcquisitionResult),
/// never here.
#[derive(Clone, Debug, PartialEq)]
pub struct SlicedTable {
    /// Rows with `start <= timestamp <= end`.
    pub table: BarTable,
    /// True when no rows fell inside the window.
    pub empty: bool,
}

/// Return all rows of `table` with `start <= timestamp <= end`.
///
/// Never fails: an out-of-bounds or inverted window yields an empty
/// slice. Bounds are inclusive on both ends.
pub fn slice(table: &BarTable, start: i64, end: i64) -> SlicedTable {
    let rows = table.rows();
    let from = rows.partition_point(|bar| bar.timestamp < start);
    let to = rows.partition_point(|bar| bar.timestamp <= end);

    let selected = if from < to { rows[from..to].to_vec() } else { Vec::new() };
    let empty = selected.is_empty();

    SlicedTable {
        // Slicing a validated table preserves strict ordering.
        table: BarTable::from_sorted_rows(selected),
        empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candlecache_market_data::Bar;

    fn table(timestamps: &[i64]) -> BarTable {
        BarTable::try_new(
            timestamps
                .iter()
                .map(|&ts| Bar::new(ts, 1.0, 2.0, 0.5, 1.5, 10.0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_inclusive_bounds() {
        let sliced = slice(&table(&[1000, 2000, 3000, 4000]), 2000, 3000);
        assert!(!sliced.empty);
        assert_eq!(sliced.table.coverage(), Some((2000, 3000)));
    }

    #[test]
    fn test_containment() {
        let source = table(&[1000, 2000, 3000, 4000, 5000]);
        for (start, end) in [(0, 10_000), (1500, 4500), (2000, 2000), (4999, 5000)] {
            let sliced = slice(&source, start, end);
            for bar in sliced.table.rows() {
                assert!(start <= bar.timestamp && bar.timestamp <= end);
            }
            let expected = source
                .rows()
                .iter()
                .filter(|b| start <= b.timestamp && b.timestamp <= end)
                .count();
            assert_eq!(sliced.table.len(), expected);
        }
    }

    #[test]
    fn test_window_outside_table_is_empty() {
        let sliced = slice(&table(&[1000, 2000]), 5000, 9000);
        assert!(sliced.empty);
        assert!(sliced.table.is_empty());
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let sliced = slice(&table(&[1000, 2000]), 2000, 1000);
        assert!(sliced.empty);
    }

    #[test]
    fn test_empty_table_is_empty() {
        let sliced = slice(&BarTable::empty(), 0, 10_000);
        assert!(sliced.empty);
    }
}
