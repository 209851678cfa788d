use serde::{Deserialize, Serialize};

/// One OHLCV record for a time interval (a "kline" or "candle").
///
/// The timestamp is the bar's open time in epoch milliseconds, UTC.
/// Within any table, timestamps are unique and strictly increasing;
/// that invariant is enforced where tables are built, not here.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time, epoch milliseconds (UTC, interval-naive).
    #[serde(rename = "timestamp_ms")]
    pub timestamp: i64,

    /// Opening price
    pub open: f64,

    /// High price
    pub high: f64,

    /// Low price
    pub low: f64,

    /// Closing price
    pub close: f64,

    /// Base-asset volume
    pub volume: f64,
}

impl Bar {
    /// Create a bar from its raw fields.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_new() {
        let bar = Bar::new(1_672_531_200_000, 16540.0, 16620.5, 16500.0, 16610.1, 1234.5);
        assert_eq!(bar.timestamp, 1_672_531_200_000);
        assert_eq!(bar.close, 16610.1);
    }

    #[test]
    fn test_bar_csv_header_field() {
        // The persisted cache header names the index column explicitly.
        let mut writer = csv_writer();
        writer
            .serialize(Bar::new(1000, 1.0, 2.0, 0.5, 1.5, 10.0))
            .unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(out.starts_with("timestamp_ms,open,high,low,close,volume"));
    }

    fn csv_writer() -> csv::Writer<Vec<u8>> {
        csv::Writer::from_writer(Vec::new())
    }
}
