//! Bar granularities and their durations.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;

/// Bar granularity supported by the engine.
///
/// The string form matches the interval codes the providers accept
/// ("1m", "1h", "1d", ...). [`delta`](Self::delta) is the duration of one
/// bar at this granularity - the "interval delta" used to bound cache gaps.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Interval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    OneHour,
    FourHours,
    OneDay,
    OneWeek,
}

impl Interval {
    /// Duration of one bar at this granularity.
    pub fn delta(&self) -> Duration {
        match self {
            Self::OneMinute => Duration::minutes(1),
            Self::FiveMinutes => Duration::minutes(5),
            Self::FifteenMinutes => Duration::minutes(15),
            Self::OneHour => Duration::hours(1),
            Self::FourHours => Duration::hours(4),
            Self::OneDay => Duration::days(1),
            Self::OneWeek => Duration::weeks(1),
        }
    }

    /// Duration of one bar in epoch milliseconds.
    pub fn delta_ms(&self) -> i64 {
        self.delta().num_milliseconds()
    }

    /// Provider-facing interval code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Self::OneMinute),
            "5m" => Ok(Self::FiveMinutes),
            "15m" => Ok(Self::FifteenMinutes),
            "1h" => Ok(Self::OneHour),
            "4h" => Ok(Self::FourHours),
            "1d" => Ok(Self::OneDay),
            "1w" => Ok(Self::OneWeek),
            other => Err(format!("Unknown interval code: {}", other)),
        }
    }
}
