use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Caller-facing chart window vocabulary.
///
/// Unknown inputs deliberately fall back to the `3M` default instead of
/// erroring; the UI treats the range selector as a hint, not a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    All,
}

/// Provider-native candle resolution codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandleInterval {
    FifteenMinutes,
    OneHour,
    FourHours,
    OneDay,
    OneWeek,
}

impl CandleInterval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
        }
    }
}

impl Display for CandleInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Range → (resolution, lookback) table. Data, not branching logic, so a new
/// range is one row.
const RANGE_PLANS: [(TimeRange, CandleInterval, u32); 6] = [
    (TimeRange::OneDay, CandleInterval::FifteenMinutes, 96),
    (TimeRange::OneWeek, CandleInterval::OneHour, 168),
    (TimeRange::OneMonth, CandleInterval::FourHours, 180),
    (TimeRange::ThreeMonths, CandleInterval::OneDay, 90),
    (TimeRange::OneYear, CandleInterval::OneDay, 365),
    (TimeRange::All, CandleInterval::OneWeek, 200),
];

impl TimeRange {
    pub const ALL_RANGES: [Self; 6] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::OneYear,
        Self::All,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::OneYear => "1Y",
            Self::All => "ALL",
        }
    }

    /// Parse a caller-supplied range, falling back to the `3M` default for
    /// anything unrecognized.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "1D" => Self::OneDay,
            "1W" => Self::OneWeek,
            "1M" => Self::OneMonth,
            "3M" => Self::ThreeMonths,
            "1Y" => Self::OneYear,
            "ALL" => Self::All,
            _ => Self::ThreeMonths,
        }
    }

    /// Provider-native resolution and bar count for this range.
    pub fn plan(self) -> (CandleInterval, u32) {
        RANGE_PLANS
            .iter()
            .find(|(range, _, _)| *range == self)
            .map(|(_, interval, limit)| (*interval, *limit))
            .expect("every range has a plan row")
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
