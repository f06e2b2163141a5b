//! OHLCV rows and the column-oriented frame indicators consume.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::series::Series;

/// One of the canonical per-period price/volume fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated OHLCV bar as produced by data feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Column-oriented OHLCV data sharing one positional index.
///
/// Every column is optional so callers can supply only what an indicator needs.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    index: Option<Vec<DateTime<Utc>>>,
    open: Option<Series>,
    high: Option<Series>,
    low: Option<Series>,
    close: Option<Series>,
    volume: Option<Series>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a complete frame from candles, converting decimals to `f64`.
    pub fn from_candles(candles: &[Candle]) -> Self {
        Self {
            index: Some(candles.iter().map(|candle| candle.timestamp).collect()),
            open: Some(Series::from_numbers(candles.iter().map(|c| c.open))),
            high: Some(Series::from_numbers(candles.iter().map(|c| c.high))),
            low: Some(Series::from_numbers(candles.iter().map(|c| c.low))),
            close: Some(Series::from_numbers(candles.iter().map(|c| c.close))),
            volume: Some(Series::from_numbers(candles.iter().map(|c| c.volume))),
        }
    }

    #[must_use]
    pub fn with_index(mut self, index: Vec<DateTime<Utc>>) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: Column, series: Series) -> Self {
        *self.slot(column) = Some(series);
        self
    }

    #[must_use]
    pub fn with_open(self, series: Series) -> Self {
        self.with_column(Column::Open, series)
    }

    #[must_use]
    pub fn with_high(self, series: Series) -> Self {
        self.with_column(Column::High, series)
    }

    #[must_use]
    pub fn with_low(self, series: Series) -> Self {
        self.with_column(Column::Low, series)
    }

    #[must_use]
    pub fn with_close(self, series: Series) -> Self {
        self.with_column(Column::Close, series)
    }

    #[must_use]
    pub fn with_volume(self, series: Series) -> Self {
        self.with_column(Column::Volume, series)
    }

    /// Timestamps for each position, when the frame is time-indexed.
    pub fn index(&self) -> Option<&[DateTime<Utc>]> {
        self.index.as_deref()
    }

    pub fn column(&self, column: Column) -> Option<&Series> {
        match column {
            Column::Open => self.open.as_ref(),
            Column::High => self.high.as_ref(),
            Column::Low => self.low.as_ref(),
            Column::Close => self.close.as_ref(),
            Column::Volume => self.volume.as_ref(),
        }
    }

    /// Number of positions in the longest present column.
    pub fn len(&self) -> usize {
        Column::ALL
            .iter()
            .filter_map(|column| self.column(*column))
            .map(Series::len)
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&mut self, column: Column) -> &mut Option<Series> {
        match column {
            Column::Open => &mut self.open,
            Column::High => &mut self.high,
            Column::Low => &mut self.low,
            Column::Close => &mut self.close,
            Column::Volume => &mut self.volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn candle(minute: u32, close: i64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
            open: Decimal::from(close - 1),
            high: Decimal::from(close + 2),
            low: Decimal::from(close - 2),
            close: Decimal::from(close),
            volume: Decimal::new(15, 1),
        }
    }

    #[test]
    fn converts_candles_into_columns() {
        let frame = Frame::from_candles(&[candle(0, 100), candle(1, 101)]);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.index().map(<[_]>::len), Some(2));
        let close = frame.column(Column::Close).unwrap();
        assert_eq!(close.to_vec(), vec![100.0, 101.0]);
        let volume = frame.column(Column::Volume).unwrap();
        assert_eq!(volume.get(1), Some(1.5));
    }

    #[test]
    fn builder_tracks_partial_columns() {
        let frame = Frame::new().with_close(Series::from_vec(vec![1.0, 2.0, 3.0]));
        assert!(frame.column(Column::High).is_none());
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
        assert_eq!(Column::Volume.to_string(), "volume");
    }
}
