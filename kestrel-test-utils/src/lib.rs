//! Deterministic OHLCV fixtures and float-tolerance assertions.

use chrono::{DateTime, Duration, TimeZone, Utc};
use kestrel_core::{Candle, Frame, Series};
use rust_decimal::Decimal;

/// Ten closes used across documentation and tests.
pub const SAMPLE_CLOSE: [f64; 10] = [10.0, 11.0, 9.0, 12.0, 8.0, 15.0, 14.0, 16.0, 13.0, 17.0];

/// [`SAMPLE_CLOSE`] as a series.
pub fn sample_close() -> Series {
    Series::from_vec(SAMPLE_CLOSE.to_vec())
}

/// A series repeating `value` `len` times.
pub fn constant(value: f64, len: usize) -> Series {
    Series::from_vec(vec![value; len])
}

/// Smooth, oscillating OHLCV bars with volume, one per minute.
///
/// Highs and lows straddle the close so every bar has a positive range, and
/// volume varies so that accumulation is not trivially proportional.
pub fn wave_candles(len: usize) -> Vec<Candle> {
    let start: DateTime<Utc> = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    (0..len)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + (t * 0.3).sin() * 5.0 + t * 0.05;
            let open = close - (t * 0.7).cos();
            let spread = 1.0 + (t * 0.2).sin().abs();
            Candle {
                timestamp: start + Duration::minutes(i as i64),
                open: decimal(open),
                high: decimal(close.max(open) + spread),
                low: decimal(close.min(open) - spread),
                close: decimal(close),
                volume: decimal(1_000.0 + (t * 0.5).cos() * 400.0),
            }
        })
        .collect()
}

/// [`wave_candles`] as a column frame.
pub fn wave_frame(len: usize) -> Frame {
    Frame::from_candles(&wave_candles(len))
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or_default()
        .round_dp(6)
}

/// Asserts `|lhs - rhs| <= tolerance`.
#[track_caller]
pub fn assert_close(lhs: f64, rhs: f64, tolerance: f64) {
    assert!(
        (lhs - rhs).abs() <= tolerance,
        "{lhs} != {rhs} (tolerance {tolerance})"
    );
}

/// Asserts two series agree position by position, treating nulls as equal.
#[track_caller]
pub fn assert_series_close(lhs: &Series, rhs: &Series, tolerance: f64) {
    assert_eq!(lhs.len(), rhs.len(), "series lengths differ");
    for (index, (a, b)) in lhs.iter().zip(rhs.iter()).enumerate() {
        match (a, b) {
            (None, None) => {}
            (Some(a), Some(b)) => assert!(
                (a - b).abs() <= tolerance,
                "position {index}: {a} != {b} (tolerance {tolerance})"
            ),
            _ => panic!("position {index}: {a:?} vs {b:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use kestrel_core::Column;

    use super::*;

    #[test]
    fn wave_bars_have_positive_ranges() {
        let frame = wave_frame(50);
        let high = frame.column(Column::High).unwrap();
        let low = frame.column(Column::Low).unwrap();
        assert_eq!(high.len(), 50);
        assert!((0..50).all(|i| high.get(i).unwrap() > low.get(i).unwrap()));
    }

    #[test]
    fn series_comparison_treats_nulls_as_equal() {
        let a = Series::from_vec(vec![f64::NAN, 1.0]);
        let b = Series::from_vec(vec![f64::NAN, 1.0 + 1e-12]);
        assert_series_close(&a, &b, 1e-9);
    }
}
