//! True range and average true range over whole series.

use kestrel_core::Series;

use crate::ma::{ma, MaMode};

/// Largest of the current range and the gaps from the close `drift` periods back.
///
/// The first `drift` positions are null because they have no previous close.
///
/// # Panics
///
/// Panics when the three series are not aligned.
pub fn true_range(high: &Series, low: &Series, close: &Series, drift: usize) -> Series {
    let prev_close = close.shift(i64::try_from(drift).unwrap_or(i64::MAX));
    let high_low = high - low;
    let high_close = (high - &prev_close).map(f64::abs);
    let low_close = (low - &prev_close).map(f64::abs);
    high_low
        .zip_with(&high_close, strict_max)
        .zip_with(&low_close, strict_max)
}

/// Moving average of the true range.
///
/// # Panics
///
/// Panics when the three series are not aligned.
pub fn atr(
    high: &Series,
    low: &Series,
    close: &Series,
    length: usize,
    mamode: MaMode,
    drift: usize,
) -> Series {
    ma(mamode, &true_range(high, low, close, drift), length)
}

/// `max` that yields null when either side is null.
fn strict_max(lhs: f64, rhs: f64) -> f64 {
    if lhs.is_nan() || rhs.is_nan() {
        f64::NAN
    } else {
        lhs.max(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Series {
        Series::from_vec(values.to_vec())
    }

    #[test]
    fn true_range_includes_gaps() {
        let high = series(&[10.0, 12.0, 11.0]);
        let low = series(&[9.0, 11.0, 7.0]);
        let close = series(&[9.5, 11.5, 8.0]);
        let tr = true_range(&high, &low, &close, 1);
        assert!(tr.is_null(0));
        // gap up from 9.5 to a high of 12
        assert_eq!(tr.get(1), Some(2.5));
        assert_eq!(tr.get(2), Some(4.5));
    }

    #[test]
    #[should_panic(expected = "series are not aligned")]
    fn misaligned_inputs_are_rejected() {
        let high = series(&[11.0, 12.0, 13.0]);
        let low = series(&[9.0, 10.0]);
        let _ = true_range(&high, &low, &high, 1);
    }

    #[test]
    fn atr_warms_up() {
        let high = series(&[11.0, 12.0, 13.0, 14.0]);
        let low = series(&[9.0, 10.0, 11.0, 12.0]);
        let close = series(&[10.0, 11.0, 12.0, 13.0]);
        let out = atr(&high, &low, &close, 2, MaMode::Rma, 1);
        assert!(out.is_null(0));
        assert!(out.is_null(1));
        assert_eq!(out.get(2), Some(2.0));
        assert_eq!(out.get(3), Some(2.0));
    }
}
