//! Moving-average dispatcher.
//!
//! Every variant starts at the first complete, null-free window of its source,
//! so series that begin with nulls (such as a true range) are handled without
//! special casing.

use std::fmt;
use std::str::FromStr;

use kestrel_core::Series;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Catalog of moving-average variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaMode {
    /// Simple moving average.
    Sma,
    /// Exponential moving average, alpha = 2 / (n + 1).
    Ema,
    /// Wilder's moving average, alpha = 1 / n.
    Rma,
    /// Linearly weighted moving average.
    Wma,
    /// Double exponential moving average.
    Dema,
    /// Triple exponential moving average.
    Tema,
}

impl MaMode {
    /// Variant used when a name is not recognised.
    pub const FALLBACK: MaMode = MaMode::Ema;

    /// Resolves a user-supplied name, falling back to [`MaMode::FALLBACK`].
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            trace!(name, fallback = %Self::FALLBACK, "unknown moving average");
            Self::FALLBACK
        })
    }

    /// Upper-case mnemonic used in output names.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Sma => "SMA",
            Self::Ema => "EMA",
            Self::Rma => "RMA",
            Self::Wma => "WMA",
            Self::Dema => "DEMA",
            Self::Tema => "TEMA",
        }
    }

    /// Output name for a window of `length`, e.g. `SMA_4`.
    pub fn label(self, length: usize) -> String {
        format!("{}_{}", self.mnemonic(), length)
    }
}

impl fmt::Display for MaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mnemonic().to_ascii_lowercase())
    }
}

/// Raised by the strict [`FromStr`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown moving average '{0}'")]
pub struct UnknownMaMode(pub String);

impl FromStr for MaMode {
    type Err = UnknownMaMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sma" => Ok(Self::Sma),
            "ema" => Ok(Self::Ema),
            "rma" => Ok(Self::Rma),
            "wma" => Ok(Self::Wma),
            "dema" => Ok(Self::Dema),
            "tema" => Ok(Self::Tema),
            other => Err(UnknownMaMode(other.to_string())),
        }
    }
}

/// Computes the `mode` moving average of `source` over `length` periods.
pub fn ma(mode: MaMode, source: &Series, length: usize) -> Series {
    match mode {
        MaMode::Sma => source.rolling_mean(length),
        MaMode::Ema => ema(source, length),
        MaMode::Rma => rma(source, length),
        MaMode::Wma => wma(source, length),
        MaMode::Dema => {
            let first = ema(source, length);
            let second = ema(&first, length);
            &first * 2.0 - &second
        }
        MaMode::Tema => {
            let first = ema(source, length);
            let second = ema(&first, length);
            let third = ema(&second, length);
            (&first - &second) * 3.0 + &third
        }
    }
}

/// Exponential moving average, alpha = 2 / (length + 1).
pub fn ema(source: &Series, length: usize) -> Series {
    exponential(source, length, 2.0 / (length as f64 + 1.0))
}

/// Wilder's moving average, alpha = 1 / length.
pub fn rma(source: &Series, length: usize) -> Series {
    exponential(source, length, 1.0 / length as f64)
}

/// Linearly weighted moving average.
pub fn wma(source: &Series, length: usize) -> Series {
    let weight_total = (length * (length + 1)) as f64 / 2.0;
    source.rolling(length, move |view| {
        view.iter()
            .enumerate()
            .map(|(position, value)| (position + 1) as f64 * value)
            .sum::<f64>()
            / weight_total
    })
}

/// Exponential smoothing seeded with the first complete simple average.
///
/// Nulls after the seed produce null outputs and leave the state untouched.
pub(crate) fn exponential(source: &Series, length: usize, alpha: f64) -> Series {
    let seeds = source.rolling_mean(length);
    let Some(start) = seeds.first_valid_index() else {
        return Series::nulls(source.len());
    };
    let mut state = f64::NAN;
    let values = source.values();
    (0..source.len())
        .map(|index| {
            if index < start {
                return f64::NAN;
            }
            if index == start {
                state = seeds.values()[index];
                return state;
            }
            let value = values[index];
            if value.is_nan() {
                return f64::NAN;
            }
            state = alpha * value + (1.0 - alpha) * state;
            state
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Series {
        Series::from_vec(values.to_vec())
    }

    fn assert_close(lhs: f64, rhs: f64) {
        assert!((lhs - rhs).abs() <= 1e-10, "{lhs} != {rhs}");
    }

    #[test]
    fn unknown_names_fall_back_to_ema() {
        assert_eq!(MaMode::from_name("SMA"), MaMode::Sma);
        assert_eq!(MaMode::from_name("kama"), MaMode::Ema);
        assert!("kama".parse::<MaMode>().is_err());
        assert_eq!(MaMode::Sma.label(4), "SMA_4");
    }

    #[test]
    fn sma_waits_for_full_window() {
        let out = ma(MaMode::Sma, &series(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert!(out.is_null(1));
        assert_eq!(out.get(2), Some(2.0));
        assert_eq!(out.get(3), Some(3.0));
    }

    #[test]
    fn ema_seeds_with_simple_average() {
        let out = ma(MaMode::Ema, &series(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert!(out.is_null(1));
        assert_close(out.get(2).unwrap(), 2.0);
        // alpha = 0.5: 0.5 * 4 + 0.5 * 2
        assert_close(out.get(3).unwrap(), 3.0);
    }

    #[test]
    fn rma_skips_leading_nulls() {
        let out = ma(MaMode::Rma, &series(&[f64::NAN, 2.0, 4.0, 6.0]), 2);
        assert!(out.is_null(0));
        assert!(out.is_null(1));
        assert_close(out.get(2).unwrap(), 3.0);
        assert_close(out.get(3).unwrap(), 4.5);
    }

    #[test]
    fn wma_weights_recent_values() {
        let out = ma(MaMode::Wma, &series(&[1.0, 2.0, 3.0]), 3);
        // (1 + 4 + 9) / 6
        assert_close(out.get(2).unwrap(), 14.0 / 6.0);
    }

    #[test]
    fn dema_and_tema_track_constant_input() {
        let flat = series(&[5.0; 12]);
        let dema = ma(MaMode::Dema, &flat, 3);
        let tema = ma(MaMode::Tema, &flat, 3);
        assert_close(dema.get(11).unwrap(), 5.0);
        assert_close(tema.get(11).unwrap(), 5.0);
        assert!(tema.is_null(5));
    }
}
