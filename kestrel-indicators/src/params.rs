//! Raw parameter sets and the defaulting rules that sanitize them.
//!
//! Every field is optional. Absent or out-of-range values are replaced by the
//! indicator's documented default; parameters never cause a call to fail.

use kestrel_core::{FillMethod, Series};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ma::MaMode;

/// Missing-value policy applied once to the final series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FillOptions {
    /// Constant substituted for every null.
    pub value: Option<f64>,
    /// Propagation method applied after the constant fill.
    pub method: Option<FillMethod>,
}

/// Post-computation stage shared by every indicator: offset, then fill.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostProcess {
    /// Periods to shift the result; positive values move it later.
    pub offset: i64,
    /// Fill policy applied after shifting.
    pub fill: FillOptions,
}

impl PostProcess {
    /// Resolves the post-processing fields common to all raw parameter sets.
    pub fn resolve(offset: Option<i64>, fillna: Option<f64>, fill_method: Option<FillMethod>) -> Self {
        Self {
            offset: offset.unwrap_or(0),
            fill: FillOptions {
                value: fillna,
                method: fill_method,
            },
        }
    }

    /// Applies the offset and then the fill policy.
    pub fn apply(&self, series: Series) -> Series {
        let mut series = if self.offset != 0 {
            series.shift(self.offset)
        } else {
            series
        };
        if let Some(value) = self.fill.value {
            series = series.fill_null(value);
        }
        if let Some(method) = self.fill.method {
            series = series.fill_method(method);
        }
        series
    }
}

/// Positive integer such as a window or a lag, or `default`.
pub(crate) fn resolve_length(param: &'static str, raw: Option<i64>, default: usize) -> usize {
    match raw.filter(|value| *value > 0).and_then(|value| usize::try_from(value).ok()) {
        Some(length) => length,
        None => {
            if let Some(value) = raw {
                trace!(param, value, default, "replacing non-positive parameter");
            }
            default
        }
    }
}

/// Positive finite scalar, or `default`.
pub(crate) fn resolve_scalar(param: &'static str, raw: Option<f64>, default: f64) -> f64 {
    match raw.filter(|value| value.is_finite() && *value > 0.0) {
        Some(scalar) => scalar,
        None => {
            if let Some(value) = raw {
                trace!(param, value, default, "replacing non-positive parameter");
            }
            default
        }
    }
}

pub(crate) fn resolve_mamode(raw: Option<&str>, default: MaMode) -> MaMode {
    raw.map(MaMode::from_name).unwrap_or(default)
}

/// Accelerated computation is preferred unless explicitly disabled.
pub(crate) fn resolve_accelerated(raw: Option<bool>) -> bool {
    raw.unwrap_or(true)
}

/// Bias (BIAS) parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BiasParams {
    /// Moving-average window. Default: 26.
    pub length: Option<i64>,
    /// Moving-average variant. Default: `sma`.
    pub mamode: Option<String>,
    /// Result shift. Default: 0.
    pub offset: Option<i64>,
    /// Constant fill value.
    pub fillna: Option<f64>,
    /// Fill propagation method.
    pub fill_method: Option<FillMethod>,
}

/// Normalized Average True Range (NATR) parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NatrParams {
    /// ATR window. Default: 14.
    pub length: Option<i64>,
    /// Magnification factor. Default: 100.
    pub scalar: Option<f64>,
    /// ATR smoothing variant. Default: `ema`.
    pub mamode: Option<String>,
    /// Prefer the accelerated backend when available. Default: true.
    pub accelerated: Option<bool>,
    /// Lag of the previous close in the true range. Default: 1.
    pub drift: Option<i64>,
    /// Result shift. Default: 0.
    pub offset: Option<i64>,
    /// Constant fill value.
    pub fillna: Option<f64>,
    /// Fill propagation method.
    pub fill_method: Option<FillMethod>,
}

/// Ulcer Index (UI) parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiParams {
    /// Drawdown window. Default: 14.
    pub length: Option<i64>,
    /// Drawdown magnification. Default: 100.
    pub scalar: Option<f64>,
    /// Aggregate with a moving average instead of a windowed sum. Default: false.
    pub everget: Option<bool>,
    /// Result shift. Default: 0.
    pub offset: Option<i64>,
    /// Constant fill value.
    pub fillna: Option<f64>,
    /// Fill propagation method.
    pub fill_method: Option<FillMethod>,
}

/// Accumulation/Distribution (AD) parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdParams {
    /// Prefer the accelerated backend when available. Default: true.
    pub accelerated: Option<bool>,
    /// Result shift. Default: 0.
    pub offset: Option<i64>,
    /// Constant fill value.
    pub fillna: Option<f64>,
    /// Fill propagation method.
    pub fill_method: Option<FillMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_fall_back_to_defaults() {
        assert_eq!(resolve_length("length", None, 26), 26);
        assert_eq!(resolve_length("length", Some(0), 26), 26);
        assert_eq!(resolve_length("length", Some(-4), 14), 14);
        assert_eq!(resolve_length("length", Some(5), 14), 5);
    }

    #[test]
    fn scalars_fall_back_to_defaults() {
        assert_eq!(resolve_scalar("scalar", None, 100.0), 100.0);
        assert_eq!(resolve_scalar("scalar", Some(-1.0), 100.0), 100.0);
        assert_eq!(resolve_scalar("scalar", Some(f64::NAN), 100.0), 100.0);
        assert_eq!(resolve_scalar("scalar", Some(50.0), 100.0), 50.0);
    }

    #[test]
    fn accelerated_defaults_to_true() {
        assert!(resolve_accelerated(None));
        assert!(!resolve_accelerated(Some(false)));
    }

    #[test]
    fn offset_runs_before_fill() {
        let post = PostProcess::resolve(Some(1), Some(0.0), None);
        let series = post.apply(Series::from_vec(vec![1.0, 2.0, 3.0]));
        assert_eq!(series.to_vec(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn constant_fill_precedes_method_fill() {
        let post = PostProcess::resolve(None, Some(-1.0), Some(FillMethod::Forward));
        let series = post.apply(Series::from_vec(vec![f64::NAN, 2.0, f64::NAN]));
        assert_eq!(series.to_vec(), vec![-1.0, 2.0, -1.0]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed: Result<BiasParams, _> = toml::from_str("length = 10\nlenght = 4\n");
        assert!(parsed.is_err());

        let parsed: UiParams = toml::from_str("length = 10\neverget = true\nfill_method = \"pad\"\n").unwrap();
        assert_eq!(parsed.length, Some(10));
        assert_eq!(parsed.everget, Some(true));
        assert_eq!(parsed.fill_method, Some(FillMethod::Forward));
    }
}
