//! Normalized Average True Range (NATR): ATR expressed relative to the close.

use kestrel_core::{Column, Series};
use tracing::debug;

use crate::accel::{capabilities, Capabilities, NatrKernel};
use crate::core::{
    Category, Computation, Indicator, IndicatorResult, IndicatorSeries, Inputs, Requirement,
};
use crate::indicators::atr::atr;
use crate::ma::MaMode;
use crate::params::{
    resolve_accelerated, resolve_length, resolve_mamode, resolve_scalar, NatrParams, PostProcess,
};
use crate::pipeline::run;

/// Defaulted NATR parameters: `scalar / close * ATR(high, low, close, length)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Natr {
    length: usize,
    scalar: f64,
    mamode: MaMode,
    drift: usize,
    accelerated: bool,
    post: PostProcess,
}

impl Natr {
    /// Window used when `length` is absent or invalid.
    pub const DEFAULT_LENGTH: usize = 14;
    /// Magnification used when `scalar` is absent or invalid.
    pub const DEFAULT_SCALAR: f64 = 100.0;
    /// Moving average used when `mamode` is absent.
    pub const DEFAULT_MAMODE: MaMode = MaMode::Ema;
    /// Lag used when `drift` is absent or invalid.
    pub const DEFAULT_DRIFT: usize = 1;

    /// Sanitizes raw parameters, substituting defaults for invalid values.
    pub fn new(params: &NatrParams) -> Self {
        Self {
            length: resolve_length("length", params.length, Self::DEFAULT_LENGTH),
            scalar: resolve_scalar("scalar", params.scalar, Self::DEFAULT_SCALAR),
            mamode: resolve_mamode(params.mamode.as_deref(), Self::DEFAULT_MAMODE),
            drift: resolve_length("drift", params.drift, Self::DEFAULT_DRIFT),
            accelerated: resolve_accelerated(params.accelerated),
            post: PostProcess::resolve(params.offset, params.fillna, params.fill_method),
        }
    }

    /// Resolved window.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Resolved lag of the previous close.
    pub fn drift(&self) -> usize {
        self.drift
    }

    /// Resolved magnification.
    pub fn scalar(&self) -> f64 {
        self.scalar
    }

    fn kernel(&self, epsilon: f64) -> NatrKernel {
        NatrKernel {
            length: self.length,
            scalar: self.scalar,
            mamode: self.mamode,
            drift: self.drift,
            epsilon,
        }
    }
}

impl Default for Natr {
    fn default() -> Self {
        Self::new(&NatrParams::default())
    }
}

impl Indicator for Natr {
    fn mnemonic(&self) -> &'static str {
        "NATR"
    }

    fn category(&self) -> Category {
        Category::Volatility
    }

    fn requirements(&self, _inputs: &Inputs<'_>) -> Vec<Requirement> {
        [Column::High, Column::Low, Column::Close]
            .into_iter()
            .map(|column| Requirement::at_least(column, self.length))
            .collect()
    }

    fn post_process(&self) -> &PostProcess {
        &self.post
    }

    fn label(&self, _inputs: &Inputs<'_>) -> String {
        format!("NATR_{}", self.length)
    }

    fn compute(
        &self,
        inputs: &Inputs<'_>,
        capabilities: &Capabilities,
    ) -> IndicatorResult<Computation> {
        let high = inputs.require(self.mnemonic(), Column::High)?;
        let low = inputs.require(self.mnemonic(), Column::Low)?;
        let close = inputs.require(self.mnemonic(), Column::Close)?;
        let epsilon = capabilities.epsilon();

        if let Some(backend) = capabilities.accelerated(self.accelerated) {
            match backend.natr(high, low, close, &self.kernel(epsilon)) {
                Some(series) => {
                    debug!(backend = backend.name(), "computed NATR with accelerated backend");
                    return Ok(Computation::accelerated(series));
                }
                None => {
                    debug!(backend = backend.name(), mamode = %self.mamode, "backend declined NATR");
                }
            }
        }

        let scalar = self.scalar;
        let normalizer = close.replace_zero(epsilon).map(|price| scalar / price);
        let range = atr(high, low, close, self.length, self.mamode, self.drift);
        Ok(Computation::internal(normalizer * &range))
    }
}

/// NATR using the process-wide capabilities.
pub fn natr(
    high: &Series,
    low: &Series,
    close: &Series,
    params: &NatrParams,
) -> IndicatorResult<IndicatorSeries> {
    natr_with(capabilities(), high, low, close, params)
}

/// NATR using explicit capabilities.
pub fn natr_with(
    capabilities: &Capabilities,
    high: &Series,
    low: &Series,
    close: &Series,
    params: &NatrParams,
) -> IndicatorResult<IndicatorSeries> {
    let inputs = Inputs::new()
        .with(Column::High, high)
        .with(Column::Low, low)
        .with(Column::Close, close);
    run(&Natr::new(params), &inputs, capabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat() -> Series {
        Series::from_vec(vec![5.0; 4])
    }

    fn params(accelerated: bool) -> NatrParams {
        NatrParams {
            length: Some(2),
            accelerated: Some(accelerated),
            ..NatrParams::default()
        }
    }

    #[test]
    fn flat_series_is_finite_and_zero() {
        let caps = Capabilities::internal_only();
        let out = natr_with(&caps, &flat(), &flat(), &flat(), &params(false)).unwrap();
        assert_eq!(out.name, "NATR_2");
        assert_eq!(out.category, Category::Volatility);
        assert_eq!(out.len(), 4);
        let values: Vec<f64> = out.series.iter().flatten().collect();
        assert!(!values.is_empty());
        assert!(values.iter().all(|value| value.is_finite() && value.abs() < 1e-9));
    }

    #[test]
    fn declining_accelerated_backend_falls_back() {
        let caps = Capabilities::default();
        let natr = Natr::new(&NatrParams {
            length: Some(2),
            mamode: Some("tema".to_string()),
            ..NatrParams::default()
        });
        let (h, l, c) = (flat(), flat(), flat());
        let inputs = Inputs::new()
            .with(Column::High, &h)
            .with(Column::Low, &l)
            .with(Column::Close, &c);
        let computed = natr.compute(&inputs, &caps).unwrap();
        assert_eq!(computed.strategy, crate::accel::ComputationStrategy::Internal);
    }

    #[test]
    fn zero_close_does_not_blow_up() {
        let high = Series::from_vec(vec![1.0, 1.0, 1.0, 1.0]);
        let low = Series::from_vec(vec![0.0; 4]);
        let close = Series::from_vec(vec![0.5, 0.0, 0.5, 0.0]);
        let caps = Capabilities::internal_only();
        let out = natr_with(&caps, &high, &low, &close, &params(false)).unwrap();
        assert!(out.series.iter().flatten().all(f64::is_finite));
    }

    #[test]
    fn defaults() {
        let natr = Natr::default();
        assert_eq!(natr.length(), 14);
        assert_eq!(natr.scalar(), 100.0);
        assert_eq!(natr.drift(), 1);
    }

    #[test]
    fn non_positive_drift_falls_back_to_one() {
        for drift in [0, -3] {
            let natr = Natr::new(&NatrParams {
                drift: Some(drift),
                ..NatrParams::default()
            });
            assert_eq!(natr.drift(), Natr::DEFAULT_DRIFT);
        }
        let natr = Natr::new(&NatrParams {
            drift: Some(2),
            ..NatrParams::default()
        });
        assert_eq!(natr.drift(), 2);
    }
}
