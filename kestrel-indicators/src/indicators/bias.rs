//! Bias (BIAS): rate of change between the close and its moving average.

use kestrel_core::{Column, Series};

use crate::accel::{capabilities, Capabilities};
use crate::core::{
    Category, Computation, Indicator, IndicatorResult, IndicatorSeries, Inputs, Requirement,
};
use crate::ma::{ma, MaMode};
use crate::params::{resolve_length, resolve_mamode, BiasParams, PostProcess};
use crate::pipeline::run;

/// Defaulted Bias parameters: `close / MA(close, length) - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bias {
    length: usize,
    mamode: MaMode,
    post: PostProcess,
}

impl Bias {
    /// Window used when `length` is absent or invalid.
    pub const DEFAULT_LENGTH: usize = 26;
    /// Moving average used when `mamode` is absent.
    pub const DEFAULT_MAMODE: MaMode = MaMode::Sma;

    /// Sanitizes raw parameters, substituting defaults for invalid values.
    pub fn new(params: &BiasParams) -> Self {
        Self {
            length: resolve_length("length", params.length, Self::DEFAULT_LENGTH),
            mamode: resolve_mamode(params.mamode.as_deref(), Self::DEFAULT_MAMODE),
            post: PostProcess::resolve(params.offset, params.fillna, params.fill_method),
        }
    }

    /// Resolved window.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Resolved moving average.
    pub fn mamode(&self) -> MaMode {
        self.mamode
    }
}

impl Default for Bias {
    fn default() -> Self {
        Self::new(&BiasParams::default())
    }
}

impl Indicator for Bias {
    fn mnemonic(&self) -> &'static str {
        "BIAS"
    }

    fn category(&self) -> Category {
        Category::Momentum
    }

    fn requirements(&self, _inputs: &Inputs<'_>) -> Vec<Requirement> {
        vec![Requirement::at_least(Column::Close, self.length)]
    }

    fn post_process(&self) -> &PostProcess {
        &self.post
    }

    fn label(&self, _inputs: &Inputs<'_>) -> String {
        format!("BIAS_{}", self.mamode.label(self.length))
    }

    fn compute(
        &self,
        inputs: &Inputs<'_>,
        capabilities: &Capabilities,
    ) -> IndicatorResult<Computation> {
        let close = inputs.require(self.mnemonic(), Column::Close)?;
        let average = ma(self.mamode, close, self.length).replace_zero(capabilities.epsilon());
        Ok(Computation::internal(close / &average - 1.0))
    }
}

/// Bias of `close` using the process-wide capabilities.
pub fn bias(close: &Series, params: &BiasParams) -> IndicatorResult<IndicatorSeries> {
    bias_with(capabilities(), close, params)
}

/// Bias of `close` using explicit capabilities.
pub fn bias_with(
    capabilities: &Capabilities,
    close: &Series,
    params: &BiasParams,
) -> IndicatorResult<IndicatorSeries> {
    let inputs = Inputs::new().with(Column::Close, close);
    run(&Bias::new(params), &inputs, capabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close() -> Series {
        Series::from_vec(vec![10.0, 11.0, 9.0, 12.0, 8.0, 15.0, 14.0, 16.0, 13.0, 17.0])
    }

    fn params(length: i64) -> BiasParams {
        BiasParams {
            length: Some(length),
            mamode: Some("sma".to_string()),
            ..BiasParams::default()
        }
    }

    #[test]
    fn ratio_to_simple_average() {
        let out = bias(&close(), &params(4)).unwrap();
        assert_eq!(out.name, "BIAS_SMA_4");
        assert_eq!(out.category, Category::Momentum);
        assert_eq!(out.len(), 10);
        assert!(out.series.is_null(2));
        let expected = 12.0 / 10.5 - 1.0;
        assert!((out.series.get(3).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn defaults_repair_invalid_parameters() {
        let bias = Bias::new(&BiasParams {
            length: Some(-3),
            mamode: None,
            ..BiasParams::default()
        });
        assert_eq!(bias.length(), 26);
        assert_eq!(bias.mamode(), MaMode::Sma);
    }

    #[test]
    fn short_input_returns_insufficient_data() {
        let close = Series::from_vec(vec![1.0, 2.0, 3.0]);
        let err = bias(&close, &BiasParams::default()).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn zero_average_stays_finite() {
        let flat = Series::from_vec(vec![0.0; 5]);
        let out = bias(&flat, &params(2)).unwrap();
        assert!(out.series.iter().flatten().all(f64::is_finite));
        assert_eq!(out.series.get(4), Some(-1.0));
    }
}
