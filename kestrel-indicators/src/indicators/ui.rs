//! Ulcer Index (UI): quadratic mean of percentage drawdowns from the rolling high.

use kestrel_core::{Column, Series};

use crate::accel::{capabilities, Capabilities};
use crate::core::{
    Category, Computation, Indicator, IndicatorResult, IndicatorSeries, Inputs, Requirement,
};
use crate::ma::{ma, MaMode};
use crate::params::{resolve_length, resolve_scalar, PostProcess, UiParams};
use crate::pipeline::run;

/// Defaulted Ulcer Index parameters.
///
/// With `everget` the squared drawdowns are smoothed with a simple moving
/// average before the division by `length`, instead of being summed. The two
/// aggregations produce different values and are named `UI_n` and `UIe_n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ui {
    length: usize,
    scalar: f64,
    everget: bool,
    post: PostProcess,
}

impl Ui {
    /// Window used when `length` is absent or invalid.
    pub const DEFAULT_LENGTH: usize = 14;
    /// Magnification used when `scalar` is absent or invalid.
    pub const DEFAULT_SCALAR: f64 = 100.0;

    /// Sanitizes raw parameters, substituting defaults for invalid values.
    pub fn new(params: &UiParams) -> Self {
        Self {
            length: resolve_length("length", params.length, Self::DEFAULT_LENGTH),
            scalar: resolve_scalar("scalar", params.scalar, Self::DEFAULT_SCALAR),
            everget: params.everget.unwrap_or(false),
            post: PostProcess::resolve(params.offset, params.fillna, params.fill_method),
        }
    }

    /// Resolved window.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Whether squared drawdowns are smoothed instead of summed.
    pub fn everget(&self) -> bool {
        self.everget
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new(&UiParams::default())
    }
}

impl Indicator for Ui {
    fn mnemonic(&self) -> &'static str {
        "UI"
    }

    fn category(&self) -> Category {
        Category::Volatility
    }

    fn requirements(&self, _inputs: &Inputs<'_>) -> Vec<Requirement> {
        vec![Requirement::at_least(Column::Close, self.length)]
    }

    fn post_process(&self) -> &PostProcess {
        &self.post
    }

    fn label(&self, _inputs: &Inputs<'_>) -> String {
        let suffix = if self.everget { "e" } else { "" };
        format!("UI{suffix}_{}", self.length)
    }

    fn compute(
        &self,
        inputs: &Inputs<'_>,
        capabilities: &Capabilities,
    ) -> IndicatorResult<Computation> {
        let close = inputs.require(self.mnemonic(), Column::Close)?;
        let highest_close = close.rolling_max(self.length);
        let downside =
            (close - &highest_close) * self.scalar / &highest_close.replace_zero(capabilities.epsilon());
        let squared = &downside * &downside;

        let divisor = self.length as f64;
        let aggregate = if self.everget {
            ma(MaMode::Sma, &squared, self.length) / divisor
        } else {
            squared.rolling_sum(self.length) / divisor
        };
        Ok(Computation::internal(aggregate.sqrt()))
    }
}

/// Ulcer Index using the process-wide capabilities.
pub fn ui(close: &Series, params: &UiParams) -> IndicatorResult<IndicatorSeries> {
    ui_with(capabilities(), close, params)
}

/// Ulcer Index using explicit capabilities.
pub fn ui_with(
    capabilities: &Capabilities,
    close: &Series,
    params: &UiParams,
) -> IndicatorResult<IndicatorSeries> {
    let inputs = Inputs::new().with(Column::Close, close);
    run(&Ui::new(params), &inputs, capabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close() -> Series {
        Series::from_vec(vec![10.0, 8.0, 9.0, 6.0, 7.0])
    }

    #[test]
    fn sums_squared_drawdowns() {
        let out = ui(&close(), &UiParams { length: Some(2), ..UiParams::default() }).unwrap();
        assert_eq!(out.name, "UI_2");
        assert_eq!(out.category, Category::Volatility);
        // drawdowns from the 2-period high: -, -20%, 0%, -33.3%, 0%
        assert!(out.series.is_null(1));
        let expected = (400.0_f64 / 2.0).sqrt();
        assert!((out.series.get(2).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn everget_changes_aggregation_and_name() {
        let params = UiParams {
            length: Some(2),
            everget: Some(true),
            ..UiParams::default()
        };
        let out = ui(&close(), &params).unwrap();
        assert_eq!(out.name, "UIe_2");
        // mean of squares divided by length again
        let expected = (400.0_f64 / 2.0 / 2.0).sqrt();
        assert!((out.series.get(2).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn never_negative() {
        let out = ui(&close(), &UiParams { length: Some(2), ..UiParams::default() }).unwrap();
        assert!(out.series.iter().flatten().all(|value| value >= 0.0));
    }
}
