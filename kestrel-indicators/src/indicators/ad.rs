//! Accumulation/Distribution (AD): volume-weighted position of the close within
//! its range, accumulated over the whole series.

use kestrel_core::{Column, Series};
use tracing::debug;

use crate::accel::{capabilities, Capabilities};
use crate::core::{
    Category, Computation, Indicator, IndicatorResult, IndicatorSeries, Inputs, Requirement,
};
use crate::params::{resolve_accelerated, AdParams, PostProcess};
use crate::pipeline::run;

/// Defaulted Accumulation/Distribution parameters.
///
/// When an open series is supplied the money-flow term is `close - open`
/// (named `ADo`); otherwise it is `2 * close - (high + low)` (named `AD`).
#[derive(Debug, Clone, PartialEq)]
pub struct Ad {
    accelerated: bool,
    post: PostProcess,
}

impl Ad {
    /// Sanitizes raw parameters, substituting defaults for invalid values.
    pub fn new(params: &AdParams) -> Self {
        Self {
            accelerated: resolve_accelerated(params.accelerated),
            post: PostProcess::resolve(params.offset, params.fillna, params.fill_method),
        }
    }
}

impl Default for Ad {
    fn default() -> Self {
        Self::new(&AdParams::default())
    }
}

impl Indicator for Ad {
    fn mnemonic(&self) -> &'static str {
        "AD"
    }

    fn category(&self) -> Category {
        Category::Volume
    }

    fn requirements(&self, inputs: &Inputs<'_>) -> Vec<Requirement> {
        let mut columns = vec![Column::High, Column::Low, Column::Close, Column::Volume];
        if inputs.open.is_some() {
            columns.push(Column::Open);
        }
        columns.into_iter().map(Requirement::present).collect()
    }

    fn post_process(&self) -> &PostProcess {
        &self.post
    }

    fn label(&self, inputs: &Inputs<'_>) -> String {
        match inputs.open {
            Some(_) => "ADo".to_string(),
            None => "AD".to_string(),
        }
    }

    fn compute(
        &self,
        inputs: &Inputs<'_>,
        capabilities: &Capabilities,
    ) -> IndicatorResult<Computation> {
        let high = inputs.require(self.mnemonic(), Column::High)?;
        let low = inputs.require(self.mnemonic(), Column::Low)?;
        let close = inputs.require(self.mnemonic(), Column::Close)?;
        let volume = inputs.require(self.mnemonic(), Column::Volume)?;
        let epsilon = capabilities.epsilon();

        // Backends only implement the high/low/close form.
        if let (None, Some(backend)) = (inputs.open, capabilities.accelerated(self.accelerated)) {
            if let Some(series) = backend.ad(high, low, close, volume, epsilon) {
                debug!(backend = backend.name(), "computed AD with accelerated backend");
                return Ok(Computation::accelerated(series));
            }
            debug!(backend = backend.name(), "backend declined AD");
        }

        let flow = match inputs.open {
            Some(open) => non_zero_range(close, open, epsilon),
            None => close * 2.0 - &(high + low),
        };
        let range = non_zero_range(high, low, epsilon);
        let weighted = flow * &(volume / &range);
        Ok(Computation::internal(weighted.cumsum()))
    }
}

/// `upper - lower`, with exact zeros replaced by `epsilon`.
///
/// # Panics
///
/// Panics when the two series are not aligned.
pub fn non_zero_range(upper: &Series, lower: &Series, epsilon: f64) -> Series {
    (upper - lower).replace_zero(epsilon)
}

/// AD using the process-wide capabilities. Pass `open` for the `ADo` variant.
pub fn ad(
    high: &Series,
    low: &Series,
    close: &Series,
    volume: &Series,
    open: Option<&Series>,
    params: &AdParams,
) -> IndicatorResult<IndicatorSeries> {
    ad_with(capabilities(), high, low, close, volume, open, params)
}

/// AD using explicit capabilities.
pub fn ad_with(
    capabilities: &Capabilities,
    high: &Series,
    low: &Series,
    close: &Series,
    volume: &Series,
    open: Option<&Series>,
    params: &AdParams,
) -> IndicatorResult<IndicatorSeries> {
    let mut inputs = Inputs::new()
        .with(Column::High, high)
        .with(Column::Low, low)
        .with(Column::Close, close)
        .with(Column::Volume, volume);
    inputs.open = open;
    run(&Ad::new(params), &inputs, capabilities)
}
