//! Foundational traits and types shared by every indicator.

use std::fmt;

use kestrel_core::{Column, Frame, Series};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::accel::{Capabilities, ComputationStrategy};
use crate::params::PostProcess;

/// Result alias used by indicator entry points.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// Conditions under which an indicator declines to produce a result.
///
/// Invalid parameters and zero denominators are repaired instead of reported,
/// so these are the only ways a call can come back empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// An input column is missing or has too few non-null observations.
    #[error("{indicator}: insufficient {column} data (required {required}, available {available})")]
    InsufficientData {
        /// Indicator mnemonic.
        indicator: &'static str,
        /// Offending input column.
        column: Column,
        /// Minimum number of non-null observations.
        required: usize,
        /// Observations actually supplied.
        available: usize,
    },
    /// An input column does not share the positional index of the others.
    #[error("{indicator}: {column} has {found} positions, expected {expected}")]
    Misaligned {
        /// Indicator mnemonic.
        indicator: &'static str,
        /// Offending input column.
        column: Column,
        /// Length of the reference column.
        expected: usize,
        /// Length of the offending column.
        found: usize,
    },
}

impl IndicatorError {
    /// Helper for a column that was not supplied at all.
    pub fn missing(indicator: &'static str, column: Column) -> Self {
        Self::InsufficientData {
            indicator,
            column,
            required: 1,
            available: 0,
        }
    }

    /// Returns `true` when the call was rejected for lack of data.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// Domain tag attached to every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Candlestick patterns.
    Candles,
    /// Cycle detection.
    Cycles,
    /// Rate-of-change style oscillators.
    Momentum,
    /// Indicators plotted over price, such as moving averages.
    Overlap,
    /// Return and drawdown measures.
    Performance,
    /// Rolling statistics.
    Statistics,
    /// Trend direction and strength.
    Trend,
    /// Range and dispersion measures.
    Volatility,
    /// Volume-weighted measures.
    Volume,
}

impl Category {
    /// Lowercase tag as used in labels and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Candles => "candles",
            Self::Cycles => "cycles",
            Self::Momentum => "momentum",
            Self::Overlap => "overlap",
            Self::Performance => "performance",
            Self::Statistics => "statistics",
            Self::Trend => "trend",
            Self::Volatility => "volatility",
            Self::Volume => "volume",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A computed series with its generated name and category.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    /// Identifier encoding the indicator and its key parameters, e.g. `BIAS_SMA_26`.
    pub name: String,
    /// Domain tag.
    pub category: Category,
    /// Output values, one per input position.
    pub series: Series,
}

impl IndicatorSeries {
    /// Number of output positions.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns `true` when the output has no positions.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Borrowed OHLCV columns handed to an indicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inputs<'a> {
    /// Opening prices.
    pub open: Option<&'a Series>,
    /// Period highs.
    pub high: Option<&'a Series>,
    /// Period lows.
    pub low: Option<&'a Series>,
    /// Closing prices.
    pub close: Option<&'a Series>,
    /// Traded volume.
    pub volume: Option<&'a Series>,
}

impl<'a> Inputs<'a> {
    /// Inputs with no columns attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a column, replacing any previous one.
    #[must_use]
    pub fn with(mut self, column: Column, series: &'a Series) -> Self {
        let slot = match column {
            Column::Open => &mut self.open,
            Column::High => &mut self.high,
            Column::Low => &mut self.low,
            Column::Close => &mut self.close,
            Column::Volume => &mut self.volume,
        };
        *slot = Some(series);
        self
    }

    /// Looks up a column.
    pub fn column(&self, column: Column) -> Option<&'a Series> {
        match column {
            Column::Open => self.open,
            Column::High => self.high,
            Column::Low => self.low,
            Column::Close => self.close,
            Column::Volume => self.volume,
        }
    }

    /// Looks up a column that validation has already confirmed.
    pub fn require(&self, indicator: &'static str, column: Column) -> IndicatorResult<&'a Series> {
        self.column(column)
            .ok_or_else(|| IndicatorError::missing(indicator, column))
    }
}

impl<'a> From<&'a Frame> for Inputs<'a> {
    fn from(frame: &'a Frame) -> Self {
        Column::ALL
            .iter()
            .fold(Inputs::new(), |inputs, column| match frame.column(*column) {
                Some(series) => inputs.with(*column, series),
                None => inputs,
            })
    }
}

/// Declares that an indicator needs `column` with at least `min_observations`
/// non-null values. Zero means the column only has to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    /// Required column.
    pub column: Column,
    /// Minimum non-null observations.
    pub min_observations: usize,
}

impl Requirement {
    /// Requires at least `min_observations` non-null values.
    pub fn at_least(column: Column, min_observations: usize) -> Self {
        Self {
            column,
            min_observations,
        }
    }

    /// Requires only that the column is supplied.
    pub fn present(column: Column) -> Self {
        Self::at_least(column, 0)
    }
}

/// Raw output of a computation core together with the path that produced it.
#[derive(Debug, Clone)]
pub struct Computation {
    /// Values before offset and fill are applied.
    pub series: Series,
    /// Path that produced the values.
    pub strategy: ComputationStrategy,
}

impl Computation {
    /// Output of the internal, composed computation.
    pub fn internal(series: Series) -> Self {
        Self {
            series,
            strategy: ComputationStrategy::Internal,
        }
    }

    /// Output delegated to an accelerated backend.
    pub fn accelerated(series: Series) -> Self {
        Self {
            series,
            strategy: ComputationStrategy::Accelerated,
        }
    }
}

/// Contract every indicator implements to run through [`crate::pipeline::run`].
///
/// Implementations are constructed from already-defaulted parameters and hold
/// no state between calls.
pub trait Indicator {
    /// Short upper-case identifier used in errors and logs.
    fn mnemonic(&self) -> &'static str;

    /// Domain tag attached to the result.
    fn category(&self) -> Category;

    /// Columns the computation reads and how many observations each needs.
    fn requirements(&self, inputs: &Inputs<'_>) -> Vec<Requirement>;

    /// Offset and fill applied after computation.
    fn post_process(&self) -> &PostProcess;

    /// Output name, which may depend on which optional inputs were supplied.
    fn label(&self, inputs: &Inputs<'_>) -> String;

    /// Indicator-specific formula over validated inputs.
    fn compute(&self, inputs: &Inputs<'_>, capabilities: &Capabilities)
        -> IndicatorResult<Computation>;
}
