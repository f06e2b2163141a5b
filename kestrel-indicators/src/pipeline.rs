//! The fixed validate → compute → offset → fill → label sequence.

use kestrel_core::Column;
use tracing::debug;

use crate::accel::Capabilities;
use crate::core::{
    Computation, Indicator, IndicatorError, IndicatorResult, IndicatorSeries, Inputs,
};

/// Runs `indicator` over `inputs`.
///
/// Returns [`IndicatorError::InsufficientData`] without computing anything
/// when an input is missing or too short.
pub fn run<I>(
    indicator: &I,
    inputs: &Inputs<'_>,
    capabilities: &Capabilities,
) -> IndicatorResult<IndicatorSeries>
where
    I: Indicator + ?Sized,
{
    if let Err(err) = validate(indicator, inputs) {
        debug!(indicator = indicator.mnemonic(), error = %err, "rejected indicator input");
        return Err(err);
    }

    let Computation { series, strategy } = indicator.compute(inputs, capabilities)?;
    let series = indicator.post_process().apply(series);
    let name = indicator.label(inputs);
    debug!(indicator = %name, ?strategy, len = series.len(), "computed indicator");

    Ok(IndicatorSeries {
        name,
        category: indicator.category(),
        series,
    })
}

/// Checks presence, observation counts and alignment of every required column.
pub fn validate<I>(indicator: &I, inputs: &Inputs<'_>) -> IndicatorResult<()>
where
    I: Indicator + ?Sized,
{
    let mnemonic = indicator.mnemonic();
    let mut reference: Option<(Column, usize)> = None;

    for requirement in indicator.requirements(inputs) {
        let series = inputs
            .column(requirement.column)
            .ok_or_else(|| IndicatorError::missing(mnemonic, requirement.column))?;

        let available = series.valid_count();
        if available < requirement.min_observations {
            return Err(IndicatorError::InsufficientData {
                indicator: mnemonic,
                column: requirement.column,
                required: requirement.min_observations,
                available,
            });
        }

        match reference {
            None => reference = Some((requirement.column, series.len())),
            Some((_, expected)) if expected != series.len() => {
                return Err(IndicatorError::Misaligned {
                    indicator: mnemonic,
                    column: requirement.column,
                    expected,
                    found: series.len(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}
