#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

//! Technical indicators computed through one shared pipeline: validate inputs,
//! compute, offset, fill, then label.

/// Selection between the internal and accelerated computation paths.
pub mod accel;
/// Foundational traits and shared abstractions.
pub mod core;
/// Built-in indicator implementations.
pub mod indicators;
/// Moving-average dispatcher.
pub mod ma;
/// Raw parameter sets and defaulting rules.
pub mod params;
/// The validate → compute → post-process sequence.
pub mod pipeline;

/// Re-export of the capability types to make backend selection easy to configure.
pub use crate::accel::{capabilities, AcceleratedBackend, Capabilities, ComputationStrategy};
/// Re-export of the core traits and error type to make the crate easy to consume.
pub use crate::core::{
    Category, Indicator, IndicatorError, IndicatorResult, IndicatorSeries, Inputs,
};
/// Re-export of the indicator entry points.
pub use crate::indicators::{ad, bias, natr, ui};
/// Re-export of the raw parameter sets.
pub use crate::params::{AdParams, BiasParams, NatrParams, UiParams};
/// Re-export of the pipeline driver.
pub use crate::pipeline::run;
