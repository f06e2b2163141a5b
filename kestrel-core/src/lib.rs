//! Core data types for the Kestrel indicator library: the positional `Series`
//! container, OHLCV candles, and column frames.

pub mod fill;
pub mod frame;
pub mod series;

pub use fill::{FillMethod, UnknownFillMethod};
pub use frame::{Candle, Column, Frame};
pub use series::Series;
