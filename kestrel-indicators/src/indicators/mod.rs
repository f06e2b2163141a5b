//! Built-in indicator implementations provided by the crate.

pub mod ad;
pub mod atr;
pub mod bias;
pub mod natr;
pub mod ui;

pub use ad::{ad, ad_with, non_zero_range, Ad};
pub use atr::{atr, true_range};
pub use bias::{bias, bias_with, Bias};
pub use natr::{natr, natr_with, Natr};
pub use ui::{ui, ui_with, Ui};
