//! Positional numeric series backed by `ndarray`.

use std::ops::{Add, Div, Mul, Sub};

use ndarray::{s, Array1, ArrayView1, Zip};
use num_traits::ToPrimitive;

use crate::fill::FillMethod;

/// Ordered vector of `f64` observations aligned by position.
///
/// Null entries are stored as `NaN`; every operation treats `NaN` as "no value"
/// rather than as a number, mirroring dataframe semantics.
///
/// Arithmetic between two series pairs positions one to one. It panics when
/// the lengths differ; a single value is never broadcast.
#[derive(Debug, Clone, Default)]
pub struct Series {
    values: Array1<f64>,
}

impl Series {
    /// Wraps an owned vector of observations.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self {
            values: Array1::from(values),
        }
    }

    /// Wraps an existing `ndarray` vector.
    pub fn from_array(values: Array1<f64>) -> Self {
        Self { values }
    }

    /// Converts any primitive numeric values, mapping unconvertible entries to null.
    pub fn from_numbers<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToPrimitive,
    {
        values
            .into_iter()
            .map(|value| value.to_f64().unwrap_or(f64::NAN))
            .collect()
    }

    /// A series of `len` null entries.
    pub fn nulls(len: usize) -> Self {
        Self {
            values: Array1::from_elem(len, f64::NAN),
        }
    }

    /// Number of positions, null or not.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the series has no positions at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, or `None` when out of bounds or null.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|value| !value.is_nan())
    }

    /// Returns `true` when the entry at `index` is null or out of bounds.
    pub fn is_null(&self, index: usize) -> bool {
        self.get(index).is_none()
    }

    /// Borrowed view of the raw values (nulls are `NaN`).
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Consumes the series and returns the backing array.
    pub fn into_array(self) -> Array1<f64> {
        self.values
    }

    /// Copies the raw values into a `Vec`.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    /// Iterates positions, yielding `None` for nulls.
    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values
            .iter()
            .map(|value| (!value.is_nan()).then_some(*value))
    }

    /// Number of null entries.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_nan()).count()
    }

    /// Number of non-null entries.
    pub fn valid_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Index of the first non-null entry.
    pub fn first_valid_index(&self) -> Option<usize> {
        self.values.iter().position(|value| !value.is_nan())
    }

    /// Two series are aligned when they share the same positional index.
    pub fn is_aligned_with(&self, other: &Series) -> bool {
        self.len() == other.len()
    }

    #[track_caller]
    fn assert_aligned(&self, other: &Series) {
        assert!(
            self.is_aligned_with(other),
            "series are not aligned: {} vs {} positions",
            self.len(),
            other.len()
        );
    }

    /// Positional equality where two nulls compare equal.
    pub fn identical(&self, other: &Series) -> bool {
        self.is_aligned_with(other)
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| (a.is_nan() && b.is_nan()) || a == b)
    }

    /// Applies `f` to every entry, nulls included.
    pub fn map<F>(&self, f: F) -> Series
    where
        F: FnMut(f64) -> f64,
    {
        Self {
            values: self.values.mapv(f),
        }
    }

    /// Combines two aligned series entry by entry.
    ///
    /// # Panics
    ///
    /// Panics when the series are not aligned.
    pub fn zip_with<F>(&self, other: &Series, mut f: F) -> Series
    where
        F: FnMut(f64, f64) -> f64,
    {
        self.assert_aligned(other);
        Self {
            values: Zip::from(&self.values)
                .and(&other.values)
                .map_collect(|&a, &b| f(a, b)),
        }
    }

    /// Square root of every entry; negatives become null.
    pub fn sqrt(&self) -> Series {
        self.map(f64::sqrt)
    }

    /// Largest value over each trailing window of `window` positions.
    pub fn rolling_max(&self, window: usize) -> Series {
        self.rolling(window, |view| {
            view.fold(f64::NEG_INFINITY, |acc, &value| acc.max(value))
        })
    }

    /// Sum over each trailing window of `window` positions.
    pub fn rolling_sum(&self, window: usize) -> Series {
        self.rolling(window, |view| view.sum())
    }

    /// Arithmetic mean over each trailing window of `window` positions.
    pub fn rolling_mean(&self, window: usize) -> Series {
        let divisor = window as f64;
        self.rolling(window, |view| view.sum() / divisor)
    }

    /// Evaluates `aggregate` over complete, null-free trailing windows.
    ///
    /// Positions whose window is incomplete or contains a null stay null.
    pub fn rolling<F>(&self, window: usize, aggregate: F) -> Series
    where
        F: for<'a> Fn(ArrayView1<'a, f64>) -> f64,
    {
        let len = self.len();
        let mut out = Array1::from_elem(len, f64::NAN);
        if window == 0 || window > len {
            return Self { values: out };
        }
        for (start, view) in self.values.windows(window).into_iter().enumerate() {
            if view.iter().any(|value| value.is_nan()) {
                continue;
            }
            out[start + window - 1] = aggregate(view);
        }
        Self { values: out }
    }

    /// Running total that skips nulls; null positions remain null.
    pub fn cumsum(&self) -> Series {
        let mut total = 0.0;
        self.map(|value| {
            if value.is_nan() {
                value
            } else {
                total += value;
                total
            }
        })
    }

    /// Moves values by `periods` positions, padding the exposed edge with nulls.
    ///
    /// Positive periods move values towards later positions. Length is preserved.
    pub fn shift(&self, periods: i64) -> Series {
        let len = self.len();
        let magnitude = usize::try_from(periods.unsigned_abs()).unwrap_or(usize::MAX);
        let mut out = Array1::from_elem(len, f64::NAN);
        if magnitude >= len {
            return Self { values: out };
        }
        if periods >= 0 {
            out.slice_mut(s![magnitude..])
                .assign(&self.values.slice(s![..len - magnitude]));
        } else {
            out.slice_mut(s![..len - magnitude])
                .assign(&self.values.slice(s![magnitude..]));
        }
        Self { values: out }
    }

    /// Replaces every null with `value`.
    pub fn fill_null(&self, value: f64) -> Series {
        self.map(|entry| if entry.is_nan() { value } else { entry })
    }

    /// Propagates neighbouring values into null positions.
    pub fn fill_method(&self, method: FillMethod) -> Series {
        let mut values = self.values.clone();
        let mut carry = f64::NAN;
        let mut propagate = |entry: &mut f64| {
            if entry.is_nan() {
                *entry = carry;
            } else {
                carry = *entry;
            }
        };
        match method {
            FillMethod::Forward => values.iter_mut().for_each(&mut propagate),
            FillMethod::Backward => values.iter_mut().rev().for_each(&mut propagate),
        }
        Self { values }
    }

    /// Substitutes `epsilon` for entries that are exactly zero.
    pub fn replace_zero(&self, epsilon: f64) -> Series {
        self.map(|value| if value == 0.0 { epsilon } else { value })
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Self::from_vec(values)
    }
}

impl From<Array1<f64>> for Series {
    fn from(values: Array1<f64>) -> Self {
        Self::from_array(values)
    }
}

impl FromIterator<f64> for Series {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

// Series-by-series operators combine positions pairwise and panic when the
// operands are not aligned. Scalar operators apply to every position.
macro_rules! elementwise_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Series> for &Series {
            type Output = Series;

            fn $method(self, rhs: &Series) -> Series {
                self.assert_aligned(rhs);
                Series {
                    values: &self.values $op &rhs.values,
                }
            }
        }

        impl $trait<&Series> for Series {
            type Output = Series;

            fn $method(self, rhs: &Series) -> Series {
                self.assert_aligned(rhs);
                Series {
                    values: self.values $op &rhs.values,
                }
            }
        }

        impl $trait<f64> for &Series {
            type Output = Series;

            fn $method(self, rhs: f64) -> Series {
                Series {
                    values: &self.values $op rhs,
                }
            }
        }

        impl $trait<f64> for Series {
            type Output = Series;

            fn $method(self, rhs: f64) -> Series {
                Series {
                    values: self.values $op rhs,
                }
            }
        }
    };
}

elementwise_op!(Add, add, +);
elementwise_op!(Sub, sub, -);
elementwise_op!(Mul, mul, *);
elementwise_op!(Div, div, /);

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn series(values: &[f64]) -> Series {
        Series::from_vec(values.to_vec())
    }

    #[test]
    fn rolling_windows_wait_for_complete_data() {
        let data = series(&[1.0, 3.0, 2.0, 5.0, 4.0]);
        let max = data.rolling_max(3);
        assert!(max.is_null(0));
        assert!(max.is_null(1));
        assert_eq!(max.to_vec()[2..], [3.0, 5.0, 5.0]);

        let sum = data.rolling_sum(2);
        assert!(sum.is_null(0));
        assert_eq!(sum.to_vec()[1..], [4.0, 5.0, 7.0, 9.0]);
    }

    #[test]
    fn rolling_windows_with_nulls_stay_null() {
        let data = series(&[f64::NAN, 1.0, 2.0, f64::NAN, 4.0, 5.0]);
        let sum = data.rolling_sum(2);
        assert!(sum.is_null(1));
        assert_eq!(sum.get(2), Some(3.0));
        assert!(sum.is_null(3));
        assert!(sum.is_null(4));
        assert_eq!(sum.get(5), Some(9.0));
    }

    #[test]
    fn oversized_window_is_all_null() {
        let data = series(&[1.0, 2.0]);
        assert_eq!(data.rolling_sum(3).null_count(), 2);
        assert_eq!(data.rolling_sum(0).null_count(), 2);
    }

    #[test]
    fn cumsum_skips_nulls() {
        let data = series(&[1.0, f64::NAN, 2.0, 3.0]);
        let total = data.cumsum();
        assert_eq!(total.get(0), Some(1.0));
        assert!(total.is_null(1));
        assert_eq!(total.get(2), Some(3.0));
        assert_eq!(total.get(3), Some(6.0));
    }

    #[test]
    fn shift_preserves_length_in_both_directions() {
        let data = series(&[1.0, 2.0, 3.0, 4.0]);

        let forward = data.shift(1);
        assert_eq!(forward.len(), 4);
        assert!(forward.is_null(0));
        assert_eq!(forward.to_vec()[1..], [1.0, 2.0, 3.0]);

        let backward = data.shift(-2);
        assert_eq!(backward.to_vec()[..2], [3.0, 4.0]);
        assert!(backward.is_null(2));
        assert!(backward.is_null(3));

        assert_eq!(data.shift(9).null_count(), 4);
        assert!(data.shift(0).identical(&data));
    }

    #[test]
    fn fills_by_value_and_by_propagation() {
        let data = series(&[f64::NAN, 1.0, f64::NAN, 3.0, f64::NAN]);
        assert_eq!(data.fill_null(0.0).to_vec(), vec![0.0, 1.0, 0.0, 3.0, 0.0]);

        let forward = data.fill_method(FillMethod::Forward);
        assert!(forward.is_null(0));
        assert_eq!(forward.to_vec()[1..], [1.0, 1.0, 3.0, 3.0]);

        let backward = data.fill_method(FillMethod::Backward);
        assert_eq!(backward.to_vec()[..4], [1.0, 1.0, 3.0, 3.0]);
        assert!(backward.is_null(4));
    }

    #[test]
    fn arithmetic_propagates_nulls() {
        let a = series(&[1.0, f64::NAN, 3.0]);
        let b = series(&[2.0, 2.0, 2.0]);
        let sum = &a + &b;
        assert_eq!(sum.get(0), Some(3.0));
        assert!(sum.is_null(1));
        assert_eq!((&a * 2.0).get(2), Some(6.0));
        assert_eq!((&b / &b).get(0), Some(1.0));
    }

    #[test]
    #[should_panic(expected = "series are not aligned: 1 vs 3 positions")]
    fn single_value_is_not_broadcast() {
        let _ = &series(&[1.0]) + &series(&[1.0, 2.0, 3.0]);
    }

    #[test]
    #[should_panic(expected = "series are not aligned")]
    fn owned_operands_check_alignment_too() {
        let _ = series(&[1.0, 2.0]) - &series(&[1.0, 2.0, 3.0]);
    }

    #[test]
    fn replace_zero_only_touches_exact_zeros() {
        let data = series(&[0.0, 1.0, -0.0, f64::NAN]);
        let clamped = data.replace_zero(f64::EPSILON);
        assert_eq!(clamped.get(0), Some(f64::EPSILON));
        assert_eq!(clamped.get(1), Some(1.0));
        assert_eq!(clamped.get(2), Some(f64::EPSILON));
        assert!(clamped.is_null(3));
    }

    #[test]
    fn converts_decimals() {
        let data = Series::from_numbers([Decimal::new(105, 1), Decimal::ONE]);
        assert_eq!(data.to_vec(), vec![10.5, 1.0]);
        assert_eq!(data.first_valid_index(), Some(0));
        assert_eq!(data.valid_count(), 2);
    }
}
