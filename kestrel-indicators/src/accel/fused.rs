//! Single-pass kernels over raw slices.

use kestrel_core::Series;

use super::{AcceleratedBackend, NatrKernel};
use crate::ma::MaMode;

/// Accelerated backend shipped with the crate.
///
/// Each kernel walks its inputs once, keeping running window state instead of
/// materialising intermediate series.
#[derive(Debug, Clone, Copy, Default)]
pub struct FusedKernels;

impl AcceleratedBackend for FusedKernels {
    fn name(&self) -> &str {
        "fused"
    }

    fn natr(
        &self,
        high: &Series,
        low: &Series,
        close: &Series,
        kernel: &NatrKernel,
    ) -> Option<Series> {
        let alpha = match kernel.mamode {
            MaMode::Sma => None,
            MaMode::Ema => Some(2.0 / (kernel.length as f64 + 1.0)),
            MaMode::Rma => Some(1.0 / kernel.length as f64),
            MaMode::Wma | MaMode::Dema | MaMode::Tema => return None,
        };
        let len = close.len();
        if kernel.length == 0 || high.len() != len || low.len() != len {
            return None;
        }

        let (high, low, close) = (high.values(), low.values(), close.values());
        let length = kernel.length;
        let divisor = length as f64;
        let mut ranges = Vec::with_capacity(len);
        let mut out = Vec::with_capacity(len);
        let mut run = 0usize;
        let mut window_sum = 0.0;
        let mut state: Option<f64> = None;

        for index in 0..len {
            let range = if index < kernel.drift {
                f64::NAN
            } else {
                let prev = close[index - kernel.drift];
                let (h, l) = (high[index], low[index]);
                if h.is_nan() || l.is_nan() || prev.is_nan() {
                    f64::NAN
                } else {
                    (h - l).max((h - prev).abs()).max((l - prev).abs())
                }
            };
            ranges.push(range);

            if range.is_nan() {
                run = 0;
                window_sum = 0.0;
            } else {
                window_sum += range;
                run += 1;
                if run > length {
                    window_sum -= ranges[index - length];
                }
            }

            let atr = match alpha {
                None if run >= length => window_sum / divisor,
                None => f64::NAN,
                Some(alpha) => match state {
                    Some(_) if range.is_nan() => f64::NAN,
                    Some(previous) => {
                        let next = alpha * range + (1.0 - alpha) * previous;
                        state = Some(next);
                        next
                    }
                    None if run >= length => {
                        let seed = window_sum / divisor;
                        state = Some(seed);
                        seed
                    }
                    None => f64::NAN,
                },
            };

            let price = if close[index] == 0.0 {
                kernel.epsilon
            } else {
                close[index]
            };
            out.push(kernel.scalar / price * atr);
        }

        Some(Series::from_vec(out))
    }

    fn ad(
        &self,
        high: &Series,
        low: &Series,
        close: &Series,
        volume: &Series,
        epsilon: f64,
    ) -> Option<Series> {
        let len = close.len();
        if high.len() != len || low.len() != len || volume.len() != len {
            return None;
        }

        let (high, low, close, volume) = (high.values(), low.values(), close.values(), volume.values());
        let mut total = 0.0;
        let out = (0..len)
            .map(|index| {
                let range = high[index] - low[index];
                let range = if range == 0.0 { epsilon } else { range };
                let flow = (close[index] * 2.0 - (high[index] + low[index])) * (volume[index] / range);
                if flow.is_nan() {
                    f64::NAN
                } else {
                    total += flow;
                    total
                }
            })
            .collect();

        Some(out)
    }
}
