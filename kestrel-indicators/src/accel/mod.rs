//! Selection between internal and accelerated computation paths.
//!
//! The accelerated backend is described by an immutable [`Capabilities`]
//! value. Callers can inject one explicitly or use the process-wide instance
//! returned by [`capabilities`], which is detected once on first use.

mod fused;

use std::fmt;
use std::sync::Arc;

use kestrel_core::Series;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::ma::MaMode;

pub use fused::FusedKernels;

/// Denominator substituted for exact zeros unless configured otherwise.
pub const DEFAULT_EPSILON: f64 = f64::EPSILON;

/// Environment variable that disables the accelerated backend when set to
/// `0`, `false`, `off` or `no`.
pub const ACCELERATED_ENV: &str = "KESTREL_ACCELERATED";

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputationStrategy {
    /// Composed series operations inside this crate.
    Internal,
    /// Delegated to an [`AcceleratedBackend`].
    Accelerated,
}

/// Parameters of the normalized average true range handed to a backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NatrKernel {
    /// ATR window.
    pub length: usize,
    /// Magnification factor.
    pub scalar: f64,
    /// ATR smoothing variant.
    pub mamode: MaMode,
    /// Lag of the previous close.
    pub drift: usize,
    /// Substitute for a zero close.
    pub epsilon: f64,
}

/// An optional, faster implementation of selected formulas.
///
/// A backend must reproduce the internal computation for the same inputs.
/// Returning `None` declines the request and the caller falls back to the
/// internal path.
pub trait AcceleratedBackend: Send + Sync + fmt::Debug {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Normalized average true range.
    fn natr(&self, high: &Series, low: &Series, close: &Series, kernel: &NatrKernel)
        -> Option<Series>;

    /// Accumulation/distribution line from high, low, close and volume.
    fn ad(
        &self,
        high: &Series,
        low: &Series,
        close: &Series,
        volume: &Series,
        epsilon: f64,
    ) -> Option<Series>;
}

/// Immutable description of what the running process can compute.
#[derive(Debug, Clone)]
pub struct Capabilities {
    backend: Option<Arc<dyn AcceleratedBackend>>,
    epsilon: f64,
}

impl Capabilities {
    /// Uses `backend` for accelerated requests.
    pub fn with_backend(backend: Arc<dyn AcceleratedBackend>) -> Self {
        Self {
            backend: Some(backend),
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// No accelerated backend; every indicator takes the internal path.
    pub fn internal_only() -> Self {
        Self {
            backend: None,
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// Detects capabilities from the environment.
    pub fn detect() -> Self {
        let raw = std::env::var(ACCELERATED_ENV).ok();
        let detected = if accelerated_from_env(raw.as_deref()) {
            Self::default()
        } else {
            Self::internal_only()
        };
        debug!(
            backend = detected.backend_name().unwrap_or("none"),
            "detected indicator capabilities"
        );
        detected
    }

    /// Name of the installed backend, if any.
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|backend| backend.name())
    }

    /// Replaces the zero-denominator substitute. Non-positive or non-finite
    /// values keep the current epsilon.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        if epsilon.is_finite() && epsilon > 0.0 {
            self.epsilon = epsilon;
        }
        self
    }

    /// Substitute for zero denominators.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Whether any accelerated backend is installed.
    pub fn has_accelerated(&self) -> bool {
        self.backend.is_some()
    }

    /// The backend to try for a call, honouring the caller's preference.
    pub fn accelerated(&self, preferred: bool) -> Option<&dyn AcceleratedBackend> {
        if preferred {
            self.backend.as_deref()
        } else {
            None
        }
    }

    /// Strategy a call would attempt first.
    pub fn strategy(&self, preferred: bool) -> ComputationStrategy {
        match self.accelerated(preferred) {
            Some(_) => ComputationStrategy::Accelerated,
            None => ComputationStrategy::Internal,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::with_backend(Arc::new(FusedKernels))
    }
}

/// Interprets the value of [`ACCELERATED_ENV`]. Unset or unrecognised values
/// keep the backend enabled.
pub fn accelerated_from_env(value: Option<&str>) -> bool {
    !matches!(
        value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref(),
        Some("0" | "false" | "off" | "no")
    )
}

static CAPABILITIES: Lazy<Capabilities> = Lazy::new(Capabilities::detect);

/// Process-wide, read-only capabilities, detected on first use.
pub fn capabilities() -> &'static Capabilities {
    &CAPABILITIES
}
