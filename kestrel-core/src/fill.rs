//! Null-propagation methods used when post-processing a series.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How null entries borrow a value from their neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillMethod {
    /// Carry the last observed value forward.
    #[serde(rename = "ffill", alias = "pad")]
    Forward,
    /// Pull the next observed value backward.
    #[serde(rename = "bfill", alias = "backfill")]
    Backward,
}

impl FillMethod {
    /// Canonical name, as accepted in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "ffill",
            Self::Backward => "bfill",
        }
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a fill method name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown fill method '{0}'")]
pub struct UnknownFillMethod(pub String);

impl FromStr for FillMethod {
    type Err = UnknownFillMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ffill" | "pad" | "forward" => Ok(Self::Forward),
            "bfill" | "backfill" | "backward" => Ok(Self::Backward),
            other => Err(UnknownFillMethod(other.to_string())),
        }
    }
}
