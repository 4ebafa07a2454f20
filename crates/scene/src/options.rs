use crate::error::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Which way a scan walks from its starting entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// `index` moved `by` entries in this direction, if it stays inside
    /// `[0, len)`.
    #[must_use]
    pub fn step(self, index: usize, by: usize, len: usize) -> Option<usize> {
        match self {
            Self::Forward => index.checked_add(by).filter(|next| *next < len),
            Self::Backward => index.checked_sub(by),
        }
    }

    /// Number of entries strictly past `index` in this direction.
    #[must_use]
    pub fn remaining(self, index: usize, len: usize) -> usize {
        match self {
            Self::Forward => len.saturating_sub(index + 1),
            Self::Backward => index,
        }
    }

    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" | "fwd" | "next" => Ok(Self::Forward),
            "backward" | "back" | "previous" | "prev" => Ok(Self::Backward),
            _ => exn::bail!(ErrorKind::InvalidOptions(format!("unknown direction `{s}`"))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuning for a boundary scan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Stride between fingerprinted candidates before refinement. `1` scans
    /// every entry.
    pub skip: usize,
    /// Normalised Hamming distance above which an entry counts as a new
    /// scene, in `[0, 1]`.
    pub threshold: f32,
    /// Apply embedded orientation metadata before fingerprinting.
    pub autorotate: bool,
}

impl ScanOptions {
    pub const DEFAULT_SKIP: usize = 5;
    pub const DEFAULT_THRESHOLD: f32 = 0.4;

    #[must_use]
    pub fn new(skip: usize, threshold: f32) -> Self {
        Self { skip, threshold, ..Self::default() }
    }

    #[must_use]
    pub fn with_autorotate(self, autorotate: bool) -> Self {
        Self { autorotate, ..self }
    }

    pub fn validate(&self) -> Result<()> {
        if self.skip == 0 {
            exn::bail!(ErrorKind::InvalidOptions("skip must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            exn::bail!(ErrorKind::InvalidOptions(format!("threshold {} is outside [0, 1]", self.threshold)));
        }
        Ok(())
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { skip: Self::DEFAULT_SKIP, threshold: Self::DEFAULT_THRESHOLD, autorotate: true }
    }
}
