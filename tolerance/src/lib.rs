//! # Tolerance
//! How far a computed diagnostic may drift from its expected value before
//! a regression check calls it a failure.
use std::fmt;
use thiserror::Error;

/// Default relative tolerance used by the SFINCS example checks
pub const DEFAULT_RELATIVE: f64 = 0.001;

#[derive(Debug, Error, PartialEq)]
pub enum ToleranceError {
    #[error("tolerance must be finite, got {0}")]
    NotFinite(f64),
    #[error("tolerance must not be negative, got {0}")]
    Negative(f64),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Tolerance {
    /// Maximum of `|actual - expected| / |expected|`
    Relative(f64),
    /// Maximum of `|actual - expected|`
    Absolute(f64),
}

impl Tolerance {
    pub fn relative(bound: f64) -> Result<Self, ToleranceError> {
        validate(bound).map(Tolerance::Relative)
    }

    pub fn absolute(bound: f64) -> Result<Self, ToleranceError> {
        validate(bound).map(Tolerance::Absolute)
    }

    pub fn bound(&self) -> f64 {
        match *self {
            Tolerance::Relative(b) | Tolerance::Absolute(b) => b,
        }
    }

    /// Compare `actual` against `expected`.
    ///
    /// A relative tolerance against an expected value of exactly zero has
    /// no meaningful ratio, so `|actual|` is held to the bound instead.
    /// Anything non-finite fails.
    pub fn check(self, actual: f64, expected: f64) -> Verdict {
        let bound = self.bound();
        if !actual.is_finite() || !expected.is_finite() {
            return Verdict { deviation: f64::NAN, bound, passed: false };
        }

        let diff = (actual - expected).abs();
        let deviation = match self {
            Tolerance::Relative(_) if expected != 0.0 => diff / expected.abs(),
            Tolerance::Relative(_) | Tolerance::Absolute(_) => diff,
        };

        Verdict { deviation, bound, passed: deviation <= bound }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Relative(DEFAULT_RELATIVE)
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tolerance::Relative(b) => write!(f, "relative {}", b),
            Tolerance::Absolute(b) => write!(f, "absolute {}", b),
        }
    }
}

fn validate(bound: f64) -> Result<f64, ToleranceError> {
    if !bound.is_finite() {
        Err(ToleranceError::NotFinite(bound))
    } else if bound < 0.0 {
        Err(ToleranceError::Negative(bound))
    } else {
        Ok(bound)
    }
}

/// Result of holding one value to a `Tolerance`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Verdict {
    /// Relative or absolute deviation, matching the tolerance kind; NaN when
    /// either value was not finite
    pub deviation: f64,
    pub bound: f64,
    pub passed: bool,
}
