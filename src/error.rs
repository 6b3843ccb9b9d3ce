//! Error types for the finite-volume engine.

use thiserror::Error;

/// Errors raised while configuring or running a finite-volume simulation.
///
/// Every variant aborts the current run; the only recovery the engine attempts
/// on its own is the bounded step-size search in
/// [`TimeStepper::find_suitable_dt`](crate::time::TimeStepper::find_suitable_dt).
#[derive(Error, Debug)]
pub enum FvError {
    /// Malformed setup: empty mesh, non-periodic topology, bad tableau, etc.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// NaN or Inf detected while advancing the solution.
    #[error("Numerical instability at t={time:.6e} (step {step}, dt={dt:.6e}): {reason}")]
    NumericalInstability {
        time: f64,
        dt: f64,
        step: usize,
        reason: String,
    },

    /// The adaptive step-size search ran out of attempts. `time` and `step`
    /// locate the state the search started from.
    #[error(
        "No stable step size found at t={time:.6e} (step {step}) after {attempts} attempts (initial dt={initial_dt:.6e}, final dt={final_dt:.6e})"
    )]
    NoStableStepSize {
        time: f64,
        step: usize,
        attempts: usize,
        initial_dt: f64,
        final_dt: f64,
    },

    /// Internal consistency check failed during setup (pairing coverage,
    /// face list).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Internal consistency check failed while advancing the solution (face
    /// visits, flux shape, snapshot order). `step` is the step being taken.
    #[error("Invariant violation at t={time:.6e} (step {step}): {reason}")]
    StepInvariantViolation {
        time: f64,
        step: usize,
        reason: String,
    },

    /// The stepper has already aborted or finished and accepts no more steps.
    #[error("Time stepper terminated at t={time:.6e}")]
    Terminated { time: f64 },

    /// JSON configuration could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl FvError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invariant violation.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Attach the simulated time and step to an error that carries neither.
    ///
    /// Invariant violations become [`FvError::StepInvariantViolation`]; all
    /// other variants already locate themselves or are not tied to a step.
    pub fn at_step(self, time: f64, step: usize) -> Self {
        match self {
            Self::InvariantViolation(reason) => Self::StepInvariantViolation { time, step, reason },
            other => other,
        }
    }

    /// Whether this error reports a broken internal invariant.
    pub fn is_invariant(&self) -> bool {
        matches!(
            self,
            Self::InvariantViolation(_) | Self::StepInvariantViolation { .. }
        )
    }

    /// Whether this error was raised by a numerical failure rather than setup.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Self::NumericalInstability { .. } | Self::NoStableStepSize { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FvError>;
