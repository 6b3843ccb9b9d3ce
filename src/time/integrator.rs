//! Trait-based time integrator abstraction.
//!
//! This module provides the vector-space operations explicit Runge-Kutta
//! schemes need ([`Integrable`]) and dyn-compatible integrator metadata
//! ([`IntegratorInfo`]).

use crate::solver::FVState;

// =============================================================================
// Integrable Trait
// =============================================================================

/// Trait for solution types that can be time-integrated.
///
/// This provides the vector space operations needed by explicit time integrators:
/// - `scale`: Multiply by scalar (x <- c * x)
/// - `axpy`: Add scaled vector (x <- x + c * y)
///
/// # Example
/// ```
/// use fv_rs::time::Integrable;
/// use fv_rs::solver::FVState;
///
/// let mut u = FVState::uniform(4, &[1.0]);
///
/// let v = u.clone();
/// Integrable::scale(&mut u, 2.0);      // u = 2.0 * u
/// Integrable::axpy(&mut u, 0.5, &v);   // u = u + 0.5 * v
/// assert_eq!(u.cell(0), &[2.5]);
/// ```
pub trait Integrable: Clone + Send + Sized {
    /// Scale the solution by a constant: self <- c * self
    fn scale(&mut self, c: f64);

    /// Add a scaled vector: self <- self + c * other
    fn axpy(&mut self, c: f64, other: &Self);

    /// Create a zero-initialized solution with the same shape.
    ///
    /// Default implementation clones and scales by zero.
    fn zeros_like(&self) -> Self {
        let mut result = self.clone();
        result.scale(0.0);
        result
    }
}

// =============================================================================
// IntegratorInfo Trait (non-generic, dyn-compatible)
// =============================================================================

/// Non-generic information about a time integrator.
pub trait IntegratorInfo: Send + Sync {
    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy of the integrator.
    fn order(&self) -> usize;

    /// Number of stages in the integrator.
    fn n_stages(&self) -> usize;

    /// Whether the integrator is strong stability preserving (SSP).
    ///
    /// SSP integrators maintain TVD and other nonlinear stability properties.
    fn is_ssp(&self) -> bool;

    /// Times at which RHS is evaluated relative to current time.
    ///
    /// For SSP-RK3: [0, dt, dt/2] (stages evaluate at t, t+dt, t+dt/2)
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}

// =============================================================================
// Integrable Implementations
// =============================================================================

impl Integrable for FVState {
    fn scale(&mut self, c: f64) {
        FVState::scale(self, c);
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        FVState::axpy(self, c, other);
    }
}
