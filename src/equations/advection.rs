//! Scalar advection equation.
//!
//! The 1D linear advection equation:
//!
//! ∂u/∂t + a ∂u/∂x = 0
//!
//! where a is the constant advection velocity.

use serde::{Deserialize, Serialize};

use super::ConservationLaw;

/// 1D linear advection equation.
///
/// du/dt + a * du/dx = 0
///
/// The simplest hyperbolic conservation law: every numerical flux reduces to a
/// known closed form, which makes it the reference case for tests.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Advection1D {
    /// Advection velocity (positive = rightward)
    pub velocity: f64,
}

impl Advection1D {
    /// Create a new advection equation with given velocity.
    pub fn new(velocity: f64) -> Self {
        Self { velocity }
    }
}

impl ConservationLaw for Advection1D {
    fn n_vars(&self) -> usize {
        1
    }

    fn flux(&self, q: &[f64]) -> Vec<f64> {
        debug_assert_eq!(q.len(), 1);
        vec![self.velocity * q[0]]
    }

    fn max_wave_speed(&self, _q: &[f64]) -> f64 {
        self.velocity.abs()
    }

    fn eigenvalues(&self, _q: &[f64]) -> Vec<f64> {
        vec![self.velocity]
    }

    fn name(&self) -> &'static str {
        "advection"
    }
}
