//! Trait-based numerical flux abstraction.
//!
//! Fluxes are selected at configuration time through [`FluxStrategy`] and
//! invoked uniformly through the [`NumericalFlux1D`] trait by the
//! finite-volume operator.
//!
//! # Example
//! ```
//! use fv_rs::equations::Advection1D;
//! use fv_rs::flux::{Dissipation, FluxContext1D, LaxFriedrichsFlux, NumericalFlux1D};
//!
//! let law = Advection1D::new(1.0);
//! let ctx = FluxContext1D::new(0.1, 0.05);
//!
//! // Using concrete type
//! let lf = LaxFriedrichsFlux::new(Dissipation::MeshRatio);
//! let f = lf.compute(&law, &[1.0], &[0.0], 1.0, &ctx);
//!
//! // 0.5 * (1 + 0) - 0.5 * (0.1 / 0.05) * (0 - 1) = 1.5
//! assert!((f[0] - 1.5).abs() < 1e-14);
//! ```

use serde::{Deserialize, Serialize};

use super::{GodunovFlux, LaxFriedrichsFlux};
use crate::equations::ConservationLaw;
use crate::error::Result;
use crate::solver::SlopeLimiter;

// =============================================================================
// Flux Context
// =============================================================================

/// Context provided to numerical flux computations.
///
/// Contains the discretization parameters some fluxes need in addition to the
/// two interface states.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluxContext1D {
    /// Representative mesh width at the interface (mean of the two cells).
    pub dx: f64,
    /// Time step size of the current step.
    pub dt: f64,
}

impl FluxContext1D {
    /// Create a new flux context.
    #[inline]
    pub fn new(dx: f64, dt: f64) -> Self {
        Self { dx, dt }
    }
}

// =============================================================================
// Numerical Flux Trait
// =============================================================================

/// Trait for two-point numerical fluxes of 1D conservation laws.
///
/// A numerical flux computes F* · n at a cell interface given the left
/// (interior) and right (exterior) states.
///
/// # Implementation Notes
///
/// - Fluxes must be consistent: F*(q, q; n) = F(q) · n
/// - Fluxes must be conservative: F*(q_l, q_r; n) = -F*(q_r, q_l; -n)
pub trait NumericalFlux1D: Send + Sync {
    /// Compute the numerical flux at an interface.
    ///
    /// # Arguments
    /// * `law` - Conservation law supplying F and its eigenstructure
    /// * `q_l` - Left (interior) state
    /// * `q_r` - Right (exterior) state
    /// * `normal` - Outward normal of the interior cell (+1 or -1)
    /// * `ctx` - Mesh width and time step
    ///
    /// # Returns
    /// The numerical flux F* · n, of length `law.n_vars()`.
    fn compute(
        &self,
        law: &dyn ConservationLaw,
        q_l: &[f64],
        q_r: &[f64],
        normal: f64,
        ctx: &FluxContext1D,
    ) -> Vec<f64>;

    /// Check that the context allows evaluating this flux.
    ///
    /// Called once per operator evaluation, before any face is visited.
    fn validate(&self, ctx: &FluxContext1D) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Strategy Selection
// =============================================================================

/// How the Lax-Friedrichs dissipation coefficient λ is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dissipation {
    /// λ = dx / dt, the classical Lax-Friedrichs scheme
    #[default]
    MeshRatio,
    /// A fixed coefficient
    Fixed(f64),
    /// λ = max(|λ_max(q_l)|, |λ_max(q_r)|), the local (Rusanov) variant
    Local,
}

/// Tagged-variant flux selector, chosen at configuration time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FluxStrategy {
    /// Lax-Friedrichs with the given dissipation coefficient.
    LaxFriedrichs {
        #[serde(default)]
        dissipation: Dissipation,
    },
    /// Godunov (characteristic upwind) flux on limited reconstructions.
    Godunov {
        #[serde(default)]
        limiter: SlopeLimiter,
    },
}

impl Default for FluxStrategy {
    fn default() -> Self {
        FluxStrategy::LaxFriedrichs {
            dissipation: Dissipation::MeshRatio,
        }
    }
}

impl FluxStrategy {
    /// Godunov flux with superbee reconstruction.
    pub fn godunov_superbee() -> Self {
        FluxStrategy::Godunov {
            limiter: SlopeLimiter::Superbee,
        }
    }

    /// Slope limiter used to reconstruct interface states.
    ///
    /// Lax-Friedrichs always works with the piecewise-constant cell averages.
    pub fn limiter(&self) -> SlopeLimiter {
        match self {
            FluxStrategy::LaxFriedrichs { .. } => SlopeLimiter::None,
            FluxStrategy::Godunov { limiter } => *limiter,
        }
    }

    /// Build the flux implementation for this strategy.
    pub fn build(&self) -> BoxedFlux1D {
        match *self {
            FluxStrategy::LaxFriedrichs { dissipation } => {
                Box::new(LaxFriedrichsFlux::new(dissipation))
            }
            FluxStrategy::Godunov { .. } => Box::new(GodunovFlux),
        }
    }
}

// =============================================================================
// Boxed Flux (Runtime Polymorphism)
// =============================================================================

/// Type alias for boxed flux (runtime polymorphism).
pub type BoxedFlux1D = Box<dyn NumericalFlux1D>;
