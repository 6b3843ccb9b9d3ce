//! Conservation law abstractions.
//!
//! Provides a trait-based interface for hyperbolic conservation laws:
//!
//! ∂q/∂t + ∂f(q)/∂x = s(q)
//!
//! where q is the state vector and f is the flux function. Source terms live in
//! [`crate::source`] since they are integrated by a separate operator.

mod advection;
mod burgers;
mod moment_system;

pub use advection::Advection1D;
pub use burgers::Burgers1D;
pub use moment_system::MomentSystem1D;

/// A hyperbolic conservation law in 1D.
///
/// This trait abstracts over scalar equations (advection, Burgers) and systems
/// (moment models). It provides the operations the numerical fluxes need:
/// the analytical flux, a wave speed bound for dissipation, and the
/// eigenstructure of the flux Jacobian for characteristic upwinding.
///
/// # Example
///
/// ```
/// use fv_rs::equations::{Burgers1D, ConservationLaw};
///
/// let burgers = Burgers1D;
/// let flux = burgers.flux(&[2.0]); // u²/2
/// assert!((flux[0] - 2.0).abs() < 1e-14);
/// ```
pub trait ConservationLaw: Send + Sync {
    /// Number of conserved variables.
    ///
    /// - 1 for scalar equations (advection, Burgers)
    /// - N + 1 for a P_N moment model
    fn n_vars(&self) -> usize;

    /// Compute the physical flux f(q).
    ///
    /// # Arguments
    /// * `q` - State vector of length `n_vars()`
    ///
    /// # Returns
    /// Flux vector of length `n_vars()`
    fn flux(&self, q: &[f64]) -> Vec<f64>;

    /// Maximum absolute wave speed |λ_max|, used by local Lax-Friedrichs
    /// dissipation and CFL estimates.
    fn max_wave_speed(&self, q: &[f64]) -> f64;

    /// Eigenvalues of the flux Jacobian ∂f/∂q.
    fn eigenvalues(&self, q: &[f64]) -> Vec<f64>;

    /// Roe-averaged state for the linearized Riemann solver.
    ///
    /// Default is the arithmetic mean, which is exact for linear laws and for
    /// Burgers' equation.
    fn roe_average(&self, q_l: &[f64], q_r: &[f64]) -> Vec<f64> {
        q_l.iter().zip(q_r).map(|(l, r)| 0.5 * (l + r)).collect()
    }

    /// Right eigenvectors of the flux Jacobian.
    ///
    /// Returns a matrix R where R[:, i] is the i-th right eigenvector.
    ///
    /// Default implementation returns identity (works for scalar).
    fn right_eigenvectors(&self, q: &[f64]) -> Vec<Vec<f64>> {
        let _ = q;
        identity(self.n_vars())
    }

    /// Left eigenvectors of the flux Jacobian.
    ///
    /// Returns a matrix L where L[i, :] is the i-th left eigenvector.
    /// L = R^{-1}, so L * R = I.
    ///
    /// Default implementation returns identity (works for scalar).
    fn left_eigenvectors(&self, q: &[f64]) -> Vec<Vec<f64>> {
        let _ = q;
        identity(self.n_vars())
    }

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

#[allow(clippy::needless_range_loop)]
fn identity(n: usize) -> Vec<Vec<f64>> {
    let mut m = vec![vec![0.0; n]; n];
    for i in 0..n {
        m[i][i] = 1.0;
    }
    m
}

/// Multiply a dense row-major matrix with a vector.
pub(crate) fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter()
        .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
        .collect()
}
