//! Inviscid Burgers' equation.
//!
//! ∂u/∂t + ∂(u²/2)/∂x = 0
//!
//! The prototypical nonlinear scalar law: smooth data steepens into shocks in
//! finite time, and rarefactions through u = 0 are transonic.

use serde::{Deserialize, Serialize};

use super::ConservationLaw;

/// 1D inviscid Burgers' equation with flux f(u) = u²/2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Burgers1D;

impl ConservationLaw for Burgers1D {
    fn n_vars(&self) -> usize {
        1
    }

    fn flux(&self, q: &[f64]) -> Vec<f64> {
        debug_assert_eq!(q.len(), 1);
        vec![0.5 * q[0] * q[0]]
    }

    fn max_wave_speed(&self, q: &[f64]) -> f64 {
        q[0].abs()
    }

    fn eigenvalues(&self, q: &[f64]) -> Vec<f64> {
        vec![q[0]]
    }

    fn name(&self) -> &'static str {
        "burgers"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burgers_flux() {
        let flux = Burgers1D.flux(&[3.0]);
        assert!((flux[0] - 4.5).abs() < 1e-14);

        // Flux is even in u
        let flux_neg = Burgers1D.flux(&[-3.0]);
        assert!((flux[0] - flux_neg[0]).abs() < 1e-14);
    }

    #[test]
    fn test_burgers_wave_speed() {
        assert!((Burgers1D.max_wave_speed(&[-2.5]) - 2.5).abs() < 1e-14);
        assert_eq!(Burgers1D.eigenvalues(&[-2.5]), vec![-2.5]);
    }

    #[test]
    fn test_roe_average_is_exact() {
        // f(u_r) - f(u_l) = a(u_roe) (u_r - u_l) with a(u) = u
        let (u_l, u_r) = (0.3, 1.7);
        let avg = Burgers1D.roe_average(&[u_l], &[u_r]);
        let jump_f = Burgers1D.flux(&[u_r])[0] - Burgers1D.flux(&[u_l])[0];
        assert!((jump_f - avg[0] * (u_r - u_l)).abs() < 1e-14);
    }
}
