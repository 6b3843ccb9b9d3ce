//! Godunov-type upwind flux via characteristic decomposition.
//!
//! The jump q_r - q_l is decomposed into characteristic waves using the
//! eigenstructure of the flux Jacobian at the Roe-averaged state:
//!
//! α = L (q_r - q_l)
//! F* = 0.5 (F(q_l) + F(q_r)) · n - 0.5 Σ_k |λ_k n| α_k r_k
//!
//! For linear systems and for Burgers' equation away from sonic points this is
//! the exact Godunov flux. At transonic rarefactions |λ| is replaced by the
//! Harten-Hyman smoothing so that expansion shocks cannot form.
//!
//! Interface states are reconstructed by the finite-volume operator before the
//! flux is called; this module only sees the two reconstructed values.

use super::traits::{FluxContext1D, NumericalFlux1D};
use crate::equations::ConservationLaw;

/// Upwind flux on the characteristic decomposition at the Roe average.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GodunovFlux;

impl NumericalFlux1D for GodunovFlux {
    fn compute(
        &self,
        law: &dyn ConservationLaw,
        q_l: &[f64],
        q_r: &[f64],
        normal: f64,
        _ctx: &FluxContext1D,
    ) -> Vec<f64> {
        let n_vars = law.n_vars();
        let f_l = law.flux(q_l);
        let f_r = law.flux(q_r);

        let q_roe = law.roe_average(q_l, q_r);
        let lambda_roe = law.eigenvalues(&q_roe);
        let lambda_l = law.eigenvalues(q_l);
        let lambda_r = law.eigenvalues(q_r);
        let r = law.right_eigenvectors(&q_roe);
        let l = law.left_eigenvectors(&q_roe);

        let jump: Vec<f64> = q_r.iter().zip(q_l).map(|(a, b)| a - b).collect();

        // Roe flux: F* = 0.5(F_L + F_R) - 0.5 * Σ |λ_k| α_k r_k
        let mut flux: Vec<f64> = f_l
            .iter()
            .zip(&f_r)
            .map(|(a, b)| 0.5 * (a + b) * normal)
            .collect();

        for k in 0..n_vars {
            let alpha: f64 = l[k].iter().zip(&jump).map(|(a, b)| a * b).sum();
            if alpha == 0.0 {
                continue;
            }
            let speed = entropy_fix(
                lambda_roe[k] * normal,
                lambda_l[k] * normal,
                lambda_r[k] * normal,
            );
            for (i, f) in flux.iter_mut().enumerate() {
                *f -= 0.5 * speed * alpha * r[i][k];
            }
        }

        flux
    }

    fn name(&self) -> &'static str {
        "godunov"
    }
}

/// Entropy fix for transonic rarefactions (Harten-Hyman).
///
/// When a wave crosses a sonic point (λ changes sign from left to right),
/// |λ| is replaced by a smooth function near zero with width
/// δ = max(0, λ - λ_l, λ_r - λ).
fn entropy_fix(lambda_roe: f64, lambda_l: f64, lambda_r: f64) -> f64 {
    if lambda_l < 0.0 && lambda_r > 0.0 {
        let delta = 0.0_f64.max(lambda_roe - lambda_l).max(lambda_r - lambda_roe);
        if lambda_roe.abs() < delta {
            (lambda_roe * lambda_roe + delta * delta) / (2.0 * delta)
        } else {
            lambda_roe.abs()
        }
    } else {
        lambda_roe.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{Advection1D, Burgers1D, MomentSystem1D};

    const TOL: f64 = 1e-12;

    fn ctx() -> FluxContext1D {
        FluxContext1D::new(0.01, 0.005)
    }

    #[test]
    fn test_upwind_for_advection() {
        let law = Advection1D::new(1.5);
        let f = GodunovFlux.compute(&law, &[2.0], &[7.0], 1.0, &ctx());
        assert!((f[0] - 3.0).abs() < TOL);

        let law = Advection1D::new(-1.5);
        let f = GodunovFlux.compute(&law, &[2.0], &[7.0], 1.0, &ctx());
        assert!((f[0] + 10.5).abs() < TOL);
    }

    #[test]
    fn test_burgers_shock() {
        // u_l > u_r: shock moving right with speed 0.75
        let f = GodunovFlux.compute(&Burgers1D, &[1.0], &[0.5], 1.0, &ctx());
        assert!((f[0] - 0.5).abs() < TOL);
    }

    #[test]
    fn test_burgers_transonic_rarefaction() {
        // Exact Godunov flux at a centered sonic rarefaction is f(0) = 0
        let f = GodunovFlux.compute(&Burgers1D, &[-1.0], &[1.0], 1.0, &ctx());
        assert!(f[0].abs() < TOL);
    }

    #[test]
    fn test_entropy_fix() {
        // Transonic rarefaction: left moving left, right moving right
        let fixed = entropy_fix(0.0, -1.0, 1.0);
        assert!(fixed > 0.0);
        assert!((fixed - 0.5).abs() < TOL);

        // No sign change: plain absolute value
        assert!((entropy_fix(-0.4, -1.0, -0.1) - 0.4).abs() < TOL);
    }

    #[test]
    fn test_moment_system_splits_waves() {
        // For a linear system, F* = A⁺ q_l + A⁻ q_r
        let law = MomentSystem1D::new(1).unwrap();
        let q_l = [1.0, 0.0];
        let q_r = [0.0, 0.0];
        let f = GodunovFlux.compute(&law, &q_l, &q_r, 1.0, &ctx());

        // A⁺ q_l: only the right-moving wave, λ = 1/√3, carries q_l
        let r = law.right_eigenvectors(&[]);
        let l = law.left_eigenvectors(&[]);
        let eigs = law.eigenvalues(&[]);
        for i in 0..2 {
            let expected: f64 = (0..2)
                .filter(|&k| eigs[k] > 0.0)
                .map(|k| eigs[k] * r[i][k] * (l[k][0] * q_l[0] + l[k][1] * q_l[1]))
                .sum();
            assert!((f[i] - expected).abs() < TOL);
        }
    }
}
