//! Linear P_N moment model for 1D slab radiative transfer.
//!
//! Expanding the angular dependence of the kinetic density ψ(x, μ) in Legendre
//! polynomials up to order N and taking moments u_l = ∫ ψ P_l dμ yields the
//! linear hyperbolic system
//!
//! ∂u/∂t + A ∂u/∂x = s(u)
//!
//! with the tridiagonal flux matrix
//!
//! A[l][l-1] = l / (2l + 1),  A[l][l+1] = (l + 1) / (2l + 1).
//!
//! The eigenvalues of A are the roots of P_{N+1}, all inside (-1, 1).
//!
//! A is not symmetric, but D A D⁻¹ with D = diag(√(2l+1)) is a symmetric
//! Jacobi matrix J. The eigendecomposition J = Q Λ Qᵀ gives R = D⁻¹ Q and
//! L = Qᵀ D. Since the system is linear this is computed once.

use faer::{Mat, Side};

use super::ConservationLaw;
use crate::error::{FvError, Result};

/// P_N moment system with N + 1 conserved moments.
#[derive(Clone, Debug)]
pub struct MomentSystem1D {
    order: usize,
    /// Flux matrix A, row-major
    flux_matrix: Vec<Vec<f64>>,
    /// Eigenvalues of A in ascending order
    eigenvalues: Vec<f64>,
    /// R[:, k] is the k-th right eigenvector
    right: Vec<Vec<f64>>,
    /// L[k, :] is the k-th left eigenvector
    left: Vec<Vec<f64>>,
}

impl MomentSystem1D {
    /// Build the P_N system of the given order (N + 1 moments).
    pub fn new(order: usize) -> Result<Self> {
        let n = order + 1;

        let mut flux_matrix = vec![vec![0.0; n]; n];
        for l in 0..n {
            let lf = l as f64;
            if l > 0 {
                flux_matrix[l][l - 1] = lf / (2.0 * lf + 1.0);
            }
            if l + 1 < n {
                flux_matrix[l][l + 1] = (lf + 1.0) / (2.0 * lf + 1.0);
            }
        }

        // Symmetrised Jacobi matrix: off-diagonal (l+1)/sqrt((2l+1)(2l+3))
        let jacobi = Mat::<f64>::from_fn(n, n, |i, j| {
            let l = i.min(j);
            if i.abs_diff(j) == 1 {
                let lf = l as f64;
                (lf + 1.0) / ((2.0 * lf + 1.0) * (2.0 * lf + 3.0)).sqrt()
            } else {
                0.0
            }
        });

        let evd = jacobi
            .as_ref()
            .self_adjoint_eigen(Side::Lower)
            .map_err(|e| {
                FvError::config(format!(
                    "eigendecomposition of the P_{} flux matrix failed: {:?}",
                    order, e
                ))
            })?;
        let q = evd.U();
        let s = evd.S().column_vector();

        let d: Vec<f64> = (0..n).map(|l| (2.0 * l as f64 + 1.0).sqrt()).collect();
        let eigenvalues: Vec<f64> = (0..n).map(|k| s[k]).collect();
        let right: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|k| q[(i, k)] / d[i]).collect())
            .collect();
        let left: Vec<Vec<f64>> = (0..n)
            .map(|k| (0..n).map(|j| q[(j, k)] * d[j]).collect())
            .collect();

        Ok(Self {
            order,
            flux_matrix,
            eigenvalues,
            right,
            left,
        })
    }

    /// Moment order N.
    pub fn order(&self) -> usize {
        self.order
    }

    /// The flux matrix A.
    pub fn flux_matrix(&self) -> &[Vec<f64>] {
        &self.flux_matrix
    }
}

impl ConservationLaw for MomentSystem1D {
    fn n_vars(&self) -> usize {
        self.order + 1
    }

    fn flux(&self, q: &[f64]) -> Vec<f64> {
        debug_assert_eq!(q.len(), self.n_vars());
        super::mat_vec(&self.flux_matrix, q)
    }

    fn max_wave_speed(&self, _q: &[f64]) -> f64 {
        self.eigenvalues.iter().fold(0.0, |m, l| m.max(l.abs()))
    }

    fn eigenvalues(&self, _q: &[f64]) -> Vec<f64> {
        self.eigenvalues.clone()
    }

    fn right_eigenvectors(&self, _q: &[f64]) -> Vec<Vec<f64>> {
        self.right.clone()
    }

    fn left_eigenvectors(&self, _q: &[f64]) -> Vec<Vec<f64>> {
        self.left.clone()
    }

    fn name(&self) -> &'static str {
        "moment-system"
    }
}
