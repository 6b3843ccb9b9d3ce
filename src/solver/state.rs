//! Cell-average storage for 1D finite-volume problems.

use crate::error::{FvError, Result};
use crate::mesh::Mesh1D;

/// Per-cell conserved state.
///
/// Stores cell averages in a contiguous array with layout [n_cells, n_vars].
/// Access via `cell(k)` to get a slice of the conserved variables of cell k.
#[derive(Clone, Debug, PartialEq)]
pub struct FVState {
    /// Cell averages, stored as data[k * n_vars + v] for cell k, variable v
    pub data: Vec<f64>,
    /// Number of cells
    pub n_cells: usize,
    /// Number of conserved variables per cell
    pub n_vars: usize,
}

impl FVState {
    /// Create a new state initialized to zero.
    pub fn new(n_cells: usize, n_vars: usize) -> Self {
        Self {
            data: vec![0.0; n_cells * n_vars],
            n_cells,
            n_vars,
        }
    }

    /// Create a state holding the same vector in every cell.
    pub fn uniform(n_cells: usize, value: &[f64]) -> Self {
        let mut state = Self::new(n_cells, value.len());
        for k in 0..n_cells {
            state.cell_mut(k).copy_from_slice(value);
        }
        state
    }

    /// Sample an initial-value function once per cell at the cell center.
    ///
    /// Fails if `f` returns a vector of the wrong length.
    pub fn from_fn<F>(mesh: &Mesh1D, n_vars: usize, f: F) -> Result<Self>
    where
        F: Fn(f64) -> Vec<f64>,
    {
        let mut state = Self::new(mesh.n_cells(), n_vars);
        for k in 0..mesh.n_cells() {
            let x = mesh.cell_center(k);
            let value = f(x);
            if value.len() != n_vars {
                return Err(FvError::config(format!(
                    "initial values at x={} have {} components, expected {}",
                    x,
                    value.len(),
                    n_vars
                )));
            }
            state.cell_mut(k).copy_from_slice(&value);
        }
        Ok(state)
    }

    /// Get the conserved variables of cell k.
    pub fn cell(&self, k: usize) -> &[f64] {
        let start = k * self.n_vars;
        &self.data[start..start + self.n_vars]
    }

    /// Get mutable conserved variables of cell k.
    pub fn cell_mut(&mut self, k: usize) -> &mut [f64] {
        let start = k * self.n_vars;
        &mut self.data[start..start + self.n_vars]
    }

    /// Values of one conserved variable across all cells, in mesh order.
    pub fn component(&self, var: usize) -> Vec<f64> {
        self.data
            .chunks_exact(self.n_vars)
            .map(|cell| cell[var])
            .collect()
    }

    /// Verify that this state matches the mesh and the law's variable count.
    pub fn check_shape(&self, mesh: &Mesh1D, n_vars: usize) -> Result<()> {
        if self.n_cells != mesh.n_cells() || self.n_vars != n_vars {
            return Err(FvError::config(format!(
                "state shape [{} cells x {} vars] does not match mesh/law [{} cells x {} vars]",
                self.n_cells,
                self.n_vars,
                mesh.n_cells(),
                n_vars
            )));
        }
        Ok(())
    }

    /// Scale all values by a constant.
    pub fn scale(&mut self, c: f64) {
        for v in &mut self.data {
            *v *= c;
        }
    }

    /// Add c * other to self (axpy operation).
    pub fn axpy(&mut self, c: f64, other: &FVState) {
        assert_eq!(self.data.len(), other.data.len());
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += c * *b;
        }
    }

    /// Add other to self.
    pub fn add(&mut self, other: &FVState) {
        self.axpy(1.0, other);
    }

    /// Get maximum absolute value.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().map(|&x| x.abs()).fold(0.0, f64::max)
    }

    /// Locate the first NaN or Inf as (cell, variable).
    pub fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.data
            .iter()
            .position(|v| !v.is_finite())
            .map(|i| (i / self.n_vars, i % self.n_vars))
    }

    /// Whether every value is finite.
    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    /// Integral of each conserved variable over the domain: Σ_k u_k h_k.
    pub fn integrate(&self, mesh: &Mesh1D) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_vars];
        for k in 0..self.n_cells {
            let h = mesh.cell_width(k);
            for (total, &u) in totals.iter_mut().zip(self.cell(k)) {
                *total += u * h;
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_storage() {
        let mut state = FVState::new(4, 3);
        assert_eq!(state.data.len(), 12);

        state.cell_mut(0)[0] = 1.0;
        state.cell_mut(0)[2] = 2.0;
        state.cell_mut(3)[1] = 3.0;

        assert_eq!(state.cell(0), &[1.0, 0.0, 2.0]);
        assert_eq!(state.cell(3), &[0.0, 3.0, 0.0]);
        assert_eq!(state.component(1), vec![0.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_axpy() {
        let mut a = FVState::uniform(2, &[1.0, 1.0]);
        let b = FVState::uniform(2, &[2.0, 4.0]);

        a.axpy(0.5, &b);
        assert_eq!(a.cell(1), &[2.0, 3.0]);

        a.scale(2.0);
        assert_eq!(a.cell(0), &[4.0, 6.0]);
    }

    #[test]
    fn test_from_fn_samples_cell_centers() {
        let mesh = Mesh1D::uniform_periodic(0.0, 1.0, 4).unwrap();
        let state = FVState::from_fn(&mesh, 2, |x| vec![x, 2.0 * x]).unwrap();
        assert!((state.cell(0)[0] - 0.125).abs() < 1e-14);
        assert!((state.cell(3)[1] - 1.75).abs() < 1e-14);

        let bad = FVState::from_fn(&mesh, 2, |x| vec![x]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_integrate_non_uniform() {
        let mesh = Mesh1D::from_vertices(
            vec![0.0, 0.25, 1.0],
            crate::mesh::BoundaryTopology::Periodic,
        )
        .unwrap();
        let mut state = FVState::new(2, 1);
        state.cell_mut(0)[0] = 4.0;
        state.cell_mut(1)[0] = 2.0;
        let total = state.integrate(&mesh);
        assert!((total[0] - (4.0 * 0.25 + 2.0 * 0.75)).abs() < 1e-14);
    }

    #[test]
    fn test_non_finite_detection() {
        let mut state = FVState::new(3, 2);
        assert!(state.is_finite());
        state.cell_mut(2)[1] = f64::NAN;
        assert_eq!(state.first_non_finite(), Some((2, 1)));
        assert!(!state.is_finite());
    }

    #[test]
    fn test_check_shape() {
        let mesh = Mesh1D::uniform_periodic(0.0, 1.0, 4).unwrap();
        assert!(FVState::new(4, 2).check_shape(&mesh, 2).is_ok());
        assert!(FVState::new(3, 2).check_shape(&mesh, 2).is_err());
        assert!(FVState::new(4, 1).check_shape(&mesh, 2).is_err());
    }
}
