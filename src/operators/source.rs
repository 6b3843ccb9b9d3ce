//! Cell-wise source operator.

use std::sync::Arc;

use crate::error::{FvError, Result};
use crate::mesh::Mesh1D;
use crate::solver::FVState;
use crate::source::SourceTerm1D;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Evaluates a source term in every cell at the cell center.
///
/// Cells are independent, so no boundary handling is needed.
pub struct SourceOperator {
    source: Arc<dyn SourceTerm1D>,
    centers: Vec<f64>,
}

impl std::fmt::Debug for SourceOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceOperator")
            .field("source", &self.source.name())
            .field("n_cells", &self.centers.len())
            .finish()
    }
}

impl SourceOperator {
    pub fn new(source: Arc<dyn SourceTerm1D>, mesh: &Mesh1D) -> Self {
        Self {
            source,
            centers: mesh.cell_centers(),
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Number of source evaluations per call.
    pub fn n_cells(&self) -> usize {
        self.centers.len()
    }

    /// Source contribution of every cell at time `t`.
    pub fn apply(&self, state: &FVState, t: f64) -> Result<FVState> {
        self.check(state)?;
        let mut out = FVState::new(state.n_cells, state.n_vars);
        for (k, &x) in self.centers.iter().enumerate() {
            let s = self.source.evaluate(state.cell(k), x, t);
            self.check_len(k, s.len(), state.n_vars)?;
            out.cell_mut(k).copy_from_slice(&s);
        }
        Ok(out)
    }

    /// Parallel version of [`SourceOperator::apply`].
    #[cfg(feature = "parallel")]
    pub fn apply_parallel(&self, state: &FVState, t: f64) -> Result<FVState> {
        self.check(state)?;
        let per_cell: Vec<Vec<f64>> = self
            .centers
            .par_iter()
            .enumerate()
            .map(|(k, &x)| self.source.evaluate(state.cell(k), x, t))
            .collect();

        let mut out = FVState::new(state.n_cells, state.n_vars);
        for (k, s) in per_cell.iter().enumerate() {
            self.check_len(k, s.len(), state.n_vars)?;
            out.cell_mut(k).copy_from_slice(s);
        }
        Ok(out)
    }

    fn check(&self, state: &FVState) -> Result<()> {
        if state.n_cells != self.centers.len() {
            return Err(FvError::config(format!(
                "source operator built for {} cells, state has {}",
                self.centers.len(),
                state.n_cells
            )));
        }
        Ok(())
    }

    fn check_len(&self, cell: usize, got: usize, expected: usize) -> Result<()> {
        if got != expected {
            return Err(FvError::config(format!(
                "source '{}' returned {} components in cell {}, expected {}",
                self.source.name(),
                got,
                cell,
                expected
            )));
        }
        Ok(())
    }
}
