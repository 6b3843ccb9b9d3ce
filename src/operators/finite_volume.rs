//! Conservative finite-volume divergence operator.
//!
//! For cell k with faces k-1/2 and k+1/2 the semi-discrete update is
//!
//! du_k/dt = -(F*_{k+1/2} - F*_{k-1/2}) / h_k
//!
//! Every face is visited exactly once per evaluation: the flux is computed with
//! the normal pointing from the left cell into the right cell, subtracted from
//! the left cell and added to the right cell. The periodic face is one entry of
//! the same list, so boundary faces are handled identically to interior ones.

use std::sync::Arc;

use super::Face;
use crate::boundary::{BoundaryCoupler, BoundaryPairing};
use crate::equations::ConservationLaw;
use crate::error::{FvError, Result};
use crate::flux::{BoxedFlux1D, FluxContext1D, FluxStrategy};
use crate::mesh::{BoundaryFace, Mesh1D};
use crate::solver::{FVState, FaceValues, SlopeLimiter, reconstruct};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Spatial residual of a 1D conservation law on a coupled mesh.
pub struct FiniteVolumeOperator {
    mesh: Mesh1D,
    pairing: BoundaryPairing,
    law: Arc<dyn ConservationLaw>,
    flux: BoxedFlux1D,
    limiter: SlopeLimiter,
    faces: Vec<Face>,
}

impl std::fmt::Debug for FiniteVolumeOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiniteVolumeOperator")
            .field("n_cells", &self.mesh.n_cells())
            .field("n_faces", &self.faces.len())
            .field("law", &self.law.name())
            .field("flux", &self.flux.name())
            .field("limiter", &self.limiter)
            .finish()
    }
}

impl FiniteVolumeOperator {
    /// Build the operator for a flux strategy, pairing boundary faces with
    /// the given coupler.
    pub fn new(
        mesh: Mesh1D,
        law: Arc<dyn ConservationLaw>,
        strategy: FluxStrategy,
        coupler: &dyn BoundaryCoupler,
    ) -> Result<Self> {
        let pairing = coupler.pair(&mesh)?;
        Self::with_flux(mesh, pairing, law, strategy.build(), strategy.limiter())
    }

    /// Build the operator from an explicit pairing and flux implementation.
    pub fn with_flux(
        mesh: Mesh1D,
        pairing: BoundaryPairing,
        law: Arc<dyn ConservationLaw>,
        flux: BoxedFlux1D,
        limiter: SlopeLimiter,
    ) -> Result<Self> {
        pairing.verify(&mesh)?;
        let faces = build_faces(&mesh, &pairing)?;

        log::debug!(
            "finite-volume operator: {} cells, {} faces ({} paired), law={}, flux={}, limiter={}",
            mesh.n_cells(),
            faces.len(),
            pairing.len(),
            law.name(),
            flux.name(),
            limiter.name()
        );

        Ok(Self {
            mesh,
            pairing,
            law,
            flux,
            limiter,
            faces,
        })
    }

    pub fn mesh(&self) -> &Mesh1D {
        &self.mesh
    }

    pub fn law(&self) -> &dyn ConservationLaw {
        self.law.as_ref()
    }

    pub fn pairing(&self) -> &BoundaryPairing {
        &self.pairing
    }

    pub fn limiter(&self) -> SlopeLimiter {
        self.limiter
    }

    pub fn flux_name(&self) -> &'static str {
        self.flux.name()
    }

    /// Faces in evaluation order: interior faces in mesh order, then paired
    /// boundary faces.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Number of flux evaluations per call.
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// Face visits one evaluation must perform.
    pub fn expected_face_visits(&self) -> usize {
        self.mesh.n_interior_faces() + self.pairing.len()
    }

    /// Numerical flux F* (normal pointing left to right) at every face, in
    /// the order of [`FiniteVolumeOperator::faces`].
    pub fn face_fluxes(&self, state: &FVState, dt: f64) -> Result<Vec<Vec<f64>>> {
        let values = self.prepare(state, dt)?;
        let fluxes: Vec<Vec<f64>> = self
            .faces
            .iter()
            .map(|face| self.face_flux(face, &values, dt))
            .collect();
        Ok(fluxes)
    }

    /// Rate of change du/dt of every cell. The input state is not modified.
    pub fn apply(&self, state: &FVState, dt: f64) -> Result<FVState> {
        let fluxes = self.face_fluxes(state, dt)?;
        self.accumulate(state, &fluxes)
    }

    /// Parallel version of [`FiniteVolumeOperator::apply`].
    ///
    /// Face fluxes are evaluated with a read-only fan-out; accumulation into
    /// the rate buffer stays single-threaded in face order, so the result is
    /// identical to the serial path.
    #[cfg(feature = "parallel")]
    pub fn apply_parallel(&self, state: &FVState, dt: f64) -> Result<FVState> {
        let values = self.prepare(state, dt)?;
        let fluxes: Vec<Vec<f64>> = self
            .faces
            .par_iter()
            .map(|face| self.face_flux(face, &values, dt))
            .collect();
        self.accumulate(state, &fluxes)
    }

    fn prepare(&self, state: &FVState, dt: f64) -> Result<FaceValues> {
        state.check_shape(&self.mesh, self.law.n_vars())?;
        // dx only matters per face
        self.flux.validate(&FluxContext1D::new(self.mesh.h_min(), dt))?;
        Ok(reconstruct(
            self.law.as_ref(),
            &self.mesh,
            &self.pairing,
            state,
            self.limiter,
        ))
    }

    fn face_flux(&self, face: &Face, values: &FaceValues, dt: f64) -> Vec<f64> {
        let ctx = FluxContext1D::new(face.dx, dt);
        self.flux.compute(
            self.law.as_ref(),
            values.right.cell(face.left),
            values.left.cell(face.right),
            1.0,
            &ctx,
        )
    }

    /// Scatter face fluxes into the rate of the two cells of each face.
    ///
    /// Fails unless there is one flux of `n_vars` components per face and
    /// every cell received exactly one face on each side.
    fn accumulate(&self, state: &FVState, fluxes: &[Vec<f64>]) -> Result<FVState> {
        if fluxes.len() != self.faces.len() {
            return Err(FvError::invariant(format!(
                "{} face fluxes for {} faces",
                fluxes.len(),
                self.faces.len()
            )));
        }

        let n = state.n_cells;
        let mut rate = FVState::new(n, state.n_vars);
        let mut right_visits = vec![0usize; n];
        let mut left_visits = vec![0usize; n];
        let mut visited = 0;

        for (face, flux) in self.faces.iter().zip(fluxes) {
            if flux.len() != state.n_vars {
                return Err(FvError::invariant(format!(
                    "flux at face {}|{} has {} components, state has {}",
                    face.left,
                    face.right,
                    flux.len(),
                    state.n_vars
                )));
            }
            let inv_h_left = 1.0 / self.mesh.cell_width(face.left);
            let inv_h_right = 1.0 / self.mesh.cell_width(face.right);
            for (v, &f) in flux.iter().enumerate() {
                rate.cell_mut(face.left)[v] -= f * inv_h_left;
                rate.cell_mut(face.right)[v] += f * inv_h_right;
            }
            right_visits[face.left] += 1;
            left_visits[face.right] += 1;
            visited += 1;
        }

        let expected = self.expected_face_visits();
        if visited != expected {
            return Err(FvError::invariant(format!(
                "visited {} faces, expected {}",
                visited, expected
            )));
        }
        check_one_face_per_side(&left_visits, &right_visits)?;
        Ok(rate)
    }
}

/// Every cell must have exactly one face on its left and one on its right.
fn check_one_face_per_side(left_faces: &[usize], right_faces: &[usize]) -> Result<()> {
    let bad = left_faces
        .iter()
        .zip(right_faces)
        .position(|(&l, &r)| l != 1 || r != 1);
    match bad {
        Some(k) => Err(FvError::invariant(format!(
            "cell {} has {} left and {} right faces, expected one each",
            k, left_faces[k], right_faces[k]
        ))),
        None => Ok(()),
    }
}

/// Enumerate faces once and check that every cell has exactly one face on
/// each side.
fn build_faces(mesh: &Mesh1D, pairing: &BoundaryPairing) -> Result<Vec<Face>> {
    let n = mesh.n_cells();
    let mut faces = Vec::with_capacity(mesh.n_interior_faces() + pairing.len());

    for k in 0..n {
        if let Some(right) = mesh.neighbors[k].1 {
            faces.push(Face::new(mesh, k, right, false));
        }
    }
    for pair in pairing.pairs() {
        let (left, right) = match pair.face {
            BoundaryFace::Right => (pair.cell, pair.partner),
            BoundaryFace::Left => (pair.partner, pair.cell),
        };
        faces.push(Face::new(mesh, left, right, true));
    }

    let mut right_faces = vec![0usize; n];
    let mut left_faces = vec![0usize; n];
    for face in &faces {
        right_faces[face.left] += 1;
        left_faces[face.right] += 1;
    }
    check_one_face_per_side(&left_faces, &right_faces)?;
    Ok(faces)
}
