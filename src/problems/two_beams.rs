//! Two colliding beams in an absorbing slab, P_N moment model.

use std::sync::Arc;

use super::Problem;
use crate::equations::{ConservationLaw, MomentSystem1D};
use crate::error::Result;
use crate::flux::FluxStrategy;
use crate::mesh::Mesh1D;
use crate::simulation::SimulationConfig;
use crate::source::{IsotropicScattering, SourceTerm1D};
use crate::time::TableauKind;

/// Isotropic vacuum density ψ_vac.
const PSI_VACUUM: f64 = 5e-9;
/// Width of the Gaussian beam profiles.
const BEAM_WIDTH: f64 = 0.05;
/// Beam centres; the left beam moves right (μ = 1), the right beam left.
const BEAM_CENTERS: [f64; 2] = [-0.25, 0.25];

/// Two beams on the periodic slab [-0.5, 0.5].
///
/// A right-moving beam (moments u_l = P_l(1) = 1) starts at x = -0.25 and a
/// left-moving beam (u_l = P_l(-1) = (-1)^l) at x = 0.25, both with a
/// Gaussian profile on top of an isotropic vacuum density. The medium absorbs
/// with σ_a = 4 and does not scatter.
#[derive(Clone, Debug)]
pub struct TwoBeamsProblem {
    law: Arc<MomentSystem1D>,
    pub n_cells: usize,
    pub scattering: IsotropicScattering,
}

impl TwoBeamsProblem {
    /// P_N model of order `order` (order + 1 moments).
    pub fn new(order: usize) -> Result<Self> {
        Ok(Self {
            law: Arc::new(MomentSystem1D::new(order)?),
            n_cells: 100,
            scattering: IsotropicScattering::absorbing(4.0),
        })
    }

    pub fn with_cells(mut self, n_cells: usize) -> Self {
        self.n_cells = n_cells;
        self
    }

    pub fn with_scattering(mut self, scattering: IsotropicScattering) -> Self {
        self.scattering = scattering;
        self
    }

    pub fn n_moments(&self) -> usize {
        self.law.n_vars()
    }
}

impl Problem for TwoBeamsProblem {
    fn name(&self) -> &'static str {
        "two-beams"
    }

    fn law(&self) -> Arc<dyn ConservationLaw> {
        self.law.clone()
    }

    fn source(&self) -> Arc<dyn SourceTerm1D> {
        Arc::new(self.scattering)
    }

    fn mesh(&self) -> Result<Mesh1D> {
        Mesh1D::uniform_periodic(-0.5, 0.5, self.n_cells)
    }

    fn initial_values(&self, x: f64) -> Vec<f64> {
        let profile = |x0: f64| (-(x - x0).powi(2) / (2.0 * BEAM_WIDTH * BEAM_WIDTH)).exp();
        let right_moving = profile(BEAM_CENTERS[0]);
        let left_moving = profile(BEAM_CENTERS[1]);

        (0..self.n_moments())
            .map(|l| {
                let sign = if l % 2 == 0 { 1.0 } else { -1.0 };
                let vacuum = if l == 0 { 2.0 * PSI_VACUUM } else { 0.0 };
                vacuum + right_moving + sign * left_moving
            })
            .collect()
    }

    /// Forward Euler with Godunov + superbee, dt = 0.0005 up to t = 2 and
    /// snapshots every max(t_end / 1000, dt).
    fn default_config(&self) -> SimulationConfig {
        let t_end = 2.0;
        let dt = 0.0005;
        SimulationConfig::default()
            .with_t_end(t_end)
            .with_dt(dt)
            .with_save_interval((t_end / 1000.0_f64).max(dt))
            .with_tableau(TableauKind::ForwardEuler)
            .with_flux(FluxStrategy::godunov_superbee())
    }
}
