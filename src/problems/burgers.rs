//! Inviscid Burgers equation with sine initial data.

use std::f64::consts::PI;
use std::sync::Arc;

use super::Problem;
use crate::equations::{Burgers1D, ConservationLaw};
use crate::error::Result;
use crate::flux::{Dissipation, FluxStrategy};
use crate::mesh::Mesh1D;
use crate::simulation::SimulationConfig;
use crate::time::TableauKind;

/// u_t + (u²/2)_x = 0 on a periodic [0, 1] with u(x, 0) = sin(2πx).
///
/// The sine steepens into a stationary shock at x = 0.5 at t = 1/(2π) and
/// then decays.
#[derive(Clone, Debug)]
pub struct BurgersProblem {
    pub n_cells: usize,
}

impl Default for BurgersProblem {
    fn default() -> Self {
        Self { n_cells: 100 }
    }
}

impl Problem for BurgersProblem {
    fn name(&self) -> &'static str {
        "burgers"
    }

    fn law(&self) -> Arc<dyn ConservationLaw> {
        Arc::new(Burgers1D)
    }

    fn mesh(&self) -> Result<Mesh1D> {
        Mesh1D::uniform_periodic(0.0, 1.0, self.n_cells)
    }

    fn initial_values(&self, x: f64) -> Vec<f64> {
        vec![(2.0 * PI * x).sin()]
    }

    /// Forward Euler with Lax-Friedrichs at λ = dx/dt, dt = 0.005, snapshots
    /// every 0.01 up to t = 10.
    fn default_config(&self) -> SimulationConfig {
        SimulationConfig::default()
            .with_t_end(10.0)
            .with_dt(0.005)
            .with_save_interval(0.01)
            .with_tableau(TableauKind::ForwardEuler)
            .with_flux(FluxStrategy::LaxFriedrichs {
                dissipation: Dissipation::MeshRatio,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Simulation;

    #[test]
    fn test_shock_stays_bounded() {
        let problem = BurgersProblem::default();
        let config = problem.default_config().with_t_end(0.5);
        let result = Simulation::new(problem).with_config(config).run().unwrap();

        // Lax-Friedrichs is monotone under the CFL limit: no new extrema
        assert!(result.final_state.max_abs() <= 1.0 + 1e-12);
        // Mean stays zero
        assert!(result.final_state.integrate(&result.mesh)[0].abs() < 1e-12);
    }
}
