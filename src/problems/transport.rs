//! Linear transport of a wave packet and a square pulse.

use std::f64::consts::PI;
use std::sync::Arc;

use super::Problem;
use crate::equations::{Advection1D, ConservationLaw};
use crate::error::Result;
use crate::flux::FluxStrategy;
use crate::mesh::Mesh1D;
use crate::simulation::SimulationConfig;
use crate::time::TableauKind;

/// u_t + a u_x = 0 on a periodic [0, 1].
///
/// The initial data is piecewise on five equal segments: a Gaussian-modulated
/// wave packet centred at 0.3 on [0.2, 0.4), a unit pulse on [0.6, 0.8) and
/// zero elsewhere. After t = 1/a the exact solution is the initial data.
#[derive(Clone, Debug)]
pub struct TransportProblem {
    pub velocity: f64,
    pub n_cells: usize,
}

impl Default for TransportProblem {
    fn default() -> Self {
        Self {
            velocity: 1.0,
            n_cells: 500,
        }
    }
}

impl TransportProblem {
    /// Exact solution at time `t`.
    pub fn exact(&self, x: f64, t: f64) -> f64 {
        let shifted = (x - self.velocity * t).rem_euclid(1.0);
        self.initial_values(shifted)[0]
    }
}

impl Problem for TransportProblem {
    fn name(&self) -> &'static str {
        "transport"
    }

    fn law(&self) -> Arc<dyn ConservationLaw> {
        Arc::new(Advection1D::new(self.velocity))
    }

    fn mesh(&self) -> Result<Mesh1D> {
        Mesh1D::uniform_periodic(0.0, 1.0, self.n_cells)
    }

    fn initial_values(&self, x: f64) -> Vec<f64> {
        let value = match (5.0 * x).floor() as i64 {
            1 => {
                let s = x - 0.3;
                (PI / 2.0 + 5.0 * PI * s).sin() * (-200.0 * s * s).exp()
            }
            3 => 1.0,
            _ => 0.0,
        };
        vec![value]
    }

    /// SSP-RK3 with Godunov + superbee at dt/dx = 0.5 for one period.
    fn default_config(&self) -> SimulationConfig {
        let dx = 1.0 / self.n_cells as f64;
        let t_end = 1.0 / self.velocity.abs();
        SimulationConfig::default()
            .with_t_end(t_end)
            .with_dt(0.5 * dx / self.velocity.abs())
            .with_save_interval(t_end / 100.0)
            .with_tableau(TableauKind::SspRk3)
            .with_flux(FluxStrategy::godunov_superbee())
    }
}
