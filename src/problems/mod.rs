//! Ready-made test problems.
//!
//! A [`Problem`] supplies everything the engine consumes from outside: the
//! analytical flux law, the source law, the mesh and the initial values,
//! together with a default run configuration.

mod burgers;
mod transport;
mod two_beams;

pub use burgers::BurgersProblem;
pub use transport::TransportProblem;
pub use two_beams::TwoBeamsProblem;

use std::sync::Arc;

use crate::equations::ConservationLaw;
use crate::error::Result;
use crate::mesh::Mesh1D;
use crate::simulation::SimulationConfig;
use crate::source::{NoSource, SourceTerm1D};

/// Problem definition consumed by [`Simulation`](crate::simulation::Simulation).
pub trait Problem: Send + Sync {
    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Analytical flux law.
    fn law(&self) -> Arc<dyn ConservationLaw>;

    /// Source law; defaults to no source.
    fn source(&self) -> Arc<dyn SourceTerm1D> {
        Arc::new(NoSource)
    }

    /// Periodic mesh of the domain.
    fn mesh(&self) -> Result<Mesh1D>;

    /// Initial state at position `x`, sampled once per cell center.
    fn initial_values(&self, x: f64) -> Vec<f64>;

    fn default_config(&self) -> SimulationConfig;
}
