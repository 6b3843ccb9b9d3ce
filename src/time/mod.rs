//! Time integration.
//!
//! - [`ButcherTableau`]: explicit Runge-Kutta coefficients and presets
//! - [`TimeStepper`]: drives the finite-volume and source operators through
//!   a tableau, records snapshots and searches for stable step sizes

mod butcher;
mod integrator;
mod stepper;

pub use butcher::{ButcherTableau, TableauKind};
pub use integrator::{Integrable, IntegratorInfo};
pub use stepper::{DtSearch, StepperPhase, TimeStepper};
