//! Simulation runner and snapshot recording.
//!
//! This module ties together:
//! - A [`Problem`](crate::problems::Problem) (law, source, mesh, initial data)
//! - The finite-volume and source operators
//! - A [`TimeStepper`](crate::time::TimeStepper) with its snapshot recorder
//!
//! # Example
//! ```
//! use fv_rs::problems::TransportProblem;
//! use fv_rs::simulation::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::default()
//!     .with_t_end(0.01)
//!     .with_dt(0.001)
//!     .with_save_interval(0.005);
//! let result = Simulation::new(TransportProblem::default())
//!     .with_config(config)
//!     .run()
//!     .unwrap();
//! assert_eq!(result.trajectory.len(), 2);
//! ```

mod recorder;
mod runner;

pub use recorder::{Snapshot, SolutionRecorder, Trajectory};
pub use runner::{Simulation, SimulationConfig, SimulationResult};
