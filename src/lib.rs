//! # fv-rs
//!
//! A finite-volume library for one-dimensional hyperbolic conservation laws.
//!
//! This crate provides the building blocks of an explicit finite-volume solver:
//! - Conservation laws (advection, Burgers, P_N moment systems)
//! - Numerical fluxes (Lax-Friedrichs, Godunov with slope-limited reconstruction)
//! - Periodic boundary coupling through a precomputed cell pairing
//! - Conservative flux divergence and cell-wise source operators
//! - Explicit Runge-Kutta time stepping from Butcher tableaus, with stable
//!   step-size search and snapshot recording
//! - Ready-made problems and CSV export of trajectories
//!
//! # Example
//!
//! ```
//! use fv_rs::{BurgersProblem, Simulation};
//!
//! let sim = Simulation::new(BurgersProblem::default());
//! let config = sim.config().clone().with_t_end(0.02);
//! let result = sim.with_config(config).run().unwrap();
//! assert_eq!(result.n_steps, 4);
//! ```

pub mod analysis;
pub mod boundary;
pub mod equations;
pub mod error;
pub mod flux;
pub mod io;
pub mod mesh;
pub mod operators;
pub mod problems;
pub mod simulation;
pub mod solver;
pub mod source;
pub mod time;

// Re-export main types for convenience
pub use error::{FvError, Result};

pub use boundary::{BoundaryCoupler, BoundaryPairing, PeriodicCoupler};
pub use equations::{Advection1D, Burgers1D, ConservationLaw, MomentSystem1D};
pub use flux::{Dissipation, FluxStrategy, GodunovFlux, LaxFriedrichsFlux, NumericalFlux1D};
pub use mesh::{BoundaryFace, BoundaryTopology, Mesh1D};
pub use operators::{FiniteVolumeOperator, SourceOperator};
pub use solver::{FVState, RunContext, SlopeLimiter};
pub use source::{
    CombinedSource, FnSource, IsotropicScattering, LinearRelaxation, NoSource, SourceTerm1D,
};
pub use time::{ButcherTableau, DtSearch, StepperPhase, TableauKind, TimeStepper};

// Analysis types
pub use analysis::{StabilityMonitor, StabilityStatus, StabilityThresholds, StabilityWarning};

// Running problems
pub use problems::{BurgersProblem, Problem, TransportProblem, TwoBeamsProblem};
pub use simulation::{
    Simulation, SimulationConfig, SimulationResult, Snapshot, SolutionRecorder, Trajectory,
};

// I/O types
pub use io::{CsvError, write_trajectory_csv};
