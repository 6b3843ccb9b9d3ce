//! I/O utilities for writing simulation output.
//!
//! This module provides:
//! - **CSV trajectories**: one file per conserved component, one row per
//!   snapshot, cell centers in the header row
//!
//! # Example
//!
//! ```no_run
//! use fv_rs::io::write_components_csv;
//! use fv_rs::problems::BurgersProblem;
//! use fv_rs::simulation::Simulation;
//!
//! let result = Simulation::new(BurgersProblem::default()).run()?;
//! let paths = write_components_csv("output", "burgers", &result.mesh, &result.trajectory)?;
//! println!("wrote {}", paths[0].display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod csv;

pub use csv::{CsvError, write_components_csv, write_trajectory_csv, write_trajectory_csv_file};
