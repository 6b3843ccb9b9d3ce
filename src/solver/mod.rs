//! Finite-volume solver components.
//!
//! # Submodules
//!
//! - [`state`]: Cell-average container ([`FVState`])
//! - [`limiters`]: Slope limiters and interface reconstruction
//! - [`diagnostics`]: Per-run timings and counters ([`RunContext`])

pub mod diagnostics;
pub mod limiters;
pub mod state;

pub use diagnostics::{RunContext, SectionTiming};
pub use limiters::{FaceValues, SlopeLimiter, reconstruct};
pub use state::FVState;
