//! Numerical flux functions.
//!
//! Provides numerical fluxes for 1D finite-volume discretizations:
//! - [`LaxFriedrichsFlux`]: central flux plus a dissipation penalty
//! - [`GodunovFlux`]: characteristic upwinding at the Roe average
//!
//! # Flux Trait
//!
//! The [`NumericalFlux1D`] trait provides a generic interface for numerical
//! fluxes. [`FluxStrategy`] selects one at configuration time together with the
//! slope limiter used to reconstruct interface states.

mod godunov;
mod lax_friedrichs;
pub mod traits;

pub use godunov::GodunovFlux;
pub use lax_friedrichs::LaxFriedrichsFlux;

// Re-export trait-based flux types
pub use traits::{BoxedFlux1D, Dissipation, FluxContext1D, FluxStrategy, NumericalFlux1D};
