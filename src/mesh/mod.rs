//! Mesh representation.
//!
//! Provides the 1D cell chain consumed by the finite-volume operators. The
//! chain carries its own boundary topology so that periodic pairing never has
//! to be inferred from coordinates.

mod mesh1d;

pub use mesh1d::{BoundaryFace, BoundaryTopology, Mesh1D};
