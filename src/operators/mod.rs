//! Spatial operators of the semi-discrete system.
//!
//! This module provides:
//! - [`FiniteVolumeOperator`]: conservative flux divergence over all faces
//! - [`SourceOperator`]: cell-wise source evaluation
//!
//! The time stepper sums both contributions at every stage.

mod finite_volume;
mod source;

pub use finite_volume::FiniteVolumeOperator;
pub use source::SourceOperator;

use crate::mesh::Mesh1D;

/// One interface of the chain, oriented from `left` to `right`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
    /// Cell on the negative side of the face
    pub left: usize,
    /// Cell on the positive side of the face
    pub right: usize,
    /// Mean width of the two cells
    pub dx: f64,
    /// Whether this face joins two boundary faces through the pairing
    pub boundary: bool,
}

impl Face {
    fn new(mesh: &Mesh1D, left: usize, right: usize, boundary: bool) -> Self {
        Self {
            left,
            right,
            dx: 0.5 * (mesh.cell_width(left) + mesh.cell_width(right)),
            boundary,
        }
    }
}
