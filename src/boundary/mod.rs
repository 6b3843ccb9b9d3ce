//! Boundary coupling for finite-volume chains.
//!
//! A boundary coupler turns the mesh's boundary topology into a
//! [`BoundaryPairing`]: the list of boundary faces that exchange flux as if
//! they were interior faces. The pairing is computed once at setup.
//!
//! # Available Couplers
//!
//! | Coupler | Topology |
//! |---------|----------|
//! | `PeriodicCoupler` | last cell's right face ↔ first cell's left face |

mod periodic;

pub use periodic::{BoundaryPair, BoundaryPairing, PeriodicCoupler};

use crate::error::Result;
use crate::mesh::Mesh1D;

/// Trait for building boundary pairings from mesh topology.
///
/// Failing to match a boundary face is a configuration error and is never
/// retried.
pub trait BoundaryCoupler: Send + Sync {
    /// Build the pairing for a mesh.
    fn pair(&self, mesh: &Mesh1D) -> Result<BoundaryPairing>;

    /// Name of this coupler for debugging/logging.
    fn name(&self) -> &'static str;
}
