//! Periodic boundary coupling.
//!
//! On a periodic chain the right face of the last cell and the left face of the
//! first cell are the same physical interface. The pairing is built once from
//! the mesh topology; the finite-volume operator then treats the paired face
//! exactly like an interior one.

use std::collections::HashMap;

use super::BoundaryCoupler;
use crate::error::{FvError, Result};
use crate::mesh::{BoundaryFace, BoundaryTopology, Mesh1D};

/// Two boundary faces identified as one interface.
///
/// `cell`'s `face` touches `partner`'s opposite face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryPair {
    pub cell: usize,
    pub face: BoundaryFace,
    pub partner: usize,
}

impl BoundaryPair {
    /// Face of the partner cell that this pair identifies.
    pub fn partner_face(&self) -> BoundaryFace {
        self.face.opposite()
    }
}

/// Immutable list of paired boundary faces with O(1) partner lookup.
#[derive(Clone, Debug, Default)]
pub struct BoundaryPairing {
    pairs: Vec<BoundaryPair>,
    lookup: HashMap<(usize, BoundaryFace), usize>,
}

impl BoundaryPairing {
    /// Build a pairing from explicit pairs.
    ///
    /// No coverage check is done here; call [`BoundaryPairing::verify`].
    pub fn from_pairs(pairs: Vec<BoundaryPair>) -> Self {
        let mut lookup = HashMap::with_capacity(2 * pairs.len());
        for p in &pairs {
            lookup.insert((p.cell, p.face), p.partner);
            lookup.insert((p.partner, p.partner_face()), p.cell);
        }
        Self { pairs, lookup }
    }

    /// The paired faces.
    pub fn pairs(&self) -> &[BoundaryPair] {
        &self.pairs
    }

    /// Number of paired interfaces.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Cell whose state is seen across a boundary face, if the face is paired.
    pub fn partner(&self, cell: usize, face: BoundaryFace) -> Option<usize> {
        self.lookup.get(&(cell, face)).copied()
    }

    /// Neighbor across a face: the interior neighbor, or the paired cell on a
    /// boundary face.
    pub fn exterior_neighbor(
        &self,
        mesh: &Mesh1D,
        cell: usize,
        face: BoundaryFace,
    ) -> Option<usize> {
        let (left, right) = mesh.neighbors[cell];
        let interior = match face {
            BoundaryFace::Left => left,
            BoundaryFace::Right => right,
        };
        interior.or_else(|| self.partner(cell, face))
    }

    /// Check that every boundary face of the mesh has exactly one partner and
    /// that no pair references a face that is not on the boundary.
    pub fn verify(&self, mesh: &Mesh1D) -> Result<()> {
        let mut counts: HashMap<(usize, BoundaryFace), usize> = HashMap::new();
        for p in &self.pairs {
            for (cell, face) in [(p.cell, p.face), (p.partner, p.partner_face())] {
                if cell >= mesh.n_cells() || !mesh.is_boundary(cell, face) {
                    return Err(FvError::invariant(format!(
                        "pair references {:?} face of cell {}, which is not a boundary face",
                        face, cell
                    )));
                }
                *counts.entry((cell, face)).or_insert(0) += 1;
            }
        }

        for (cell, face) in mesh.boundary_faces() {
            let count = counts.get(&(cell, face)).copied().unwrap_or(0);
            if count != 1 {
                return Err(FvError::invariant(format!(
                    "{:?} boundary face of cell {} has {} partners, expected exactly 1",
                    face, cell, count
                )));
            }
        }
        Ok(())
    }
}

/// Coupler for [`BoundaryTopology::Periodic`] meshes.
#[derive(Clone, Copy, Debug, Default)]
pub struct PeriodicCoupler;

impl BoundaryCoupler for PeriodicCoupler {
    fn pair(&self, mesh: &Mesh1D) -> Result<BoundaryPairing> {
        if mesh.topology() != BoundaryTopology::Periodic {
            return Err(FvError::config(format!(
                "periodic coupling requires a periodic mesh, got {:?} topology",
                mesh.topology()
            )));
        }
        if mesh.n_cells() == 0 {
            return Err(FvError::config("cannot pair boundary faces of an empty mesh"));
        }

        let pairing = BoundaryPairing::from_pairs(vec![BoundaryPair {
            cell: mesh.n_cells() - 1,
            face: BoundaryFace::Right,
            partner: 0,
        }]);
        pairing.verify(mesh)?;
        Ok(pairing)
    }

    fn name(&self) -> &'static str {
        "periodic"
    }
}
