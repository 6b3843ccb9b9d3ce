//! 1D mesh representation.
//!
//! A 1D mesh is a partition of an interval [x_min, x_max] into cells. The
//! boundary topology is part of the mesh description: periodic meshes identify
//! the right face of the last cell with the left face of the first cell.

use serde::{Deserialize, Serialize};

use crate::error::{FvError, Result};

/// Boundary face identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryFace {
    /// Left boundary (x = x_min)
    Left,
    /// Right boundary (x = x_max)
    Right,
}

impl BoundaryFace {
    /// Outward normal of this face (-1 for left, +1 for right).
    pub fn normal(self) -> f64 {
        match self {
            BoundaryFace::Left => -1.0,
            BoundaryFace::Right => 1.0,
        }
    }

    /// The face on the other end of the cell.
    pub fn opposite(self) -> Self {
        match self {
            BoundaryFace::Left => BoundaryFace::Right,
            BoundaryFace::Right => BoundaryFace::Left,
        }
    }
}

/// How the two ends of the chain are connected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryTopology {
    /// Last cell's right face is identified with the first cell's left face.
    #[default]
    Periodic,
    /// Both ends are physical boundaries.
    Open,
}

/// 1D mesh of an interval.
#[derive(Clone, Debug)]
pub struct Mesh1D {
    /// Left endpoint of domain
    pub x_min: f64,
    /// Right endpoint of domain
    pub x_max: f64,
    /// Number of cells
    pub n_cells: usize,
    /// Cell vertices: vertices[k] is left endpoint of cell k
    /// vertices has length n_cells + 1
    pub vertices: Vec<f64>,
    /// Cell widths: widths[k] = vertices[k+1] - vertices[k]
    pub widths: Vec<f64>,
    /// Interior connectivity: neighbors[k] = (left_neighbor, right_neighbor).
    /// End cells have `None` on their outer side regardless of topology;
    /// periodic partners are resolved by the boundary coupler.
    pub neighbors: Vec<(Option<usize>, Option<usize>)>,
    topology: BoundaryTopology,
}

impl Mesh1D {
    /// Create a uniform open mesh of [x_min, x_max] with n_cells cells.
    pub fn uniform(x_min: f64, x_max: f64, n_cells: usize) -> Result<Self> {
        Self::uniform_with_topology(x_min, x_max, n_cells, BoundaryTopology::Open)
    }

    /// Create a uniform periodic mesh of [x_min, x_max] with n_cells cells.
    pub fn uniform_periodic(x_min: f64, x_max: f64, n_cells: usize) -> Result<Self> {
        Self::uniform_with_topology(x_min, x_max, n_cells, BoundaryTopology::Periodic)
    }

    fn uniform_with_topology(
        x_min: f64,
        x_max: f64,
        n_cells: usize,
        topology: BoundaryTopology,
    ) -> Result<Self> {
        if n_cells == 0 {
            return Err(FvError::config("mesh needs at least one cell"));
        }
        if !(x_min.is_finite() && x_max.is_finite()) || x_max <= x_min {
            return Err(FvError::config(format!(
                "invalid domain [{}, {}]: x_max must be greater than x_min",
                x_min, x_max
            )));
        }

        let h = (x_max - x_min) / n_cells as f64;
        let mut vertices: Vec<f64> = (0..=n_cells).map(|i| x_min + i as f64 * h).collect();
        // Pin the last vertex so the domain length is exact.
        vertices[n_cells] = x_max;

        Self::from_vertices(vertices, topology)
    }

    /// Create a (possibly non-uniform) mesh from its vertex coordinates.
    ///
    /// Vertices must be finite and strictly increasing.
    pub fn from_vertices(vertices: Vec<f64>, topology: BoundaryTopology) -> Result<Self> {
        if vertices.len() < 2 {
            return Err(FvError::config("mesh needs at least one cell"));
        }
        if vertices.iter().any(|x| !x.is_finite()) {
            return Err(FvError::config("mesh vertices must be finite"));
        }
        if let Some(k) = vertices.windows(2).position(|w| w[1] <= w[0]) {
            return Err(FvError::config(format!(
                "mesh vertices must be strictly increasing (cell {} has width {})",
                k,
                vertices[k + 1] - vertices[k]
            )));
        }

        let n_cells = vertices.len() - 1;
        let widths: Vec<f64> = vertices.windows(2).map(|w| w[1] - w[0]).collect();
        let neighbors = (0..n_cells)
            .map(|k| {
                let left = if k > 0 { Some(k - 1) } else { None };
                let right = if k + 1 < n_cells { Some(k + 1) } else { None };
                (left, right)
            })
            .collect();

        Ok(Self {
            x_min: vertices[0],
            x_max: vertices[n_cells],
            n_cells,
            vertices,
            widths,
            neighbors,
            topology,
        })
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Boundary topology of the chain.
    pub fn topology(&self) -> BoundaryTopology {
        self.topology
    }

    /// Whether the chain is periodic.
    pub fn is_periodic(&self) -> bool {
        self.topology == BoundaryTopology::Periodic
    }

    /// Width of cell k.
    pub fn cell_width(&self, k: usize) -> f64 {
        self.widths[k]
    }

    /// Midpoint of cell k.
    pub fn cell_center(&self, k: usize) -> f64 {
        0.5 * (self.vertices[k] + self.vertices[k + 1])
    }

    /// All cell midpoints in mesh order.
    pub fn cell_centers(&self) -> Vec<f64> {
        (0..self.n_cells).map(|k| self.cell_center(k)).collect()
    }

    /// Number of faces shared by two cells of the chain.
    pub fn n_interior_faces(&self) -> usize {
        self.n_cells - 1
    }

    /// Faces on the ends of the chain, as (cell, face) pairs.
    ///
    /// These are listed for both topologies; on a periodic mesh they are the
    /// faces that must be matched by the boundary coupler.
    pub fn boundary_faces(&self) -> Vec<(usize, BoundaryFace)> {
        vec![(0, BoundaryFace::Left), (self.n_cells - 1, BoundaryFace::Right)]
    }

    /// Check if a face is on the end of the chain.
    pub fn is_boundary(&self, cell: usize, face: BoundaryFace) -> bool {
        match face {
            BoundaryFace::Left => cell == 0,
            BoundaryFace::Right => cell + 1 == self.n_cells,
        }
    }

    /// Get total domain length.
    pub fn length(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Get minimum cell width.
    pub fn h_min(&self) -> f64 {
        self.widths.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Get maximum cell width.
    pub fn h_max(&self) -> f64 {
        self.widths.iter().copied().fold(0.0, f64::max)
    }
}
