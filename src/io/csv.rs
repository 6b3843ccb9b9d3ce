//! CSV export of recorded trajectories.
//!
//! One file holds one conserved component. The first row lists the cell
//! centers after an empty leading field; every following row is one snapshot:
//!
//! ```text
//! ,0.005,0.015,0.025,...
//! 0.01,0.031,0.094,0.156,...
//! 0.02,0.030,0.091,0.152,...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::mesh::Mesh1D;
use crate::simulation::Trajectory;

/// Error type for CSV export.
#[derive(Debug, Error)]
pub enum CsvError {
    /// I/O error during file operations.
    #[error("CSV I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested component does not exist.
    #[error("Component {component} out of range ({n_vars} variables)")]
    InvalidComponent { component: usize, n_vars: usize },

    /// Nothing was recorded.
    #[error("Trajectory has no snapshots")]
    EmptyTrajectory,

    /// A snapshot does not match the mesh.
    #[error("Snapshot at t={time} has {found} cells, mesh has {expected}")]
    ShapeMismatch {
        time: f64,
        expected: usize,
        found: usize,
    },
}

/// Write one component of a trajectory as CSV.
///
/// # Example
/// ```
/// use fv_rs::io::write_trajectory_csv;
/// use fv_rs::mesh::Mesh1D;
/// use fv_rs::simulation::SolutionRecorder;
/// use fv_rs::solver::FVState;
///
/// let mesh = Mesh1D::uniform_periodic(0.0, 1.0, 2).unwrap();
/// let mut recorder = SolutionRecorder::new();
/// recorder.record(0.5, &FVState::uniform(2, &[1.0])).unwrap();
///
/// let mut out = Vec::new();
/// write_trajectory_csv(&mut out, &mesh, recorder.trajectory(), 0).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), ",0.25,0.75\n0.5,1,1\n");
/// ```
pub fn write_trajectory_csv<W: Write>(
    writer: W,
    mesh: &Mesh1D,
    trajectory: &Trajectory,
    component: usize,
) -> Result<(), CsvError> {
    let first = trajectory.first().ok_or(CsvError::EmptyTrajectory)?;
    let n_vars = first.state.n_vars;
    if component >= n_vars {
        return Err(CsvError::InvalidComponent { component, n_vars });
    }
    if let Some(bad) = trajectory
        .iter()
        .find(|s| s.state.n_cells != mesh.n_cells())
    {
        return Err(CsvError::ShapeMismatch {
            time: bad.time,
            expected: mesh.n_cells(),
            found: bad.state.n_cells,
        });
    }

    let mut w = BufWriter::new(writer);
    for x in mesh.cell_centers() {
        write!(w, ",{}", x)?;
    }
    writeln!(w)?;

    for snapshot in trajectory {
        write!(w, "{}", snapshot.time)?;
        for k in 0..mesh.n_cells() {
            write!(w, ",{}", snapshot.state.cell(k)[component])?;
        }
        writeln!(w)?;
    }
    w.flush()?;
    Ok(())
}

/// Write one component of a trajectory to a CSV file, creating or truncating it.
pub fn write_trajectory_csv_file(
    path: impl AsRef<Path>,
    mesh: &Mesh1D,
    trajectory: &Trajectory,
    component: usize,
) -> Result<(), CsvError> {
    let file = File::create(path.as_ref())?;
    write_trajectory_csv(file, mesh, trajectory, component)
}

/// Write every component to `<dir>/<stem>_<component>.csv`.
///
/// Returns the written paths in component order.
pub fn write_components_csv(
    dir: impl AsRef<Path>,
    stem: &str,
    mesh: &Mesh1D,
    trajectory: &Trajectory,
) -> Result<Vec<PathBuf>, CsvError> {
    let n_vars = trajectory
        .first()
        .ok_or(CsvError::EmptyTrajectory)?
        .state
        .n_vars;
    std::fs::create_dir_all(dir.as_ref())?;

    let mut paths = Vec::with_capacity(n_vars);
    for component in 0..n_vars {
        let path = dir.as_ref().join(format!("{}_{}.csv", stem, component));
        write_trajectory_csv_file(&path, mesh, trajectory, component)?;
        paths.push(path);
    }
    Ok(paths)
}
