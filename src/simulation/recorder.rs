//! Snapshot storage.

use crate::error::{FvError, Result};
use crate::solver::FVState;

/// State of every cell at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub time: f64,
    pub state: FVState,
}

/// Time-ordered sequence of snapshots. Cell order matches the mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    snapshots: Vec<Snapshot>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Snapshot> {
        self.snapshots.get(i)
    }

    pub fn first(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    pub fn as_slice(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn times(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.time).collect()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

impl IntoIterator for Trajectory {
    type Item = Snapshot;
    type IntoIter = std::vec::IntoIter<Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.into_iter()
    }
}

/// Append-only recorder of (time, state) pairs.
///
/// Every snapshot is an owned copy; recording never aliases the caller's
/// buffer. Nothing is evicted, so memory grows with the number of snapshots.
///
/// # Example
/// ```
/// use fv_rs::simulation::SolutionRecorder;
/// use fv_rs::solver::FVState;
///
/// let mut recorder = SolutionRecorder::new();
/// let mut u = FVState::uniform(3, &[1.0]);
/// recorder.record(0.5, &u).unwrap();
/// u.scale(2.0);
///
/// assert_eq!(recorder.trajectory().last().unwrap().state.cell(0), &[1.0]);
/// assert!(recorder.record(0.25, &u).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SolutionRecorder {
    trajectory: Trajectory,
}

impl SolutionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a copy of `state` at time `t`.
    ///
    /// Times must not decrease and states must keep the shape of the first
    /// snapshot; both are reported as [`FvError::InvariantViolation`]. The
    /// time stepper re-reports them with its time and step.
    pub fn record(&mut self, t: f64, state: &FVState) -> Result<()> {
        if let Some(last) = self.trajectory.last() {
            if t < last.time {
                return Err(FvError::invariant(format!(
                    "snapshot at t={} recorded after t={}",
                    t, last.time
                )));
            }
            if (state.n_cells, state.n_vars) != (last.state.n_cells, last.state.n_vars) {
                return Err(FvError::invariant(format!(
                    "snapshot shape {}x{} differs from {}x{}",
                    state.n_cells, state.n_vars, last.state.n_cells, last.state.n_vars
                )));
            }
        }
        self.trajectory.snapshots.push(Snapshot {
            time: t,
            state: state.clone(),
        });
        Ok(())
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.trajectory.last()
    }

    pub fn times(&self) -> Vec<f64> {
        self.trajectory.times()
    }

    pub fn into_trajectory(self) -> Trajectory {
        self.trajectory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut recorder = SolutionRecorder::new();
        assert!(recorder.is_empty());
        for (i, t) in [0.0, 0.1, 0.1, 0.3].into_iter().enumerate() {
            recorder.record(t, &FVState::uniform(2, &[i as f64])).unwrap();
        }
        assert_eq!(recorder.len(), 4);
        assert_eq!(recorder.times(), vec![0.0, 0.1, 0.1, 0.3]);
        assert_eq!(recorder.last().unwrap().state.cell(1), &[3.0]);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut recorder = SolutionRecorder::new();
        let mut u = FVState::uniform(2, &[1.0, 2.0]);
        recorder.record(0.0, &u).unwrap();
        u.cell_mut(0)[0] = 99.0;
        assert_eq!(recorder.trajectory().first().unwrap().state.cell(0), &[1.0, 2.0]);
    }

    #[test]
    fn test_rejects_shape_change() {
        let mut recorder = SolutionRecorder::new();
        recorder.record(0.0, &FVState::new(4, 1)).unwrap();
        let err = recorder.record(1.0, &FVState::new(4, 2)).unwrap_err();
        assert!(matches!(err, FvError::InvariantViolation(_)));
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_into_trajectory() {
        let mut recorder = SolutionRecorder::new();
        recorder.record(0.0, &FVState::new(1, 1)).unwrap();
        recorder.record(1.0, &FVState::new(1, 1)).unwrap();
        let trajectory = recorder.into_trajectory();
        let times: Vec<f64> = trajectory.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 1.0]);
        assert_eq!(trajectory.into_iter().count(), 2);
    }
}
