//! Stability monitoring for finite-volume runs.
//!
//! Provides reusable diagnostics for detecting numerical instability: non-finite
//! values, values beyond a magnitude bound, and time steps below a floor. The
//! time stepper checks every committed step and every step-size probe with a
//! monitor.
//!
//! # Example
//!
//! ```
//! use fv_rs::analysis::{StabilityMonitor, StabilityThresholds};
//! use fv_rs::solver::FVState;
//!
//! let mut monitor = StabilityMonitor::new(StabilityThresholds::default().with_max_abs(10.0));
//! let q = FVState::uniform(4, &[1.0]);
//!
//! let status = monitor.check(&q, 0.01);
//! assert!(status.is_stable);
//! assert!(!monitor.should_stop());
//! ```

use serde::{Deserialize, Serialize};

use crate::solver::FVState;

/// Thresholds for stability monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityThresholds {
    /// Maximum allowed absolute value of any conserved variable.
    pub max_abs: f64,
    /// Minimum timestep before warning.
    pub min_dt: f64,
    /// Maximum consecutive warnings before recommending stop.
    pub max_consecutive_warnings: usize,
}

impl Default for StabilityThresholds {
    /// - max_abs: 1e10 (only catches blow-up)
    /// - min_dt: 0 (never warns)
    /// - max_consecutive_warnings: 10
    fn default() -> Self {
        Self {
            max_abs: 1e10,
            min_dt: 0.0,
            max_consecutive_warnings: 10,
        }
    }
}

impl StabilityThresholds {
    /// Thresholds for a step-size probe: any excursion beyond `max_abs` fails.
    pub fn probe(max_abs: f64) -> Self {
        Self {
            max_abs,
            min_dt: 0.0,
            max_consecutive_warnings: 1,
        }
    }

    /// Set maximum absolute value threshold.
    pub fn with_max_abs(mut self, max_abs: f64) -> Self {
        self.max_abs = max_abs;
        self
    }

    /// Set minimum timestep threshold.
    pub fn with_min_dt(mut self, min_dt: f64) -> Self {
        self.min_dt = min_dt;
        self
    }

    /// Set the number of consecutive warnings that stops a run.
    pub fn with_max_consecutive_warnings(mut self, n: usize) -> Self {
        self.max_consecutive_warnings = n;
        self
    }
}

/// Types of stability warnings.
#[derive(Debug, Clone, PartialEq)]
pub enum StabilityWarning {
    /// A conserved variable exceeds the magnitude bound.
    ExceedsBound {
        cell: usize,
        var: usize,
        value: f64,
        threshold: f64,
    },
    /// Timestep below minimum threshold.
    TimestepBelowMin { value: f64, threshold: f64 },
    /// NaN or Inf detected.
    NonFiniteValue { cell: usize, var: usize },
    /// Solution has blown up catastrophically.
    SolutionBlowUp,
}

impl std::fmt::Display for StabilityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExceedsBound {
                cell,
                var,
                value,
                threshold,
            } => write!(
                f,
                "|u|={:.3e} > {:.3e} at cell {}, variable {}",
                value.abs(),
                threshold,
                cell,
                var
            ),
            Self::TimestepBelowMin { value, threshold } => {
                write!(f, "Timestep below min: dt={:.2e} < {:.2e}", value, threshold)
            }
            Self::NonFiniteValue { cell, var } => {
                write!(f, "Non-finite value at cell {}, variable {}", cell, var)
            }
            Self::SolutionBlowUp => write!(f, "SOLUTION BLOW-UP DETECTED"),
        }
    }
}

/// Current stability status of the solution.
#[derive(Debug, Clone)]
pub struct StabilityStatus {
    /// Value range (min, max) over all finite entries.
    pub value_range: (f64, f64),
    /// Current timestep.
    pub dt: f64,
    /// Whether the solution is stable.
    pub is_stable: bool,
    /// List of warnings detected.
    pub warnings: Vec<StabilityWarning>,
}

impl StabilityStatus {
    /// Check if any warnings were generated.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if any critical warnings (blow-up, non-finite) were detected.
    pub fn has_critical_warnings(&self) -> bool {
        self.warnings.iter().any(|w| {
            matches!(
                w,
                StabilityWarning::SolutionBlowUp | StabilityWarning::NonFiniteValue { .. }
            )
        })
    }

    /// First warning as text, for error reports.
    pub fn summary(&self) -> String {
        match self.warnings.first() {
            Some(w) if self.warnings.len() > 1 => {
                format!("{} (+{} more)", w, self.warnings.len() - 1)
            }
            Some(w) => w.to_string(),
            None => "stable".to_string(),
        }
    }
}

/// Monitor for tracking solution stability.
#[derive(Debug, Clone)]
pub struct StabilityMonitor {
    thresholds: StabilityThresholds,
    consecutive_warnings: usize,
    total_checks: usize,
    total_warnings: usize,
    last_status: Option<StabilityStatus>,
}

impl StabilityMonitor {
    /// Create a new stability monitor with the given thresholds.
    pub fn new(thresholds: StabilityThresholds) -> Self {
        Self {
            thresholds,
            consecutive_warnings: 0,
            total_checks: 0,
            total_warnings: 0,
            last_status: None,
        }
    }

    /// Get the thresholds being used.
    pub fn thresholds(&self) -> &StabilityThresholds {
        &self.thresholds
    }

    /// Get the number of consecutive warnings.
    pub fn consecutive_warnings(&self) -> usize {
        self.consecutive_warnings
    }

    /// Get the total number of checks performed.
    pub fn total_checks(&self) -> usize {
        self.total_checks
    }

    /// Get the total number of warnings generated.
    pub fn total_warnings(&self) -> usize {
        self.total_warnings
    }

    /// Get the last stability status.
    pub fn last_status(&self) -> Option<&StabilityStatus> {
        self.last_status.as_ref()
    }

    /// Check the solution for stability issues.
    ///
    /// Only the first offending entry of each kind is reported.
    pub fn check(&mut self, q: &FVState, dt: f64) -> StabilityStatus {
        self.total_checks += 1;

        let mut warnings = Vec::new();
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        let mut non_finite = None;
        let mut exceeds = None;

        for (i, &v) in q.data.iter().enumerate() {
            if !v.is_finite() {
                non_finite.get_or_insert(i);
                continue;
            }
            min_v = min_v.min(v);
            max_v = max_v.max(v);
            if v.abs() > self.thresholds.max_abs {
                exceeds.get_or_insert((i, v));
            }
        }

        if let Some(i) = non_finite {
            warnings.push(StabilityWarning::NonFiniteValue {
                cell: i / q.n_vars,
                var: i % q.n_vars,
            });
        }
        if let Some((i, value)) = exceeds {
            warnings.push(StabilityWarning::ExceedsBound {
                cell: i / q.n_vars,
                var: i % q.n_vars,
                value,
                threshold: self.thresholds.max_abs,
            });
        }

        // Check timestep
        if !dt.is_finite() || dt < self.thresholds.min_dt {
            warnings.push(StabilityWarning::TimestepBelowMin {
                value: dt,
                threshold: self.thresholds.min_dt,
            });
        }

        // Check for catastrophic blow-up
        if non_finite.is_some() || max_v.abs() > 1e100 || min_v.abs() > 1e100 {
            warnings.push(StabilityWarning::SolutionBlowUp);
        }

        // Update tracking
        let is_stable = warnings.is_empty();
        if is_stable {
            self.consecutive_warnings = 0;
        } else {
            self.consecutive_warnings += 1;
            self.total_warnings += warnings.len();
        }

        let status = StabilityStatus {
            value_range: (min_v, max_v),
            dt,
            is_stable,
            warnings,
        };

        self.last_status = Some(status.clone());
        status
    }

    /// Check if the simulation should be stopped based on warning history.
    pub fn should_stop(&self) -> bool {
        // Stop if consecutive warnings exceed threshold
        if self.consecutive_warnings >= self.thresholds.max_consecutive_warnings {
            return true;
        }

        // Stop if last status had critical warnings
        if let Some(status) = &self.last_status {
            if status.has_critical_warnings() {
                return true;
            }
        }

        false
    }

    /// Log a formatted stability report through the `log` facade.
    pub fn log_report(&self, time: f64, step: usize) {
        if let Some(status) = &self.last_status {
            if !status.is_stable {
                log::warn!(
                    "stability warning at t={:.6e}, step {}: range [{:.3e}, {:.3e}], dt={:.2e}",
                    time,
                    step,
                    status.value_range.0,
                    status.value_range.1,
                    status.dt
                );
                for warning in &status.warnings {
                    log::warn!("  - {}", warning);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let t = StabilityThresholds::default();
        assert!((t.max_abs - 1e10).abs() < 1e-3);
        assert_eq!(t.min_dt, 0.0);
        assert_eq!(t.max_consecutive_warnings, 10);
    }

    #[test]
    fn test_stable_solution() {
        let q = FVState::uniform(4, &[1.0, -2.0]);
        let mut monitor = StabilityMonitor::new(StabilityThresholds::default());

        let status = monitor.check(&q, 0.1);
        assert!(status.is_stable);
        assert!(status.warnings.is_empty());
        assert_eq!(status.value_range, (-2.0, 1.0));
        assert!(!monitor.should_stop());
    }

    #[test]
    fn test_detect_bound_exceeded() {
        let mut q = FVState::uniform(4, &[1.0]);
        q.cell_mut(2)[0] = -5000.0;
        let mut monitor = StabilityMonitor::new(StabilityThresholds::probe(1000.0));

        let status = monitor.check(&q, 0.1);
        assert!(!status.is_stable);
        assert!(!status.has_critical_warnings());
        assert_eq!(
            status.warnings[0],
            StabilityWarning::ExceedsBound {
                cell: 2,
                var: 0,
                value: -5000.0,
                threshold: 1000.0
            }
        );
        // Probe thresholds stop on the first warning
        assert!(monitor.should_stop());
    }

    #[test]
    fn test_detect_non_finite() {
        let mut q = FVState::uniform(3, &[1.0, 1.0]);
        q.cell_mut(1)[1] = f64::INFINITY;
        let mut monitor = StabilityMonitor::new(StabilityThresholds::default());

        let status = monitor.check(&q, 0.1);
        assert!(status.has_critical_warnings());
        assert!(status
            .warnings
            .contains(&StabilityWarning::NonFiniteValue { cell: 1, var: 1 }));
        assert!(monitor.should_stop());
        assert!(status.summary().contains("Non-finite"));
    }

    #[test]
    fn test_timestep_floor() {
        let q = FVState::uniform(2, &[0.0]);
        let mut monitor =
            StabilityMonitor::new(StabilityThresholds::default().with_min_dt(1e-3));
        let status = monitor.check(&q, 1e-4);
        assert!(matches!(
            status.warnings[0],
            StabilityWarning::TimestepBelowMin { .. }
        ));
    }

    #[test]
    fn test_consecutive_warnings() {
        let q_bad = FVState::uniform(2, &[50.0]);
        let mut monitor = StabilityMonitor::new(
            StabilityThresholds::default()
                .with_max_abs(10.0)
                .with_max_consecutive_warnings(10),
        );

        // Generate consecutive warnings
        for _ in 0..5 {
            monitor.check(&q_bad, 1.0);
        }
        assert_eq!(monitor.consecutive_warnings(), 5);
        assert!(!monitor.should_stop()); // Need 10

        for _ in 0..5 {
            monitor.check(&q_bad, 1.0);
        }
        assert!(monitor.should_stop()); // Now at 10
        assert_eq!(monitor.total_checks(), 10);
        assert_eq!(monitor.total_warnings(), 10);

        monitor.check(&FVState::uniform(2, &[1.0]), 1.0);
        assert_eq!(monitor.consecutive_warnings(), 0);
    }
}
