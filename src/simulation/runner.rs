//! Simulation runner implementation.
//!
//! Assembles a [`Problem`] into operators and a [`TimeStepper`], runs it to
//! the configured end time and collects the results.

use serde::{Deserialize, Serialize};

use super::recorder::Trajectory;
use crate::analysis::StabilityThresholds;
use crate::boundary::PeriodicCoupler;
use crate::error::{FvError, Result};
use crate::flux::FluxStrategy;
use crate::mesh::Mesh1D;
use crate::operators::{FiniteVolumeOperator, SourceOperator};
use crate::problems::Problem;
use crate::solver::{FVState, RunContext};
use crate::time::{DtSearch, IntegratorInfo, TableauKind, TimeStepper};

// =============================================================================
// Simulation Configuration
// =============================================================================

/// Configuration for a simulation run.
///
/// Every field has a default, so a JSON document only needs the values it
/// changes:
///
/// ```
/// use fv_rs::simulation::SimulationConfig;
/// use fv_rs::time::TableauKind;
///
/// let config = SimulationConfig::from_json_str(
///     r#"{ "t_end": 0.5, "dt": 0.001, "tableau": "ssp_rk3" }"#,
/// )
/// .unwrap();
/// assert_eq!(config.tableau, TableauKind::SspRk3);
/// assert_eq!(config.save_interval, None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// End time of the run.
    pub t_end: f64,
    /// Step size, unless `dt_search` replaces it.
    pub dt: f64,
    /// Interval between recorded snapshots; no snapshots when absent.
    pub save_interval: Option<f64>,
    /// Record the initial state as the first snapshot.
    pub record_initial: bool,
    /// Runge-Kutta scheme.
    pub tableau: TableauKind,
    /// Numerical flux and limiter.
    pub flux: FluxStrategy,
    /// Search for a stable step size before the run.
    pub dt_search: Option<DtSearch>,
    /// Stability checks on committed steps.
    pub thresholds: StabilityThresholds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            t_end: 1.0,
            dt: 1e-3,
            save_interval: None,
            record_initial: false,
            tableau: TableauKind::default(),
            flux: FluxStrategy::default(),
            dt_search: None,
            thresholds: StabilityThresholds::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.t_end.is_finite() && self.t_end >= 0.0) {
            return Err(FvError::config(format!(
                "t_end must be finite and non-negative, got {}",
                self.t_end
            )));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(FvError::config(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if let Some(interval) = self.save_interval {
            if !(interval.is_finite() && interval > 0.0) {
                return Err(FvError::config(format!(
                    "save_interval must be positive, got {}",
                    interval
                )));
            }
        }
        if let Some(search) = &self.dt_search {
            search.validate()?;
        }
        Ok(())
    }

    pub fn with_t_end(mut self, t_end: f64) -> Self {
        self.t_end = t_end;
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_save_interval(mut self, interval: f64) -> Self {
        self.save_interval = Some(interval);
        self
    }

    pub fn with_record_initial(mut self, record: bool) -> Self {
        self.record_initial = record;
        self
    }

    pub fn with_tableau(mut self, tableau: TableauKind) -> Self {
        self.tableau = tableau;
        self
    }

    pub fn with_flux(mut self, flux: FluxStrategy) -> Self {
        self.flux = flux;
        self
    }

    pub fn with_dt_search(mut self, search: DtSearch) -> Self {
        self.dt_search = Some(search);
        self
    }

    pub fn with_thresholds(mut self, thresholds: StabilityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

// =============================================================================
// Simulation Result
// =============================================================================

/// Result of a completed simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// Final simulation time reached.
    pub final_time: f64,
    /// Total number of time steps taken.
    pub n_steps: usize,
    /// Step size used (found by the search if one was configured).
    pub dt: f64,
    /// Mesh the solution lives on.
    pub mesh: Mesh1D,
    /// State at `final_time`.
    pub final_state: FVState,
    /// Recorded snapshots.
    pub trajectory: Trajectory,
    /// Timings and counters.
    pub context: RunContext,
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// High-level simulation runner.
///
/// # Example
/// ```
/// use fv_rs::problems::BurgersProblem;
/// use fv_rs::simulation::Simulation;
///
/// let sim = Simulation::new(BurgersProblem::default());
/// let config = sim.config().clone().with_t_end(0.05);
/// let result = sim.with_config(config).run().unwrap();
///
/// assert!((result.final_time - 0.05).abs() < 1e-12);
/// assert_eq!(result.trajectory.len(), 5);
/// ```
pub struct Simulation<P: Problem> {
    problem: P,
    config: SimulationConfig,
}

impl<P: Problem> Simulation<P> {
    /// Create a runner with the problem's default configuration.
    pub fn new(problem: P) -> Self {
        let config = problem.default_config();
        Self { problem, config }
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Build mesh, pairing, operators and stepper without running.
    pub fn build_stepper(&self) -> Result<TimeStepper> {
        self.config.validate()?;

        let mesh = self.problem.mesh()?;
        let law = self.problem.law();
        let initial = FVState::from_fn(&mesh, law.n_vars(), |x| self.problem.initial_values(x))?;

        let fv = FiniteVolumeOperator::new(mesh.clone(), law, self.config.flux, &PeriodicCoupler)?;
        let source = SourceOperator::new(self.problem.source(), &mesh);

        let mut stepper = TimeStepper::new(fv, source, self.config.tableau.tableau(), initial)?
            .with_record_initial(self.config.record_initial)
            .with_thresholds(self.config.thresholds);
        if let Some(interval) = self.config.save_interval {
            stepper = stepper.with_save_interval(interval)?;
        }
        Ok(stepper)
    }

    /// Run the problem to `t_end`.
    pub fn run(&self) -> Result<SimulationResult> {
        let mut stepper = self.build_stepper()?;
        let mesh = stepper.operator().mesh().clone();

        log::info!(
            "{}: {} cells on [{}, {}], {} variables, tableau={} (order {})",
            self.problem.name(),
            mesh.n_cells(),
            mesh.x_min,
            mesh.x_max,
            stepper.state().n_vars,
            stepper.tableau().name(),
            stepper.tableau().order()
        );

        let dt = match &self.config.dt_search {
            Some(search) => stepper.find_suitable_dt(search)?,
            None => self.config.dt,
        };
        log::info!("dt={:.6e}, dt/dx={:.4}", dt, dt / mesh.h_min());

        stepper.solve(self.config.t_end, dt)?;

        let final_time = stepper.time();
        let n_steps = stepper.n_steps();
        let (final_state, recorder, context) = stepper.into_parts();
        Ok(SimulationResult {
            final_time,
            n_steps,
            dt,
            mesh,
            final_state,
            trajectory: recorder.into_trajectory(),
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::{BurgersProblem, TransportProblem};
    use crate::solver::SlopeLimiter;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tableau, TableauKind::ForwardEuler);
        assert!(config.dt_search.is_none());
        assert!(!config.record_initial);
    }

    #[test]
    fn test_config_validation() {
        assert!(SimulationConfig::default().with_dt(0.0).validate().is_err());
        assert!(SimulationConfig::default().with_t_end(f64::NAN).validate().is_err());
        assert!(
            SimulationConfig::default()
                .with_save_interval(-1.0)
                .validate()
                .is_err()
        );
        assert!(
            SimulationConfig::default()
                .with_dt_search(DtSearch::new(0.0))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimulationConfig::default()
            .with_t_end(2.0)
            .with_save_interval(0.1)
            .with_tableau(TableauKind::ClassicRk4)
            .with_flux(FluxStrategy::Godunov {
                limiter: SlopeLimiter::Superbee,
            })
            .with_dt_search(DtSearch::default());
        let json = config.to_json_string().unwrap();
        let parsed = SimulationConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            SimulationConfig::from_json_str("{ t_end: 1 }"),
            Err(FvError::ConfigParse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json_str(r#"{ "dt": -1.0 }"#),
            Err(FvError::Configuration(_))
        ));
    }

    #[test]
    fn test_run_records_snapshots() {
        let config = SimulationConfig::default()
            .with_t_end(0.02)
            .with_dt(0.005)
            .with_save_interval(0.01)
            .with_record_initial(true);
        let result = Simulation::new(BurgersProblem::default())
            .with_config(config)
            .run()
            .unwrap();

        assert_eq!(result.n_steps, 4);
        assert_eq!(result.trajectory.len(), 3);
        assert_eq!(result.trajectory.first().map(|s| s.time), Some(0.0));
        assert_eq!(result.context.n_steps, 4);
        assert_eq!(result.final_state.n_cells, result.mesh.n_cells());
    }

    #[test]
    fn test_run_conserves_mass() {
        let problem = TransportProblem::default();
        let sim = Simulation::new(problem);
        let config = sim.config().clone().with_t_end(0.05);
        let sim = sim.with_config(config);

        let initial = sim.build_stepper().unwrap().state().clone();
        let result = sim.run().unwrap();
        let before = initial.integrate(&result.mesh)[0];
        let after = result.final_state.integrate(&result.mesh)[0];
        assert!((before - after).abs() < 1e-12);
    }
}
