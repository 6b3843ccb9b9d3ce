//! Explicit time stepper for the semi-discrete finite-volume system.
//!
//! Each stage evaluates the flux divergence and the source at the trial
//! state and sums them (operator splitting):
//!
//! ```text
//! k_i = L_fv(u_i) + S(u_i, t + c_i dt)
//! ```
//!
//! The stepper moves through [`StepperPhase`] while it works. Any error puts
//! it in [`StepperPhase::Terminated`]; a terminated stepper refuses further
//! calls with [`FvError::Terminated`].

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::butcher::ButcherTableau;
use super::integrator::IntegratorInfo;
use crate::analysis::{StabilityMonitor, StabilityThresholds};
use crate::error::{FvError, Result};
use crate::operators::{FiniteVolumeOperator, SourceOperator};
use crate::simulation::SolutionRecorder;
use crate::solver::{FVState, RunContext};

/// Remaining intervals below this fraction of `t_end` count as reached.
const END_TIME_TOL: f64 = 1e-12;
/// Snapshot thresholds are compared with this fraction of the interval as slack.
const SAVE_TOL: f64 = 1e-10;

/// What the stepper is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepperPhase {
    /// Between steps.
    #[default]
    Idle,
    /// Computing a stage increment.
    StageEvaluation,
    /// Combining stage increments into the step update.
    Accumulating,
    /// Copying the state into the recorder.
    Snapshotting,
    /// Finished or aborted; no further steps.
    Terminated,
}

impl std::fmt::Display for StepperPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::StageEvaluation => "stage-evaluation",
            Self::Accumulating => "accumulating",
            Self::Snapshotting => "snapshotting",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Parameters of the stable step-size search.
///
/// Starting at `initial_dt`, each attempt runs `probe_steps` steps on a copy
/// of the current state. An attempt fails when a value exceeds `max_abs` or
/// turns non-finite; dt is then divided by `shrink_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtSearch {
    pub initial_dt: f64,
    pub shrink_factor: f64,
    pub probe_steps: usize,
    pub max_abs: f64,
    pub max_attempts: usize,
}

impl Default for DtSearch {
    fn default() -> Self {
        Self {
            initial_dt: 0.1,
            shrink_factor: 2.0,
            probe_steps: 500,
            max_abs: 1000.0,
            max_attempts: 10,
        }
    }
}

impl DtSearch {
    pub fn new(initial_dt: f64) -> Self {
        Self {
            initial_dt,
            ..Self::default()
        }
    }

    pub fn with_shrink_factor(mut self, factor: f64) -> Self {
        self.shrink_factor = factor;
        self
    }

    pub fn with_probe_steps(mut self, steps: usize) -> Self {
        self.probe_steps = steps;
        self
    }

    pub fn with_max_abs(mut self, max_abs: f64) -> Self {
        self.max_abs = max_abs;
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.initial_dt.is_finite() && self.initial_dt > 0.0) {
            return Err(FvError::config(format!(
                "dt search needs a positive initial dt, got {}",
                self.initial_dt
            )));
        }
        if !(self.shrink_factor.is_finite() && self.shrink_factor > 1.0) {
            return Err(FvError::config(format!(
                "dt search shrink factor must exceed 1, got {}",
                self.shrink_factor
            )));
        }
        if self.max_abs.is_nan() || self.max_abs <= 0.0 {
            return Err(FvError::config("dt search bound must be positive"));
        }
        if self.probe_steps == 0 || self.max_attempts == 0 {
            return Err(FvError::config(
                "dt search needs at least one probe step and one attempt",
            ));
        }
        Ok(())
    }
}

/// Right-hand side L_fv + S of the semi-discrete system.
struct SplitRhs {
    fv: FiniteVolumeOperator,
    source: SourceOperator,
    #[cfg(feature = "parallel")]
    parallel: bool,
}

impl SplitRhs {
    fn evaluate(&self, context: &mut RunContext, q: &FVState, t: f64, dt: f64) -> Result<FVState> {
        let mut k = context.time("flux", || self.flux_rate(q, dt))?;
        let s = context.time("source", || self.source_rate(q, t))?;
        k.add(&s);

        context.n_stages += 1;
        context.n_flux_evaluations += self.fv.n_faces();
        context.n_source_evaluations += self.source.n_cells();
        Ok(k)
    }

    /// One Runge-Kutta step from `q` at time `t`. Fails on the first
    /// non-finite stage increment.
    fn step(
        &self,
        tableau: &ButcherTableau,
        context: &mut RunContext,
        q: &FVState,
        t: f64,
        dt: f64,
        step: usize,
    ) -> Result<FVState> {
        tableau.step(q, t, dt, |i, trial, t_stage| {
            let k = self.evaluate(context, trial, t_stage, dt)?;
            check_increment(&k, i, t_stage, dt, step)?;
            Ok(k)
        })
    }

    fn flux_rate(&self, q: &FVState, dt: f64) -> Result<FVState> {
        #[cfg(feature = "parallel")]
        if self.parallel {
            return self.fv.apply_parallel(q, dt);
        }
        self.fv.apply(q, dt)
    }

    fn source_rate(&self, q: &FVState, t: f64) -> Result<FVState> {
        #[cfg(feature = "parallel")]
        if self.parallel {
            return self.source.apply_parallel(q, t);
        }
        self.source.apply(q, t)
    }
}

/// Fail on the first NaN/Inf of a stage increment.
fn check_increment(k: &FVState, stage: usize, t: f64, dt: f64, step: usize) -> Result<()> {
    match k.first_non_finite() {
        Some((cell, var)) => Err(FvError::NumericalInstability {
            time: t,
            dt,
            step,
            reason: format!(
                "non-finite increment in stage {} at cell {}, variable {}",
                stage, cell, var
            ),
        }),
        None => Ok(()),
    }
}

/// Explicit Runge-Kutta driver with snapshot recording and dt search.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use fv_rs::boundary::PeriodicCoupler;
/// use fv_rs::equations::Advection1D;
/// use fv_rs::flux::FluxStrategy;
/// use fv_rs::mesh::Mesh1D;
/// use fv_rs::operators::{FiniteVolumeOperator, SourceOperator};
/// use fv_rs::solver::FVState;
/// use fv_rs::source::NoSource;
/// use fv_rs::time::{ButcherTableau, TimeStepper};
///
/// let mesh = Mesh1D::uniform_periodic(0.0, 1.0, 50).unwrap();
/// let fv = FiniteVolumeOperator::new(
///     mesh.clone(),
///     Arc::new(Advection1D::new(1.0)),
///     FluxStrategy::default(),
///     &PeriodicCoupler,
/// )
/// .unwrap();
/// let source = SourceOperator::new(Arc::new(NoSource), &mesh);
/// let u0 = FVState::from_fn(&mesh, 1, |x| vec![(6.0 * x).sin()]).unwrap();
///
/// let mut stepper = TimeStepper::new(fv, source, ButcherTableau::ssp_rk3(), u0)
///     .unwrap()
///     .with_save_interval(0.05)
///     .unwrap();
/// stepper.solve(0.1, 0.01).unwrap();
/// assert_eq!(stepper.recorder().len(), 2);
/// ```
pub struct TimeStepper {
    rhs: SplitRhs,
    tableau: ButcherTableau,
    state: FVState,
    time: f64,
    n_steps: usize,
    phase: StepperPhase,
    save_interval: Option<f64>,
    next_save: f64,
    record_initial: bool,
    recorder: SolutionRecorder,
    monitor: StabilityMonitor,
    context: RunContext,
}

impl std::fmt::Debug for TimeStepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeStepper")
            .field("tableau", &self.tableau.name())
            .field("time", &self.time)
            .field("n_steps", &self.n_steps)
            .field("phase", &self.phase)
            .field("snapshots", &self.recorder.len())
            .finish()
    }
}

impl TimeStepper {
    /// Create an idle stepper at t = 0 holding `initial`.
    pub fn new(
        fv: FiniteVolumeOperator,
        source: SourceOperator,
        tableau: ButcherTableau,
        initial: FVState,
    ) -> Result<Self> {
        initial.check_shape(fv.mesh(), fv.law().n_vars())?;
        if source.n_cells() != fv.mesh().n_cells() {
            return Err(FvError::config(format!(
                "source operator covers {} cells, mesh has {}",
                source.n_cells(),
                fv.mesh().n_cells()
            )));
        }
        if let Some((cell, var)) = initial.first_non_finite() {
            return Err(FvError::config(format!(
                "initial state is not finite at cell {}, variable {}",
                cell, var
            )));
        }

        Ok(Self {
            rhs: SplitRhs {
                fv,
                source,
                #[cfg(feature = "parallel")]
                parallel: false,
            },
            tableau,
            state: initial,
            time: 0.0,
            n_steps: 0,
            phase: StepperPhase::Idle,
            save_interval: None,
            next_save: f64::INFINITY,
            record_initial: false,
            recorder: SolutionRecorder::new(),
            monitor: StabilityMonitor::new(StabilityThresholds::default()),
            context: RunContext::new(),
        })
    }

    /// Record a snapshot each time the solution time crosses a multiple of
    /// `interval`.
    pub fn with_save_interval(mut self, interval: f64) -> Result<Self> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(FvError::config(format!(
                "save interval must be positive, got {}",
                interval
            )));
        }
        self.save_interval = Some(interval);
        self.next_save = self.time + interval;
        Ok(self)
    }

    /// Also record the state before the first step.
    pub fn with_record_initial(mut self, record: bool) -> Self {
        self.record_initial = record;
        self
    }

    pub fn with_thresholds(mut self, thresholds: StabilityThresholds) -> Self {
        self.monitor = StabilityMonitor::new(thresholds);
        self
    }

    /// Evaluate face fluxes and sources with rayon.
    #[cfg(feature = "parallel")]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.rhs.parallel = parallel;
        self
    }

    pub fn phase(&self) -> StepperPhase {
        self.phase
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    pub fn state(&self) -> &FVState {
        &self.state
    }

    pub fn tableau(&self) -> &ButcherTableau {
        &self.tableau
    }

    pub fn operator(&self) -> &FiniteVolumeOperator {
        &self.rhs.fv
    }

    pub fn recorder(&self) -> &SolutionRecorder {
        &self.recorder
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn monitor(&self) -> &StabilityMonitor {
        &self.monitor
    }

    /// Final state, recorded snapshots and run diagnostics.
    pub fn into_parts(self) -> (FVState, SolutionRecorder, RunContext) {
        (self.state, self.recorder, self.context)
    }

    /// Advance by one step of size `dt`. `dt == 0` leaves everything unchanged.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        self.ensure_active()?;
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(self.abort(FvError::config(format!(
                "step size must be finite and non-negative, got {}",
                dt
            ))));
        }
        if dt == 0.0 {
            return Ok(());
        }

        let step = self.n_steps + 1;
        match self.step_inner(dt) {
            Ok(()) => {
                self.phase = StepperPhase::Idle;
                Ok(())
            }
            Err(e) => {
                let err = e.at_step(self.time, step);
                Err(self.abort(err))
            }
        }
    }

    /// Step with `dt` until `t_end`, clipping the last step to land on it.
    ///
    /// The stepper is terminated afterwards.
    pub fn solve(&mut self, t_end: f64, dt: f64) -> Result<()> {
        self.ensure_active()?;
        if !t_end.is_finite() {
            return Err(self.abort(FvError::config(format!(
                "end time must be finite, got {}",
                t_end
            ))));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(self.abort(FvError::config(format!(
                "step size must be positive, got {}",
                dt
            ))));
        }

        log::info!(
            "solving t={:.4e} -> {:.4e}, dt={:.4e}, tableau={}, flux={}, source={}",
            self.time,
            t_end,
            dt,
            self.tableau.name(),
            self.rhs.fv.flux_name(),
            self.rhs.source.source_name()
        );

        let tol = END_TIME_TOL * t_end.abs();
        loop {
            let remaining = t_end - self.time;
            if remaining <= tol {
                break;
            }
            self.step(dt.min(remaining))?;
        }

        self.phase = StepperPhase::Terminated;
        log::info!(
            "reached t={:.6e} after {} steps, {} snapshots",
            self.time,
            self.n_steps,
            self.recorder.len()
        );
        self.context.log_summary();
        Ok(())
    }

    /// Search for a step size that stays bounded over a probe run.
    ///
    /// Probes run on a copy of the current state; the live state, time and
    /// recorder are untouched. Probe work is counted in
    /// [`RunContext::n_probe_stages`], not in the run's stage and evaluation
    /// counters. Fails with [`FvError::NoStableStepSize`] after
    /// `max_attempts` rejected sizes.
    pub fn find_suitable_dt(&mut self, search: &DtSearch) -> Result<f64> {
        self.ensure_active()?;
        if let Err(e) = search.validate() {
            return Err(self.abort(e));
        }

        let mut dt = search.initial_dt;
        for attempt in 1..=search.max_attempts {
            self.context.n_dt_probes += 1;
            let mut scratch = RunContext::new();
            let start = Instant::now();
            let outcome = self.probe(dt, search, &mut scratch);
            self.context.record("dt_search", start.elapsed());
            self.context.n_probe_stages += scratch.n_stages;

            match outcome {
                Ok(true) => {
                    log::info!("accepted dt={:.6e} after {} attempt(s)", dt, attempt);
                    return Ok(dt);
                }
                Ok(false) => dt /= search.shrink_factor,
                Err(e) => {
                    let err = e.at_step(self.time, self.n_steps);
                    return Err(self.abort(err));
                }
            }
        }

        Err(self.abort(FvError::NoStableStepSize {
            time: self.time,
            step: self.n_steps,
            attempts: search.max_attempts,
            initial_dt: search.initial_dt,
            final_dt: dt,
        }))
    }

    fn ensure_active(&self) -> Result<()> {
        if self.phase == StepperPhase::Terminated {
            return Err(FvError::Terminated { time: self.time });
        }
        Ok(())
    }

    fn abort(&mut self, err: FvError) -> FvError {
        log::error!(
            "run aborted at t={:.6e}, step {} ({}): {}",
            self.time,
            self.n_steps,
            self.phase,
            err
        );
        self.phase = StepperPhase::Terminated;
        err
    }

    fn step_inner(&mut self, dt: f64) -> Result<()> {
        self.record_initial_state()?;
        self.advance(dt)?;
        self.maybe_snapshot()
    }

    fn record_initial_state(&mut self) -> Result<()> {
        if self.record_initial && self.recorder.is_empty() {
            self.record()?;
        }
        Ok(())
    }

    fn record(&mut self) -> Result<()> {
        self.phase = StepperPhase::Snapshotting;
        self.recorder.record(self.time, &self.state)?;
        self.context.n_snapshots += 1;
        log::info!("snapshot {} at t={:.6e}", self.recorder.len(), self.time);
        Ok(())
    }

    /// One snapshot per crossing, however many thresholds the step passed.
    fn maybe_snapshot(&mut self) -> Result<()> {
        let Some(interval) = self.save_interval else {
            return Ok(());
        };
        let slack = SAVE_TOL * interval;
        if self.time + slack < self.next_save {
            return Ok(());
        }
        self.record()?;
        while self.next_save <= self.time + slack {
            self.next_save += interval;
        }
        Ok(())
    }

    fn advance(&mut self, dt: f64) -> Result<()> {
        let t0 = self.time;
        let step = self.n_steps + 1;

        self.phase = StepperPhase::StageEvaluation;
        let next = self
            .rhs
            .step(&self.tableau, &mut self.context, &self.state, t0, dt, step)?;

        self.phase = StepperPhase::Accumulating;
        let t_next = t0 + dt;

        let status = self.monitor.check(&next, dt);
        if status.has_critical_warnings() {
            return Err(FvError::NumericalInstability {
                time: t_next,
                dt,
                step,
                reason: status.summary(),
            });
        }
        if status.has_warnings() {
            self.monitor.log_report(t_next, step);
            if self.monitor.should_stop() {
                return Err(FvError::NumericalInstability {
                    time: t_next,
                    dt,
                    step,
                    reason: format!(
                        "{} consecutive stability warnings, last: {}",
                        self.monitor.consecutive_warnings(),
                        status.summary()
                    ),
                });
            }
        }

        self.state = next;
        self.time = t_next;
        self.n_steps = step;
        self.context.n_steps += 1;
        log::debug!(
            "step {}: t={:.6e}, dt={:.3e}, max|u|={:.3e}",
            step,
            self.time,
            dt,
            self.state.max_abs()
        );
        Ok(())
    }

    /// Whether `probe_steps` steps of size `dt` stay bounded.
    fn probe(&self, dt: f64, search: &DtSearch, scratch: &mut RunContext) -> Result<bool> {
        let mut monitor = StabilityMonitor::new(StabilityThresholds::probe(search.max_abs));
        let mut q = self.state.clone();
        let mut t = self.time;

        for n in 1..=search.probe_steps {
            let result = self.rhs.step(&self.tableau, scratch, &q, t, dt, n);
            q = match result {
                Ok(q) => q,
                Err(e) if e.is_numerical() => {
                    log::warn!("dt={:.6e} rejected at probe step {}: {}", dt, n, e);
                    return Ok(false);
                }
                Err(e) => return Err(e),
            };
            t += dt;

            let status = monitor.check(&q, dt);
            if monitor.should_stop() {
                log::warn!(
                    "dt={:.6e} rejected at probe step {}: {}",
                    dt,
                    n,
                    status.summary()
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::boundary::PeriodicCoupler;
    use crate::equations::Advection1D;
    use crate::flux::FluxStrategy;
    use crate::mesh::Mesh1D;
    use crate::source::{LinearRelaxation, NoSource, SourceTerm1D};

    const TOL: f64 = 1e-12;

    fn stepper_with(
        n: usize,
        source: Arc<dyn SourceTerm1D>,
        tableau: ButcherTableau,
    ) -> TimeStepper {
        let mesh = Mesh1D::uniform_periodic(0.0, 1.0, n).unwrap();
        let fv = FiniteVolumeOperator::new(
            mesh.clone(),
            Arc::new(Advection1D::new(1.0)),
            FluxStrategy::default(),
            &PeriodicCoupler,
        )
        .unwrap();
        let source = SourceOperator::new(source, &mesh);
        let u0 = FVState::from_fn(&mesh, 1, |x| vec![1.0 + 0.5 * (6.0 * x).sin()]).unwrap();
        TimeStepper::new(fv, source, tableau, u0).unwrap()
    }

    fn advection_stepper(n: usize) -> TimeStepper {
        stepper_with(n, Arc::new(NoSource), ButcherTableau::forward_euler())
    }

    #[test]
    fn test_zero_step_is_noop() {
        let mut stepper = advection_stepper(20);
        let before = stepper.state().clone();
        stepper.step(0.0).unwrap();
        assert_eq!(stepper.state(), &before);
        assert_eq!(stepper.time(), 0.0);
        assert_eq!(stepper.n_steps(), 0);
        assert_eq!(stepper.phase(), StepperPhase::Idle);
    }

    #[test]
    fn test_step_advances_time_and_counters() {
        let mut stepper = stepper_with(10, Arc::new(NoSource), ButcherTableau::ssp_rk3());
        stepper.step(0.01).unwrap();
        stepper.step(0.01).unwrap();
        assert!((stepper.time() - 0.02).abs() < TOL);
        assert_eq!(stepper.n_steps(), 2);

        let ctx = stepper.context();
        assert_eq!(ctx.n_steps, 2);
        assert_eq!(ctx.n_stages, 6);
        assert_eq!(ctx.n_flux_evaluations, 60);
        assert_eq!(ctx.n_source_evaluations, 60);
        assert_eq!(ctx.section("flux").map(|s| s.calls), Some(6));
    }

    #[test]
    fn test_heun_relaxation_step() {
        // du/dt = -u with Heun: one step gives 1 - dt + dt^2/2 everywhere
        let mesh = Mesh1D::uniform_periodic(0.0, 1.0, 4).unwrap();
        let fv = FiniteVolumeOperator::new(
            mesh.clone(),
            Arc::new(Advection1D::new(1.0)),
            FluxStrategy::default(),
            &PeriodicCoupler,
        )
        .unwrap();
        let source = SourceOperator::new(Arc::new(LinearRelaxation::new(1.0)), &mesh);
        let mut stepper = TimeStepper::new(
            fv,
            source,
            ButcherTableau::heun(),
            FVState::uniform(4, &[1.0]),
        )
        .unwrap();
        let dt = 0.1;
        stepper.step(dt).unwrap();
        let expected = 1.0 - dt + 0.5 * dt * dt;
        for k in 0..4 {
            assert!((stepper.state().cell(k)[0] - expected).abs() < TOL);
        }
    }

    #[test]
    fn test_one_snapshot_per_crossing() {
        let mut stepper = advection_stepper(20).with_save_interval(0.01).unwrap();
        for _ in 0..3 {
            stepper.step(0.004).unwrap();
        }
        assert_eq!(stepper.recorder().len(), 1);
        let snap = stepper.recorder().last().unwrap();
        assert!((snap.time - 0.012).abs() < TOL);

        // Next threshold is 0.02, reached at t = 0.02 (five steps)
        stepper.step(0.004).unwrap();
        assert_eq!(stepper.recorder().len(), 1);
        stepper.step(0.004).unwrap();
        assert_eq!(stepper.recorder().len(), 2);
    }

    #[test]
    fn test_overshooting_several_thresholds_records_once() {
        let mut stepper = advection_stepper(20).with_save_interval(0.001).unwrap();
        stepper.step(0.0035).unwrap();
        assert_eq!(stepper.recorder().len(), 1);
        stepper.step(0.0005).unwrap();
        assert_eq!(stepper.recorder().len(), 2);
    }

    #[test]
    fn test_record_initial() {
        let mut stepper = advection_stepper(20)
            .with_save_interval(0.01)
            .unwrap()
            .with_record_initial(true);
        stepper.step(0.004).unwrap();
        assert_eq!(stepper.recorder().len(), 1);
        assert_eq!(stepper.recorder().times(), vec![0.0]);
    }

    #[test]
    fn test_solve_clips_last_step() {
        let mut stepper = advection_stepper(20);
        stepper.solve(0.025, 0.01).unwrap();
        assert!((stepper.time() - 0.025).abs() < TOL);
        assert_eq!(stepper.n_steps(), 3);
        assert_eq!(stepper.phase(), StepperPhase::Terminated);
        assert!(matches!(
            stepper.step(0.01),
            Err(FvError::Terminated { .. })
        ));
    }

    #[test]
    fn test_solve_to_current_time_is_noop() {
        let mut stepper = advection_stepper(20);
        let before = stepper.state().clone();
        stepper.solve(0.0, 0.01).unwrap();
        assert_eq!(stepper.state(), &before);
        assert_eq!(stepper.n_steps(), 0);
    }

    #[test]
    fn test_invalid_dt_terminates() {
        let mut stepper = advection_stepper(20);
        let err = stepper.step(f64::INFINITY).unwrap_err();
        assert!(matches!(err, FvError::Configuration(_)));
        assert_eq!(stepper.phase(), StepperPhase::Terminated);
    }

    #[test]
    fn test_blow_up_reported_with_context() {
        let mut stepper = stepper_with(
            10,
            Arc::new(LinearRelaxation::new(-1e200)),
            ButcherTableau::forward_euler(),
        );
        // The first step overflows
        let err = stepper.step(1e200).unwrap_err();
        match err {
            FvError::NumericalInstability { step, .. } => assert_eq!(step, 1),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stepper.phase(), StepperPhase::Terminated);
        assert_eq!(stepper.time(), 0.0);
    }

    #[test]
    fn test_dt_search_accepts_stable_dt() {
        let mut stepper = advection_stepper(20);
        let before = stepper.state().clone();
        let search = DtSearch::new(0.01).with_probe_steps(20);
        let dt = stepper.find_suitable_dt(&search).unwrap();
        assert!((dt - 0.01).abs() < TOL);
        assert_eq!(stepper.state(), &before);
        assert_eq!(stepper.time(), 0.0);
        assert_eq!(stepper.context().n_dt_probes, 1);
        assert_eq!(stepper.phase(), StepperPhase::Idle);
    }

    #[test]
    fn test_dt_search_work_kept_out_of_run_counters() {
        let mut stepper = stepper_with(10, Arc::new(NoSource), ButcherTableau::heun());
        let search = DtSearch::new(0.01).with_probe_steps(20);
        stepper.find_suitable_dt(&search).unwrap();

        let ctx = stepper.context();
        assert_eq!(ctx.n_probe_stages, 40);
        assert_eq!(ctx.n_stages, 0);
        assert_eq!(ctx.n_flux_evaluations, 0);
        assert_eq!(ctx.n_source_evaluations, 0);
        assert!(ctx.section("flux").is_none());

        stepper.step(0.01).unwrap();
        let ctx = stepper.context();
        assert_eq!(ctx.n_stages, 2);
        assert_eq!(ctx.n_flux_evaluations, 20);
        assert_eq!(ctx.n_probe_stages, 40);
    }

    #[test]
    fn test_step_uses_tableau_stage_loop() {
        // The live step and the tableau's own step agree exactly
        let mut stepper = stepper_with(
            16,
            Arc::new(LinearRelaxation::new(0.3)),
            ButcherTableau::classic_rk4(),
        );
        let u0 = stepper.state().clone();
        let mut scratch = RunContext::new();
        let expected = stepper
            .rhs
            .step(stepper.tableau(), &mut scratch, &u0, 0.0, 0.01, 1)
            .unwrap();
        stepper.step(0.01).unwrap();
        assert_eq!(stepper.state(), &expected);
        assert_eq!(scratch.n_stages, stepper.context().n_stages);
    }

    #[test]
    fn test_snapshot_failure_reports_time_and_step() {
        // A recorder that already holds a later snapshot rejects the next one
        let mut stepper = advection_stepper(10).with_save_interval(0.01).unwrap();
        stepper.recorder.record(1.0, &FVState::new(10, 1)).unwrap();

        let err = stepper.step(0.01).unwrap_err();
        match err {
            FvError::StepInvariantViolation { time, step, .. } => {
                assert!((time - 0.01).abs() < TOL);
                assert_eq!(step, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stepper.phase(), StepperPhase::Terminated);
    }

    #[test]
    fn test_dt_search_shrinks() {
        // Upwind advection with h = 0.05 is stable for dt <= 0.05 (LF at dx/dt is always
        // stable, so use a local-speed flux)
        let mesh = Mesh1D::uniform_periodic(0.0, 1.0, 20).unwrap();
        let fv = FiniteVolumeOperator::new(
            mesh.clone(),
            Arc::new(Advection1D::new(1.0)),
            FluxStrategy::LaxFriedrichs {
                dissipation: crate::flux::Dissipation::Local,
            },
            &PeriodicCoupler,
        )
        .unwrap();
        let source = SourceOperator::new(Arc::new(NoSource), &mesh);
        let u0 = FVState::from_fn(&mesh, 1, |x| vec![(2.0 * std::f64::consts::PI * x).sin()])
            .unwrap();
        let mut stepper =
            TimeStepper::new(fv, source, ButcherTableau::forward_euler(), u0).unwrap();

        let search = DtSearch::new(0.4).with_probe_steps(200);
        let dt = stepper.find_suitable_dt(&search).unwrap();
        assert!((dt - 0.05).abs() < TOL);
        assert_eq!(stepper.context().n_dt_probes, 4);
    }

    #[test]
    fn test_invalid_dt_search() {
        let mut stepper = advection_stepper(20);
        let search = DtSearch::default().with_shrink_factor(1.0);
        assert!(matches!(
            stepper.find_suitable_dt(&search),
            Err(FvError::Configuration(_))
        ));
    }

    #[test]
    fn test_dt_search_serde_defaults() {
        let search: DtSearch = serde_json::from_str(r#"{"initial_dt": 0.5}"#).unwrap();
        assert_eq!(search, DtSearch::new(0.5));
        assert_eq!(search.max_attempts, 10);
        assert_eq!(search.probe_steps, 500);
    }

    #[test]
    fn test_rejects_mismatched_initial_state() {
        let mesh = Mesh1D::uniform_periodic(0.0, 1.0, 8).unwrap();
        let fv = FiniteVolumeOperator::new(
            mesh.clone(),
            Arc::new(Advection1D::new(1.0)),
            FluxStrategy::default(),
            &PeriodicCoupler,
        )
        .unwrap();
        let source = SourceOperator::new(Arc::new(NoSource), &mesh);
        let result = TimeStepper::new(
            fv,
            source,
            ButcherTableau::forward_euler(),
            FVState::new(7, 1),
        );
        assert!(matches!(result, Err(FvError::Configuration(_))));
    }
}
