//! Per-run diagnostics and profiling.
//!
//! A [`RunContext`] is created for one run, owned by the time stepper and
//! handed back to the caller when the run ends. It replaces process-wide
//! profiler state: named timing sections, step and stage counters, and the
//! number of flux and source evaluations.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Accumulated timing of one named section.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SectionTiming {
    /// Number of times the section was entered
    pub calls: usize,
    /// Total wall time spent in the section
    pub total: Duration,
}

impl SectionTiming {
    /// Mean wall time per call.
    pub fn mean(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / self.calls as u32
        }
    }
}

/// Diagnostics of one simulation run.
#[derive(Clone, Debug)]
pub struct RunContext {
    /// Start of the run (wall clock)
    start_instant: Instant,
    sections: BTreeMap<&'static str, SectionTiming>,
    /// Committed time steps
    pub n_steps: usize,
    /// Runge-Kutta stages evaluated
    pub n_stages: usize,
    /// Numerical flux evaluations (one per face per stage)
    pub n_flux_evaluations: usize,
    /// Source evaluations (one per cell per stage)
    pub n_source_evaluations: usize,
    /// Snapshots recorded
    pub n_snapshots: usize,
    /// Step-size probes run by the adaptive search
    pub n_dt_probes: usize,
    /// Runge-Kutta stages evaluated by those probes, kept apart from `n_stages`
    pub n_probe_stages: usize,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    /// Start a new run context.
    pub fn new() -> Self {
        Self {
            start_instant: Instant::now(),
            sections: BTreeMap::new(),
            n_steps: 0,
            n_stages: 0,
            n_flux_evaluations: 0,
            n_source_evaluations: 0,
            n_snapshots: 0,
            n_dt_probes: 0,
            n_probe_stages: 0,
        }
    }

    /// Run `f` and add its wall time to the named section.
    pub fn time<T>(&mut self, section: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(section, start.elapsed());
        out
    }

    /// Add an externally measured duration to a section.
    pub fn record(&mut self, section: &'static str, elapsed: Duration) {
        let entry = self.sections.entry(section).or_default();
        entry.calls += 1;
        entry.total += elapsed;
    }

    /// Timing of one section, if it was ever entered.
    pub fn section(&self, name: &str) -> Option<&SectionTiming> {
        self.sections.get(name)
    }

    /// All sections in name order.
    pub fn sections(&self) -> impl Iterator<Item = (&'static str, &SectionTiming)> {
        self.sections.iter().map(|(k, v)| (*k, v))
    }

    /// Wall time since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.start_instant.elapsed()
    }

    /// One-line summary for log output.
    pub fn summary_line(&self) -> String {
        let elapsed = self.elapsed().as_secs_f64();
        let steps_per_sec = if elapsed > 0.0 {
            self.n_steps as f64 / elapsed
        } else {
            0.0
        };
        let probes = if self.n_dt_probes > 0 {
            format!(
                " dt_probes={} probe_stages={}",
                self.n_dt_probes, self.n_probe_stages
            )
        } else {
            String::new()
        };
        format!(
            "steps={} stages={} flux_evals={} source_evals={} snapshots={} wall={} ({:.0} steps/s){}",
            self.n_steps,
            self.n_stages,
            self.n_flux_evaluations,
            self.n_source_evaluations,
            self.n_snapshots,
            format_duration(elapsed),
            steps_per_sec,
            probes
        )
    }

    /// Per-section timing table.
    pub fn detailed(&self) -> String {
        let mut out = String::new();
        for (name, timing) in &self.sections {
            out.push_str(&format!(
                "{:<16} calls={:<8} total={:<8} mean={:.3e}s\n",
                name,
                timing.calls,
                format_duration(timing.total.as_secs_f64()),
                timing.mean().as_secs_f64()
            ));
        }
        out
    }

    /// Emit the summary and the section table through the `log` facade.
    pub fn log_summary(&self) {
        log::info!("run finished: {}", self.summary_line());
        for line in self.detailed().lines() {
            log::debug!("  {}", line);
        }
    }
}

/// Format a duration in seconds as human-readable string.
fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.3}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let s = secs - mins * 60.0;
        format!("{:.0}m{:.0}s", mins, s)
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs - hours * 3600.0) / 60.0).floor();
        format!("{:.0}h{:.0}m", hours, mins)
    }
}
