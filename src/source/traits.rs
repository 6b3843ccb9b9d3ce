//! 1D source term trait and composition.

/// Trait for source terms of 1D conservation laws.
///
/// Source terms modify the RHS of the equations:
/// dq/dt = -∂F/∂x + S(q, x, t)
///
/// Sources are evaluated cell by cell with no neighbor coupling.
pub trait SourceTerm1D: Send + Sync {
    /// Evaluate the source term contribution for one cell.
    ///
    /// # Arguments
    /// * `state` - Cell average of the conserved variables
    /// * `position` - Cell center x
    /// * `time` - Current (stage) time
    ///
    /// # Returns
    /// Source contribution, same length as `state`
    fn evaluate(&self, state: &[f64], position: f64, time: f64) -> Vec<f64>;

    /// Name of this source term for debugging.
    fn name(&self) -> &'static str;
}

/// The zero source.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSource;

impl SourceTerm1D for NoSource {
    fn evaluate(&self, state: &[f64], _position: f64, _time: f64) -> Vec<f64> {
        vec![0.0; state.len()]
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

type SourceFn = dyn Fn(&[f64], f64, f64) -> Vec<f64> + Send + Sync;

/// Source term defined by a closure `(state, x, t) -> s`.
pub struct FnSource {
    f: Box<SourceFn>,
    name: &'static str,
}

impl FnSource {
    pub fn new<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(&[f64], f64, f64) -> Vec<f64> + Send + Sync + 'static,
    {
        Self {
            f: Box::new(f),
            name,
        }
    }
}

impl std::fmt::Debug for FnSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").field("name", &self.name).finish()
    }
}

impl SourceTerm1D for FnSource {
    fn evaluate(&self, state: &[f64], position: f64, time: f64) -> Vec<f64> {
        (self.f)(state, position, time)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Combine multiple source terms by summing their contributions.
#[derive(Default)]
pub struct CombinedSource {
    sources: Vec<Box<dyn SourceTerm1D>>,
}

impl CombinedSource {
    /// Create a new combined source from a list of source terms.
    pub fn new(sources: Vec<Box<dyn SourceTerm1D>>) -> Self {
        Self { sources }
    }

    /// Append another source term.
    pub fn with(mut self, source: impl SourceTerm1D + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl SourceTerm1D for CombinedSource {
    fn evaluate(&self, state: &[f64], position: f64, time: f64) -> Vec<f64> {
        let mut total = vec![0.0; state.len()];
        for source in &self.sources {
            let contrib = source.evaluate(state, position, time);
            for (t, c) in total.iter_mut().zip(&contrib) {
                *t += c;
            }
        }
        total
    }

    fn name(&self) -> &'static str {
        "combined"
    }
}
