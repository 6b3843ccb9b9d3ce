//! Linear relaxation source.
//!
//! S(q) = -k q
//!
//! Decays every component towards zero with rate k. A negative rate gives
//! exponential growth, which is useful for exercising instability handling.

use serde::{Deserialize, Serialize};

use super::SourceTerm1D;

/// Linear relaxation S(q) = -rate * q.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearRelaxation {
    pub rate: f64,
}

impl LinearRelaxation {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl SourceTerm1D for LinearRelaxation {
    fn evaluate(&self, state: &[f64], _position: f64, _time: f64) -> Vec<f64> {
        state.iter().map(|&q| -self.rate * q).collect()
    }

    fn name(&self) -> &'static str {
        "linear-relaxation"
    }
}
