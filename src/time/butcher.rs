//! Explicit Runge-Kutta schemes given by a Butcher tableau.
//!
//! ```text
//! k_i = L(u + dt Σ_{j<i} A[i][j] k_j,  t + c_i dt)
//! u_new = u + dt Σ_i b_i k_i
//! ```
//!
//! with c_i = Σ_j A[i][j]. Only explicit (strictly lower-triangular) tableaus
//! are accepted.

use serde::{Deserialize, Serialize};

use super::integrator::{Integrable, IntegratorInfo};
use crate::error::{FvError, Result};

const ORDER_TOL: f64 = 1e-10;

/// Coefficients (A, b) of an explicit Runge-Kutta method.
///
/// Serialized as `{ "a": [[...]], "b": [...] }`; name, order and nodes are
/// derived again when read back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableauCoefficients", into = "TableauCoefficients")]
pub struct ButcherTableau {
    #[serde(skip)]
    name: &'static str,
    order: usize,
    ssp: bool,
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    c: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct TableauCoefficients {
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
}

impl From<ButcherTableau> for TableauCoefficients {
    fn from(tableau: ButcherTableau) -> Self {
        Self {
            a: tableau.a,
            b: tableau.b,
        }
    }
}

impl TryFrom<TableauCoefficients> for ButcherTableau {
    type Error = FvError;

    fn try_from(raw: TableauCoefficients) -> Result<Self> {
        Self::new(raw.a, raw.b)
    }
}

impl ButcherTableau {
    /// Build a tableau from coefficients.
    ///
    /// `a` must be square with one row per weight in `b`, strictly lower
    /// triangular, and finite. Consistency (Σ b = 1) is not required; the
    /// reported order is 0 for inconsistent tableaus.
    pub fn new(a: Vec<Vec<f64>>, b: Vec<f64>) -> Result<Self> {
        let s = b.len();
        if s == 0 {
            return Err(FvError::config("Butcher tableau needs at least one stage"));
        }
        if a.len() != s {
            return Err(FvError::config(format!(
                "Butcher matrix has {} rows but {} weights",
                a.len(),
                s
            )));
        }
        for (i, row) in a.iter().enumerate() {
            if row.len() != s {
                return Err(FvError::config(format!(
                    "Butcher matrix row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    s
                )));
            }
            if let Some(j) = (i..s).find(|&j| row[j] != 0.0) {
                return Err(FvError::config(format!(
                    "Butcher matrix entry A[{}][{}] = {} makes the scheme implicit",
                    i, j, row[j]
                )));
            }
        }
        if a.iter().flatten().chain(&b).any(|v| !v.is_finite()) {
            return Err(FvError::config("Butcher tableau has non-finite coefficients"));
        }

        let c = a.iter().map(|row| row.iter().sum()).collect();
        let mut tableau = Self {
            name: "custom",
            order: 0,
            ssp: false,
            a,
            b,
            c,
        };
        tableau.order = tableau.estimate_order();
        Ok(tableau)
    }

    fn preset(name: &'static str, ssp: bool, a: Vec<Vec<f64>>, b: Vec<f64>) -> Self {
        let c = a.iter().map(|row| row.iter().sum()).collect();
        let mut tableau = Self {
            name,
            order: 0,
            ssp,
            a,
            b,
            c,
        };
        tableau.order = tableau.estimate_order();
        tableau
    }

    /// Forward Euler: A = [0], b = [1].
    pub fn forward_euler() -> Self {
        Self::preset("forward-euler", true, vec![vec![0.0]], vec![1.0])
    }

    /// Generic second-order method with x = 1 (Heun):
    /// A = [0 0; 1 0], b = [1/2 1/2].
    pub fn heun() -> Self {
        Self::preset(
            "heun",
            true,
            vec![vec![0.0, 0.0], vec![1.0, 0.0]],
            vec![0.5, 0.5],
        )
    }

    /// Three-stage SSP method of Shu and Osher, stage times t, t+dt, t+dt/2.
    pub fn ssp_rk3() -> Self {
        Self::preset(
            "ssp-rk3",
            true,
            vec![
                vec![0.0, 0.0, 0.0],
                vec![1.0, 0.0, 0.0],
                vec![0.25, 0.25, 0.0],
            ],
            vec![1.0 / 6.0, 1.0 / 6.0, 2.0 / 3.0],
        )
    }

    /// Classic fourth-order Runge-Kutta.
    pub fn classic_rk4() -> Self {
        Self::preset(
            "classic-rk4",
            false,
            vec![
                vec![0.0, 0.0, 0.0, 0.0],
                vec![0.5, 0.0, 0.0, 0.0],
                vec![0.0, 0.5, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
        )
    }

    /// Stage matrix A.
    pub fn a(&self) -> &[Vec<f64>] {
        &self.a
    }

    /// Weights b.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Nodes c_i = Σ_j A[i][j].
    pub fn c(&self) -> &[f64] {
        &self.c
    }

    /// Trial state of stage `i`: u + dt Σ_{j<i} A[i][j] k_j.
    pub fn stage_state<S: Integrable>(&self, i: usize, base: &S, increments: &[S], dt: f64) -> S {
        let mut stage = base.clone();
        for (j, k) in increments.iter().enumerate().take(i) {
            let a_ij = self.a[i][j];
            if a_ij != 0.0 {
                stage.axpy(dt * a_ij, k);
            }
        }
        stage
    }

    /// Step update: u + dt Σ_i b_i k_i.
    pub fn combine<S: Integrable>(&self, base: &S, increments: &[S], dt: f64) -> S {
        let mut out = base.clone();
        for (b_i, k) in self.b.iter().zip(increments) {
            if *b_i != 0.0 {
                out.axpy(dt * b_i, k);
            }
        }
        out
    }

    /// Advance `state` by one step.
    ///
    /// `rhs(stage, trial_state, stage_time)` returns the stage increment; an
    /// error from any stage aborts the step.
    pub fn step<S, F>(&self, state: &S, t: f64, dt: f64, mut rhs: F) -> Result<S>
    where
        S: Integrable,
        F: FnMut(usize, &S, f64) -> Result<S>,
    {
        let mut increments: Vec<S> = Vec::with_capacity(self.b.len());
        for i in 0..self.b.len() {
            let stage = self.stage_state(i, state, &increments, dt);
            let k = rhs(i, &stage, t + self.c[i] * dt)?;
            increments.push(k);
        }
        Ok(self.combine(state, &increments, dt))
    }

    /// Highest order (up to 4) whose order conditions hold.
    fn estimate_order(&self) -> usize {
        let s = self.b.len();
        let (a, b, c) = (&self.a, &self.b, &self.c);
        let close = |x: f64, y: f64| (x - y).abs() < ORDER_TOL;
        let sum = |f: &dyn Fn(usize) -> f64| (0..s).map(f).sum::<f64>();

        // a_c[i] = Σ_j A[i][j] c_j
        let a_c: Vec<f64> = (0..s).map(|i| sum(&|j| a[i][j] * c[j])).collect();

        if !close(sum(&|i| b[i]), 1.0) {
            return 0;
        }
        if !close(sum(&|i| b[i] * c[i]), 0.5) {
            return 1;
        }
        if !(close(sum(&|i| b[i] * c[i] * c[i]), 1.0 / 3.0)
            && close(sum(&|i| b[i] * a_c[i]), 1.0 / 6.0))
        {
            return 2;
        }
        let a_c2: Vec<f64> = (0..s).map(|i| sum(&|j| a[i][j] * c[j] * c[j])).collect();
        let a_a_c: Vec<f64> = (0..s).map(|i| sum(&|j| a[i][j] * a_c[j])).collect();
        if !(close(sum(&|i| b[i] * c[i].powi(3)), 0.25)
            && close(sum(&|i| b[i] * c[i] * a_c[i]), 0.125)
            && close(sum(&|i| b[i] * a_c2[i]), 1.0 / 12.0)
            && close(sum(&|i| b[i] * a_a_c[i]), 1.0 / 24.0))
        {
            return 3;
        }
        4
    }
}

impl IntegratorInfo for ButcherTableau {
    fn name(&self) -> &'static str {
        self.name
    }

    fn order(&self) -> usize {
        self.order
    }

    fn n_stages(&self) -> usize {
        self.b.len()
    }

    fn is_ssp(&self) -> bool {
        self.ssp
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        self.c.iter().map(|c| c * dt).collect()
    }
}

/// Configuration-level tableau selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableauKind {
    #[default]
    ForwardEuler,
    Heun,
    SspRk3,
    ClassicRk4,
    /// User-supplied coefficients `{ "a": [[...]], "b": [...] }`
    Custom(ButcherTableau),
}

impl TableauKind {
    pub fn tableau(&self) -> ButcherTableau {
        match self {
            TableauKind::ForwardEuler => ButcherTableau::forward_euler(),
            TableauKind::Heun => ButcherTableau::heun(),
            TableauKind::SspRk3 => ButcherTableau::ssp_rk3(),
            TableauKind::ClassicRk4 => ButcherTableau::classic_rk4(),
            TableauKind::Custom(t) => t.clone(),
        }
    }
}
