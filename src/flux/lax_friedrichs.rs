//! Lax-Friedrichs numerical flux.
//!
//! F* = 0.5 * (F(q_l) + F(q_r)) · n - 0.5 * λ * (q_r - q_l)
//!
//! First-order and maximally dissipative, but defined for any conservation law
//! since it needs nothing beyond the analytical flux.

use super::traits::{Dissipation, FluxContext1D, NumericalFlux1D};
use crate::equations::ConservationLaw;
use crate::error::{FvError, Result};

/// Lax-Friedrichs flux with a configurable dissipation coefficient.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LaxFriedrichsFlux {
    pub dissipation: Dissipation,
}

impl LaxFriedrichsFlux {
    pub fn new(dissipation: Dissipation) -> Self {
        Self { dissipation }
    }

    /// Dissipation coefficient λ for one interface.
    pub fn coefficient(
        &self,
        law: &dyn ConservationLaw,
        q_l: &[f64],
        q_r: &[f64],
        ctx: &FluxContext1D,
    ) -> f64 {
        match self.dissipation {
            Dissipation::MeshRatio => ctx.dx / ctx.dt,
            Dissipation::Fixed(lambda) => lambda,
            Dissipation::Local => law.max_wave_speed(q_l).max(law.max_wave_speed(q_r)),
        }
    }
}

impl NumericalFlux1D for LaxFriedrichsFlux {
    fn compute(
        &self,
        law: &dyn ConservationLaw,
        q_l: &[f64],
        q_r: &[f64],
        normal: f64,
        ctx: &FluxContext1D,
    ) -> Vec<f64> {
        let f_l = law.flux(q_l);
        let f_r = law.flux(q_r);
        let lambda = self.coefficient(law, q_l, q_r, ctx);

        f_l.iter()
            .zip(&f_r)
            .zip(q_l.iter().zip(q_r))
            .map(|((fl, fr), (ul, ur))| 0.5 * (fl + fr) * normal - 0.5 * lambda * (ur - ul))
            .collect()
    }

    fn validate(&self, ctx: &FluxContext1D) -> Result<()> {
        match self.dissipation {
            Dissipation::MeshRatio if ctx.dt <= 0.0 || !ctx.dt.is_finite() => {
                Err(FvError::config(format!(
                    "Lax-Friedrichs dissipation dx/dt needs a positive time step, got dt={}",
                    ctx.dt
                )))
            }
            Dissipation::Fixed(lambda) if lambda < 0.0 || !lambda.is_finite() => {
                Err(FvError::config(format!(
                    "Lax-Friedrichs dissipation must be non-negative, got {}",
                    lambda
                )))
            }
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "lax-friedrichs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{Advection1D, Burgers1D};

    const TOL: f64 = 1e-14;

    #[test]
    fn test_mesh_ratio_coefficient() {
        let lf = LaxFriedrichsFlux::new(Dissipation::MeshRatio);
        let ctx = FluxContext1D::new(0.01, 0.005);
        let lambda = lf.coefficient(&Burgers1D, &[0.0], &[1.0], &ctx);
        assert!((lambda - 2.0).abs() < TOL);
    }

    #[test]
    fn test_local_coefficient() {
        let lf = LaxFriedrichsFlux::new(Dissipation::Local);
        let ctx = FluxContext1D::new(0.01, 0.005);
        let lambda = lf.coefficient(&Burgers1D, &[-3.0], &[1.0], &ctx);
        assert!((lambda - 3.0).abs() < TOL);
    }

    #[test]
    fn test_lf_with_wave_speed_is_upwind_for_advection() {
        // With λ = |a| the LF flux reduces to the upwind flux
        let law = Advection1D::new(2.0);
        let lf = LaxFriedrichsFlux::new(Dissipation::Local);
        let ctx = FluxContext1D::new(0.1, 0.01);

        let f = lf.compute(&law, &[3.0], &[1.0], 1.0, &ctx);
        assert!((f[0] - 6.0).abs() < TOL);

        // Left face: flux enters from the exterior
        let f = lf.compute(&law, &[3.0], &[1.0], -1.0, &ctx);
        assert!((f[0] + 2.0).abs() < TOL);
    }

    #[test]
    fn test_validate_rejects_zero_dt() {
        let lf = LaxFriedrichsFlux::new(Dissipation::MeshRatio);
        assert!(lf.validate(&FluxContext1D::new(0.01, 0.0)).is_err());
        assert!(lf.validate(&FluxContext1D::new(0.01, 0.001)).is_ok());

        let fixed = LaxFriedrichsFlux::new(Dissipation::Fixed(-1.0));
        assert!(fixed.validate(&FluxContext1D::new(0.01, 0.0)).is_err());
    }
}
