//! Absorption and isotropic scattering for P_N moment systems.
//!
//! For Legendre moments u_l = ∫ ψ P_l dμ of the kinetic density, absorption
//! with cross-section σ_a removes all moments, while isotropic scattering with
//! cross-section σ_s redistributes particles uniformly in angle. Only the
//! zeroth moment survives scattering:
//!
//! s_0 = -σ_a u_0 + Q
//! s_l = -(σ_a + σ_s) u_l,  l ≥ 1
//!
//! where Q is the isotropic emission.

use serde::{Deserialize, Serialize};

use super::SourceTerm1D;

/// Absorption, isotropic scattering and isotropic emission.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IsotropicScattering {
    /// Absorption cross-section σ_a
    pub sigma_a: f64,
    /// Scattering cross-section σ_s
    pub sigma_s: f64,
    /// Isotropic emission Q added to the zeroth moment
    pub emission: f64,
}

impl IsotropicScattering {
    pub fn new(sigma_a: f64, sigma_s: f64, emission: f64) -> Self {
        Self {
            sigma_a,
            sigma_s,
            emission,
        }
    }

    /// Pure absorber without scattering or emission.
    pub fn absorbing(sigma_a: f64) -> Self {
        Self::new(sigma_a, 0.0, 0.0)
    }

    /// Total cross-section σ_t = σ_a + σ_s.
    pub fn sigma_t(&self) -> f64 {
        self.sigma_a + self.sigma_s
    }
}

impl SourceTerm1D for IsotropicScattering {
    fn evaluate(&self, state: &[f64], _position: f64, _time: f64) -> Vec<f64> {
        let sigma_t = self.sigma_t();
        state
            .iter()
            .enumerate()
            .map(|(l, &u)| {
                if l == 0 {
                    -self.sigma_a * u + self.emission
                } else {
                    -sigma_t * u
                }
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "isotropic-scattering"
    }
}
