//! Source terms for 1D conservation laws.
//!
//! Source terms represent contributions that are not part of the hyperbolic
//! flux:
//! - Linear relaxation towards zero
//! - Absorption and isotropic scattering for moment systems
//! - Arbitrary closures
//!
//! Sources are integrated by [`crate::operators::SourceOperator`], separately
//! from the flux divergence, and the two contributions are summed per stage.

mod relaxation;
mod scattering;
mod traits;

pub use relaxation::LinearRelaxation;
pub use scattering::IsotropicScattering;
pub use traits::{CombinedSource, FnSource, NoSource, SourceTerm1D};
