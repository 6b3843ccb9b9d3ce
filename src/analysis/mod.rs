//! Run-time analysis of the discrete solution.
//!
//! - [`StabilityMonitor`]: detects non-finite values, magnitude blow-up and
//!   time steps below a floor, used by the time stepper for committed steps
//!   and for step-size probes.

mod stability;

pub use stability::{StabilityMonitor, StabilityStatus, StabilityThresholds, StabilityWarning};
