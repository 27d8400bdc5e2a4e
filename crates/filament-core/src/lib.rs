//! Split-step propagation engine.
//!
//! One evolution step is a Lie splitting of the paraxial envelope equation:
//! an implicit diffraction sub-step (radial double-sweep or Fourier
//! split-step) followed by a pointwise Kerr phase rotation, both sharing the
//! same dz. The `Propagator` owns the loop, the stop conditions, and the
//! diagnostics cadence.

pub mod diffraction;
pub mod kerr;
pub mod propagation;
