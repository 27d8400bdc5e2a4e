// ─────────────────────────────────────────────────────────────────────
// Filament — Kerr Executor
// ─────────────────────────────────────────────────────────────────────
//! Nonlinear (Kerr) sub-step: pointwise self-phase modulation.
//!
//! The term is diagonal in the discretized system, so one executor covers
//! both beam geometries. Each call reads only the local intensity at call
//! time and rotates the phase by −k₀·n₂·I·dz/n₀ (negative, matching the
//! sweep's 2ik₀·u_z = Δ⊥u sign convention, so higher index retards phase
//! and the beam focuses); amplitudes are preserved unless a saturation
//! model is configured, and even then the rotation stays phase-only.

use num_complex::Complex64;

use filament_types::error::{FilamentError, FilamentResult};
use filament_types::state::BeamState;

/// Functional form of the nonlinear response. Pluggable behind the executor
/// so the propagation loop never sees the formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KerrModel {
    /// Pure cubic nonlinearity: phase ∝ I.
    Cubic,
    /// Saturable nonlinearity: phase ∝ I / (1 + I/I_sat).
    Saturable { i_sat: f64 },
}

impl KerrModel {
    fn validate(&self) -> FilamentResult<()> {
        if let KerrModel::Saturable { i_sat } = self {
            if !i_sat.is_finite() || *i_sat <= 0.0 {
                return Err(FilamentError::ConfigError(format!(
                    "saturation intensity must be finite and > 0, got {i_sat}"
                )));
            }
        }
        Ok(())
    }

    /// Intensity entering the phase term (W/m²).
    pub fn effective_intensity(&self, intensity: f64) -> f64 {
        match self {
            KerrModel::Cubic => intensity,
            KerrModel::Saturable { i_sat } => intensity / (1.0 + intensity / i_sat),
        }
    }
}

/// Nonlinear sub-step contract, mirror of the diffraction seam.
pub trait NonlinearExecutor<B: BeamState> {
    fn kind(&self) -> &'static str;

    fn process(&mut self, beam: &mut B, dz: f64) -> FilamentResult<()>;
}

/// Self-phase-modulation executor with a fixed coefficient k₀·n₂/n₀.
pub struct KerrExecutor {
    coeff: f64,
    model: KerrModel,
}

impl KerrExecutor {
    pub fn new<B: BeamState>(beam: &B, model: KerrModel) -> FilamentResult<Self> {
        model.validate()?;
        let medium = beam.medium();
        Ok(KerrExecutor {
            coeff: medium.k_0 * medium.n_2 / medium.n_0,
            model,
        })
    }
}

impl<B: BeamState> NonlinearExecutor<B> for KerrExecutor {
    fn kind(&self) -> &'static str {
        "kerr_executor"
    }

    fn process(&mut self, beam: &mut B, dz: f64) -> FilamentResult<()> {
        if !dz.is_finite() {
            return Err(FilamentError::ConfigError(format!(
                "step size must be finite, got {dz}"
            )));
        }
        let i_0 = beam.i_0();
        let coeff = self.coeff;
        let model = self.model;
        for u in beam.field_mut().iter_mut() {
            let intensity = u.norm_sqr() * i_0;
            let dphi = -coeff * model.effective_intensity(intensity) * dz;
            *u *= Complex64::from_polar(1.0, dphi);
        }
        Ok(())
    }
}
