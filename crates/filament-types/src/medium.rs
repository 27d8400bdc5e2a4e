// ─────────────────────────────────────────────────────────────────────
// Filament — Medium
// ─────────────────────────────────────────────────────────────────────
//! Optical medium description: linear index, Kerr index, wavenumber.
//!
//! Stand-in for the external medium-property lookup tables: a few built-in
//! entries cover the media used in the processing scripts, and callers may
//! construct a `Medium` from raw constants directly.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::P_CR_GAUSS_PREFACTOR;
use crate::error::{FilamentError, FilamentResult};

/// Homogeneous Kerr medium at a fixed wavelength. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medium {
    pub name: String,
    /// Linear refractive index n₀.
    pub n_0: f64,
    /// Kerr index n₂ (m²/W). Zero for a linear medium.
    pub n_2: f64,
    /// Vacuum wavelength λ (m).
    pub lmbda: f64,
    /// Linear wavenumber k₀ = 2π n₀ / λ (1/m).
    pub k_0: f64,
}

impl Medium {
    /// Build a medium from raw constants. Fails fast on unphysical values.
    pub fn new(name: &str, n_0: f64, n_2: f64, lmbda: f64) -> FilamentResult<Self> {
        if !n_0.is_finite() || n_0 < 1.0 {
            return Err(FilamentError::ConfigError(format!(
                "medium n_0 must be finite and >= 1, got {n_0}"
            )));
        }
        if !n_2.is_finite() || n_2 < 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "medium n_2 must be finite and >= 0, got {n_2}"
            )));
        }
        if !lmbda.is_finite() || lmbda <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "wavelength must be finite and > 0, got {lmbda}"
            )));
        }
        Ok(Medium {
            name: name.to_string(),
            n_0,
            n_2,
            lmbda,
            k_0: 2.0 * PI * n_0 / lmbda,
        })
    }

    /// Look up one of the built-in media by name.
    pub fn from_name(name: &str, lmbda: f64) -> FilamentResult<Self> {
        let (n_0, n_2) = match name {
            "LiF" => (1.39, 1.0e-20),
            "SiO2" => (1.45, 2.5e-20),
            "vacuum" => (1.0, 0.0),
            other => {
                return Err(FilamentError::ConfigError(format!(
                    "unknown medium '{other}' (built-in: LiF, SiO2, vacuum)"
                )))
            }
        };
        Medium::new(name, n_0, n_2, lmbda)
    }

    /// Critical power of self-focusing for a Gaussian beam (W).
    ///
    /// P_cr = 3.77 λ² / (8 π n₀ n₂). Undefined for a linear medium.
    pub fn critical_power_gauss(&self) -> FilamentResult<f64> {
        if self.n_2 <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "critical power is undefined in linear medium '{}'",
                self.name
            )));
        }
        Ok(P_CR_GAUSS_PREFACTOR * self.lmbda * self.lmbda / (8.0 * PI * self.n_0 * self.n_2))
    }

    /// Critical power of a vortex beam with topological charge `m` (W).
    ///
    /// P_V(m) = P_cr · 2^(2|m|+1) · |m|! · (|m|+1)! / (2 · (2|m|)!),
    /// after Kruglov & Vlasov; reduces to P_cr at m = 0 and ≈ 4 P_cr at |m| = 1.
    pub fn critical_power_vortex(&self, m: i32) -> FilamentResult<f64> {
        let p_gauss = self.critical_power_gauss()?;
        let am = m.unsigned_abs() as u64;
        let ratio = 2f64.powi(2 * m.abs() + 1) * factorial(am) * factorial(am + 1)
            / (2.0 * factorial(2 * am));
        Ok(p_gauss * ratio)
    }
}

fn factorial(n: u64) -> f64 {
    (1..=n).map(|k| k as f64).product()
}
