// ─────────────────────────────────────────────────────────────────────
// Filament — Config
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{FilamentError, FilamentResult};

/// Construction parameters of an axisymmetric (radial) beam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamConfig {
    /// Medium name resolved through `Medium::from_name`.
    pub medium: String,
    /// Ratio of peak power to the vortex critical power P_V(m).
    pub p_0_to_p_vortex: f64,
    /// Topological charge (azimuthal index). May be negative or zero.
    pub m: i32,
    /// Super-Gaussian flatness index M >= 1.
    #[serde(default = "default_big_m")]
    pub big_m: i32,
    /// Vacuum wavelength λ (m).
    pub lmbda: f64,
    /// Characteristic beam radius r₀ (m).
    pub r_0: f64,
    /// Grid extent in units of r₀.
    pub radii_in_grid: f64,
    /// Number of radial grid points.
    pub n_r: usize,
}

/// Construction parameters of a Cartesian beam on an n_x × n_y grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamXYConfig {
    pub medium: String,
    pub p_0_to_p_vortex: f64,
    pub m: i32,
    #[serde(default = "default_big_m")]
    pub big_m: i32,
    pub lmbda: f64,
    /// Characteristic radius along x (m).
    pub x_0: f64,
    /// Characteristic radius along y (m).
    pub y_0: f64,
    pub radii_in_grid: f64,
    /// Multiplicative amplitude noise, percent of the local amplitude.
    #[serde(default)]
    pub noise_percent: f64,
    /// Seed of the noise generator, for reproducible runs.
    #[serde(default)]
    pub noise_seed: u64,
    pub n_x: usize,
    pub n_y: usize,
}

/// Stepping-loop parameters of the `Propagator`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Number of evolution steps (target distance n_z · dz₀ at fixed step).
    pub n_z: usize,
    /// Base step along z (m).
    pub dz_0: f64,
    /// Fixed step when true; adaptive reduction in the growing peak when false.
    #[serde(default = "default_true")]
    pub const_dz: bool,
    /// Steps between diagnostics snapshots.
    #[serde(default = "default_diagnostics_every")]
    pub diagnostics_every: usize,
    /// Peak-intensity stop threshold (W/m²). Reaching it is a normal stop.
    pub max_intensity_to_stop: f64,
}

fn default_big_m() -> i32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_diagnostics_every() -> usize {
    1
}

impl BeamConfig {
    pub fn from_file(path: &str) -> FilamentResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FilamentResult<()> {
        if self.n_r < 3 {
            return Err(FilamentError::ConfigError(format!(
                "n_r must be >= 3, got {}",
                self.n_r
            )));
        }
        if !self.r_0.is_finite() || self.r_0 <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "r_0 must be finite and > 0, got {}",
                self.r_0
            )));
        }
        if !self.radii_in_grid.is_finite() || self.radii_in_grid <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "radii_in_grid must be finite and > 0, got {}",
                self.radii_in_grid
            )));
        }
        if !self.p_0_to_p_vortex.is_finite() || self.p_0_to_p_vortex <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "p_0_to_p_vortex must be finite and > 0, got {}",
                self.p_0_to_p_vortex
            )));
        }
        if self.big_m < 1 {
            return Err(FilamentError::ConfigError(format!(
                "super-Gaussian index M must be >= 1, got {}",
                self.big_m
            )));
        }
        Ok(())
    }
}

impl BeamXYConfig {
    pub fn from_file(path: &str) -> FilamentResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FilamentResult<()> {
        if self.n_x < 3 || self.n_y < 3 {
            return Err(FilamentError::ConfigError(format!(
                "n_x and n_y must be >= 3, got {} x {}",
                self.n_x, self.n_y
            )));
        }
        if !self.x_0.is_finite() || self.x_0 <= 0.0 || !self.y_0.is_finite() || self.y_0 <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "x_0 and y_0 must be finite and > 0, got {} / {}",
                self.x_0, self.y_0
            )));
        }
        if !self.radii_in_grid.is_finite() || self.radii_in_grid <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "radii_in_grid must be finite and > 0, got {}",
                self.radii_in_grid
            )));
        }
        if !self.p_0_to_p_vortex.is_finite() || self.p_0_to_p_vortex <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "p_0_to_p_vortex must be finite and > 0, got {}",
                self.p_0_to_p_vortex
            )));
        }
        if !self.noise_percent.is_finite() || self.noise_percent < 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "noise_percent must be finite and >= 0, got {}",
                self.noise_percent
            )));
        }
        if self.big_m < 1 {
            return Err(FilamentError::ConfigError(format!(
                "super-Gaussian index M must be >= 1, got {}",
                self.big_m
            )));
        }
        Ok(())
    }
}

impl PropagationConfig {
    pub fn from_file(path: &str) -> FilamentResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FilamentResult<()> {
        if !self.dz_0.is_finite() || self.dz_0 <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "dz_0 must be finite and > 0, got {}",
                self.dz_0
            )));
        }
        if self.diagnostics_every == 0 {
            return Err(FilamentError::ConfigError(
                "diagnostics_every must be >= 1".to_string(),
            ));
        }
        if !self.max_intensity_to_stop.is_finite() || self.max_intensity_to_stop <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "max_intensity_to_stop must be finite and > 0, got {}",
                self.max_intensity_to_stop
            )));
        }
        Ok(())
    }
}
