// ─────────────────────────────────────────────────────────────────────
// Filament — State
// ─────────────────────────────────────────────────────────────────────
//! Beam state: the complex envelope on its grid, plus derived intensity.
//!
//! The field buffer is the single shared mutable object of a run. Solvers
//! receive it by mutable reference through `BeamState::field_mut` and update
//! it in place; intensity is always derived from the field, never cached.

use ndarray::{Array, Array1, Array2, ArrayView, ArrayViewMut, Dimension, Ix1, Ix2};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::config::{BeamConfig, BeamXYConfig};
use crate::error::{FilamentError, FilamentResult};
use crate::medium::Medium;

/// Uniform radial grid r_i = i·dr, fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct RadialGrid {
    pub n_r: usize,
    pub dr: f64,
    pub r: Array1<f64>,
}

impl RadialGrid {
    pub fn new(n_r: usize, dr: f64) -> FilamentResult<Self> {
        if n_r == 0 {
            return Err(FilamentError::InvalidGrid {
                n_r,
                message: "radial grid needs at least one point".to_string(),
            });
        }
        if !dr.is_finite() || dr <= 0.0 {
            return Err(FilamentError::InvalidGrid {
                n_r,
                message: format!("dr must be finite and > 0, got {dr}"),
            });
        }
        let r = Array1::from_shape_fn(n_r, |i| i as f64 * dr);
        Ok(RadialGrid { n_r, dr, r })
    }
}

/// Read/write access shared by the solvers and the propagation loop.
///
/// The closed set of implementations is {`BeamR`, `BeamXY`}; executors are
/// written against the concrete type they understand, the propagation loop
/// against this trait.
pub trait BeamState {
    type Dim: Dimension;

    fn medium(&self) -> &Medium;

    fn field(&self) -> ArrayView<'_, Complex64, Self::Dim>;

    fn field_mut(&mut self) -> ArrayViewMut<'_, Complex64, Self::Dim>;

    /// |u|² → W/m² conversion factor fixed at construction.
    fn i_0(&self) -> f64;

    /// Intensity per grid point (W/m²), recomputed on demand.
    fn intensity(&self) -> Array<f64, Self::Dim> {
        let i_0 = self.i_0();
        self.field().mapv(|u| u.norm_sqr() * i_0)
    }

    /// Peak intensity over the grid (W/m²).
    fn peak_intensity(&self) -> f64 {
        let max_sqr = self
            .field()
            .iter()
            .fold(0.0_f64, |acc, u| acc.max(u.norm_sqr()));
        max_sqr * self.i_0()
    }

    fn is_finite(&self) -> bool {
        self.field()
            .iter()
            .all(|u| u.re.is_finite() && u.im.is_finite())
    }
}

/// 3D beam in the axisymmetric approximation: complex envelope over radius,
/// with the azimuthal phase exp(i·m·φ) carried implicitly.
#[derive(Debug, Clone)]
pub struct BeamR {
    pub grid: RadialGrid,
    pub medium: Medium,
    /// Topological charge.
    pub m: i32,
    /// Super-Gaussian flatness index.
    pub big_m: i32,
    /// Characteristic radius r₀ (m).
    pub r_0: f64,
    field: Array1<Complex64>,
    i_0: f64,
}

impl BeamR {
    /// Build the initial ring-Gaussian vortex profile
    /// u(r) = (r/r₀)^|m| · exp(−((r/r₀)²)^M / 2), normalized so that the
    /// total power equals `p_0_to_p_vortex · P_V(m)`.
    pub fn new(config: &BeamConfig) -> FilamentResult<Self> {
        config.validate()?;
        let medium = Medium::from_name(&config.medium, config.lmbda)?;
        let r_max = config.radii_in_grid * config.r_0;
        let grid = RadialGrid::new(config.n_r, r_max / config.n_r as f64)?;

        let field = Array1::from_shape_fn(config.n_r, |i| {
            let ratio = grid.r[i] / config.r_0;
            let amp = ratio.powi(config.m.abs())
                * (-0.5 * ratio.powi(2).powi(config.big_m)).exp();
            Complex64::new(amp, 0.0)
        });

        let p_0 = config.p_0_to_p_vortex * medium.critical_power_vortex(config.m)?;
        let shape_power = radial_power(&field, &grid);
        if shape_power <= 0.0 {
            return Err(FilamentError::ConfigError(
                "initial profile carries no power on this grid".to_string(),
            ));
        }

        Ok(BeamR {
            grid,
            medium,
            m: config.m,
            big_m: config.big_m,
            r_0: config.r_0,
            field,
            i_0: p_0 / shape_power,
        })
    }

    /// Wrap an existing field array. Used by linear-medium runs and tests,
    /// where the critical-power normalization of `new` does not apply.
    pub fn from_field(
        medium: Medium,
        m: i32,
        dr: f64,
        r_0: f64,
        field: Array1<Complex64>,
        i_0: f64,
    ) -> FilamentResult<Self> {
        let grid = RadialGrid::new(field.len(), dr)?;
        if !i_0.is_finite() || i_0 <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "i_0 must be finite and > 0, got {i_0}"
            )));
        }
        if !r_0.is_finite() || r_0 <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "r_0 must be finite and > 0, got {r_0}"
            )));
        }
        Ok(BeamR {
            grid,
            medium,
            m,
            big_m: 1,
            r_0,
            field,
            i_0,
        })
    }

    /// Diffraction length z_diff = k₀·r₀² (m).
    pub fn z_diff(&self) -> f64 {
        self.medium.k_0 * self.r_0 * self.r_0
    }

    /// Total power 2π Σ I_i r_i dr (W).
    pub fn total_power(&self) -> f64 {
        radial_power(&self.field, &self.grid) * self.i_0
    }
}

fn radial_power(field: &Array1<Complex64>, grid: &RadialGrid) -> f64 {
    let sum: f64 = field
        .iter()
        .zip(grid.r.iter())
        .map(|(u, &r)| u.norm_sqr() * r)
        .sum();
    2.0 * std::f64::consts::PI * sum * grid.dr
}

impl BeamState for BeamR {
    type Dim = Ix1;

    fn medium(&self) -> &Medium {
        &self.medium
    }

    fn field(&self) -> ArrayView<'_, Complex64, Ix1> {
        self.field.view()
    }

    fn field_mut(&mut self) -> ArrayViewMut<'_, Complex64, Ix1> {
        self.field.view_mut()
    }

    fn i_0(&self) -> f64 {
        self.i_0
    }
}

/// Non-axisymmetric 3D beam on a Cartesian grid, with explicit vortex phase
/// and optional multiplicative amplitude noise.
#[derive(Debug, Clone)]
pub struct BeamXY {
    pub medium: Medium,
    pub m: i32,
    pub big_m: i32,
    pub n_x: usize,
    pub n_y: usize,
    pub dx: f64,
    pub dy: f64,
    field: Array2<Complex64>,
    i_0: f64,
}

impl BeamXY {
    pub fn new(config: &BeamXYConfig) -> FilamentResult<Self> {
        config.validate()?;
        let medium = Medium::from_name(&config.medium, config.lmbda)?;
        let x_max = config.radii_in_grid * config.x_0;
        let y_max = config.radii_in_grid * config.y_0;
        let dx = x_max / config.n_x as f64;
        let dy = y_max / config.n_y as f64;

        let mut rng = StdRng::seed_from_u64(config.noise_seed);
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| FilamentError::ConfigError(format!("noise distribution: {e}")))?;
        let noise_amp = 0.01 * config.noise_percent;

        let mut field = Array2::zeros((config.n_x, config.n_y));
        for i in 0..config.n_x {
            for j in 0..config.n_y {
                let x = dx * i as f64 - 0.5 * x_max;
                let y = dy * j as f64 - 0.5 * y_max;
                let rho_sqr = (x / config.x_0).powi(2) + (y / config.y_0).powi(2);
                let mut amp = rho_sqr.powf(0.5 * config.m.abs() as f64)
                    * (-0.5 * rho_sqr.powi(config.big_m)).exp();
                if noise_amp > 0.0 {
                    amp *= 1.0 + noise_amp * normal.sample(&mut rng);
                }
                let phase = config.m as f64 * (f64::atan2(x, y) + std::f64::consts::PI);
                field[[i, j]] = Complex64::from_polar(amp, phase);
            }
        }

        let p_0 = config.p_0_to_p_vortex * medium.critical_power_vortex(config.m)?;
        let shape_power: f64 = field.iter().map(|u| u.norm_sqr()).sum::<f64>() * dx * dy;
        if shape_power <= 0.0 {
            return Err(FilamentError::ConfigError(
                "initial profile carries no power on this grid".to_string(),
            ));
        }

        Ok(BeamXY {
            medium,
            m: config.m,
            big_m: config.big_m,
            n_x: config.n_x,
            n_y: config.n_y,
            dx,
            dy,
            field,
            i_0: p_0 / shape_power,
        })
    }

    /// Wrap an existing Cartesian field array.
    pub fn from_field(
        medium: Medium,
        m: i32,
        dx: f64,
        dy: f64,
        field: Array2<Complex64>,
        i_0: f64,
    ) -> FilamentResult<Self> {
        let (n_x, n_y) = field.dim();
        if n_x < 3 || n_y < 3 {
            return Err(FilamentError::InvalidGrid {
                n_r: n_x.min(n_y),
                message: "Cartesian grid needs at least 3 points per axis".to_string(),
            });
        }
        if !dx.is_finite() || dx <= 0.0 || !dy.is_finite() || dy <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "dx and dy must be finite and > 0, got {dx} / {dy}"
            )));
        }
        if !i_0.is_finite() || i_0 <= 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "i_0 must be finite and > 0, got {i_0}"
            )));
        }
        Ok(BeamXY {
            medium,
            m,
            big_m: 1,
            n_x,
            n_y,
            dx,
            dy,
            field,
            i_0,
        })
    }

    /// Total power Σ I dx dy (W).
    pub fn total_power(&self) -> f64 {
        self.field.iter().map(|u| u.norm_sqr()).sum::<f64>() * self.dx * self.dy * self.i_0
    }
}

impl BeamState for BeamXY {
    type Dim = Ix2;

    fn medium(&self) -> &Medium {
        &self.medium
    }

    fn field(&self) -> ArrayView<'_, Complex64, Ix2> {
        self.field.view()
    }

    fn field_mut(&mut self) -> ArrayViewMut<'_, Complex64, Ix2> {
        self.field.view_mut()
    }

    fn i_0(&self) -> f64 {
        self.i_0
    }
}
