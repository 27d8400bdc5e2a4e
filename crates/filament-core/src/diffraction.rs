// ─────────────────────────────────────────────────────────────────────
// Filament — Diffraction Executors
// ─────────────────────────────────────────────────────────────────────
//! Linear diffraction sub-step.
//!
//! Two executor kinds, selected at configuration time:
//! - [`SweepDiffractionR`] — implicit double-sweep (generalized
//!   Crank-Nicolson) for the axisymmetric beam, with an angular-momentum
//!   correction for the topological charge and mixed (Robin-type) boundary
//!   conditions at the axis and the outer edge.
//! - [`FourierDiffractionXY`] — split-step Fourier propagation for the
//!   Cartesian beam.
//!
//! Both mutate the beam field in place; callers observe the update through
//! the shared beam state.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use filament_math::fft;
use filament_types::constants::{
    KAPPA_LEFT_DEFAULT, KAPPA_RIGHT_DEFAULT, MU_LEFT_DEFAULT, MU_RIGHT_DEFAULT,
};
use filament_types::error::{FilamentError, FilamentResult};
use filament_types::state::{BeamR, BeamState, BeamXY};

/// Elimination denominators below this magnitude abort the sweep.
const DENOMINATOR_FLOOR: f64 = 1e-30;

/// Linear sub-step contract: advance the field by dz under diffraction alone.
pub trait DiffractionExecutor<B: BeamState> {
    fn kind(&self) -> &'static str;

    fn process(&mut self, beam: &mut B, dz: f64) -> FilamentResult<()>;
}

/// Implicit sweep executor for the axisymmetric beam.
///
/// Static coefficients (`alpha`, `gamma`, `vx`) depend only on the grid and
/// the charge and are computed once. Step-dependent buffers (`beta`, `delta`,
/// `xi`, `eta`) are allocated here once and overwritten every step; they are
/// never exposed outside the executor.
#[derive(Debug)]
pub struct SweepDiffractionR {
    n_r: usize,
    c1: f64,
    c3: Complex64,
    alpha: Array1<f64>,
    gamma: Array1<f64>,
    vx: Array1<f64>,
    beta: Array1<Complex64>,
    delta: Array1<Complex64>,
    xi: Array1<Complex64>,
    eta: Array1<Complex64>,
    kappa_left: f64,
    mu_left: f64,
    kappa_right: f64,
    mu_right: f64,
}

impl SweepDiffractionR {
    /// Derive the sweep coefficients from the beam's grid, charge, and
    /// wavenumber. Fails with `InvalidGrid` when the grid cannot carry a
    /// three-point stencil.
    pub fn new(beam: &BeamR) -> FilamentResult<Self> {
        let n_r = beam.grid.n_r;
        if n_r < 3 {
            return Err(FilamentError::InvalidGrid {
                n_r,
                message: "implicit sweep needs at least 3 radial points".to_string(),
            });
        }
        let dr = beam.grid.dr;
        let c1 = 1.0 / (2.0 * dr * dr);
        let c2 = 1.0 / (4.0 * dr);
        let c3 = Complex64::new(0.0, 2.0 * beam.medium.k_0);

        let mut alpha = Array1::zeros(n_r);
        let mut gamma = Array1::zeros(n_r);
        let mut vx = Array1::zeros(n_r);
        for i in 1..n_r - 1 {
            let r = beam.grid.r[i];
            alpha[i] = c1 + c2 / r;
            gamma[i] = c1 - c2 / r;
            vx[i] = (beam.m as f64 / r).powi(2);
        }

        Ok(SweepDiffractionR {
            n_r,
            c1,
            c3,
            alpha,
            gamma,
            vx,
            beta: Array1::zeros(n_r),
            delta: Array1::zeros(n_r),
            xi: Array1::zeros(n_r),
            eta: Array1::zeros(n_r),
            kappa_left: KAPPA_LEFT_DEFAULT,
            mu_left: MU_LEFT_DEFAULT,
            kappa_right: KAPPA_RIGHT_DEFAULT,
            mu_right: MU_RIGHT_DEFAULT,
        })
    }

    /// Override the mixed boundary conditions
    /// u₀ = κ_left·u₁ + μ_left and u_{n-1} = κ_right·u_{n-2} + μ_right.
    pub fn with_boundary(
        mut self,
        kappa_left: f64,
        mu_left: f64,
        kappa_right: f64,
        mu_right: f64,
    ) -> FilamentResult<Self> {
        for (name, v) in [
            ("kappa_left", kappa_left),
            ("mu_left", mu_left),
            ("kappa_right", kappa_right),
            ("mu_right", mu_right),
        ] {
            if !v.is_finite() {
                return Err(FilamentError::ConfigError(format!(
                    "boundary coefficient {name} must be finite, got {v}"
                )));
            }
        }
        if kappa_right.abs() > 1.0 {
            return Err(FilamentError::ConfigError(format!(
                "|kappa_right| must be <= 1 to keep the closure regular, got {kappa_right}"
            )));
        }
        self.kappa_left = kappa_left;
        self.mu_left = mu_left;
        self.kappa_right = kappa_right;
        self.mu_right = mu_right;
        Ok(self)
    }
}

impl DiffractionExecutor<BeamR> for SweepDiffractionR {
    fn kind(&self) -> &'static str {
        "sweep_diffraction_executor_r"
    }

    fn process(&mut self, beam: &mut BeamR, dz: f64) -> FilamentResult<()> {
        if beam.grid.n_r != self.n_r {
            return Err(FilamentError::ConfigError(format!(
                "beam grid has {} points, sweep was built for {}",
                beam.grid.n_r, self.n_r
            )));
        }
        if !dz.is_finite() || dz == 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "step size must be finite and non-zero, got {dz}"
            )));
        }

        let n_r = self.n_r;
        let mut field = beam.field_mut();

        // left boundary condition
        self.xi[1] = Complex64::new(self.kappa_left, 0.0);
        self.eta[1] = Complex64::new(self.mu_left, 0.0);

        // forward elimination, inner boundary outward
        for i in 1..n_r - 1 {
            self.beta[i] = 2.0 * self.c1 + self.c3 / dz + self.vx[i];
            self.delta[i] = self.alpha[i] * field[i + 1]
                - (self.beta[i].conj() - self.vx[i]) * field[i]
                + self.gamma[i] * field[i - 1];
            let den = self.beta[i] - self.gamma[i] * self.xi[i];
            if den.norm() < DENOMINATOR_FLOOR {
                return Err(FilamentError::NumericalInstability(format!(
                    "sweep denominator vanished at grid point {i}"
                )));
            }
            self.xi[i + 1] = self.alpha[i] / den;
            self.eta[i + 1] = (self.delta[i] + self.gamma[i] * self.eta[i]) / den;
        }

        // right boundary closure
        let closure_den = 1.0 - self.kappa_right * self.xi[n_r - 1];
        if closure_den.norm() < DENOMINATOR_FLOOR {
            return Err(FilamentError::NumericalInstability(
                "right-boundary closure denominator vanished".to_string(),
            ));
        }
        field[n_r - 1] = (self.mu_right + self.kappa_right * self.eta[n_r - 1]) / closure_den;

        // backward substitution
        for j in (1..n_r).rev() {
            field[j - 1] = self.xi[j] * field[j] + self.eta[j];
        }

        Ok(())
    }
}

/// Split-step Fourier executor for the Cartesian beam: FFT, multiply by
/// exp(−i·(k_x² + k_y²)·dz / (2k₀)), inverse FFT.
#[derive(Debug)]
pub struct FourierDiffractionXY {
    n_x: usize,
    n_y: usize,
    k_sq: Array2<f64>,
    half_inv_k0: f64,
}

impl FourierDiffractionXY {
    pub fn new(beam: &BeamXY) -> Self {
        let kx = fft::fftfreq_angular(beam.n_x, beam.dx);
        let ky = fft::fftfreq_angular(beam.n_y, beam.dy);
        let k_sq = Array2::from_shape_fn((beam.n_x, beam.n_y), |(i, j)| {
            kx[i] * kx[i] + ky[j] * ky[j]
        });
        FourierDiffractionXY {
            n_x: beam.n_x,
            n_y: beam.n_y,
            k_sq,
            half_inv_k0: 0.5 / beam.medium.k_0,
        }
    }
}

impl DiffractionExecutor<BeamXY> for FourierDiffractionXY {
    fn kind(&self) -> &'static str {
        "fourier_diffraction_executor_xy"
    }

    fn process(&mut self, beam: &mut BeamXY, dz: f64) -> FilamentResult<()> {
        if beam.n_x != self.n_x || beam.n_y != self.n_y {
            return Err(FilamentError::ConfigError(format!(
                "beam grid is {}x{}, executor was built for {}x{}",
                beam.n_x, beam.n_y, self.n_x, self.n_y
            )));
        }
        if !dz.is_finite() || dz == 0.0 {
            return Err(FilamentError::ConfigError(format!(
                "step size must be finite and non-zero, got {dz}"
            )));
        }

        let phase_scale = -self.half_inv_k0 * dz;
        let mut field = beam.field_mut();
        fft::fft2(&mut field);
        for ((i, j), u) in field.indexed_iter_mut() {
            *u *= Complex64::from_polar(1.0, phase_scale * self.k_sq[[i, j]]);
        }
        fft::ifft2(&mut field);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filament_types::config::BeamConfig;
    use filament_types::medium::Medium;

    fn linear_medium() -> Medium {
        Medium::from_name("vacuum", 8.0e-7).unwrap()
    }

    fn uniform_beam(n_r: usize) -> BeamR {
        let field = Array1::from_elem(n_r, Complex64::new(1.0, 0.0));
        BeamR::from_field(linear_medium(), 0, 1.0, 1.0, field, 1.0).unwrap()
    }

    fn gaussian_beam(n_r: usize, r_0_points: f64) -> BeamR {
        let dr = 1.0;
        let field = Array1::from_shape_fn(n_r, |i| {
            let ratio = i as f64 * dr / r_0_points;
            Complex64::new((-0.5 * ratio * ratio).exp(), 0.0)
        });
        BeamR::from_field(linear_medium(), 0, dr, r_0_points, field, 1.0).unwrap()
    }

    #[test]
    fn test_invalid_grid_rejected_before_any_sweep() {
        let field = Array1::from_elem(2, Complex64::new(1.0, 0.0));
        let beam = BeamR::from_field(linear_medium(), 0, 1.0, 1.0, field, 1.0).unwrap();
        match SweepDiffractionR::new(&beam) {
            Err(FilamentError::InvalidGrid { n_r, .. }) => assert_eq!(n_r, 2),
            other => panic!("expected InvalidGrid, got {other:?}"),
        }
    }

    #[test]
    fn test_boundary_validation() {
        let beam = uniform_beam(8);
        let sweep = SweepDiffractionR::new(&beam).unwrap();
        assert!(sweep.with_boundary(1.0, 0.0, 1.5, 0.0).is_err());
        let beam = uniform_beam(8);
        let sweep = SweepDiffractionR::new(&beam).unwrap();
        assert!(sweep.with_boundary(f64::NAN, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_zero_step_rejected() {
        let mut beam = uniform_beam(8);
        let mut sweep = SweepDiffractionR::new(&beam).unwrap();
        assert!(sweep.process(&mut beam, 0.0).is_err());
    }

    /// End-to-end scenario from the solver contract: n_r = 5, dr = 1, m = 0,
    /// k₀ = 1, uniform unit field, reflecting axis, absorbing edge, dz = 0.1.
    #[test]
    fn test_five_point_sweep_scenario() {
        let medium = Medium::new("unit", 1.0, 0.0, 2.0 * std::f64::consts::PI).unwrap();
        assert!((medium.k_0 - 1.0).abs() < 1e-12);
        let field = Array1::from_elem(5, Complex64::new(1.0, 0.0));
        let mut beam = BeamR::from_field(medium, 0, 1.0, 1.0, field, 1.0).unwrap();
        let mut sweep = SweepDiffractionR::new(&beam).unwrap();
        sweep.process(&mut beam, 0.1).unwrap();

        let field = beam.field();
        assert!(beam.is_finite());
        // absorbing right closure: kappa_right = mu_right = 0 forces u[4] = 0 exactly
        assert_eq!(field[4], Complex64::new(0.0, 0.0));
        // reflecting axis: u[0] = u[1] exactly
        assert_eq!(field[0], field[1]);
        // interior away from the absorbing edge stays close to the uniform input
        assert!((field[1] - Complex64::new(1.0, 0.0)).norm() < 0.1);
        // the edge region is where the field actually changed
        assert!((field[3] - Complex64::new(1.0, 0.0)).norm() > 1e-3);
    }

    /// A uniform field has no curvature: with reflecting conditions on both
    /// boundaries it is an exact fixed point of the implicit step.
    #[test]
    fn test_uniform_field_is_fixed_point_with_reflecting_edges() {
        let mut beam = uniform_beam(64);
        let mut sweep = SweepDiffractionR::new(&beam)
            .unwrap()
            .with_boundary(1.0, 0.0, 1.0, 0.0)
            .unwrap();
        sweep.process(&mut beam, 0.05).unwrap();
        for (i, u) in beam.field().iter().enumerate() {
            assert!(
                (u - Complex64::new(1.0, 0.0)).norm() < 1e-10,
                "point {i} drifted: {u}"
            );
        }
    }

    /// With the default absorbing edge the uniform field changes only near
    /// the outer boundary.
    #[test]
    fn test_uniform_field_interior_unchanged() {
        let n_r = 128;
        let mut beam = uniform_beam(n_r);
        let mut sweep = SweepDiffractionR::new(&beam).unwrap();
        sweep.process(&mut beam, 0.05).unwrap();
        let field = beam.field();
        for i in 0..n_r / 2 {
            assert!(
                (field[i] - Complex64::new(1.0, 0.0)).norm() < 1e-6,
                "interior point {i} drifted: {}",
                field[i]
            );
        }
        assert_eq!(field[n_r - 1], Complex64::new(0.0, 0.0));
    }

    /// Implicit scheme stability: many diffraction steps of a well-contained
    /// Gaussian preserve the discrete total power within tolerance.
    #[test]
    fn test_gaussian_power_conserved_over_many_steps() {
        let mut beam = gaussian_beam(512, 16.0);
        let mut sweep = SweepDiffractionR::new(&beam).unwrap();
        let power_before = beam.total_power();
        // z_diff for this grid is k_0 r_0^2; take small fractions of it
        let dz = 0.02 * beam.medium.k_0 * 16.0 * 16.0 / 100.0;
        for _ in 0..100 {
            sweep.process(&mut beam, dz).unwrap();
        }
        assert!(beam.is_finite());
        let power_after = beam.total_power();
        let rel = (power_after - power_before).abs() / power_before;
        assert!(rel < 1e-2, "power drifted by {rel:e}");
    }

    /// Stepping dz forward then dz backward approximately round-trips the
    /// field for m = 0 (truncation-level agreement, not exact equality).
    #[test]
    fn test_forward_backward_roundtrip() {
        let mut beam = gaussian_beam(256, 12.0);
        let original = beam.field().to_owned();
        let mut sweep = SweepDiffractionR::new(&beam).unwrap();
        let dz = 0.5;
        sweep.process(&mut beam, dz).unwrap();
        sweep.process(&mut beam, -dz).unwrap();
        let peak = original.iter().map(|u| u.norm()).fold(0.0_f64, f64::max);
        for (i, (after, before)) in beam.field().iter().zip(original.iter()).enumerate() {
            assert!(
                (after - before).norm() < 1e-3 * peak,
                "point {i}: {after} vs {before}"
            );
        }
    }

    /// The angular-momentum correction keeps a vortex field zero on axis.
    #[test]
    fn test_vortex_axis_stays_dark() {
        let cfg = BeamConfig {
            medium: "LiF".to_string(),
            p_0_to_p_vortex: 5.0,
            m: 1,
            big_m: 1,
            lmbda: 1.8e-6,
            r_0: 1.0e-4,
            radii_in_grid: 30.0,
            n_r: 512,
        };
        let mut beam = BeamR::new(&cfg).unwrap();
        let mut sweep = SweepDiffractionR::new(&beam).unwrap();
        let dz = beam.z_diff() / 1000.0;
        for _ in 0..20 {
            sweep.process(&mut beam, dz).unwrap();
        }
        let intensity = beam.intensity();
        let peak = beam.peak_intensity();
        // the reflecting axis condition copies u₁ onto the axis, so "dark"
        // here means a few percent of the ring peak at this resolution
        assert!(intensity[0] < 0.05 * peak, "axis lit up: {}", intensity[0]);
    }

    #[test]
    fn test_fourier_plane_wave_unchanged() {
        let field = Array2::from_elem((16, 16), Complex64::new(0.7, -0.2));
        let mut beam = BeamXY::from_field(linear_medium(), 0, 1.0, 1.0, field, 1.0).unwrap();
        let mut exec = FourierDiffractionXY::new(&beam);
        exec.process(&mut beam, 0.3).unwrap();
        for u in beam.field().iter() {
            assert!((u - Complex64::new(0.7, -0.2)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_fourier_power_conserved() {
        let field = Array2::from_shape_fn((32, 32), |(i, j)| {
            Complex64::new((i as f64 * 0.3).sin(), (j as f64 * 0.2).cos())
        });
        let mut beam = BeamXY::from_field(linear_medium(), 0, 1.0, 1.0, field, 1.0).unwrap();
        let power_before = beam.total_power();
        let mut exec = FourierDiffractionXY::new(&beam);
        exec.process(&mut beam, 0.8).unwrap();
        let rel = (beam.total_power() - power_before).abs() / power_before;
        assert!(rel < 1e-12, "spectral step must conserve power, drift {rel:e}");
    }

    #[test]
    fn test_fourier_roundtrip() {
        let field = Array2::from_shape_fn((32, 32), |(i, j)| {
            let x = i as f64 - 16.0;
            let y = j as f64 - 16.0;
            Complex64::new((-0.02 * (x * x + y * y)).exp(), 0.0)
        });
        let mut beam = BeamXY::from_field(linear_medium(), 0, 1.0, 1.0, field.clone(), 1.0).unwrap();
        let mut exec = FourierDiffractionXY::new(&beam);
        exec.process(&mut beam, 0.4).unwrap();
        exec.process(&mut beam, -0.4).unwrap();
        for (after, before) in beam.field().iter().zip(field.iter()) {
            assert!((after - before).norm() < 1e-10);
        }
    }
}
