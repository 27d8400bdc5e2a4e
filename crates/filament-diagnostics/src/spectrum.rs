// ─────────────────────────────────────────────────────────────────────
// Filament — Far-Field Spectrum
// ─────────────────────────────────────────────────────────────────────
//! Far-field spectrum of a radial beam.
//!
//! The axisymmetric solver never materializes the azimuthal phase, so to
//! take a 2D spectrum the radial envelope is first revolved onto a
//! (2·n_r)×(2·n_r) Cartesian grid, the vortex phase exp(i·m·(atan2(x, y) + π))
//! is restored explicitly, and only then the field goes through fft2 +
//! fftshift.

use ndarray::Array2;
use num_complex::Complex64;

use filament_math::fft::{fft2, fftshift};
use filament_types::error::{FilamentError, FilamentResult};
use filament_types::state::{BeamR, BeamState};

/// Precomputed vortex phase for a fixed grid; reusable across snapshots of
/// the same run.
#[derive(Debug, Clone)]
pub struct SpectrumR {
    n_r: usize,
    dr: f64,
    vortex_phase: Array2<Complex64>,
}

impl SpectrumR {
    pub fn new(beam: &BeamR) -> Self {
        let n_r = beam.grid.n_r;
        let dr = beam.grid.dr;
        let n_perp = 2 * n_r;
        let perp_max = n_perp as f64 * dr;
        let m = beam.m as f64;
        let vortex_phase = Array2::from_shape_fn((n_perp, n_perp), |(i, j)| {
            let x = dr * i as f64 - 0.5 * perp_max;
            let y = dr * j as f64 - 0.5 * perp_max;
            Complex64::from_polar(1.0, m * (f64::atan2(x, y) + std::f64::consts::PI))
        });
        SpectrumR {
            n_r,
            dr,
            vortex_phase,
        }
    }

    /// Revolve the radial envelope onto the Cartesian grid by linear
    /// interpolation in r; points beyond the outermost radius get zero.
    pub fn field_to_xy(&self, beam: &BeamR) -> FilamentResult<Array2<Complex64>> {
        self.check_grid(beam)?;
        let field = beam.field();
        let n_perp = 2 * self.n_r;
        let half = 0.5 * n_perp as f64 * self.dr;
        let last = self.n_r - 1;
        Ok(Array2::from_shape_fn((n_perp, n_perp), |(i, j)| {
            let x = self.dr * i as f64 - half;
            let y = self.dr * j as f64 - half;
            let pos = f64::hypot(x, y) / self.dr;
            let i_lo = pos.floor() as usize;
            if i_lo >= last {
                Complex64::new(0.0, 0.0)
            } else {
                let frac = pos - i_lo as f64;
                field[i_lo] * (1.0 - frac) + field[i_lo + 1] * frac
            }
        }))
    }

    /// Spectral intensity |FFT(u·e^{imφ})|²·i_0, zero frequency centered.
    pub fn spectrum_intensity(&self, beam: &BeamR) -> FilamentResult<Array2<f64>> {
        let mut field_xy = self.field_to_xy(beam)?;
        field_xy *= &self.vortex_phase;
        fft2(&mut field_xy);
        let shifted = fftshift(&field_xy);
        Ok(shifted.mapv(|u| u.norm_sqr() * beam.i_0()))
    }

    fn check_grid(&self, beam: &BeamR) -> FilamentResult<()> {
        if beam.grid.n_r != self.n_r || (beam.grid.dr - self.dr).abs() > f64::EPSILON * self.dr {
            return Err(FilamentError::InvalidGrid {
                n_r: beam.grid.n_r,
                message: format!(
                    "spectrum grid built for n_r = {}, dr = {:e}",
                    self.n_r, self.dr
                ),
            });
        }
        Ok(())
    }
}
