// ─────────────────────────────────────────────────────────────────────
// Filament — Intensity Snapshots
// ─────────────────────────────────────────────────────────────────────
//! Dumps the intensity distribution to `.npy` at every diagnostics
//! interval, one file per snapshot, named by step index.

use std::path::PathBuf;

use ndarray_npy::write_npy;

use filament_core::propagation::{BeamSnapshot, DiagnosticsSink};
use filament_types::error::{FilamentError, FilamentResult};
use filament_types::state::BeamState;

/// Writes `<dir>/<step:06>.npy` with the intensity array (W/m²). Works for
/// both the radial and the Cartesian beam; the array rank follows the beam.
#[derive(Debug, Clone)]
pub struct IntensityWriter {
    dir: PathBuf,
}

impl IntensityWriter {
    pub fn new(dir: PathBuf) -> Self {
        IntensityWriter { dir }
    }

    pub fn path_for(&self, step: usize) -> PathBuf {
        self.dir.join(format!("{step:06}.npy"))
    }
}

impl<B: BeamState> DiagnosticsSink<B> for IntensityWriter {
    fn record(&mut self, beam: &B, snapshot: &BeamSnapshot) -> FilamentResult<()> {
        let path = self.path_for(snapshot.step);
        write_npy(&path, &beam.intensity())
            .map_err(|e| FilamentError::Io(std::io::Error::other(e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filament_types::medium::Medium;
    use filament_types::state::BeamR;
    use ndarray::Array1;
    use ndarray_npy::read_npy;
    use num_complex::Complex64;

    #[test]
    fn test_snapshot_file_contents() {
        let dir = std::env::temp_dir().join(format!("filament_npy_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let medium = Medium::from_name("vacuum", 8.0e-7).unwrap();
        let field = Array1::from_shape_fn(16, |i| Complex64::new(i as f64, 0.0));
        let beam = BeamR::from_field(medium, 0, 1e-6, 1e-4, field, 3.0).unwrap();

        let mut writer = IntensityWriter::new(dir.clone());
        let snapshot = BeamSnapshot {
            step: 7,
            z: 0.0,
            dz: 1e-6,
            i_max: beam.peak_intensity(),
        };
        writer.record(&beam, &snapshot).unwrap();

        let path = dir.join("000007.npy");
        assert!(path.is_file());
        let stored: Array1<f64> = read_npy(&path).unwrap();
        assert_eq!(stored.len(), 16);
        assert!((stored[4] - 48.0).abs() < 1e-12); // 4² · i_0

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
