// ─────────────────────────────────────────────────────────────────────
// Filament — Console Reporter
// ─────────────────────────────────────────────────────────────────────
//! Fixed-width current-state lines for long runs.

use std::io::Write;

use filament_core::propagation::{BeamSnapshot, DiagnosticsSink};
use filament_types::error::FilamentResult;
use filament_types::state::BeamState;

/// Writes one line per snapshot: step, z in cm, normalized peak intensity.
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Reporter {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Reporter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<B: BeamState, W: Write> DiagnosticsSink<B> for Reporter<W> {
    fn record(&mut self, beam: &B, snapshot: &BeamSnapshot) -> FilamentResult<()> {
        writeln!(
            self.out,
            "step = {:>8}   z = {:11.5} cm   I_max / I_0 = {:.6e}",
            snapshot.step,
            snapshot.z * 100.0,
            snapshot.i_max / beam.i_0()
        )?;
        Ok(())
    }
}
