// ─────────────────────────────────────────────────────────────────────
// Filament — Track Recorder
// ─────────────────────────────────────────────────────────────────────
//! One record per diagnostics interval: the z vs peak-intensity trace used
//! downstream for parameter-vs-z plots.

use serde::{Deserialize, Serialize};

use filament_core::propagation::{BeamSnapshot, DiagnosticsSink};
use filament_types::error::FilamentResult;
use filament_types::state::BeamState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub step: usize,
    pub z: f64,
    pub i_max: f64,
}

/// Accumulates the propagation track in memory; serialize with `to_json`
/// or write it out with `save`.
#[derive(Debug, Default)]
pub struct TrackRecorder {
    records: Vec<TrackRecord>,
}

impl TrackRecorder {
    pub fn new() -> Self {
        TrackRecorder::default()
    }

    pub fn records(&self) -> &[TrackRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> FilamentResult<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    pub fn save(&self, path: &std::path::Path) -> FilamentResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl<B: BeamState> DiagnosticsSink<B> for TrackRecorder {
    fn record(&mut self, _beam: &B, snapshot: &BeamSnapshot) -> FilamentResult<()> {
        self.records.push(TrackRecord {
            step: snapshot.step,
            z: snapshot.z,
            i_max: snapshot.i_max,
        });
        Ok(())
    }
}
