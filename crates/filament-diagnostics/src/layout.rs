// ─────────────────────────────────────────────────────────────────────
// Filament — Output Layout
// ─────────────────────────────────────────────────────────────────────
//! Directory skeleton for a run: `<root>/<prefix>[_<tag>]/{track,beam}`.

use std::path::{Path, PathBuf};

use filament_types::error::FilamentResult;

/// Resolved output directories of one run. `prepare` creates them all, so
/// sinks can write without checking for parents.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub run_dir: PathBuf,
    pub track_dir: PathBuf,
    pub beam_dir: PathBuf,
}

impl OutputLayout {
    /// Lay out `<root>/<prefix>` or `<root>/<prefix>_<tag>` when a tag
    /// (typically a timestamp or parameter label) is given.
    pub fn new(root: &Path, prefix: &str, tag: Option<&str>) -> Self {
        let name = match tag {
            Some(tag) => format!("{prefix}_{tag}"),
            None => prefix.to_string(),
        };
        let run_dir = root.join(name);
        OutputLayout {
            track_dir: run_dir.join("track"),
            beam_dir: run_dir.join("beam"),
            run_dir,
        }
    }

    pub fn prepare(&self) -> FilamentResult<()> {
        std::fs::create_dir_all(&self.track_dir)?;
        std::fs::create_dir_all(&self.beam_dir)?;
        Ok(())
    }

    pub fn track_file(&self, name: &str) -> PathBuf {
        self.track_dir.join(name)
    }
}
