// ─────────────────────────────────────────────────────────────────────
// Filament — Diagnostics
// ─────────────────────────────────────────────────────────────────────
//! Consumers of beam snapshots: track recording, console reporting, result
//! directory layout, `.npy` intensity dumps, and the far-field spectrum.
//! Everything here sits behind the `DiagnosticsSink` seam; the propagation
//! core performs no I/O itself.

pub mod layout;
pub mod npy;
pub mod report;
pub mod spectrum;
pub mod track;
