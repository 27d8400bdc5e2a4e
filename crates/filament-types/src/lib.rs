// ─────────────────────────────────────────────────────────────────────
// Filament — Shared Types
// ─────────────────────────────────────────────────────────────────────
pub mod config;
pub mod constants;
pub mod error;
pub mod medium;
pub mod state;
