// ─────────────────────────────────────────────────────────────────────
// Filament — Math
// ─────────────────────────────────────────────────────────────────────
pub mod fft;
