// ─────────────────────────────────────────────────────────────────────
// Filament — Constants
// ─────────────────────────────────────────────────────────────────────
/// Default axis boundary coefficients: pure reflection at r = 0.
pub const KAPPA_LEFT_DEFAULT: f64 = 1.0;
pub const MU_LEFT_DEFAULT: f64 = 0.0;

/// Default outer-edge boundary coefficients: absorbing edge.
pub const KAPPA_RIGHT_DEFAULT: f64 = 0.0;
pub const MU_RIGHT_DEFAULT: f64 = 0.0;

/// Prefactor of the Gaussian critical power P_cr = 3.77 λ² / (8 π n₀ n₂),
/// Fibich & Gaeta, Opt. Lett. 25, 335 (2000).
pub const P_CR_GAUSS_PREFACTOR: f64 = 3.77;
