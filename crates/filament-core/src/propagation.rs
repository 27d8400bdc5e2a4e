// ─────────────────────────────────────────────────────────────────────
// Filament — Propagation
// ─────────────────────────────────────────────────────────────────────
//! The stepping loop: advance z, apply the operator-split sub-steps, track
//! the peak intensity, drive the diagnostics cadence, and decide when to
//! stop. Reaching the intensity threshold or the target distance is the
//! normal end of a run; only numerical breakdown is an error.

use filament_types::config::PropagationConfig;
use filament_types::error::{FilamentError, FilamentResult};
use filament_types::state::BeamState;

use crate::diffraction::DiffractionExecutor;
use crate::kerr::NonlinearExecutor;

/// Why a run ended. Both variants are expected outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Peak intensity crossed the configured threshold (collapse detected).
    MaxIntensityExceeded,
    /// The configured number of steps was completed.
    ReachedTargetDistance,
}

/// Lifecycle of the propagation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationState {
    NotStarted,
    Running,
    Stopped(StopReason),
    Failed,
}

/// Stepping policy derived from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    Fixed,
    AdaptiveReduction,
}

/// What diagnostics sinks see at every cadence point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSnapshot {
    pub step: usize,
    pub z: f64,
    /// Step size used for the most recent step (dz₀ before the first step).
    pub dz: f64,
    pub i_max: f64,
}

/// Synchronous diagnostics callback. Implementations must not hold on to
/// borrows of the beam past the call; the field buffer is mutated again as
/// soon as `record` returns.
pub trait DiagnosticsSink<B: BeamState> {
    fn record(&mut self, beam: &B, snapshot: &BeamSnapshot) -> FilamentResult<()>;
}

/// Owns the beam and the two executors and advances the field step by step.
pub struct Propagator<B: BeamState> {
    beam: B,
    diffraction: Box<dyn DiffractionExecutor<B>>,
    nonlinearity: Box<dyn NonlinearExecutor<B>>,
    config: PropagationConfig,
    state: PropagationState,
    step: usize,
    z: f64,
    dz: f64,
    i_max: f64,
}

impl<B: BeamState> Propagator<B> {
    pub fn new(
        beam: B,
        diffraction: Box<dyn DiffractionExecutor<B>>,
        nonlinearity: Box<dyn NonlinearExecutor<B>>,
        config: PropagationConfig,
    ) -> FilamentResult<Self> {
        config.validate()?;
        let i_max = beam.peak_intensity();
        let dz = config.dz_0;
        Ok(Propagator {
            beam,
            diffraction,
            nonlinearity,
            config,
            state: PropagationState::NotStarted,
            step: 0,
            z: 0.0,
            dz,
            i_max,
        })
    }

    pub fn state(&self) -> PropagationState {
        self.state
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn peak_intensity(&self) -> f64 {
        self.i_max
    }

    pub fn beam(&self) -> &B {
        &self.beam
    }

    /// Reclaim the beam after the run.
    pub fn into_beam(self) -> B {
        self.beam
    }

    pub fn policy(&self) -> StepPolicy {
        if self.config.const_dz {
            StepPolicy::Fixed
        } else {
            StepPolicy::AdaptiveReduction
        }
    }

    /// Run to completion. Sinks are notified with the initial state, every
    /// `diagnostics_every` steps, and at termination.
    pub fn propagate(
        &mut self,
        sinks: &mut [&mut dyn DiagnosticsSink<B>],
    ) -> FilamentResult<StopReason> {
        self.state = PropagationState::Running;
        match self.run_loop(sinks) {
            Ok(reason) => {
                self.state = PropagationState::Stopped(reason);
                Ok(reason)
            }
            Err(e) => {
                self.state = PropagationState::Failed;
                Err(e)
            }
        }
    }

    fn run_loop(
        &mut self,
        sinks: &mut [&mut dyn DiagnosticsSink<B>],
    ) -> FilamentResult<StopReason> {
        self.emit(sinks)?;
        loop {
            if self.step >= self.config.n_z {
                self.emit_terminal(sinks)?;
                return Ok(StopReason::ReachedTargetDistance);
            }
            if let Some(reason) = self.advance(sinks)? {
                self.emit_terminal(sinks)?;
                return Ok(reason);
            }
        }
    }

    /// One split step: dz policy, diffraction, Kerr, bookkeeping, cadence,
    /// threshold check. Stop conditions are only evaluated here, between
    /// steps, never inside a sub-step.
    fn advance(
        &mut self,
        sinks: &mut [&mut dyn DiagnosticsSink<B>],
    ) -> FilamentResult<Option<StopReason>> {
        self.dz = self.current_step_size();
        self.diffraction.process(&mut self.beam, self.dz)?;
        self.nonlinearity.process(&mut self.beam, self.dz)?;
        self.z += self.dz;
        self.step += 1;
        self.i_max = self.beam.peak_intensity();

        if !self.i_max.is_finite() || !self.beam.is_finite() {
            return Err(FilamentError::NumericalInstability(format!(
                "non-finite field after step {}",
                self.step
            )));
        }

        if self.step % self.config.diagnostics_every == 0 {
            self.emit(sinks)?;
        }

        if self.i_max > self.config.max_intensity_to_stop {
            return Ok(Some(StopReason::MaxIntensityExceeded));
        }
        Ok(None)
    }

    /// Fixed dz₀, or reduced by the square root of the normalized peak once
    /// the beam focuses past its initial normalization intensity.
    fn current_step_size(&self) -> f64 {
        match self.policy() {
            StepPolicy::Fixed => self.config.dz_0,
            StepPolicy::AdaptiveReduction => {
                let ratio = self.i_max / self.beam.i_0();
                if ratio > 1.0 {
                    self.config.dz_0 / ratio.sqrt()
                } else {
                    self.config.dz_0
                }
            }
        }
    }

    fn emit(&mut self, sinks: &mut [&mut dyn DiagnosticsSink<B>]) -> FilamentResult<()> {
        let snapshot = BeamSnapshot {
            step: self.step,
            z: self.z,
            dz: self.dz,
            i_max: self.i_max,
        };
        for sink in sinks.iter_mut() {
            sink.record(&self.beam, &snapshot)?;
        }
        Ok(())
    }

    /// Terminal snapshot, skipped when the cadence already covered this step.
    fn emit_terminal(&mut self, sinks: &mut [&mut dyn DiagnosticsSink<B>]) -> FilamentResult<()> {
        if self.step % self.config.diagnostics_every != 0 {
            self.emit(sinks)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffraction::SweepDiffractionR;
    use crate::kerr::{KerrExecutor, KerrModel};
    use filament_types::config::BeamConfig;
    use filament_types::medium::Medium;
    use filament_types::state::BeamR;
    use ndarray::Array1;
    use num_complex::Complex64;

    struct CollectSink {
        snapshots: Vec<BeamSnapshot>,
    }

    impl CollectSink {
        fn new() -> Self {
            CollectSink {
                snapshots: Vec::new(),
            }
        }
    }

    impl<B: BeamState> DiagnosticsSink<B> for CollectSink {
        fn record(&mut self, _beam: &B, snapshot: &BeamSnapshot) -> FilamentResult<()> {
            self.snapshots.push(*snapshot);
            Ok(())
        }
    }

    fn gaussian_beam_linear(n_r: usize) -> BeamR {
        let medium = Medium::from_name("vacuum", 8.0e-7).unwrap();
        let field = Array1::from_shape_fn(n_r, |i| {
            let ratio = i as f64 / 16.0;
            Complex64::new((-0.5 * ratio * ratio).exp(), 0.0)
        });
        BeamR::from_field(medium, 0, 1.0, 16.0, field, 1.0).unwrap()
    }

    fn propagator_for(beam: BeamR, config: PropagationConfig) -> Propagator<BeamR> {
        let diffraction = Box::new(SweepDiffractionR::new(&beam).unwrap());
        let kerr = Box::new(KerrExecutor::new(&beam, KerrModel::Cubic).unwrap());
        Propagator::new(beam, diffraction, kerr, config).unwrap()
    }

    #[test]
    fn test_reaches_target_distance() {
        let beam = gaussian_beam_linear(128);
        let dz_0 = 1.0;
        let mut prop = propagator_for(
            beam,
            PropagationConfig {
                n_z: 10,
                dz_0,
                const_dz: true,
                diagnostics_every: 1,
                max_intensity_to_stop: 1e30,
            },
        );
        let reason = prop.propagate(&mut []).unwrap();
        assert_eq!(reason, StopReason::ReachedTargetDistance);
        assert_eq!(prop.state(), PropagationState::Stopped(reason));
        assert_eq!(prop.step(), 10);
        assert!((prop.z() - 10.0 * dz_0).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_beats_target_distance() {
        // threshold below the initial peak: the very first step must trip it
        let beam = gaussian_beam_linear(64);
        let threshold = beam.peak_intensity() * 0.5;
        let mut prop = propagator_for(
            beam,
            PropagationConfig {
                n_z: 1000,
                dz_0: 1.0,
                const_dz: true,
                diagnostics_every: 1,
                max_intensity_to_stop: threshold,
            },
        );
        let reason = prop.propagate(&mut []).unwrap();
        assert_eq!(reason, StopReason::MaxIntensityExceeded);
        assert_eq!(prop.step(), 1);
    }

    #[test]
    fn test_diagnostics_cadence_and_terminal_snapshot() {
        let beam = gaussian_beam_linear(64);
        let mut sink = CollectSink::new();
        let mut prop = propagator_for(
            beam,
            PropagationConfig {
                n_z: 10,
                dz_0: 1.0,
                const_dz: true,
                diagnostics_every: 3,
                max_intensity_to_stop: 1e30,
            },
        );
        prop.propagate(&mut [&mut sink]).unwrap();
        let steps: Vec<usize> = sink.snapshots.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 3, 6, 9, 10]);
    }

    #[test]
    fn test_zero_steps_stops_immediately() {
        let beam = gaussian_beam_linear(64);
        let mut sink = CollectSink::new();
        let mut prop = propagator_for(
            beam,
            PropagationConfig {
                n_z: 0,
                dz_0: 1.0,
                const_dz: true,
                diagnostics_every: 1,
                max_intensity_to_stop: 1e30,
            },
        );
        let reason = prop.propagate(&mut [&mut sink]).unwrap();
        assert_eq!(reason, StopReason::ReachedTargetDistance);
        assert_eq!(prop.step(), 0);
        // exactly the initial snapshot, no duplicate terminal record
        assert_eq!(sink.snapshots.len(), 1);
        assert_eq!(sink.snapshots[0].step, 0);
    }

    #[test]
    fn test_adaptive_step_never_exceeds_base() {
        // peak |u|^2 = 4 with i_0 = 1 puts the normalized peak at 4,
        // so the adaptive policy must halve the step
        let medium = Medium::from_name("vacuum", 8.0e-7).unwrap();
        let field = Array1::from_shape_fn(64, |i| {
            let ratio = i as f64 / 16.0;
            Complex64::new(2.0 * (-0.5 * ratio * ratio).exp(), 0.0)
        });
        let beam = BeamR::from_field(medium, 0, 1.0, 16.0, field, 1.0).unwrap();
        let dz_0 = 1.0;
        let mut sink = CollectSink::new();
        let mut prop = propagator_for(
            beam,
            PropagationConfig {
                n_z: 5,
                dz_0,
                const_dz: false,
                diagnostics_every: 1,
                max_intensity_to_stop: 1e30,
            },
        );
        assert_eq!(prop.policy(), StepPolicy::AdaptiveReduction);
        prop.propagate(&mut [&mut sink]).unwrap();
        for s in &sink.snapshots[1..] {
            assert!(s.dz <= dz_0 + 1e-15, "dz grew: {}", s.dz);
        }
        assert!((sink.snapshots[1].dz - dz_0 / 2.0).abs() < 1e-12);
    }

    /// A beam carrying several critical powers must collapse: the peak
    /// intensity crosses a modest threshold well before the target distance.
    #[test]
    fn test_collapsing_beam_stops_on_threshold() {
        let cfg = BeamConfig {
            medium: "LiF".to_string(),
            p_0_to_p_vortex: 5.0,
            m: 0,
            big_m: 1,
            lmbda: 1.8e-6,
            r_0: 1.0e-4,
            radii_in_grid: 25.0,
            n_r: 512,
        };
        let beam = BeamR::new(&cfg).unwrap();
        let i_start = beam.peak_intensity();
        let dz_0 = beam.z_diff() / 1000.0;
        let n_z = 2000;
        let mut prop = propagator_for(
            beam,
            PropagationConfig {
                n_z,
                dz_0,
                const_dz: true,
                diagnostics_every: 100,
                max_intensity_to_stop: 1.2 * i_start,
            },
        );
        let reason = prop.propagate(&mut []).unwrap();
        assert_eq!(reason, StopReason::MaxIntensityExceeded);
        assert!(prop.step() < n_z, "collapse too late: {}", prop.step());
        assert!(prop.peak_intensity() > 1.2 * i_start);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let beam = gaussian_beam_linear(64);
        let diffraction = Box::new(SweepDiffractionR::new(&beam).unwrap());
        let kerr = Box::new(KerrExecutor::new(&beam, KerrModel::Cubic).unwrap());
        let result = Propagator::new(
            beam,
            diffraction,
            kerr,
            PropagationConfig {
                n_z: 10,
                dz_0: -1.0,
                const_dz: true,
                diagnostics_every: 1,
                max_intensity_to_stop: 1e30,
            },
        );
        assert!(result.is_err());
    }
}
