//! Discretized time axis and the fixed-step simulation loop

use crate::{coupling::SynapticCoupling, error::*, neuron::HHNeuron};

/// Upper bound on `total_time / dt`
///
/// Every neuron holds two `f64` trajectories of this length, so the cap keeps
/// a single neuron under about 800 MB.
pub const MAX_TIME_POINTS: usize = 50_000_000;

/// Check a `(total_time, dt)` pair and return the number of whole steps it spans
///
/// Both values must be finite and positive, and `total_time / dt` must stay
/// below [`MAX_TIME_POINTS`].
pub fn checked_step_count(total_time: f64, dt: f64) -> Result<usize> {
    let valid = total_time.is_finite() && dt.is_finite() && total_time > 0.0 && dt > 0.0;
    if !valid {
        return Err(RuntimeError::invalid_time_step(total_time, dt));
    }

    let ratio = total_time / dt;
    // An overflowing ratio is +inf and fails here too
    if ratio >= MAX_TIME_POINTS as f64 {
        return Err(RuntimeError::invalid_time_step(total_time, dt));
    }
    Ok(ratio as usize)
}

/// Simulation clock
///
/// Owns the time axis `0, dt, 2dt, …` and drives every neuron through it.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    total_time: f64,
    dt: f64,
    time_axis: Vec<f64>,
}

impl SimulationClock {
    /// Build the time axis for `total_time` ms with step `dt` ms
    ///
    /// Points are produced by repeatedly adding `dt` while the running value
    /// is strictly below `total_time + dt`, so the axis covers the closed
    /// interval `[0, total_time]` and, depending on rounding of the running
    /// sum, one point past it. `build(55.0, 0.025)` yields 2202 points.
    ///
    /// Fails with [`RuntimeError::InvalidTimeStep`] when either value is not
    /// finite and positive, or when the axis would exceed [`MAX_TIME_POINTS`].
    pub fn build(total_time: f64, dt: f64) -> Result<Self> {
        let steps = checked_step_count(total_time, dt)?;

        let end = total_time + dt;
        let mut time_axis = Vec::with_capacity(steps + 2);
        let mut t = 0.0;
        while t < end {
            time_axis.push(t);
            t += dt;
        }

        Ok(Self { total_time, dt, time_axis })
    }

    /// Run every step of the axis
    ///
    /// For each step, coupling is propagated first and then every neuron
    /// advances. Every neuron must already be initialized with a trajectory
    /// as long as the axis.
    pub fn run(&self, neurons: &mut [HHNeuron], coupling: &SynapticCoupling) -> Result<()> {
        let len = self.len();
        for neuron in neurons.iter() {
            match neuron.trajectory_len() {
                None => return Err(RuntimeError::uninitialized(neuron.id(), "run")),
                Some(n) if n != len => return Err(RuntimeError::out_of_range(neuron.id(), len - 1, n)),
                Some(_) => {}
            }
        }

        let num_steps = len - 1;
        for step in 1..len {
            coupling.propagate(step, neurons)?;
            for neuron in neurons.iter_mut() {
                neuron.step()?;
            }

            if step % (num_steps / 10).max(1) == 0 {
                let progress = (step as f64 / num_steps as f64) * 100.0;
                log::debug!("Simulation progress: {:.1}%", progress);
            }
        }

        Ok(())
    }

    /// Time points (ms)
    pub fn time_axis(&self) -> &[f64] {
        &self.time_axis
    }

    /// Number of time points
    pub fn len(&self) -> usize {
        self.time_axis.len()
    }

    /// Always false; a valid axis holds at least the origin
    pub fn is_empty(&self) -> bool {
        self.time_axis.is_empty()
    }

    /// Number of integration steps (`len - 1`)
    pub fn num_steps(&self) -> usize {
        self.len() - 1
    }

    /// Time step (ms)
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Requested total time (ms)
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{neuron::{GatingPolicy, HHParams}, NeuronId};
    use proptest::prelude::*;

    fn initialized(count: u32, clock: &SimulationClock) -> Vec<HHNeuron> {
        (0..count)
            .map(|i| {
                let mut n = HHNeuron::new(NeuronId::new(i), HHParams::default()).unwrap();
                n.initialize(clock.len(), clock.dt(), GatingPolicy::Free).unwrap();
                n
            })
            .collect()
    }

    #[test]
    fn test_build_reference_axis() {
        let clock = SimulationClock::build(55.0, 0.025).unwrap();
        assert_eq!(clock.len(), 2202);
        assert_eq!(clock.time_axis()[0], 0.0);
        let last = *clock.time_axis().last().unwrap();
        assert!((last - 55.025).abs() < 1e-6, "last point {}", last);
        assert_eq!(clock.num_steps(), 2201);
    }

    #[test]
    fn test_build_exact_steps() {
        let clock = SimulationClock::build(10.0, 1.0).unwrap();
        assert_eq!(clock.len(), 11);
        assert_eq!(clock.time_axis().last(), Some(&10.0));

        let clock = SimulationClock::build(0.5, 0.25).unwrap();
        assert_eq!(clock.time_axis(), &[0.0, 0.25, 0.5]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = SimulationClock::build(55.0, 0.025).unwrap();
        let b = SimulationClock::build(55.0, 0.025).unwrap();
        assert_eq!(a.time_axis(), b.time_axis());
    }

    #[test]
    fn test_build_rejects_invalid_time_step() {
        for (total, dt) in [(55.0, 0.0), (55.0, -0.1), (0.0, 0.025), (-1.0, 0.025), (f64::NAN, 0.1), (10.0, f64::INFINITY)] {
            assert!(matches!(
                SimulationClock::build(total, dt),
                Err(RuntimeError::InvalidTimeStep { .. })
            ));
        }
    }

    #[test]
    fn test_build_rejects_unbounded_axis() {
        for (total, dt) in [(1e300, 1.0), (55.0, 1e-12), (f64::MAX, f64::MIN_POSITIVE)] {
            let err = SimulationClock::build(total, dt).unwrap_err();
            assert!(matches!(err, RuntimeError::InvalidTimeStep { .. }), "({}, {}): {:?}", total, dt, err);
        }
        assert!(checked_step_count(MAX_TIME_POINTS as f64, 1.0).is_err());
        assert_eq!(checked_step_count(MAX_TIME_POINTS as f64 - 1.0, 1.0).unwrap(), MAX_TIME_POINTS - 1);
    }

    #[test]
    fn test_run_advances_every_neuron_to_the_end() {
        let clock = SimulationClock::build(1.0, 0.1).unwrap();
        let mut neurons = initialized(3, &clock);
        clock.run(&mut neurons, &SynapticCoupling::new()).unwrap();
        for n in &neurons {
            assert_eq!(n.current_step(), Some(clock.len()));
            assert_eq!(n.voltage_trajectory().unwrap().len(), clock.len());
        }
    }

    #[test]
    fn test_run_requires_initialized_neurons() {
        let clock = SimulationClock::build(1.0, 0.1).unwrap();
        let mut neurons = vec![HHNeuron::new(NeuronId::new(0), HHParams::default()).unwrap()];
        assert!(matches!(
            clock.run(&mut neurons, &SynapticCoupling::new()),
            Err(RuntimeError::UninitializedState { .. })
        ));
    }

    #[test]
    fn test_run_rejects_length_mismatch() {
        let clock = SimulationClock::build(1.0, 0.1).unwrap();
        let mut n = HHNeuron::new(NeuronId::new(0), HHParams::default()).unwrap();
        n.initialize(clock.len() - 1, clock.dt(), GatingPolicy::Free).unwrap();
        assert!(matches!(
            clock.run(&mut [n], &SynapticCoupling::new()),
            Err(RuntimeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_run_propagates_unknown_neuron() {
        let clock = SimulationClock::build(1.0, 0.1).unwrap();
        let mut neurons = initialized(2, &clock);
        let mut coupling = SynapticCoupling::new();
        coupling.set_weight(NeuronId::new(3), NeuronId::new(0), 0.5);
        assert!(matches!(
            clock.run(&mut neurons, &coupling),
            Err(RuntimeError::UnknownNeuron { .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_trajectory_length_matches_axis(total in 0.5f64..20.0, dt in 0.01f64..0.5) {
            let clock = SimulationClock::build(total, dt).unwrap();
            let mut neurons = initialized(2, &clock);
            clock.run(&mut neurons, &SynapticCoupling::new()).unwrap();
            for n in &neurons {
                prop_assert_eq!(n.voltage_trajectory().unwrap().len(), clock.len());
            }
            prop_assert!(*clock.time_axis().last().unwrap() >= total - 1e-9);
        }
    }
}
