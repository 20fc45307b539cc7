//! Hodgkin-Huxley neuron model
//!
//! ## Equations
//!
//! ```text
//! C_m dV/dt = I - g_Na m³h (V - E_Na) - g_K n⁴ (V - E_K) - g_L (V - E_L)
//! dx/dt     = αx(V)(1 - x) - βx(V)x        for x in {m, n, h}
//! ```
//!
//! Both equations are integrated with a single explicit Euler step per clock
//! tick, using the voltage of the previous tick for every rate constant.

use crate::{error::*, kinetics, NeuronId};

/// Parameters for Hodgkin-Huxley neurons
///
/// Potentials are relative to rest; the defaults are the classic squid-axon
/// values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HHParams {
    /// Resting potential (mV)
    pub rest_voltage: f64,
    /// Membrane capacitance (µF/cm²)
    pub capacitance: f64,
    /// Maximum sodium conductance (mS/cm²)
    pub sodium_max_conductance: f64,
    /// Maximum potassium conductance (mS/cm²)
    pub potassium_max_conductance: f64,
    /// Leak conductance (mS/cm²)
    pub leak_conductance: f64,
    /// Sodium reversal potential (mV)
    pub sodium_reversal: f64,
    /// Potassium reversal potential (mV)
    pub potassium_reversal: f64,
    /// Leak reversal potential (mV)
    pub leak_reversal: f64,
}

impl Default for HHParams {
    fn default() -> Self {
        Self {
            rest_voltage: 0.0,
            capacitance: 1.0,
            sodium_max_conductance: 120.0,
            potassium_max_conductance: 36.0,
            leak_conductance: 0.3,
            sodium_reversal: 115.0,
            potassium_reversal: -12.0,
            leak_reversal: 10.613,
        }
    }
}

impl HHParams {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("rest_voltage", self.rest_voltage),
            ("capacitance", self.capacitance),
            ("sodium_max_conductance", self.sodium_max_conductance),
            ("potassium_max_conductance", self.potassium_max_conductance),
            ("leak_conductance", self.leak_conductance),
            ("sodium_reversal", self.sodium_reversal),
            ("potassium_reversal", self.potassium_reversal),
            ("leak_reversal", self.leak_reversal),
        ];
        for (name, value) in all {
            if !value.is_finite() {
                return Err(RuntimeError::invalid_parameter(name, value.to_string(), "finite"));
            }
        }

        if self.capacitance <= 0.0 {
            return Err(RuntimeError::invalid_parameter(
                "capacitance",
                self.capacitance.to_string(),
                "> 0.0",
            ));
        }

        let conductances = [
            ("sodium_max_conductance", self.sodium_max_conductance),
            ("potassium_max_conductance", self.potassium_max_conductance),
            ("leak_conductance", self.leak_conductance),
        ];
        for (name, value) in conductances {
            if value < 0.0 {
                return Err(RuntimeError::invalid_parameter(name, value.to_string(), ">= 0.0"));
            }
        }

        Ok(())
    }
}

/// What to do when a gating variable leaves [0, 1]
///
/// Large time steps can push the Euler update outside the physical range.
/// `Free` keeps the raw update (and logs a warning the first time it happens
/// for a neuron); `Clamp` pins every gate back into [0, 1] after each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GatingPolicy {
    /// Leave gating variables unclamped
    #[default]
    Free,
    /// Clamp gating variables to [0, 1]
    Clamp,
}

/// Gating variables of one neuron
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatingState {
    /// Sodium activation
    pub m: f64,
    /// Potassium activation
    pub n: f64,
    /// Sodium inactivation
    pub h: f64,
}

impl GatingState {
    /// Steady-state gates at voltage `v`
    pub fn steady_state(v: f64) -> Self {
        Self {
            m: kinetics::m_infinity(v),
            n: kinetics::n_infinity(v),
            h: kinetics::h_infinity(v),
        }
    }

    /// One explicit Euler step with every rate evaluated at `v`
    ///
    /// Returns a new state so no gate can observe another gate's update from
    /// the same step.
    pub fn euler_step(&self, v: f64, dt: f64) -> Self {
        Self {
            m: kinetics::euler_gate(self.m, kinetics::alpha_m(v), kinetics::beta_m(v), dt),
            n: kinetics::euler_gate(self.n, kinetics::alpha_n(v), kinetics::beta_n(v), dt),
            h: kinetics::euler_gate(self.h, kinetics::alpha_h(v), kinetics::beta_h(v), dt),
        }
    }

    /// Copy with every gate clamped to [0, 1]
    pub fn clamped(&self) -> Self {
        Self {
            m: self.m.clamp(0.0, 1.0),
            n: self.n.clamp(0.0, 1.0),
            h: self.h.clamp(0.0, 1.0),
        }
    }

    /// Whether every gate lies in [0, 1]
    pub fn is_physical(&self) -> bool {
        [self.m, self.n, self.h].iter().all(|x| (0.0..=1.0).contains(x))
    }
}

/// Per-run state allocated by [`HHNeuron::initialize`]
#[derive(Debug, Clone)]
struct Trajectories {
    voltage: Vec<f64>,
    stimulus: Vec<f64>,
    cursor: usize,
    dt: f64,
    policy: GatingPolicy,
    drift_reported: bool,
}

/// Hodgkin-Huxley neuron with its voltage and stimulus trajectories
#[derive(Debug, Clone)]
pub struct HHNeuron {
    id: NeuronId,
    params: HHParams,
    gates: GatingState,
    sodium_conductance: f64,
    potassium_conductance: f64,
    trajectories: Option<Trajectories>,
}

impl HHNeuron {
    /// Create a new, uninitialized neuron
    pub fn new(id: NeuronId, params: HHParams) -> Result<Self> {
        params.validate()?;
        let gates = GatingState::steady_state(params.rest_voltage);
        Ok(Self {
            id,
            params,
            gates,
            sodium_conductance: 0.0,
            potassium_conductance: 0.0,
            trajectories: None,
        })
    }

    /// Allocate trajectories for `axis_len` time points and reset to rest
    ///
    /// Index 0 of the voltage trajectory is fixed to the rest potential and
    /// the step cursor starts at 1. Calling this again discards the previous
    /// run.
    pub fn initialize(&mut self, axis_len: usize, dt: f64, policy: GatingPolicy) -> Result<()> {
        if axis_len == 0 {
            return Err(RuntimeError::invalid_parameter("axis_len", "0", ">= 1"));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(RuntimeError::invalid_parameter("dt", dt.to_string(), "finite and > 0.0"));
        }

        let rest = self.params.rest_voltage;
        let mut voltage = vec![0.0; axis_len];
        voltage[0] = rest;

        self.gates = GatingState::steady_state(rest);
        self.sodium_conductance = 0.0;
        self.potassium_conductance = 0.0;
        self.trajectories = Some(Trajectories {
            voltage,
            stimulus: vec![0.0; axis_len],
            cursor: 1,
            dt,
            policy,
            drift_reported: false,
        });
        Ok(())
    }

    /// Advance the neuron by one time step
    ///
    /// Recomputes the conductances from the current gates, updates every gate
    /// with rates at `previous_voltage`, then writes the new membrane
    /// potential at the cursor and moves the cursor forward. Returns the new
    /// potential.
    pub fn advance(&mut self, previous_voltage: f64, injected_stimulus: f64) -> Result<f64> {
        let id = self.id;
        let traj = self
            .trajectories
            .as_mut()
            .ok_or_else(|| RuntimeError::uninitialized(id, "advance"))?;

        let step = traj.cursor;
        if step >= traj.voltage.len() {
            return Err(RuntimeError::out_of_range(id, step, traj.voltage.len()));
        }

        let p = &self.params;
        let v = previous_voltage;
        let dt = traj.dt;

        // Conductances from the gates of the previous step
        self.sodium_conductance = p.sodium_max_conductance * self.gates.h * self.gates.m.powi(3);
        self.potassium_conductance = p.potassium_max_conductance * self.gates.n.powi(4);

        let next = self.gates.euler_step(v, dt);
        self.gates = match traj.policy {
            GatingPolicy::Clamp => next.clamped(),
            GatingPolicy::Free => {
                if !traj.drift_reported && !next.is_physical() {
                    log::warn!(
                        "Neuron {} gating left [0, 1] at step {} (m={:.4}, n={:.4}, h={:.4}); consider a smaller dt",
                        id, step, next.m, next.n, next.h
                    );
                    traj.drift_reported = true;
                }
                next
            }
        };

        let ionic = self.sodium_conductance * (v - p.sodium_reversal)
            + self.potassium_conductance * (v - p.potassium_reversal)
            + p.leak_conductance * (v - p.leak_reversal);
        let new_voltage = v + dt * (injected_stimulus - ionic) / p.capacitance;

        traj.voltage[step] = new_voltage;
        traj.cursor += 1;
        Ok(new_voltage)
    }

    #[cfg(test)]
    fn gating_warning_issued(&self) -> Option<bool> {
        self.trajectories.as_ref().map(|t| t.drift_reported)
    }

    /// Advance using the neuron's own previous voltage and the stimulus
    /// recorded for the current step
    pub fn step(&mut self) -> Result<f64> {
        let traj = self
            .trajectories
            .as_ref()
            .ok_or_else(|| RuntimeError::uninitialized(self.id, "step"))?;
        let cursor = traj.cursor;
        if cursor >= traj.voltage.len() {
            return Err(RuntimeError::out_of_range(self.id, cursor, traj.voltage.len()));
        }
        let previous = traj.voltage[cursor - 1];
        let stimulus = traj.stimulus[cursor];
        self.advance(previous, stimulus)
    }

    /// Add `current` to the stimulus slot of `step`
    pub fn inject(&mut self, step: usize, current: f64) -> Result<()> {
        let id = self.id;
        let traj = self
            .trajectories
            .as_mut()
            .ok_or_else(|| RuntimeError::uninitialized(id, "inject"))?;
        let len = traj.stimulus.len();
        let slot = traj
            .stimulus
            .get_mut(step)
            .ok_or_else(|| RuntimeError::out_of_range(id, step, len))?;
        *slot += current;
        Ok(())
    }

    /// Membrane potential recorded at `step`
    pub fn voltage_at(&self, step: usize) -> Result<f64> {
        let traj = self.trajectories()?;
        traj.voltage
            .get(step)
            .copied()
            .ok_or_else(|| RuntimeError::out_of_range(self.id, step, traj.voltage.len()))
    }

    /// Most recently computed membrane potential
    pub fn membrane_potential(&self) -> Result<f64> {
        let traj = self.trajectories()?;
        Ok(traj.voltage[traj.cursor - 1])
    }

    /// Full voltage trajectory
    pub fn voltage_trajectory(&self) -> Result<&[f64]> {
        Ok(&self.trajectories()?.voltage)
    }

    /// Full stimulus trajectory
    pub fn stimulus_trajectory(&self) -> Result<&[f64]> {
        Ok(&self.trajectories()?.stimulus)
    }

    /// Index of the next step to be computed, if initialized
    pub fn current_step(&self) -> Option<usize> {
        self.trajectories.as_ref().map(|t| t.cursor)
    }

    /// Trajectory length, if initialized
    pub fn trajectory_len(&self) -> Option<usize> {
        self.trajectories.as_ref().map(|t| t.voltage.len())
    }

    /// Whether trajectories have been allocated
    pub fn is_initialized(&self) -> bool {
        self.trajectories.is_some()
    }

    /// Current gating variables
    pub fn gates(&self) -> GatingState {
        self.gates
    }

    /// Sodium conductance computed by the last step
    pub fn sodium_conductance(&self) -> f64 {
        self.sodium_conductance
    }

    /// Potassium conductance computed by the last step
    pub fn potassium_conductance(&self) -> f64 {
        self.potassium_conductance
    }

    /// Neuron parameters
    pub fn params(&self) -> &HHParams {
        &self.params
    }

    /// Neuron ID
    pub fn id(&self) -> NeuronId {
        self.id
    }

    fn trajectories(&self) -> Result<&Trajectories> {
        self.trajectories
            .as_ref()
            .ok_or_else(|| RuntimeError::uninitialized(self.id, "trajectory access"))
    }
}
