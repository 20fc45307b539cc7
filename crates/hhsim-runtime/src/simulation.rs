//! Simulation engine for HH networks

use crate::{
    clock::{checked_step_count, SimulationClock},
    error::*,
    network::HHNetwork,
    neuron::GatingPolicy,
    stimulus::RectangularPulse,
    NeuronId, DEFAULT_DT_MS, DEFAULT_TOTAL_TIME_MS,
};

/// Simulation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    /// Total simulation time (ms)
    pub total_time_ms: f64,
    /// Time step (ms)
    pub dt_ms: f64,
    /// Handling of gating variables that leave [0, 1]
    pub gating_policy: GatingPolicy,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            total_time_ms: DEFAULT_TOTAL_TIME_MS,
            dt_ms: DEFAULT_DT_MS,
            gating_policy: GatingPolicy::Free,
        }
    }
}

impl SimulationParams {
    /// Create new simulation parameters with validation
    pub fn new(total_time_ms: f64, dt_ms: f64) -> Result<Self> {
        let params = Self {
            total_time_ms,
            dt_ms,
            ..Default::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the gating policy
    pub fn with_gating_policy(mut self, policy: GatingPolicy) -> Self {
        self.gating_policy = policy;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        checked_step_count(self.total_time_ms, self.dt_ms).map(|_| ())
    }
}

/// Voltage trajectory of one neuron
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageTrace {
    /// Neuron ID
    pub neuron_id: NeuronId,
    /// Membrane potential per time point (mV)
    pub voltages: Vec<f64>,
}

impl VoltageTrace {
    /// Highest potential reached
    pub fn peak(&self) -> f64 {
        self.voltages.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Lowest potential reached
    pub fn trough(&self) -> f64 {
        self.voltages.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Simulation results
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Time points (ms)
    pub time_axis: Vec<f64>,
    /// One trace per neuron, in registration order
    pub traces: Vec<VoltageTrace>,
    /// Number of steps executed
    pub steps_executed: usize,
}

impl SimulationResult {
    /// Get the trace of a specific neuron
    pub fn trace(&self, neuron_id: NeuronId) -> Option<&VoltageTrace> {
        self.traces.iter().find(|trace| trace.neuron_id == neuron_id)
    }

    /// Highest potential reached by a neuron
    pub fn peak_voltage(&self, neuron_id: NeuronId) -> Option<f64> {
        self.trace(neuron_id).map(VoltageTrace::peak)
    }

    /// Number of neurons recorded
    pub fn neuron_count(&self) -> usize {
        self.traces.len()
    }

    /// Number of time points
    pub fn len(&self) -> usize {
        self.time_axis.len()
    }

    /// Whether the result holds no time points
    pub fn is_empty(&self) -> bool {
        self.time_axis.is_empty()
    }
}

/// Simulation engine
#[derive(Debug)]
pub struct SimulationEngine {
    /// Network being simulated
    network: HHNetwork,
    /// Simulation parameters
    params: SimulationParams,
    /// Input stimuli
    stimuli: Vec<RectangularPulse>,
}

impl SimulationEngine {
    /// Create a new simulation engine
    pub fn new(network: HHNetwork, params: SimulationParams) -> Result<Self> {
        params.validate()?;
        network.coupling().validate(network.neuron_count())?;
        Ok(Self {
            network,
            params,
            stimuli: Vec::new(),
        })
    }

    /// Add an input stimulus
    pub fn add_stimulus(&mut self, stimulus: RectangularPulse) -> Result<()> {
        stimulus.validate()?;
        if !self.network.contains(stimulus.neuron) {
            return Err(RuntimeError::unknown_neuron(stimulus.neuron));
        }
        self.stimuli.push(stimulus);
        Ok(())
    }

    /// Run the complete simulation
    ///
    /// Every neuron is re-initialized at rest, so repeated runs of the same
    /// engine produce identical results.
    pub fn run(&mut self) -> Result<SimulationResult> {
        let clock = SimulationClock::build(self.params.total_time_ms, self.params.dt_ms)?;
        log::info!(
            "Starting simulation: {} neurons, {}ms with {}ms timestep ({} points)",
            self.network.neuron_count(),
            self.params.total_time_ms,
            self.params.dt_ms,
            clock.len()
        );

        let policy = self.params.gating_policy;
        let (neurons, coupling) = self.network.parts_mut();
        for neuron in neurons.iter_mut() {
            neuron.initialize(clock.len(), clock.dt(), policy)?;
        }
        for stimulus in &self.stimuli {
            stimulus.apply(clock.time_axis(), neurons)?;
        }

        // Main simulation loop
        clock.run(neurons, coupling)?;

        let traces = neurons
            .iter()
            .map(|neuron| {
                Ok(VoltageTrace {
                    neuron_id: neuron.id(),
                    voltages: neuron.voltage_trajectory()?.to_vec(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let result = SimulationResult {
            time_axis: clock.time_axis().to_vec(),
            traces,
            steps_executed: clock.num_steps(),
        };

        log::info!(
            "Simulation completed: {} steps, {} traces",
            result.steps_executed,
            result.traces.len()
        );
        Ok(result)
    }

    /// Get reference to network
    pub fn network(&self) -> &HHNetwork {
        &self.network
    }

    /// Get simulation parameters
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Registered stimuli
    pub fn stimuli(&self) -> &[RectangularPulse] {
        &self.stimuli
    }
}

/// Run a fixed-step simulation of `network` with the given stimuli
pub fn run_fixed_step(
    network: HHNetwork,
    total_time_ms: f64,
    dt_ms: f64,
    stimuli: impl IntoIterator<Item = RectangularPulse>,
) -> Result<SimulationResult> {
    let params = SimulationParams::new(total_time_ms, dt_ms)?;
    let mut engine = SimulationEngine::new(network, params)?;
    for stimulus in stimuli {
        engine.add_stimulus(stimulus)?;
    }
    engine.run()
}
