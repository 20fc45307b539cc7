//! Experiment configuration for the hhsim CLI

use std::path::Path;

use hhsim_runtime::{
    GatingPolicy, HHParams, NetworkBuilder, NeuronId, RectangularPulse, SimulationEngine,
    SimulationParams, DEFAULT_DT_MS, DEFAULT_TOTAL_TIME_MS,
};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// A complete experiment: time window, neurons, stimuli and synapses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Time window and integration settings
    #[serde(default)]
    pub simulation: SimulationSection,

    /// Neuron population
    #[serde(default)]
    pub neurons: NeuronSection,

    /// Rectangular current pulses
    #[serde(default)]
    pub stimulus: Vec<RectangularPulse>,

    /// Directed synaptic weights
    #[serde(default)]
    pub synapses: Vec<SynapseEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Total simulated time (ms)
    pub total_time_ms: f64,

    /// Integration step (ms)
    pub dt_ms: f64,

    /// Gating variable policy ("free" or "clamp")
    pub gating: GatingPolicy,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            total_time_ms: DEFAULT_TOTAL_TIME_MS,
            dt_ms: DEFAULT_DT_MS,
            gating: GatingPolicy::Free,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuronSection {
    /// Number of neurons
    pub count: u32,

    /// Parameters shared by every neuron
    pub params: HHParams,

    /// Per-neuron parameter sets replacing the shared ones
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<NeuronOverride>,
}

impl Default for NeuronSection {
    fn default() -> Self {
        Self {
            count: 1,
            params: HHParams::default(),
            overrides: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronOverride {
    /// Neuron index
    pub index: u32,

    /// Parameters for this neuron
    #[serde(default)]
    pub params: HHParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynapseEntry {
    /// Source neuron
    pub pre: u32,

    /// Destination neuron
    pub post: u32,

    /// Coupling weight
    pub weight: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl ExperimentConfig {
    /// The reference experiment: three coupled neurons, the first one driven
    /// by a 10 µA/cm² pulse from 5 ms to 30 ms, simulated for 220 ms
    pub fn reference() -> Self {
        let synapse = |pre, post, weight| SynapseEntry { pre, post, weight };
        Self {
            simulation: SimulationSection {
                total_time_ms: 220.0,
                ..Default::default()
            },
            neurons: NeuronSection {
                count: 3,
                ..Default::default()
            },
            stimulus: vec![RectangularPulse::reference(NeuronId::new(0))],
            synapses: vec![
                synapse(0, 1, 0.8),
                synapse(1, 2, 0.9),
                synapse(2, 1, 0.1),
                synapse(2, 0, 0.1),
            ],
        }
    }

    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("Failed to serialize experiment: {}", e)))
    }

    /// Check that the population and indices are consistent
    pub fn validate(&self) -> CliResult<()> {
        if self.neurons.count == 0 {
            return Err(CliError::config("neurons.count must be at least 1"));
        }
        for entry in &self.neurons.overrides {
            if entry.index >= self.neurons.count {
                return Err(CliError::config(format!(
                    "override for neuron {} but only {} neurons are configured",
                    entry.index, self.neurons.count
                )));
            }
        }
        Ok(())
    }

    /// Build a ready-to-run simulation engine
    pub fn build_engine(&self) -> CliResult<SimulationEngine> {
        self.validate()?;

        let mut builder = NetworkBuilder::new().with_default_params(self.neurons.params.clone());
        for index in 0..self.neurons.count {
            // Last override for an index wins
            let params = self
                .neurons
                .overrides
                .iter()
                .rev()
                .find(|o| o.index == index)
                .map(|o| o.params.clone());
            builder = match params {
                Some(params) => builder.add_neuron_with_params(params),
                None => builder.add_neuron(),
            };
        }
        for s in &self.synapses {
            builder = builder.add_synapse(NeuronId::new(s.pre), NeuronId::new(s.post), s.weight);
        }
        let network = builder.build()?;

        let params = SimulationParams::new(self.simulation.total_time_ms, self.simulation.dt_ms)?
            .with_gating_policy(self.simulation.gating);
        let mut engine = SimulationEngine::new(network, params)?;
        for pulse in &self.stimulus {
            engine.add_stimulus(pulse.clone())?;
        }
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_experiment() {
        let cfg = ExperimentConfig::reference();
        assert_eq!(cfg.simulation.total_time_ms, 220.0);
        assert_eq!(cfg.simulation.dt_ms, 0.025);

        let engine = cfg.build_engine().unwrap();
        assert_eq!(engine.network().neuron_count(), 3);
        assert_eq!(engine.network().coupling().len(), 4);
        assert_eq!(engine.network().get_weight(NeuronId::new(2), NeuronId::new(0)), Some(0.1));
        assert_eq!(engine.stimuli().len(), 1);
    }

    #[test]
    fn test_toml_roundtrip() {
        let cfg = ExperimentConfig::reference();
        let text = cfg.to_toml().unwrap();
        let parsed: ExperimentConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let text = r#"
[simulation]
dt_ms = 0.01
gating = "clamp"

[neurons]
count = 2

[neurons.params]
leak_conductance = 0.5

[[neurons.overrides]]
index = 1
[neurons.overrides.params]
sodium_max_conductance = 100.0
"#;
        let cfg: ExperimentConfig = toml::from_str(text).unwrap();
        assert_eq!(cfg.simulation.total_time_ms, DEFAULT_TOTAL_TIME_MS);
        assert_eq!(cfg.simulation.gating, GatingPolicy::Clamp);
        assert!(cfg.stimulus.is_empty());
        assert!(cfg.synapses.is_empty());

        let engine = cfg.build_engine().unwrap();
        let neurons = engine.network().neurons();
        assert_eq!(neurons[0].params().leak_conductance, 0.5);
        assert_eq!(neurons[0].params().sodium_max_conductance, 120.0);
        // Overrides start from the model defaults, not the shared section
        assert_eq!(neurons[1].params().sodium_max_conductance, 100.0);
        assert_eq!(neurons[1].params().leak_conductance, 0.3);
    }

    #[test]
    fn test_invalid_override_index() {
        let mut cfg = ExperimentConfig::reference();
        cfg.neurons.overrides.push(NeuronOverride { index: 3, params: HHParams::default() });
        assert!(matches!(cfg.build_engine(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_unknown_synapse_endpoint() {
        let mut cfg = ExperimentConfig::reference();
        cfg.synapses.push(SynapseEntry { pre: 0, post: 7, weight: 0.2 });
        assert!(matches!(cfg.build_engine(), Err(CliError::Runtime(_))));
    }

    #[test]
    fn test_zero_neurons_rejected() {
        let mut cfg = ExperimentConfig::reference();
        cfg.neurons.count = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[simulation]\ndt_ms = \"fast\"\n").unwrap();
        assert!(matches!(ExperimentConfig::load_from_file(&path), Err(CliError::Serde(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("exp.toml");
        let cfg = ExperimentConfig::reference();
        cfg.save_to_file(&path).unwrap();
        assert_eq!(ExperimentConfig::load_from_file(&path).unwrap(), cfg);
    }
}
