//! Neuron registry and coupling table

use crate::{
    coupling::SynapticCoupling,
    error::*,
    neuron::{HHNeuron, HHParams},
    NeuronId,
};

/// Network of Hodgkin-Huxley neurons
///
/// Neurons live in a flat registry; a neuron's [`NeuronId`] is its slot, so
/// IDs are dense and registration order is preserved.
#[derive(Debug, Clone, Default)]
pub struct HHNetwork {
    /// Default parameters for [`HHNetwork::add_neuron`]
    pub default_params: HHParams,
    neurons: Vec<HHNeuron>,
    coupling: SynapticCoupling,
}

impl HHNetwork {
    /// Create an empty network
    pub fn new(default_params: HHParams) -> Result<Self> {
        default_params.validate()?;
        Ok(Self {
            default_params,
            neurons: Vec::new(),
            coupling: SynapticCoupling::new(),
        })
    }

    /// Register a neuron with the default parameters
    pub fn add_neuron(&mut self) -> Result<NeuronId> {
        self.add_neuron_with_params(self.default_params.clone())
    }

    /// Register a neuron with specific parameters
    pub fn add_neuron_with_params(&mut self, params: HHParams) -> Result<NeuronId> {
        let raw = u32::try_from(self.neurons.len()).map_err(|_| {
            RuntimeError::invalid_parameter("neuron_count", self.neurons.len().to_string(), "<= u32::MAX")
        })?;
        let id = NeuronId::new(raw);
        self.neurons.push(HHNeuron::new(id, params)?);
        Ok(id)
    }

    /// Set the synaptic weight from `pre` to `post`
    pub fn set_weight(&mut self, pre: NeuronId, post: NeuronId, weight: f64) -> Result<()> {
        for id in [pre, post] {
            if !self.contains(id) {
                return Err(RuntimeError::unknown_neuron(id));
            }
        }
        if !weight.is_finite() {
            return Err(RuntimeError::invalid_parameter("weight", weight.to_string(), "finite"));
        }
        self.coupling.set_weight(pre, post, weight);
        Ok(())
    }

    /// Get the synaptic weight from `pre` to `post`
    pub fn get_weight(&self, pre: NeuronId, post: NeuronId) -> Option<f64> {
        self.coupling.weight(pre, post)
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: NeuronId) -> bool {
        id.index() < self.neurons.len()
    }

    /// Get a neuron
    pub fn neuron(&self, id: NeuronId) -> Result<&HHNeuron> {
        self.neurons.get(id.index()).ok_or(RuntimeError::unknown_neuron(id))
    }

    /// Get neuron count
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// All neuron IDs in registration order
    pub fn neuron_ids(&self) -> Vec<NeuronId> {
        self.neurons.iter().map(HHNeuron::id).collect()
    }

    /// All neurons in registration order
    pub fn neurons(&self) -> &[HHNeuron] {
        &self.neurons
    }

    /// The coupling table
    pub fn coupling(&self) -> &SynapticCoupling {
        &self.coupling
    }

    /// Split into mutable neurons and the shared coupling table
    pub fn parts_mut(&mut self) -> (&mut [HHNeuron], &SynapticCoupling) {
        (&mut self.neurons, &self.coupling)
    }
}

/// Builder for constructing HH networks
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    default_params: HHParams,
    neurons: Vec<Option<HHParams>>,
    synapses: Vec<(NeuronId, NeuronId, f64)>,
}

impl NetworkBuilder {
    /// Create a new network builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parameters used by neurons added without explicit ones
    pub fn with_default_params(mut self, params: HHParams) -> Self {
        self.default_params = params;
        self
    }

    /// Add a neuron with default parameters
    pub fn add_neuron(mut self) -> Self {
        self.neurons.push(None);
        self
    }

    /// Add a neuron with specific parameters
    pub fn add_neuron_with_params(mut self, params: HHParams) -> Self {
        self.neurons.push(Some(params));
        self
    }

    /// Add `count` neurons with default parameters
    pub fn add_neurons(mut self, count: u32) -> Self {
        self.neurons.extend((0..count).map(|_| None));
        self
    }

    /// Add a synapse
    pub fn add_synapse(mut self, pre: NeuronId, post: NeuronId, weight: f64) -> Self {
        self.synapses.push((pre, post, weight));
        self
    }

    /// Connect every ordered pair of distinct neurons
    pub fn fully_connected(mut self, weight: f64) -> Self {
        // Populations past u32::MAX are rejected by `build`
        let count = u32::try_from(self.neurons.len()).unwrap_or(u32::MAX);
        for pre in 0..count {
            for post in 0..count {
                if pre != post {
                    self.synapses.push((NeuronId::new(pre), NeuronId::new(post), weight));
                }
            }
        }
        self
    }

    /// Build the network
    pub fn build(self) -> Result<HHNetwork> {
        let mut network = HHNetwork::new(self.default_params)?;

        for params_opt in self.neurons {
            match params_opt {
                Some(params) => network.add_neuron_with_params(params)?,
                None => network.add_neuron()?,
            };
        }

        for (pre, post, weight) in self.synapses {
            network.set_weight(pre, post, weight)?;
        }

        Ok(network)
    }
}
