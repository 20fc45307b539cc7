//! Synaptic coupling between neurons
//!
//! A directed weighted graph over registry indices. Each step the coupling
//! turns every source neuron's voltage from the previous step into additive
//! stimulus on its destinations for the current step.

use std::collections::BTreeMap;

use crate::{error::*, neuron::HHNeuron, NeuronId};

/// Directed connection key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SynapseId {
    /// Pre-synaptic neuron
    pub pre: NeuronId,
    /// Post-synaptic neuron
    pub post: NeuronId,
}

impl SynapseId {
    /// Create a new synapse ID
    pub fn new(pre: NeuronId, post: NeuronId) -> Self {
        Self { pre, post }
    }

    /// Whether the synapse connects a neuron to itself
    pub fn is_self_loop(&self) -> bool {
        self.pre == self.post
    }
}

/// Weighted synaptic coupling table
///
/// Entries are kept ordered by (pre, post) so propagation, and therefore the
/// summation order of fan-in, is deterministic.
#[derive(Debug, Clone, Default)]
pub struct SynapticCoupling {
    weights: BTreeMap<SynapseId, f64>,
}

impl SynapticCoupling {
    /// Create an empty coupling table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the weight from `pre` to `post`, replacing any earlier weight
    pub fn set_weight(&mut self, pre: NeuronId, post: NeuronId, weight: f64) {
        self.weights.insert(SynapseId::new(pre, post), weight);
    }

    /// Weight from `pre` to `post`, if recorded
    pub fn weight(&self, pre: NeuronId, post: NeuronId) -> Option<f64> {
        self.weights.get(&SynapseId::new(pre, post)).copied()
    }

    /// Number of recorded entries (including zero weights and self-loops)
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether no entries are recorded
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Connections that take part in propagation, as (pre, post, weight)
    pub fn connections(&self) -> impl Iterator<Item = (NeuronId, NeuronId, f64)> + '_ {
        self.weights
            .iter()
            .filter(|(id, w)| !id.is_self_loop() && **w != 0.0)
            .map(|(id, &w)| (id.pre, id.post, w))
    }

    /// Check that every endpoint refers to one of `neuron_count` neurons
    pub fn validate(&self, neuron_count: usize) -> Result<()> {
        for id in self.weights.keys() {
            for endpoint in [id.pre, id.post] {
                if endpoint.index() >= neuron_count {
                    return Err(RuntimeError::unknown_neuron(endpoint));
                }
            }
        }
        Ok(())
    }

    /// Inject coupled stimulus for `step` into the destination neurons
    ///
    /// Reads each source's voltage at `step - 1` and adds `voltage * weight`
    /// to the destination's stimulus slot at `step`. Must run before any
    /// neuron advances through `step`.
    pub fn propagate(&self, step: usize, neurons: &mut [HHNeuron]) -> Result<()> {
        if step == 0 {
            return Err(RuntimeError::invalid_parameter("step", "0", ">= 1"));
        }

        for (pre, post, weight) in self.connections() {
            let source = neurons
                .get(pre.index())
                .ok_or_else(|| RuntimeError::unknown_neuron(pre))?;
            let voltage = source.voltage_at(step - 1)?;

            let target = neurons
                .get_mut(post.index())
                .ok_or_else(|| RuntimeError::unknown_neuron(post))?;
            target.inject(step, voltage * weight)?;
        }

        Ok(())
    }
}
