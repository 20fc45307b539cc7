//! External stimulus protocols

use crate::{error::*, neuron::HHNeuron, NeuronId};

/// Rectangular current pulse on a single neuron
///
/// Every time point `t` with `start_ms <= t <= end_ms` receives `amplitude`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectangularPulse {
    /// Target neuron
    pub neuron: NeuronId,
    /// Current amplitude (µA/cm²)
    pub amplitude: f64,
    /// Pulse onset (ms, inclusive)
    pub start_ms: f64,
    /// Pulse end (ms, inclusive)
    pub end_ms: f64,
}

impl RectangularPulse {
    /// Create a new pulse with validation
    pub fn new(neuron: NeuronId, amplitude: f64, start_ms: f64, end_ms: f64) -> Result<Self> {
        let pulse = Self { neuron, amplitude, start_ms, end_ms };
        pulse.validate()?;
        Ok(pulse)
    }

    /// The reference protocol: 10 µA/cm² from 5 ms to 30 ms
    pub fn reference(neuron: NeuronId) -> Self {
        Self {
            neuron,
            amplitude: 10.0,
            start_ms: 5.0,
            end_ms: 30.0,
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("amplitude", self.amplitude), ("start_ms", self.start_ms), ("end_ms", self.end_ms)] {
            if !value.is_finite() {
                return Err(RuntimeError::invalid_parameter(name, value.to_string(), "finite"));
            }
        }
        if self.end_ms < self.start_ms {
            return Err(RuntimeError::invalid_parameter(
                "end_ms",
                format!("{} (with start_ms={})", self.end_ms, self.start_ms),
                ">= start_ms",
            ));
        }
        Ok(())
    }

    /// Whether time `t` (ms) falls inside the pulse
    pub fn is_active(&self, t: f64) -> bool {
        t >= self.start_ms && t <= self.end_ms
    }

    /// Add the pulse to the target neuron's stimulus trajectory
    ///
    /// `time_axis` must be the axis the neuron was initialized with.
    pub fn apply(&self, time_axis: &[f64], neurons: &mut [HHNeuron]) -> Result<()> {
        self.validate()?;
        let neuron = neurons
            .get_mut(self.neuron.index())
            .ok_or_else(|| RuntimeError::unknown_neuron(self.neuron))?;

        for (step, &t) in time_axis.iter().enumerate() {
            if self.is_active(t) {
                neuron.inject(step, self.amplitude)?;
            }
        }
        Ok(())
    }
}
