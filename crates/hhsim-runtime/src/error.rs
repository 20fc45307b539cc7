//! Error types for the HH runtime

use thiserror::Error;

use crate::NeuronId;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in the HH runtime
///
/// All variants describe configuration or programming mistakes detected at
/// the call site. None of them are transient, so callers should abort the
/// run rather than retry.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Non-positive or non-finite time step or total time, or too many points
    #[error(
        "Invalid time step: total_time={total_time}ms, dt={dt}ms (both must be finite and > 0, total_time/dt below {})",
        crate::clock::MAX_TIME_POINTS
    )]
    InvalidTimeStep {
        /// Requested total simulation time (ms)
        total_time: f64,
        /// Requested time step (ms)
        dt: f64,
    },

    /// Operation invoked on a neuron before its trajectories were allocated
    #[error("Neuron {neuron_id} is not initialized (called {operation})")]
    UninitializedState {
        /// Neuron the operation was invoked on
        neuron_id: NeuronId,
        /// Operation that required initialized state
        operation: &'static str,
    },

    /// Step index past the end of a trajectory
    #[error("Step {step} out of range for neuron {neuron_id} (trajectory length {len})")]
    OutOfRange {
        /// Neuron whose trajectory was indexed
        neuron_id: NeuronId,
        /// Offending step index
        step: usize,
        /// Trajectory length
        len: usize,
    },

    /// Neuron not registered with the network
    #[error("Neuron {neuron_id} not found")]
    UnknownNeuron {
        /// Neuron ID that was not found
        neuron_id: NeuronId,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Failure writing results
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Create an invalid time step error
    pub fn invalid_time_step(total_time: f64, dt: f64) -> Self {
        Self::InvalidTimeStep { total_time, dt }
    }

    /// Create an uninitialized state error
    pub fn uninitialized(neuron_id: NeuronId, operation: &'static str) -> Self {
        Self::UninitializedState { neuron_id, operation }
    }

    /// Create an out of range error
    pub fn out_of_range(neuron_id: NeuronId, step: usize, len: usize) -> Self {
        Self::OutOfRange { neuron_id, step, len }
    }

    /// Create an unknown neuron error
    pub fn unknown_neuron(neuron_id: NeuronId) -> Self {
        Self::UnknownNeuron { neuron_id }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RuntimeError::invalid_time_step(55.0, 0.0);
        assert!(matches!(err, RuntimeError::InvalidTimeStep { .. }));

        let err = RuntimeError::invalid_parameter("capacitance", "0", "> 0.0");
        assert!(matches!(err, RuntimeError::InvalidParameter { .. }));

        let err = RuntimeError::out_of_range(NeuronId::new(1), 12, 11);
        assert!(matches!(err, RuntimeError::OutOfRange { step: 12, len: 11, .. }));
    }

    #[test]
    fn test_error_display() {
        let err = RuntimeError::unknown_neuron(NeuronId::new(42));
        let msg = format!("{}", err);
        assert!(msg.contains("Neuron N42 not found"));

        let err = RuntimeError::uninitialized(NeuronId::new(0), "advance");
        let msg = err.to_string();
        assert!(msg.contains("N0"));
        assert!(msg.contains("advance"));
    }
}
