//! Hodgkin-Huxley simulation engine
//!
//! This crate provides the numerical core of hhsim: the HH gating kinetics,
//! a conductance-based neuron that advances itself by explicit Euler steps,
//! a directed weighted coupling graph between neurons, and the fixed-step
//! clock that drives them in lock-step. Results are handed to a
//! [`ResultsSink`] once the run completes.
//!
//! All potentials are expressed relative to rest (rest = 0 mV in the default
//! parameterization), times in milliseconds.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod ids;
pub mod kinetics;
pub mod neuron;
pub mod coupling;
pub mod clock;
pub mod stimulus;
pub mod network;
pub mod simulation;
pub mod output;

// Re-export essential types
pub use error::{RuntimeError, Result};
pub use ids::NeuronId;
pub use neuron::{GatingPolicy, GatingState, HHNeuron, HHParams};
pub use coupling::{SynapseId, SynapticCoupling};
pub use clock::SimulationClock;
pub use stimulus::RectangularPulse;
pub use network::{HHNetwork, NetworkBuilder};
pub use simulation::{SimulationEngine, SimulationParams, SimulationResult, VoltageTrace};
pub use output::{CsvSink, ResultsSink};

/// Default simulation time step (ms)
pub const DEFAULT_DT_MS: f64 = 0.025;

/// Default total simulation time (ms)
pub const DEFAULT_TOTAL_TIME_MS: f64 = 55.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        // Test that all components can be imported and basic objects created
        let params = HHParams::default();
        assert!(params.capacitance > 0.0);

        let sim_params = SimulationParams::default();
        assert!(sim_params.dt_ms > 0.0);
        assert_eq!(sim_params.dt_ms, DEFAULT_DT_MS);
        assert_eq!(sim_params.total_time_ms, DEFAULT_TOTAL_TIME_MS);

        let network = NetworkBuilder::new().add_neurons(2).build().unwrap();
        assert_eq!(network.neuron_count(), 2);
    }
}
