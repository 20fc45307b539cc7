//! hhsim CLI crate
//!
//! Purpose:
//! - Provide the `hhsim` command-line front end to the Hodgkin-Huxley runtime.
//! - Load experiment descriptions (simulation window, neurons, stimuli, synapses) from TOML,
//!   run them, and render the voltage traces as CSV.
//!
//! Major commands (see [commands]):
//! - run: load an experiment (or the built-in three-neuron default), apply overrides, simulate,
//!        and write CSV to stdout or a file.
//! - init: write the default experiment to a TOML file as a starting point.
//!
//! Notes:
//! - The binary (src/main.rs) wires up logging and argument parsing, calling HhsimCli::execute().
//! - The library surface re-exports command and config modules to support integration testing
//!   without invoking an external process.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::HhsimCli;
