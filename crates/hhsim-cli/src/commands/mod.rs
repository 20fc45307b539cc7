//! CLI command implementations for hhsim

use clap::{Parser, Subcommand};
use crate::error::CliResult;

pub mod init;
pub mod run;

/// hhsim - Hodgkin-Huxley neuron and small-network simulator
#[derive(Parser, Debug)]
#[command(
    name = "hhsim",
    version,
    about = "Hodgkin-Huxley neuron and small-network simulator",
    long_about = "hhsim integrates the Hodgkin-Huxley membrane equations for one or more \
                  neurons coupled through weighted synapses and prints every neuron's \
                  membrane potential over time as CSV."
)]
pub struct HhsimCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an experiment and print voltage traces as CSV
    #[command(alias = "sim")]
    Run(run::RunCommand),

    /// Write the default experiment file
    #[command(alias = "new")]
    Init(init::InitCommand),
}

impl HhsimCli {
    /// Execute the CLI command
    pub fn execute(self) -> CliResult<()> {
        match self.command {
            Commands::Run(cmd) => cmd.execute(),
            Commands::Init(cmd) => cmd.execute(),
        }
    }
}
