//! Simulation run command

use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::ExperimentConfig;
use crate::error::CliResult;
use hhsim_runtime::{CsvSink, GatingPolicy, ResultsSink, SimulationResult};

/// Run an experiment
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Experiment file (.toml); runs the built-in three-neuron experiment when omitted
    pub config: Option<PathBuf>,

    /// Override total simulation time (ms)
    #[arg(long)]
    pub total_time: Option<f64>,

    /// Override integration time step (ms)
    #[arg(long)]
    pub dt: Option<f64>,

    /// Output CSV file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit a header row
    #[arg(long)]
    pub header: bool,

    /// Clamp gating variables to [0, 1]
    #[arg(long)]
    pub clamp_gating: bool,
}

impl RunCommand {
    pub fn execute(self) -> CliResult<()> {
        let mut cfg = match &self.config {
            Some(path) => {
                info!("Loading experiment: {}", path.display());
                ExperimentConfig::load_from_file(path)?
            }
            None => ExperimentConfig::reference(),
        };

        if let Some(total) = self.total_time {
            cfg.simulation.total_time_ms = total;
        }
        if let Some(dt) = self.dt {
            cfg.simulation.dt_ms = dt;
        }
        if self.clamp_gating {
            cfg.simulation.gating = GatingPolicy::Clamp;
        }

        let mut engine = cfg.build_engine()?;
        let result = engine.run()?;
        log_summary(&result);

        match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("creating output file {}", path.display()))?;
                CsvSink::new(BufWriter::new(file))
                    .with_header(self.header)
                    .write_results(&result)?;
                info!("Wrote {} rows to {}", result.len(), path.display());
            }
            None => {
                let stdout = io::stdout();
                CsvSink::new(BufWriter::new(stdout.lock()))
                    .with_header(self.header)
                    .write_results(&result)?;
            }
        }

        Ok(())
    }
}

fn log_summary(result: &SimulationResult) {
    info!(
        "Simulated {} neurons over {} time points",
        result.neuron_count(),
        result.len()
    );
    for trace in &result.traces {
        debug!(
            "{}: peak {:.3} mV, trough {:.3} mV",
            trace.neuron_id,
            trace.peak(),
            trace.trough()
        );
    }
}
