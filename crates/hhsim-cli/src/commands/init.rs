//! Experiment file initialization command

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::ExperimentConfig;
use crate::error::{CliError, CliResult};

const FILE_HEADER: &str = "\
# hhsim experiment
#
# Potentials are relative to rest (mV), times in ms.
# gating = \"free\" leaves gating variables unclamped, \"clamp\" pins them to [0, 1].

";

/// Write the default experiment file
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Path of the experiment file to create
    #[arg(default_value = "hhsim.toml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn execute(self) -> CliResult<()> {
        if self.path.exists() && !self.force {
            return Err(CliError::invalid_args(format!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            )));
        }

        let cfg = ExperimentConfig::reference();
        let content = format!("{}{}", FILE_HEADER, cfg.to_toml()?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, content)?;

        info!("Wrote experiment file: {}", self.path.display());
        Ok(())
    }
}
