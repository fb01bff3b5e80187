//! Command-line flags for the `promptos` binary.
//!
//! A flag beats its environment variable, which beats the config file.

use std::path::PathBuf;

use clap::Parser;
use promptos_core::config::{expand_home, PromptosConfig};

/// Config file read when neither `--config` nor `PROMPTOS_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "~/.promptos/config.toml";

/// PromptOS - run developer chores from natural-language prompts.
#[derive(Parser, Debug)]
#[command(name = "promptos", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", env = "PROMPTOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port", env = "PROMPTOS_PORT")]
    pub port: Option<u16>,

    /// Directory holding the prompt log database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<String>,

    /// Log filter directive, e.g. `debug` or `promptos_action=trace`.
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| expand_home(DEFAULT_CONFIG_PATH))
    }

    /// Overlay the port and data directory flags onto a loaded config.
    pub fn apply(&self, config: &mut PromptosConfig) {
        if let Some(port) = self.port {
            config.general.port = port;
        }
        if let Some(dir) = &self.data_dir {
            config.general.data_dir = dir.clone();
        }
    }

    /// `--log-level` if given, else the config value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}
