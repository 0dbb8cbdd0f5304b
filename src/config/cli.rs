use crate::config::toml_config::StudyConfig;
use crate::core::export::ExportFormat;
use crate::utils::error::Result;
use crate::utils::validation::parse_participant_count;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Config file picked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "study.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "study-randomizer")]
#[command(about = "Randomized measurement schedules for the compressibility validation study")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// JSON file holding the roster
    #[arg(long, global = true)]
    pub data_file: Option<String>,

    /// Remote document URL tried before the local file
    #[arg(long, global = true)]
    pub remote_endpoint: Option<String>,

    /// Directory export files are written to
    #[arg(long, global = true)]
    pub export_dir: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate a fresh roster (1-50 participants)
    Generate {
        #[arg(value_parser = parse_participant_count)]
        participants: usize,

        /// Replace an existing roster
        #[arg(long)]
        force: bool,
    },
    /// Append one participant with a new random seed
    Add,
    /// Remove a participant by record id
    Remove { record_id: u32 },
    /// Draw a new seed and design for a participant
    Regenerate { record_id: u32 },
    /// Print the roster summary and every participant's design
    Show,
    /// Write export files (defaults to the configured formats)
    Export {
        #[arg(value_enum)]
        formats: Vec<ExportFormat>,
    },
    /// Delete the saved roster
    Clear,
}

impl CliConfig {
    /// 載入設定檔（若有）並套用命令列覆蓋
    pub fn resolve(&self) -> Result<StudyConfig> {
        let mut config = match &self.config {
            Some(path) => StudyConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                StudyConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => StudyConfig::default(),
        };

        if let Some(data_file) = &self.data_file {
            config.storage.data_file = data_file.clone();
        }
        if let Some(endpoint) = &self.remote_endpoint {
            config.storage.remote_endpoint = Some(endpoint.clone());
        }
        if let Some(export_dir) = &self.export_dir {
            config.export.output_dir = export_dir.clone();
        }

        Ok(config)
    }
}
