pub mod document;
pub mod plot_config;
pub mod tagger_config;

#[cfg(feature = "cli")]
use crate::config::plot_config::PlotCategory;
#[cfg(feature = "cli")]
use crate::core::orchestrator::RunOptions;
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ftag-plots")]
#[command(about = "Produce flavour-tagging comparison plots from a YAML plot configuration")]
pub struct CliArgs {
    /// Path to the plot configuration (YAML, TOML or JSON)
    #[arg(short, long)]
    pub config: String,

    /// Only produce these plot kinds
    #[arg(long, value_enum, value_delimiter = ',')]
    pub plots: Option<Vec<PlotCategory>>,

    /// Only produce plots for these signal flavours
    #[arg(long, value_delimiter = ',')]
    pub signals: Vec<String>,

    /// Maximum number of jets read per tagger
    #[arg(short, long, default_value = "1000000")]
    pub num_jets: usize,

    /// Sample label used to pick each tagger's sample path
    #[arg(short, long, default_value = "ttbar")]
    pub sample: String,

    /// Show what would be produced without reading any sample
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,
}

#[cfg(feature = "cli")]
impl CliArgs {
    pub fn to_run_options(&self) -> RunOptions {
        RunOptions {
            num_jets: self.num_jets,
            sample: self.sample.clone(),
            plot_kinds: self.plots.clone(),
        }
    }
}
