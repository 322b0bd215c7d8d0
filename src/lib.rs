pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliArgs, LogFormat};

pub use adapters::storage::LocalStorage;
pub use app::plots::SvgRenderer;
pub use config::plot_config::{PlotCategory, PlotConfig};
pub use config::tagger_config::TaggerConfig;
pub use crate::core::orchestrator::{PlotOrchestrator, RunOptions, RunSummary};
pub use crate::core::resolver::identify;
pub use crate::core::signals::{get_signals, resolve};
pub use domain::flavours::{Flavour, FlavourRegistry};
pub use utils::error::{PlotError, Result};
