pub mod orchestrator;
pub mod resolver;
pub mod signals;

pub use crate::domain::model::{PlotRun, TaggerIdentity, TaggerSample};
pub use crate::domain::ports::PlotRenderer;
pub use crate::utils::error::Result;
