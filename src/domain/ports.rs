use crate::config::plot_config::PlotSpec;
use crate::domain::model::PlotRun;
use crate::utils::error::Result;
use std::path::Path;

/// Plotting primitives: draws one plot specification of a run into `output`.
pub trait PlotRenderer {
    /// File extension of the artifacts, without the dot.
    fn extension(&self) -> &str;

    fn render(&self, run: &PlotRun, spec: &PlotSpec, output: &Path) -> Result<()>;
}
