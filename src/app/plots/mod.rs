//! SVG rendering of the plot kinds with `plotters`.

pub mod canvas;
pub mod distributions;
pub mod efficiency;
pub mod metrics;
pub mod roc;

use crate::config::plot_config::{PlotKind, PlotSpec, PlotStyle};
use crate::domain::model::PlotRun;
use crate::domain::ports::PlotRenderer;
use crate::utils::error::Result;
use std::path::Path;

/// 以 SVG 輸出圖表
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    style: PlotStyle,
}

impl SvgRenderer {
    pub fn new(style: PlotStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &PlotStyle {
        &self.style
    }
}

impl PlotRenderer for SvgRenderer {
    fn extension(&self) -> &str {
        "svg"
    }

    fn render(&self, run: &PlotRun, spec: &PlotSpec, output: &Path) -> Result<()> {
        let figure = match &spec.kind {
            PlotKind::Roc(args) => roc::roc_figure(run, args)?,
            PlotKind::Disc(args) => distributions::disc_figure(run, args)?,
            PlotKind::Probs(args) => distributions::probs_figure(run, args)?,
            PlotKind::EffVsVar(args) => efficiency::eff_vs_var_figure(run, args)?,
            PlotKind::FractionScan(args) => roc::fraction_scan_figure(run, args)?,
        };

        canvas::draw(&figure, &self.style, output)?;
        tracing::debug!("🖼️ Wrote {} ({} series)", output.display(), figure.series.len());
        Ok(())
    }
}
