use crate::app::plots::metrics::finite_range;
use crate::config::plot_config::PlotStyle;
use crate::utils::error::{PlotError, Result};
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::Path;

/// 一條曲線
#[derive(Clone)]
pub struct Series {
    pub label: String,
    pub style: ShapeStyle,
    pub points: Vec<(f64, f64)>,
}

/// Everything needed to draw one chart.
#[derive(Clone, Default)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub log_y: bool,
    pub x_range: Option<(f64, f64)>,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            ..Default::default()
        }
    }

    pub fn push(&mut self, label: impl Into<String>, style: ShapeStyle, points: Vec<(f64, f64)>) {
        self.series.push(Series {
            label: label.into(),
            style,
            points,
        });
    }

    fn x_bounds(&self) -> (f64, f64) {
        if let Some(range) = self.x_range {
            return range;
        }
        let xs: Vec<f64> = self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0)).collect();
        finite_range(&xs).unwrap_or((0.0, 1.0))
    }

    fn y_bounds(&self) -> (f64, f64) {
        let ys: Vec<f64> = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .filter(|y| !self.log_y || *y > 0.0)
            .collect();

        if self.log_y {
            // ys holds positive values only here.
            let (lo, hi) = ys
                .iter()
                .filter(|y| y.is_finite())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| (lo.min(y), hi.max(y)));
            return if lo.is_finite() { (lo * 0.5, hi * 2.0) } else { (1.0, 10.0) };
        }

        match finite_range(&ys) {
            Some((lo, hi)) => {
                let pad = (hi - lo) * 0.05;
                let lo = if lo >= 0.0 { 0.0 } else { lo - pad };
                (lo, hi + pad)
            }
            None => (0.0, 1.0),
        }
    }

    /// Points that can be placed on the axes.
    fn drawable(&self, series: &Series) -> Vec<(f64, f64)> {
        series
            .points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite() && (!self.log_y || *y > 0.0))
            .collect()
    }
}

pub fn rgb(colour: (u8, u8, u8)) -> RGBColor {
    RGBColor(colour.0, colour.1, colour.2)
}

pub fn line_style(colour: (u8, u8, u8), alpha: f64, width: u32) -> ShapeStyle {
    ShapeStyle {
        color: rgb(colour).mix(alpha),
        filled: false,
        stroke_width: width,
    }
}

/// Draws `figure` into an SVG file at `output`. A file is written even when
/// no series has a drawable point.
pub fn draw(figure: &Figure, style: &PlotStyle, output: &Path) -> Result<()> {
    let plot = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("plot")
        .to_string();
    let fail = |e: String| PlotError::render(plot.clone(), e);

    let caption = match &style.subtitle {
        Some(subtitle) => format!("{} | {}", figure.title, subtitle),
        None => figure.title.clone(),
    };
    let (x_lo, x_hi) = figure.x_bounds();
    let (y_lo, y_hi) = figure.y_bounds();

    let root = SVGBackend::new(output, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| fail(e.to_string()))?;

    let mut builder = ChartBuilder::on(&root);
    builder
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60);

    if figure.log_y {
        let mut chart = builder
            .build_cartesian_2d(x_lo..x_hi, (y_lo..y_hi).log_scale())
            .map_err(|e| fail(e.to_string()))?;
        draw_on(&mut chart, figure).map_err(|e| fail(e.to_string()))?;
    } else {
        let mut chart = builder
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(|e| fail(e.to_string()))?;
        draw_on(&mut chart, figure).map_err(|e| fail(e.to_string()))?;
    }

    root.present().map_err(|e| fail(e.to_string()))?;
    Ok(())
}

fn draw_on<'a, DB, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, Y>>,
    figure: &Figure,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend + 'a,
    Y: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .draw()?;

    let mut labelled = 0;
    for series in &figure.series {
        let points = figure.drawable(series);
        if points.is_empty() {
            continue;
        }
        let line = series.style;
        chart
            .draw_series(LineSeries::new(points, line))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line));
        labelled += 1;
    }

    if labelled > 0 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}
