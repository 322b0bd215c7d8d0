use crate::app::plots::canvas::{line_style, Figure};
use crate::app::plots::metrics::{finite_range, select, Histogram};
use crate::config::plot_config::{DiscArgs, ProbsArgs};
use crate::domain::model::PlotRun;
use crate::utils::error::{PlotError, Result};

/// Line width per tagger; the first tagger is drawn thickest.
fn tagger_width(index: usize) -> u32 {
    if index == 0 {
        2
    } else {
        1
    }
}

fn tagger_alpha(index: usize) -> f64 {
    (1.0 - 0.25 * index as f64).max(0.3)
}

/// 判別量分佈，每種真實 flavour 一條
pub fn disc_figure(run: &PlotRun, args: &DiscArgs) -> Result<Figure> {
    let flavours = run.flavours();
    let mut discs = Vec::with_capacity(run.samples.len());
    for sample in &run.samples {
        let weights = sample.tagger.background_weights(&run.backgrounds);
        discs.push(sample.discriminant(&run.signal, &weights)?);
    }

    let range = args
        .range
        .or_else(|| finite_range(&discs.concat()))
        .unwrap_or((-1.0, 1.0));

    let mut figure = Figure::new(
        format!("{} discriminant", run.signal.label),
        format!("D_{}", run.signal.name.trim_end_matches("jets")),
        "Normalised number of jets",
    );
    figure.log_y = args.log_y;
    figure.x_range = Some(range);

    for (i, (sample, disc)) in run.samples.iter().zip(&discs).enumerate() {
        for flavour in &flavours {
            let values = select(disc, &sample.is_flavour(flavour));
            let hist = Histogram::new(&values, args.bins, range);
            figure.push(
                format!("{} {}", sample.tagger.label, flavour.label),
                line_style(flavour.colour, tagger_alpha(i), tagger_width(i)),
                hist.step_points(),
            );
        }
    }
    Ok(figure)
}

/// Distribution of one probability output, split by true flavour.
pub fn probs_figure(run: &PlotRun, args: &ProbsArgs) -> Result<Figure> {
    let name = args.flavour.as_deref().unwrap_or(&run.signal.name);
    let output = run.flavour(name).ok_or_else(|| {
        PlotError::render(
            format!("probs_{}", name),
            format!("'{}' is not a flavour of this run", name),
        )
    })?;

    let mut figure = Figure::new(
        format!("{} probability", output.label),
        format!("p_{}", output.prob_suffix.trim_start_matches("_p")),
        "Normalised number of jets",
    );
    figure.log_y = args.log_y;
    figure.x_range = Some((0.0, 1.0));

    for (i, sample) in run.samples.iter().enumerate() {
        let probs = sample.probs(output)?;
        for flavour in run.flavours() {
            let values = select(probs, &sample.is_flavour(&flavour));
            let hist = Histogram::new(&values, args.bins, (0.0, 1.0));
            figure.push(
                format!("{} {}", sample.tagger.label, flavour.label),
                line_style(flavour.colour, tagger_alpha(i), tagger_width(i)),
                hist.step_points(),
            );
        }
    }
    Ok(figure)
}
