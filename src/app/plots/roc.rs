use crate::app::plots::canvas::{line_style, Figure};
use crate::app::plots::metrics::{efficiency, linspace, rejection, select, working_point_cut};
use crate::config::plot_config::{FractionScanArgs, RocArgs};
use crate::domain::flavours::Flavour;
use crate::domain::model::{PlotRun, TaggerSample};
use crate::utils::error::{PlotError, Result};

/// Signal and per-background discriminant values of one tagger.
struct Separated {
    signal: Vec<f64>,
    backgrounds: Vec<(Flavour, Vec<f64>)>,
}

fn separate(run: &PlotRun, sample: &TaggerSample, weights: &[(Flavour, f64)]) -> Result<Separated> {
    let disc = sample.discriminant(&run.signal, weights)?;
    Ok(Separated {
        signal: select(&disc, &sample.is_flavour(&run.signal)),
        backgrounds: run
            .backgrounds
            .iter()
            .map(|b| (b.clone(), select(&disc, &sample.is_flavour(b))))
            .collect(),
    })
}

fn rejection_at(signal: &[f64], background: &[f64], working_point: f64) -> Option<f64> {
    let cut = working_point_cut(signal, working_point)?;
    rejection(efficiency(background, cut)?)
}

/// 背景拒絕率 vs. signal 效率
pub fn roc_figure(run: &PlotRun, args: &RocArgs) -> Result<Figure> {
    let mut figure = Figure::new(
        format!("{} tagging ROC", run.signal.label),
        format!("{} efficiency", run.signal.label),
        "Background rejection",
    );
    figure.log_y = true;
    figure.x_range = Some(args.x_range);

    let effs = linspace(args.x_range.0, args.x_range.1, args.n_points);
    for sample in &run.samples {
        let weights = sample.tagger.background_weights(&run.backgrounds);
        let separated = separate(run, sample, &weights)?;
        for (i, (background, values)) in separated.backgrounds.iter().enumerate() {
            let points = effs
                .iter()
                .filter_map(|&eff| Some((eff, rejection_at(&separated.signal, values, eff)?)))
                .collect();
            let alpha = if i == 0 { 1.0 } else { 0.5 };
            figure.push(
                format!("{} ({})", sample.tagger.label, background.label),
                line_style(sample.tagger.colour, alpha, 2),
                points,
            );
        }
    }
    Ok(figure)
}

/// Rejection of two backgrounds while their relative weight in the
/// discriminant moves from 0 to 1.
pub fn fraction_scan_figure(run: &PlotRun, args: &FractionScanArgs) -> Result<Figure> {
    let (first, second) = match &args.backgrounds {
        Some((a, b)) => (flavour(run, a)?, flavour(run, b)?),
        None => {
            return Err(PlotError::render(
                "fraction_scan",
                "background pair was not filled in",
            ))
        }
    };

    let mut figure = Figure::new(
        format!(
            "{} fraction scan at {:.0}% WP",
            run.signal.label,
            args.working_point * 100.0
        ),
        format!("{} rejection", first.label),
        format!("{} rejection", second.label),
    );

    for sample in &run.samples {
        let mut points = Vec::with_capacity(args.n_points);
        for fx in linspace(0.0, 1.0, args.n_points) {
            let weights = vec![(first.clone(), fx), (second.clone(), 1.0 - fx)];
            let disc = sample.discriminant(&run.signal, &weights)?;
            let signal = select(&disc, &sample.is_flavour(&run.signal));
            let rej_first = rejection_at(&signal, &select(&disc, &sample.is_flavour(first)), args.working_point);
            let rej_second = rejection_at(&signal, &select(&disc, &sample.is_flavour(second)), args.working_point);
            if let (Some(x), Some(y)) = (rej_first, rej_second) {
                points.push((x, y));
            }
        }
        figure.push(sample.tagger.label.clone(), line_style(sample.tagger.colour, 1.0, 2), points);
    }
    Ok(figure)
}

fn flavour<'a>(run: &'a PlotRun, name: &str) -> Result<&'a Flavour> {
    run.flavour(name).ok_or_else(|| {
        PlotError::render(
            "fraction_scan",
            format!("'{}' is not a flavour of this run", name),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::plots::tests::mock_run;

    #[test]
    fn test_roc_has_one_curve_per_tagger_and_background() {
        let run = mock_run();
        let figure = roc_figure(&run, &RocArgs { x_range: (0.5, 1.0), n_points: 6 }).unwrap();

        assert_eq!(figure.series.len(), 2);
        assert!(figure.log_y);
        let light = &figure.series[1];
        assert!(light.label.contains("light"));
        // Rejection falls as the signal efficiency grows.
        let finite: Vec<f64> = light.points.iter().map(|p| p.1).collect();
        assert!(!finite.is_empty());
        assert!(finite.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_fraction_scan_points() {
        let run = mock_run();
        let args = FractionScanArgs {
            working_point: 0.5,
            backgrounds: Some(("cjets".to_string(), "ujets".to_string())),
            n_points: 3,
        };
        let figure = fraction_scan_figure(&run, &args).unwrap();
        assert_eq!(figure.series.len(), 1);
        assert!(figure.series[0].points.len() <= 3);

        let missing = FractionScanArgs { backgrounds: None, ..args };
        assert!(fraction_scan_figure(&run, &missing).is_err());
    }
}
