use crate::app::plots::canvas::{line_style, Figure};
use crate::app::plots::metrics::{efficiency, rejection, working_point_cut};
use crate::config::plot_config::EffVsVarArgs;
use crate::domain::model::PlotRun;
use crate::utils::error::{PlotError, Result};

/// Index of the bin holding `x`; the last bin includes its upper edge.
fn bin_index(edges: &[f64], x: f64) -> Option<usize> {
    let last = edges.len().checked_sub(2)?;
    if !x.is_finite() || x < edges[0] || x > edges[last + 1] {
        return None;
    }
    Some(edges.windows(2).position(|w| x < w[1]).unwrap_or(last))
}

/// Efficiency (signal) or rejection (background) as a function of a jet
/// variable at a fixed working point.
pub fn eff_vs_var_figure(run: &PlotRun, args: &EffVsVarArgs) -> Result<Figure> {
    let name = args.flavour.as_deref().unwrap_or(&run.signal.name);
    let flavour = run.flavour(name).ok_or_else(|| {
        PlotError::render(
            args.var.clone(),
            format!("'{}' is not a flavour of this run", name),
        )
    })?;
    let is_signal = flavour.name == run.signal.name;
    let n_bins = args.bins.len() - 1;

    let mut figure = Figure::new(
        format!(
            "{} {} at {:.0}% WP{}",
            flavour.label,
            if is_signal { "efficiency" } else { "rejection" },
            args.working_point * 100.0,
            if args.fixed_eff_bin { " (flat per bin)" } else { "" }
        ),
        args.x_label.clone().unwrap_or_else(|| args.var.clone()),
        if is_signal {
            format!("{} efficiency", flavour.label)
        } else {
            format!("{} rejection", flavour.label)
        },
    );
    figure.log_y = !is_signal;
    figure.x_range = Some((args.bins[0], args.bins[n_bins]));

    for sample in &run.samples {
        let weights = sample.tagger.background_weights(&run.backgrounds);
        let disc = sample.discriminant(&run.signal, &weights)?;
        let var = sample.column(&args.var)?;

        let mut signal_bins = vec![Vec::new(); n_bins];
        let mut flavour_bins = vec![Vec::new(); n_bins];
        for ((&d, &x), &label) in disc.iter().zip(var).zip(&sample.labels) {
            let Some(bin) = bin_index(&args.bins, x) else {
                continue;
            };
            if label == run.signal.label_value {
                signal_bins[bin].push(d);
            }
            if label == flavour.label_value {
                flavour_bins[bin].push(d);
            }
        }

        let inclusive_cut = working_point_cut(&signal_bins.concat(), args.working_point);
        let mut points = Vec::with_capacity(n_bins * 2);
        for bin in 0..n_bins {
            let cut = if args.fixed_eff_bin {
                working_point_cut(&signal_bins[bin], args.working_point)
            } else {
                inclusive_cut
            };
            let value = cut
                .and_then(|c| efficiency(&flavour_bins[bin], c))
                .and_then(|eff| if is_signal { Some(eff) } else { rejection(eff) });
            if let Some(y) = value {
                points.push((args.bins[bin], y));
                points.push((args.bins[bin + 1], y));
            }
        }
        figure.push(sample.tagger.label.clone(), line_style(sample.tagger.colour, 1.0, 2), points);
    }
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::plots::tests::mock_run;

    fn args(flavour: &str, fixed_eff_bin: bool) -> EffVsVarArgs {
        EffVsVarArgs {
            var: "pt".to_string(),
            bins: vec![20.0, 100.0, 220.0],
            working_point: 0.5,
            flavour: Some(flavour.to_string()),
            fixed_eff_bin,
            x_label: Some("p_T [GeV]".to_string()),
        }
    }

    #[test]
    fn test_bin_index() {
        let edges = [0.0, 1.0, 2.0];
        assert_eq!(bin_index(&edges, 0.0), Some(0));
        assert_eq!(bin_index(&edges, 1.0), Some(1));
        assert_eq!(bin_index(&edges, 2.0), Some(1));
        assert_eq!(bin_index(&edges, 2.5), None);
        assert_eq!(bin_index(&edges, f64::NAN), None);
    }

    #[test]
    fn test_flat_signal_efficiency_per_bin() {
        let run = mock_run();
        let figure = eff_vs_var_figure(&run, &args("bjets", true)).unwrap();

        assert!(!figure.log_y);
        assert_eq!(figure.x_label, "p_T [GeV]");
        let points = &figure.series[0].points;
        assert_eq!(points.len(), 4);
        for (_, eff) in points {
            assert!((eff - 0.5).abs() < 0.15, "eff = {}", eff);
        }
    }

    #[test]
    fn test_background_rejection_uses_log_axis() {
        let run = mock_run();
        let figure = eff_vs_var_figure(&run, &args("ujets", false)).unwrap();
        assert!(figure.log_y);
        assert!(figure.title.contains("rejection"));
    }
}
