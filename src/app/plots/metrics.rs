//! Numeric helpers for performance curves: quantile cuts, efficiencies,
//! rejections and normalised histograms.

pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Values whose mask entry is true.
pub fn select(values: &[f64], mask: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, &keep)| keep)
        .map(|(v, _)| *v)
        .collect()
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linear-interpolated quantile `q` in [0, 1] of the finite values.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let sorted = sorted_finite(values);
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = pos - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Discriminant cut that keeps a fraction `working_point` of the signal.
pub fn working_point_cut(signal_disc: &[f64], working_point: f64) -> Option<f64> {
    quantile(signal_disc, 1.0 - working_point)
}

/// Fraction of values strictly above `cut`.
pub fn efficiency(values: &[f64], cut: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let passed = values.iter().filter(|&&v| v > cut).count();
    Some(passed as f64 / values.len() as f64)
}

/// `1 / efficiency`, undefined for a zero efficiency.
pub fn rejection(efficiency: f64) -> Option<f64> {
    (efficiency > 0.0).then(|| 1.0 / efficiency)
}

/// Histogram normalised to unit area.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub density: Vec<f64>,
}

impl Histogram {
    pub fn new(values: &[f64], bins: usize, range: (f64, f64)) -> Self {
        let edges = linspace(range.0, range.1, bins + 1);
        let width = (range.1 - range.0) / bins as f64;
        let mut counts = vec![0usize; bins];
        let mut total = 0usize;
        for &v in values {
            if !v.is_finite() || v < range.0 || v > range.1 {
                continue;
            }
            let index = (((v - range.0) / width) as usize).min(bins - 1);
            counts[index] += 1;
            total += 1;
        }

        let norm = if total > 0 { total as f64 * width } else { 1.0 };
        Self {
            edges,
            density: counts.into_iter().map(|c| c as f64 / norm).collect(),
        }
    }

    /// Points of a step outline, one horizontal segment per bin.
    pub fn step_points(&self) -> Vec<(f64, f64)> {
        let mut points = Vec::with_capacity(self.density.len() * 2);
        for (i, &d) in self.density.iter().enumerate() {
            points.push((self.edges[i], d));
            points.push((self.edges[i + 1], d));
        }
        points
    }
}

/// Min and max of the finite values, widened when they coincide.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return None;
    }
    if hi - lo < 1e-12 {
        Some((lo - 0.5, hi + 0.5))
    } else {
        Some((lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_working_point_cut_keeps_fraction() {
        let signal: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let cut = working_point_cut(&signal, 0.7).unwrap();
        let eff = efficiency(&signal, cut).unwrap();
        assert!((eff - 0.7).abs() < 0.02, "eff = {}", eff);
        assert!(working_point_cut(&[f64::NAN], 0.7).is_none());
    }

    #[test]
    fn test_rejection() {
        assert_eq!(rejection(0.25), Some(4.0));
        assert_eq!(rejection(0.0), None);
    }

    #[test]
    fn test_histogram_is_normalised() {
        let hist = Histogram::new(&[0.1, 0.2, 0.6, 1.0, 2.0, f64::NAN], 2, (0.0, 1.0));
        let area: f64 = hist.density.iter().map(|d| d * 0.5).sum();
        assert!((area - 1.0).abs() < 1e-12);
        assert_eq!(hist.step_points().len(), 4);
        // 1.0 sits on the upper edge and lands in the last bin.
        assert!((hist.density[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_select_and_range() {
        assert_eq!(select(&[1.0, 2.0, 3.0], &[true, false, true]), vec![1.0, 3.0]);
        assert_eq!(finite_range(&[2.0, f64::INFINITY, -1.0]), Some((-1.0, 2.0)));
        assert_eq!(finite_range(&[3.0]), Some((2.5, 3.5)));
        assert_eq!(finite_range(&[]), None);
    }
}
