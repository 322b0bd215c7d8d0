//! 產生測試用的假樣本 (mock jets)
//!
//! Every jet carries `pt` (GeV), `eta`, the truth label and, for each tagger,
//! `<tagger>_pu`, `<tagger>_pc`, `<tagger>_pb` probabilities that favour the
//! true flavour.

use crate::domain::flavours::DEFAULT_LABEL_VAR;
use crate::utils::error::{PlotError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};
use std::path::Path;

pub const MOCK_TAGGER: &str = "MockTagger";

/// (truth label, probability suffix, fraction of jets)
const FLAVOURS: [(i64, &str, f64); 3] = [(0, "_pu", 0.5), (4, "_pc", 0.2), (5, "_pb", 0.3)];

#[derive(Debug, Clone, PartialEq)]
pub struct MockSample {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl MockSample {
    /// Generates `num_jets` jets; the same seed always gives the same jets.
    pub fn generate<S: AsRef<str>>(num_jets: usize, seed: u64, taggers: &[S]) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let pt_tail = Exp::new(1.0 / 40.0).map_err(|e| PlotError::sample("mock", e.to_string()))?;
        let noise = Normal::new(0.0, 1.0).map_err(|e| PlotError::sample("mock", e.to_string()))?;

        let mut columns = vec![
            "pt".to_string(),
            "eta".to_string(),
            DEFAULT_LABEL_VAR.to_string(),
        ];
        for tagger in taggers {
            for (_, suffix, _) in FLAVOURS {
                columns.push(format!("{}{}", tagger.as_ref(), suffix));
            }
        }

        let mut rows = Vec::with_capacity(num_jets);
        for _ in 0..num_jets {
            let label = draw_label(&mut rng);
            let mut row = Vec::with_capacity(columns.len());
            row.push(20.0 + pt_tail.sample(&mut rng));
            row.push(rng.gen_range(-2.5..2.5));
            row.push(label as f64);

            for (t, _) in taggers.iter().enumerate() {
                // Later taggers separate flavours a little better.
                let separation = 1.5 + 0.5 * t as f64;
                let logits: Vec<f64> = FLAVOURS
                    .iter()
                    .map(|(value, _, _)| {
                        let bias = if *value == label { separation } else { 0.0 };
                        bias + noise.sample(&mut rng)
                    })
                    .collect();
                row.extend(softmax(&logits));
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn draw_label(rng: &mut StdRng) -> i64 {
    let u: f64 = rng.gen();
    let mut acc = 0.0;
    for (value, _, fraction) in FLAVOURS {
        acc += fraction;
        if u < acc {
            return value;
        }
    }
    FLAVOURS[FLAVOURS.len() - 1].0
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Generates a sample and writes it to `path` as CSV.
pub fn write_mock_file<S: AsRef<str>>(
    path: &Path,
    num_jets: usize,
    seed: u64,
    taggers: &[S],
) -> Result<MockSample> {
    let sample = MockSample::generate(num_jets, seed, taggers)?;
    sample.write_csv(path)?;
    tracing::debug!("🧪 Wrote {} mock jet(s) to {}", num_jets, path.display());
    Ok(sample)
}
