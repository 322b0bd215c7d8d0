use crate::domain::cuts::Cut;
use crate::domain::flavours::Flavour;
use crate::utils::error::{PlotError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

/// Tagger name as it appears as a column prefix in a sample file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaggerIdentity(String);

impl TaggerIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaggerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 樣本路徑：單一路徑，或依樣本標籤 (例如 ttbar) 對應的路徑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SamplePath {
    Single(PathBuf),
    PerSample(BTreeMap<String, PathBuf>),
}

impl SamplePath {
    pub fn for_sample(&self, sample: &str) -> Option<&Path> {
        match self {
            SamplePath::Single(path) => Some(path.as_path()),
            SamplePath::PerSample(paths) => paths.get(sample).map(PathBuf::as_path),
        }
    }

    /// Joins every relative path onto `base`.
    pub fn rebased(self, base: &Path) -> Self {
        let rebase = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        match self {
            SamplePath::Single(path) => SamplePath::Single(rebase(path)),
            SamplePath::PerSample(paths) => {
                SamplePath::PerSample(paths.into_iter().map(|(k, p)| (k, rebase(p))).collect())
            }
        }
    }
}

/// 合併預設值後的 tagger 設定
#[derive(Debug, Clone, PartialEq)]
pub struct Tagger {
    /// Key of the entry in the tagger document.
    pub key: String,
    /// Explicit column prefix; resolved from the sample schema when absent.
    pub name: Option<String>,
    pub label: String,
    pub sample_path: SamplePath,
    pub cuts: Vec<Cut>,
    /// Background fractions keyed by flavour name.
    pub fxs: BTreeMap<String, f64>,
    pub colour: (u8, u8, u8),
}

impl Tagger {
    /// Weights of the backgrounds in the discriminant denominator.
    ///
    /// Backgrounds with a configured fraction keep it; the rest share what is
    /// left of 1 equally.
    pub fn background_weights(&self, backgrounds: &[Flavour]) -> Vec<(Flavour, f64)> {
        let explicit: f64 = backgrounds
            .iter()
            .filter_map(|b| self.fxs.get(&b.name))
            .sum();
        let free = backgrounds
            .iter()
            .filter(|b| !self.fxs.contains_key(&b.name))
            .count();
        let share = if free > 0 {
            (1.0 - explicit).max(0.0) / free as f64
        } else {
            0.0
        };

        backgrounds
            .iter()
            .map(|b| (b.clone(), self.fxs.get(&b.name).copied().unwrap_or(share)))
            .collect()
    }
}

/// Jets of one tagger, after cuts and the jet cap.
#[derive(Debug, Clone)]
pub struct TaggerSample {
    pub tagger: Tagger,
    pub identity: TaggerIdentity,
    pub source: PathBuf,
    pub labels: Vec<i64>,
    pub columns: HashMap<String, Vec<f64>>,
}

const DISC_EPSILON: f64 = 1e-10;

impl TaggerSample {
    pub fn n_jets(&self) -> usize {
        self.labels.len()
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns.get(name).map(Vec::as_slice).ok_or_else(|| {
            PlotError::sample(
                self.source.display().to_string(),
                format!("column '{}' was not loaded", name),
            )
        })
    }

    pub fn probs(&self, flavour: &Flavour) -> Result<&[f64]> {
        self.column(&flavour.prob_column(self.identity.as_str()))
    }

    pub fn is_flavour(&self, flavour: &Flavour) -> Vec<bool> {
        self.labels.iter().map(|&l| l == flavour.label_value).collect()
    }

    /// `ln(p_sig / sum_b w_b p_b)` per jet.
    pub fn discriminant(&self, signal: &Flavour, weights: &[(Flavour, f64)]) -> Result<Vec<f64>> {
        let p_sig = self.probs(signal)?;
        let mut denominator = vec![0.0; p_sig.len()];
        for (flavour, weight) in weights {
            if *weight == 0.0 {
                continue;
            }
            for (d, p) in denominator.iter_mut().zip(self.probs(flavour)?) {
                *d += weight * p;
            }
        }

        Ok(p_sig
            .iter()
            .zip(&denominator)
            .map(|(s, d)| ((s + DISC_EPSILON) / (d + DISC_EPSILON)).ln())
            .collect())
    }
}

/// 單一 signal 的繪圖執行上下文
#[derive(Debug)]
pub struct PlotRun {
    pub signal: Flavour,
    pub backgrounds: Vec<Flavour>,
    pub samples: Vec<TaggerSample>,
    pub output_dir: PathBuf,
}

impl PlotRun {
    /// Signal first, then the backgrounds.
    pub fn flavours(&self) -> Vec<Flavour> {
        std::iter::once(self.signal.clone())
            .chain(self.backgrounds.iter().cloned())
            .collect()
    }

    pub fn flavour(&self, name: &str) -> Option<&Flavour> {
        std::iter::once(&self.signal)
            .chain(self.backgrounds.iter())
            .find(|f| f.name == name)
    }
}
