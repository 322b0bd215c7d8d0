use crate::utils::error::{PlotError, Result};
use std::fmt;

/// Truth-label column shared by every sample.
pub const DEFAULT_LABEL_VAR: &str = "HadronConeExclTruthLabelID";

/// 一種噴注味道 (flavour)，例如 b-jets
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Flavour {
    pub name: String,
    /// Suffix appended to a tagger name to form its probability column, e.g. `_pb`.
    pub prob_suffix: String,
    pub label: String,
    /// Value of the truth-label column that selects jets of this flavour.
    pub label_value: i64,
    pub colour: (u8, u8, u8),
    pub default_background: bool,
}

impl Flavour {
    pub fn new(
        name: &str,
        prob_suffix: &str,
        label: &str,
        label_value: i64,
        colour: (u8, u8, u8),
        default_background: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            prob_suffix: prob_suffix.to_string(),
            label: label.to_string(),
            label_value,
            colour,
            default_background,
        }
    }

    /// Probability column of this flavour for the given tagger.
    pub fn prob_column(&self, tagger: &str) -> String {
        format!("{}{}", tagger, self.prob_suffix)
    }
}

impl fmt::Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Flavour name -> flavour definition.
#[derive(Debug, Clone)]
pub struct FlavourRegistry {
    label_var: String,
    flavours: Vec<Flavour>,
}

impl Default for FlavourRegistry {
    fn default() -> Self {
        Self::new(
            DEFAULT_LABEL_VAR,
            vec![
                Flavour::new("bjets", "_pb", "b-jets", 5, (31, 119, 180), true),
                Flavour::new("cjets", "_pc", "c-jets", 4, (255, 127, 14), true),
                Flavour::new("ujets", "_pu", "light-jets", 0, (44, 160, 44), true),
                Flavour::new("taujets", "_ptau", "tau-jets", 15, (127, 127, 127), false),
            ],
        )
    }
}

impl FlavourRegistry {
    pub fn new(label_var: &str, flavours: Vec<Flavour>) -> Self {
        Self {
            label_var: label_var.to_string(),
            flavours,
        }
    }

    pub fn label_var(&self) -> &str {
        &self.label_var
    }

    pub fn flavours(&self) -> &[Flavour] {
        &self.flavours
    }

    pub fn get(&self, name: &str) -> Option<&Flavour> {
        self.flavours.iter().find(|f| f.name == name)
    }

    /// Like [`get`](Self::get), but an unknown name is a configuration error on `field`.
    pub fn lookup(&self, field: &str, name: &str) -> Result<&Flavour> {
        self.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.flavours.iter().map(|f| f.name.as_str()).collect();
            PlotError::config(
                field,
                format!("Unknown flavour '{}'. Known flavours: {}", name, known.join(", ")),
            )
        })
    }

    pub fn default_backgrounds(&self, signal: &Flavour) -> Vec<Flavour> {
        self.flavours
            .iter()
            .filter(|f| f.default_background && f.name != signal.name)
            .cloned()
            .collect()
    }
}
