use crate::config::document::read_document;
use crate::domain::cuts::Cut;
use crate::domain::flavours::FlavourRegistry;
use crate::domain::model::{SamplePath, Tagger};
use crate::utils::error::{PlotError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_required_field};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Colours handed out, in key order, to taggers without an explicit `colour`.
const PALETTE: [(u8, u8, u8); 8] = [
    (31, 119, 180),
    (214, 39, 40),
    (44, 160, 44),
    (148, 103, 189),
    (255, 127, 14),
    (140, 86, 75),
    (227, 119, 194),
    (23, 190, 207),
];

/// 單一 tagger 的設定項目 (所有欄位皆可由 tagger_defaults 提供)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaggerEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_path: Option<SamplePath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuts: Option<Vec<Cut>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fxs: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
}

impl TaggerEntry {
    /// Fields set on `self` win; `fxs` maps are merged key by key.
    pub fn merged_over(&self, defaults: &TaggerEntry) -> TaggerEntry {
        let fxs = match (&defaults.fxs, &self.fxs) {
            (Some(base), Some(own)) => {
                let mut merged = base.clone();
                merged.extend(own.iter().map(|(k, v)| (k.clone(), *v)));
                Some(merged)
            }
            (base, own) => own.clone().or_else(|| base.clone()),
        };

        TaggerEntry {
            name: self.name.clone().or_else(|| defaults.name.clone()),
            label: self.label.clone().or_else(|| defaults.label.clone()),
            sample_path: self
                .sample_path
                .clone()
                .or_else(|| defaults.sample_path.clone()),
            cuts: self.cuts.clone().or_else(|| defaults.cuts.clone()),
            fxs,
            colour: self.colour.clone().or_else(|| defaults.colour.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaggerConfigDocument {
    #[serde(default)]
    pub tagger_defaults: TaggerEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taggers: Option<BTreeMap<String, TaggerEntry>>,
}

/// 已合併預設值並驗證的 tagger 設定
#[derive(Debug, Clone, PartialEq)]
pub struct TaggerConfig {
    taggers: BTreeMap<String, Tagger>,
}

impl TaggerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P, registry: &FlavourRegistry) -> Result<Self> {
        let path = path.as_ref();
        let document: TaggerConfigDocument = read_document(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let config = Self::from_document(document, base_dir, registry)?;
        tracing::debug!(
            "Loaded {} tagger(s) from {}",
            config.taggers.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn from_document(
        document: TaggerConfigDocument,
        base_dir: &Path,
        registry: &FlavourRegistry,
    ) -> Result<Self> {
        let entries = validate_required_field("taggers", &document.taggers)?;
        if entries.is_empty() {
            return Err(PlotError::config("taggers", "No taggers are defined"));
        }

        let mut taggers = BTreeMap::new();
        for (index, (key, entry)) in entries.iter().enumerate() {
            let merged = entry.merged_over(&document.tagger_defaults);
            let tagger = resolve_entry(key, merged, index, base_dir, registry)?;
            taggers.insert(key.clone(), tagger);
        }

        Ok(Self { taggers })
    }

    pub fn get(&self, key: &str) -> Option<&Tagger> {
        self.taggers.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.taggers.keys().map(String::as_str)
    }

    /// Taggers to plot: `subset` in its own order, or every tagger in key order.
    pub fn select(&self, subset: Option<&[String]>) -> Result<Vec<&Tagger>> {
        match subset {
            None => Ok(self.taggers.values().collect()),
            Some(keys) => keys
                .iter()
                .map(|key| {
                    self.taggers.get(key).ok_or_else(|| {
                        PlotError::config(
                            "taggers",
                            format!(
                                "Tagger '{}' is not defined in the tagger configuration (known: {})",
                                key,
                                self.keys().collect::<Vec<_>>().join(", ")
                            ),
                        )
                    })
                })
                .collect(),
        }
    }
}

fn resolve_entry(
    key: &str,
    entry: TaggerEntry,
    index: usize,
    base_dir: &Path,
    registry: &FlavourRegistry,
) -> Result<Tagger> {
    let field = format!("taggers.{}", key);

    let sample_path = validate_required_field(&format!("{}.sample_path", field), &entry.sample_path)?
        .clone()
        .rebased(base_dir);

    if let Some(name) = &entry.name {
        validate_non_empty_string(&format!("{}.name", field), name)?;
    }

    let fxs = entry.fxs.unwrap_or_default();
    for (flavour, fraction) in &fxs {
        registry.lookup(&format!("{}.fxs", field), flavour)?;
        validate_range(&format!("{}.fxs.{}", field, flavour), *fraction, 0.0, 1.0)?;
    }

    let colour = match &entry.colour {
        Some(hex) => parse_colour(&format!("{}.colour", field), hex)?,
        None => PALETTE[index % PALETTE.len()],
    };

    Ok(Tagger {
        key: key.to_string(),
        name: entry.name,
        label: entry.label.unwrap_or_else(|| key.to_string()),
        sample_path,
        cuts: entry.cuts.unwrap_or_default(),
        fxs,
        colour,
    })
}

fn parse_colour(field: &str, hex: &str) -> Result<(u8, u8, u8)> {
    let invalid = || PlotError::config(field, format!("'{}' is not a #rrggbb colour", hex));
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}
