use crate::config::document::{read_document, to_document_string, DocumentFormat};
use crate::domain::flavours::{Flavour, FlavourRegistry};
use crate::utils::error::{PlotError, Result};
use crate::utils::validation::{
    validate_bin_edges, validate_file_stem, validate_non_empty_string, validate_path,
    validate_positive_number, validate_required_field, validate_working_point, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

fn default_bins() -> usize {
    50
}

fn default_roc_range() -> (f64, f64) {
    (0.5, 1.0)
}

fn default_roc_points() -> usize {
    50
}

fn default_scan_points() -> usize {
    21
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocArgs {
    /// Signal-efficiency range of the x axis.
    #[serde(default = "default_roc_range")]
    pub x_range: (f64, f64),
    #[serde(default = "default_roc_points")]
    pub n_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscArgs {
    #[serde(default = "default_bins")]
    pub bins: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub log_y: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbsArgs {
    /// Flavour whose probability column is histogrammed; the signal when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavour: Option<String>,
    #[serde(default = "default_bins")]
    pub bins: usize,
    #[serde(default, skip_serializing_if = "is_false")]
    pub log_y: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffVsVarArgs {
    pub var: String,
    pub bins: Vec<f64>,
    pub working_point: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavour: Option<String>,
    /// Place the cut per bin so that every bin has the working-point efficiency.
    #[serde(default, skip_serializing_if = "is_false")]
    pub fixed_eff_bin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractionScanArgs {
    pub working_point: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backgrounds: Option<(String, String)>,
    #[serde(default = "default_scan_points")]
    pub n_points: usize,
}

/// 圖表種類與其參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotKind {
    Roc(RocArgs),
    Disc(DiscArgs),
    Probs(ProbsArgs),
    EffVsVar(EffVsVarArgs),
    FractionScan(FractionScanArgs),
}

/// Plot kinds without their arguments, used to filter what gets rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "cli",
    derive(clap::ValueEnum),
    value(rename_all = "snake_case")
)]
pub enum PlotCategory {
    Roc,
    Disc,
    Probs,
    EffVsVar,
    FractionScan,
}

fn wp_tag(working_point: f64) -> String {
    format!("wp{}", (working_point * 100.0).round() as i64)
}

impl PlotKind {
    pub fn category(&self) -> PlotCategory {
        match self {
            PlotKind::Roc(_) => PlotCategory::Roc,
            PlotKind::Disc(_) => PlotCategory::Disc,
            PlotKind::Probs(_) => PlotCategory::Probs,
            PlotKind::EffVsVar(_) => PlotCategory::EffVsVar,
            PlotKind::FractionScan(_) => PlotCategory::FractionScan,
        }
    }

    /// Output name used when the plot entry has no `name`. Expects a
    /// normalised kind (flavour arguments filled in).
    pub fn default_name(&self) -> String {
        match self {
            PlotKind::Roc(_) => "roc".to_string(),
            PlotKind::Disc(_) => "disc".to_string(),
            PlotKind::Probs(args) => {
                format!("probs_{}", args.flavour.as_deref().unwrap_or("signal"))
            }
            PlotKind::EffVsVar(args) => format!(
                "{}_{}_{}{}",
                args.var,
                args.flavour.as_deref().unwrap_or("signal"),
                wp_tag(args.working_point),
                if args.fixed_eff_bin { "_flat" } else { "" }
            ),
            PlotKind::FractionScan(args) => {
                format!("fraction_scan_{}", wp_tag(args.working_point))
            }
        }
    }

    /// Validates the arguments and fills in flavour defaults for `signal`.
    fn normalized(self, field: &str, signal: &Flavour, backgrounds: &[Flavour]) -> Result<Self> {
        let check_flavour = |key: &str, name: &str| -> Result<()> {
            if name == signal.name || backgrounds.iter().any(|b| b.name == name) {
                Ok(())
            } else {
                Err(PlotError::config(
                    format!("{}.{}", field, key),
                    format!(
                        "Flavour '{}' is neither the signal '{}' nor one of its backgrounds",
                        name, signal.name
                    ),
                ))
            }
        };

        match self {
            PlotKind::Roc(args) => {
                let (lo, hi) = args.x_range;
                if !(0.0..1.0).contains(&lo) || !(hi > lo && hi <= 1.0) {
                    return Err(PlotError::config(
                        format!("{}.x_range", field),
                        format!("Invalid efficiency range [{}, {}]", lo, hi),
                    ));
                }
                validate_positive_number(&format!("{}.n_points", field), args.n_points, 2)?;
                Ok(PlotKind::Roc(args))
            }
            PlotKind::Disc(args) => {
                validate_positive_number(&format!("{}.bins", field), args.bins, 1)?;
                if let Some((lo, hi)) = args.range {
                    validate_bin_edges(&format!("{}.range", field), &[lo, hi])?;
                }
                Ok(PlotKind::Disc(args))
            }
            PlotKind::Probs(mut args) => {
                validate_positive_number(&format!("{}.bins", field), args.bins, 1)?;
                let flavour = args.flavour.take().unwrap_or_else(|| signal.name.clone());
                check_flavour("flavour", &flavour)?;
                args.flavour = Some(flavour);
                Ok(PlotKind::Probs(args))
            }
            PlotKind::EffVsVar(mut args) => {
                validate_non_empty_string(&format!("{}.var", field), &args.var)?;
                validate_bin_edges(&format!("{}.bins", field), &args.bins)?;
                validate_working_point(&format!("{}.working_point", field), args.working_point)?;
                let flavour = args.flavour.take().unwrap_or_else(|| signal.name.clone());
                check_flavour("flavour", &flavour)?;
                args.flavour = Some(flavour);
                Ok(PlotKind::EffVsVar(args))
            }
            PlotKind::FractionScan(mut args) => {
                validate_working_point(&format!("{}.working_point", field), args.working_point)?;
                validate_positive_number(&format!("{}.n_points", field), args.n_points, 2)?;
                let pair = match args.backgrounds.take() {
                    Some(pair) => pair,
                    None => match backgrounds {
                        [first, second, ..] => (first.name.clone(), second.name.clone()),
                        _ => {
                            return Err(PlotError::config(
                                format!("{}.backgrounds", field),
                                "A fraction scan needs two backgrounds",
                            ))
                        }
                    },
                };
                for name in [&pair.0, &pair.1] {
                    if name == &signal.name {
                        return Err(PlotError::config(
                            format!("{}.backgrounds", field),
                            format!("'{}' is the signal, not a background", name),
                        ));
                    }
                    check_flavour("backgrounds", name)?;
                }
                if pair.0 == pair.1 {
                    return Err(PlotError::config(
                        format!("{}.backgrounds", field),
                        "The two scanned backgrounds must differ",
                    ));
                }
                args.backgrounds = Some(pair);
                Ok(PlotKind::FractionScan(args))
            }
        }
    }
}

/// 一張圖的設定：輸出名稱 + 種類
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpecDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: PlotKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDocument {
    pub signal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backgrounds: Option<Vec<String>>,
    #[serde(default)]
    pub plots: Vec<PlotSpecDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotStyle {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Extra line appended to every plot title, e.g. the sample description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            subtitle: None,
        }
    }
}

impl Validate for PlotStyle {
    fn validate(&self) -> Result<()> {
        validate_positive_number("style.width", self.width as usize, 100)?;
        validate_positive_number("style.height", self.height as usize, 100)?;
        Ok(())
    }
}

/// Plot document as written on disk. Every key is optional here so that a
/// missing one is reported by name during validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taggers_config: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taggers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<PlotStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<Vec<SignalDocument>>,
}

/// Validated plot specification; `name` is the output file stem.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub name: String,
    pub kind: PlotKind,
}

/// 單一 signal 的圖表宣告
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPlots {
    pub signal: Flavour,
    pub backgrounds: Vec<Flavour>,
    pub plots: Vec<PlotSpec>,
}

impl SignalPlots {
    /// Flavours a tagger must cover to be plotted for this signal.
    pub fn flavours(&self) -> Vec<Flavour> {
        std::iter::once(self.signal.clone())
            .chain(self.backgrounds.iter().cloned())
            .collect()
    }
}

/// 已驗證的繪圖設定
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    /// File stem of the plot document; names the output subdirectory.
    pub config_name: String,
    /// Directory of the plot document, used to resolve `taggers_config`.
    pub base_dir: PathBuf,
    pub plot_dir: PathBuf,
    pub taggers_config: PathBuf,
    pub taggers: Option<Vec<String>>,
    pub style: PlotStyle,
    pub signals: Vec<SignalPlots>,
}

impl PlotConfig {
    /// 從檔案載入並驗證設定
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_config_with_registry(path, &FlavourRegistry::default())
    }

    pub fn load_config_with_registry<P: AsRef<Path>>(
        path: P,
        registry: &FlavourRegistry,
    ) -> Result<Self> {
        let path = path.as_ref();
        let document: PlotConfigDocument = read_document(path)?;
        let config_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("plots")
            .to_string();
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let config = Self::from_document(document, config_name, base_dir, registry)?;
        tracing::debug!(
            "Loaded plot config '{}' with {} signal(s)",
            config.config_name,
            config.signals.len()
        );
        Ok(config)
    }

    /// 單一步驟：解析後的文件 -> 驗證過的設定
    pub fn from_document(
        document: PlotConfigDocument,
        config_name: String,
        base_dir: PathBuf,
        registry: &FlavourRegistry,
    ) -> Result<Self> {
        let plot_dir = validate_required_field("plot_dir", &document.plot_dir)?.clone();
        validate_path("plot_dir", &plot_dir)?;
        let taggers_config =
            validate_required_field("taggers_config", &document.taggers_config)?.clone();
        validate_path("taggers_config", &taggers_config)?;
        let signal_docs = validate_required_field("signals", &document.signals)?;
        if signal_docs.is_empty() {
            return Err(PlotError::config(
                "signals",
                "At least one signal flavour must be declared",
            ));
        }

        if let Some(taggers) = &document.taggers {
            for (i, key) in taggers.iter().enumerate() {
                validate_non_empty_string(&format!("taggers[{}]", i), key)?;
            }
        }

        let style = document.style.clone().unwrap_or_default();
        style.validate()?;

        let mut seen = HashSet::new();
        let mut signals = Vec::with_capacity(signal_docs.len());
        for (i, doc) in signal_docs.iter().enumerate() {
            let plots = normalize_signal(i, doc, registry)?;
            if !seen.insert(plots.signal.name.clone()) {
                return Err(PlotError::config(
                    format!("signals[{}].signal", i),
                    format!("Signal '{}' is declared more than once", plots.signal.name),
                ));
            }
            signals.push(plots);
        }

        Ok(Self {
            config_name,
            base_dir,
            plot_dir,
            taggers_config,
            taggers: document.taggers,
            style,
            signals,
        })
    }

    pub fn taggers_config_path(&self) -> PathBuf {
        if self.taggers_config.is_relative() {
            self.base_dir.join(&self.taggers_config)
        } else {
            self.taggers_config.clone()
        }
    }

    /// `<plot_dir>/<config name>`
    pub fn output_root(&self) -> PathBuf {
        self.plot_dir.join(&self.config_name)
    }

    pub fn declared_signals(&self) -> BTreeSet<Flavour> {
        self.signals.iter().map(|s| s.signal.clone()).collect()
    }

    pub fn signal(&self, name: &str) -> Option<&SignalPlots> {
        self.signals.iter().find(|s| s.signal.name == name)
    }

    /// Normalised document: every default filled in, every plot named.
    pub fn to_document(&self) -> PlotConfigDocument {
        PlotConfigDocument {
            plot_dir: Some(self.plot_dir.clone()),
            taggers_config: Some(self.taggers_config.clone()),
            taggers: self.taggers.clone(),
            style: Some(self.style.clone()),
            signals: Some(
                self.signals
                    .iter()
                    .map(|s| SignalDocument {
                        signal: s.signal.name.clone(),
                        backgrounds: Some(s.backgrounds.iter().map(|b| b.name.clone()).collect()),
                        plots: s
                            .plots
                            .iter()
                            .map(|p| PlotSpecDocument {
                                name: Some(p.name.clone()),
                                kind: p.kind.clone(),
                            })
                            .collect(),
                    })
                    .collect(),
            ),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        to_document_string(&self.to_document(), DocumentFormat::Yaml)
    }
}

fn normalize_signal(
    index: usize,
    doc: &SignalDocument,
    registry: &FlavourRegistry,
) -> Result<SignalPlots> {
    let field = format!("signals[{}]", index);
    let signal = registry
        .lookup(&format!("{}.signal", field), &doc.signal)?
        .clone();

    let backgrounds = match &doc.backgrounds {
        Some(names) => {
            let mut backgrounds: Vec<Flavour> = Vec::with_capacity(names.len());
            for name in names {
                let flavour = registry.lookup(&format!("{}.backgrounds", field), name)?;
                if flavour.name == signal.name || backgrounds.contains(flavour) {
                    return Err(PlotError::config(
                        format!("{}.backgrounds", field),
                        format!("'{}' is the signal or listed twice", name),
                    ));
                }
                backgrounds.push(flavour.clone());
            }
            backgrounds
        }
        None => registry.default_backgrounds(&signal),
    };
    if backgrounds.is_empty() {
        return Err(PlotError::config(
            format!("{}.backgrounds", field),
            format!("Signal '{}' has no background flavours", signal.name),
        ));
    }

    let mut names = HashSet::new();
    let mut plots = Vec::with_capacity(doc.plots.len());
    for (j, spec) in doc.plots.iter().enumerate() {
        let plot_field = format!("{}.plots[{}]", field, j);
        let kind = spec.kind.clone().normalized(&plot_field, &signal, &backgrounds)?;
        let name = spec.name.clone().unwrap_or_else(|| kind.default_name());
        validate_file_stem(&format!("{}.name", plot_field), &name)?;
        if !names.insert(name.clone()) {
            return Err(PlotError::config(
                format!("{}.name", plot_field),
                format!(
                    "Plot name '{}' is used twice for signal '{}'; set an explicit `name`",
                    name, signal.name
                ),
            ));
        }
        plots.push(PlotSpec { name, kind });
    }

    Ok(SignalPlots {
        signal,
        backgrounds,
        plots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::document::parse_document;

    fn load_str(content: &str) -> Result<PlotConfig> {
        let document: PlotConfigDocument =
            parse_document(content, DocumentFormat::Yaml, "inline.yaml")?;
        PlotConfig::from_document(
            document,
            "inline".to_string(),
            PathBuf::from("/configs"),
            &FlavourRegistry::default(),
        )
    }

    const BASIC: &str = r#"
plot_dir: plots
taggers_config: taggers.yaml
signals:
  - signal: bjets
    plots:
      - kind: roc
      - kind: probs
        flavour: ujets
      - kind: eff_vs_var
        var: pt
        bins: [20, 50, 100, 250]
        working_point: 0.7
        fixed_eff_bin: true
      - kind: fraction_scan
        working_point: 0.77
  - signal: cjets
    backgrounds: [bjets, ujets]
    plots:
      - kind: disc
        name: ctag_disc
"#;

    #[test]
    fn test_parse_basic_plot_config() {
        let config = load_str(BASIC).unwrap();

        assert_eq!(config.signals.len(), 2);
        assert_eq!(config.taggers_config_path(), PathBuf::from("/configs/taggers.yaml"));
        assert_eq!(config.output_root(), PathBuf::from("plots/inline"));

        let bjets = config.signal("bjets").unwrap();
        let names: Vec<&str> = bjets.plots.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["roc", "probs_ujets", "pt_bjets_wp70_flat", "fraction_scan_wp77"]
        );
        let backgrounds: Vec<&str> = bjets.backgrounds.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(backgrounds, vec!["cjets", "ujets"]);

        match &bjets.plots[3].kind {
            PlotKind::FractionScan(args) => assert_eq!(
                args.backgrounds,
                Some(("cjets".to_string(), "ujets".to_string()))
            ),
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(config.signal("cjets").unwrap().plots[0].name, "ctag_disc");
    }

    #[test]
    fn test_missing_required_keys() {
        let err = load_str("taggers_config: t.yaml\nsignals: []").unwrap_err();
        assert!(matches!(err, PlotError::ConfigValidationError { ref field, .. } if field == "plot_dir"));

        let err = load_str("plot_dir: p\nsignals: []").unwrap_err();
        assert!(matches!(err, PlotError::ConfigValidationError { ref field, .. } if field == "taggers_config"));

        let err = load_str("plot_dir: p\ntaggers_config: t.yaml").unwrap_err();
        assert!(matches!(err, PlotError::ConfigValidationError { ref field, .. } if field == "signals"));
    }

    #[test]
    fn test_unknown_flavour_is_rejected() {
        let err = load_str(
            "plot_dir: p\ntaggers_config: t.yaml\nsignals:\n  - signal: gluons\n    plots: []\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("gluons"));
        assert!(err.to_string().contains("signals[0].signal"));
    }

    #[test]
    fn test_plot_flavour_outside_signal_set() {
        let err = load_str(
            r#"
plot_dir: p
taggers_config: t.yaml
signals:
  - signal: bjets
    plots:
      - kind: probs
        flavour: taujets
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("signals[0].plots[0].flavour"));
    }

    #[test]
    fn test_duplicate_plot_names() {
        let err = load_str(
            r#"
plot_dir: p
taggers_config: t.yaml
signals:
  - signal: bjets
    plots:
      - kind: roc
      - kind: roc
        x_range: [0.6, 1.0]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("used twice"));
    }

    #[test]
    fn test_duplicate_signal() {
        let err = load_str(
            "plot_dir: p\ntaggers_config: t.yaml\nsignals:\n  - signal: bjets\n  - signal: bjets\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_invalid_working_point() {
        let err = load_str(
            r#"
plot_dir: p
taggers_config: t.yaml
signals:
  - signal: bjets
    plots:
      - kind: fraction_scan
        working_point: 1.2
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("working_point"));
    }

    #[test]
    fn test_unknown_plot_kind_fails_parsing() {
        let err = load_str(
            "plot_dir: p\ntaggers_config: t.yaml\nsignals:\n  - signal: bjets\n    plots:\n      - kind: pie\n",
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_normalized_document_round_trip() {
        let config = load_str(BASIC).unwrap();
        let yaml = config.to_yaml_string().unwrap();
        let reloaded = load_str(&yaml).unwrap();
        assert_eq!(config, reloaded);
    }
}
