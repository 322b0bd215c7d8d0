use crate::adapters::sample::{SampleReader, SampleRequest};
use crate::adapters::storage::LocalStorage;
use crate::config::plot_config::{PlotCategory, PlotConfig, PlotKind, PlotSpec, SignalPlots};
use crate::config::tagger_config::TaggerConfig;
use crate::core::{resolver, signals};
use crate::domain::flavours::FlavourRegistry;
use crate::domain::model::{PlotRun, Tagger, TaggerSample};
use crate::domain::ports::PlotRenderer;
use crate::utils::error::{PlotError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// 執行選項 (通常來自命令列)
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Maximum number of jets read per tagger sample, after cuts.
    pub num_jets: usize,
    /// Sample label used to pick a tagger's sample path.
    pub sample: String,
    /// Only render these plot kinds; everything when `None`.
    pub plot_kinds: Option<Vec<PlotCategory>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            num_jets: 1_000_000,
            sample: "ttbar".to_string(),
            plot_kinds: None,
        }
    }
}

impl Validate for RunOptions {
    fn validate(&self) -> Result<()> {
        validate_positive_number("num_jets", self.num_jets, 1)?;
        validate_non_empty_string("sample", &self.sample)?;
        Ok(())
    }
}

/// Files written (or planned) for one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalOutput {
    pub signal: String,
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub signals: Vec<SignalOutput>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn total_plots(&self) -> usize {
        self.signals.iter().map(|s| s.files.len()).sum()
    }
}

/// 依 signal 逐一載入樣本、辨識 tagger、繪圖並輸出
pub struct PlotOrchestrator<R: PlotRenderer> {
    renderer: R,
    registry: FlavourRegistry,
    options: RunOptions,
}

impl<R: PlotRenderer> PlotOrchestrator<R> {
    pub fn new(renderer: R, options: RunOptions) -> Self {
        Self::with_registry(renderer, FlavourRegistry::default(), options)
    }

    pub fn with_registry(renderer: R, registry: FlavourRegistry, options: RunOptions) -> Self {
        Self {
            renderer,
            registry,
            options,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    fn selected_plots<'a>(&self, signal: &'a SignalPlots) -> Vec<&'a PlotSpec> {
        signal
            .plots
            .iter()
            .filter(|spec| match &self.options.plot_kinds {
                Some(kinds) => kinds.contains(&spec.kind.category()),
                None => true,
            })
            .collect()
    }

    /// Output paths per selected signal, without touching the filesystem.
    pub fn plan<S: AsRef<str>>(&self, config: &PlotConfig, requested: &[S]) -> Vec<SignalOutput> {
        let selected = signals::resolve(requested, config);
        let storage = LocalStorage::new(config.output_root());

        config
            .signals
            .iter()
            .filter(|s| selected.contains(&s.signal))
            .map(|s| SignalOutput {
                signal: s.signal.name.clone(),
                output_dir: storage.signal_dir(&s.signal.name),
                files: self
                    .selected_plots(s)
                    .iter()
                    .map(|spec| {
                        storage.plot_path(&s.signal.name, &spec.name, self.renderer.extension())
                    })
                    .collect(),
            })
            .collect()
    }

    /// Runs one pass per selected signal, in declaration order. The first
    /// failure aborts the whole invocation.
    pub fn run<S: AsRef<str>>(&self, config: &PlotConfig, requested: &[S]) -> Result<RunSummary> {
        self.options.validate()?;
        let start = Instant::now();
        let mut summary = RunSummary::default();

        let selected = signals::resolve(requested, config);
        if selected.is_empty() {
            tracing::warn!("⚠️ No declared signal matches the request, nothing to plot");
            return Ok(summary);
        }

        let taggers_path = config.taggers_config_path();
        tracing::info!("📁 Loading taggers from: {}", taggers_path.display());
        let tagger_config = TaggerConfig::from_file(&taggers_path, &self.registry)?;
        let taggers = tagger_config.select(config.taggers.as_deref())?;

        let storage = LocalStorage::new(config.output_root());
        for signal_plots in config.signals.iter().filter(|s| selected.contains(&s.signal)) {
            let output = self.run_signal(signal_plots, &taggers, &storage)?;
            summary.signals.push(output);
        }

        summary.duration = start.elapsed();
        tracing::info!(
            "✅ Wrote {} plot(s) for {} signal(s) in {:.2?}",
            summary.total_plots(),
            summary.signals.len(),
            summary.duration
        );
        Ok(summary)
    }

    fn run_signal(
        &self,
        signal_plots: &SignalPlots,
        taggers: &[&Tagger],
        storage: &LocalStorage,
    ) -> Result<SignalOutput> {
        let signal = &signal_plots.signal;
        let plots = self.selected_plots(signal_plots);
        tracing::info!(
            "🎯 Signal '{}': {} plot(s), {} tagger(s)",
            signal.name,
            plots.len(),
            taggers.len()
        );

        // Load + identify
        let samples = taggers
            .iter()
            .map(|tagger| self.load_tagger(tagger, signal_plots, &plots))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            "Loaded {} jet(s) over {} sample(s) for '{}'",
            samples.iter().map(TaggerSample::n_jets).sum::<usize>(),
            samples.len(),
            signal.name
        );

        // Persist
        let output_dir = storage.prepare_signal_dir(&signal.name)?;
        let run = PlotRun {
            signal: signal.clone(),
            backgrounds: signal_plots.backgrounds.clone(),
            samples,
            output_dir: output_dir.clone(),
        };

        // Render
        let mut files = Vec::with_capacity(plots.len());
        for spec in plots {
            let path = storage.plot_path(&signal.name, &spec.name, self.renderer.extension());
            tracing::debug!("Rendering {}", path.display());
            self.renderer.render(&run, spec, &path)?;
            files.push(path);
        }

        tracing::info!("📊 {} plot(s) written to {}", files.len(), output_dir.display());
        Ok(SignalOutput {
            signal: signal.name.clone(),
            output_dir,
            files,
        })
    }

    fn load_tagger(
        &self,
        tagger: &Tagger,
        signal_plots: &SignalPlots,
        plots: &[&PlotSpec],
    ) -> Result<TaggerSample> {
        let path = tagger
            .sample_path
            .for_sample(&self.options.sample)
            .ok_or_else(|| {
                PlotError::config(
                    format!("taggers.{}.sample_path", tagger.key),
                    format!("No sample path for sample '{}'", self.options.sample),
                )
            })?;

        let reader = SampleReader::open(path)?;
        let flavours = signal_plots.flavours();
        let identity = resolver::identify(
            tagger.name.as_deref(),
            &path.display().to_string(),
            reader.columns(),
            &flavours,
        )?;

        let mut columns: Vec<String> = flavours
            .iter()
            .map(|f| f.prob_column(identity.as_str()))
            .collect();
        for spec in plots {
            if let PlotKind::EffVsVar(args) = &spec.kind {
                if !columns.contains(&args.var) {
                    columns.push(args.var.clone());
                }
            }
        }

        let data = reader.read(&SampleRequest {
            label_var: self.registry.label_var(),
            columns: &columns,
            cuts: &tagger.cuts,
            max_jets: self.options.num_jets,
        })?;
        if data.labels.is_empty() {
            tracing::warn!(
                "⚠️ No jets of tagger '{}' passed the cuts in {}",
                tagger.key,
                path.display()
            );
        }
        tracing::info!(
            "🔍 Tagger '{}' ({}) with {} jet(s) from {}",
            tagger.key,
            identity,
            data.labels.len(),
            path.display()
        );

        Ok(TaggerSample {
            tagger: tagger.clone(),
            identity,
            source: path.to_path_buf(),
            labels: data.labels,
            columns: data.columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    /// Records every render call and writes an empty file.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: RefCell<Vec<(String, String)>>,
    }

    impl PlotRenderer for RecordingRenderer {
        fn extension(&self) -> &str {
            "txt"
        }

        fn render(&self, run: &PlotRun, spec: &PlotSpec, output: &Path) -> Result<()> {
            self.calls
                .borrow_mut()
                .push((run.signal.name.clone(), spec.name.clone()));
            std::fs::write(output, b"")?;
            Ok(())
        }
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const SAMPLE: &str = "pt,HadronConeExclTruthLabelID,MockTagger_pu,MockTagger_pc,MockTagger_pb\n\
                          30,5,0.1,0.1,0.8\n\
                          40,4,0.2,0.6,0.2\n\
                          50,0,0.7,0.2,0.1\n";

    fn setup(dir: &Path) -> PlotConfig {
        write(dir, "sample.csv", SAMPLE);
        write(
            dir,
            "taggers.yaml",
            "tagger_defaults:\n  sample_path: sample.csv\ntaggers:\n  dummy1:\n    label: Dummy\n",
        );
        let config_path = write(
            dir,
            "plt_cfg.yaml",
            &format!(
                r#"
plot_dir: {}
taggers_config: taggers.yaml
signals:
  - signal: bjets
    plots:
      - kind: roc
      - kind: disc
      - kind: eff_vs_var
        var: pt
        bins: [20, 45, 60]
        working_point: 0.7
  - signal: cjets
    plots:
      - kind: roc
"#,
                dir.join("plots").display()
            ),
        );
        PlotConfig::load_config(config_path).unwrap()
    }

    #[test]
    fn test_plan_lists_paths_without_creating_them() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = setup(temp.path());
        let orchestrator = PlotOrchestrator::new(RecordingRenderer::default(), RunOptions::default());

        let plan = orchestrator.plan(&config, &["bjets"]);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].files.len(), 3);
        assert!(plan[0].files[0].ends_with("plt_cfg/bjets_tagging/roc.txt"));
        assert!(!temp.path().join("plots").exists());
    }

    #[test]
    fn test_run_renders_only_requested_signal() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = setup(temp.path());
        let orchestrator = PlotOrchestrator::new(RecordingRenderer::default(), RunOptions::default());

        let summary = orchestrator.run(&config, &["bjets"]).unwrap();
        assert_eq!(summary.total_plots(), 3);
        let calls = orchestrator.renderer().calls.borrow();
        assert!(calls.iter().all(|(signal, _)| signal == "bjets"));
        assert!(!config.output_root().join("cjets_tagging").exists());
    }

    #[test]
    fn test_plot_kind_filter() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = setup(temp.path());
        let options = RunOptions {
            plot_kinds: Some(vec![PlotCategory::Roc]),
            ..RunOptions::default()
        };
        let orchestrator = PlotOrchestrator::new(RecordingRenderer::default(), options);

        let summary = orchestrator.run(&config, &Vec::<String>::new()).unwrap();
        assert_eq!(summary.signals.len(), 2);
        assert_eq!(summary.total_plots(), 2);
    }

    #[test]
    fn test_unknown_sample_label_is_config_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = setup(temp.path());
        write(
            temp.path(),
            "taggers.yaml",
            "taggers:\n  dummy1:\n    sample_path: {zprime: sample.csv}\n",
        );
        let orchestrator = PlotOrchestrator::new(RecordingRenderer::default(), RunOptions::default());

        let err = orchestrator.run(&config, &["bjets"]).unwrap_err();
        assert!(err.to_string().contains("taggers.dummy1.sample_path"));
        assert!(!config.output_root().join("bjets_tagging").exists());
    }

    #[test]
    fn test_empty_selection_is_a_no_op() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = setup(temp.path());
        let orchestrator = PlotOrchestrator::new(RecordingRenderer::default(), RunOptions::default());

        let summary = orchestrator.run(&config, &["ujets"]).unwrap();
        assert!(summary.signals.is_empty());
        assert!(!config.plot_dir.exists());
    }

    #[test]
    fn test_run_options_validation() {
        assert!(RunOptions::default().validate().is_ok());
        let bad = RunOptions {
            num_jets: 0,
            ..RunOptions::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_run_rejects_zero_jets_before_writing() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = setup(temp.path());
        let options = RunOptions {
            num_jets: 0,
            ..RunOptions::default()
        };
        let orchestrator = PlotOrchestrator::new(RecordingRenderer::default(), options);

        let err = orchestrator.run(&config, &["bjets"]).unwrap_err();
        assert!(matches!(err, PlotError::ConfigValidationError { ref field, .. } if field == "num_jets"));
        assert!(orchestrator.renderer().calls.borrow().is_empty());
        assert!(!config.plot_dir.exists());
    }
}
