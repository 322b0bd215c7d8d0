use anyhow::Result;
use ftag_plots::utils::mock::{write_mock_file, MOCK_TAGGER};
use ftag_plots::{PlotConfig, PlotError, PlotOrchestrator, RunOptions, SvgRenderer};
use serde_yaml_ng::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn read_demo(name: &str) -> Result<Value> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name);
    Ok(serde_yaml_ng::from_str(&std::fs::read_to_string(path)?)?)
}

fn path_value(path: &Path) -> Value {
    Value::String(path.display().to_string())
}

fn count_files(dir: &Path) -> Result<usize> {
    Ok(std::fs::read_dir(dir)?.count())
}

/// 把範例設定改寫到暫存目錄：兩個 mock 樣本 + 新的 plot_dir
fn setup(dir: &Path, default_taggers: &[&str]) -> Result<PathBuf> {
    let file1 = dir.join("file1.csv");
    let file2 = dir.join("file2.csv");
    write_mock_file(&file1, 2000, 1, default_taggers)?;
    write_mock_file(&file2, 2000, 2, &[MOCK_TAGGER])?;

    let mut taggers = read_demo("taggers.yaml")?;
    taggers["tagger_defaults"]["sample_path"] = path_value(&file1);
    taggers["taggers"]["dummy3"]["sample_path"] = path_value(&file2);
    let taggers_path = dir.join("taggers.yaml");
    std::fs::write(&taggers_path, serde_yaml_ng::to_string(&taggers)?)?;

    let mut plt_cfg = read_demo("plt_cfg.yaml")?;
    plt_cfg["taggers_config"] = path_value(&taggers_path);
    plt_cfg["plot_dir"] = path_value(&dir.join("plots"));
    let config_path = dir.join("plt_cfg.yaml");
    std::fs::write(&config_path, serde_yaml_ng::to_string(&plt_cfg)?)?;
    Ok(config_path)
}

fn orchestrator() -> PlotOrchestrator<SvgRenderer> {
    let options = RunOptions {
        num_jets: 1000,
        ..RunOptions::default()
    };
    PlotOrchestrator::new(SvgRenderer::default(), options)
}

/// 依序只產生要求的 signal，且不影響其他 signal 的輸出
#[test]
fn test_all_plots_per_requested_signal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = PlotConfig::load_config(setup(temp_dir.path(), &[MOCK_TAGGER])?)?;
    let out_dir = temp_dir.path().join("plots").join("plt_cfg");
    let btagging = out_dir.join("bjets_tagging");
    let ctagging = out_dir.join("cjets_tagging");

    let summary = orchestrator().run(&config, &["bjets"])?;
    assert!(btagging.is_dir(), "no b-tagging plots produced");
    assert!(!ctagging.exists(), "no c-tagging plots expected yet");
    assert_eq!(count_files(&btagging)?, 19);
    assert_eq!(summary.total_plots(), 19);
    assert!(summary.signals[0].files.iter().all(|f| f.extension().is_some_and(|e| e == "svg")));

    orchestrator().run(&config, &["cjets"])?;
    assert!(ctagging.is_dir(), "no c-tagging plots produced");
    assert_eq!(count_files(&ctagging)?, 1);
    assert!(ctagging.join("roc.svg").is_file());
    assert_eq!(count_files(&btagging)?, 19);
    Ok(())
}

#[test]
fn test_undeclared_signal_is_skipped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = PlotConfig::load_config(setup(temp_dir.path(), &[MOCK_TAGGER])?)?;

    let summary = orchestrator().run(&config, &["taujets", "cjets"])?;
    assert_eq!(summary.signals.len(), 1);
    assert_eq!(summary.signals[0].signal, "cjets");
    assert!(!config.output_root().join("bjets_tagging").exists());
    Ok(())
}

/// 無法辨識 tagger 時整個執行中止，且不建立輸出目錄
#[test]
fn test_ambiguous_sample_aborts_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = PlotConfig::load_config(setup(temp_dir.path(), &[MOCK_TAGGER, "Tagger2"])?)?;

    let err = orchestrator().run(&config, &Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, PlotError::AmbiguousOrMissingTagger { .. }));
    assert!(!config.output_root().join("bjets_tagging").exists());
    Ok(())
}
