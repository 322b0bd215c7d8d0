use clap::Parser;
use ftag_plots::core::orchestrator::SignalOutput;
use ftag_plots::utils::error::PlotError;
use ftag_plots::utils::{logger, validation::Validate};
use ftag_plots::{get_signals, CliArgs, LogFormat, PlotConfig, PlotOrchestrator, SvgRenderer};

fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    match args.log_format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("🚀 Starting ftag-plots");
    tracing::info!("📁 Loading plot configuration from: {}", args.config);

    // 載入並驗證設定
    let config = match PlotConfig::load_config(&args.config) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    let options = args.to_run_options();
    if let Err(e) = options.validate() {
        fail(&e);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let orchestrator = PlotOrchestrator::new(SvgRenderer::new(config.style.clone()), options);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no sample will be read");
        perform_dry_run(&orchestrator.plan(&config, &args.signals));
        return;
    }

    match orchestrator.run(&config, &args.signals) {
        Ok(summary) => {
            for signal in &summary.signals {
                println!(
                    "📊 {}: {} plot(s) in {}",
                    signal.signal,
                    signal.files.len(),
                    signal.output_dir.display()
                );
            }
            println!(
                "✅ Produced {} plot(s) in {:.2?}",
                summary.total_plots(),
                summary.duration
            );
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &PlotError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Plotting failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    std::process::exit(e.exit_code());
}

fn display_config_summary(config: &PlotConfig, args: &CliArgs) {
    let declared: Vec<String> = get_signals(config).into_iter().map(|f| f.name).collect();

    println!("📋 Configuration Summary:");
    println!("  Config: {}", config.config_name);
    println!("  Taggers: {}", config.taggers_config_path().display());
    println!("  Output: {}", config.output_root().display());
    println!("  Signals: {}", declared.join(", "));
    if !args.signals.is_empty() {
        println!("  Requested: {}", args.signals.join(", "));
    }
    println!("  Sample: {} (max {} jets)", args.sample, args.num_jets);

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
}

fn perform_dry_run(plan: &[SignalOutput]) {
    if plan.is_empty() {
        println!("⚠️ No declared signal matches the request");
        return;
    }
    for signal in plan {
        println!("🎯 {} -> {}", signal.signal, signal.output_dir.display());
        for file in &signal.files {
            println!("  - {}", file.display());
        }
    }
}
