use anyhow::Context;
use clap::Parser;
use ftag_plots::utils::logger;
use ftag_plots::utils::mock::{write_mock_file, MOCK_TAGGER};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "generate-mock")]
#[command(about = "Write a mock jet sample (CSV) with tagger probability columns")]
struct Args {
    /// Output CSV file
    #[arg(short, long, default_value = "mock_ttbar.csv")]
    output: PathBuf,

    #[arg(short, long, default_value = "10000")]
    num_jets: usize,

    #[arg(long, default_value = "42")]
    seed: u64,

    /// Tagger column prefix; repeat for several taggers
    #[arg(short, long = "tagger")]
    taggers: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let taggers = if args.taggers.is_empty() {
        vec![MOCK_TAGGER.to_string()]
    } else {
        args.taggers
    };

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    write_mock_file(&args.output, args.num_jets, args.seed, &taggers)
        .with_context(|| format!("writing mock sample to {}", args.output.display()))?;

    println!(
        "✅ Wrote {} jet(s) for [{}] to {}",
        args.num_jets,
        taggers.join(", "),
        args.output.display()
    );
    Ok(())
}
