use anyhow::{Context, bail};
use log::{info, warn};
use prevalence_curator::loader::{
    OUTLIER_REPORT_FILE, RESULTS_FILE, ResultView, load_corpus_async, write_outlier_report,
    write_results,
};
use prevalence_curator::pipeline::run_pipeline_with_cancel;
use prevalence_curator::utils::logging::{create_spinner, finish_progress_bar};
use prevalence_curator::CurationConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

const USAGE: &str =
    "usage: prevalence-curator <corpus.json> <output_dir> [--config <config.json>] [--view class|mean]";

struct Args {
    corpus: PathBuf,
    output_dir: PathBuf,
    config: Option<PathBuf>,
    view: ResultView,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut view = ResultView::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(value));
            }
            "--view" => {
                let value = args.next().context("--view needs 'class' or 'mean'")?;
                view = value.parse()?;
            }
            "-h" | "--help" => bail!("{USAGE}"),
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let [corpus, output_dir]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected a corpus file and an output directory\n{USAGE}"))?;

    Ok(Args {
        corpus,
        output_dir,
        config,
        view,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    let start = Instant::now();

    let config = match &args.config {
        Some(path) => CurationConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => CurationConfig::default(),
    }
    .with_env_overrides();
    config.validate().context("Invalid configuration")?;
    info!("{config}");

    let spinner = if config.show_progress {
        create_spinner(Some("Loading corpus"))
    } else {
        indicatif::ProgressBar::hidden()
    };
    let loaded = load_corpus_async(&args.corpus).await;
    finish_progress_bar(&spinner, Some("Corpus loaded"));
    let corpus = loaded
        .with_context(|| format!("Failed to load corpus from {}", args.corpus.display()))?;

    // Stop between diseases on Ctrl-C
    let cancel = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the diseases already started");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let pipeline_config = config.clone();
    let output = tokio::task::spawn_blocking(move || {
        run_pipeline_with_cancel(&corpus, &pipeline_config, &cancel)
    })
    .await
    .context("Curation task failed")?;

    let results_path = args.output_dir.join(RESULTS_FILE);
    write_results(&results_path, &output, args.view)
        .with_context(|| format!("Failed to write results to {}", results_path.display()))?;

    if let Some(report) = &output.report {
        let report_path = args.output_dir.join(OUTLIER_REPORT_FILE);
        write_outlier_report(&report_path, report).with_context(|| {
            format!("Failed to write outlier report to {}", report_path.display())
        })?;
    }

    println!("{}", output.summary());
    info!("Finished in {:?}", start.elapsed());

    if output.cancelled {
        bail!("Run cancelled before every disease was curated");
    }
    Ok(())
}
