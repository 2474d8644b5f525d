use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use catalog_spider_rs::input::{DEFAULT_LINK_COLUMN, load_product_paths};
use catalog_spider_rs::{Config, RunOptions, WriteMode};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
    /// Overrides SPIDER_CONCURRENCY.
    #[clap(short, long)]
    parallel_requests: Option<usize>,

    /// Product paths: one per line, or a .csv with a link column.
    #[clap(short, long, default_value = "products.txt")]
    input: PathBuf,

    #[clap(long, default_value = DEFAULT_LINK_COLUMN)]
    input_column: String,

    #[clap(short, long, default_value = "export.csv")]
    output: PathBuf,

    /// append or overwrite; asks on stdin when omitted and the report exists.
    #[clap(short, long)]
    mode: Option<WriteMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::from_env().context("incomplete configuration")?;
    if let Some(parallel_requests) = args.parallel_requests {
        config.concurrency = parallel_requests.max(1);
    }

    let mode = match args.mode {
        Some(mode) => mode,
        None => prompt_mode(&args.output)?,
    };

    let paths = load_product_paths(&args.input, &args.input_column)
        .with_context(|| format!("cannot load product paths from {}", args.input.display()))?;
    tracing::info!(count = paths.len(), input = %args.input.display(), "loaded product paths");

    let options = RunOptions::new(args.output, mode);
    let summary = catalog_spider_rs::run(&config, paths, &options).await?;

    println!(
        "requested {}, succeeded {}, skipped {}, dropped {}, failed {}",
        summary.requested,
        summary.succeeded,
        summary.skipped,
        summary.dropped,
        summary.failed
    );

    Ok(())
}

fn prompt_mode(report: &Path) -> Result<WriteMode> {
    if !report.exists() {
        return Ok(WriteMode::Overwrite);
    }

    println!("The file '{}' already exists.", report.display());
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Do you want to (A)ppend to existing file or (O)verwrite it? [A/O]: ");
        std::io::stdout().flush()?;
        let line = lines.next().context("no answer on stdin")??;
        match line.parse::<WriteMode>() {
            Ok(mode) => return Ok(mode),
            Err(_) => println!("Invalid choice. Please enter 'A' for append or 'O' for overwrite."),
        }
    }
}
