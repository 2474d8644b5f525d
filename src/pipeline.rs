use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;

use crate::api::VendorClient;
use crate::auth;
use crate::config::Config;
use crate::error::RunError;
use crate::fetch::{FetchOutcome, fetch_product};
use crate::gate::ConcurrencyGate;
use crate::report::{self, Report, WriteMode};
use crate::row::{DATE_FORMAT, OutputRow, RowKey};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub report_path: PathBuf,
    pub mode: WriteMode,
    /// Value written to `Date Listed` and used for the same-day skip.
    pub current_date: String,
}

impl RunOptions {
    pub fn new(report_path: PathBuf, mode: WriteMode) -> Self {
        Self {
            report_path,
            mode,
            current_date: today(),
        }
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub requested: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub dropped: usize,
    /// Fetch tasks that died unexpectedly.
    pub failed: usize,
    /// Rows in the report after writing, `None` if nothing was written.
    pub written: Option<usize>,
}

pub fn today() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

/// Loads the report for append mode. A report that cannot be read falls
/// back to overwrite.
fn load_existing(options: &RunOptions) -> (WriteMode, Option<Report>) {
    if options.mode == WriteMode::Overwrite || !options.report_path.exists() {
        return (options.mode, None);
    }
    match report::read_report(&options.report_path) {
        Ok(existing) => (WriteMode::Append, Some(existing)),
        Err(e) => {
            tracing::warn!(error = %e, "cannot read existing report, overwriting instead");
            (WriteMode::Overwrite, None)
        }
    }
}

/// Authenticates, fetches every path under the concurrency cap, merges with
/// the existing report and writes it.
pub async fn run(
    config: &Config,
    paths: Vec<String>,
    options: &RunOptions,
) -> Result<RunSummary, RunError> {
    let mut summary = RunSummary {
        requested: paths.len(),
        ..RunSummary::default()
    };
    if paths.is_empty() {
        tracing::info!("no product paths to process");
        return Ok(summary);
    }

    let (mode, existing) = load_existing(options);
    let existing_keys = match &existing {
        Some(report) if report.has_key_columns() => {
            tracing::info!(
                date = %options.current_date,
                "will skip products already listed today"
            );
            Some(Arc::new(crate::dedup::existing_keys(&report.records)))
        }
        Some(_) => {
            tracing::warn!("existing report lacks key columns, skipping same-day check");
            None
        }
        None => None,
    };

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(RunError::Client)?;
    let token = auth::authenticate(&http, config).await?;
    let client = Arc::new(VendorClient::new(http, config, token));

    tracing::info!(
        products = paths.len(),
        concurrency = config.concurrency,
        "fetching products"
    );
    let outcomes = fetch_all(
        client,
        config,
        paths,
        &options.current_date,
        existing_keys,
    )
    .await;

    let mut rows: Vec<OutputRow> = vec![];
    for outcome in outcomes {
        match outcome {
            Some(FetchOutcome::Row(row)) => {
                summary.succeeded += 1;
                rows.push(row);
            }
            Some(FetchOutcome::Skipped { .. }) => summary.skipped += 1,
            Some(FetchOutcome::Dropped { .. }) => summary.dropped += 1,
            None => summary.failed += 1,
        }
    }

    if summary.skipped > 0 {
        tracing::info!(
            skipped = summary.skipped,
            date = %options.current_date,
            "skipped products already in the report"
        );
    }

    if rows.is_empty() {
        tracing::info!("no new rows collected, report left unchanged");
    } else {
        let written = report::write(&rows, &options.report_path, mode, existing)?;
        summary.written = Some(written);
    }

    tracing::info!(
        requested = summary.requested,
        succeeded = summary.succeeded,
        skipped = summary.skipped,
        dropped = summary.dropped,
        failed = summary.failed,
        "run finished"
    );
    Ok(summary)
}

/// Spawns one task per path, all at once; the gate admits at most
/// `config.concurrency` of them at a time. Results come back in input order.
/// `None` marks a task that panicked.
async fn fetch_all(
    client: Arc<VendorClient>,
    config: &Config,
    paths: Vec<String>,
    current_date: &str,
    existing_keys: Option<Arc<HashSet<RowKey>>>,
) -> Vec<Option<FetchOutcome>> {
    let gate = ConcurrencyGate::new(config.concurrency);
    let base_url: Arc<str> = Arc::from(config.base_url.as_str());
    let current_date: Arc<str> = Arc::from(current_date);

    let mut tasks: FuturesUnordered<_> = paths
        .into_iter()
        .enumerate()
        .map(|(idx, path)| {
            let gate = gate.clone();
            let client = client.clone();
            let base_url = base_url.clone();
            let current_date = current_date.clone();
            let existing_keys = existing_keys.clone();
            let handle = tokio::spawn(async move {
                gate.run(fetch_product(
                    &client,
                    &base_url,
                    &path,
                    &current_date,
                    existing_keys.as_deref(),
                ))
                .await
            });
            async move { (idx, handle.await) }
        })
        .collect();

    let mut outcomes: Vec<(usize, Option<FetchOutcome>)> = Vec::with_capacity(tasks.len());
    while let Some((idx, joined)) = tasks.next().await {
        match joined {
            Ok(outcome) => {
                if let FetchOutcome::Dropped { reason } = &outcome {
                    tracing::debug!(idx, reason = %reason, "product dropped");
                }
                outcomes.push((idx, Some(outcome)));
            }
            Err(e) => {
                tracing::error!(idx, error = %e, "fetch task failed");
                outcomes.push((idx, None));
            }
        }
    }

    outcomes.sort_by_key(|(idx, _)| *idx);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}
