//! Concurrent fetch-and-normalize pipeline.
//!
//! Fetches the listing once, then runs every detail URL through a bounded pool
//! of worker threads. Results are drained on the calling thread in completion
//! order, so the `ResultSet` never needs a lock.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::EngdirConfig;
use crate::fetch::{FailureKind, JsonSource};
use crate::listing::{list_detail_urls, ListingError};
use crate::normalize::{fetch_detail, DetailError, NormalizedRow};

/// Source shared by all worker threads.
pub type SharedSource = Arc<dyn JsonSource + Send + Sync>;

/// Order of entries in the final `ResultSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowOrdering {
    /// As workers finish (varies between runs).
    #[default]
    Completion,
    /// Same order as the member listing.
    Listing,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub listing_url: String,
    pub detail_prefix: String,
    pub headers: HashMap<String, String>,
    pub workers: usize,
    pub ordering: RowOrdering,
}

impl PipelineOptions {
    pub fn from_config(cfg: &EngdirConfig, headers: HashMap<String, String>) -> Self {
        Self {
            listing_url: cfg.listing_url.clone(),
            detail_prefix: cfg.detail_url_prefix.clone(),
            headers,
            workers: cfg.workers,
            ordering: if cfg.ordered {
                RowOrdering::Listing
            } else {
                RowOrdering::Completion
            },
        }
    }
}

/// Result for one detail URL.
#[derive(Debug)]
pub struct DetailOutcome {
    /// Position of the member in the listing.
    pub index: usize,
    pub url: String,
    pub result: Result<NormalizedRow, DetailError>,
}

/// Progress event sent after each detail URL is done.
#[derive(Debug, Clone)]
pub struct RowProgress {
    /// Entries finished so far, including this one.
    pub done: usize,
    pub total: usize,
    pub url: String,
    pub status: RowStatus,
}

#[derive(Debug, Clone)]
pub enum RowStatus {
    Row(NormalizedRow),
    Failed { kind: FailureKind, message: String },
}

/// All outcomes of one run.
#[derive(Debug, Default)]
pub struct ResultSet {
    entries: Vec<DetailOutcome>,
}

impl ResultSet {
    pub fn push(&mut self, outcome: DetailOutcome) {
        self.entries.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetailOutcome> {
        self.entries.iter()
    }

    /// Successfully normalized rows, in entry order.
    pub fn rows(&self) -> impl Iterator<Item = &NormalizedRow> {
        self.entries.iter().filter_map(|e| e.result.as_ref().ok())
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_err()).count()
    }

    /// Reorder entries to match the listing.
    pub fn sort_by_listing(&mut self) {
        self.entries.sort_by_key(|e| e.index);
    }

    pub fn summary(&self) -> RunSummary {
        let mut by_kind: BTreeMap<FailureKind, usize> = BTreeMap::new();
        for e in &self.entries {
            if let Err(err) = &e.result {
                *by_kind.entry(err.kind()).or_insert(0) += 1;
            }
        }
        let failed: usize = by_kind.values().sum();
        RunSummary {
            total: self.entries.len(),
            succeeded: self.entries.len() - failed,
            failed,
            by_kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub by_kind: BTreeMap<FailureKind, usize>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} member(s): {} ok, {} failed",
            self.total, self.succeeded, self.failed
        )?;
        if !self.by_kind.is_empty() {
            let parts: Vec<String> = self
                .by_kind
                .iter()
                .map(|(k, n)| format!("{} {}", n, k))
                .collect();
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}

/// List members, fetch and normalize every detail record, collect the outcomes.
///
/// Only a failed listing aborts; each failed detail fetch becomes an `Err`
/// entry in the returned set. If `progress_tx` is `Some`, a `RowProgress` is
/// offered after each entry (dropped if the channel is full).
pub fn run_pipeline(
    source: SharedSource,
    opts: &PipelineOptions,
    progress_tx: Option<&tokio::sync::mpsc::Sender<RowProgress>>,
) -> Result<ResultSet, ListingError> {
    let urls = list_detail_urls(
        source.as_ref(),
        &opts.listing_url,
        &opts.detail_prefix,
        &opts.headers,
    )?;
    let mut results = run_details(source, urls, &opts.headers, opts.workers, progress_tx);
    if opts.ordering == RowOrdering::Listing {
        results.sort_by_listing();
    }
    let summary = results.summary();
    tracing::info!(
        total = summary.total,
        failed = summary.failed,
        "pipeline finished: {}",
        summary
    );
    Ok(results)
}

/// Run detail URLs with a bounded worker pool; outcomes are appended as they arrive.
pub fn run_details(
    source: SharedSource,
    urls: Vec<String>,
    headers: &HashMap<String, String>,
    workers: usize,
    progress_tx: Option<&tokio::sync::mpsc::Sender<RowProgress>>,
) -> ResultSet {
    let count = urls.len();
    let mut results = ResultSet {
        entries: Vec::with_capacity(count),
    };
    if count == 0 {
        return results;
    }

    let work: Arc<Mutex<VecDeque<(usize, String)>>> =
        Arc::new(Mutex::new(urls.iter().cloned().enumerate().collect()));
    let (tx, rx) = mpsc::channel::<DetailOutcome>();
    let num_workers = workers.max(1).min(count);
    tracing::debug!(workers = num_workers, urls = count, "starting detail workers");

    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let source = Arc::clone(&source);
        let h = headers.clone();
        handles.push(std::thread::spawn(move || loop {
            let next = work
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some((index, url)) = next else {
                break;
            };
            let result = fetch_detail(source.as_ref(), &url, &h);
            if tx.send(DetailOutcome { index, url, result }).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut pending: BTreeSet<usize> = (0..count).collect();
    while !pending.is_empty() {
        let outcome = match rx.recv() {
            Ok(o) => o,
            Err(_) => {
                tracing::warn!(
                    missing = pending.len(),
                    "worker result channel closed (worker may have panicked)"
                );
                break;
            }
        };
        pending.remove(&outcome.index);
        report(&outcome, results.len() + 1, count, progress_tx);
        results.push(outcome);
    }

    for h in handles {
        if let Err(e) = h.join() {
            tracing::warn!("detail worker panicked: {:?}", e);
        }
    }

    // Entries whose worker died before reporting.
    for index in pending {
        let outcome = DetailOutcome {
            index,
            url: urls[index].clone(),
            result: Err(DetailError::WorkerLost),
        };
        report(&outcome, results.len() + 1, count, progress_tx);
        results.push(outcome);
    }

    results
}

fn report(
    outcome: &DetailOutcome,
    done: usize,
    total: usize,
    progress_tx: Option<&tokio::sync::mpsc::Sender<RowProgress>>,
) {
    let status = match &outcome.result {
        Ok(row) => {
            tracing::debug!(done, total, url = %outcome.url, "member normalized");
            RowStatus::Row(row.clone())
        }
        Err(e) => {
            tracing::warn!(done, total, url = %outcome.url, kind = %e.kind(), "member failed: {}", e);
            RowStatus::Failed {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    };
    if let Some(tx) = progress_tx {
        let _ = tx.try_send(RowProgress {
            done,
            total,
            url: outcome.url.clone(),
            status,
        });
    }
}
