//! `engdir run` – full export: listing, concurrent details, file.

use anyhow::{Context, Result};
use engdir_core::config::EngdirConfig;
use engdir_core::export::{write_result_set, ExportOptions};
use engdir_core::pipeline::{run_pipeline, PipelineOptions, RowProgress, RowStatus};
use std::time::Instant;

use super::request_context;

const PROGRESS_CHANNEL: usize = 256;

pub async fn run_export(cfg: EngdirConfig, export: ExportOptions, quiet: bool) -> Result<()> {
    let (source, headers) = request_context(&cfg);
    let opts = PipelineOptions::from_config(&cfg, headers);
    tracing::info!(
        workers = opts.workers,
        ordering = ?opts.ordering,
        "starting export to {}",
        cfg.output.display()
    );

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<RowProgress>(PROGRESS_CHANNEL);
    let progress_handle = tokio::spawn(async move {
        while let Some(p) = progress_rx.recv().await {
            if !quiet {
                println!("{}", progress_line(&p));
            }
        }
    });

    let started = Instant::now();
    let results = tokio::task::spawn_blocking(move || {
        let res = run_pipeline(source, &opts, Some(&progress_tx));
        drop(progress_tx);
        res
    })
    .await
    .map_err(|e| anyhow::anyhow!("pipeline task join: {}", e))?
    .context("member listing failed; nothing exported")?;
    let _ = progress_handle.await;

    let written = write_result_set(&cfg.output, &results, &export)?;
    println!(
        "Wrote {} row(s) to {} in {:.1}s",
        written,
        cfg.output.display(),
        started.elapsed().as_secs_f64()
    );
    println!("{}", results.summary());
    Ok(())
}

/// One console line per finished member: counter, then every cell of the row
/// or the failure. Lines the printer could not keep up with are dropped by the
/// pipeline; the file and the summary still cover every member.
fn progress_line(p: &RowProgress) -> String {
    match &p.status {
        RowStatus::Row(row) => {
            let cells: Vec<&str> = row.cells().iter().map(|c| c.trim()).collect();
            format!("{}/{}. {}", p.done, p.total, cells.join(" | "))
        }
        RowStatus::Failed { kind, message } => {
            format!("{}/{}. FAILED ({}) {}: {}", p.done, p.total, kind, p.url, message)
        }
    }
}
