//! `engdir show <ident>` – fetch and print one normalized member.

use anyhow::{Context, Result};
use engdir_core::config::EngdirConfig;
use engdir_core::listing::detail_url;
use engdir_core::normalize::{fetch_detail, NormalizedRow, COLUMNS};

use super::request_context;

pub async fn run_show(cfg: EngdirConfig, ident: String) -> Result<()> {
    let (source, headers) = request_context(&cfg);
    let url = detail_url(&cfg.detail_url_prefix, ident.trim());
    let row = tokio::task::spawn_blocking(move || {
        fetch_detail(source.as_ref(), &url, &headers).with_context(|| format!("member {}", url))
    })
    .await
    .map_err(|e| anyhow::anyhow!("detail task join: {}", e))??;
    print!("{}", render(&row));
    Ok(())
}

/// `Column: value` lines, column names padded to the widest.
fn render(row: &NormalizedRow) -> String {
    let width = COLUMNS.iter().map(|c| c.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, value) in COLUMNS.iter().zip(row.cells()) {
        out.push_str(&format!("{:<width$}  {}\n", format!("{}:", name), value, width = width + 1));
    }
    out
}
