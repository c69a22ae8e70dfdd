//! `engdir list` – print the detail URL of every listed member.

use anyhow::{Context, Result};
use engdir_core::config::EngdirConfig;
use engdir_core::listing::list_detail_urls;

use super::request_context;

pub async fn run_list(cfg: EngdirConfig) -> Result<()> {
    let (source, headers) = request_context(&cfg);
    let urls = tokio::task::spawn_blocking(move || {
        list_detail_urls(
            source.as_ref(),
            &cfg.listing_url,
            &cfg.detail_url_prefix,
            &headers,
        )
    })
    .await
    .map_err(|e| anyhow::anyhow!("listing task join: {}", e))?
    .context("fetching member listing")?;

    if urls.is_empty() {
        println!("No members listed.");
    }
    for url in urls {
        println!("{}", url);
    }
    Ok(())
}
