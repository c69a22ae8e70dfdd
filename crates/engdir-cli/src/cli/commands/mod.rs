//! CLI command handlers. Each command is in its own file.

mod config;
mod list;
mod run;
mod show;

pub use config::run_config;
pub use list::run_list;
pub use run::run_export;
pub use show::run_show;

use engdir_core::config::EngdirConfig;
use engdir_core::fetch::CurlFetcher;
use engdir_core::pipeline::SharedSource;
use engdir_core::user_agent;
use std::collections::HashMap;
use std::sync::Arc;

/// Fetcher and request headers for one invocation (User-Agent picked once).
fn request_context(cfg: &EngdirConfig) -> (SharedSource, HashMap<String, String>) {
    let ua = user_agent::choose(cfg);
    tracing::debug!(user_agent = %ua, "request user agent");
    let headers = user_agent::request_headers(cfg, &ua);
    let source: SharedSource = Arc::new(CurlFetcher::from_config(cfg));
    (source, headers)
}
