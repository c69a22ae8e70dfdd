use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTING_URL: &str =
    "https://www.bbik.de/typo3conf/ext/bbik_inka/Classes/Services/Inka/inka.php";
pub const DEFAULT_DETAIL_URL_PREFIX: &str =
    "https://www.bbik.de/typo3conf/ext/bbik_inka/Classes/Services/Inka/inka.php?action=member_info&inka_id=";

/// Global configuration loaded from `~/.config/engdir/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngdirConfig {
    /// Endpoint returning the member listing (array of `{"ident": ...}`).
    pub listing_url: String,
    /// Prefix the member identifier is appended to for the detail request.
    pub detail_url_prefix: String,
    /// Number of worker threads fetching detail records.
    pub workers: usize,
    /// Output file path (overwritten on each run).
    pub output: PathBuf,
    /// Field separator for the export (',' for CSV, '\t' for TSV).
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Write rows in listing order instead of completion order.
    #[serde(default)]
    pub ordered: bool,
    /// Fixed User-Agent. When unset, one is picked at random per run.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Pool to pick the random User-Agent from (None = built-in pool).
    #[serde(default)]
    pub user_agents: Option<Vec<String>>,
    /// TCP connect timeout per request, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total timeout per request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Additional request headers sent with every request.
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
}

fn default_delimiter() -> char {
    ','
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for EngdirConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            detail_url_prefix: DEFAULT_DETAIL_URL_PREFIX.to_string(),
            workers: 10,
            output: PathBuf::from("output.csv"),
            delimiter: default_delimiter(),
            ordered: false,
            user_agent: None,
            user_agents: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            extra_headers: HashMap::new(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("engdir")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the XDG config dir, creating a default file if none exists.
pub fn load_or_init() -> Result<EngdirConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Like `load_or_init` but for an explicit path (`--config`).
pub fn load_or_init_at(path: &Path) -> Result<EngdirConfig> {
    if !path.exists() {
        let default_cfg = EngdirConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}

pub fn load_from_path(path: &Path) -> Result<EngdirConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: EngdirConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
