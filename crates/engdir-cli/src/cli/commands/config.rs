//! `engdir config` – show config path and effective values.

use anyhow::Result;
use engdir_core::config::{self, EngdirConfig};
use std::path::Path;

pub fn run_config(cfg: &EngdirConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
