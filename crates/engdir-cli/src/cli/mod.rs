//! CLI for the engineers directory export.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use engdir_core::config::{self, EngdirConfig};
use engdir_core::export::ExportOptions;
use std::path::PathBuf;

use commands::{run_config, run_export, run_list, run_show};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "engdir")]
#[command(about = "Export the Brandenburg chamber of engineers member directory", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/engdir/config.toml (created if missing).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch every member and write the export file.
    Run {
        /// Number of concurrent detail requests (overrides config).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Output file (overrides config; overwritten).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Write rows in listing order instead of completion order.
        #[arg(long)]
        ordered: bool,
        /// Tab-separated output instead of comma-separated.
        #[arg(long)]
        tsv: bool,
        /// Leave members whose detail fetch failed out of the file instead of writing a blank row.
        #[arg(long)]
        skip_failed: bool,
        /// Do not print a line per member.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the detail URL of every member in the listing.
    List,

    /// Fetch one member by identifier and print the normalized record.
    Show {
        /// Member identifier as found in the listing.
        ident: String,
    },

    /// Show the config file path and the effective configuration.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngdirConfig> {
    match path {
        Some(p) => config::load_or_init_at(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = load_config(cli.config.as_ref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                workers,
                output,
                ordered,
                tsv,
                skip_failed,
                quiet,
            } => {
                if let Some(n) = workers {
                    cfg.workers = n;
                }
                if let Some(path) = output {
                    cfg.output = path;
                }
                if ordered {
                    cfg.ordered = true;
                }
                if tsv {
                    cfg.delimiter = '\t';
                }
                let export = ExportOptions {
                    delimiter: cfg.delimiter,
                    skip_failed,
                };
                run_export(cfg, export, quiet).await?;
            }
            CliCommand::List => run_list(cfg).await?,
            CliCommand::Show { ident } => run_show(cfg, ident).await?,
            CliCommand::Config => run_config(&cfg, cli.config.as_deref())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
