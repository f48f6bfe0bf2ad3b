//! CLI for pkgcheck: fetch packages listed in a manifest and verify them.

mod commands;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use pkgcheck_core::config::{self, PkgcheckConfig};
use pkgcheck_core::container::ContainerKind;
use std::path::PathBuf;

use commands::{run_check, run_fetch, run_keys};

/// Top-level CLI for pkgcheck.
#[derive(Debug, Parser)]
#[command(name = "pkgcheck")]
#[command(about = "pkgcheck: fetch offline map packages and verify their integrity", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every package in a manifest and validate it.
    #[command(group(ArgGroup::new("source").required(true).args(["task", "manifest"])))]
    Fetch {
        /// Task id to look up in the task store.
        #[arg(long, value_name = "ID")]
        task: Option<String>,
        /// Read the manifest JSON from a local file instead.
        #[arg(long, value_name = "PATH")]
        manifest: Option<PathBuf>,
        /// Directory downloaded packages are written into.
        #[arg(long, default_value = "./data", value_name = "DIR")]
        work_dir: PathBuf,
        /// Max packages fetched and validated at once (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Container kind of the listed packages (exto, ttfa, ttfb).
        #[arg(long)]
        kind: Option<ContainerKind>,
        /// Also decode every row of the record table.
        #[arg(long)]
        scan_records: bool,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate packages already present in a directory, without downloading.
    Check {
        /// Directory holding `<key>.<ext>` files.
        dir: PathBuf,
        #[arg(long)]
        kind: Option<ContainerKind>,
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        #[arg(long)]
        scan_records: bool,
        #[arg(long)]
        json: bool,
    },

    /// Print the parsed `key url` mapping of a manifest (dry run).
    #[command(group(ArgGroup::new("source").required(true).args(["task", "manifest"])))]
    Keys {
        #[arg(long, value_name = "ID")]
        task: Option<String>,
        #[arg(long, value_name = "PATH")]
        manifest: Option<PathBuf>,
    },
}

/// How a successful run ended; maps to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    AllOk,
    Failures,
}

/// Per-run flag overrides on top of the config file.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Overrides {
    pub jobs: Option<usize>,
    pub kind: Option<ContainerKind>,
    pub scan_records: bool,
}

impl Overrides {
    pub fn apply(self, mut cfg: PkgcheckConfig) -> PkgcheckConfig {
        if let Some(jobs) = self.jobs {
            cfg.max_concurrent_units = jobs;
        }
        if let Some(kind) = self.kind {
            cfg.container = kind;
        }
        if self.scan_records {
            cfg.scan_records = true;
        }
        cfg
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<Completion> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                task,
                manifest,
                work_dir,
                jobs,
                kind,
                scan_records,
                json,
            } => {
                let cfg = Overrides {
                    jobs,
                    kind,
                    scan_records,
                }
                .apply(cfg);
                run_fetch(&cfg, task.as_deref(), manifest, &work_dir, json).await
            }
            CliCommand::Check {
                dir,
                kind,
                jobs,
                scan_records,
                json,
            } => {
                let cfg = Overrides {
                    jobs,
                    kind,
                    scan_records,
                }
                .apply(cfg);
                run_check(&cfg, &dir, json).await
            }
            CliCommand::Keys { task, manifest } => {
                run_keys(&cfg, task.as_deref(), manifest).await?;
                Ok(Completion::AllOk)
            }
        }
    }
}

#[cfg(test)]
mod tests;
