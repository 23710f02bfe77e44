//! CLI argument parsing and run setup

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use courier::config::{RunOptions, DEFAULT_PINNED_MANIFEST, DEFAULT_PRIMARY_MANIFEST};
use courier::output::OutputConfig;
use courier::reconcile::{self, Outcome};
use courier::stage::Stager;

use crate::signal;

/// Courier - Vendor git and svn dependencies into the current directory
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every fetch, hash and copy step
    #[arg(short, long)]
    verbose: bool,

    /// Colorize output (always, never, auto)
    #[arg(
        long,
        value_name = "WHEN",
        default_value = "auto",
        value_parser = ["auto", "always", "never"]
    )]
    color: String,

    /// Stage the pinned manifest instead of the primary one and do not write pins
    #[arg(long)]
    reproduce: bool,

    /// Copy every dependency even if the destination is unchanged
    #[arg(long)]
    force_copy: bool,

    /// Manifest describing the dependencies to vendor
    #[arg(
        long,
        value_name = "PATH",
        env = "COURIER_PRIMARY_MANIFEST",
        default_value = DEFAULT_PRIMARY_MANIFEST
    )]
    primary_manifest: PathBuf,

    /// Where to save the pinned manifest (read instead with --reproduce)
    #[arg(
        long,
        value_name = "PATH",
        env = "COURIER_PINNED_MANIFEST",
        default_value = DEFAULT_PINNED_MANIFEST
    )]
    pinned_manifest: PathBuf,

    /// Directory to create staging directories in (defaults to the system temp dir)
    #[arg(long, value_name = "PATH", env = "COURIER_STAGING_ROOT")]
    staging_root: Option<PathBuf>,
}

impl Cli {
    /// Execute the run described by the flags
    pub fn execute(self) -> Result<()> {
        self.init_logging();
        signal::install_interrupt_listener().context("Failed to install signal handler")?;

        info!("Courier version {}", env!("CARGO_PKG_VERSION"));

        let options = self.run_options()?;
        let mut stager = Stager::new();
        if let Some(root) = &options.staging_root {
            stager = stager.with_staging_root(root);
        }

        let summary = reconcile::run(&options, &stager).with_context(|| {
            format!(
                "Failed to vendor dependencies from {}",
                options.manifest_path().display()
            )
        })?;

        info!(
            "{} copied, {} forced, {} unchanged",
            summary.count(Outcome::Copied),
            summary.count(Outcome::Forced),
            summary.count(Outcome::Unchanged)
        );
        Ok(())
    }

    fn run_options(&self) -> Result<RunOptions> {
        let dest_root =
            std::env::current_dir().context("Failed to determine the current directory")?;
        let mut options = RunOptions::new(dest_root);
        options.primary_manifest = self.primary_manifest.clone();
        options.pinned_manifest = self.pinned_manifest.clone();
        options.reproduce = self.reproduce;
        options.force_copy = self.force_copy;
        options.staging_root = self.staging_root.clone();
        Ok(options)
    }

    fn level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Installs `env_logger` on stderr. `RUST_LOG` wins over the flags.
    fn init_logging(&self) {
        let output = OutputConfig::from_env_and_flag(&self.color);
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(self.level())
            .parse_default_env()
            .write_style(output.write_style())
            .format_timestamp_millis()
            .format_target(false);
        // a logger may already be installed when embedded
        let _ = builder.try_init();
    }
}
