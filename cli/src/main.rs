//! vmboot - prepare a disposable VM, run one collection job, power off.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vmboot_core::host::SystemHost;
use vmboot_core::job::ProcessJobRunner;
use vmboot_core::{Bootstrap, BootstrapConfig};
use vmboot_types::JobStatus;

/// Bootstrap a throwaway VM for one collection run.
///
/// Installs the Python tooling, downloads the collector and its support
/// library, runs the collector with `-c <collection>`, and powers the host
/// off when it succeeds. A failed run leaves the host up for inspection.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Collection identifier forwarded verbatim to the collector as `-c`.
    /// Absent means an empty value; the collector decides whether to accept it.
    collection: Option<String>,

    /// Alternate configuration file (default: ~/.vmboot/config.toml).
    #[clap(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match cli.config.or_else(BootstrapConfig::default_path) {
        Some(path) => BootstrapConfig::load(&path)?,
        None => BootstrapConfig::default(),
    };
    let argument = cli.collection.unwrap_or_default();

    let job = ProcessJobRunner::new(
        config.program.interpreter.clone(),
        config.program.entry.clone(),
        config.workdir(),
    );
    let bootstrap = Bootstrap::new(config, SystemHost::new(), job)?;

    let report = bootstrap.run(&argument).await?;

    for outcome in report.failed_steps() {
        tracing::warn!(step = %outcome.kind, status = ?outcome.status, "degraded step");
    }

    Ok(match report.job {
        Some(JobStatus::Success) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
