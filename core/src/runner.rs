//! The bootstrap sequence.
//!
//! Preparation is best-effort: each step's result is recorded and logged, and
//! the sequence continues regardless. The delegated program is the single
//! hard-checked action; shutdown is gated on its success, and a failed job
//! deliberately leaves the host running for inspection.

use std::fmt::Display;
use std::path::Path;
use std::time::Instant;

use vmboot_types::{BootstrapReport, StepKind, StepOutcome, StepStatus};

use crate::config::BootstrapConfig;
use crate::fetch::{ArtifactFetcher, FetchError};
use crate::host::HostControl;
use crate::job::{JobError, JobRunner};

pub struct Bootstrap<H, J> {
    config: BootstrapConfig,
    host: H,
    job: J,
    fetcher: ArtifactFetcher,
}

impl<H: HostControl, J: JobRunner> Bootstrap<H, J> {
    pub fn new(config: BootstrapConfig, host: H, job: J) -> Result<Self, FetchError> {
        let timeout = config
            .fetch_timeout_seconds
            .map(std::time::Duration::from_secs);
        let fetcher = ArtifactFetcher::new(timeout)?;
        Ok(Self {
            config,
            host,
            job,
            fetcher,
        })
    }

    /// Run the full sequence and return the report.
    ///
    /// The only error path out is a job that could not be spawned or waited
    /// on; everything before the job degrades instead of failing.
    pub async fn run(&self, argument: &str) -> Result<BootstrapReport, JobError> {
        let mut report = BootstrapReport::new();
        let workdir = self.config.workdir();

        self.prepare(&mut report, &workdir).await;

        if report.degraded() {
            tracing::warn!(
                failed = report.failed_steps().count(),
                "environment preparation was degraded; attempting the job anyway"
            );
        }

        tracing::info!(argument, program = %self.config.program.entry, "launching delegated program");
        let status = self.job.run(argument).await?;
        report.job = Some(status);

        if status.is_success() {
            tracing::info!("delegated program succeeded; powering off host");
            match self.host.shutdown().await {
                Ok(()) => report.shutdown_issued = true,
                Err(err) => tracing::error!(%err, "shutdown request failed; host left running"),
            }
        } else {
            tracing::error!(%status, "delegated program failed; host left running for inspection");
        }

        Ok(report)
    }

    async fn prepare(&self, report: &mut BootstrapReport, workdir: &Path) {
        step(
            report,
            StepKind::SetTimezone,
            self.host.set_timezone(&self.config.timezone),
        )
        .await;
        step(
            report,
            StepKind::RefreshPackageIndex,
            self.host.refresh_package_index(),
        )
        .await;
        step(
            report,
            StepKind::InstallSystemPackages,
            self.host.install_packages(&self.config.system_packages),
        )
        .await;

        // The original `cd` assumed the directory pre-exists; verify rather
        // than create, and let later steps fail on their own if it is absent.
        let workdir_present = if workdir.is_dir() {
            Ok(())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("working directory {} does not exist", workdir.display()),
            ))
        };
        step(
            report,
            StepKind::EnterWorkdir,
            std::future::ready(workdir_present),
        )
        .await;

        for artifact in &self.config.artifacts {
            step(
                report,
                StepKind::FetchArtifact(artifact.filename.clone()),
                async { self.fetcher.fetch(artifact, workdir).await.map(|_| ()) },
            )
            .await;
        }

        for manifest in &self.config.manifests {
            step(
                report,
                StepKind::InstallRequirements(manifest.clone()),
                self.host
                    .install_requirements(&workdir.join(manifest), &self.config.trusted_hosts),
            )
            .await;
        }
    }
}

/// Run one best-effort step, log its outcome, and record it.
async fn step<E: Display>(
    report: &mut BootstrapReport,
    kind: StepKind,
    fut: impl Future<Output = Result<(), E>>,
) {
    let started = Instant::now();
    let result = fut.await;
    let elapsed = started.elapsed();
    let status = match result {
        Ok(()) => {
            tracing::info!(step = %kind, "step completed");
            StepStatus::Completed
        }
        Err(err) => {
            tracing::warn!(step = %kind, %err, "step failed; continuing");
            StepStatus::Failed(err.to_string())
        }
    };
    report.record(StepOutcome {
        kind,
        status,
        elapsed,
    });
}
