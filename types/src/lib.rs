//! Core domain types for vmboot.
//!
//! This crate contains pure domain types with no IO and no async. Everything
//! here can be used from any layer of the bootstrap runner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Remote artifacts
// ============================================================================

/// A remote file to download into the working directory.
///
/// The local filename may differ from the last URL segment; the original
/// bootstrap renames one of the two dependency manifests on download so it
/// does not clobber the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Source URL, fetched with an unauthenticated GET.
    pub url: String,
    /// Filename the artifact is written to inside the working directory.
    pub filename: String,
}

#[derive(Debug, Error)]
#[error("artifact filename must not be empty")]
pub struct EmptyFilenameError;

impl ArtifactSpec {
    pub fn new(
        url: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<Self, EmptyFilenameError> {
        let filename = filename.into();
        if filename.trim().is_empty() {
            return Err(EmptyFilenameError);
        }
        Ok(Self {
            url: url.into(),
            filename,
        })
    }
}

// ============================================================================
// Preparation steps
// ============================================================================

/// Identifies one best-effort preparation step of the bootstrap sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    SetTimezone,
    RefreshPackageIndex,
    InstallSystemPackages,
    EnterWorkdir,
    /// Download of one remote artifact, identified by its local filename.
    FetchArtifact(String),
    /// Dependency installation from one manifest, identified by filename.
    InstallRequirements(String),
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetTimezone => f.write_str("set-timezone"),
            Self::RefreshPackageIndex => f.write_str("refresh-package-index"),
            Self::InstallSystemPackages => f.write_str("install-system-packages"),
            Self::EnterWorkdir => f.write_str("enter-workdir"),
            Self::FetchArtifact(name) => write!(f, "fetch-artifact:{name}"),
            Self::InstallRequirements(name) => write!(f, "install-requirements:{name}"),
        }
    }
}

/// Result of one preparation step. Failures carry the underlying error text;
/// they never abort the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Failed(String),
}

impl StepStatus {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A preparation step together with its outcome and elapsed wall time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub kind: StepKind,
    pub status: StepStatus,
    pub elapsed: Duration,
}

// ============================================================================
// Delegated job
// ============================================================================

/// Exit outcome of the delegated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Success,
    /// Non-zero exit code.
    Failed(i32),
    /// Terminated without an exit code (killed by a signal).
    Signaled,
}

impl JobStatus {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failed(code) => write!(f, "exit code {code}"),
            Self::Signaled => f.write_str("terminated by signal"),
        }
    }
}

// ============================================================================
// Bootstrap report
// ============================================================================

/// Ordered record of one bootstrap run.
///
/// Steps appear in execution order, one entry per attempted step.
/// `shutdown_issued` is only ever true when the job succeeded.
#[derive(Debug, Clone, Default)]
pub struct BootstrapReport {
    pub steps: Vec<StepOutcome>,
    /// Exit outcome of the delegated program, if it was launched and waited on.
    pub job: Option<JobStatus>,
    /// Whether the host shutdown capability was invoked.
    pub shutdown_issued: bool,
}

impl BootstrapReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }

    /// True when at least one preparation step failed. The environment may be
    /// missing packages or artifacts even though the sequence ran to the end.
    #[must_use]
    pub fn degraded(&self) -> bool {
        self.steps.iter().any(|step| step.status.is_failed())
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|step| step.status.is_failed())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ArtifactSpec, BootstrapReport, JobStatus, StepKind, StepOutcome, StepStatus,
    };
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn outcome(kind: StepKind, status: StepStatus) -> StepOutcome {
        StepOutcome {
            kind,
            status,
            elapsed: Duration::from_millis(1),
        }
    }

    #[test]
    fn artifact_spec_rejects_empty_filename() {
        assert!(ArtifactSpec::new("https://example.com/a.txt", "").is_err());
        assert!(ArtifactSpec::new("https://example.com/a.txt", "   ").is_err());
        assert!(ArtifactSpec::new("https://example.com/a.txt", "a.txt").is_ok());
    }

    #[test]
    fn step_kind_display_names_artifacts() {
        assert_eq!(StepKind::SetTimezone.to_string(), "set-timezone");
        assert_eq!(
            StepKind::FetchArtifact("youtube.py".into()).to_string(),
            "fetch-artifact:youtube.py"
        );
        assert_eq!(
            StepKind::InstallRequirements("requirements.txt".into()).to_string(),
            "install-requirements:requirements.txt"
        );
    }

    #[test]
    fn report_degraded_tracks_failures() {
        let mut report = BootstrapReport::new();
        report.record(outcome(StepKind::SetTimezone, StepStatus::Completed));
        assert!(!report.degraded());

        report.record(outcome(
            StepKind::RefreshPackageIndex,
            StepStatus::Failed("apt-get exited with status 100".into()),
        ));
        assert!(report.degraded());
        assert_eq!(report.failed_steps().count(), 1);
    }

    #[test]
    fn report_preserves_step_order() {
        let mut report = BootstrapReport::new();
        report.record(outcome(StepKind::SetTimezone, StepStatus::Completed));
        report.record(outcome(StepKind::EnterWorkdir, StepStatus::Completed));
        let kinds: Vec<_> = report.steps.iter().map(|s| s.kind.clone()).collect();
        assert_eq!(kinds, vec![StepKind::SetTimezone, StepKind::EnterWorkdir]);
    }

    #[test]
    fn job_status_success_check() {
        assert!(JobStatus::Success.is_success());
        assert!(!JobStatus::Failed(3).is_success());
        assert!(!JobStatus::Signaled.is_success());
        assert_eq!(JobStatus::Failed(3).to_string(), "exit code 3");
    }
}
