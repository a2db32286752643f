//! Job Runner capability.
//!
//! The delegated program is external code fetched at runtime; the only
//! contract this system holds is `-c <value>` plus its exit status. The
//! trait keeps that contract mockable so the sequence is testable without a
//! real program or network.

use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;

use vmboot_types::JobStatus;

use crate::process::{SessionGuard, isolate_session};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },
}

/// Runs the delegated program once with the forwarded argument.
pub trait JobRunner {
    fn run(&self, argument: &str) -> impl Future<Output = Result<JobStatus, JobError>>;
}

/// Launches `<interpreter> <entry> -c <argument>` in the working directory
/// with inherited stdio, the way the original bootstrap invoked the
/// collector. The argument is forwarded verbatim, empty or not; the
/// program's own parser decides what to accept.
#[derive(Debug, Clone)]
pub struct ProcessJobRunner {
    interpreter: String,
    entry: String,
    workdir: PathBuf,
}

impl ProcessJobRunner {
    pub fn new(
        interpreter: impl Into<String>,
        entry: impl Into<String>,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            entry: entry.into(),
            workdir: workdir.into(),
        }
    }
}

impl JobRunner for ProcessJobRunner {
    async fn run(&self, argument: &str) -> Result<JobStatus, JobError> {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(&self.entry)
            .arg("-c")
            .arg(argument)
            .current_dir(&self.workdir);
        isolate_session(&mut cmd);

        let child = cmd.spawn().map_err(|source| JobError::Spawn {
            program: self.entry.clone(),
            source,
        })?;
        let mut guard = SessionGuard::new(child);

        let status = guard
            .child_mut()
            .wait()
            .await
            .map_err(|source| JobError::Wait {
                program: self.entry.clone(),
                source,
            })?;
        guard.disarm();

        Ok(match status.code() {
            Some(0) => JobStatus::Success,
            Some(code) => JobStatus::Failed(code),
            None => JobStatus::Signaled,
        })
    }
}
