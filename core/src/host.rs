//! Host Control capability.
//!
//! Timezone, package management, and power-off are privileged actions. They
//! sit behind a trait so the bootstrap sequence can run against a recording
//! fake in tests and only touches the real system through [`SystemHost`].

use std::path::Path;
use std::process::ExitStatus;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: ExitStatus },
}

/// Privileged environment actions the bootstrap sequence depends on.
pub trait HostControl {
    fn set_timezone(&self, timezone: &str) -> impl Future<Output = Result<(), HostError>>;
    fn refresh_package_index(&self) -> impl Future<Output = Result<(), HostError>>;
    fn install_packages(&self, packages: &[String]) -> impl Future<Output = Result<(), HostError>>;
    fn install_requirements(
        &self,
        manifest: &Path,
        trusted_hosts: &[String],
    ) -> impl Future<Output = Result<(), HostError>>;
    fn shutdown(&self) -> impl Future<Output = Result<(), HostError>>;
}

/// Host control backed by the target image's system tools: `timedatectl`,
/// `apt-get` (non-interactive), `pip3`, and `shutdown`. Assumes the process
/// runs with sufficient privilege; command output is inherited so package
/// manager progress stays visible on the console.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl SystemHost {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn run_checked(program: &str, args: &[&str]) -> Result<(), HostError> {
        tracing::debug!(program, ?args, "running host command");
        let status = Command::new(program)
            .args(args)
            .status()
            .await
            .map_err(|source| HostError::Spawn {
                program: program.to_string(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(HostError::CommandFailed {
                program: program.to_string(),
                status,
            })
        }
    }
}

impl HostControl for SystemHost {
    async fn set_timezone(&self, timezone: &str) -> Result<(), HostError> {
        Self::run_checked("timedatectl", &["set-timezone", timezone]).await
    }

    async fn refresh_package_index(&self) -> Result<(), HostError> {
        Self::run_checked("apt-get", &["update", "-y"]).await
    }

    async fn install_packages(&self, packages: &[String]) -> Result<(), HostError> {
        let mut args = vec!["install", "-y"];
        args.extend(packages.iter().map(String::as_str));
        Self::run_checked("apt-get", &args).await
    }

    async fn install_requirements(
        &self,
        manifest: &Path,
        trusted_hosts: &[String],
    ) -> Result<(), HostError> {
        let manifest = manifest.to_string_lossy();
        let mut args = vec!["install", "-r", manifest.as_ref()];
        for host in trusted_hosts {
            args.push("--trusted-host");
            args.push(host.as_str());
        }
        Self::run_checked("pip3", &args).await
    }

    async fn shutdown(&self) -> Result<(), HostError> {
        Self::run_checked("shutdown", &["-h", "now"]).await
    }
}
