//! Environment bootstrap for disposable collection VMs.
//!
//! The original deployment prepared each throwaway VM with a short shell
//! script: fix the timezone, install pip, download the collector and its
//! support library, install their dependencies, run the collector once, and
//! power the machine off. This crate reproduces that sequence with the
//! failure semantics made explicit:
//!
//! - Every preparation step is best-effort. A failure is logged and recorded
//!   in the [`BootstrapReport`](vmboot_types::BootstrapReport), and the
//!   sequence continues.
//! - The delegated program is the single hard-checked action. The host is
//!   shut down only when it exits successfully; otherwise the VM stays up so
//!   an operator can inspect it.
//!
//! Privileged environment actions go through the [`host::HostControl`]
//! capability and the delegated program through [`job::JobRunner`], so the
//! sequence itself runs unprivileged under test.

pub mod config;
pub mod fetch;
pub mod host;
pub mod job;
mod process;
pub mod runner;

pub use config::BootstrapConfig;
pub use runner::Bootstrap;
