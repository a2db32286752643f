//! Session management for the delegated program's process.

use tokio::process::{Child, Command};

/// Kills the child's process group on drop unless it was disarmed after a
/// normal exit. Covers cancellation of the future that owns the wait.
pub(crate) struct SessionGuard {
    child: Option<Child>,
}

impl SessionGuard {
    pub(crate) fn new(child: Child) -> Self {
        Self { child: Some(child) }
    }

    pub(crate) fn child_mut(&mut self) -> &mut Child {
        self.child.as_mut().expect("child present until disarmed")
    }

    pub(crate) fn disarm(&mut self) {
        self.child = None;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };
        #[cfg(unix)]
        if let Some(pid) = child.id() {
            // The child leads its own session, so pid == process group id.
            unsafe {
                if libc::killpg(pid as i32, libc::SIGKILL) == -1 {
                    let _ = child.start_kill();
                }
            }
        }
        #[cfg(not(unix))]
        let _ = child.start_kill();
        let _ = child.try_wait();
    }
}

/// Place the child in its own session so the whole process group can be
/// killed via `killpg` in [`SessionGuard`].
#[cfg(unix)]
pub(crate) fn isolate_session(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    unsafe {
        cmd.as_std_mut().pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
pub(crate) fn isolate_session(_cmd: &mut Command) {}
