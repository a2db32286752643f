//! Process job runner tests against a real interpreter (`sh`).

#![cfg(unix)]

use vmboot_core::job::{JobError, JobRunner, ProcessJobRunner};
use vmboot_types::JobStatus;

/// A stand-in collector: succeeds only when invoked as `-c ok`.
fn write_stub_collector(dir: &std::path::Path) {
    std::fs::write(
        dir.join("collector.sh"),
        "#!/bin/sh\n\
         [ \"$1\" = \"-c\" ] || exit 9\n\
         [ \"$2\" = \"ok\" ] && exit 0\n\
         exit 3\n",
    )
    .unwrap();
}

#[tokio::test]
async fn passes_argument_after_dash_c() {
    let dir = tempfile::tempdir().unwrap();
    write_stub_collector(dir.path());

    let runner = ProcessJobRunner::new("sh", "collector.sh", dir.path());
    assert_eq!(runner.run("ok").await.unwrap(), JobStatus::Success);
}

#[tokio::test]
async fn reports_nonzero_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    write_stub_collector(dir.path());

    let runner = ProcessJobRunner::new("sh", "collector.sh", dir.path());
    assert_eq!(runner.run("wrong").await.unwrap(), JobStatus::Failed(3));
}

#[tokio::test]
async fn missing_interpreter_is_a_spawn_error() {
    let dir = tempfile::tempdir().unwrap();

    let runner = ProcessJobRunner::new("vmboot-no-such-interpreter", "collector.sh", dir.path());
    let err = runner.run("ok").await.unwrap_err();
    assert!(matches!(err, JobError::Spawn { .. }));
}
