//! Artifact download tests: renamed destinations, unconditional overwrite,
//! and status-checked writes.

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vmboot_core::fetch::{ArtifactFetcher, FetchError};
use vmboot_types::ArtifactSpec;

#[tokio::test]
async fn downloads_under_the_configured_local_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/requirements.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("requests==2.22\n"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = ArtifactFetcher::new(None).unwrap();
    let artifact = ArtifactSpec::new(
        format!("{}/requirements.txt", server.uri()),
        "youtube_requirements.txt",
    )
    .unwrap();

    let written = fetcher.fetch(&artifact, dir.path()).await.unwrap();

    assert_eq!(written, dir.path().join("youtube_requirements.txt"));
    assert_eq!(
        std::fs::read_to_string(written).unwrap(),
        "requests==2.22\n"
    );
}

#[tokio::test]
async fn overwrites_previous_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collector.py"))
        .respond_with(ResponseTemplate::new(200).set_body_string("new body"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("collector.py");
    std::fs::write(&dest, "an older and much longer body from a previous run").unwrap();

    let fetcher = ArtifactFetcher::new(None).unwrap();
    let artifact =
        ArtifactSpec::new(format!("{}/collector.py", server.uri()), "collector.py").unwrap();
    fetcher.fetch(&artifact, dir.path()).await.unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "new body");
}

#[tokio::test]
async fn error_status_leaves_previous_copy_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collector.py"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("collector.py");
    std::fs::write(&dest, "previous run").unwrap();

    let fetcher = ArtifactFetcher::new(None).unwrap();
    let artifact =
        ArtifactSpec::new(format!("{}/collector.py", server.uri()), "collector.py").unwrap();
    let err = fetcher.fetch(&artifact, dir.path()).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 404));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "previous run");
}

#[tokio::test]
async fn connection_failure_is_a_request_error() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = ArtifactFetcher::new(None).unwrap();
    // Port 9 (discard) is not listening.
    let artifact = ArtifactSpec::new("http://127.0.0.1:9/file.txt", "file.txt").unwrap();

    let err = fetcher.fetch(&artifact, dir.path()).await.unwrap_err();
    assert!(matches!(err, FetchError::Request { .. }));
    assert!(!dir.path().join("file.txt").exists());
}
