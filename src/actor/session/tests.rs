use std::fs;
use std::time::Duration;

use crossbeam::channel::{Sender, unbounded};
use tempfile::TempDir;

use super::*;
use crate::config::TEST_REQUIRED_SECTIONS;
use crate::pipeline::BuildAttempt;

const WAIT: Duration = Duration::from_secs(10);

struct CountingPipeline(Sender<()>);

impl Pipeline for CountingPipeline {
    fn execute(&self) -> BuildAttempt {
        let _ = self.0.send(());
        let mut attempt = BuildAttempt::crashed("");
        attempt.errors.clear();
        attempt.succeeded = true;
        attempt
    }
}

fn project() -> (TempDir, Arc<CrownConfig>) {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("chapters")).unwrap();
    fs::create_dir_all(dir.path().join("templates")).unwrap();
    fs::write(dir.path().join("chapters/01.md"), "# One\n").unwrap();
    fs::write(dir.path().join("templates/layout.html"), "{{ title }}").unwrap();
    fs::write(dir.path().join("styles.css"), "body {}").unwrap();

    let path = dir.path().join("crown.toml");
    fs::write(
        &path,
        format!("[watch]\ndebounce_ms = 50\n\n{TEST_REQUIRED_SECTIONS}"),
    )
    .unwrap();
    let config = CrownConfig::from_path(&path).unwrap();
    (dir, Arc::new(config))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_initial_build_then_shutdown() {
    let (_dir, config) = project();
    let (builds_tx, builds) = unbounded();
    let (shutdown_tx, shutdown_rx) = unbounded();

    let session = WatchSession::with_config(config)
        .with_pipeline(Arc::new(CountingPipeline(builds_tx)))
        .with_shutdown_signal(shutdown_rx);
    let handle = tokio::spawn(session.run());

    builds.recv_timeout(WAIT).expect("initial build");
    shutdown_tx.send(()).unwrap();

    tokio::time::timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
    assert!(builds.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_content_edit_triggers_rebuild() {
    let (dir, config) = project();
    let (builds_tx, builds) = unbounded();
    let (shutdown_tx, shutdown_rx) = unbounded();

    let session = WatchSession::with_config(config)
        .with_pipeline(Arc::new(CountingPipeline(builds_tx)))
        .with_shutdown_signal(shutdown_rx);
    let handle = tokio::spawn(session.run());

    builds.recv_timeout(WAIT).expect("initial build");
    // Let the select loop start before editing
    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(dir.path().join("chapters/01.md"), "# One, revised\n").unwrap();

    let rebuilt = tokio::task::spawn_blocking(move || builds.recv_timeout(WAIT))
        .await
        .unwrap();
    assert!(rebuilt.is_ok(), "edit should trigger a rebuild");

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
}
