use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender, unbounded};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::*;
use crate::actor::fs::ChangeKind;

const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(150);

/// Pipeline that blocks until the test releases it, recording overlap.
struct GatedPipeline {
    release: Receiver<bool>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    runs: AtomicUsize,
}

impl Pipeline for GatedPipeline {
    fn execute(&self) -> BuildAttempt {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.runs.fetch_add(1, Ordering::SeqCst);

        let succeeded = self.release.recv().unwrap_or(true);

        self.active.fetch_sub(1, Ordering::SeqCst);
        let mut attempt = BuildAttempt::crashed("render failed");
        if succeeded {
            attempt.errors.clear();
        }
        attempt.succeeded = succeeded;
        attempt
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Seen {
    Start,
    Result(bool),
    Restart(PathBuf),
}

struct Recorder(UnboundedSender<Seen>);

impl Observer for Recorder {
    fn on_build_start(&self) {
        let _ = self.0.send(Seen::Start);
    }
    fn on_build_result(&self, attempt: &BuildAttempt) {
        let _ = self.0.send(Seen::Result(attempt.succeeded));
    }
    fn on_restart_required(&self, path: &Path) {
        let _ = self.0.send(Seen::Restart(path.to_path_buf()));
    }
}

struct Harness {
    tx: mpsc::Sender<CoordinatorMsg>,
    seen: UnboundedReceiver<Seen>,
    release: Sender<bool>,
    pipeline: Arc<GatedPipeline>,
    stopping: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Harness {
    fn start(policy: Backpressure) -> Self {
        let (tx, rx) = mpsc::channel(32);
        let (seen_tx, seen) = unbounded_channel();
        let (release, release_rx) = unbounded();
        let pipeline = Arc::new(GatedPipeline {
            release: release_rx,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            runs: AtomicUsize::new(0),
        });

        let coordinator = BuildCoordinator::new(
            rx,
            pipeline.clone(),
            Arc::new(Recorder(seen_tx)),
            policy,
        );
        let stopping = coordinator.stop_flag();
        let handle = tokio::spawn(coordinator.run());

        Self {
            tx,
            seen,
            release,
            pipeline,
            stopping,
            handle,
        }
    }

    async fn trigger(&self, category: Category, path: &str) {
        let event = ChangeEvent::new(category, path, ChangeKind::Modified);
        self.tx.send(CoordinatorMsg::Trigger(event)).await.unwrap();
    }

    /// Round-trip a config trigger so every earlier message is processed.
    async fn sync(&mut self) {
        self.trigger(Category::Config, "crown.toml").await;
        assert_eq!(self.next().await, Seen::Restart("crown.toml".into()));
    }

    async fn next(&mut self) -> Seen {
        tokio::time::timeout(WAIT, self.seen.recv())
            .await
            .expect("observer event")
            .expect("observer channel open")
    }

    async fn assert_quiet(&mut self) {
        assert!(
            tokio::time::timeout(QUIET, self.seen.recv()).await.is_err(),
            "unexpected observer event"
        );
    }

    fn release(&self, succeeded: bool) {
        self.release.send(succeeded).unwrap();
    }

    fn runs(&self) -> usize {
        self.pipeline.runs.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn test_trigger_runs_one_build() {
    let mut h = Harness::start(Backpressure::RebuildOnce);

    h.trigger(Category::Content, "chapters/01.md").await;
    assert_eq!(h.next().await, Seen::Start);
    h.release(true);
    assert_eq!(h.next().await, Seen::Result(true));

    h.assert_quiet().await;
    assert_eq!(h.runs(), 1);
}

#[tokio::test]
async fn test_config_trigger_while_idle_never_builds() {
    let mut h = Harness::start(Backpressure::RebuildOnce);

    h.sync().await;
    h.assert_quiet().await;
    assert_eq!(h.runs(), 0);
}

#[tokio::test]
async fn test_config_trigger_while_building() {
    let mut h = Harness::start(Backpressure::RebuildOnce);

    h.trigger(Category::Template, "templates/layout.html").await;
    assert_eq!(h.next().await, Seen::Start);

    h.trigger(Category::Config, "crown.toml").await;
    assert_eq!(h.next().await, Seen::Restart("crown.toml".into()));

    h.release(true);
    assert_eq!(h.next().await, Seen::Result(true));
    h.assert_quiet().await;
    assert_eq!(h.runs(), 1);
}

#[tokio::test]
async fn test_drop_policy_discards_triggers_during_build() {
    let mut h = Harness::start(Backpressure::Drop);

    h.trigger(Category::Content, "chapters/01.md").await;
    assert_eq!(h.next().await, Seen::Start);

    for category in [Category::Content, Category::Style, Category::CustomLogic] {
        h.trigger(category, "x").await;
    }
    h.sync().await;

    h.release(true);
    assert_eq!(h.next().await, Seen::Result(true));
    h.assert_quiet().await;
    assert_eq!(h.runs(), 1);
}

#[tokio::test]
async fn test_rebuild_once_after_triggers_during_build() {
    let mut h = Harness::start(Backpressure::RebuildOnce);

    h.trigger(Category::Content, "chapters/01.md").await;
    assert_eq!(h.next().await, Seen::Start);

    for _ in 0..4 {
        h.trigger(Category::Content, "chapters/02.md").await;
    }
    h.sync().await;

    h.release(true);
    assert_eq!(h.next().await, Seen::Result(true));
    assert_eq!(h.next().await, Seen::Start);
    h.release(true);
    assert_eq!(h.next().await, Seen::Result(true));

    h.assert_quiet().await;
    assert_eq!(h.runs(), 2);
    assert_eq!(h.pipeline.max_active.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recovers_after_failed_build() {
    let mut h = Harness::start(Backpressure::RebuildOnce);

    h.trigger(Category::Content, "chapters/01.md").await;
    assert_eq!(h.next().await, Seen::Start);
    h.release(false);
    assert_eq!(h.next().await, Seen::Result(false));

    h.trigger(Category::Content, "chapters/01.md").await;
    assert_eq!(h.next().await, Seen::Start);
    h.release(true);
    assert_eq!(h.next().await, Seen::Result(true));
    assert_eq!(h.runs(), 2);
}

#[tokio::test]
async fn test_never_overlaps_under_trigger_storm() {
    let mut h = Harness::start(Backpressure::RebuildOnce);

    let senders: Vec<_> = (0..8)
        .map(|i| {
            let tx = h.tx.clone();
            tokio::spawn(async move {
                for j in 0..10 {
                    let event = ChangeEvent::new(
                        Category::Content,
                        format!("chapters/{i}-{j}.md"),
                        ChangeKind::Modified,
                    );
                    let _ = tx.send(CoordinatorMsg::Trigger(event)).await;
                }
            })
        })
        .collect();
    for sender in senders {
        sender.await.unwrap();
    }

    // Every trigger is handled once the config round-trip comes back; the
    // first build is still gated, so all the others found it running.
    h.trigger(Category::Config, "crown.toml").await;
    let mut seen = Vec::new();
    loop {
        match h.next().await {
            Seen::Restart(_) => break,
            other => seen.push(other),
        }
    }

    h.release(true);
    h.release(true);
    while let Ok(Some(event)) = tokio::time::timeout(QUIET, h.seen.recv()).await {
        seen.push(event);
    }

    assert_eq!(
        seen,
        [Seen::Start, Seen::Result(true), Seen::Start, Seen::Result(true)]
    );
    assert_eq!(h.runs(), 2);
    assert_eq!(h.pipeline.max_active.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shutdown_waits_for_in_flight_build() {
    let mut h = Harness::start(Backpressure::RebuildOnce);

    h.trigger(Category::Content, "chapters/01.md").await;
    assert_eq!(h.next().await, Seen::Start);
    h.tx.send(CoordinatorMsg::Shutdown).await.unwrap();

    tokio::time::sleep(QUIET).await;
    assert!(!h.handle.is_finished());

    h.release(true);
    tokio::time::timeout(WAIT, &mut h.handle).await.unwrap().unwrap();
    assert_eq!(h.next().await, Seen::Result(true));
}

#[tokio::test]
async fn test_stopping_skips_queued_rebuild() {
    let mut h = Harness::start(Backpressure::RebuildOnce);

    h.trigger(Category::Content, "chapters/01.md").await;
    assert_eq!(h.next().await, Seen::Start);
    h.trigger(Category::Content, "chapters/02.md").await;
    h.sync().await;

    h.stopping.store(true, Ordering::Release);
    h.tx.send(CoordinatorMsg::Shutdown).await.unwrap();
    h.release(true);

    tokio::time::timeout(WAIT, &mut h.handle).await.unwrap().unwrap();
    assert_eq!(h.next().await, Seen::Result(true));
    h.assert_quiet().await;
    assert_eq!(h.runs(), 1);
}

#[tokio::test]
async fn test_triggers_queued_before_shutdown_never_build() {
    let (tx, rx) = mpsc::channel(32);
    let (seen_tx, mut seen) = unbounded_channel();
    let (_release, release_rx) = unbounded();
    let pipeline = Arc::new(GatedPipeline {
        release: release_rx,
        active: AtomicUsize::new(0),
        max_active: AtomicUsize::new(0),
        runs: AtomicUsize::new(0),
    });
    let coordinator = BuildCoordinator::new(
        rx,
        pipeline.clone(),
        Arc::new(Recorder(seen_tx)),
        Backpressure::RebuildOnce,
    );

    for path in ["chapters/01.md", "styles.css"] {
        let event = ChangeEvent::new(Category::Content, path, ChangeKind::Modified);
        tx.send(CoordinatorMsg::Trigger(event)).await.unwrap();
    }
    tx.send(CoordinatorMsg::Shutdown).await.unwrap();
    coordinator.stop_flag().store(true, Ordering::Release);

    tokio::time::timeout(WAIT, coordinator.run()).await.unwrap();
    assert!(seen.try_recv().is_err());
    assert_eq!(pipeline.runs.load(Ordering::SeqCst), 0);
}
