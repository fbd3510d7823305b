//! Build outcome fan-out.
//!
//! The coordinator reports to a single [`Observer`]; [`ObserverSet`] fans
//! that out. Observers are passive: they never call back into the
//! coordinator, and they must return quickly (queue or drop, never block).
//!
//! | Observer             | Sink                                   |
//! |----------------------|----------------------------------------|
//! | `TerminalObserver`   | `WatchStatus` block in the terminal    |
//! | `LiveReloadObserver` | WebSocket clients of the preview page  |

mod live_reload;
mod terminal;

pub use live_reload::LiveReloadObserver;
pub use terminal::TerminalObserver;

use std::path::Path;

use crate::pipeline::BuildAttempt;

/// Receives build lifecycle notifications.
pub trait Observer: Send + Sync {
    fn on_build_start(&self);
    fn on_build_result(&self, attempt: &BuildAttempt);
    /// The config file changed; nothing rebuilds until the session restarts.
    fn on_restart_required(&self, path: &Path);
}

/// Calls every registered observer in registration order.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn Observer>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: impl Observer + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Observer for ObserverSet {
    fn on_build_start(&self) {
        for observer in &self.observers {
            observer.on_build_start();
        }
    }

    fn on_build_result(&self, attempt: &BuildAttempt) {
        for observer in &self.observers {
            observer.on_build_result(attempt);
        }
    }

    fn on_restart_required(&self, path: &Path) {
        for observer in &self.observers {
            observer.on_restart_required(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Observer for Recorder {
        fn on_build_start(&self) {
            self.0.lock().push("start".into());
        }
        fn on_build_result(&self, attempt: &BuildAttempt) {
            self.0.lock().push(format!("result:{}", attempt.succeeded));
        }
        fn on_restart_required(&self, path: &Path) {
            self.0.lock().push(format!("restart:{}", path.display()));
        }
    }

    #[test]
    fn test_fan_out_in_order() {
        let first = Recorder::default();
        let second = Recorder::default();
        let set = ObserverSet::new().with(first.clone()).with(second.clone());
        assert_eq!(set.len(), 2);

        set.on_build_start();
        set.on_build_result(&BuildAttempt::crashed("boom"));
        set.on_restart_required(Path::new("crown.toml"));

        let expected = ["start", "result:false", "restart:crown.toml"];
        assert_eq!(*first.0.lock(), expected);
        assert_eq!(*second.0.lock(), expected);
    }

    #[test]
    fn test_empty_set_is_fine() {
        let set = ObserverSet::new();
        assert!(set.is_empty());
        set.on_build_start();
        set.on_restart_required(Path::new("crown.toml"));
    }
}
