use std::time::{Duration, Instant};

/// Idle sleep when nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

/// Pure debouncer: timing only, no classification or global state.
///
/// Every `notify` restarts the window and replaces the pending event, so a
/// burst collapses into its last event, released once `delay` has passed
/// since the final `notify`. Earlier events of the burst are discarded.
pub(super) struct Debouncer<T> {
    delay: Duration,
    pub(super) pending: Option<T>,
    pub(super) last_event: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            last_event: None,
        }
    }

    pub(super) fn notify(&mut self, event: T) {
        self.notify_at(event, Instant::now());
    }

    pub(super) fn notify_at(&mut self, event: T, now: Instant) {
        self.pending = Some(event);
        self.last_event = Some(now);
    }

    /// Release the pending event if the window has closed.
    pub(super) fn take_if_ready(&mut self) -> Option<T> {
        self.take_if_ready_at(Instant::now())
    }

    pub(super) fn take_if_ready_at(&mut self, now: Instant) -> Option<T> {
        let last_event = self.last_event?;
        if now.saturating_duration_since(last_event) < self.delay {
            return None;
        }
        self.last_event = None;
        self.pending.take()
    }

    /// Precise sleep duration until the pending event is due.
    pub(super) fn sleep_duration(&self) -> Duration {
        self.sleep_duration_at(Instant::now())
    }

    pub(super) fn sleep_duration_at(&self, now: Instant) -> Duration {
        let Some(last_event) = self.last_event else {
            return IDLE;
        };
        self.delay
            .saturating_sub(now.saturating_duration_since(last_event))
            .max(Duration::from_millis(1))
    }
}
