use std::sync::atomic::{AtomicU8, Ordering};

use crate::config::Backpressure;

const IDLE: u8 = 0;
const BUILDING: u8 = 1;
/// Building, and at least one trigger arrived since the build started.
const BUILDING_DIRTY: u8 = 2;

/// What to do with a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// This caller moved the state `Idle → Building` and must run the build.
    Start,
    /// A build is running; one more will follow it.
    Deferred,
    /// A build is running; the trigger is discarded.
    Dropped,
}

/// The coordinator's only mutable state.
///
/// Every transition is a compare-and-swap. Only one caller can win
/// `Idle → Building`; everyone else fails closed into "already building".
#[derive(Debug, Default)]
pub struct BuildState(AtomicU8);

impl BuildState {
    pub const fn new() -> Self {
        Self(AtomicU8::new(IDLE))
    }

    #[cfg(test)]
    fn is_building(&self) -> bool {
        self.0.load(Ordering::Acquire) != IDLE
    }

    /// `Idle → Building`. False if a build is already running.
    pub fn try_begin(&self) -> bool {
        self.0
            .compare_exchange(IDLE, BUILDING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Decide a trigger's fate under `policy`.
    pub fn admit(&self, policy: Backpressure) -> Admission {
        loop {
            if self.try_begin() {
                return Admission::Start;
            }
            if policy == Backpressure::Drop {
                return Admission::Dropped;
            }
            match self.0.compare_exchange(
                BUILDING,
                BUILDING_DIRTY,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Admission::Deferred,
                Err(BUILDING_DIRTY) => return Admission::Deferred,
                // The build ended between the two swaps; try to start one.
                Err(_) => continue,
            }
        }
    }

    /// Called by the build task when a build ends.
    ///
    /// Returns `true` if a trigger arrived meanwhile: the state stays
    /// `Building` and the caller runs exactly one more build. Otherwise the
    /// state is back to `Idle`.
    pub fn finish(&self) -> bool {
        match self
            .0
            .compare_exchange(BUILDING, IDLE, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => false,
            Err(_) => self
                .0
                .compare_exchange(BUILDING_DIRTY, BUILDING, Ordering::AcqRel, Ordering::Acquire)
                .is_ok(),
        }
    }
}
