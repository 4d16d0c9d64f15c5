/// Shared trigger state between the interrupt thread and the dispatch loop.
///
/// `armed` is the only value both sides write. It flips true→false in
/// `SignalMonitor::on_edge` and false→true in `DispatchLoop` after the
/// quiescence window, never anywhere else.
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use tokio::sync::Notify;

/// Logical level of the monitored line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Map the numeric signal argument (0 or 1) to a level.
    pub fn from_signal(signal: u8) -> Self {
        if signal == 0 {
            Level::Low
        } else {
            Level::High
        }
    }

    pub fn as_signal(self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

#[derive(Debug)]
pub struct TriggerState {
    armed: AtomicBool,
    pin: u8,
    target_level: Level,
    /// Unix milliseconds of the last accepted edge, 0 if none yet.
    last_event_ms: AtomicI64,
    accepted: AtomicU64,
    ignored: AtomicU64,
    dispatched: AtomicU64,
    wake: Notify,
}

impl TriggerState {
    pub fn new(pin: u8, target_level: Level) -> Self {
        Self {
            armed: AtomicBool::new(true),
            pin,
            target_level,
            last_event_ms: AtomicI64::new(0),
            accepted: AtomicU64::new(0),
            ignored: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            wake: Notify::new(),
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn target_level(&self) -> Level {
        self.target_level
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Atomically hand the pending event to the dispatch loop.
    ///
    /// Returns `false` if another caller already disarmed the state.
    pub(crate) fn disarm(&self) -> bool {
        let won = self
            .armed
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.last_event_ms
                .store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);
            self.accepted.fetch_add(1, Ordering::Relaxed);
            self.wake.notify_one();
        }
        won
    }

    pub(crate) fn rearm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    pub(crate) fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Timestamp of the last accepted edge, if any.
    pub fn last_event(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        match self.last_event_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => chrono::DateTime::from_timestamp_millis(ms),
        }
    }

    pub fn accepted_count(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn ignored_count(&self) -> u64 {
        self.ignored.load(Ordering::Relaxed)
    }

    pub fn dispatch_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Resolves once an edge has been accepted since the last wait.
    pub(crate) async fn woken(&self) {
        self.wake.notified().await;
    }
}
