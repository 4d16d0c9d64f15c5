/// Edge notification filter: turns raw interrupts into accepted trigger events.
use crate::trigger::{Level, TriggerState};
use std::sync::Arc;
use tracing::info;

/// Anything that can report the current logical level of the monitored line.
pub trait LevelReader {
    fn read_level(&self) -> Level;
}

/// Why an edge notification was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// An event is already pending or its command is still running.
    Pending,
    /// The line had settled away from the target level by the time we sampled it.
    LevelMismatch(Level),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    Accepted,
    Ignored(IgnoreReason),
}

pub struct SignalMonitor {
    state: Arc<TriggerState>,
}

impl SignalMonitor {
    pub fn new(state: Arc<TriggerState>) -> Self {
        Self { state }
    }

    /// Handle one edge notification from the interrupt context.
    ///
    /// Never blocks beyond a single level sample and always logs exactly one
    /// ACCEPTED or IGNORED line.
    pub fn on_edge<R: LevelReader + ?Sized>(&self, line: &R) -> EdgeOutcome {
        let outcome = self.evaluate(line);
        let pin = self.state.pin();
        match outcome {
            EdgeOutcome::Accepted => {
                info!(pin, "edge ACCEPTED");
            }
            EdgeOutcome::Ignored(IgnoreReason::Pending) => {
                self.state.record_ignored();
                info!(pin, reason = "pending", "edge IGNORED");
            }
            EdgeOutcome::Ignored(IgnoreReason::LevelMismatch(level)) => {
                self.state.record_ignored();
                info!(
                    pin,
                    reason = "level",
                    sampled = %level,
                    expected = %self.state.target_level(),
                    "edge IGNORED"
                );
            }
        }
        outcome
    }

    fn evaluate<R: LevelReader + ?Sized>(&self, line: &R) -> EdgeOutcome {
        // Re-entrancy guard: don't even touch the pin while an event is pending.
        if !self.state.is_armed() {
            return EdgeOutcome::Ignored(IgnoreReason::Pending);
        }

        let level = line.read_level();
        if level != self.state.target_level() {
            return EdgeOutcome::Ignored(IgnoreReason::LevelMismatch(level));
        }

        if self.state.disarm() {
            EdgeOutcome::Accepted
        } else {
            EdgeOutcome::Ignored(IgnoreReason::Pending)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;

    /// Test line with a fixed level that counts how often it was sampled.
    pub(crate) struct FakeLine {
        level: Cell<Level>,
        reads: Cell<u32>,
    }

    impl FakeLine {
        pub(crate) fn new(level: Level) -> Self {
            Self {
                level: Cell::new(level),
                reads: Cell::new(0),
            }
        }

        pub(crate) fn set(&self, level: Level) {
            self.level.set(level);
        }

        fn reads(&self) -> u32 {
            self.reads.get()
        }
    }

    impl LevelReader for FakeLine {
        fn read_level(&self) -> Level {
            self.reads.set(self.reads.get() + 1);
            self.level.get()
        }
    }

    fn monitor(level: Level) -> (SignalMonitor, Arc<TriggerState>) {
        let state = Arc::new(TriggerState::new(4, level));
        (SignalMonitor::new(Arc::clone(&state)), state)
    }

    #[test]
    fn test_matching_level_is_accepted_and_disarms() {
        let (monitor, state) = monitor(Level::High);
        let line = FakeLine::new(Level::High);

        assert_eq!(monitor.on_edge(&line), EdgeOutcome::Accepted);
        assert!(!state.is_armed());
        assert!(state.last_event().is_some());
    }

    #[test]
    fn test_mismatched_level_never_disarms() {
        let (monitor, state) = monitor(Level::High);
        let line = FakeLine::new(Level::Low);

        for _ in 0..5 {
            assert_eq!(
                monitor.on_edge(&line),
                EdgeOutcome::Ignored(IgnoreReason::LevelMismatch(Level::Low))
            );
        }
        assert!(state.is_armed());
        assert_eq!(state.accepted_count(), 0);
        assert_eq!(state.ignored_count(), 5);
    }

    #[test]
    fn test_low_target_accepts_low_level() {
        let (monitor, state) = monitor(Level::Low);
        let line = FakeLine::new(Level::Low);
        assert_eq!(monitor.on_edge(&line), EdgeOutcome::Accepted);
        assert!(!state.is_armed());
    }

    #[test]
    fn test_edges_while_pending_are_ignored_without_sampling() {
        let (monitor, state) = monitor(Level::High);
        let line = FakeLine::new(Level::High);

        assert_eq!(monitor.on_edge(&line), EdgeOutcome::Accepted);
        assert_eq!(line.reads(), 1);

        // Bounce: a burst of notifications, some at the target level.
        for level in [Level::High, Level::Low, Level::High, Level::High] {
            line.set(level);
            assert_eq!(
                monitor.on_edge(&line),
                EdgeOutcome::Ignored(IgnoreReason::Pending)
            );
        }
        assert_eq!(line.reads(), 1);
        assert!(!state.is_armed());
        assert_eq!(state.accepted_count(), 1);
        assert_eq!(state.ignored_count(), 4);
    }

    #[test]
    fn test_accepts_again_after_rearm() {
        let (monitor, state) = monitor(Level::High);
        let line = FakeLine::new(Level::High);

        assert_eq!(monitor.on_edge(&line), EdgeOutcome::Accepted);
        state.rearm();
        assert_eq!(monitor.on_edge(&line), EdgeOutcome::Accepted);
        assert_eq!(state.accepted_count(), 2);
    }
}
