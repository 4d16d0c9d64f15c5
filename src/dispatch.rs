/// The dispatch loop: polls the trigger state and runs the command on the main
/// context, then holds the quiescence window before re-arming.
use crate::command::{CommandError, CommandOutcome, CommandRunner};
use crate::trigger::TriggerState;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Timing of one completed dispatch cycle.
#[derive(Debug)]
#[allow(dead_code)]
pub struct DispatchReport {
    pub started: Instant,
    /// When the command returned (or failed to run).
    pub finished: Instant,
    pub rearmed: Instant,
    pub succeeded: bool,
}

pub struct DispatchLoop<C> {
    state: Arc<TriggerState>,
    runner: C,
    command: String,
    press_delay: Duration,
    loop_delay: Duration,
}

impl<C: CommandRunner> DispatchLoop<C> {
    pub fn new(
        state: Arc<TriggerState>,
        runner: C,
        command: String,
        press_delay: Duration,
        loop_delay: Duration,
    ) -> Self {
        Self {
            state,
            runner,
            command,
            press_delay,
            loop_delay,
        }
    }

    /// Poll forever. Command failures are logged and never end the loop.
    pub async fn run(&self) {
        info!(
            pin = self.state.pin(),
            loop_delay_ms = self.loop_delay.as_millis() as u64,
            "dispatch loop started"
        );
        loop {
            if self.poll_once().await.is_some() {
                continue;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.loop_delay) => {}
                _ = self.state.woken() => {}
            }
        }
    }

    /// Inspect the trigger state once; if an event is pending, run the command,
    /// wait out the press delay and re-arm.
    pub async fn poll_once(&self) -> Option<DispatchReport> {
        if self.state.is_armed() {
            return None;
        }

        let pin = self.state.pin();
        self.state.record_dispatch();
        info!(
            pin,
            command = %self.command,
            edge_at = ?self.state.last_event(),
            dispatch = self.state.dispatch_count(),
            press_delay_ms = self.press_delay.as_millis() as u64,
            "signal received, dispatching"
        );

        let started = Instant::now();
        let result = self.runner.run(&self.command).await;
        let finished = Instant::now();
        let succeeded = log_result(&result);

        tokio::time::sleep(self.press_delay).await;
        self.state.rearm();
        let rearmed = Instant::now();
        info!(
            pin,
            accepted = self.state.accepted_count(),
            ignored = self.state.ignored_count(),
            "re-armed"
        );

        Some(DispatchReport {
            started,
            finished,
            rearmed,
            succeeded,
        })
    }
}

fn log_result(result: &Result<CommandOutcome, CommandError>) -> bool {
    match result {
        Ok(outcome) if outcome.success() => {
            info!(
                pid = outcome.pid,
                duration_ms = outcome.duration.as_millis() as u64,
                "command completed"
            );
            true
        }
        Ok(outcome) => {
            warn!(
                pid = outcome.pid,
                exit_code = ?outcome.exit_code,
                duration_ms = outcome.duration.as_millis() as u64,
                "command failed"
            );
            false
        }
        Err(e) => {
            error!(error = %e, "command could not be executed");
            false
        }
    }
}
