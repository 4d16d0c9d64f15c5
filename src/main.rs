mod cli;
mod command;
mod config;
mod dispatch;
mod gpio;
mod logging;
mod monitor;
mod trigger;

use clap::Parser;
use cli::Cli;
use command::ShellRunner;
use config::Settings;
use dispatch::DispatchLoop;
use monitor::SignalMonitor;
use std::process::ExitCode;
use std::sync::Arc;
use trigger::TriggerState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Wrong argument count prints usage and exits non-zero before any GPIO setup.
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.quiet);
    tracing::debug!(?cli, "parsed CLI arguments");

    let (settings, warnings) = Settings::from_cli(&cli);
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        pin = settings.pin,
        signal = settings.target_level.as_signal(),
        edge = %settings.edge,
        command = %settings.command,
        "picmd v{} starting",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        press_delay_ms = settings.press_delay.as_millis() as u64,
        loop_delay_ms = settings.loop_delay.as_millis() as u64,
        timeout_secs = ?settings.command_timeout.map(|t| t.as_secs()),
        "timing"
    );

    if cli.dry_run {
        println!("Dry run mode: arguments validated, GPIO not touched.");
        println!("{settings:#?}");
        return ExitCode::SUCCESS;
    }

    let state = Arc::new(TriggerState::new(settings.pin, settings.target_level));
    let monitor = SignalMonitor::new(Arc::clone(&state));

    let _edge_thread = match gpio::start(&settings, monitor) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    let dispatch = DispatchLoop::new(
        state,
        ShellRunner::new(settings.command_timeout),
        settings.command,
        settings.press_delay,
        settings.loop_delay,
    );
    dispatch.run().await;

    ExitCode::SUCCESS
}
