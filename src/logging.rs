/// Diagnostic sink: one timestamped line per event on stdout.
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Local wall-clock timestamps with millisecond precision.
struct LocalMillis;

impl FormatTime for LocalMillis {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// Default filter directive for the given verbosity flags.
fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "picmd=warn"
    } else if verbose {
        "picmd=debug"
    } else {
        "picmd=info"
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the flags.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalMillis)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}
