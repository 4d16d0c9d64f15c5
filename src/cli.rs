use crate::config::{Pull, DEFAULT_LOOP_DELAY_MS, DEFAULT_PRESS_DELAY_MS};
use clap::Parser;

const EXAMPLES: &str = "\
Examples:
  picmd 0 1 'sudo reboot'
  picmd 0 1 'sudo shutdown -h now'
  picmd 3 1 'date +\"%c button pressed\" >> /home/pi/btn.log'
  picmd 4 1 'echo gpio 4 rising... >> /home/pi/gpio.log'
  picmd 4 0 'echo gpio 4 falling... >> /home/pi/gpio.log'";

/// Listen on a GPIO pin and run a shell command once per debounced press.
///
/// Runs until killed (Ctrl-C or a signal).
#[derive(Parser, Debug)]
#[command(name = "picmd", version, about, after_help = EXAMPLES)]
pub struct Cli {
    /// GPIO pin to listen on (BCM numbering; invalid values fall back to 0)
    #[arg(value_name = "GPIO", allow_negative_numbers = true)]
    pub pin: String,

    /// Signal that triggers the command: 1 = rising/high, 0 = falling/low
    #[arg(value_name = "SIGNAL", allow_negative_numbers = true)]
    pub signal: String,

    /// Command passed verbatim to `sh -c`
    #[arg(value_name = "CMD")]
    pub command: String,

    /// Dead time after each command before the pin is re-armed
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_PRESS_DELAY_MS)]
    pub press_delay_ms: u64,

    /// Interval at which the dispatch loop checks for a pending press
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_LOOP_DELAY_MS)]
    pub loop_delay_ms: u64,

    /// Pull resistor for the input pin
    #[arg(long, value_enum, default_value_t = Pull::Up)]
    pub pull: Pull,

    /// Kill the command if it runs longer than this (default: wait forever)
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Validate arguments and print resolved settings, don't touch GPIO
    #[arg(long)]
    pub dry_run: bool,

    /// Extra logging (command pids, dispatch loop details)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_three_positionals_parse() {
        let cli = Cli::try_parse_from(["picmd", "4", "1", "echo fired"]).unwrap();
        assert_eq!(cli.pin, "4");
        assert_eq!(cli.signal, "1");
        assert_eq!(cli.command, "echo fired");
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_two_positionals_is_usage_error() {
        let err = Cli::try_parse_from(["picmd", "4", "1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        // Usage errors exit with a failure status.
        assert_ne!(err.exit_code(), 0);
        assert!(err.to_string().contains("Usage"));
    }

    #[test]
    fn test_four_positionals_is_usage_error() {
        let err = Cli::try_parse_from(["picmd", "4", "1", "true", "extra"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_negative_signal_is_accepted_as_value() {
        let cli = Cli::try_parse_from(["picmd", "4", "-1", "true"]).unwrap();
        assert_eq!(cli.signal, "-1");
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let err = Cli::try_parse_from(["picmd", "-v", "-q", "4", "1", "true"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }
}
