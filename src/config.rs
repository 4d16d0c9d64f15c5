use crate::cli::Cli;
use crate::trigger::Level;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_PIN: u8 = 0;
pub const DEFAULT_SIGNAL: u8 = 1;
pub const DEFAULT_PRESS_DELAY_MS: u64 = 1000;
pub const DEFAULT_LOOP_DELAY_MS: u64 = 50;

/// Pull resistor applied to the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Pull {
    Up,
    Down,
    Off,
}

impl fmt::Display for Pull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pull::Up => write!(f, "up"),
            Pull::Down => write!(f, "down"),
            Pull::Off => write!(f, "off"),
        }
    }
}

/// Which transition the interrupt is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// A high target waits for the line to rise, a low target for it to fall.
    pub fn towards(level: Level) -> Self {
        match level {
            Level::High => Edge::Rising,
            Level::Low => Edge::Falling,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Rising => write!(f, "rising"),
            Edge::Falling => write!(f, "falling"),
        }
    }
}

/// Resolved daemon settings, built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pin: u8,
    pub target_level: Level,
    pub edge: Edge,
    pub command: String,
    pub pull: Pull,
    pub press_delay: Duration,
    pub loop_delay: Duration,
    /// `None` waits for the command indefinitely.
    pub command_timeout: Option<Duration>,
}

/// An argument that was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgWarning {
    InvalidPin(String),
    InvalidSignal(String),
}

impl fmt::Display for ArgWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgWarning::InvalidPin(raw) => write!(
                f,
                "invalid gpio argument '{}', defaulting to GPIO '{}'",
                raw, DEFAULT_PIN
            ),
            ArgWarning::InvalidSignal(raw) => write!(
                f,
                "invalid gpio signal type '{}', allowed are '1' or '0', defaulting to '{}'",
                raw, DEFAULT_SIGNAL
            ),
        }
    }
}

impl Settings {
    /// Validate CLI input, substituting defaults for bad pin/signal values.
    pub fn from_cli(cli: &Cli) -> (Settings, Vec<ArgWarning>) {
        let mut warnings = Vec::new();

        let pin = parse_pin(&cli.pin).unwrap_or_else(|| {
            warnings.push(ArgWarning::InvalidPin(cli.pin.clone()));
            DEFAULT_PIN
        });
        let signal = parse_signal(&cli.signal).unwrap_or_else(|| {
            warnings.push(ArgWarning::InvalidSignal(cli.signal.clone()));
            DEFAULT_SIGNAL
        });
        let target_level = Level::from_signal(signal);

        let settings = Settings {
            pin,
            target_level,
            edge: Edge::towards(target_level),
            command: cli.command.clone(),
            pull: cli.pull,
            press_delay: Duration::from_millis(cli.press_delay_ms),
            loop_delay: Duration::from_millis(cli.loop_delay_ms),
            command_timeout: cli.timeout_secs.map(Duration::from_secs),
        };
        (settings, warnings)
    }
}

fn parse_pin(raw: &str) -> Option<u8> {
    raw.trim().parse().ok()
}

fn parse_signal(raw: &str) -> Option<u8> {
    match raw.trim() {
        "0" => Some(0),
        "1" => Some(1),
        _ => None,
    }
}
