/// GPIO line setup and the interrupt thread that feeds the signal monitor.
///
/// The thread owns the input pin, blocks on the kernel's edge events and calls
/// `SignalMonitor::on_edge` for each one. It is the only interrupt context.
use crate::config::Settings;
use crate::monitor::SignalMonitor;
use std::thread::JoinHandle;

/// Fatal errors raised before the dispatch loop starts.
#[derive(Debug)]
pub enum StartupError {
    /// The GPIO peripheral, the pin, or its interrupt could not be set up.
    #[cfg(feature = "gpio")]
    Gpio {
        pin: u8,
        source: rppal::gpio::Error,
    },
    /// Built without the `gpio` feature.
    #[cfg(not(feature = "gpio"))]
    Unsupported,
    /// The interrupt thread could not be spawned.
    Thread { source: std::io::Error },
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "gpio")]
            StartupError::Gpio { pin, source } => {
                write!(f, "unable to set up GPIO pin {}: {}", pin, source)
            }
            #[cfg(not(feature = "gpio"))]
            StartupError::Unsupported => {
                write!(f, "built without GPIO support (enable the `gpio` feature)")
            }
            StartupError::Thread { source } => {
                write!(f, "failed to spawn interrupt thread: {}", source)
            }
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "gpio")]
            StartupError::Gpio { source, .. } => Some(source),
            #[cfg(not(feature = "gpio"))]
            StartupError::Unsupported => None,
            StartupError::Thread { source } => Some(source),
        }
    }
}

/// Configure the pin, register the edge interrupt and start the interrupt thread.
#[cfg(feature = "gpio")]
pub fn start(settings: &Settings, monitor: SignalMonitor) -> Result<JoinHandle<()>, StartupError> {
    let line = hw::open_line(settings)?;
    hw::spawn_edge_thread(line, monitor, settings.pin)
}

#[cfg(not(feature = "gpio"))]
pub fn start(
    _settings: &Settings,
    _monitor: SignalMonitor,
) -> Result<JoinHandle<()>, StartupError> {
    Err(StartupError::Unsupported)
}

#[cfg(feature = "gpio")]
mod hw {
    use super::StartupError;
    use crate::config::{Edge, Pull, Settings};
    use crate::monitor::{LevelReader, SignalMonitor};
    use crate::trigger::Level;
    use rppal::gpio::{Gpio, InputPin, Trigger};
    use std::thread::JoinHandle;
    use std::time::Duration;

    /// Back-off after a failed interrupt poll so a broken line doesn't spin.
    const POLL_ERROR_PAUSE: Duration = Duration::from_millis(500);

    impl LevelReader for InputPin {
        fn read_level(&self) -> Level {
            match self.read() {
                rppal::gpio::Level::High => Level::High,
                rppal::gpio::Level::Low => Level::Low,
            }
        }
    }

    fn trigger(edge: Edge) -> Trigger {
        match edge {
            Edge::Rising => Trigger::RisingEdge,
            Edge::Falling => Trigger::FallingEdge,
        }
    }

    pub(super) fn open_line(settings: &Settings) -> Result<InputPin, StartupError> {
        let pin = settings.pin;
        let gpio_err = |source| StartupError::Gpio { pin, source };

        let gpio = Gpio::new().map_err(gpio_err)?;
        let raw = gpio.get(pin).map_err(gpio_err)?;
        let mut line = match settings.pull {
            Pull::Up => raw.into_input_pullup(),
            Pull::Down => raw.into_input_pulldown(),
            Pull::Off => raw.into_input(),
        };
        line.set_interrupt(trigger(settings.edge), None)
            .map_err(gpio_err)?;

        tracing::info!(
            pin,
            edge = %settings.edge,
            pull = %settings.pull,
            "GPIO initialization done"
        );
        Ok(line)
    }

    pub(super) fn spawn_edge_thread(
        mut line: InputPin,
        monitor: SignalMonitor,
        pin: u8,
    ) -> Result<JoinHandle<()>, StartupError> {
        std::thread::Builder::new()
            .name("edge-irq".to_string())
            .spawn(move || loop {
                // Keep queued events: every edge gets its own ACCEPTED/IGNORED record.
                match line.poll_interrupt(false, None) {
                    Ok(Some(_event)) => {
                        monitor.on_edge(&line);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(pin, error = %e, "interrupt poll failed");
                        std::thread::sleep(POLL_ERROR_PAUSE);
                    }
                }
            })
            .map_err(|e| StartupError::Thread { source: e })
    }
}
