//! RGB LED demo programs
//!
//! Drives one RGB LED on three Raspberry Pi GPIO pins. Each subcommand is a
//! small program: open the LED, run, release the LED before exit.
//!
//! ## Programs
//! - `test`: red, green, blue, white; checks the wiring
//! - `wheel`: every catalog color in order
//! - `pulse`: random catalog colors fading up and down, until Ctrl+C
//! - `sandbox`: interactive per-channel tuner in the terminal
//!
//! ## Usage
//! ```sh
//! sudo ./target/release/rgb-led-rs wheel --hold 1
//! ./target/release/rgb-led-rs --dry-run pulse --count 3
//! ```

use clap::{Args, Parser, Subcommand};
use rgb_led_rs::catalog::{BRIGHT_COLOURS, TEST_COLOURS};
use rgb_led_rs::led::{LedSink, LogLed};
use rgb_led_rs::sequence::{self, PulseTiming};
use rgb_led_rs::{PinConfig, is_running, setup_signal_handler, tui};
use std::error::Error;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// RGB LED demo programs for Raspberry Pi
#[derive(Parser, Debug)]
#[command(name = "rgb-led-rs")]
#[command(about = "Drive an RGB LED on Raspberry Pi GPIO pins")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    pins: PinArgs,

    /// Log colors instead of driving GPIO pins
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    program: Program,
}

#[derive(Args, Debug)]
struct PinArgs {
    /// BCM pin for the red leg
    #[arg(long, default_value = "13", global = true)]
    red_pin: u8,

    /// BCM pin for the green leg
    #[arg(long, default_value = "19", global = true)]
    green_pin: u8,

    /// BCM pin for the blue leg
    #[arg(long, default_value = "26", global = true)]
    blue_pin: u8,

    /// LED shares its anode (lit when the pin is low)
    #[arg(long, global = true)]
    common_anode: bool,

    /// Software PWM frequency in Hz
    #[arg(long, default_value = "100", global = true)]
    pwm_frequency: f64,
}

impl PinArgs {
    fn config(&self) -> PinConfig {
        PinConfig {
            red: self.red_pin,
            green: self.green_pin,
            blue: self.blue_pin,
            active_high: !self.common_anode,
            pwm_frequency: self.pwm_frequency,
        }
    }
}

#[derive(Subcommand, Debug, PartialEq)]
enum Program {
    /// Show red, green, blue and white to check the wiring
    Test {
        /// Seconds to hold each color
        #[arg(long, default_value = "2", value_parser = parse_seconds)]
        hold: Duration,
    },
    /// Step through the bright color catalog in order
    Wheel {
        /// Seconds to hold each color
        #[arg(long, default_value = "2", value_parser = parse_seconds)]
        hold: Duration,
    },
    /// Fade random catalog colors up and down
    Pulse {
        /// Seconds to fade up
        #[arg(long, default_value = "5", value_parser = parse_seconds)]
        fade_in: Duration,

        /// Seconds to fade down
        #[arg(long, default_value = "5", value_parser = parse_seconds)]
        fade_out: Duration,

        /// Stop after this many pulses (default: run until interrupted)
        #[arg(long)]
        count: Option<usize>,
    },
    /// Tune each channel interactively with the arrow keys
    Sandbox,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{e}"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let running = setup_signal_handler()?;
    let mut led = open_led(&cli)?;

    run_with(&cli.program, &mut *led, &running)?;

    if !is_running(&running) {
        tracing::info!("Shutting down cleanly.");
    }
    Ok(())
}

/// Run `program` and release `led` afterwards, whatever the outcome.
fn run_with(
    program: &Program,
    led: &mut dyn LedSink,
    running: &AtomicBool,
) -> Result<(), Box<dyn Error>> {
    let result = run_program(program, led, running);

    // Release even when the program failed, then report the first error
    let released = led.release();
    result?;
    released
}

fn open_led(cli: &Cli) -> Result<Box<dyn LedSink>, Box<dyn Error>> {
    if cli.dry_run {
        tracing::info!("Dry run: colors are logged at debug level, no GPIO is used");
        return Ok(Box::new(LogLed::new()));
    }

    let config = cli.pins.config();
    tracing::info!(
        "LED on GPIO {}/{}/{} ({}), PWM {} Hz",
        config.red,
        config.green,
        config.blue,
        if config.active_high {
            "common cathode"
        } else {
            "common anode"
        },
        config.pwm_frequency
    );
    open_hardware(config)
}

#[cfg(feature = "hardware")]
fn open_hardware(config: PinConfig) -> Result<Box<dyn LedSink>, Box<dyn Error>> {
    Ok(Box::new(rgb_led_rs::led::RgbLed::new(config)?))
}

#[cfg(not(feature = "hardware"))]
fn open_hardware(_config: PinConfig) -> Result<Box<dyn LedSink>, Box<dyn Error>> {
    Err("built without the 'hardware' feature; use --dry-run or build with default features".into())
}

fn run_program(
    program: &Program,
    led: &mut dyn LedSink,
    running: &AtomicBool,
) -> Result<(), Box<dyn Error>> {
    match program {
        Program::Test { hold } => {
            sequence::run_steps(led, &TEST_COLOURS, *hold, running)?;
        }
        Program::Wheel { hold } => {
            sequence::run_steps(led, &BRIGHT_COLOURS, *hold, running)?;
        }
        Program::Pulse {
            fade_in,
            fade_out,
            count,
        } => {
            let timing = PulseTiming {
                fade_in: *fade_in,
                fade_out: *fade_out,
            };
            let mut rng = rand::thread_rng();
            sequence::run_pulse(led, &BRIGHT_COLOURS, &mut rng, timing, *count, running)?;
        }
        Program::Sandbox => tui::run_sandbox(led, running)?,
    }
    Ok(())
}
