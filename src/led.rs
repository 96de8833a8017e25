//! LED sinks: where colors end up.
//!
//! The GPIO crate only builds on a Pi, so everything above this module talks
//! to the `LedSink` trait. `RgbLed` drives real pins through `rppal`'s
//! software PWM; `LogLed` just logs what it would have done, which is handy
//! for `--dry-run` on a laptop.
//!
//! ## Rust concepts
//! - Traits as seams between logic and hardware
//! - `Drop` as a safety net for cleanup
//! - `#[cfg(feature = ...)]` to compile hardware code only when available

use crate::{Color, is_running};
use std::error::Error;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::{Duration, Instant};

/// Frames per second used when fading between two colors.
pub const FADE_FPS: u32 = 25;

/// Longest single sleep while holding a color, so Ctrl+C is noticed quickly.
pub const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Something that can show an RGB color.
///
/// `release` must be called once before the process exits. Implementations
/// make a second call a no-op.
pub trait LedSink {
    fn set_color(&mut self, color: Color) -> Result<(), Box<dyn Error>>;

    fn release(&mut self) -> Result<(), Box<dyn Error>>;
}

// ── Hardware ─────────────────────────────────────────────────────────

/// Three GPIO pins driven with software PWM.
#[cfg(feature = "hardware")]
pub struct RgbLed {
    pins: Vec<rppal::gpio::OutputPin>,
    config: crate::PinConfig,
    released: bool,
}

#[cfg(feature = "hardware")]
impl RgbLed {
    /// Claim the three pins and switch the LED off.
    ///
    /// Fails when `/dev/gpiomem` is unavailable (not a Pi, or no permission)
    /// or a pin is already in use.
    pub fn new(config: crate::PinConfig) -> Result<Self, Box<dyn Error>> {
        let gpio = rppal::gpio::Gpio::new()?;
        let mut pins = Vec::with_capacity(3);

        for pin in config.pins() {
            let output = if config.active_high {
                gpio.get(pin)?.into_output_low()
            } else {
                gpio.get(pin)?.into_output_high()
            };
            tracing::debug!("GPIO {} initialized", pin);
            pins.push(output);
        }

        Ok(Self {
            pins,
            config,
            released: false,
        })
    }
}

#[cfg(feature = "hardware")]
impl LedSink for RgbLed {
    fn set_color(&mut self, color: Color) -> Result<(), Box<dyn Error>> {
        if self.released {
            return Err("LED already released".into());
        }

        for (pin, intensity) in self.pins.iter_mut().zip(color.channels()) {
            let duty = self.config.duty_cycle(intensity);
            pin.set_pwm_frequency(self.config.pwm_frequency, duty)?;
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), Box<dyn Error>> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        for pin in &mut self.pins {
            pin.clear_pwm()?;
            if self.config.active_high {
                pin.set_low();
            } else {
                pin.set_high();
            }
        }
        tracing::debug!("GPIO pins released");
        Ok(())
    }
}

#[cfg(feature = "hardware")]
impl Drop for RgbLed {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("Failed to release LED: {}", e);
        }
    }
}

// ── Dry run ──────────────────────────────────────────────────────────

/// Logs colors instead of driving pins.
#[derive(Default)]
pub struct LogLed {
    current: Option<Color>,
    released: bool,
}

impl LogLed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last color set, if any.
    pub fn current(&self) -> Option<Color> {
        self.current
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl LedSink for LogLed {
    fn set_color(&mut self, color: Color) -> Result<(), Box<dyn Error>> {
        if self.released {
            return Err("LED already released".into());
        }
        // Fades repeat the same frame a lot; only log changes
        if self.current != Some(color) {
            tracing::debug!(r = color.r, g = color.g, b = color.b, "led");
        }
        self.current = Some(color);
        Ok(())
    }

    fn release(&mut self) -> Result<(), Box<dyn Error>> {
        if !self.released {
            self.released = true;
            tracing::debug!("LED released");
        }
        Ok(())
    }
}

// ── Timing helpers ───────────────────────────────────────────────────

/// Sleep for `duration`, waking up regularly to check `running`.
///
/// Returns `false` if the wait was cut short. A duration too long to
/// represent as an `Instant` waits until `running` is cleared.
pub fn hold(duration: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now().checked_add(duration);
    loop {
        if !is_running(running) {
            return false;
        }
        let remaining = match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => SLEEP_SLICE,
        };
        if remaining.is_zero() {
            return true;
        }
        thread::sleep(remaining.min(SLEEP_SLICE));
    }
}

/// Number of frames a fade of `duration` takes. Always at least one.
pub fn fade_frames(duration: Duration) -> u32 {
    let frames = (duration.as_secs_f64() * f64::from(FADE_FPS)).round() as u32;
    frames.max(1)
}

/// Fade linearly from `from` to `to` over `duration`.
///
/// The last frame is exactly `to`. Returns `Ok(false)` if interrupted.
pub fn fade<L: LedSink + ?Sized>(
    led: &mut L,
    from: Color,
    to: Color,
    duration: Duration,
    running: &AtomicBool,
) -> Result<bool, Box<dyn Error>> {
    let frames = fade_frames(duration);
    let frame_duration = duration / frames;

    for frame in 1..=frames {
        if !is_running(running) {
            return Ok(false);
        }
        let color = if frame == frames {
            to
        } else {
            from.lerp(to, frame as f32 / frames as f32)
        };
        led.set_color(color)?;
        if !hold(frame_duration, running) {
            return Ok(false);
        }
    }
    Ok(true)
}

// ── Test support ─────────────────────────────────────────────────────

/// Remembers every color it was given.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingLed {
    pub colors: Vec<Color>,
    pub releases: usize,
}

#[cfg(test)]
impl LedSink for RecordingLed {
    fn set_color(&mut self, color: Color) -> Result<(), Box<dyn Error>> {
        self.colors.push(color);
        Ok(())
    }

    fn release(&mut self) -> Result<(), Box<dyn Error>> {
        self.releases += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::ZERO, 1)]
    #[case(Duration::from_millis(10), 1)]
    #[case(Duration::from_millis(200), 5)]
    #[case(Duration::from_secs(1), 25)]
    #[case(Duration::from_secs(5), 125)]
    fn test_fade_frames(#[case] duration: Duration, #[case] expected: u32) {
        assert_eq!(fade_frames(duration), expected);
    }

    #[test]
    fn zero_length_fade_jumps_to_target() {
        let running = AtomicBool::new(true);
        let mut led = RecordingLed::default();
        let done = fade(&mut led, Color::OFF, Color::WHITE, Duration::ZERO, &running).unwrap();
        assert!(done);
        assert_eq!(led.colors, vec![Color::WHITE]);
    }

    #[test]
    fn fade_steps_evenly_and_ends_on_target() {
        let running = AtomicBool::new(true);
        let mut led = RecordingLed::default();
        let target = Color::new(1.0, 0.5, 0.0);
        // 4 frames at 25 fps
        let done = fade(&mut led, Color::OFF, target, Duration::from_millis(160), &running).unwrap();
        assert!(done);
        assert_eq!(
            led.colors,
            vec![
                Color::new(0.25, 0.125, 0.0),
                Color::new(0.5, 0.25, 0.0),
                Color::new(0.75, 0.375, 0.0),
                target,
            ]
        );
    }

    #[test]
    fn fade_stops_when_not_running() {
        let running = AtomicBool::new(false);
        let mut led = RecordingLed::default();
        let done = fade(&mut led, Color::OFF, Color::WHITE, Duration::ZERO, &running).unwrap();
        assert!(!done);
        assert!(led.colors.is_empty());
    }

    #[test]
    fn hold_returns_early_when_stopped() {
        let running = AtomicBool::new(false);
        let start = Instant::now();
        assert!(!hold(Duration::from_secs(10), &running));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn hold_accepts_durations_past_the_end_of_time() {
        let running = AtomicBool::new(false);
        assert!(!hold(Duration::MAX, &running));
        assert!(!hold(Duration::from_secs(10_000_000_000_000_000_000), &running));
    }

    #[test]
    fn endless_hold_ends_when_flag_is_cleared() {
        let running = std::sync::Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(120));
            flag.store(false, std::sync::atomic::Ordering::SeqCst);
        });

        assert!(!hold(Duration::MAX, &running));
        stopper.join().unwrap();
    }

    #[test]
    fn huge_fade_stops_when_not_running() {
        let running = AtomicBool::new(false);
        let mut led = RecordingLed::default();
        let done = fade(&mut led, Color::OFF, Color::WHITE, Duration::MAX, &running).unwrap();
        assert!(!done);
    }

    #[test]
    fn hold_waits_full_duration() {
        let running = AtomicBool::new(true);
        let start = Instant::now();
        assert!(hold(Duration::from_millis(60), &running));
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn log_led_tracks_current_color() {
        let mut led = LogLed::new();
        assert_eq!(led.current(), None);
        led.set_color(Color::WHITE).unwrap();
        assert_eq!(led.current(), Some(Color::WHITE));
    }

    #[test]
    fn log_led_release_is_idempotent() {
        let mut led = LogLed::new();
        led.release().unwrap();
        led.release().unwrap();
        assert!(led.is_released());
    }

    #[test]
    fn log_led_rejects_colors_after_release() {
        let mut led = LogLed::new();
        led.release().unwrap();
        assert!(led.set_color(Color::WHITE).is_err());
    }
}
