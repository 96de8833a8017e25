//! Shared building blocks for the RGB LED programs.
//!
//! This module provides what every subcommand needs:
//! - Pin configuration with our wiring defaults
//! - A normalized color type, decoupled from the GPIO crate
//! - Signal handling for clean shutdown
//!
//! It also re-exports the catalog, LED sink, sequence runner, tuner model
//! and terminal UI modules used by the main binary.

pub mod catalog;
pub mod led;
pub mod sequence;
pub mod tui;
pub mod tuner;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Pin configuration ──────────────────────────────────────────────

/// Which BCM GPIO pins the LED legs are wired to, and how.
///
/// # Rust concept: derive macros
/// `Clone, Copy` make this cheaply copyable (three bytes, a bool and a float).
/// `Debug` gives us `{:?}` formatting. `PartialEq` lets us compare in tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinConfig {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// `true` for a common cathode LED (pin high = lit).
    /// Common anode LEDs are lit when the pin is low.
    pub active_high: bool,
    /// Software PWM frequency in Hz.
    pub pwm_frequency: f64,
}

impl PinConfig {
    /// Pins in red, green, blue order.
    pub fn pins(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// Map a drive intensity to the duty cycle the pin must output.
    pub fn duty_cycle(&self, intensity: f32) -> f64 {
        let intensity = f64::from(intensity.clamp(0.0, 1.0));
        if self.active_high {
            intensity
        } else {
            1.0 - intensity
        }
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            red: 13,
            green: 19,
            blue: 26,
            active_high: true,
            pwm_frequency: 100.0,
        }
    }
}

// ── Color ──────────────────────────────────────────────────────────

/// Relative intensity per channel, each in `0.0..=1.0`.
///
/// Our own type rather than a tuple, so the clamping rule lives in one
/// place and the hardware boundary converts from it explicitly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const OFF: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Build a color, clamping each channel into `0.0..=1.0`.
    ///
    /// # Rust concept: const fn
    /// `const fn` can run at compile time, so the catalog tables can be
    /// built from it in `static` items.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Linear interpolation: `t = 0.0` is `self`, `t = 1.0` is `other`.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Channels in red, green, blue order.
    pub fn channels(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

// ── Signal handling ────────────────────────────────────────────────

/// Set up a handler that sets `running` to false on Ctrl+C, SIGTERM or SIGHUP.
///
/// # Rust concept: Arc and AtomicBool
/// We need to share the `running` flag between the main loop and the
/// signal handler thread. `Arc` lets both own it, `AtomicBool` makes
/// reads and writes safe without a mutex.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone(); // Clone the Arc, not the bool; both point to the same flag

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    Ok(running)
}

/// Check if the main loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────
