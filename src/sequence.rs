//! Fixed color sequences for the `test`, `wheel` and `pulse` programs.
//!
//! Both runners block the calling thread and return once the sequence is
//! done or `running` goes false. Releasing the LED is left to the caller.

use crate::catalog::{self, NamedColor};
use crate::led::{LedSink, fade, hold};
use crate::{Color, is_running};
use rand::Rng;
use std::error::Error;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Show each color in order for `hold_for`.
///
/// Returns how many colors were shown (an interrupted hold still counts).
pub fn run_steps<L: LedSink + ?Sized>(
    led: &mut L,
    steps: &[NamedColor],
    hold_for: Duration,
    running: &AtomicBool,
) -> Result<usize, Box<dyn Error>> {
    let mut shown = 0;

    for step in steps {
        if !is_running(running) {
            break;
        }
        led.set_color(step.color)?;
        tracing::info!("{}", step.name);
        shown += 1;

        if !hold(hold_for, running) {
            break;
        }
    }

    Ok(shown)
}

/// Timing for one pulse: fade up from off, then back down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseTiming {
    pub fade_in: Duration,
    pub fade_out: Duration,
}

/// Pulse random colors from `colours`, one after another with no pause.
///
/// `cycles = None` keeps going until `running` is cleared.
/// Returns the number of completed pulses.
pub fn run_pulse<L, R>(
    led: &mut L,
    colours: &[NamedColor],
    rng: &mut R,
    timing: PulseTiming,
    cycles: Option<usize>,
    running: &AtomicBool,
) -> Result<usize, Box<dyn Error>>
where
    L: LedSink + ?Sized,
    R: Rng + ?Sized,
{
    let mut completed = 0;

    while is_running(running) && cycles.is_none_or(|limit| completed < limit) {
        let Some(pick) = catalog::choose(colours, rng) else {
            return Err("no colours to pulse".into());
        };
        tracing::info!("{}", pick.name);

        if !fade(led, Color::OFF, pick.color, timing.fade_in, running)? {
            break;
        }
        if !fade(led, pick.color, Color::OFF, timing.fade_out, running)? {
            break;
        }
        completed += 1;
    }

    Ok(completed)
}
