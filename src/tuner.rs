//! Model behind the interactive `sandbox` tuner.
//!
//! Three value boxes (red, green, blue) sit in a fixed ring. One of them has
//! focus; key presses become [`Command`]s that adjust the focused box or all
//! three. Rendering lives in [`crate::tui`], this module has no I/O.
//!
//! ## Rust concepts
//! - Fixed-size arrays with index arithmetic instead of linked references
//! - `enum` commands matched against key events
//! - Saturating integer arithmetic

use crate::Color;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ── Channels and boxes ───────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Red => "RED",
            Channel::Green => "GREEN",
            Channel::Blue => "BLUE",
        }
    }
}

/// Map an 8-bit value to a drive intensity with a fixed square curve.
pub fn drive(value: u8) -> f32 {
    let x = f32::from(value) / 255.0;
    x * x
}

/// Next multiple of five above `value`, capped at 255.
pub fn snap_up(value: u8) -> u8 {
    let snapped = (u16::from(value) + 5) / 5 * 5;
    snapped.min(255) as u8
}

/// Next multiple of five below `value`, floored at 0.
///
/// Rounds from `value - 1`, so 10 goes to 5 and 6 goes to 5.
pub fn snap_down(value: u8) -> u8 {
    match value {
        0 => 0,
        v => (v - 1) / 5 * 5,
    }
}

/// One channel's current setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueBox {
    pub channel: Channel,
    value: u8,
}

impl ValueBox {
    pub fn new(channel: Channel) -> Self {
        Self { channel, value: 0 }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// PWM duty cycle, `(value / 255)²`.
    pub fn drive(&self) -> f32 {
        drive(self.value)
    }

    pub fn set(&mut self, value: u8) {
        self.value = value;
    }

    /// Add `delta`, clamped to `0..=255`.
    pub fn step(&mut self, delta: i16) {
        self.value = (i16::from(self.value) + delta).clamp(0, 255) as u8;
    }

    pub fn snap(&mut self, direction: Direction) {
        self.value = match direction {
            Direction::Up => snap_up(self.value),
            Direction::Down => snap_down(self.value),
        };
    }
}

// ── Ring ─────────────────────────────────────────────────────────────

/// The three boxes in red → green → blue → red order, with one focused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxRing {
    boxes: [ValueBox; 3],
    active: usize,
}

impl BoxRing {
    /// All values at zero, red focused.
    pub fn new() -> Self {
        Self {
            boxes: Channel::ALL.map(ValueBox::new),
            active: 0,
        }
    }

    pub fn next_index(index: usize) -> usize {
        (index + 1) % 3
    }

    pub fn previous_index(index: usize) -> usize {
        (index + 2) % 3
    }

    pub fn boxes(&self) -> &[ValueBox; 3] {
        &self.boxes
    }

    pub fn active(&self) -> &ValueBox {
        &self.boxes[self.active]
    }

    pub fn is_active(&self, index: usize) -> bool {
        index == self.active
    }

    pub fn focus_next(&mut self) {
        self.active = Self::next_index(self.active);
    }

    pub fn focus_previous(&mut self) {
        self.active = Self::previous_index(self.active);
    }

    /// Boxes a command with `scope` applies to.
    fn targets(&mut self, scope: Scope) -> &mut [ValueBox] {
        match scope {
            Scope::Active => std::slice::from_mut(&mut self.boxes[self.active]),
            Scope::All => &mut self.boxes[..],
        }
    }

    /// 8-bit values in red, green, blue order.
    pub fn values(&self) -> [u8; 3] {
        self.boxes.map(|b| b.value())
    }

    /// What the LED should show right now.
    pub fn drive_color(&self) -> Color {
        let [r, g, b] = self.boxes.map(|b| b.drive());
        Color::new(r, g, b)
    }
}

impl Default for BoxRing {
    fn default() -> Self {
        Self::new()
    }
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Only the focused box.
    Active,
    /// Every box, each clamped on its own.
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Everything a key press can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    FocusPrevious,
    FocusNext,
    /// Add ±1.
    Step(Scope, Direction),
    /// Move to the next multiple of five.
    Snap(Scope, Direction),
    /// Jump to 255 (`Up`) or 0 (`Down`).
    Jump(Scope, Direction),
    Quit,
}

impl Command {
    /// Translate a key press. Unmapped keys give `None`.
    ///
    /// Modifiers other than Shift and Ctrl are ignored.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let scope = if ctrl { Scope::All } else { Scope::Active };

        let command = match key.code {
            KeyCode::Char('c') if ctrl => Command::Quit,
            KeyCode::Char('q') if !ctrl => Command::Quit,
            KeyCode::Left => Command::FocusPrevious,
            KeyCode::Right => Command::FocusNext,
            KeyCode::Up if shift => Command::Snap(scope, Direction::Up),
            KeyCode::Down if shift => Command::Snap(scope, Direction::Down),
            KeyCode::Up => Command::Step(scope, Direction::Up),
            KeyCode::Down => Command::Step(scope, Direction::Down),
            KeyCode::PageUp => Command::Jump(scope, Direction::Up),
            KeyCode::PageDown => Command::Jump(scope, Direction::Down),
            _ => return None,
        };
        Some(command)
    }

    /// Apply to the ring. `Quit` is left to the caller and does nothing here.
    pub fn apply(self, ring: &mut BoxRing) {
        match self {
            Command::FocusPrevious => ring.focus_previous(),
            Command::FocusNext => ring.focus_next(),
            Command::Step(scope, direction) => {
                let delta = match direction {
                    Direction::Up => 1,
                    Direction::Down => -1,
                };
                ring.targets(scope).iter_mut().for_each(|b| b.step(delta));
            }
            Command::Snap(scope, direction) => {
                ring.targets(scope).iter_mut().for_each(|b| b.snap(direction));
            }
            Command::Jump(scope, direction) => {
                let value = match direction {
                    Direction::Up => u8::MAX,
                    Direction::Down => 0,
                };
                ring.targets(scope).iter_mut().for_each(|b| b.set(value));
            }
            Command::Quit => {}
        }
    }
}
