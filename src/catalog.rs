//! Named colors used by the demo programs.
//!
//! ## Rust concepts
//! - `static` tables of `Copy` data
//! - `rand::seq::SliceRandom` for picking a random element

use crate::Color;
use rand::Rng;
use rand::seq::SliceRandom;

/// A color with the name we print when showing it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NamedColor {
    pub name: &'static str,
    pub color: Color,
}

impl NamedColor {
    pub const fn new(name: &'static str, r: f32, g: f32, b: f32) -> Self {
        Self {
            name,
            color: Color::new(r, g, b),
        }
    }
}

/// Fully saturated colors around the wheel, in hue order.
pub static BRIGHT_COLOURS: [NamedColor; 12] = [
    NamedColor::new("Red", 1.0, 0.0, 0.0),
    NamedColor::new("Orange", 1.0, 0.5, 0.0),
    NamedColor::new("Yellow", 1.0, 1.0, 0.0),
    NamedColor::new("Lime", 0.5, 1.0, 0.0),
    NamedColor::new("Green", 0.0, 1.0, 0.0),
    NamedColor::new("Teal", 0.0, 1.0, 0.5),
    NamedColor::new("Cyan", 0.0, 1.0, 1.0),
    NamedColor::new("Azure", 0.0, 0.5, 1.0),
    NamedColor::new("Blue", 0.0, 0.0, 1.0),
    NamedColor::new("Purple", 0.5, 0.0, 1.0),
    NamedColor::new("Magenta", 1.0, 0.0, 1.0),
    NamedColor::new("Pink", 1.0, 0.0, 0.5),
];

/// One color per leg, then all three together. Enough to spot a miswired pin.
pub static TEST_COLOURS: [NamedColor; 4] = [
    NamedColor::new("Red", 1.0, 0.0, 0.0),
    NamedColor::new("Green", 0.0, 1.0, 0.0),
    NamedColor::new("Blue", 0.0, 0.0, 1.0),
    NamedColor::new("White", 1.0, 1.0, 1.0),
];

/// Pick a random entry. `None` only for an empty slice.
pub fn choose<'a, R: Rng + ?Sized>(
    colours: &'a [NamedColor],
    rng: &mut R,
) -> Option<&'a NamedColor> {
    colours.choose(rng)
}
