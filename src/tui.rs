//! Terminal front end for the `sandbox` tuner.
//!
//! Draws the three value boxes and a key legend with `ratatui`, reads key
//! presses with `crossterm`, and pushes the ring's drive color to the LED
//! after every change. One key is handled completely (mutate, show, redraw)
//! before the next one is read.
//!
//! ## Rust concepts
//! - Generic `Terminal<B: Backend>` so tests can render into a `TestBackend`
//! - Matching on terminal events and skipping the ones we ignore
//! - Handing the final `BoxRing` back to the caller

use crate::is_running;
use crate::led::LedSink;
use crate::tuner::{BoxRing, Channel, Command, ValueBox};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tracing::subscriber::NoSubscriber;

pub const BOX_WIDTH: u16 = 22;
pub const BOX_HEIGHT: u16 = 5;

/// How long to wait for a key before checking the shutdown flag again.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

const LEGEND: [&str; 5] = [
    "Press 'UP'/'DOWN' arrow keys to change values up and down.",
    "Use 'Shift' key to jump to the next multiple of five.",
    "Press 'PgUp'/'PgDn' keys to set 255 or 0.",
    "Press 'LEFT'/'RIGHT' arrows to change active colour.",
    "Use 'Ctrl' key to make changes to all three colours at once.",
];

// ── Rendering ────────────────────────────────────────────────────────

fn channel_color(channel: Channel) -> Color {
    match channel {
        Channel::Red => Color::Red,
        Channel::Green => Color::Green,
        Channel::Blue => Color::Blue,
    }
}

/// Where box `index` goes, clipped to the screen.
pub fn box_area(index: usize, screen: Rect) -> Rect {
    let x = 1 + index as u16 * (BOX_WIDTH + 1);
    Rect::new(x, 1, BOX_WIDTH, BOX_HEIGHT).intersection(screen)
}

fn box_lines(value_box: &ValueBox) -> Vec<Line<'static>> {
    let drive = value_box.drive();
    vec![
        Line::from(format!("Value:     {:>4}/255", value_box.value())),
        Line::from(format!("PWM Duty:  {drive:>7.5}")),
        Line::from(format!("Intensity: {:>5.1}%", drive * 100.0)),
    ]
}

/// A plain box, or a bold double-bordered one when it has focus.
fn render_box(frame: &mut Frame, area: Rect, value_box: &ValueBox, focused: bool) {
    let color = channel_color(value_box.channel);
    let (border_type, style) = if focused {
        (
            BorderType::Double,
            Style::new().fg(color).add_modifier(Modifier::BOLD),
        )
    } else {
        (BorderType::Plain, Style::new().fg(color))
    };

    let block = Block::bordered()
        .border_type(border_type)
        .border_style(style)
        .title(Span::styled(value_box.channel.label(), style));

    frame.render_widget(
        Paragraph::new(box_lines(value_box)).style(style).block(block),
        area,
    );
}

fn render_legend(frame: &mut Frame, screen: Rect) {
    let top = 2 + BOX_HEIGHT;
    let area = Rect::new(1, top, 80, LEGEND.len() as u16 + 3).intersection(screen);

    let mut lines = vec![Line::from(Span::styled(
        "Instructions:",
        Style::new().add_modifier(Modifier::BOLD),
    ))];
    lines.extend(LEGEND.iter().map(|text| Line::from(format!("  {text}"))));
    lines.push(Line::from(""));
    lines.push(Line::from("Press 'Ctrl + c' to exit program..."));

    frame.render_widget(Paragraph::new(lines), area);
}

/// Draw the whole screen for `ring`.
pub fn draw(frame: &mut Frame, ring: &BoxRing) {
    let screen = frame.area();
    for (index, value_box) in ring.boxes().iter().enumerate() {
        render_box(frame, box_area(index, screen), value_box, ring.is_active(index));
    }
    render_legend(frame, screen);
}

// ── Input ────────────────────────────────────────────────────────────

/// What happened to one key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not a key we know, or a release/repeat event.
    Ignored,
    /// The ring changed and the LED was updated.
    Updated,
    Quit,
}

/// Apply one key press to the ring and feed the new color to the LED.
pub fn handle_key<L: LedSink + ?Sized>(
    ring: &mut BoxRing,
    led: &mut L,
    key: KeyEvent,
) -> Result<KeyOutcome, Box<dyn Error>> {
    if key.kind != KeyEventKind::Press {
        return Ok(KeyOutcome::Ignored);
    }

    match Command::from_key(key) {
        None => Ok(KeyOutcome::Ignored),
        Some(Command::Quit) => Ok(KeyOutcome::Quit),
        Some(command) => {
            command.apply(ring);
            tracing::debug!(?command, values = ?ring.values(), "key");
            led.set_color(ring.drive_color())?;
            Ok(KeyOutcome::Updated)
        }
    }
}

/// Blocking key loop. Returns the final ring when the user quits or
/// `running` is cleared.
pub fn run<B: Backend, L: LedSink + ?Sized>(
    terminal: &mut Terminal<B>,
    led: &mut L,
    running: &AtomicBool,
) -> Result<BoxRing, Box<dyn Error>> {
    let mut ring = BoxRing::new();
    led.set_color(ring.drive_color())?;
    terminal.draw(|f| draw(f, &ring))?;

    while is_running(running) {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        let key = match event::read()? {
            Event::Key(key) => key,
            Event::Resize(_, _) => {
                terminal.draw(|f| draw(f, &ring))?;
                continue;
            }
            _ => continue,
        };

        match handle_key(&mut ring, led, key)? {
            KeyOutcome::Ignored => {}
            KeyOutcome::Updated => {
                terminal.draw(|f| draw(f, &ring))?;
            }
            KeyOutcome::Quit => break,
        }
    }

    Ok(ring)
}

/// Run `f` with logging switched off on this thread.
///
/// The log writer is stderr, which shares the terminal with the alternate
/// screen; anything written there would land on top of the boxes.
fn without_logging<T>(f: impl FnOnce() -> T) -> T {
    tracing::subscriber::with_default(NoSubscriber::default(), f)
}

/// Take over the terminal, run the tuner, and always give the terminal back.
pub fn run_sandbox<L: LedSink + ?Sized>(
    led: &mut L,
    running: &AtomicBool,
) -> Result<(), Box<dyn Error>> {
    let result = without_logging(|| {
        let mut terminal = ratatui::init();
        let result = run(&mut terminal, led, running);
        ratatui::restore();
        result
    });

    let ring = result?;
    tracing::info!("Final values (R, G, B): {:?}", ring.values());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::RecordingLed;
    use crate::tuner::{Direction, Scope};
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use tracing_subscriber::Registry;

    #[test]
    fn logging_is_off_inside_the_tuner_and_back_after() {
        tracing::subscriber::with_default(Registry::default(), || {
            let muted = without_logging(|| {
                tracing::dispatcher::get_default(|d| d.is::<NoSubscriber>())
            });
            assert!(muted);
            assert!(tracing::dispatcher::get_default(|d| d.is::<Registry>()));
        });
    }

    fn render(ring: &BoxRing) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal.draw(|f| draw(f, ring)).unwrap();
        terminal
    }

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn boxes_sit_side_by_side() {
        let screen = Rect::new(0, 0, 80, 24);
        assert_eq!(box_area(0, screen), Rect::new(1, 1, 22, 5));
        assert_eq!(box_area(1, screen), Rect::new(24, 1, 22, 5));
        assert_eq!(box_area(2, screen), Rect::new(47, 1, 22, 5));
    }

    #[test]
    fn box_area_is_clipped_to_small_screens() {
        let screen = Rect::new(0, 0, 30, 4);
        let area = box_area(1, screen);
        assert_eq!(area.x, 24);
        assert_eq!(area.right(), 30);
        assert_eq!(area.bottom(), 4);
    }

    #[test]
    fn initial_screen_shows_all_labels_at_zero() {
        let terminal = render(&BoxRing::new());

        let top = row(&terminal, 1);
        assert!(top.contains("RED"));
        assert!(top.contains("GREEN"));
        assert!(top.contains("BLUE"));

        assert_eq!(row(&terminal, 2).matches("0/255").count(), 3);
        assert_eq!(row(&terminal, 3).matches("0.00000").count(), 3);
        assert_eq!(row(&terminal, 4).matches("0.0%").count(), 3);
    }

    #[test]
    fn only_the_active_box_has_a_double_border() {
        let terminal = render(&BoxRing::new());
        let buffer = terminal.backend().buffer();

        assert_eq!(buffer[(1, 1)].symbol(), "╔");
        assert!(buffer[(1, 1)].modifier.contains(Modifier::BOLD));
        assert_eq!(buffer[(24, 1)].symbol(), "┌");
        assert_eq!(buffer[(47, 1)].symbol(), "┌");
    }

    #[test]
    fn focus_change_moves_the_double_border() {
        let mut ring = BoxRing::new();
        Command::FocusPrevious.apply(&mut ring);
        let terminal = render(&ring);
        let buffer = terminal.backend().buffer();

        assert_eq!(buffer[(1, 1)].symbol(), "┌");
        assert_eq!(buffer[(47, 1)].symbol(), "╔");
    }

    #[test]
    fn full_value_shows_full_duty() {
        let mut ring = BoxRing::new();
        Command::Jump(Scope::Active, Direction::Up).apply(&mut ring);
        let terminal = render(&ring);

        assert!(row(&terminal, 2).contains(" 255/255"));
        assert!(row(&terminal, 3).contains("PWM Duty:  1.00000"));
        assert!(row(&terminal, 4).contains("Intensity: 100.0%"));
    }

    #[test]
    fn legend_is_below_the_boxes() {
        let terminal = render(&BoxRing::new());
        assert!(row(&terminal, 7).contains("Instructions:"));
        assert!(row(&terminal, 14).contains("Press 'Ctrl + c' to exit program..."));
    }

    #[test]
    fn handled_key_updates_ring_and_led() {
        let mut ring = BoxRing::new();
        let mut led = RecordingLed::default();

        let outcome = handle_key(
            &mut ring,
            &mut led,
            press(KeyCode::PageUp, KeyModifiers::CONTROL),
        )
        .unwrap();

        assert_eq!(outcome, KeyOutcome::Updated);
        assert_eq!(ring.values(), [255, 255, 255]);
        assert_eq!(led.colors, vec![crate::Color::WHITE]);
    }

    #[test]
    fn unmapped_key_is_ignored() {
        let mut ring = BoxRing::new();
        let mut led = RecordingLed::default();

        let outcome = handle_key(&mut ring, &mut led, press(KeyCode::Tab, KeyModifiers::NONE))
            .unwrap();

        assert_eq!(outcome, KeyOutcome::Ignored);
        assert!(led.colors.is_empty());
    }

    #[test]
    fn key_release_is_ignored() {
        let mut ring = BoxRing::new();
        let mut led = RecordingLed::default();
        let release = KeyEvent {
            code: KeyCode::Up,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };

        let outcome = handle_key(&mut ring, &mut led, release).unwrap();

        assert_eq!(outcome, KeyOutcome::Ignored);
        assert_eq!(ring.values(), [0, 0, 0]);
    }

    #[test]
    fn ctrl_c_quits_without_touching_led() {
        let mut ring = BoxRing::new();
        let mut led = RecordingLed::default();

        let outcome = handle_key(
            &mut ring,
            &mut led,
            press(KeyCode::Char('c'), KeyModifiers::CONTROL),
        )
        .unwrap();

        assert_eq!(outcome, KeyOutcome::Quit);
        assert!(led.colors.is_empty());
        assert_eq!(led.releases, 0);
    }
}
