//! Event sources: where a terminal backend reads raw input from.
//!
//! [`CrosstermEvents`] drains the real terminal without blocking.
//! [`ScriptedEvents`] replays a fixed queue, for tests and demos.

use super::{RawEvent, RawEventFlags};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseEventKind};
use std::collections::VecDeque;
use std::time::Duration;

/// A non-blocking supply of raw events.
pub trait EventSource {
    /// Next pending event, or `None` if nothing is buffered right now.
    fn next_event(&mut self) -> Option<RawEvent>;
}

/// Reads events from the controlling terminal through crossterm.
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self) -> Option<RawEvent> {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if let Some(raw) = convert_event(&event) {
                            return Some(raw);
                        }
                        // Untranslatable event: keep draining.
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "reading terminal event failed");
                        return None;
                    }
                },
                Ok(false) => return None,
                Err(e) => {
                    tracing::warn!(error = %e, "polling terminal events failed");
                    return None;
                }
            }
        }
    }
}

/// Replays a fixed queue of events.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    queue: VecDeque<RawEvent>,
}

impl ScriptedEvents {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// A script of key presses, one per character of `keys`.
    pub fn keys(keys: &str) -> Self {
        let mut script = Self::new();
        for c in keys.chars() {
            if let Some(code) = char_code(c) {
                script.push(RawEvent::key_press(code));
            }
        }
        script
    }

    /// Append an event.
    pub fn push(&mut self, event: RawEvent) {
        self.queue.push_back(event);
    }

    /// Number of events left.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the script is exhausted.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self) -> Option<RawEvent> {
        self.queue.pop_front()
    }
}

impl Extend<RawEvent> for ScriptedEvents {
    fn extend<T: IntoIterator<Item = RawEvent>>(&mut self, iter: T) {
        self.queue.extend(iter);
    }
}

/// Key code of a character, if it fits the 16-bit code space.
pub(crate) fn char_code(c: char) -> Option<u16> {
    u16::try_from(u32::from(c)).ok()
}

/// Translate a crossterm event into a raw backend event.
pub(crate) fn convert_event(event: &Event) -> Option<RawEvent> {
    match event {
        Event::Key(key) => {
            let code = convert_key_code(key.code)?;
            match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => Some(RawEvent::key_press(code)),
                KeyEventKind::Release => Some(RawEvent::key_release(code)),
            }
        }
        Event::Mouse(mouse) => {
            let flags = match mouse.kind {
                MouseEventKind::Down(_) => RawEventFlags::MOUSE_PRESS,
                MouseEventKind::Up(_) => RawEventFlags::MOUSE_RELEASE,
                MouseEventKind::Moved | MouseEventKind::Drag(_) => RawEventFlags::MOUSE_MOTION,
                _ => return None,
            };
            Some(RawEvent {
                flags,
                data: (u32::from(mouse.column) << 16) | u32::from(mouse.row),
            })
        }
        Event::Resize(width, height) => Some(RawEvent::resize(*width, *height)),
        Event::FocusGained | Event::FocusLost | Event::Paste(_) => None,
    }
}

/// Map a crossterm key to its 16-bit code. Keys without one are dropped.
fn convert_key_code(code: KeyCode) -> Option<u16> {
    match code {
        KeyCode::Char(c) => char_code(c),
        KeyCode::Esc => Some(0x1b),
        KeyCode::Enter => Some(0x0d),
        KeyCode::Tab => Some(0x09),
        KeyCode::Backspace => Some(0x08),
        _ => None,
    }
}
