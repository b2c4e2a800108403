//! EventPump: relay backend key presses to the host.
//!
//! Translation is a closed table from key code to [`HostEvent`]. Codes not in
//! the table, key releases, mouse and resize events are all dropped.

use crate::backend::{Backend, RawEvent};
use bitflags::bitflags;
use crossbeam_channel::{Sender, TrySendError};

bitflags! {
    /// Modifier keys attached to a host event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        /// Shift key held.
        const SHIFT = 0b0001;
        /// Control key held.
        const CONTROL = 0b0010;
        /// Alt/Option key held.
        const ALT = 0b0100;
        /// Super/Command key held.
        const SUPER = 0b1000;
    }
}

/// Input events the host understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// Stop playback and close the output.
    Quit,
    /// Toggle pause.
    PauseToggle,
}

impl HostEvent {
    /// Modifiers the host sees with this event.
    pub const fn modifiers(self) -> KeyModifiers {
        match self {
            Self::Quit => KeyModifiers::CONTROL,
            Self::PauseToggle => KeyModifiers::empty(),
        }
    }
}

/// Key code of the space bar.
const SPACE: u16 = 0x20;

/// Key code to host event table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: Vec<(u16, HostEvent)>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new('q')
    }
}

impl KeyMap {
    /// Bind `quit_key` to [`HostEvent::Quit`] and space to [`HostEvent::PauseToggle`].
    ///
    /// A quit key outside the 16-bit code space falls back to `'q'`.
    pub fn new(quit_key: char) -> Self {
        let quit = u16::try_from(u32::from(quit_key)).unwrap_or(u16::from(b'q'));
        Self {
            bindings: vec![(quit, HostEvent::Quit), (SPACE, HostEvent::PauseToggle)],
        }
    }

    /// Event bound to `code`, if any.
    pub fn lookup(&self, code: u16) -> Option<HostEvent> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|&(_, event)| event)
    }

    /// Event produced by a raw backend event, if any.
    pub fn translate(&self, event: RawEvent) -> Option<HostEvent> {
        if !event.is_key_press() {
            return None;
        }
        self.lookup(event.key_code())
    }

    /// All bindings, in priority order.
    pub fn bindings(&self) -> &[(u16, HostEvent)] {
        &self.bindings
    }
}

/// Drains a backend's pending events, forwarding each recognized one.
///
/// Lazy: nothing is read until the iterator is advanced. Each yielded event
/// has already been sent on the host channel.
pub struct EventPump<'a, B: Backend> {
    backend: &'a mut B,
    keymap: &'a KeyMap,
    sink: &'a Sender<HostEvent>,
}

impl<'a, B: Backend> EventPump<'a, B> {
    /// Pump events from `backend` through `keymap` into `sink`.
    pub fn new(backend: &'a mut B, keymap: &'a KeyMap, sink: &'a Sender<HostEvent>) -> Self {
        Self {
            backend,
            keymap,
            sink,
        }
    }

    fn forward(&self, event: HostEvent) {
        match self.sink.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(?event, "host input channel full, event dropped");
            }
            Err(TrySendError::Disconnected(event)) => {
                tracing::debug!(?event, "host input channel closed");
            }
        }
    }
}

impl<B: Backend> Iterator for EventPump<'_, B> {
    type Item = HostEvent;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = self.backend.poll_event()?;
            if let Some(event) = self.keymap.translate(raw) {
                self.forward(event);
                return Some(event);
            }
        }
    }
}

impl<B: Backend> std::fmt::Debug for EventPump<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPump")
            .field("keymap", self.keymap)
            .finish_non_exhaustive()
    }
}
