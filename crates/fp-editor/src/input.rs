//! Input abstraction layer.
//!
//! Normalizes the canvas' DOM events into an `InputEvent` enum consumed by
//! the interaction state machine. The host delivers coordinates relative to
//! the canvas' top-left corner; [`InputEvent::to_page`] maps them into page
//! space before any tool sees them.

use fp_core::viewport::{ViewportState, screen_to_page};
use kurbo::Point;

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown { x: f64, y: f64 },

    PointerMove { x: f64, y: f64 },

    PointerUp { x: f64, y: f64 },

    DoubleClick { x: f64, y: f64 },

    /// Secondary button (right-click).
    ContextMenu { x: f64, y: f64 },

    /// `key` is the `KeyboardEvent.key` value.
    Key { key: String, modifiers: Modifiers },

    /// The text overlay's value changed.
    TextInput { text: String },
}

impl InputEvent {
    pub fn key(key: &str) -> Self {
        InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Pointer position, if the event has one.
    pub fn position(&self) -> Option<Point> {
        match *self {
            InputEvent::PointerDown { x, y }
            | InputEvent::PointerMove { x, y }
            | InputEvent::PointerUp { x, y }
            | InputEvent::DoubleClick { x, y }
            | InputEvent::ContextMenu { x, y } => Some(Point::new(x, y)),
            InputEvent::Key { .. } | InputEvent::TextInput { .. } => None,
        }
    }

    /// Map pointer coordinates from screen to page space.
    pub fn to_page(&self, viewport: &ViewportState) -> Self {
        let map = |x: f64, y: f64| screen_to_page(Point::new(x, y), viewport);
        match self {
            InputEvent::PointerDown { x, y } => {
                let p = map(*x, *y);
                InputEvent::PointerDown { x: p.x, y: p.y }
            }
            InputEvent::PointerMove { x, y } => {
                let p = map(*x, *y);
                InputEvent::PointerMove { x: p.x, y: p.y }
            }
            InputEvent::PointerUp { x, y } => {
                let p = map(*x, *y);
                InputEvent::PointerUp { x: p.x, y: p.y }
            }
            InputEvent::DoubleClick { x, y } => {
                let p = map(*x, *y);
                InputEvent::DoubleClick { x: p.x, y: p.y }
            }
            InputEvent::ContextMenu { x, y } => {
                let p = map(*x, *y);
                InputEvent::ContextMenu { x: p.x, y: p.y }
            }
            InputEvent::Key { .. } | InputEvent::TextInput { .. } => self.clone(),
        }
    }
}
