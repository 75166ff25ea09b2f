//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the browser bridge and native tests share it.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    ToolSelect,
    ToolText,
    ToolHighlight,

    // ── History ──
    Undo,
    Redo,
    SaveSnapshot,
    SaveState,
    PrevState,
    NextState,

    // ── View ──
    ZoomIn,
    ZoomOut,
    Rotate,
    NextPage,
    PrevPage,

    // ── Text draft ──
    CommitText,
    CancelText,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"PageDown"`).
    /// While a text draft is open only Enter and Escape resolve, so typing
    /// into the overlay never triggers single-key shortcuts.
    pub fn resolve(key: &str, modifiers: Modifiers, draft_open: bool) -> Option<ShortcutAction> {
        if draft_open {
            return match key {
                "Enter" => Some(ShortcutAction::CommitText),
                "Escape" => Some(ShortcutAction::CancelText),
                _ => None,
            };
        }

        let cmd = modifiers.command();

        // ── Modifier combos first (most specific) ──
        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                "s" | "S" => Some(ShortcutAction::SaveState),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "s" | "S" => Some(ShortcutAction::SaveSnapshot),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                _ => None,
            };
        }

        if modifiers.alt {
            return match key {
                "ArrowLeft" => Some(ShortcutAction::PrevState),
                "ArrowRight" => Some(ShortcutAction::NextState),
                _ => None,
            };
        }

        // ── Single keys ──
        match key {
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "t" | "T" => Some(ShortcutAction::ToolText),
            "h" | "H" => Some(ShortcutAction::ToolHighlight),
            "r" | "R" => Some(ShortcutAction::Rotate),
            "PageDown" | "ArrowRight" => Some(ShortcutAction::NextPage),
            "PageUp" | "ArrowLeft" => Some(ShortcutAction::PrevPage),
            _ => None,
        }
    }
}
