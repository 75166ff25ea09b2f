//! Input that arrives while an async call holds the editor.
//!
//! Renders, history moves and exports keep the session borrowed across
//! their awaits. Pointer and draft input received meanwhile is queued here
//! and replayed, oldest first, once the call is done with the session.

use fp_core::DocumentLoader;
use fp_editor::session::EditorSession;
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DeferredInput {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    DoubleClick { x: f64, y: f64 },
    ContextMenu { x: f64, y: f64 },
    DraftText(String),
}

impl DeferredInput {
    /// Returns `true` if an annotation changed.
    pub(crate) fn apply<L: DocumentLoader>(self, session: &mut EditorSession<L>) -> bool {
        match self {
            DeferredInput::PointerDown { x, y } => session.pointer_down(x, y),
            DeferredInput::PointerMove { x, y } => session.pointer_move(x, y),
            DeferredInput::PointerUp { x, y } => session.pointer_up(x, y),
            DeferredInput::DoubleClick { x, y } => session.double_click(x, y),
            DeferredInput::ContextMenu { x, y } => session.context_menu(x, y),
            DeferredInput::DraftText(text) => {
                session.set_draft_text(&text);
                false
            }
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct InputQueue {
    pending: RefCell<VecDeque<DeferredInput>>,
}

impl InputQueue {
    pub(crate) fn push(&self, input: DeferredInput) {
        log::debug!("editor busy, deferring {input:?}");
        self.pending.borrow_mut().push_back(input);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Apply everything queued. Returns `true` if an annotation changed.
    pub(crate) fn replay<L: DocumentLoader>(&self, session: &mut EditorSession<L>) -> bool {
        let queued = std::mem::take(&mut *self.pending.borrow_mut());
        if !queued.is_empty() {
            log::debug!("replaying {} deferred inputs", queued.len());
        }
        queued
            .into_iter()
            .fold(false, |changed, input| input.apply(session) || changed)
    }
}
