//! Optional observability hook for the editing session.
//!
//! The session never requires an observer; [`NoopObserver`] is the default
//! and every method has an empty default body.

use fp_core::id::AnnotationId;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    DocumentLoaded { pages: u32 },
    AnnotationAdded { id: AnnotationId },
    AnnotationUpdated { id: AnnotationId },
    AnnotationRemoved { id: AnnotationId },
    SnapshotSaved { index: usize, bytes: usize },
    StateSaved { name: String },
    Undo { index: usize },
    Redo { index: usize },
    StateLoaded { name: String },
    Exported { fell_back: bool },
}

pub trait SessionObserver {
    fn track(&self, _event: &SessionEvent) {}

    /// A user-facing failure the host should surface.
    fn alert(&self, _message: &str) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Observer that writes events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn track(&self, event: &SessionEvent) {
        log::info!("{event:?}");
    }

    fn alert(&self, message: &str) {
        log::error!("{message}");
    }
}
