//! The editing session: one open document with its annotation store,
//! viewport, interaction state, and history timelines.
//!
//! All async operations take `&mut self`, so a session can never run two
//! saves (or a save and an undo) against the same document at once.
//! Failures at async boundaries are logged, reported to the observer, and
//! returned; nothing is retried automatically.

use crate::history::{SavedStates, SnapshotHistory};
use crate::input::{InputEvent, Modifiers};
use crate::observer::{NoopObserver, SessionEvent, SessionObserver};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{Interaction, InteractionState, Mutations, TextDraft, ToolKind};
use chrono::Utc;
use fp_core::document::{DocumentLoader, EditableDocument, LoadOptions, capture, load_with_retry};
use fp_core::model::{DEFAULT_HIGHLIGHT_COLOR, TextSettings};
use fp_core::store::{AnnotationMutation, AnnotationStore};
use fp_core::viewport::{ViewportConfig, ViewportState};
use fp_core::{ExportError, LoadError, RenderError, Rgb, SaveError};
use fp_render::compose::Composer;
use fp_render::export::{Export, ExportOptions, export_document, reference_size};
use fp_render::hit::HitConfig;
use fp_render::paint::{FrameInfo, RenderKey, render_frame};
use fp_render::source::{PageSource, PixelSize};
use kurbo::Point;
use serde::Serialize;

/// Session tunables.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionConfig {
    pub viewport: ViewportConfig,
    pub hit: HitConfig,
    pub export: ExportOptions,
}

/// History flags for the toolbar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub current_state_name: String,
    pub can_prev_state: bool,
    pub can_next_state: bool,
    pub snapshot_count: usize,
    pub state_count: usize,
}

/// Viewport readout for the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportStatus {
    #[serde(flatten)]
    pub viewport: ViewportState,
    pub zoom_percent: u32,
    pub can_prev_page: bool,
    pub can_next_page: bool,
}

/// The last frame that made it to the surface.
#[derive(Debug, Clone, Copy)]
struct Rendered {
    key: RenderKey,
    frame: FrameInfo,
    viewport: ViewportState,
}

pub struct EditorSession<L: DocumentLoader> {
    loader: L,
    document: Option<L::Document>,
    store: AnnotationStore,
    viewport: ViewportState,
    interaction: Interaction,
    text_settings: TextSettings,
    highlight_color: String,
    history: SnapshotHistory,
    states: SavedStates,
    observer: Box<dyn SessionObserver>,
    config: SessionConfig,
    rendered: Option<Rendered>,
}

impl<L: DocumentLoader> EditorSession<L> {
    pub fn new(loader: L) -> Self {
        Self::with_observer(loader, Box::new(NoopObserver), SessionConfig::default())
    }

    pub fn with_observer(
        loader: L,
        observer: Box<dyn SessionObserver>,
        config: SessionConfig,
    ) -> Self {
        Self {
            loader,
            document: None,
            store: AnnotationStore::new(),
            viewport: ViewportState::default(),
            interaction: Interaction::new(config.hit),
            text_settings: TextSettings::default(),
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            history: SnapshotHistory::new(),
            states: SavedStates::new(),
            observer,
            config,
            rendered: None,
        }
    }

    // ─── Document lifecycle ──────────────────────────────────────────────

    /// Open a document from scratch. `page_count` comes from the page
    /// renderer. Any previous document and all its state are discarded
    /// first, so a retry after failure starts clean.
    pub async fn open(&mut self, bytes: &[u8], page_count: u32) -> Result<(), LoadError> {
        self.close();

        let document = match load_with_retry(&self.loader, bytes).await {
            Ok(document) => document,
            Err(e) => {
                log::error!("failed to open document: {e}");
                return Err(e);
            }
        };

        match document.page_count() {
            Ok(n) if n != page_count => {
                log::warn!("renderer reports {page_count} pages, document reports {n}")
            }
            Ok(_) => {}
            Err(e) => log::warn!("could not read page count: {e}"),
        }

        match capture(&document).await {
            Ok(snapshot) => self.history.push(snapshot),
            Err(e) => log::warn!("initial snapshot failed, starting with empty history: {e}"),
        }

        self.viewport.reset(page_count);
        self.document = Some(document);
        log::debug!("opened document: {page_count} pages, {} bytes", bytes.len());
        self.observer
            .track(&SessionEvent::DocumentLoaded { pages: page_count });
        Ok(())
    }

    /// Drop the document and every piece of per-document state.
    pub fn close(&mut self) {
        self.document = None;
        self.store.replace_all(Vec::new());
        self.viewport.reset(0);
        self.interaction.reset();
        self.history.clear();
        self.states.clear();
        self.rendered = None;
    }

    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Option<&L::Document> {
        self.document.as_ref()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed a screen-space input event. Returns `true` if the store changed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if self.document.is_none() {
            return false;
        }
        let event = event.to_page(&self.viewport);
        let mutations = self.interaction.handle(
            &event,
            &self.store,
            self.viewport.current_page,
            &self.text_settings,
            &self.highlight_color,
        );
        self.apply(mutations)
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.handle_input(&InputEvent::PointerDown { x, y })
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.handle_input(&InputEvent::PointerMove { x, y })
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.handle_input(&InputEvent::PointerUp { x, y })
    }

    pub fn double_click(&mut self, x: f64, y: f64) -> bool {
        self.handle_input(&InputEvent::DoubleClick { x, y })
    }

    pub fn context_menu(&mut self, x: f64, y: f64) -> bool {
        self.handle_input(&InputEvent::ContextMenu { x, y })
    }

    /// Mirror the overlay's current value into the open draft.
    pub fn set_draft_text(&mut self, text: &str) {
        self.handle_input(&InputEvent::TextInput {
            text: text.to_string(),
        });
    }

    fn apply(&mut self, mutations: Mutations) -> bool {
        let mut changed = false;
        for mutation in mutations {
            let event = match mutation {
                AnnotationMutation::Add { annotation } => {
                    let id = self.store.add(*annotation);
                    Some(SessionEvent::AnnotationAdded { id })
                }
                AnnotationMutation::Update { id, patch } => self
                    .store
                    .update(id, &patch)
                    .then_some(SessionEvent::AnnotationUpdated { id }),
                AnnotationMutation::Remove { id } => self
                    .store
                    .remove(id)
                    .map(|_| SessionEvent::AnnotationRemoved { id }),
            };
            if let Some(event) = event {
                self.observer.track(&event);
                changed = true;
            }
        }
        changed
    }

    /// Resolve and run a keyboard shortcut. Returns the action taken.
    pub async fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, modifiers, self.interaction.draft().is_some())?;
        self.perform(action).await;
        Some(action)
    }

    /// Run an action. History failures are already reported to the
    /// observer, so they are not returned here.
    pub async fn perform(&mut self, action: ShortcutAction) {
        match action {
            ShortcutAction::ToolSelect => self.set_tool(ToolKind::Select),
            ShortcutAction::ToolText => self.set_tool(ToolKind::Text),
            ShortcutAction::ToolHighlight => self.set_tool(ToolKind::Highlight),
            ShortcutAction::Undo => {
                let _ = self.undo().await;
            }
            ShortcutAction::Redo => {
                let _ = self.redo().await;
            }
            ShortcutAction::SaveSnapshot => {
                let _ = self.save().await;
            }
            ShortcutAction::SaveState => {
                let _ = self.save_state().await;
            }
            ShortcutAction::PrevState => {
                let _ = self.prev_state().await;
            }
            ShortcutAction::NextState => {
                let _ = self.next_state().await;
            }
            ShortcutAction::ZoomIn => {
                self.zoom_in();
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out();
            }
            ShortcutAction::Rotate => self.rotate(),
            ShortcutAction::NextPage => {
                self.next_page();
            }
            ShortcutAction::PrevPage => {
                self.prev_page();
            }
            ShortcutAction::CommitText => {
                self.handle_input(&InputEvent::key("Enter"));
            }
            ShortcutAction::CancelText => {
                self.handle_input(&InputEvent::key("Escape"));
            }
        }
    }

    // ─── Tools and settings ──────────────────────────────────────────────

    pub fn tool(&self) -> ToolKind {
        self.interaction.tool()
    }

    pub fn set_tool(&mut self, kind: ToolKind) {
        self.interaction.set_tool(kind);
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.interaction.state()
    }

    pub fn draft(&self) -> Option<&TextDraft> {
        self.interaction.draft()
    }

    /// Page-space font size for the text input overlay: the label's own
    /// size while editing, the current text settings otherwise.
    pub fn draft_font_size(&self) -> Option<f64> {
        let draft = self.interaction.draft()?;
        let edited = draft
            .editing
            .and_then(|id| self.store.get(id))
            .and_then(|a| a.as_text())
            .map(|t| t.font_size);
        Some(edited.unwrap_or(self.text_settings.font_size))
    }

    /// Screen position for the text input overlay.
    pub fn draft_position(&self) -> Option<Point> {
        self.interaction
            .draft()
            .map(|d| d.screen_position(&self.viewport))
    }

    pub fn text_settings(&self) -> &TextSettings {
        &self.text_settings
    }

    pub fn set_text_settings(&mut self, settings: TextSettings) {
        self.text_settings = settings;
    }

    pub fn highlight_color(&self) -> &str {
        &self.highlight_color
    }

    pub fn set_highlight_color(&mut self, color: &str) {
        if Rgb::from_hex(color).is_none() {
            log::warn!("highlight color {color:?} is not a hex color; it will paint black");
        }
        self.highlight_color = color.to_string();
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn viewport_status(&self) -> ViewportStatus {
        ViewportStatus {
            viewport: self.viewport,
            zoom_percent: self.viewport.zoom_percent(),
            can_prev_page: self.viewport.can_prev_page(),
            can_next_page: self.viewport.can_next_page(),
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in(&self.config.viewport)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out(&self.config.viewport)
    }

    pub fn rotate(&mut self) {
        self.viewport.rotate();
    }

    pub fn next_page(&mut self) -> bool {
        let changed = self.viewport.next_page();
        self.page_changed(changed)
    }

    pub fn prev_page(&mut self) -> bool {
        let changed = self.viewport.prev_page();
        self.page_changed(changed)
    }

    pub fn go_to_page(&mut self, page: u32) -> bool {
        let changed = self.viewport.go_to_page(page);
        self.page_changed(changed)
    }

    /// Gestures are bound to the page they started on.
    fn page_changed(&mut self, changed: bool) -> bool {
        if changed {
            self.interaction.cancel_gestures();
        }
        changed
    }

    // ─── Undo/redo timeline ──────────────────────────────────────────────

    /// Capture the live document as a new snapshot.
    pub async fn save(&mut self) -> Result<(), SaveError> {
        let result = self.try_save().await;
        if let Err(e) = &result {
            self.report("save", e);
        }
        result
    }

    async fn try_save(&mut self) -> Result<(), SaveError> {
        let document = self.document.as_ref().ok_or(SaveError::NoDocument)?;
        let snapshot = capture(document).await?;
        let bytes = snapshot.len();
        self.history.push(snapshot);
        let index = self.history.cursor().unwrap_or_default();
        log::debug!("snapshot {index} saved, {bytes} bytes");
        self.observer
            .track(&SessionEvent::SnapshotSaved { index, bytes });
        Ok(())
    }

    /// Step back one snapshot. `Ok(false)` if there is nothing to undo.
    pub async fn undo(&mut self) -> Result<bool, SaveError> {
        let Some(index) = self.history.undo_target() else {
            return Ok(false);
        };
        match self.reload_snapshot(index).await {
            Ok(()) => {
                self.history.commit(index);
                self.observer.track(&SessionEvent::Undo { index });
                Ok(true)
            }
            Err(e) => {
                self.report("undo", &e);
                Err(e)
            }
        }
    }

    /// Step forward one snapshot. `Ok(false)` if there is nothing to redo.
    pub async fn redo(&mut self) -> Result<bool, SaveError> {
        let Some(index) = self.history.redo_target() else {
            return Ok(false);
        };
        match self.reload_snapshot(index).await {
            Ok(()) => {
                self.history.commit(index);
                self.observer.track(&SessionEvent::Redo { index });
                Ok(true)
            }
            Err(e) => {
                self.report("redo", &e);
                Err(e)
            }
        }
    }

    async fn reload_snapshot(&mut self, index: usize) -> Result<(), SaveError> {
        let bytes = self
            .history
            .get(index)
            .cloned()
            .ok_or(SaveError::InvalidState)?;
        let document = self.loader.load(&bytes, LoadOptions::default()).await?;
        self.document = Some(document);
        log::debug!("reloaded snapshot {index}, {} bytes", bytes.len());
        Ok(())
    }

    // ─── Saved-state timeline ────────────────────────────────────────────

    /// Checkpoint the live document and annotations as a named state.
    pub async fn save_state(&mut self) -> Result<(), SaveError> {
        let result = self.try_save_state().await;
        if let Err(e) = &result {
            self.report("save state", e);
        }
        result
    }

    async fn try_save_state(&mut self) -> Result<(), SaveError> {
        let document = self.document.as_ref().ok_or(SaveError::NoDocument)?;
        let snapshot = capture(document).await?;
        let bytes = snapshot.len();
        let name = self
            .states
            .push(snapshot, self.store.snapshot(), Utc::now())
            .name
            .clone();
        log::debug!("{name} saved, {bytes} bytes, {} annotations", self.store.len());
        self.observer.track(&SessionEvent::StateSaved { name });
        Ok(())
    }

    /// Load the previous saved state. `Ok(false)` if there is none.
    pub async fn prev_state(&mut self) -> Result<bool, SaveError> {
        match self.states.prev_target() {
            Some(index) => self.load_state(index).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Load the next saved state. `Ok(false)` if there is none.
    pub async fn next_state(&mut self) -> Result<bool, SaveError> {
        match self.states.next_target() {
            Some(index) => self.load_state(index).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Roll back to saved state `index`: document bytes and annotations are
    /// both replaced. The snapshot timeline is left alone apart from being
    /// marked detached.
    pub async fn load_state(&mut self, index: usize) -> Result<(), SaveError> {
        let result = self.try_load_state(index).await;
        if let Err(e) = &result {
            self.report("load state", e);
        }
        result
    }

    async fn try_load_state(&mut self, index: usize) -> Result<(), SaveError> {
        let state = self.states.get(index).ok_or(SaveError::InvalidState)?;
        let bytes = state.bytes.clone();
        let annotations = state.annotations.clone();
        let name = state.name.clone();

        let document = self.loader.load(&bytes, LoadOptions::default()).await?;
        self.document = Some(document);
        self.store.replace_all(annotations);
        self.interaction.reset();
        self.states.commit(index);
        self.history.detach();

        log::debug!("{name} loaded, {} annotations", self.store.len());
        self.observer.track(&SessionEvent::StateLoaded { name });
        Ok(())
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn saved_states(&self) -> &SavedStates {
        &self.states
    }

    pub fn history_status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            current_state_name: self.states.current_name().to_string(),
            can_prev_state: self.states.can_prev(),
            can_next_state: self.states.can_next(),
            snapshot_count: self.history.len(),
            state_count: self.states.len(),
        }
    }

    fn report(&self, what: &str, error: &SaveError) {
        log::error!("{what} failed: {error}");
        self.observer.alert(&error.user_message());
    }

    // ─── Render and export ───────────────────────────────────────────────

    /// Whether page, scale, rotation or annotations changed since the last
    /// successful render.
    pub fn needs_render(&self) -> bool {
        let key = RenderKey::new(&self.viewport, &self.store);
        self.rendered.is_none_or(|r| r.key != key)
    }

    /// Draw the current frame. `Ok(None)` if nothing changed since the last
    /// frame and `force` is unset. On failure the previous frame stays and
    /// the next call tries again.
    pub async fn render<S: PageSource>(
        &mut self,
        source: &S,
        surface: &mut S::Surface,
        force: bool,
    ) -> Result<Option<FrameInfo>, RenderError> {
        if !force && !self.needs_render() {
            return Ok(None);
        }
        let key = RenderKey::new(&self.viewport, &self.store);
        match render_frame(source, surface, &self.store, &self.viewport).await {
            Ok(frame) => {
                self.rendered = Some(Rendered {
                    key,
                    frame,
                    viewport: self.viewport,
                });
                Ok(Some(frame))
            }
            Err(e) => {
                log::warn!("render failed, keeping previous frame: {e}");
                Err(e)
            }
        }
    }

    /// Page-space size the annotations were placed against.
    pub fn reference_size(&self) -> PixelSize {
        match &self.rendered {
            Some(r) => reference_size(Some(&r.frame), &r.viewport),
            None => reference_size(None, &self.viewport),
        }
    }

    /// Export the annotated document. Composition failures fall back to
    /// the original bytes; only a missing document or a failed fallback
    /// is an error.
    pub async fn export<S, C>(&self, source: &S, composer: &mut C) -> Result<Export, ExportError>
    where
        S: PageSource + ?Sized,
        C: Composer + ?Sized,
    {
        let Some(document) = self.document.as_ref() else {
            return Err(ExportError::NoDocument);
        };
        let mut options = self.config.export;
        if options.reference_size.is_none() {
            options.reference_size = Some(self.reference_size());
        }

        match export_document(source, document, composer, &self.store, &options).await {
            Ok(export) => {
                log::debug!(
                    "exported {} bytes (fallback: {})",
                    export.bytes.len(),
                    export.fell_back()
                );
                self.observer.track(&SessionEvent::Exported {
                    fell_back: export.fell_back(),
                });
                Ok(export)
            }
            Err(e) => {
                log::error!("export failed: {e}");
                self.observer.alert(&format!("Export failed: {e}"));
                Err(e)
            }
        }
    }
}
