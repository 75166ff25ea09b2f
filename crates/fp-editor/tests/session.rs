//! Integration tests: editing session (fp-editor ↔ fp-render ↔ fp-core).
//!
//! Drives `EditorSession` through an in-memory loader whose documents
//! serialize to distinct bytes on every save, so history moves can be
//! checked byte for byte.

use async_trait::async_trait;
use fp_core::document::{DocumentLoader, EditableDocument, LoadOptions};
use fp_core::{
    DocumentError, ExportError, LoadError, RenderError, Rotation, SaveError, TextSettings,
};
use fp_editor::*;
use fp_render::source::check_page;
use fp_render::{
    Canvas, PageSource, PixelSize, RasterImage, RecordingCanvas, RecordingComposer,
};
use kurbo::{Point, Rect};
use pretty_assertions::assert_eq;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const ORIGINAL: &[u8] = b"%PDF-1.7 form";

// ─── Fakes ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct Control {
    saves: Cell<u32>,
    empty_save: Cell<bool>,
    fail_load: Cell<bool>,
    fast_parse_fails: Cell<bool>,
    loads: RefCell<Vec<LoadOptions>>,
}

struct Doc {
    bytes: Vec<u8>,
    control: Rc<Control>,
}

#[async_trait(?Send)]
impl EditableDocument for Doc {
    fn page_count(&self) -> Result<u32, DocumentError> {
        Ok(3)
    }

    async fn save(&self) -> Result<Vec<u8>, DocumentError> {
        if self.control.empty_save.get() {
            return Ok(Vec::new());
        }
        let n = self.control.saves.get() + 1;
        self.control.saves.set(n);
        let mut out = self.bytes.clone();
        out.extend_from_slice(format!(" save{n}").as_bytes());
        Ok(out)
    }
}

struct Loader(Rc<Control>);

#[async_trait(?Send)]
impl DocumentLoader for Loader {
    type Document = Doc;

    async fn load(&self, bytes: &[u8], options: LoadOptions) -> Result<Doc, LoadError> {
        self.0.loads.borrow_mut().push(options);
        if self.0.fail_load.get() {
            return Err(LoadError::classify("Invalid PDF structure"));
        }
        if self.0.fast_parse_fails.get() && !options.thorough {
            return Err(LoadError::classify("Expected instance of t"));
        }
        Ok(Doc {
            bytes: bytes.to_vec(),
            control: Rc::clone(&self.0),
        })
    }
}

#[derive(Default)]
struct Journal {
    events: Vec<SessionEvent>,
    alerts: Vec<String>,
}

struct Recorder(Rc<RefCell<Journal>>);

impl SessionObserver for Recorder {
    fn track(&self, event: &SessionEvent) {
        self.0.borrow_mut().events.push(event.clone());
    }

    fn alert(&self, message: &str) {
        self.0.borrow_mut().alerts.push(message.to_string());
    }
}

struct Pages {
    count: u32,
    broken: bool,
}

#[async_trait(?Send)]
impl PageSource for Pages {
    type Surface = RecordingCanvas;

    fn page_count(&self) -> u32 {
        self.count
    }

    async fn render_page(
        &self,
        page: u32,
        surface: &mut RecordingCanvas,
        scale: f64,
        rotation: Rotation,
    ) -> Result<PixelSize, RenderError> {
        check_page(page, self.count)?;
        let (w, h) = if rotation.is_sideways() {
            (792.0 * scale, 612.0 * scale)
        } else {
            (612.0 * scale, 792.0 * scale)
        };
        surface.set_size(w, h);
        surface.fill_rect(Rect::new(0.0, 0.0, w, h), fp_core::Rgb::WHITE);
        Ok(PixelSize {
            width: w,
            height: h,
        })
    }

    async fn rasterize_page(&self, page: u32, scale: f64) -> Result<RasterImage, RenderError> {
        check_page(page, self.count)?;
        if self.broken {
            return Err(RenderError::Draw("worker terminated".into()));
        }
        Ok(RasterImage {
            data_url: format!("data:image/png;base64,page{page}"),
            width: 612.0 * scale,
            height: 792.0 * scale,
        })
    }
}

struct Bench {
    session: EditorSession<Loader>,
    control: Rc<Control>,
    journal: Rc<RefCell<Journal>>,
}

impl Bench {
    fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let control = Rc::new(Control::default());
        let journal = Rc::new(RefCell::new(Journal::default()));
        let session = EditorSession::with_observer(
            Loader(Rc::clone(&control)),
            Box::new(Recorder(Rc::clone(&journal))),
            SessionConfig::default(),
        );
        Self {
            session,
            control,
            journal,
        }
    }

    async fn opened() -> Self {
        let mut bench = Self::new();
        bench.session.open(ORIGINAL, 3).await.unwrap();
        bench
    }

    fn live_bytes(&self) -> Vec<u8> {
        self.session.document().unwrap().bytes.clone()
    }

    fn snapshot(&self, index: usize) -> Vec<u8> {
        self.session.history().get(index).unwrap().to_vec()
    }

    /// Type a label at a screen point with the text tool.
    async fn write(&mut self, x: f64, y: f64, text: &str) {
        self.session.set_tool(ToolKind::Text);
        self.session.pointer_down(x, y);
        self.session.set_draft_text(text);
        self.session.handle_key("Enter", Modifiers::NONE).await;
    }
}

const CTRL: Modifiers = Modifiers {
    ctrl: true,
    ..Modifiers::NONE
};

// ─── Opening ────────────────────────────────────────────────────────────

#[tokio::test]
async fn open_captures_initial_snapshot() {
    let bench = Bench::opened().await;
    let history = bench.session.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history.cursor(), Some(0));
    assert!(!history.can_undo());
    assert_eq!(bench.session.viewport().total_pages, 3);
    assert_eq!(bench.session.viewport().current_page, 1);
    assert_eq!(
        bench.journal.borrow().events,
        vec![SessionEvent::DocumentLoaded { pages: 3 }]
    );
}

#[tokio::test]
async fn open_retries_with_thorough_parsing() {
    let mut bench = Bench::new();
    bench.control.fast_parse_fails.set(true);
    bench.session.open(ORIGINAL, 3).await.unwrap();
    assert!(bench.session.is_open());
    assert_eq!(
        *bench.control.loads.borrow(),
        vec![LoadOptions::default(), LoadOptions::thorough()]
    );
}

#[tokio::test]
async fn open_failure_leaves_session_closed() {
    let mut bench = Bench::new();
    bench.control.fail_load.set(true);
    let err = bench.session.open(ORIGINAL, 3).await.unwrap_err();
    assert!(err.detail().starts_with("PDF parsing failed"));
    assert!(!bench.session.is_open());
    assert!(bench.session.history().is_empty());
    assert!(!bench.session.pointer_down(10.0, 10.0));
}

#[tokio::test]
async fn reopening_discards_previous_document_state() {
    let mut bench = Bench::opened().await;
    bench.write(50.0, 50.0, "Name").await;
    bench.session.save().await.unwrap();
    bench.session.save_state().await.unwrap();

    bench.session.open(ORIGINAL, 1).await.unwrap();
    assert!(bench.session.store().is_empty());
    assert_eq!(bench.session.history().len(), 1);
    assert!(bench.session.saved_states().is_empty());
    assert_eq!(bench.session.history_status().current_state_name, NO_STATE);
    assert_eq!(bench.session.viewport().total_pages, 1);
}

// ─── Snapshot timeline ──────────────────────────────────────────────────

#[tokio::test]
async fn each_save_advances_cursor() {
    let mut bench = Bench::opened().await;
    for k in 1..=3 {
        bench.session.save().await.unwrap();
        assert_eq!(bench.session.history().cursor(), Some(k));
    }
    assert_eq!(bench.session.history().len(), 4);
    assert!(bench.session.history_status().can_undo);
    assert!(!bench.session.history_status().can_redo);
}

#[tokio::test]
async fn undo_then_redo_restores_identical_bytes() {
    let mut bench = Bench::opened().await;
    for _ in 0..3 {
        bench.session.save().await.unwrap();
    }
    let newest = bench.snapshot(3);

    assert_eq!(bench.session.undo().await, Ok(true));
    assert_eq!(bench.session.undo().await, Ok(true));
    assert_eq!(bench.session.history().cursor(), Some(1));
    assert_eq!(bench.live_bytes(), bench.snapshot(1));

    assert_eq!(bench.session.redo().await, Ok(true));
    assert_eq!(bench.session.redo().await, Ok(true));
    assert_eq!(bench.session.history().cursor(), Some(3));
    assert_eq!(bench.live_bytes(), newest);
    assert_eq!(bench.session.redo().await, Ok(false));
}

#[tokio::test]
async fn undo_at_start_is_a_no_op() {
    let mut bench = Bench::opened().await;
    let loads = bench.control.loads.borrow().len();
    assert_eq!(bench.session.undo().await, Ok(false));
    assert_eq!(bench.control.loads.borrow().len(), loads);
    assert_eq!(bench.live_bytes(), ORIGINAL);
}

#[tokio::test]
async fn save_after_undo_discards_redo() {
    let mut bench = Bench::opened().await;
    bench.session.save().await.unwrap();
    bench.session.save().await.unwrap();
    bench.session.undo().await.unwrap();
    bench.session.undo().await.unwrap();
    assert!(bench.session.history().can_redo());

    bench.session.save().await.unwrap();
    assert_eq!(bench.session.history().len(), 2);
    assert_eq!(bench.session.history().cursor(), Some(1));
    assert!(!bench.session.history().can_redo());
}

#[tokio::test]
async fn empty_save_is_rejected_and_reported() {
    let mut bench = Bench::opened().await;
    bench.control.empty_save.set(true);
    assert_eq!(bench.session.save().await, Err(SaveError::EmptyOutput));
    assert_eq!(bench.session.history().len(), 1);
    assert_eq!(
        bench.journal.borrow().alerts,
        vec!["Could not save the document. Try again.".to_string()]
    );
}

#[tokio::test]
async fn failed_reload_keeps_cursor() {
    let mut bench = Bench::opened().await;
    bench.session.save().await.unwrap();
    bench.session.save().await.unwrap();
    let before = bench.live_bytes();

    bench.control.fail_load.set(true);
    let err = bench.session.undo().await.unwrap_err();
    assert!(matches!(err, SaveError::Reload(LoadError::Malformed(_))));
    assert_eq!(bench.session.history().cursor(), Some(2));
    assert_eq!(bench.live_bytes(), before);
    assert_eq!(bench.journal.borrow().alerts.len(), 1);
}

#[tokio::test]
async fn save_without_document_fails() {
    let mut bench = Bench::new();
    assert_eq!(bench.session.save().await, Err(SaveError::NoDocument));
    assert_eq!(bench.session.save_state().await, Err(SaveError::NoDocument));
}

// ─── Saved states ───────────────────────────────────────────────────────

#[tokio::test]
async fn saved_states_roll_back_annotations_and_bytes() {
    let mut bench = Bench::opened().await;
    bench.write(50.0, 50.0, "First").await;
    bench.session.save_state().await.unwrap();
    let first_bytes = bench.session.saved_states().get(0).unwrap().bytes.to_vec();
    bench.write(80.0, 80.0, "Second").await;
    bench.session.save_state().await.unwrap();
    assert_eq!(bench.session.history_status().current_state_name, "State 0002");

    assert_eq!(bench.session.prev_state().await, Ok(true));
    let status = bench.session.history_status();
    assert_eq!(status.current_state_name, "State 0001");
    assert!(!status.can_prev_state);
    assert!(status.can_next_state);
    assert_eq!(bench.session.store().len(), 1);
    assert_eq!(
        bench.session.store().as_slice()[0].as_text().unwrap().text,
        "First"
    );
    assert_eq!(bench.live_bytes(), first_bytes);

    assert_eq!(bench.session.next_state().await, Ok(true));
    assert_eq!(bench.session.store().len(), 2);
    assert_eq!(bench.session.next_state().await, Ok(false));
}

#[tokio::test]
async fn saved_state_snapshot_is_a_copy() {
    let mut bench = Bench::opened().await;
    bench.write(50.0, 50.0, "Kept").await;
    bench.session.save_state().await.unwrap();
    bench.session.context_menu(50.0, 50.0);
    assert!(bench.session.store().is_empty());

    bench.session.load_state(0).await.unwrap();
    assert_eq!(bench.session.store().len(), 1);
}

#[tokio::test]
async fn loading_a_state_detaches_undo() {
    let mut bench = Bench::opened().await;
    bench.session.save().await.unwrap();
    bench.session.save_state().await.unwrap();
    bench.session.save().await.unwrap();
    bench.session.save().await.unwrap();
    bench.session.undo().await.unwrap();
    assert_eq!(bench.session.history().cursor(), Some(2));
    assert!(bench.session.history().can_redo());

    bench.session.load_state(0).await.unwrap();
    assert!(bench.session.history().is_detached());
    assert!(!bench.session.history_status().can_redo);

    // Undo returns to the snapshot the cursor names, not one before it.
    assert_eq!(bench.session.undo().await, Ok(true));
    assert_eq!(bench.session.history().cursor(), Some(2));
    assert_eq!(bench.live_bytes(), bench.snapshot(2));
    assert!(!bench.session.history().is_detached());
    assert!(bench.session.history().can_redo());
}

#[tokio::test]
async fn failed_state_load_changes_nothing() {
    let mut bench = Bench::opened().await;
    bench.session.save_state().await.unwrap();
    bench.session.save_state().await.unwrap();
    bench.write(50.0, 50.0, "Live").await;

    bench.control.fail_load.set(true);
    assert!(bench.session.prev_state().await.is_err());
    assert_eq!(bench.session.saved_states().cursor(), Some(1));
    assert_eq!(bench.session.store().len(), 1);
    assert!(!bench.session.history().is_detached());
}

// ─── Interaction through the session ────────────────────────────────────

#[tokio::test]
async fn text_commit_maps_screen_to_page() {
    let mut bench = Bench::opened().await;
    for _ in 0..5 {
        bench.session.zoom_in();
    }
    assert_eq!(bench.session.viewport().scale, 2.0);

    bench.session.set_tool(ToolKind::Text);
    bench.session.pointer_down(200.0, 100.0);
    assert_eq!(bench.session.interaction_state(), InteractionState::TextEditing);
    assert_eq!(bench.session.draft_position(), Some(Point::new(200.0, 100.0)));

    bench.session.set_draft_text("  Jane Doe  ");
    assert_eq!(
        bench.session.handle_key("Enter", Modifiers::NONE).await,
        Some(ShortcutAction::CommitText)
    );
    let annotation = &bench.session.store().as_slice()[0];
    let text = annotation.as_text().unwrap();
    assert_eq!(text.text, "Jane Doe");
    assert_eq!(text.origin(), Point::new(100.0, 50.0));
    assert_eq!(annotation.page, 1);
    assert_eq!(bench.session.interaction_state(), InteractionState::Idle);
}

#[tokio::test]
async fn blank_text_is_discarded() {
    let mut bench = Bench::opened().await;
    bench.write(10.0, 10.0, "   ").await;
    assert!(bench.session.store().is_empty());
    assert_eq!(bench.session.draft(), None);
}

#[tokio::test]
async fn escape_cancels_draft() {
    let mut bench = Bench::opened().await;
    bench.session.set_tool(ToolKind::Text);
    bench.session.pointer_down(10.0, 10.0);
    bench.session.set_draft_text("abandoned");
    assert_eq!(
        bench.session.handle_key("Escape", Modifiers::NONE).await,
        Some(ShortcutAction::CancelText)
    );
    assert!(bench.session.store().is_empty());
    assert_eq!(bench.session.draft(), None);
}

#[tokio::test]
async fn highlight_and_drag_at_double_scale() {
    let mut bench = Bench::opened().await;
    for _ in 0..5 {
        bench.session.zoom_in();
    }
    bench.session.set_highlight_color("#00ff00");
    bench.session.set_tool(ToolKind::Highlight);
    assert!(bench.session.pointer_down(20.0, 20.0));
    assert_eq!(
        bench.session.interaction_state(),
        InteractionState::DrawingHighlight
    );
    bench.session.pointer_move(220.0, 120.0);
    bench.session.pointer_up(220.0, 120.0);

    let h = bench.session.store().as_slice()[0].as_highlight().unwrap().clone();
    assert_eq!(h.start(), Point::new(10.0, 10.0));
    assert_eq!(h.end(), Point::new(110.0, 60.0));
    assert_eq!(h.color, "#00ff00");

    // Grab at the center (60, 35) in page space, release 50/50 further on.
    bench.session.set_tool(ToolKind::Select);
    bench.session.pointer_down(120.0, 70.0);
    assert_eq!(
        bench.session.interaction_state(),
        InteractionState::DraggingAnnotation
    );
    bench.session.pointer_move(220.0, 170.0);
    bench.session.pointer_up(220.0, 170.0);

    let h = bench.session.store().as_slice()[0].as_highlight().unwrap();
    assert_eq!(h.start(), Point::new(60.0, 60.0));
    assert_eq!(h.end(), Point::new(160.0, 110.0));
    assert_eq!(bench.session.interaction_state(), InteractionState::Idle);
}

#[tokio::test]
async fn page_change_ends_pointer_gestures() {
    let mut bench = Bench::opened().await;
    bench.session.set_tool(ToolKind::Highlight);
    assert!(bench.session.pointer_down(10.0, 10.0));
    assert!(bench.session.next_page());
    assert_eq!(bench.session.interaction_state(), InteractionState::Idle);
    assert!(!bench.session.pointer_move(200.0, 300.0));
    bench.session.pointer_up(200.0, 300.0);

    let first = &bench.session.store().as_slice()[0];
    assert_eq!(first.page, 1);
    let h = first.as_highlight().unwrap();
    assert_eq!(h.start(), Point::new(10.0, 10.0));
    assert_eq!(h.end(), Point::new(10.0, 10.0));

    // A drag started on page 1 does not follow the user to page 3.
    bench.session.prev_page();
    bench.session.set_tool(ToolKind::Select);
    bench.session.pointer_down(10.0, 10.0);
    assert_eq!(
        bench.session.interaction_state(),
        InteractionState::DraggingAnnotation
    );
    assert!(bench.session.go_to_page(3));
    assert!(!bench.session.pointer_move(300.0, 300.0));
    let h = bench.session.store().as_slice()[0].as_highlight().unwrap();
    assert_eq!(h.start(), Point::new(10.0, 10.0));
}

#[tokio::test]
async fn double_click_edits_in_place() {
    let mut bench = Bench::opened().await;
    bench.write(100.0, 100.0, "Hello").await;
    let id = bench.session.store().as_slice()[0].id;

    bench.session.set_tool(ToolKind::Select);
    bench.session.double_click(105.0, 98.0);
    let draft = bench.session.draft().unwrap();
    assert_eq!(draft.editing, Some(id));
    assert_eq!(draft.text, "Hello");

    bench.session.set_draft_text("Goodbye");
    bench.session.handle_key("Enter", Modifiers::NONE).await;
    assert_eq!(bench.session.store().len(), 1);
    let annotation = bench.session.store().get(id).unwrap();
    assert_eq!(annotation.as_text().unwrap().text, "Goodbye");
}

#[tokio::test]
async fn edit_overlay_uses_the_label_font_size() {
    let mut bench = Bench::opened().await;
    bench.session.set_text_settings(TextSettings {
        font_size: 12.0,
        ..TextSettings::default()
    });
    bench.write(100.0, 100.0, "Small").await;
    bench.session.set_text_settings(TextSettings {
        font_size: 30.0,
        ..TextSettings::default()
    });
    assert_eq!(bench.session.draft_font_size(), None);

    bench.session.set_tool(ToolKind::Select);
    bench.session.double_click(102.0, 98.0);
    assert!(bench.session.draft().unwrap().editing.is_some());
    assert_eq!(bench.session.draft_font_size(), Some(12.0));

    bench.session.handle_key("Escape", Modifiers::NONE).await;
    bench.session.set_tool(ToolKind::Text);
    bench.session.pointer_down(300.0, 300.0);
    assert_eq!(bench.session.draft_font_size(), Some(30.0));
}

#[tokio::test]
async fn right_click_removes_text_only() {
    let mut bench = Bench::opened().await;
    bench.session.set_tool(ToolKind::Highlight);
    bench.session.pointer_down(300.0, 300.0);
    bench.session.pointer_move(340.0, 320.0);
    bench.session.pointer_up(340.0, 320.0);
    bench.write(100.0, 100.0, "Remove me").await;
    assert_eq!(bench.session.store().len(), 2);

    assert!(!bench.session.context_menu(320.0, 310.0));
    assert!(bench.session.context_menu(110.0, 100.0));
    assert_eq!(bench.session.store().len(), 1);
    assert!(!bench.session.store().as_slice()[0].is_text());

    let journal = bench.journal.borrow();
    assert!(
        journal
            .events
            .iter()
            .any(|e| matches!(e, SessionEvent::AnnotationRemoved { .. }))
    );
}

#[tokio::test]
async fn annotations_belong_to_their_page() {
    let mut bench = Bench::opened().await;
    bench.session.next_page();
    bench.write(40.0, 40.0, "Page two").await;
    assert_eq!(bench.session.store().as_slice()[0].page, 2);

    bench.session.prev_page();
    bench.session.set_tool(ToolKind::Select);
    bench.session.pointer_down(40.0, 40.0);
    assert_eq!(bench.session.interaction_state(), InteractionState::Idle);
}

// ─── Shortcuts ──────────────────────────────────────────────────────────

#[tokio::test]
async fn shortcuts_drive_the_session() {
    let mut bench = Bench::opened().await;

    assert_eq!(
        bench.session.handle_key("h", Modifiers::NONE).await,
        Some(ShortcutAction::ToolHighlight)
    );
    assert_eq!(bench.session.tool(), ToolKind::Highlight);

    bench.session.handle_key("r", Modifiers::NONE).await;
    assert_eq!(bench.session.viewport().rotation, Rotation::Deg90);

    bench.session.handle_key("PageDown", Modifiers::NONE).await;
    assert_eq!(bench.session.viewport().current_page, 2);

    bench.session.handle_key("=", CTRL).await;
    assert_eq!(bench.session.viewport().scale, 1.2);

    bench.session.handle_key("s", CTRL).await;
    assert_eq!(bench.session.history().len(), 2);
    bench.session.handle_key("z", CTRL).await;
    assert_eq!(bench.session.history().cursor(), Some(0));
    bench.session.handle_key("y", CTRL).await;
    assert_eq!(bench.session.history().cursor(), Some(1));

    assert_eq!(bench.session.handle_key("q", Modifiers::NONE).await, None);
}

#[tokio::test]
async fn open_draft_swallows_tool_keys() {
    let mut bench = Bench::opened().await;
    bench.session.set_tool(ToolKind::Text);
    bench.session.pointer_down(10.0, 10.0);
    assert_eq!(bench.session.handle_key("v", Modifiers::NONE).await, None);
    assert_eq!(bench.session.tool(), ToolKind::Text);
}

// ─── Render and export ──────────────────────────────────────────────────

#[tokio::test]
async fn render_skips_unchanged_frames() {
    let mut bench = Bench::opened().await;
    let pages = Pages {
        count: 3,
        broken: false,
    };
    let mut surface = RecordingCanvas::default();

    let frame = bench.session.render(&pages, &mut surface, false).await.unwrap();
    assert!(frame.is_some());
    assert!(!bench.session.needs_render());
    assert_eq!(
        bench.session.render(&pages, &mut surface, false).await,
        Ok(None)
    );

    bench.write(50.0, 50.0, "Dirty").await;
    assert!(bench.session.needs_render());
    assert!(
        bench
            .session
            .render(&pages, &mut surface, false)
            .await
            .unwrap()
            .is_some()
    );
    assert_eq!(surface.texts().count(), 1);

    assert!(
        bench
            .session
            .render(&pages, &mut surface, true)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn reference_size_undoes_scale_and_rotation() {
    let mut bench = Bench::opened().await;
    let pages = Pages {
        count: 3,
        broken: false,
    };
    let mut surface = RecordingCanvas::default();
    assert_eq!(
        bench.session.reference_size(),
        PixelSize {
            width: 612.0,
            height: 792.0
        }
    );

    for _ in 0..5 {
        bench.session.zoom_in();
    }
    bench.session.rotate();
    bench.session.render(&pages, &mut surface, false).await.unwrap();
    assert_eq!(
        bench.session.reference_size(),
        PixelSize {
            width: 612.0,
            height: 792.0
        }
    );
}

#[tokio::test]
async fn export_composes_pages() {
    let mut bench = Bench::opened().await;
    bench.write(50.0, 50.0, "Signed").await;
    let pages = Pages {
        count: 3,
        broken: false,
    };
    let mut composer = RecordingComposer::default();

    let export = bench.session.export(&pages, &mut composer).await.unwrap();
    assert!(!export.fell_back());
    assert_eq!(composer.page_count(), 3);
    assert!(
        bench
            .journal
            .borrow()
            .events
            .contains(&SessionEvent::Exported { fell_back: false })
    );
}

#[tokio::test]
async fn export_falls_back_to_original_bytes() {
    let mut bench = Bench::opened().await;
    let pages = Pages {
        count: 3,
        broken: true,
    };
    let mut composer = RecordingComposer::default();

    let export = bench.session.export(&pages, &mut composer).await.unwrap();
    assert!(export.fell_back());
    assert!(export.bytes.starts_with(ORIGINAL));
    assert!(
        bench
            .journal
            .borrow()
            .events
            .contains(&SessionEvent::Exported { fell_back: true })
    );
}

#[tokio::test]
async fn export_without_document_fails() {
    let bench = Bench::new();
    let pages = Pages {
        count: 1,
        broken: false,
    };
    let mut composer = RecordingComposer::default();
    assert_eq!(
        bench.session.export(&pages, &mut composer).await,
        Err(ExportError::NoDocument)
    );
}

#[tokio::test]
async fn history_status_is_camel_case_json() {
    let mut bench = Bench::opened().await;
    bench.session.save().await.unwrap();
    let json = serde_json::to_value(bench.session.history_status()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "canUndo": true,
            "canRedo": false,
            "currentStateName": "No State",
            "canPrevState": false,
            "canNextState": false,
            "snapshotCount": 2,
            "stateCount": 0,
        })
    );
}

#[tokio::test]
async fn viewport_status_reports_toolbar_flags() {
    let mut bench = Bench::opened().await;
    bench.session.zoom_in();
    bench.session.next_page();
    let json = serde_json::to_value(bench.session.viewport_status()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "scale": 1.2,
            "rotation": 0,
            "currentPage": 2,
            "totalPages": 3,
            "zoomPercent": 120,
            "canPrevPage": true,
            "canNextPage": true,
        })
    );

    bench.session.go_to_page(3);
    let status = bench.session.viewport_status();
    assert!(status.can_prev_page);
    assert!(!status.can_next_page);
}
