//! WASM bridge for FormPad: exposes the editing session to the hosting page.
//!
//! Compiled via `wasm-pack build --target web`. The page must load pdf.js
//! (`pdfjsLib`), pdf-lib (`PDFLib`) and the jsPDF UMD build (`jspdf`) as
//! globals before constructing a [`FormEditor`].

mod deferred;
mod js;
mod jspdf;
mod logger;
mod pdfjs;
mod pdflib;
mod render2d;

pub use jspdf::JsPdfComposer;
pub use pdfjs::PdfJsSource;
pub use pdflib::{PdfLibDocument, PdfLibLoader};
pub use render2d::HtmlCanvas;

use deferred::{DeferredInput, InputQueue};
use fp_core::model::TextSettings;
use fp_core::{LoadError, RenderError};
use fp_editor::input::Modifiers;
use fp_editor::observer::{LogObserver, SessionEvent, SessionObserver};
use fp_editor::session::{EditorSession, SessionConfig};
use fp_editor::shortcuts::ShortcutAction;
use fp_editor::tools::ToolKind;
use fp_render::export::DOWNLOAD_FILENAME;
use fp_render::source::PageSource;
use js_sys::{ArrayBuffer, Promise, Uint8Array};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{CanvasRenderingContext2d, Response};

type Session = EditorSession<PdfLibLoader>;

struct Inner {
    session: Session,
    pages: Option<PdfJsSource>,
    surface: HtmlCanvas,
}

impl Inner {
    /// Draw the frame, then replay input deferred during the call that
    /// held the editor, drawing again until nothing is left. Every async
    /// call ends here. Returns `true` if a frame was drawn.
    async fn render(&mut self, force: bool, deferred: &InputQueue) -> Result<bool, RenderError> {
        let mut drawn = self.draw(force).await;
        while deferred.replay(&mut self.session) {
            let earlier = matches!(drawn, Ok(true));
            drawn = self.draw(false).await.map(|d| d || earlier);
        }
        drawn
    }

    async fn draw(&mut self, force: bool) -> Result<bool, RenderError> {
        let Some(pages) = &self.pages else {
            return Ok(false);
        };
        let frame = self.session.render(pages, &mut self.surface, force).await?;
        Ok(frame.is_some())
    }

    async fn open(&mut self, url: &str) -> Result<u32, LoadError> {
        self.pages = None;
        let bytes = fetch_bytes(url).await?;
        let source = PdfJsSource::open(&bytes).await?;
        let count = source.page_count();
        self.session.open(&bytes, count).await?;
        self.pages = Some(source);
        Ok(count)
    }
}

/// Collects user-facing alerts for the host page to display.
struct BridgeObserver {
    alerts: Rc<RefCell<Vec<String>>>,
}

impl SessionObserver for BridgeObserver {
    fn track(&self, event: &SessionEvent) {
        LogObserver.track(event);
    }

    fn alert(&self, message: &str) {
        LogObserver.alert(message);
        self.alerts.borrow_mut().push(message.to_string());
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, LoadError> {
    let network = |e: JsValue| LoadError::Network(js::message(&e));
    let window =
        web_sys::window().ok_or_else(|| LoadError::Unsupported("no window object".to_string()))?;
    let response: Response = js::settle(window.fetch_with_str(url))
        .await
        .map_err(network)?;
    if !response.ok() {
        return Err(LoadError::Network(format!(
            "Failed to fetch PDF: {} {}",
            response.status(),
            response.status_text()
        )));
    }
    let buffer: ArrayBuffer = js::settle(response.array_buffer().map_err(network)?)
        .await
        .map_err(network)?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    log::debug!("fetched {} bytes from {url}", bytes.len());
    Ok(bytes)
}

fn busy() -> JsValue {
    JsValue::from_str("editor is busy")
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json(value: &impl serde::Serialize) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(to_js)
}

/// The page-facing editor controller.
///
/// Holds the session, the pdf.js page source, and the display canvas. All
/// interaction from the page goes through this struct. Async calls hold
/// the editor for their whole duration. Pointer and draft input made
/// meanwhile is deferred and replayed when the call finishes; any other
/// call is rejected with `"editor is busy"`.
#[wasm_bindgen]
pub struct FormEditor {
    inner: Rc<RefCell<Inner>>,
    alerts: Rc<RefCell<Vec<String>>>,
    deferred: Rc<InputQueue>,
}

#[wasm_bindgen]
impl FormEditor {
    /// Create an editor drawing into the canvas behind `ctx`.
    #[wasm_bindgen(constructor)]
    pub fn new(ctx: CanvasRenderingContext2d) -> Result<FormEditor, JsValue> {
        logger::init(log::LevelFilter::Info);

        let alerts = Rc::new(RefCell::new(Vec::new()));
        let observer = BridgeObserver {
            alerts: Rc::clone(&alerts),
        };
        let session = EditorSession::with_observer(
            PdfLibLoader,
            Box::new(observer),
            SessionConfig::default(),
        );
        let inner = Inner {
            session,
            pages: None,
            surface: HtmlCanvas::from_context(ctx)?,
        };
        Ok(Self {
            inner: Rc::new(RefCell::new(inner)),
            alerts,
            deferred: Rc::new(InputQueue::default()),
        })
    }

    /// The suggested filename for [`FormEditor::download`].
    #[wasm_bindgen(js_name = downloadFilename)]
    pub fn download_filename() -> String {
        DOWNLOAD_FILENAME.to_string()
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Fetch and open the form at `url`, then draw page 1. Resolves to the
    /// page count; rejects with a descriptive message.
    pub fn load(&self, url: String, title: String) -> Promise {
        let inner = Rc::clone(&self.inner);
        let alerts = Rc::clone(&self.alerts);
        let deferred = Rc::clone(&self.deferred);
        future_to_promise(async move {
            let mut inner = inner.try_borrow_mut().map_err(|_| busy())?;
            log::info!("opening {title:?}");
            let opened = inner.open(&url).await;
            let _ = inner.render(true, &deferred).await;
            match opened {
                Ok(count) => Ok(JsValue::from(count)),
                Err(e) => {
                    log::error!("failed to load {url}: {e}");
                    let message = e.user_message();
                    alerts.borrow_mut().push(message.clone());
                    Err(JsValue::from_str(&message))
                }
            }
        })
    }

    /// Draw the current frame if anything changed (or always, if `force`).
    /// Resolves to whether a frame was drawn.
    pub fn render(&self, force: bool) -> Promise {
        let inner = Rc::clone(&self.inner);
        let deferred = Rc::clone(&self.deferred);
        future_to_promise(async move {
            let mut inner = inner.try_borrow_mut().map_err(|_| busy())?;
            let drawn = inner.render(force, &deferred).await.map_err(to_js)?;
            Ok(JsValue::from(drawn))
        })
    }

    /// Run the export pipeline. Resolves to the output bytes.
    pub fn download(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        let deferred = Rc::clone(&self.deferred);
        future_to_promise(async move {
            let mut inner = inner.try_borrow_mut().map_err(|_| busy())?;
            let Some(pages) = inner.pages.as_ref() else {
                return Err(JsValue::from_str("no document is open"));
            };
            let mut composer = JsPdfComposer::new();
            let export = inner.session.export(pages, &mut composer).await;
            let _ = inner.render(false, &deferred).await;
            let export = export.map_err(to_js)?;
            Ok(Uint8Array::from(export.bytes.as_slice()).into())
        })
    }

    // ─── Pointer and text input ──────────────────────────────────────────

    /// Coordinates are canvas-relative CSS pixels. Returns `true` if an
    /// annotation changed; a re-render is scheduled in that case. While the
    /// editor is busy the event is deferred and `false` is returned.
    pub fn pointer_down(&self, x: f64, y: f64) -> bool {
        self.pointer(DeferredInput::PointerDown { x, y })
    }

    pub fn pointer_move(&self, x: f64, y: f64) -> bool {
        self.pointer(DeferredInput::PointerMove { x, y })
    }

    pub fn pointer_up(&self, x: f64, y: f64) -> bool {
        self.pointer(DeferredInput::PointerUp { x, y })
    }

    pub fn double_click(&self, x: f64, y: f64) -> bool {
        self.pointer(DeferredInput::DoubleClick { x, y })
    }

    /// Right-click. The page should suppress the native context menu.
    pub fn context_menu(&self, x: f64, y: f64) -> bool {
        self.pointer(DeferredInput::ContextMenu { x, y })
    }

    /// Mirror the overlay input's value into the open draft.
    pub fn set_draft_text(&self, text: &str) {
        self.pointer(DeferredInput::DraftText(text.to_string()));
    }

    /// Handle a keyboard event. Resolves to the action name, or `null`
    /// when the key is not a shortcut.
    pub fn handle_key(&self, key: String, ctrl: bool, shift: bool, alt: bool, meta: bool) -> Promise {
        let modifiers = Modifiers {
            ctrl,
            shift,
            alt,
            meta,
        };
        let inner = Rc::clone(&self.inner);
        let deferred = Rc::clone(&self.deferred);
        future_to_promise(async move {
            let mut inner = inner.try_borrow_mut().map_err(|_| busy())?;
            let action = inner.session.handle_key(&key, modifiers).await;
            let _ = inner.render(false, &deferred).await;
            Ok(action.map_or(JsValue::NULL, |a| JsValue::from_str(action_name(a))))
        })
    }

    // ─── Tools and settings ──────────────────────────────────────────────

    /// Switch tool by name (`select`, `text`, `highlight`).
    pub fn set_tool(&self, name: &str) -> Result<bool, JsValue> {
        let Some(kind) = ToolKind::from_name(name) else {
            return Ok(false);
        };
        self.with(|s| s.set_tool(kind))?;
        Ok(true)
    }

    pub fn tool(&self) -> Result<String, JsValue> {
        self.with(|s| s.tool().name().to_string())
    }

    pub fn set_text_settings(
        &self,
        font_size: f64,
        color: String,
        font_family: String,
    ) -> Result<(), JsValue> {
        self.with(|s| {
            s.set_text_settings(TextSettings {
                font_size,
                color,
                font_family,
            })
        })
    }

    pub fn set_highlight_color(&self, color: &str) -> Result<(), JsValue> {
        self.with(|s| s.set_highlight_color(color))
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&self) -> Result<bool, JsValue> {
        self.input(|s| s.zoom_in())
    }

    pub fn zoom_out(&self) -> Result<bool, JsValue> {
        self.input(|s| s.zoom_out())
    }

    pub fn rotate(&self) -> Result<bool, JsValue> {
        self.input(|s| {
            s.rotate();
            true
        })
    }

    pub fn next_page(&self) -> Result<bool, JsValue> {
        self.input(|s| s.next_page())
    }

    pub fn prev_page(&self) -> Result<bool, JsValue> {
        self.input(|s| s.prev_page())
    }

    pub fn go_to_page(&self, page: u32) -> Result<bool, JsValue> {
        self.input(|s| s.go_to_page(page))
    }

    // ─── History ─────────────────────────────────────────────────────────
    //
    // Each resolves to the history status JSON. Failures are reported
    // through `takeAlerts`.

    pub fn save(&self) -> Promise {
        self.perform(ShortcutAction::SaveSnapshot)
    }

    pub fn undo(&self) -> Promise {
        self.perform(ShortcutAction::Undo)
    }

    pub fn redo(&self) -> Promise {
        self.perform(ShortcutAction::Redo)
    }

    pub fn save_state(&self) -> Promise {
        self.perform(ShortcutAction::SaveState)
    }

    pub fn prev_state(&self) -> Promise {
        self.perform(ShortcutAction::PrevState)
    }

    pub fn next_state(&self) -> Promise {
        self.perform(ShortcutAction::NextState)
    }

    // ─── State for the toolbar and overlay ───────────────────────────────

    /// All annotations as a JSON array.
    pub fn annotations(&self) -> Result<String, JsValue> {
        self.with(|s| to_json(&s.store().as_slice()))?
    }

    pub fn viewport(&self) -> Result<String, JsValue> {
        self.with(|s| to_json(&s.viewport_status()))?
    }

    #[wasm_bindgen(js_name = historyStatus)]
    pub fn history_status(&self) -> Result<String, JsValue> {
        self.with(|s| to_json(&s.history_status()))?
    }

    /// The open text draft with its overlay position, or `null`.
    #[wasm_bindgen(js_name = textDraft)]
    pub fn text_draft(&self) -> Result<String, JsValue> {
        self.with(|s| {
            let value = match (s.draft(), s.draft_position(), s.draft_font_size()) {
                (Some(draft), Some(at), Some(size)) => serde_json::json!({
                    "draft": draft,
                    "screenX": at.x,
                    "screenY": at.y,
                    "fontSize": size * s.viewport().scale,
                }),
                _ => serde_json::Value::Null,
            };
            value.to_string()
        })
    }

    /// Drain queued user-facing error messages as a JSON array.
    #[wasm_bindgen(js_name = takeAlerts)]
    pub fn take_alerts(&self) -> Result<String, JsValue> {
        let alerts = std::mem::take(&mut *self.alerts.borrow_mut());
        to_json(&alerts)
    }
}

impl FormEditor {
    fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Result<R, JsValue> {
        let mut inner = self.inner.try_borrow_mut().map_err(|_| busy())?;
        Ok(f(&mut inner.session))
    }

    /// Apply pointer or draft input now, or defer it while busy.
    fn pointer(&self, input: DeferredInput) -> bool {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            self.deferred.push(input);
            return false;
        };
        let changed = input.apply(&mut inner.session);
        drop(inner);
        if changed {
            self.schedule_render();
        }
        changed
    }

    fn input(&self, f: impl FnOnce(&mut Session) -> bool) -> Result<bool, JsValue> {
        let changed = self.with(f)?;
        if changed {
            self.schedule_render();
        }
        Ok(changed)
    }

    /// Render on the next tick. Skipped while an async call holds the
    /// editor; that call renders when it finishes.
    fn schedule_render(&self) {
        let inner = Rc::clone(&self.inner);
        let deferred = Rc::clone(&self.deferred);
        spawn_local(async move {
            let Ok(mut inner) = inner.try_borrow_mut() else {
                return;
            };
            let _ = inner.render(false, &deferred).await;
        });
    }

    fn perform(&self, action: ShortcutAction) -> Promise {
        let inner = Rc::clone(&self.inner);
        let deferred = Rc::clone(&self.deferred);
        future_to_promise(async move {
            let mut inner = inner.try_borrow_mut().map_err(|_| busy())?;
            inner.session.perform(action).await;
            let _ = inner.render(false, &deferred).await;
            Ok(JsValue::from_str(&to_json(&inner.session.history_status())?))
        })
    }
}

/// Stable action names reported back to the page.
fn action_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::ToolSelect => "tool_select",
        ShortcutAction::ToolText => "tool_text",
        ShortcutAction::ToolHighlight => "tool_highlight",
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::SaveSnapshot => "save_snapshot",
        ShortcutAction::SaveState => "save_state",
        ShortcutAction::PrevState => "prev_state",
        ShortcutAction::NextState => "next_state",
        ShortcutAction::ZoomIn => "zoom_in",
        ShortcutAction::ZoomOut => "zoom_out",
        ShortcutAction::Rotate => "rotate",
        ShortcutAction::NextPage => "next_page",
        ShortcutAction::PrevPage => "prev_page",
        ShortcutAction::CommitText => "commit_text",
        ShortcutAction::CancelText => "cancel_text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_editor::shortcuts::ShortcutMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn action_names_are_distinct() {
        let actions = [
            ShortcutAction::ToolSelect,
            ShortcutAction::ToolText,
            ShortcutAction::ToolHighlight,
            ShortcutAction::Undo,
            ShortcutAction::Redo,
            ShortcutAction::SaveSnapshot,
            ShortcutAction::SaveState,
            ShortcutAction::PrevState,
            ShortcutAction::NextState,
            ShortcutAction::ZoomIn,
            ShortcutAction::ZoomOut,
            ShortcutAction::Rotate,
            ShortcutAction::NextPage,
            ShortcutAction::PrevPage,
            ShortcutAction::CommitText,
            ShortcutAction::CancelText,
        ];
        let mut names: Vec<_> = actions.iter().map(|a| action_name(*a)).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), actions.len());
    }

    #[test]
    fn resolved_keys_report_names() {
        let undo = ShortcutMap::resolve(
            "z",
            Modifiers {
                meta: true,
                ..Modifiers::NONE
            },
            false,
        );
        assert_eq!(undo.map(action_name), Some("undo"));
        assert_eq!(
            ShortcutMap::resolve("Enter", Modifiers::NONE, true).map(action_name),
            Some("commit_text")
        );
    }

    #[test]
    fn download_filename_is_fixed() {
        assert_eq!(FormEditor::download_filename(), "edited-form.pdf");
    }
}
