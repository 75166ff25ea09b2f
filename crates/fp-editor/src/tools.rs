//! Tool system and interaction state machine.
//!
//! Each tool translates page-space input events into `AnnotationMutation`s
//! that the session applies to the store. [`Interaction`] owns one instance
//! of every tool, routes events to the active one, and handles the
//! tool-independent gestures (double-click edit, right-click delete).
//!
//! | State | Entered by | Left by |
//! |-------|------------|---------|
//! | `Idle` | | |
//! | `DrawingHighlight` | highlight tool, pointer-down | pointer-up |
//! | `DraggingAnnotation` | select tool, pointer-down on a hit | pointer-up |
//! | `TextEditing` | text tool pointer-down, double-click on text | Enter, Escape |

use crate::input::InputEvent;
use fp_core::id::AnnotationId;
use fp_core::model::{Annotation, HighlightAnnotation, TextSettings};
use fp_core::store::{AnnotationMutation, AnnotationPatch, AnnotationStore};
use fp_core::viewport::{ViewportState, page_to_screen};
use fp_render::hit::{HitConfig, HitFilter, find_hit};
use kurbo::{Point, Vec2};
use serde::Serialize;
use smallvec::{SmallVec, smallvec};

/// Mutations produced by a single event. Never more than two.
pub type Mutations = SmallVec<[AnnotationMutation; 2]>;

/// The active tool determines how pointer events are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Text,
    Highlight,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Text => "text",
            ToolKind::Highlight => "highlight",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "select" => Some(ToolKind::Select),
            "text" => Some(ToolKind::Text),
            "highlight" => Some(ToolKind::Highlight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionState {
    #[default]
    Idle,
    DrawingHighlight,
    DraggingAnnotation,
    TextEditing,
}

/// Inputs a tool needs besides the event itself.
pub struct ToolContext<'a> {
    /// Page that is currently shown.
    pub page: u32,
    /// Annotation under the pointer, if any.
    pub hit: Option<&'a Annotation>,
    pub text_settings: &'a TextSettings,
    pub highlight_color: &'a str,
}

/// Trait for tools that handle input and produce mutations.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle a page-space input event, returning zero or more mutations.
    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext<'_>) -> Mutations;

    /// Whether a gesture is in progress.
    fn is_active(&self) -> bool;

    /// Abandon any in-progress gesture without mutating.
    fn cancel(&mut self);
}

// ─── Select Tool ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    id: AnnotationId,
    /// Click point minus the annotation's anchor at pointer-down.
    offset: Vec2,
}

#[derive(Debug, Default)]
pub struct SelectTool {
    drag: Option<Drag>,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The annotation being dragged.
    pub fn dragging(&self) -> Option<AnnotationId> {
        self.drag.map(|d| d.id)
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext<'_>) -> Mutations {
        match *event {
            InputEvent::PointerDown { x, y } => {
                self.drag = ctx.hit.map(|a| Drag {
                    id: a.id,
                    offset: Point::new(x, y) - a.anchor(),
                });
                smallvec![]
            }
            InputEvent::PointerMove { x, y } => match self.drag {
                Some(drag) => smallvec![AnnotationMutation::Update {
                    id: drag.id,
                    patch: AnnotationPatch::anchor(Point::new(x, y) - drag.offset),
                }],
                None => smallvec![],
            },
            InputEvent::PointerUp { .. } => {
                self.drag = None;
                smallvec![]
            }
            _ => smallvec![],
        }
    }

    fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    fn cancel(&mut self) {
        self.drag = None;
    }
}

// ─── Highlight Tool ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct HighlightTool {
    /// Highlight appended by the current gesture.
    drawing: Option<AnnotationId>,
}

impl HighlightTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for HighlightTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Highlight
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext<'_>) -> Mutations {
        match *event {
            InputEvent::PointerDown { x, y } => {
                let annotation = Annotation::highlight(
                    ctx.page,
                    HighlightAnnotation::at(Point::new(x, y), ctx.highlight_color),
                );
                self.drawing = Some(annotation.id);
                smallvec![AnnotationMutation::Add {
                    annotation: Box::new(annotation),
                }]
            }
            InputEvent::PointerMove { x, y } => match self.drawing {
                Some(id) => smallvec![AnnotationMutation::Update {
                    id,
                    patch: AnnotationPatch::end(Point::new(x, y)),
                }],
                None => smallvec![],
            },
            // The rectangle persists even if degenerate.
            InputEvent::PointerUp { .. } => {
                self.drawing = None;
                smallvec![]
            }
            _ => smallvec![],
        }
    }

    fn is_active(&self) -> bool {
        self.drawing.is_some()
    }

    fn cancel(&mut self) {
        self.drawing = None;
    }
}

// ─── Text Tool ───────────────────────────────────────────────────────────

/// Pending text input shown in the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDraft {
    /// Page-space baseline origin.
    pub anchor: Point,
    pub page: u32,
    pub text: String,
    /// Existing annotation being edited, `None` for a new label.
    pub editing: Option<AnnotationId>,
}

impl TextDraft {
    pub fn new(page: u32, anchor: Point) -> Self {
        Self {
            anchor,
            page,
            text: String::new(),
            editing: None,
        }
    }

    /// Draft for editing an existing text annotation. The stored record is
    /// left untouched until commit.
    pub fn edit(annotation: &Annotation) -> Option<Self> {
        let t = annotation.as_text()?;
        Some(Self {
            anchor: t.origin(),
            page: annotation.page,
            text: t.text.clone(),
            editing: Some(annotation.id),
        })
    }

    /// Where the host should place the input overlay.
    pub fn screen_position(&self, viewport: &ViewportState) -> Point {
        page_to_screen(self.anchor, viewport)
    }
}

#[derive(Debug, Default)]
pub struct TextTool {
    draft: Option<TextDraft>,
}

impl TextTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> Option<&TextDraft> {
        self.draft.as_ref()
    }

    pub fn open(&mut self, draft: TextDraft) {
        self.draft = Some(draft);
    }

    /// Close the draft, producing the mutation it commits to (if any).
    fn commit(&mut self, settings: &TextSettings) -> Mutations {
        let Some(draft) = self.draft.take() else {
            return smallvec![];
        };
        let text = draft.text.trim();
        if text.is_empty() {
            return smallvec![];
        }
        match draft.editing {
            Some(id) => smallvec![AnnotationMutation::Update {
                id,
                patch: AnnotationPatch::text(text),
            }],
            None => smallvec![AnnotationMutation::Add {
                annotation: Box::new(Annotation::text(
                    draft.page,
                    settings.apply(draft.anchor, text),
                )),
            }],
        }
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext<'_>) -> Mutations {
        match event {
            InputEvent::PointerDown { x, y } => {
                self.draft = Some(TextDraft::new(ctx.page, Point::new(*x, *y)));
                smallvec![]
            }
            InputEvent::TextInput { text } => {
                if let Some(draft) = &mut self.draft {
                    draft.text.clone_from(text);
                }
                smallvec![]
            }
            InputEvent::Key { key, .. } if key == "Enter" => self.commit(ctx.text_settings),
            InputEvent::Key { key, .. } if key == "Escape" => {
                self.draft = None;
                smallvec![]
            }
            _ => smallvec![],
        }
    }

    fn is_active(&self) -> bool {
        self.draft.is_some()
    }

    fn cancel(&mut self) {
        self.draft = None;
    }
}

// ─── Interaction ─────────────────────────────────────────────────────────

/// The interaction state machine: active tool plus per-tool gesture state.
#[derive(Debug, Default)]
pub struct Interaction {
    tool: ToolKind,
    select: SelectTool,
    highlight: HighlightTool,
    text: TextTool,
    pub hit_config: HitConfig,
}

impl Interaction {
    pub fn new(hit_config: HitConfig) -> Self {
        Self {
            hit_config,
            ..Self::default()
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tools. Pointer gestures in flight are dropped; an open text
    /// draft survives.
    pub fn set_tool(&mut self, kind: ToolKind) {
        if kind != self.tool {
            self.cancel_gestures();
            self.tool = kind;
        }
    }

    /// Drop an in-flight drag or highlight. An open text draft is kept.
    pub fn cancel_gestures(&mut self) {
        self.select.cancel();
        self.highlight.cancel();
    }

    pub fn state(&self) -> InteractionState {
        if self.highlight.is_active() {
            InteractionState::DrawingHighlight
        } else if self.select.is_active() {
            InteractionState::DraggingAnnotation
        } else if self.text.is_active() {
            InteractionState::TextEditing
        } else {
            InteractionState::Idle
        }
    }

    pub fn draft(&self) -> Option<&TextDraft> {
        self.text.draft()
    }

    pub fn dragging(&self) -> Option<AnnotationId> {
        self.select.dragging()
    }

    /// Back to `Idle`, discarding every gesture and draft.
    pub fn reset(&mut self) {
        self.cancel_gestures();
        self.text.cancel();
    }

    /// Feed a page-space event through the state machine.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        store: &AnnotationStore,
        page: u32,
        text_settings: &TextSettings,
        highlight_color: &str,
    ) -> Mutations {
        let hit = |filter: HitFilter| {
            event
                .position()
                .and_then(|p| find_hit(store, page, p, filter, &self.hit_config))
                .and_then(|id| store.get(id))
        };
        let mut ctx = ToolContext {
            page,
            hit: None,
            text_settings,
            highlight_color,
        };

        match event {
            InputEvent::DoubleClick { .. } => {
                if let Some(draft) = hit(HitFilter::TextOnly).and_then(TextDraft::edit) {
                    log::debug!("editing {:?}", draft.editing);
                    self.text.open(draft);
                }
                smallvec![]
            }
            InputEvent::ContextMenu { .. } => match hit(HitFilter::TextOnly) {
                Some(target) => {
                    if self.text.draft().and_then(|d| d.editing) == Some(target.id) {
                        self.text.cancel();
                    }
                    if self.select.dragging() == Some(target.id) {
                        self.select.cancel();
                    }
                    smallvec![AnnotationMutation::Remove { id: target.id }]
                }
                None => smallvec![],
            },
            // Keys and overlay input belong to the open draft, whatever the tool.
            InputEvent::Key { .. } | InputEvent::TextInput { .. } => {
                self.text.handle(event, &ctx)
            }
            InputEvent::PointerDown { .. } => match self.tool {
                ToolKind::Select => {
                    // Clicking away from the overlay abandons the draft.
                    self.text.cancel();
                    ctx.hit = hit(HitFilter::Any);
                    self.select.handle(event, &ctx)
                }
                ToolKind::Highlight => {
                    self.text.cancel();
                    self.highlight.handle(event, &ctx)
                }
                ToolKind::Text => self.text.handle(event, &ctx),
            },
            InputEvent::PointerMove { .. } | InputEvent::PointerUp { .. } => match self.tool {
                ToolKind::Select => self.select.handle(event, &ctx),
                ToolKind::Highlight => self.highlight.handle(event, &ctx),
                ToolKind::Text => smallvec![],
            },
        }
    }
}
