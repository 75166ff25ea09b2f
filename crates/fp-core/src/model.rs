//! Annotation data model.
//!
//! Annotations are stored in unscaled, unrotated page space. Screen-space
//! input goes through [`crate::viewport`] before it reaches the store, so
//! zoom and rotation never leak into stored geometry.

use crate::id::AnnotationId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default highlight color picked in the toolbar.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#FFFFFF";

/// A single annotation placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    /// 1-based page the annotation was created on.
    pub page: u32,
    #[serde(flatten)]
    pub kind: AnnotationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnnotationKind {
    Text(TextAnnotation),
    Highlight(HighlightAnnotation),
}

/// A text label. `(x, y)` is the baseline origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnnotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font_size: f64,
    pub color: String,
    pub font_family: String,
}

/// A filled rectangle. Corners may be in any order while a drag is active;
/// consumers normalize through [`HighlightAnnotation::bounds`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightAnnotation {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub color: String,
}

impl TextAnnotation {
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl HighlightAnnotation {
    /// Degenerate rectangle anchored at a single point.
    pub fn at(point: Point, color: &str) -> Self {
        Self {
            start_x: point.x,
            start_y: point.y,
            end_x: point.x,
            end_y: point.y,
            color: color.to_string(),
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    /// Normalized bounds (min/max of both corners).
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.start_x.min(self.end_x),
            self.start_y.min(self.end_y),
            self.start_x.max(self.end_x),
            self.start_y.max(self.end_y),
        )
    }

    pub fn center(&self) -> Point {
        self.start().midpoint(self.end())
    }

    /// Translate both corners, preserving width and height.
    pub fn translate(&mut self, delta: Vec2) {
        self.start_x += delta.x;
        self.start_y += delta.y;
        self.end_x += delta.x;
        self.end_y += delta.y;
    }
}

impl Annotation {
    pub fn text(page: u32, text: TextAnnotation) -> Self {
        Self {
            id: AnnotationId::fresh("text"),
            page,
            kind: AnnotationKind::Text(text),
        }
    }

    pub fn highlight(page: u32, highlight: HighlightAnnotation) -> Self {
        Self {
            id: AnnotationId::fresh("highlight"),
            page,
            kind: AnnotationKind::Highlight(highlight),
        }
    }

    /// Reference point used for hit-testing and drag offsets: the origin for
    /// text, the rectangle center for highlights.
    pub fn anchor(&self) -> Point {
        match &self.kind {
            AnnotationKind::Text(t) => t.origin(),
            AnnotationKind::Highlight(h) => h.center(),
        }
    }

    /// Move the annotation so its anchor lands on `to`.
    pub fn move_anchor_to(&mut self, to: Point) {
        match &mut self.kind {
            AnnotationKind::Text(t) => {
                t.x = to.x;
                t.y = to.y;
            }
            AnnotationKind::Highlight(h) => {
                let delta = to - h.center();
                h.translate(delta);
            }
        }
    }

    pub fn as_text(&self) -> Option<&TextAnnotation> {
        match &self.kind {
            AnnotationKind::Text(t) => Some(t),
            AnnotationKind::Highlight(_) => None,
        }
    }

    pub fn as_highlight(&self) -> Option<&HighlightAnnotation> {
        match &self.kind {
            AnnotationKind::Highlight(h) => Some(h),
            AnnotationKind::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, AnnotationKind::Text(_))
    }
}

/// Style applied to newly committed text annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSettings {
    pub font_size: f64,
    pub color: String,
    pub font_family: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            color: "#000000".to_string(),
            font_family: "Arial".to_string(),
        }
    }
}

impl TextSettings {
    /// Build a text annotation body at `origin` using these settings.
    pub fn apply(&self, origin: Point, text: &str) -> TextAnnotation {
        TextAnnotation {
            x: origin.x,
            y: origin.y,
            text: text.to_string(),
            font_size: self.font_size,
            color: self.color.clone(),
            font_family: self.font_family.clone(),
        }
    }
}
