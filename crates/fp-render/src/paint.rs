//! Annotation store → canvas drawing commands.
//!
//! A frame is the page raster from the [`PageSource`] with the current
//! page's annotations painted on top in insertion order. Highlights are
//! opaque, so a later one fully covers an earlier one.

use crate::canvas::{Canvas, CanvasFont};
use crate::source::{PageSource, check_page};
use fp_core::model::{Annotation, AnnotationKind, HighlightAnnotation, TextAnnotation};
use fp_core::store::AnnotationStore;
use fp_core::viewport::{Rotation, ViewportState, page_to_screen};
use fp_core::{RenderError, Rgb};
use kurbo::{Point, Rect};
use serde::Serialize;

/// What a successful render produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInfo {
    pub page: u32,
    pub width: f64,
    pub height: f64,
}

/// Everything a frame depends on. Equal keys draw identical frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderKey {
    pub page: u32,
    pub scale: f64,
    pub rotation: Rotation,
    pub revision: u64,
}

impl RenderKey {
    pub fn new(viewport: &ViewportState, store: &AnnotationStore) -> Self {
        Self {
            page: viewport.current_page,
            scale: viewport.scale,
            rotation: viewport.rotation,
            revision: store.revision(),
        }
    }
}

/// Draw the current page and its annotations.
///
/// On error nothing past the page raster is drawn and the surface keeps
/// whatever the source left there.
pub async fn render_frame<S: PageSource>(
    source: &S,
    surface: &mut S::Surface,
    store: &AnnotationStore,
    viewport: &ViewportState,
) -> Result<FrameInfo, RenderError> {
    let page = viewport.current_page;
    check_page(page, source.page_count())?;

    let size = source
        .render_page(page, surface, viewport.scale, viewport.rotation)
        .await?;
    paint_annotations(surface, store.on_page(page), viewport);

    log::debug!(
        "rendered page {page} at {}x{} (scale {}, {}°)",
        size.width,
        size.height,
        viewport.scale,
        viewport.rotation.degrees()
    );
    Ok(FrameInfo {
        page,
        width: size.width,
        height: size.height,
    })
}

/// Paint annotations in iteration order, mapped to screen space.
pub fn paint_annotations<'a, C: Canvas + ?Sized>(
    canvas: &mut C,
    annotations: impl IntoIterator<Item = &'a Annotation>,
    viewport: &ViewportState,
) {
    for annotation in annotations {
        match &annotation.kind {
            AnnotationKind::Text(t) => paint_text(canvas, t, viewport),
            AnnotationKind::Highlight(h) => paint_highlight(canvas, h, viewport),
        }
    }
}

// ─── Painters ────────────────────────────────────────────────────────────────

fn paint_text<C: Canvas + ?Sized>(canvas: &mut C, t: &TextAnnotation, viewport: &ViewportState) {
    let origin = page_to_screen(t.origin(), viewport);
    let font = CanvasFont {
        size_px: t.font_size * viewport.scale,
        family: t.font_family.clone(),
    };
    canvas.fill_text(&t.text, origin, &font, Rgb::resolve(&t.color));
}

fn paint_highlight<C: Canvas + ?Sized>(
    canvas: &mut C,
    h: &HighlightAnnotation,
    viewport: &ViewportState,
) {
    let bounds = h.bounds();
    let rect = Rect::from_points(
        page_to_screen(bounds.origin(), viewport),
        page_to_screen(Point::new(bounds.x1, bounds.y1), viewport),
    );
    canvas.fill_rect(rect, Rgb::resolve(&h.color));
}
