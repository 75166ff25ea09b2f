//! Raster export: original pages as images, annotations drawn on top.
//!
//! Every page is rasterized through the [`PageSource`] and placed as a
//! full-page background. Annotations are mapped from page space into
//! physical units with independent horizontal and vertical factors. Any
//! failure while composing falls back to the unmodified document bytes.

use crate::compose::{Composer, OutputFont, PageSize};
use crate::paint::FrameInfo;
use crate::source::{PageSource, PixelSize};
use fp_core::document::EditableDocument;
use fp_core::model::{Annotation, AnnotationKind};
use fp_core::store::AnnotationStore;
use fp_core::viewport::ViewportState;
use fp_core::{ExportError, Rgb};
use kurbo::{Point, Rect};

/// Name offered to the browser when saving the export.
pub const DOWNLOAD_FILENAME: &str = "edited-form.pdf";

/// Reference size used when no page has been displayed yet (US Letter in points).
pub const FALLBACK_REFERENCE_SIZE: PixelSize = PixelSize {
    width: 612.0,
    height: 792.0,
};

/// Which output pages receive which annotations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnnotationScope {
    /// Each annotation goes on the page it was created on.
    #[default]
    OwnPage,
    /// Every annotation is replayed on page 1 only.
    FirstPageOnly,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub page_size: PageSize,
    pub raster_scale: f64,
    /// Page-space size the annotations were placed against.
    pub reference_size: Option<PixelSize>,
    pub scope: AnnotationScope,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            raster_scale: 1.0,
            reference_size: None,
            scope: AnnotationScope::OwnPage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Composed,
    /// Composition failed; the bytes are the original document.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub bytes: Vec<u8>,
    pub kind: ExportKind,
}

impl Export {
    pub fn fell_back(&self) -> bool {
        self.kind == ExportKind::Fallback
    }
}

/// Page-space size of the displayed page.
///
/// The rendered canvas is divided by the scale, and for sideways rotations
/// width and height are swapped back.
pub fn reference_size(frame: Option<&FrameInfo>, viewport: &ViewportState) -> PixelSize {
    let Some(frame) = frame else {
        return FALLBACK_REFERENCE_SIZE;
    };
    if frame.width <= 0.0 || frame.height <= 0.0 || viewport.scale <= 0.0 {
        return FALLBACK_REFERENCE_SIZE;
    }
    let (w, h) = if viewport.rotation.is_sideways() {
        (frame.height, frame.width)
    } else {
        (frame.width, frame.height)
    };
    PixelSize {
        width: w / viewport.scale,
        height: h / viewport.scale,
    }
}

/// Export the document with annotations composited onto rasterized pages.
///
/// Only fails if the fallback serialization fails too.
pub async fn export_document<S, D, C>(
    source: &S,
    document: &D,
    composer: &mut C,
    store: &AnnotationStore,
    options: &ExportOptions,
) -> Result<Export, ExportError>
where
    S: PageSource + ?Sized,
    D: EditableDocument + ?Sized,
    C: Composer + ?Sized,
{
    match compose(source, composer, store, options).await {
        Ok(bytes) => {
            log::debug!("composed export, {} bytes", bytes.len());
            Ok(Export {
                bytes,
                kind: ExportKind::Composed,
            })
        }
        Err(e) => {
            log::warn!("export composition failed, falling back to original: {e}");
            let bytes = document.save().await?;
            Ok(Export {
                bytes,
                kind: ExportKind::Fallback,
            })
        }
    }
}

async fn compose<S, C>(
    source: &S,
    composer: &mut C,
    store: &AnnotationStore,
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError>
where
    S: PageSource + ?Sized,
    C: Composer + ?Sized,
{
    let reference = options.reference_size.unwrap_or(FALLBACK_REFERENCE_SIZE);
    let mapping = Mapping::new(reference, options.page_size);
    let total = source.page_count();

    for page in 1..=total {
        let image = source.rasterize_page(page, options.raster_scale).await?;
        composer.add_page(options.page_size)?;
        composer.draw_image(&image, options.page_size.rect())?;

        let annotations: Vec<&Annotation> = match options.scope {
            AnnotationScope::OwnPage => store.on_page(page).collect(),
            AnnotationScope::FirstPageOnly if page == 1 => store.iter().collect(),
            AnnotationScope::FirstPageOnly => Vec::new(),
        };
        for annotation in annotations {
            draw_annotation(composer, annotation, &mapping)?;
        }
        log::debug!("page {page}/{total} composed");
    }

    let bytes = composer.output()?;
    if bytes.is_empty() {
        return Err(ExportError::Compose("composer produced no output".into()));
    }
    Ok(bytes)
}

// ─── Mapping ─────────────────────────────────────────────────────────────────

/// Per-axis page space → physical units.
struct Mapping {
    sx: f64,
    sy: f64,
}

impl Mapping {
    fn new(reference: PixelSize, page: PageSize) -> Self {
        Self {
            sx: page.width / reference.width,
            sy: page.height / reference.height,
        }
    }

    fn point(&self, p: Point) -> Point {
        Point::new(p.x * self.sx, p.y * self.sy)
    }

    fn rect(&self, r: Rect) -> Rect {
        Rect::new(r.x0 * self.sx, r.y0 * self.sy, r.x1 * self.sx, r.y1 * self.sy)
    }
}

fn draw_annotation<C: Composer + ?Sized>(
    composer: &mut C,
    annotation: &Annotation,
    mapping: &Mapping,
) -> Result<(), ExportError> {
    match &annotation.kind {
        AnnotationKind::Text(t) => {
            composer.set_font(OutputFont::from_family(&t.font_family));
            composer.set_font_size(t.font_size);
            composer.set_text_color(Rgb::resolve(&t.color));
            composer.draw_text(&t.text, mapping.point(t.origin()))
        }
        AnnotationKind::Highlight(h) => {
            let rect = mapping.rect(h.bounds());
            if rect.width() <= 1.0 || rect.height() <= 1.0 {
                log::debug!(
                    "skipping negligible highlight {:?} ({:.2}x{:.2})",
                    annotation.id,
                    rect.width(),
                    rect.height()
                );
                return Ok(());
            }
            composer.set_fill_color(Rgb::resolve(&h.color));
            composer.fill_rect(rect)
        }
    }
}
