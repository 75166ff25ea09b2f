pub mod canvas;
pub mod compose;
pub mod export;
pub mod hit;
pub mod paint;
pub mod source;

pub use canvas::{Canvas, CanvasFont, DrawOp, RecordingCanvas};
pub use compose::{ComposeOp, Composer, OutputFont, PageSize, RecordingComposer};
pub use export::{
    AnnotationScope, DOWNLOAD_FILENAME, Export, ExportKind, ExportOptions, export_document,
    reference_size,
};
pub use hit::{HitConfig, HitFilter, find_hit};
pub use paint::{FrameInfo, RenderKey, paint_annotations, render_frame};
pub use source::{PageSource, PixelSize, RasterImage};
