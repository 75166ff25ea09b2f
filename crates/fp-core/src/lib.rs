pub mod color;
pub mod document;
pub mod error;
pub mod id;
pub mod model;
pub mod store;
pub mod viewport;

pub use color::Rgb;
pub use document::{DocumentLoader, EditableDocument, LoadOptions};
pub use error::{DocumentError, ExportError, LoadError, RenderError, SaveError};
pub use id::AnnotationId;
pub use model::*;
pub use store::{AnnotationMutation, AnnotationPatch, AnnotationStore};
pub use viewport::{Rotation, ViewportConfig, ViewportState, page_to_screen, screen_to_page};
