//! The external page renderer seam.

use crate::canvas::Canvas;
use async_trait::async_trait;
use fp_core::{RenderError, Rotation};

/// Pixel dimensions of a rendered page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

/// A page rasterized for export, encoded as an image data URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub data_url: String,
    pub width: f64,
    pub height: f64,
}

/// A rendered-page provider (pdf.js in the browser).
///
/// Pages are 1-based. `render_page` must leave `surface` untouched when it
/// fails, so the previous frame stays visible.
#[async_trait(?Send)]
pub trait PageSource {
    type Surface: Canvas;

    fn page_count(&self) -> u32;

    /// Draw `page` into `surface`, resizing it to the page's viewport at
    /// `scale` and `rotation`. Returns the new surface size.
    async fn render_page(
        &self,
        page: u32,
        surface: &mut Self::Surface,
        scale: f64,
        rotation: Rotation,
    ) -> Result<PixelSize, RenderError>;

    /// Rasterize `page` unrotated at `scale` into an image for export.
    async fn rasterize_page(&self, page: u32, scale: f64) -> Result<RasterImage, RenderError>;
}

/// Reject pages outside `1..=total`.
pub fn check_page(page: u32, total: u32) -> Result<(), RenderError> {
    if page == 0 || page > total {
        return Err(RenderError::PageOutOfRange { page, total });
    }
    Ok(())
}
