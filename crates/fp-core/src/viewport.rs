//! Viewport state and the screen ↔ page transform.
//!
//! Rotation only affects the rendered raster. Annotation coordinates are
//! rotation-invariant, so the transform is a pure scale.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Zoom limits and step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_step: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 3.0,
            zoom_step: 0.2,
        }
    }
}

/// View rotation in quarter turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Advance by +90° modulo 360.
    pub fn next(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// Whether width and height swap on screen.
    pub fn is_sideways(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl From<Rotation> for u32 {
    fn from(r: Rotation) -> u32 {
        r.degrees()
    }
}

impl TryFrom<u32> for Rotation {
    type Error = String;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees).ok_or_else(|| format!("invalid rotation: {degrees}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub scale: f64,
    pub rotation: Rotation,
    /// 1-based.
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ViewportState {
    pub fn new(total_pages: u32) -> Self {
        Self {
            scale: 1.0,
            rotation: Rotation::Deg0,
            current_page: 1,
            total_pages,
        }
    }

    /// Reset for a freshly loaded document.
    pub fn reset(&mut self, total_pages: u32) {
        *self = Self::new(total_pages);
    }

    /// Returns `true` if the scale changed.
    pub fn zoom_in(&mut self, config: &ViewportConfig) -> bool {
        self.set_scale(self.scale + config.zoom_step, config)
    }

    /// Returns `true` if the scale changed.
    pub fn zoom_out(&mut self, config: &ViewportConfig) -> bool {
        self.set_scale(self.scale - config.zoom_step, config)
    }

    fn set_scale(&mut self, scale: f64, config: &ViewportConfig) -> bool {
        // Round to hundredths so repeated steps do not drift.
        let scale = (scale.clamp(config.min_scale, config.max_scale) * 100.0).round() / 100.0;
        let changed = (scale - self.scale).abs() > f64::EPSILON;
        self.scale = scale;
        changed
    }

    pub fn rotate(&mut self) {
        self.rotation = self.rotation.next();
    }

    /// Returns `true` if the page changed.
    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_add(1))
    }

    /// Returns `true` if the page changed.
    pub fn prev_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// Jump to `page`, clamped to `1..=total_pages`.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        let page = page.clamp(1, self.total_pages.max(1));
        let changed = page != self.current_page;
        self.current_page = page;
        changed
    }

    pub fn can_prev_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Zoom as a whole percentage for toolbar display.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }
}

/// Map a point relative to the canvas' top-left corner into page space.
pub fn screen_to_page(screen: Point, viewport: &ViewportState) -> Point {
    Point::new(screen.x / viewport.scale, screen.y / viewport.scale)
}

/// Map a page-space point to canvas pixels.
pub fn page_to_screen(page: Point, viewport: &ViewportState) -> Point {
    Point::new(page.x * viewport.scale, page.y * viewport.scale)
}
