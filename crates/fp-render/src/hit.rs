//! Hit testing: page-space point → annotation lookup.
//!
//! Each annotation is reduced to its anchor (text origin or highlight
//! center) and hit when the click lands strictly inside a circle around it.
//! The store is walked in insertion order and the first match wins.

use fp_core::id::AnnotationId;
use fp_core::model::Annotation;
use fp_core::store::AnnotationStore;
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitConfig {
    /// Page-space radius around the anchor.
    pub radius: f64,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self { radius: 50.0 }
    }
}

/// Which annotation kinds are eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitFilter {
    Any,
    /// Double-click edit and right-click delete only act on text.
    TextOnly,
}

impl HitFilter {
    fn accepts(self, annotation: &Annotation) -> bool {
        match self {
            HitFilter::Any => true,
            HitFilter::TextOnly => annotation.is_text(),
        }
    }
}

/// Whether `point` is within `config.radius` of the annotation's anchor.
pub fn hits(annotation: &Annotation, point: Point, config: &HitConfig) -> bool {
    annotation.anchor().distance(point) < config.radius
}

/// Find the first annotation on `page` hit by `point`.
/// Returns `None` if nothing is hit.
pub fn find_hit(
    store: &AnnotationStore,
    page: u32,
    point: Point,
    filter: HitFilter,
    config: &HitConfig,
) -> Option<AnnotationId> {
    store
        .on_page(page)
        .find(|a| filter.accepts(a) && hits(a, point, config))
        .map(|a| a.id)
}
