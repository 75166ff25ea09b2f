//! The Annotation Store: the ordered, canonical list of annotations for the
//! open document.
//!
//! Insertion order is paint order (later entries cover earlier ones) and hit
//! order (first match wins). Every effective mutation bumps `revision`, which
//! the render pipeline watches to decide when a redraw is due.

use crate::id::AnnotationId;
use crate::model::{Annotation, AnnotationKind};
use kurbo::Point;

/// A change to the store produced by a tool or an editor action.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationMutation {
    Add { annotation: Box<Annotation> },
    Update { id: AnnotationId, patch: AnnotationPatch },
    Remove { id: AnnotationId },
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationPatch {
    /// New anchor point (text origin or highlight center).
    pub anchor: Option<Point>,
    /// New end corner; highlights only.
    pub end: Option<Point>,
    /// Replacement text; text annotations only.
    pub text: Option<String>,
    pub color: Option<String>,
}

impl AnnotationPatch {
    pub fn anchor(to: Point) -> Self {
        Self {
            anchor: Some(to),
            ..Self::default()
        }
    }

    pub fn end(to: Point) -> Self {
        Self {
            end: Some(to),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    fn apply_to(&self, annotation: &mut Annotation) {
        if let Some(to) = self.anchor {
            annotation.move_anchor_to(to);
        }
        match &mut annotation.kind {
            AnnotationKind::Text(t) => {
                if let Some(text) = &self.text {
                    t.text.clone_from(text);
                }
                if let Some(color) = &self.color {
                    t.color.clone_from(color);
                }
            }
            AnnotationKind::Highlight(h) => {
                if let Some(end) = self.end {
                    h.end_x = end.x;
                    h.end_y = end.y;
                }
                if let Some(color) = &self.color {
                    h.color.clone_from(color);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    items: Vec<Annotation>,
    revision: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an existing list, e.g. a saved-state copy.
    pub fn from_annotations(annotations: Vec<Annotation>) -> Self {
        let mut store = Self::new();
        store.replace_all(annotations);
        store
    }

    /// Append an annotation. If its id is already taken a fresh one is
    /// generated, so ids stay unique. Returns the id actually stored.
    pub fn add(&mut self, mut annotation: Annotation) -> AnnotationId {
        if self.contains(annotation.id) {
            let prefix = if annotation.is_text() { "text" } else { "highlight" };
            annotation.id = AnnotationId::fresh(prefix);
        }
        let id = annotation.id;
        log::trace!("add {id:?} on page {}", annotation.page);
        self.items.push(annotation);
        self.revision += 1;
        id
    }

    /// Patch the matching record. Returns `false` if `id` is absent.
    pub fn update(&mut self, id: AnnotationId, patch: &AnnotationPatch) -> bool {
        let Some(annotation) = self.items.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        patch.apply_to(annotation);
        self.revision += 1;
        true
    }

    /// Delete the matching record. No-op if absent.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let pos = self.items.iter().position(|a| a.id == id)?;
        self.revision += 1;
        Some(self.items.remove(pos))
    }

    /// Apply a mutation. Returns `true` if the store changed.
    pub fn apply(&mut self, mutation: AnnotationMutation) -> bool {
        match mutation {
            AnnotationMutation::Add { annotation } => {
                self.add(*annotation);
                true
            }
            AnnotationMutation::Update { id, patch } => self.update(id, &patch),
            AnnotationMutation::Remove { id } => self.remove(id).is_some(),
        }
    }

    /// Replace the whole contents (full rollback to a saved state).
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) {
        self.items.clear();
        for annotation in annotations {
            if self.contains(annotation.id) {
                log::warn!("dropping duplicate annotation id {:?}", annotation.id);
                continue;
            }
            self.items.push(annotation);
        }
        self.revision += 1;
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.items.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.items.iter().any(|a| a.id == id)
    }

    /// All annotations, in insertion order.
    pub fn as_slice(&self) -> &[Annotation] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter()
    }

    /// Annotations created on `page`, in insertion order.
    pub fn on_page(&self, page: u32) -> impl Iterator<Item = &Annotation> {
        self.items.iter().filter(move |a| a.page == page)
    }

    /// Most recently appended annotation.
    pub fn last(&self) -> Option<&Annotation> {
        self.items.last()
    }

    /// Deep copy of the current list.
    pub fn snapshot(&self) -> Vec<Annotation> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HighlightAnnotation, TextSettings};
    use std::collections::HashSet;

    fn text_at(x: f64, y: f64) -> Annotation {
        Annotation::text(1, TextSettings::default().apply(Point::new(x, y), "label"))
    }

    #[test]
    fn ids_stay_unique_across_mutations() {
        let mut store = AnnotationStore::new();
        let a = text_at(1.0, 1.0);
        let dup = a.clone();
        let first = store.add(a);
        let second = store.add(dup);
        assert_ne!(first, second);

        store.add(text_at(2.0, 2.0));
        store.remove(first);
        store.update(second, &AnnotationPatch::text("renamed"));
        store.add(text_at(3.0, 3.0));

        let ids: HashSet<_> = store.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), store.len());
        assert!(store.get(first).is_none());
    }

    #[test]
    fn missing_ids_are_no_ops() {
        let mut store = AnnotationStore::new();
        store.add(text_at(1.0, 1.0));
        let rev = store.revision();
        let ghost = AnnotationId::intern("ghost");
        assert!(!store.update(ghost, &AnnotationPatch::text("x")));
        assert!(store.remove(ghost).is_none());
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn end_patch_only_touches_highlights() {
        let mut store = AnnotationStore::new();
        let id = store.add(Annotation::highlight(
            1,
            HighlightAnnotation::at(Point::new(10.0, 10.0), "#FFFF00"),
        ));
        store.update(id, &AnnotationPatch::end(Point::new(50.0, 30.0)));
        let h = store.get(id).unwrap().as_highlight().unwrap();
        assert_eq!(h.start(), Point::new(10.0, 10.0));
        assert_eq!(h.end(), Point::new(50.0, 30.0));
    }

    #[test]
    fn snapshot_is_independent() {
        let mut store = AnnotationStore::new();
        let id = store.add(text_at(5.0, 5.0));
        let copy = store.snapshot();
        store.update(id, &AnnotationPatch::anchor(Point::new(99.0, 99.0)));
        assert_eq!(copy[0].anchor(), Point::new(5.0, 5.0));
    }

    #[test]
    fn on_page_filters() {
        let mut store = AnnotationStore::new();
        store.add(text_at(1.0, 1.0));
        let mut other = text_at(2.0, 2.0);
        other.page = 2;
        store.add(other);
        assert_eq!(store.on_page(1).count(), 1);
        assert_eq!(store.on_page(2).count(), 1);
        assert_eq!(store.on_page(3).count(), 0);
    }
}
