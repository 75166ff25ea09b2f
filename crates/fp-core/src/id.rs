use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for annotation IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic counter backing freshly generated IDs.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifier of an annotation in the store.
///
/// Interned: 4 bytes, `Copy`, O(1) equality and hashing. Stable for the
/// lifetime of the annotation and across saved-state copies.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationId(Spur);

impl AnnotationId {
    /// Intern a string as an AnnotationId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        AnnotationId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a process-unique ID with a kind prefix (e.g. `text_4`, `highlight_9`).
    pub fn fresh(prefix: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }
}

impl fmt::Debug for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AnnotationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnnotationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(AnnotationId::intern(&s))
    }
}
