//! Editable-document collaborator seams.
//!
//! The byte-level PDF library lives outside this workspace. These traits are
//! the only surface the editor needs from it: load bytes, count pages,
//! serialize back to bytes.

use crate::error::{DocumentError, LoadError, SaveError};
use async_trait::async_trait;
use std::sync::Arc;

/// Options passed through to the document library on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub ignore_encryption: bool,
    /// Slower, more tolerant parsing. Used for the retry attempt.
    pub thorough: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            ignore_encryption: true,
            thorough: false,
        }
    }
}

impl LoadOptions {
    pub fn thorough() -> Self {
        Self {
            thorough: true,
            ..Self::default()
        }
    }
}

/// A loaded, serializable document.
#[async_trait(?Send)]
pub trait EditableDocument {
    fn page_count(&self) -> Result<u32, DocumentError>;

    async fn save(&self) -> Result<Vec<u8>, DocumentError>;
}

/// Turns bytes into an [`EditableDocument`].
#[async_trait(?Send)]
pub trait DocumentLoader {
    type Document: EditableDocument;

    async fn load(&self, bytes: &[u8], options: LoadOptions) -> Result<Self::Document, LoadError>;
}

/// Load `bytes` with fast parsing, retrying once with thorough parsing.
/// If both attempts fail the first error is reported.
pub async fn load_with_retry<L: DocumentLoader>(
    loader: &L,
    bytes: &[u8],
) -> Result<L::Document, LoadError> {
    match loader.load(bytes, LoadOptions::default()).await {
        Ok(doc) => Ok(doc),
        Err(first) => {
            log::warn!("standard parsing failed, retrying: {first}");
            loader
                .load(bytes, LoadOptions::thorough())
                .await
                .map_err(|second| {
                    log::error!("thorough parsing failed: {second}");
                    LoadError::classify(format!(
                        "PDF parsing failed: {}. This PDF may be corrupted or use an unsupported format.",
                        first.detail()
                    ))
                })
        }
    }
}

/// Serialize `doc` for a history entry.
///
/// The page-count check is advisory and only logged. Zero-length output is
/// rejected so the timelines only ever hold real documents.
pub async fn capture<D: EditableDocument + ?Sized>(doc: &D) -> Result<Arc<[u8]>, SaveError> {
    match doc.page_count() {
        Ok(n) => log::debug!("capturing document with {n} pages"),
        Err(e) => log::warn!("page count unavailable, saving anyway: {e}"),
    }
    let bytes = doc.save().await?;
    if bytes.is_empty() {
        return Err(SaveError::EmptyOutput);
    }
    log::debug!("captured {} bytes", bytes.len());
    Ok(Arc::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Doc(Vec<u8>);

    #[async_trait(?Send)]
    impl EditableDocument for Doc {
        fn page_count(&self) -> Result<u32, DocumentError> {
            Err(DocumentError::PageCount("not parsed".into()))
        }

        async fn save(&self) -> Result<Vec<u8>, DocumentError> {
            Ok(self.0.clone())
        }
    }

    /// Fails the fast attempt, succeeds on the thorough one.
    struct Picky {
        calls: Cell<u32>,
    }

    #[async_trait(?Send)]
    impl DocumentLoader for Picky {
        type Document = Doc;

        async fn load(&self, bytes: &[u8], options: LoadOptions) -> Result<Doc, LoadError> {
            self.calls.set(self.calls.get() + 1);
            assert!(options.ignore_encryption);
            if options.thorough {
                Ok(Doc(bytes.to_vec()))
            } else {
                Err(LoadError::classify("Expected instance of t"))
            }
        }
    }

    #[tokio::test]
    async fn load_retries_thoroughly() {
        let loader = Picky { calls: Cell::new(0) };
        let doc = load_with_retry(&loader, b"%PDF").await.unwrap();
        assert_eq!(doc.0, b"%PDF");
        assert_eq!(loader.calls.get(), 2);
    }

    #[tokio::test]
    async fn empty_output_is_rejected() {
        let err = capture(&Doc(Vec::new())).await.unwrap_err();
        assert_eq!(err, SaveError::EmptyOutput);
        let bytes = capture(&Doc(vec![1, 2, 3])).await.unwrap();
        assert_eq!(&*bytes, &[1, 2, 3]);
    }
}
