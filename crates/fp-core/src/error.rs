//! Error taxonomy shared across the workspace.
//!
//! Collaborators (pdf.js, pdf-lib, jsPDF) only hand back strings, so the
//! load path classifies those messages onto typed variants.

use thiserror::Error;

/// Failure while opening a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("network error: {0}")]
    Network(String),

    #[error("document is encrypted: {0}")]
    Encrypted(String),

    #[error("malformed document: {0}")]
    Malformed(String),

    /// The document or the environment needs something we cannot provide
    /// (memory, worker support).
    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl LoadError {
    /// Map a raw collaborator message onto a variant.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("encrypted") {
            LoadError::Encrypted(message)
        } else if message.contains("Invalid PDF") || message.contains("Invalid object ref") {
            LoadError::Malformed(message)
        } else if message.contains("network") {
            LoadError::Network(message)
        } else if message.contains("memory")
            || message.contains("worker")
            || message.contains("MIME type")
        {
            LoadError::Unsupported(message)
        } else {
            // "Expected instance of", "parsing failed" and anything unknown.
            LoadError::Parse(message)
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            LoadError::Network(m)
            | LoadError::Encrypted(m)
            | LoadError::Malformed(m)
            | LoadError::Unsupported(m)
            | LoadError::Parse(m) => m,
        }
    }

    /// Descriptive text for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            LoadError::Network(_) => {
                "Could not download the PDF. Check your internet connection.".to_string()
            }
            LoadError::Encrypted(_) => {
                "This PDF is encrypted and cannot be edited. Try another document.".to_string()
            }
            LoadError::Malformed(_) => {
                "Invalid PDF file. Make sure the file is not damaged.".to_string()
            }
            LoadError::Unsupported(m) if m.contains("memory") => {
                "This PDF is too large to process. Try a smaller file.".to_string()
            }
            LoadError::Unsupported(_) => {
                "Could not initialise the PDF engine. Reload the page or use another browser."
                    .to_string()
            }
            LoadError::Parse(m) if m.contains("Expected instance of") => {
                "Could not parse the PDF. The file may be damaged or use an unsupported format."
                    .to_string()
            }
            LoadError::Parse(m) if m.contains("parsing failed") => {
                "Could not process the PDF file. Try another document.".to_string()
            }
            LoadError::Parse(m) => format!("Failed to load PDF: {m}"),
        }
    }
}

/// Failure reported by the editable document collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("serialization failed: {0}")]
    Serialize(String),

    #[error("could not read page count: {0}")]
    PageCount(String),
}

/// Failure while capturing a snapshot or saved state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("no document is open")]
    NoDocument,

    #[error("document is not in a valid state for saving")]
    InvalidState,

    #[error("saved document is empty")]
    EmptyOutput,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("failed to reload snapshot: {0}")]
    Reload(#[from] LoadError),
}

impl SaveError {
    pub fn user_message(&self) -> String {
        match self {
            SaveError::NoDocument | SaveError::InvalidState => {
                "The document is not ready to be saved. Try again.".to_string()
            }
            SaveError::EmptyOutput => "Could not save the document. Try again.".to_string(),
            SaveError::Document(e) if e.to_string().contains("Expected instance of") => {
                "The PDF document is damaged. Try reloading the page.".to_string()
            }
            SaveError::Document(e) => format!("Error saving PDF: {e}"),
            SaveError::Reload(e) => e.user_message(),
        }
    }
}

/// Failure while drawing a page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("page {page} is out of range (document has {total})")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("draw failed: {0}")]
    Draw(String),
}

/// Failure inside the export pipeline. Callers normally only see this in
/// logs, since export falls back to the original bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("no document is open")]
    NoDocument,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("composition failed: {0}")]
    Compose(String),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_collaborator_messages() {
        assert!(matches!(
            LoadError::classify("Input document to `PDFDocument.load` is encrypted"),
            LoadError::Encrypted(_)
        ));
        assert!(matches!(
            LoadError::classify("Invalid PDF structure"),
            LoadError::Malformed(_)
        ));
        assert!(matches!(
            LoadError::classify("Invalid object ref: 12 0 R"),
            LoadError::Malformed(_)
        ));
        assert!(matches!(
            LoadError::classify("network request failed"),
            LoadError::Network(_)
        ));
        assert!(matches!(
            LoadError::classify("out of memory"),
            LoadError::Unsupported(_)
        ));
        assert!(matches!(
            LoadError::classify("Failed to fetch dynamically imported module: MIME type"),
            LoadError::Unsupported(_)
        ));
        assert!(matches!(
            LoadError::classify("Expected instance of t, but got undefined"),
            LoadError::Parse(_)
        ));
    }

    #[test]
    fn unknown_messages_keep_detail() {
        let err = LoadError::classify("boom");
        assert_eq!(err.detail(), "boom");
        assert_eq!(err.user_message(), "Failed to load PDF: boom");
    }

    #[test]
    fn save_errors_wrap_reload_failures() {
        let err: SaveError = LoadError::classify("encrypted").into();
        assert!(err.user_message().contains("encrypted"));
    }
}
