//! # Document State
//!
//! Holds the document being edited in this session.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Document State Operations                            │
//! │                                                                         │
//! │  Frontend Action          Command                 State Change          │
//! │  ───────────────          ───────                 ────────────          │
//! │                                                                         │
//! │  Click "Add Item" ───────► add_item ────────────► items.push(row)      │
//! │                                                                         │
//! │  Type in a cell ─────────► update_item ─────────► amount recomputed    │
//! │                                                                         │
//! │  Pick tax mode ──────────► set_tax_config ──────► tax = mode           │
//! │                                                                         │
//! │  Open saved invoice ─────► load_record ─────────► document replaced    │
//! │                                                                         │
//! │  View totals ────────────► get_document ────────► (read only)          │
//! │                                                                         │
//! │  NOTE: All operations hold the lock for one mutation + recompute.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tally_core::Document;

/// Session-managed document state.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<Document>>` so the same session can be driven from
/// several threads. A panic inside a closure poisons the mutex; the
/// document is still structurally valid (every edit is a single field
/// write), so the poison is cleared rather than propagated.
#[derive(Debug, Clone)]
pub struct DocumentState {
    document: Arc<Mutex<Document>>,
}

impl DocumentState {
    /// Wraps an initial document.
    pub fn new(document: Document) -> Self {
        DocumentState {
            document: Arc::new(Mutex::new(document)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the document.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = state.with_document(|doc| doc.totals());
    /// ```
    pub fn with_document<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        let document = self.lock();
        f(&document)
    }

    /// Executes a function with write access to the document.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.with_document_mut(|doc| doc.mark_sent())?;
    /// ```
    pub fn with_document_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Document) -> R,
    {
        let mut document = self.lock();
        f(&mut document)
    }

    /// Swaps in a different document, returning the previous one.
    pub fn replace(&self, document: Document) -> Document {
        std::mem::replace(&mut *self.lock(), document)
    }
}

impl Default for DocumentState {
    fn default() -> Self {
        Self::new(Document::default())
    }
}
