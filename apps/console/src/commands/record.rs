//! # Record Commands
//!
//! Exchange of the stored JSON record with the persistence side.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Record Flow                                          │
//! │                                                                         │
//! │   Save button ──► export_record ──► DocumentRecord ──► (storage)       │
//! │                                                                         │
//! │   Open saved ───► load_record ────► Document::from_record             │
//! │                                     (stored totals recomputed)         │
//! │                                                                         │
//! │   Copy invoice ─► copy_record ────► Document::copy_from_record        │
//! │                                     (new id, draft, blank number)      │
//! │                                                                         │
//! │   Duplicate ────► duplicate_document (same, from the open document)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tally_core::validation::validate_document;
use tally_core::{Document, DocumentRecord};
use tracing::{debug, info};

use super::document::DocumentView;
use crate::state::DocumentState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordArgs {
    pub record: DocumentRecord,
}

/// One problem reported by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

/// Snapshot of the current document in stored form.
pub fn export_record(doc: &DocumentState) -> DocumentRecord {
    debug!("export_record command");
    doc.with_document(Document::to_record)
}

/// Replaces the session document with a stored one.
pub fn load_record(doc: &DocumentState, args: RecordArgs) -> DocumentView {
    let loaded = Document::from_record(args.record);
    info!(id = %loaded.id, items = loaded.items.len(), "Loaded document record");

    let view = DocumentView::from(&loaded);
    doc.replace(loaded);
    view
}

/// Starts a new draft from a stored document.
pub fn copy_record(doc: &DocumentState, args: RecordArgs) -> DocumentView {
    let copy = Document::copy_from_record(args.record);
    info!(id = %copy.id, "Copied document record");

    let view = DocumentView::from(&copy);
    doc.replace(copy);
    view
}

/// Copies the session document in place as a new draft.
pub fn duplicate_document(doc: &DocumentState) -> DocumentView {
    doc.with_document_mut(|d| {
        *d = d.duplicate();
        debug!(id = %d.id, "duplicate_document command");
        DocumentView::from(&*d)
    })
}

/// Lists every validation issue in the current document.
pub fn validate(doc: &DocumentState) -> Vec<ValidationIssue> {
    let issues: Vec<ValidationIssue> = doc.with_document(|d| {
        validate_document(d)
            .into_iter()
            .map(|err| ValidationIssue {
                field: err.field().to_string(),
                message: err.to_string(),
            })
            .collect()
    });
    debug!(count = issues.len(), "validate command");
    issues
}
