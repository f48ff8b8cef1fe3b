//! # Document Commands
//!
//! Commands for editing the session document.
//!
//! ## Editing Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Document Lifecycle                                   │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Blank   │────►│  Draft   │────►│   Sent   │────►│   Paid   │       │
//! │  │ Document │     │ (edited) │     │          │     │          │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       ▲                │                                  ▲            │
//! │  new_document     add_item           mark_sent            │            │
//! │                   update_item                             │            │
//! │                   set_discount   ─────────── mark_paid ───┘            │
//! │                   set_tax_config                                       │
//! │                   update_header                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command returns the full [`DocumentView`] so the frontend can
//! re-render items and totals from a single response.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_core::currency;
use tally_core::document::{CustomFieldPart, HeaderField};
use tally_core::line_item::{ItemField, TaxField};
use tally_core::parse::text_from_json;
use tally_core::validation::validate_currency_code;
use tally_core::{Breakdown, DiscountType, Document, DocumentKind, TaxConfig};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::{ConfigState, DocumentState};

/// Document plus its computed breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub document: Document,
    pub breakdown: Breakdown,
}

impl From<&Document> for DocumentView {
    fn from(doc: &Document) -> Self {
        DocumentView {
            document: doc.clone(),
            breakdown: doc.breakdown(),
        }
    }
}

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocumentArgs {
    #[serde(default)]
    pub kind: Option<String>,
}

/// Cell edit: `field` names the column, `value` is whatever was typed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEditArgs {
    pub id: u64,
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdArgs {
    pub id: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountArgs {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, rename = "type")]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxConfigArgs {
    pub tax_type: String,
    #[serde(default)]
    pub gst_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyArgs {
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderArgs {
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldArgs {
    pub id: u64,
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

// =============================================================================
// Commands
// =============================================================================

/// Gets the current document and its totals.
pub fn get_document(doc: &DocumentState) -> DocumentView {
    debug!("get_document command");
    doc.with_document(|d| DocumentView::from(d))
}

/// Starts a blank document, discarding the current one.
///
/// ## Arguments
/// * `kind` - Document kind (default: from config)
pub fn new_document(
    doc: &DocumentState,
    config: &ConfigState,
    args: NewDocumentArgs,
) -> Result<DocumentView, ApiError> {
    debug!(kind = ?args.kind, "new_document command");

    let kind = args
        .kind
        .as_deref()
        .map(str::parse::<DocumentKind>)
        .transpose()?;

    let fresh = config.new_document(kind);
    let view = DocumentView::from(&fresh);
    doc.replace(fresh);
    Ok(view)
}

/// Appends an empty row (quantity 1, rate 0).
pub fn add_item(doc: &DocumentState) -> DocumentView {
    doc.with_document_mut(|d| {
        let id = d.add_item();
        debug!(id, "add_item command");
        DocumentView::from(&*d)
    })
}

/// Edits description, quantity or rate of a row.
///
/// An unknown id leaves the document unchanged; an unknown field name is
/// rejected.
pub fn update_item(doc: &DocumentState, args: ItemEditArgs) -> Result<DocumentView, ApiError> {
    debug!(id = args.id, field = %args.field, "update_item command");

    let field: ItemField = args.field.parse()?;
    let value = text_from_json(&args.value);

    Ok(doc.with_document_mut(|d| {
        d.update_item(args.id, field, &value);
        DocumentView::from(&*d)
    }))
}

/// Edits the flat tax rate or GST rate of a row.
pub fn update_item_tax(doc: &DocumentState, args: ItemEditArgs) -> Result<DocumentView, ApiError> {
    debug!(id = args.id, field = %args.field, "update_item_tax command");

    let field: TaxField = args.field.parse()?;
    let value = text_from_json(&args.value);

    Ok(doc.with_document_mut(|d| {
        d.update_item_tax(args.id, field, &value);
        DocumentView::from(&*d)
    }))
}

/// Removes a row; unknown ids are ignored.
pub fn remove_item(doc: &DocumentState, args: IdArgs) -> DocumentView {
    debug!(id = args.id, "remove_item command");
    doc.with_document_mut(|d| {
        d.remove_item(args.id);
        DocumentView::from(&*d)
    })
}

/// Updates any combination of discount value, type and visibility.
pub fn set_discount(doc: &DocumentState, args: DiscountArgs) -> Result<DocumentView, ApiError> {
    debug!(?args, "set_discount command");

    let discount_type = args
        .discount_type
        .as_deref()
        .map(str::parse::<DiscountType>)
        .transpose()?;

    Ok(doc.with_document_mut(|d| {
        if let Some(value) = &args.value {
            d.set_discount_value(&text_from_json(value));
        }
        if let Some(discount_type) = discount_type {
            d.set_discount_type(discount_type);
        }
        if let Some(enabled) = args.enabled {
            d.set_discount_enabled(enabled);
        }
        DocumentView::from(&*d)
    }))
}

/// Shows or hides the discount line.
pub fn toggle_discount(doc: &DocumentState) -> DocumentView {
    doc.with_document_mut(|d| {
        let enabled = d.toggle_discount();
        debug!(enabled, "toggle_discount command");
        DocumentView::from(&*d)
    })
}

/// Switches tax mode.
///
/// Unrecognized tax types fall back to no tax and unrecognized GST modes
/// to CGST/SGST, matching how stored records are read.
pub fn set_tax_config(doc: &DocumentState, args: TaxConfigArgs) -> DocumentView {
    let tax = TaxConfig::from_tags(&args.tax_type, args.gst_mode.as_deref());
    debug!(?tax, "set_tax_config command");

    doc.with_document_mut(|d| {
        d.set_tax_config(tax);
        DocumentView::from(&*d)
    })
}

/// Changes the document currency (ISO 4217 code).
///
/// Codes outside the currency list are accepted and print as the code
/// itself.
pub fn set_currency(doc: &DocumentState, args: CurrencyArgs) -> Result<DocumentView, ApiError> {
    debug!(code = %args.code, "set_currency command");

    let code = args.code.trim().to_ascii_uppercase();
    validate_currency_code(&code)?;
    if !currency::is_known(&code) {
        warn!(code = %code, "Currency has no symbol, amounts will show the code");
    }

    Ok(doc.with_document_mut(|d| {
        d.set_currency(&code);
        DocumentView::from(&*d)
    }))
}

/// Edits title, labels, number, dates or notes.
pub fn update_header(doc: &DocumentState, args: HeaderArgs) -> Result<DocumentView, ApiError> {
    debug!(field = %args.field, "update_header command");

    let field: HeaderField = args.field.parse()?;
    let value = text_from_json(&args.value);

    Ok(doc.with_document_mut(|d| {
        d.update_header(field, &value);
        DocumentView::from(&*d)
    }))
}

pub fn add_custom_field(doc: &DocumentState) -> DocumentView {
    doc.with_document_mut(|d| {
        let id = d.add_custom_field();
        debug!(id, "add_custom_field command");
        DocumentView::from(&*d)
    })
}

pub fn update_custom_field(
    doc: &DocumentState,
    args: CustomFieldArgs,
) -> Result<DocumentView, ApiError> {
    debug!(id = args.id, field = %args.field, "update_custom_field command");

    let part: CustomFieldPart = args.field.parse()?;
    let value = text_from_json(&args.value);

    doc.with_document_mut(|d| -> Result<DocumentView, ApiError> {
        d.update_custom_field(args.id, part, &value)?;
        Ok(DocumentView::from(&*d))
    })
}

pub fn remove_custom_field(doc: &DocumentState, args: IdArgs) -> Result<DocumentView, ApiError> {
    debug!(id = args.id, "remove_custom_field command");

    doc.with_document_mut(|d| -> Result<DocumentView, ApiError> {
        d.remove_custom_field(args.id)?;
        Ok(DocumentView::from(&*d))
    })
}

/// Marks the document as sent. Fails once paid.
pub fn mark_sent(doc: &DocumentState) -> Result<DocumentView, ApiError> {
    debug!("mark_sent command");

    doc.with_document_mut(|d| -> Result<DocumentView, ApiError> {
        d.mark_sent()?;
        Ok(DocumentView::from(&*d))
    })
}

/// Marks the document as paid.
pub fn mark_paid(doc: &DocumentState) -> Result<DocumentView, ApiError> {
    debug!("mark_paid command");

    doc.with_document_mut(|d| -> Result<DocumentView, ApiError> {
        d.mark_paid()?;
        Ok(DocumentView::from(&*d))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use tally_core::{DocumentStatus, GstMode, Money};

    fn edit(id: u64, field: &str, value: Value) -> ItemEditArgs {
        ItemEditArgs {
            id,
            field: field.to_string(),
            value,
        }
    }

    #[test]
    fn test_item_edits_recompute_totals() {
        let state = DocumentState::default();
        add_item(&state);
        update_item(&state, edit(1, "quantity", json!("3"))).unwrap();
        let view = update_item(&state, edit(1, "rate", json!(250))).unwrap();

        assert_eq!(view.breakdown.items[0].amount, Money::from(rust_decimal::Decimal::from(750)));
        assert_eq!(view.breakdown.totals.display.total, "₹750.00");
    }

    #[test]
    fn test_unknown_item_field_is_rejected() {
        let state = DocumentState::default();
        add_item(&state);

        let err = update_item(&state, edit(1, "colour", json!("red"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_unknown_item_id_is_noop() {
        let state = DocumentState::default();
        add_item(&state);

        let view = update_item(&state, edit(42, "rate", json!("10"))).unwrap();
        assert!(view.breakdown.totals.subtotal.is_zero());
    }

    #[test]
    fn test_set_tax_config_lenient() {
        let state = DocumentState::default();

        let view = set_tax_config(
            &state,
            TaxConfigArgs {
                tax_type: "gst".to_string(),
                gst_mode: Some("igst".to_string()),
            },
        );
        assert_eq!(view.document.tax, TaxConfig::Gst(GstMode::Igst));

        let view = set_tax_config(
            &state,
            TaxConfigArgs {
                tax_type: "vat".to_string(),
                gst_mode: None,
            },
        );
        assert_eq!(view.document.tax, TaxConfig::None);
    }

    #[test]
    fn test_set_discount_partial() {
        let state = DocumentState::default();
        let view = set_discount(
            &state,
            DiscountArgs {
                value: Some(json!("15")),
                discount_type: Some("fixed".to_string()),
                enabled: None,
            },
        )
        .unwrap();

        assert_eq!(view.document.discount.discount_type, DiscountType::Fixed);
        assert!(!view.document.discount.enabled);

        let view = toggle_discount(&state);
        assert!(view.document.discount.enabled);
    }

    #[test]
    fn test_set_currency_validates_code() {
        let state = DocumentState::default();

        let view = set_currency(&state, CurrencyArgs { code: "usd".to_string() }).unwrap();
        assert_eq!(view.breakdown.currency_symbol, "$");

        let err = set_currency(&state, CurrencyArgs { code: "dollars".to_string() }).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_unlisted_currency_shows_code() {
        let state = DocumentState::default();
        add_item(&state);
        update_item(&state, edit(1, "rate", json!("12"))).unwrap();

        let view = set_currency(&state, CurrencyArgs { code: "xof".to_string() }).unwrap();
        assert_eq!(view.document.currency, "XOF");
        assert_eq!(view.breakdown.totals.display.total, "XOF12.00");
    }

    #[test]
    fn test_custom_field_not_found() {
        let state = DocumentState::default();
        add_custom_field(&state);

        let view = update_custom_field(
            &state,
            CustomFieldArgs {
                id: 1,
                field: "label".to_string(),
                value: json!("PO Number"),
            },
        )
        .unwrap();
        assert_eq!(view.document.header.custom_fields[0].label, "PO Number");

        let err = remove_custom_field(&state, IdArgs { id: 9 }).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_status_flow() {
        let state = DocumentState::default();

        let view = mark_paid(&state).unwrap();
        assert_eq!(view.document.status(), DocumentStatus::Paid);

        let err = mark_sent(&state).unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[test]
    fn test_new_document_kind() {
        let state = DocumentState::default();
        let config = ConfigState::default();
        add_item(&state);

        let view = new_document(
            &state,
            &config,
            NewDocumentArgs {
                kind: Some("quotation".to_string()),
            },
        )
        .unwrap();
        assert_eq!(view.document.kind, DocumentKind::Quotation);
        assert!(state.with_document(|d| d.items.is_empty()));

        assert!(new_document(
            &state,
            &config,
            NewDocumentArgs {
                kind: Some("memo".to_string()),
            },
        )
        .is_err());
    }
}
