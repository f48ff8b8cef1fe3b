//! # Document Aggregate
//!
//! The billing document being edited: header, kind, status, currency,
//! line items, discount and tax configuration, plus the JSON record shape
//! handed to whatever persists documents.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Document (owned by the editing session)                                │
//! │  ├── header ─────── title, number, dates, custom fields                 │
//! │  ├── items ──────── LineItems ─────┐                                    │
//! │  ├── discount ───── DiscountSpec ──┼──► engine::compute() ──► Breakdown │
//! │  ├── tax ────────── TaxConfig ─────┤                                    │
//! │  └── currency ───── symbol_for() ──┘                                    │
//! │                                                                         │
//! │  to_record()   ──► DocumentRecord (stored column names, 2dp totals)     │
//! │  from_record() ◄── DocumentRecord (lenient, amounts recomputed)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation bumps `updated_at`. Nothing here performs I/O.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::currency;
use crate::engine::{self, Breakdown, Totals};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ids;
use crate::line_item::{ItemField, LineItem, LineItems, TaxField};
use crate::money::Money;
use crate::parse::{self, parse_number_or_zero};
use crate::types::{DiscountSpec, DiscountType, DocumentKind, DocumentStatus, TaxConfig};
use crate::DEFAULT_CURRENCY;

// =============================================================================
// Header
// =============================================================================

/// A user-defined label/value pair shown in the document header
/// (e.g. "PO Number" / "4711").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomField {
    #[serde(default, deserialize_with = "parse::lenient_id")]
    pub id: u64,
    #[serde(default, deserialize_with = "parse::lenient_text")]
    pub label: String,
    #[serde(default, deserialize_with = "parse::lenient_text")]
    pub value: String,
}

/// Which half of a custom field an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[ts(rename_all = "snake_case")]
pub enum CustomFieldPart {
    Label,
    Value,
}

impl FromStr for CustomFieldPart {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "label" => Ok(CustomFieldPart::Label),
            "value" => Ok(CustomFieldPart::Value),
            _ => Err(ValidationError::NotAllowed {
                field: "custom field part".to_string(),
                allowed: vec!["label".to_string(), "value".to_string()],
            }),
        }
    }
}

/// Editable header and footer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub enum HeaderField {
    Title,
    NumberLabel,
    Number,
    DateLabel,
    Date,
    DueDate,
    Notes,
}

impl FromStr for HeaderField {
    type Err = ValidationError;

    /// Accepts both the short names and the stored column names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "title" | "invoiceTitle" => Ok(HeaderField::Title),
            "numberLabel" | "invoiceNoLabel" => Ok(HeaderField::NumberLabel),
            "number" | "invoiceNo" => Ok(HeaderField::Number),
            "dateLabel" | "invoiceDateLabel" => Ok(HeaderField::DateLabel),
            "date" | "invoiceDate" => Ok(HeaderField::Date),
            "dueDate" => Ok(HeaderField::DueDate),
            "notes" => Ok(HeaderField::Notes),
            _ => Err(ValidationError::NotAllowed {
                field: "header field".to_string(),
                allowed: [
                    "title",
                    "numberLabel",
                    "number",
                    "dateLabel",
                    "date",
                    "dueDate",
                    "notes",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            }),
        }
    }
}

/// Title, numbering, dates and custom fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub title: String,
    pub number_label: String,
    pub number: String,
    pub date_label: String,
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub custom_fields: Vec<CustomField>,
}

impl DocumentHeader {
    /// Empty header carrying the default labels of `kind`.
    pub fn for_kind(kind: DocumentKind) -> Self {
        let labels = kind.labels();
        DocumentHeader {
            title: labels.title.to_string(),
            number_label: labels.number_label.to_string(),
            number: String::new(),
            date_label: labels.date_label.to_string(),
            date: None,
            due_date: None,
            custom_fields: Vec::new(),
        }
    }

    fn next_custom_field_id(&self) -> u64 {
        ids::next_id(self.custom_fields.iter().map(|f| f.id))
    }

    /// Renumbers custom fields with id 0, an out-of-range id or a repeated
    /// id.
    fn repair_custom_field_ids(&mut self) {
        ids::repair(self.custom_fields.iter_mut().map(|f| &mut f.id));
    }
}

/// Parses a stored or typed date: `YYYY-MM-DD` or a full RFC 3339
/// timestamp. Anything else is treated as "no date".
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

fn parse_timestamp(input: Option<&str>) -> Option<DateTime<Utc>> {
    input
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

// =============================================================================
// Document
// =============================================================================

/// A billing document in an editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub struct Document {
    #[ts(as = "String")]
    pub id: Uuid,
    pub kind: DocumentKind,
    pub header: DocumentHeader,
    /// ISO 4217 code, upper-case.
    pub currency: String,
    #[ts(as = "Vec<LineItem>")]
    pub items: LineItems,
    pub discount: DiscountSpec,
    pub tax: TaxConfig,
    pub notes: Option<String>,
    status: DocumentStatus,
    #[ts(as = "Option<String>")]
    sent_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    paid_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// A blank draft of the given kind.
    ///
    /// Starts in [`DEFAULT_CURRENCY`] on GST (CGST/SGST) with a disabled
    /// percentage discount and no items.
    pub fn new(kind: DocumentKind) -> Self {
        let now = Utc::now();
        Document {
            id: Uuid::new_v4(),
            kind,
            header: DocumentHeader::for_kind(kind),
            currency: DEFAULT_CURRENCY.to_string(),
            items: LineItems::new(),
            discount: DiscountSpec::default(),
            tax: TaxConfig::default(),
            notes: None,
            status: DocumentStatus::Draft,
            sent_at: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    /// Display symbol of the document currency.
    pub fn currency_symbol(&self) -> String {
        currency::symbol_for(&self.currency)
    }

    /// Runs the tax & totals engine over the current state.
    pub fn breakdown(&self) -> Breakdown {
        engine::compute(
            self.items.as_slice(),
            &self.discount,
            self.tax,
            &self.currency_symbol(),
        )
    }

    /// Document totals only.
    pub fn totals(&self) -> Totals {
        engine::compute_totals(self.items.as_slice(), &self.discount, &self.currency_symbol())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    pub fn add_item(&mut self) -> u64 {
        let id = self.items.add_item();
        self.touch();
        id
    }

    pub fn update_item(&mut self, id: u64, field: ItemField, value: &str) -> bool {
        let changed = self.items.update_item(id, field, value);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn update_item_tax(&mut self, id: u64, field: TaxField, value: &str) -> bool {
        let changed = self.items.update_item_tax(id, field, value);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn remove_item(&mut self, id: u64) -> bool {
        let changed = self.items.remove_item(id);
        if changed {
            self.touch();
        }
        changed
    }

    // -------------------------------------------------------------------------
    // Discount, tax, currency
    // -------------------------------------------------------------------------

    /// Sets the discount value from user input (coerced, never rejected).
    pub fn set_discount_value(&mut self, input: &str) {
        self.discount.value = parse_number_or_zero(input);
        self.touch();
    }

    pub fn set_discount_type(&mut self, discount_type: DiscountType) {
        self.discount.discount_type = discount_type;
        self.touch();
    }

    pub fn set_discount_enabled(&mut self, enabled: bool) {
        self.discount.enabled = enabled;
        self.touch();
    }

    /// Shows or hides the discount line. Returns the new state.
    pub fn toggle_discount(&mut self) -> bool {
        self.set_discount_enabled(!self.discount.enabled);
        self.discount.enabled
    }

    /// Switches tax mode. Item rates are kept, so switching back restores
    /// the previous figures.
    pub fn set_tax_config(&mut self, tax: TaxConfig) {
        self.tax = tax;
        self.touch();
    }

    /// Sets the currency code; blank input restores the default.
    pub fn set_currency(&mut self, code: &str) {
        let code = code.trim().to_ascii_uppercase();
        self.currency = if code.is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            code
        };
        self.touch();
    }

    // -------------------------------------------------------------------------
    // Header
    // -------------------------------------------------------------------------

    /// Applies a header edit. Dates that do not parse clear the date.
    pub fn update_header(&mut self, field: HeaderField, value: &str) {
        let header = &mut self.header;
        match field {
            HeaderField::Title => header.title = value.to_string(),
            HeaderField::NumberLabel => header.number_label = value.to_string(),
            HeaderField::Number => header.number = value.to_string(),
            HeaderField::DateLabel => header.date_label = value.to_string(),
            HeaderField::Date => header.date = parse_date(value),
            HeaderField::DueDate => header.due_date = parse_date(value),
            HeaderField::Notes => {
                self.notes = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
        }
        self.touch();
    }

    /// Appends an empty custom field and returns its id.
    pub fn add_custom_field(&mut self) -> u64 {
        let id = self.header.next_custom_field_id();
        self.header.custom_fields.push(CustomField {
            id,
            ..CustomField::default()
        });
        self.touch();
        id
    }

    pub fn update_custom_field(
        &mut self,
        id: u64,
        part: CustomFieldPart,
        value: &str,
    ) -> CoreResult<()> {
        let field = self
            .header
            .custom_fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(CoreError::CustomFieldNotFound(id))?;

        match part {
            CustomFieldPart::Label => field.label = value.to_string(),
            CustomFieldPart::Value => field.value = value.to_string(),
        }
        self.touch();
        Ok(())
    }

    pub fn remove_custom_field(&mut self, id: u64) -> CoreResult<()> {
        let before = self.header.custom_fields.len();
        self.header.custom_fields.retain(|f| f.id != id);
        if self.header.custom_fields.len() == before {
            return Err(CoreError::CustomFieldNotFound(id));
        }
        self.touch();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------------

    fn transition(&mut self, next: DocumentStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                document_id: self.id.to_string(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    /// Marks the document as sent to the client.
    pub fn mark_sent(&mut self) -> CoreResult<()> {
        self.transition(DocumentStatus::Sent)?;
        self.sent_at = Some(self.updated_at);
        Ok(())
    }

    /// Marks the document as paid.
    ///
    /// A draft can be paid directly (cash receipts); it then gets a
    /// `sent_at` equal to `paid_at`.
    pub fn mark_paid(&mut self) -> CoreResult<()> {
        self.transition(DocumentStatus::Paid)?;
        self.paid_at = Some(self.updated_at);
        if self.sent_at.is_none() {
            self.sent_at = self.paid_at;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    /// Snapshot in the stored record shape, with 2-decimal totals.
    pub fn to_record(&self) -> DocumentRecord {
        let totals = self.totals();
        DocumentRecord {
            id: Some(self.id.to_string()),
            invoice_title: self.header.title.clone(),
            invoice_no: self.header.number.clone(),
            invoice_no_label: self.header.number_label.clone(),
            invoice_date: self.header.date.map(|d| d.to_string()),
            invoice_date_label: self.header.date_label.clone(),
            custom_fields: self.header.custom_fields.clone(),
            kind: Some(self.kind.as_str().to_string()),
            items: Some(self.items.as_slice().to_vec()),
            discount: self.discount.value,
            discount_type: Some(self.discount.discount_type.as_str().to_string()),
            discount_hidden: Some(self.discount.enabled),
            subtotal: totals.subtotal.rounded(),
            discount_amount: totals.discount_amount.rounded(),
            total: totals.total.rounded(),
            currency: self.currency.clone(),
            selected_tax_type: Some(self.tax.tax_type_tag().to_string()),
            gst_type: self.tax.gst_mode().map(|m| m.as_str().to_string()),
            status: self.status.as_str().to_string(),
            notes: self.notes.clone(),
            due_date: self.header.due_date.map(|d| d.to_string()),
            created_at: Some(self.created_at.to_rfc3339()),
            updated_at: Some(self.updated_at.to_rfc3339()),
            sent_at: self.sent_at.map(|t| t.to_rfc3339()),
            paid_at: self.paid_at.map(|t| t.to_rfc3339()),
        }
    }

    /// Rebuilds a document from a stored record.
    ///
    /// ## Leniency
    /// - a missing or malformed id gets a fresh one
    /// - missing labels fall back to the kind's defaults
    /// - item amounts and all totals are recomputed; stored ones are ignored
    /// - a missing tax type means the default (GST, CGST/SGST); an
    ///   unrecognized one means no tax
    pub fn from_record(record: DocumentRecord) -> Self {
        let now = Utc::now();
        let kind = record
            .kind
            .as_deref()
            .map(DocumentKind::from_tag)
            .unwrap_or_default();
        let labels = kind.labels();
        let or_label = |value: String, fallback: &str| {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value
            }
        };

        let mut header = DocumentHeader {
            title: or_label(record.invoice_title, labels.title),
            number_label: or_label(record.invoice_no_label, labels.number_label),
            number: record.invoice_no,
            date_label: or_label(record.invoice_date_label, labels.date_label),
            date: record.invoice_date.as_deref().and_then(parse_date),
            due_date: record.due_date.as_deref().and_then(parse_date),
            custom_fields: record.custom_fields,
        };
        header.repair_custom_field_ids();

        let tax = match record.selected_tax_type.as_deref() {
            Some(tag) if !tag.trim().is_empty() => {
                TaxConfig::from_tags(tag, record.gst_type.as_deref())
            }
            _ => TaxConfig::default(),
        };

        let discount = DiscountSpec {
            value: record.discount,
            discount_type: record
                .discount_type
                .as_deref()
                .map(DiscountType::from_tag)
                .unwrap_or_default(),
            enabled: record.discount_hidden.unwrap_or(false),
        };

        let currency = record.currency.trim().to_ascii_uppercase();
        let created_at = parse_timestamp(record.created_at.as_deref()).unwrap_or(now);

        Document {
            id: record
                .id
                .as_deref()
                .and_then(|id| Uuid::parse_str(id.trim()).ok())
                .unwrap_or_else(Uuid::new_v4),
            kind,
            header,
            currency: if currency.is_empty() {
                DEFAULT_CURRENCY.to_string()
            } else {
                currency
            },
            items: LineItems::from_items(record.items.unwrap_or_default()),
            discount,
            tax,
            notes: record.notes.filter(|n| !n.trim().is_empty()),
            status: DocumentStatus::from_tag(&record.status),
            sent_at: parse_timestamp(record.sent_at.as_deref()),
            paid_at: parse_timestamp(record.paid_at.as_deref()),
            created_at,
            updated_at: parse_timestamp(record.updated_at.as_deref()).unwrap_or(created_at),
        }
    }

    /// The "copy invoice" flow: everything billable is carried over, but
    /// the copy is a new draft with its own id and no number.
    pub fn copy_from_record(record: DocumentRecord) -> Self {
        Document::from_record(record).into_fresh_copy()
    }

    /// Copies this document as a new draft.
    pub fn duplicate(&self) -> Self {
        self.clone().into_fresh_copy()
    }

    fn into_fresh_copy(mut self) -> Self {
        let now = Utc::now();
        self.id = Uuid::new_v4();
        self.header.number = String::new();
        self.status = DocumentStatus::Draft;
        self.sent_at = None;
        self.paid_at = None;
        self.created_at = now;
        self.updated_at = now;
        self
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new(DocumentKind::default())
    }
}

// =============================================================================
// Stored Record
// =============================================================================

/// The JSON record exchanged with the persistence collaborator.
///
/// Field names follow the stored columns (`invoiceTitle`, `invoiceNo`,
/// `discountHidden`, `selectedTaxType`, ...). Every field is optional on
/// input and numeric fields accept numbers, numeric strings, empty strings
/// and nulls. Note that `discountHidden` is true when the discount line is
/// *shown*.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "parse::lenient_text")]
    pub invoice_title: String,
    #[serde(default, deserialize_with = "parse::lenient_text")]
    pub invoice_no: String,
    #[serde(default, deserialize_with = "parse::lenient_text")]
    pub invoice_no_label: String,
    #[serde(default)]
    pub invoice_date: Option<String>,
    #[serde(default, deserialize_with = "parse::lenient_text")]
    pub invoice_date_label: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub custom_fields: Vec<CustomField>,
    #[serde(default, rename = "type")]
    #[ts(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    #[serde(default, deserialize_with = "parse::lenient_decimal")]
    #[ts(type = "string")]
    pub discount: Decimal,
    #[serde(default)]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub discount_hidden: Option<bool>,
    #[serde(default, deserialize_with = "parse::lenient_money")]
    pub subtotal: Money,
    #[serde(default, deserialize_with = "parse::lenient_money")]
    pub discount_amount: Money,
    #[serde(default, deserialize_with = "parse::lenient_money")]
    pub total: Money,
    #[serde(default, deserialize_with = "parse::lenient_text")]
    pub currency: String,
    #[serde(default)]
    pub selected_tax_type: Option<String>,
    #[serde(default)]
    pub gst_type: Option<String>,
    #[serde(default, deserialize_with = "parse::lenient_text")]
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
}

/// A list that may be stored as `null`.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Unit Tests
// =============================================================================
