//! # Domain Types
//!
//! Configuration and value types shared by the line-item model, the engine
//! and the document aggregate.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Percent      │   │  DiscountSpec   │   │   TaxConfig     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  18 = 18%       │   │  value          │   │  None           │       │
//! │  │  9.5 = 9.5%     │   │  type (%/fixed) │   │  Flat ("tax")   │       │
//! │  └─────────────────┘   │  enabled        │   │  Gst(GstMode)   │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  DocumentKind   │   │ DocumentStatus  │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Invoice        │   │  Draft          │                             │
//! │  │  Quotation ...  │   │  Sent / Paid    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## String Tags
//! The stored records and the frontend speak in string tags
//! (`"none" | "tax" | "gst"`, `"igst" | "cgst_sgst"`). Those are parsed once
//! at the boundary with [`TaxConfig::from_tags`]; everything inside the crate
//! matches on enums.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::parse::parse_number_or_zero;

// =============================================================================
// Percent
// =============================================================================

/// A percentage in human units: `18` means 18%.
///
/// Used for item tax rates, GST rates and percentage discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(#[ts(type = "string")] Decimal);

impl Percent {
    /// Wraps a percentage value.
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Percent(value)
    }

    /// Coerces user input into a percentage (invalid input is 0%).
    pub fn from_input(input: &str) -> Self {
        Percent(parse_number_or_zero(input))
    }

    /// Returns the percentage value (18 for 18%).
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(Decimal::ZERO)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

// =============================================================================
// Discount
// =============================================================================

/// How a discount value is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[ts(rename_all = "snake_case")]
pub enum DiscountType {
    /// `value` is 0–100, applied to the pre-discount subtotal.
    #[default]
    Percentage,
    /// `value` is an absolute amount in the document currency.
    Fixed,
}

impl DiscountType {
    /// Returns the stored tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }

    /// Parses a stored tag; anything unrecognized is a percentage, the
    /// default every document starts with.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }
}

impl FromStr for DiscountType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percentage" | "percent" | "%" => Ok(DiscountType::Percentage),
            "fixed" | "amount" => Ok(DiscountType::Fixed),
            _ => Err(ValidationError::NotAllowed {
                field: "discount type".to_string(),
                allowed: vec!["percentage".to_string(), "fixed".to_string()],
            }),
        }
    }
}

/// A document-level discount.
///
/// ## Enabled Flag
/// The editor lets the user collapse the discount section. A disabled
/// discount keeps its value and type (so re-opening restores them) but
/// applies as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub struct DiscountSpec {
    /// Percentage (0–100) or fixed amount, depending on `discount_type`.
    #[ts(type = "string")]
    pub value: Decimal,

    /// Interpretation of `value`.
    #[serde(rename = "type")]
    #[ts(rename = "type")]
    pub discount_type: DiscountType,

    /// Whether the discount applies at all.
    pub enabled: bool,
}

impl DiscountSpec {
    /// An enabled percentage discount.
    pub fn percentage(value: Decimal) -> Self {
        DiscountSpec {
            value,
            discount_type: DiscountType::Percentage,
            enabled: true,
        }
    }

    /// An enabled fixed-amount discount.
    pub fn fixed(value: Decimal) -> Self {
        DiscountSpec {
            value,
            discount_type: DiscountType::Fixed,
            enabled: true,
        }
    }

    /// Amount taken off `subtotal`.
    ///
    /// ## Rules
    /// - disabled → zero
    /// - percentage → `subtotal × value / 100`
    /// - fixed → `value` verbatim (never clamped; see DESIGN.md)
    pub fn amount_for(&self, subtotal: Money) -> Money {
        if !self.enabled {
            return Money::zero();
        }

        match self.discount_type {
            DiscountType::Percentage => subtotal.percent_of(Percent::new(self.value)),
            DiscountType::Fixed => Money::new(self.value),
        }
    }

    /// True when a discount line should appear under the subtotal.
    pub fn is_visible(&self) -> bool {
        self.enabled && self.value > Decimal::ZERO
    }
}

// =============================================================================
// Tax Configuration
// =============================================================================

/// How GST is split on each line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[ts(rename_all = "snake_case")]
pub enum GstMode {
    /// Single inter-state tax at the full rate.
    Igst,
    /// Two intra-state halves, each at half the rate.
    #[default]
    CgstSgst,
}

impl GstMode {
    /// Returns the stored tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            GstMode::Igst => "igst",
            GstMode::CgstSgst => "cgst_sgst",
        }
    }
}

impl FromStr for GstMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "igst" => Ok(GstMode::Igst),
            "cgst_sgst" | "cgst+sgst" | "cgst" | "sgst" => Ok(GstMode::CgstSgst),
            _ => Err(ValidationError::NotAllowed {
                field: "gst mode".to_string(),
                allowed: vec!["igst".to_string(), "cgst_sgst".to_string()],
            }),
        }
    }
}

/// The tax regime applied to every line of a document.
///
/// ## Modes
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  None            amount only                                           │
/// │  Flat            tax = amount × taxRate / 100                          │
/// │  Gst(Igst)       igst = amount × gstRate / 100                         │
/// │  Gst(CgstSgst)   cgst = sgst = amount × gstRate / 200                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// The GST mode only exists inside the `Gst` variant, so a stale mode can
/// never leak into a non-GST calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "taxType", content = "gstMode", rename_all = "snake_case")]
#[ts(tag = "taxType", content = "gstMode", rename_all = "snake_case")]
pub enum TaxConfig {
    /// No tax columns at all.
    None,
    /// A single flat percentage per line.
    #[serde(rename = "tax")]
    #[ts(rename = "tax")]
    Flat,
    /// Goods and Services Tax.
    Gst(GstMode),
}

impl Default for TaxConfig {
    /// New documents start on GST with a CGST/SGST split.
    fn default() -> Self {
        TaxConfig::Gst(GstMode::CgstSgst)
    }
}

impl TaxConfig {
    /// Builds a configuration from the stored string tags.
    ///
    /// ## Leniency
    /// - unknown `tax_type` → `None`
    /// - `gst` with a missing or unknown mode → `CgstSgst`
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::types::{GstMode, TaxConfig};
    ///
    /// assert_eq!(TaxConfig::from_tags("gst", Some("igst")), TaxConfig::Gst(GstMode::Igst));
    /// assert_eq!(TaxConfig::from_tags("tax", Some("igst")), TaxConfig::Flat);
    /// assert_eq!(TaxConfig::from_tags("vat", None), TaxConfig::None);
    /// ```
    pub fn from_tags(tax_type: &str, gst_mode: Option<&str>) -> Self {
        match tax_type.trim().to_lowercase().as_str() {
            "tax" | "flat" => TaxConfig::Flat,
            "gst" => TaxConfig::Gst(
                gst_mode
                    .and_then(|mode| mode.parse().ok())
                    .unwrap_or_default(),
            ),
            _ => TaxConfig::None,
        }
    }

    /// Strict counterpart of [`from_tags`](Self::from_tags), for
    /// configuration files where a typo should be reported.
    pub fn parse_tags(tax_type: &str, gst_mode: Option<&str>) -> Result<Self, ValidationError> {
        match tax_type.trim().to_lowercase().as_str() {
            "none" => Ok(TaxConfig::None),
            "tax" | "flat" => Ok(TaxConfig::Flat),
            "gst" => Ok(TaxConfig::Gst(match gst_mode {
                Some(mode) => mode.parse()?,
                None => GstMode::default(),
            })),
            _ => Err(ValidationError::NotAllowed {
                field: "tax type".to_string(),
                allowed: vec!["none".to_string(), "tax".to_string(), "gst".to_string()],
            }),
        }
    }

    /// Returns the stored `taxType` tag.
    pub fn tax_type_tag(&self) -> &'static str {
        match self {
            TaxConfig::None => "none",
            TaxConfig::Flat => "tax",
            TaxConfig::Gst(_) => "gst",
        }
    }

    /// Returns the GST mode, if GST is selected.
    pub fn gst_mode(&self) -> Option<GstMode> {
        match self {
            TaxConfig::Gst(mode) => Some(*mode),
            _ => None,
        }
    }
}

// =============================================================================
// Document Kind
// =============================================================================

/// The kind of billing document being edited.
///
/// One per generator page of the editor (`/free-invoice-generator`,
/// `/free-delivery-challan-generator`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[ts(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Invoice,
    Quotation,
    DeliveryChallan,
    ProformaInvoice,
    PurchaseOrder,
    GstInvoice,
}

/// Default header labels for a document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindLabels {
    pub title: &'static str,
    pub number_label: &'static str,
    pub date_label: &'static str,
}

impl DocumentKind {
    /// All kinds, in menu order.
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::Invoice,
        DocumentKind::Quotation,
        DocumentKind::DeliveryChallan,
        DocumentKind::ProformaInvoice,
        DocumentKind::PurchaseOrder,
        DocumentKind::GstInvoice,
    ];

    /// Returns the stored tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Quotation => "quotation",
            DocumentKind::DeliveryChallan => "delivery_challan",
            DocumentKind::ProformaInvoice => "proforma_invoice",
            DocumentKind::PurchaseOrder => "purchase_order",
            DocumentKind::GstInvoice => "gst_invoice",
        }
    }

    /// Parses a stored tag, falling back to an invoice.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }

    /// Header labels a new document of this kind starts with.
    pub fn labels(&self) -> KindLabels {
        let (title, number_label, date_label) = match self {
            DocumentKind::Invoice => ("Invoice", "Invoice No.", "Invoice Date"),
            DocumentKind::Quotation => ("Quotation", "Quotation No.", "Quotation Date"),
            DocumentKind::DeliveryChallan => ("Delivery Challan", "Challan No.", "Challan Date"),
            DocumentKind::ProformaInvoice => {
                ("Proforma Invoice", "Proforma Invoice No.", "Proforma Invoice Date")
            }
            DocumentKind::PurchaseOrder => ("Purchase Order", "PO No.", "PO Date"),
            DocumentKind::GstInvoice => ("GST Invoice", "Invoice No.", "Invoice Date"),
        };
        KindLabels {
            title,
            number_label,
            date_label,
        }
    }
}

impl FromStr for DocumentKind {
    type Err = ValidationError;

    /// Accepts the stored tag, any case with `-` or spaces for `_`, and
    /// the generator page slug (`free-purchase-order-generator`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        let slug = normalized.trim_start_matches('/');
        let slug = slug.strip_prefix("free_").unwrap_or(slug);
        let slug = slug.strip_suffix("_generator").unwrap_or(slug);

        DocumentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == slug)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "document kind".to_string(),
                allowed: DocumentKind::ALL
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
            })
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Document Status
// =============================================================================

/// Where a document is in its life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[ts(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Still being edited.
    #[default]
    Draft,
    /// Sent to the client.
    Sent,
    /// Settled.
    Paid,
}

impl DocumentStatus {
    /// Returns the stored tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Paid => "paid",
        }
    }

    /// Parses a stored tag, falling back to draft.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "sent" => DocumentStatus::Sent,
            "paid" => DocumentStatus::Paid,
            _ => DocumentStatus::Draft,
        }
    }

    /// Whether moving to `next` is allowed.
    ///
    /// ```text
    /// Draft ──► Sent ──► Paid
    ///   └────────────────▲
    /// ```
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (DocumentStatus::Draft, DocumentStatus::Sent)
                | (DocumentStatus::Draft, DocumentStatus::Paid)
                | (DocumentStatus::Sent, DocumentStatus::Paid)
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_percent_from_input() {
        assert_eq!(Percent::from_input("18").value(), d("18"));
        assert_eq!(Percent::from_input("").value(), Decimal::ZERO);
        assert_eq!(Percent::from_input("12.5").to_string(), "12.5%");
    }

    #[test]
    fn test_discount_amounts() {
        let subtotal = Money::new(d("600"));

        assert_eq!(
            DiscountSpec::percentage(d("10")).amount_for(subtotal),
            Money::new(d("60"))
        );
        assert_eq!(
            DiscountSpec::fixed(d("50")).amount_for(subtotal),
            Money::new(d("50"))
        );

        let mut disabled = DiscountSpec::percentage(d("10"));
        disabled.enabled = false;
        assert_eq!(disabled.amount_for(subtotal), Money::zero());
        assert!(!disabled.is_visible());
    }

    #[test]
    fn test_discount_default_is_disabled_percentage() {
        let discount = DiscountSpec::default();
        assert_eq!(discount.discount_type, DiscountType::Percentage);
        assert!(!discount.enabled);
        assert_eq!(discount.value, Decimal::ZERO);
    }

    #[test]
    fn test_tax_config_from_tags() {
        assert_eq!(TaxConfig::from_tags("none", None), TaxConfig::None);
        assert_eq!(TaxConfig::from_tags("tax", None), TaxConfig::Flat);
        assert_eq!(
            TaxConfig::from_tags("GST", Some("igst")),
            TaxConfig::Gst(GstMode::Igst)
        );
        assert_eq!(
            TaxConfig::from_tags("gst", Some("bogus")),
            TaxConfig::Gst(GstMode::CgstSgst)
        );
        assert_eq!(TaxConfig::from_tags("", None), TaxConfig::None);
        assert_eq!(TaxConfig::from_tags("vat", Some("igst")), TaxConfig::None);
    }

    #[test]
    fn test_tax_config_parse_tags_is_strict() {
        assert!(TaxConfig::parse_tags("vat", None).is_err());
        assert!(TaxConfig::parse_tags("gst", Some("bogus")).is_err());
        assert_eq!(
            TaxConfig::parse_tags("gst", None).unwrap(),
            TaxConfig::Gst(GstMode::CgstSgst)
        );
    }

    #[test]
    fn test_tax_config_serde_shape() {
        let json = serde_json::to_value(TaxConfig::Gst(GstMode::Igst)).unwrap();
        assert_eq!(json, serde_json::json!({ "taxType": "gst", "gstMode": "igst" }));

        let json = serde_json::to_value(TaxConfig::Flat).unwrap();
        assert_eq!(json, serde_json::json!({ "taxType": "tax" }));

        let parsed: TaxConfig =
            serde_json::from_value(serde_json::json!({ "taxType": "none" })).unwrap();
        assert_eq!(parsed, TaxConfig::None);
    }

    #[test]
    fn test_document_kind_labels() {
        let labels = DocumentKind::Quotation.labels();
        assert_eq!(labels.title, "Quotation");
        assert_eq!(labels.number_label, "Quotation No.");
        assert_eq!(labels.date_label, "Quotation Date");

        let labels = DocumentKind::DeliveryChallan.labels();
        assert_eq!(labels.title, "Delivery Challan");
        assert_eq!(labels.number_label, "Challan No.");

        assert_eq!(DocumentKind::from_tag("nonsense"), DocumentKind::Invoice);
    }

    #[test]
    fn test_document_kind_tags() {
        for kind in DocumentKind::ALL {
            assert_eq!(kind.as_str().parse::<DocumentKind>().unwrap(), kind);
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
            assert_eq!(serde_json::from_value::<DocumentKind>(json).unwrap(), kind);
        }

        assert_eq!(DocumentKind::from_tag("Purchase Order"), DocumentKind::PurchaseOrder);
        assert_eq!(DocumentKind::from_tag("gst-invoice"), DocumentKind::GstInvoice);
        assert_eq!(
            DocumentKind::from_tag("/free-delivery-challan-generator"),
            DocumentKind::DeliveryChallan
        );
        assert_eq!(
            DocumentKind::from_tag("free-proforma-invoice-generator"),
            DocumentKind::ProformaInvoice
        );
    }

    #[test]
    fn test_status_transitions() {
        assert!(DocumentStatus::Draft.can_transition_to(DocumentStatus::Sent));
        assert!(DocumentStatus::Draft.can_transition_to(DocumentStatus::Paid));
        assert!(DocumentStatus::Sent.can_transition_to(DocumentStatus::Paid));
        assert!(!DocumentStatus::Paid.can_transition_to(DocumentStatus::Sent));
        assert!(!DocumentStatus::Sent.can_transition_to(DocumentStatus::Sent));
        assert_eq!(DocumentStatus::from_tag("PAID"), DocumentStatus::Paid);
        assert_eq!(DocumentStatus::from_tag("overdue"), DocumentStatus::Draft);
    }
}
