//! # Tax & Totals Engine
//!
//! A single pure function, [`compute`], turns the current line items, the
//! discount and the tax configuration into everything the totals panel and
//! the items table show.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Breakdown Calculation                              │
//! │                                                                         │
//! │  for each item (exact decimals):                                        │
//! │    None           ──► item_total = amount                               │
//! │    Flat           ──► tax  = amount × taxRate / 100                     │
//! │    Gst(Igst)      ──► igst = amount × gstRate / 100                     │
//! │    Gst(CgstSgst)  ──► cgst = sgst = amount × gstRate / 200              │
//! │                       item_total = amount + tax components              │
//! │                                                                         │
//! │  document:                                                              │
//! │    subtotal        = Σ amount              (tax NOT included)           │
//! │    discount_amount = DiscountSpec::amount_for(subtotal)                 │
//! │    total           = subtotal - discount_amount                         │
//! │                                                                         │
//! │  display: every figure rounded to 2 dp (half away from zero) once,      │
//! │           from the unrounded values above, then prefixed with symbol    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-Line Tax Only
//! Item tax is reported per row and is not folded into the document total.
//! The document total is `subtotal - discount`, as every stored document
//! has always recorded it.
//!
//! ## No Error Paths
//! Nothing here can fail. Rates and amounts were already coerced by the
//! line-item model, and arithmetic saturates rather than overflowing.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::line_item::LineItem;
use crate::money::Money;
use crate::types::{DiscountSpec, DiscountType, GstMode, Percent, TaxConfig};

// =============================================================================
// Item Breakdown
// =============================================================================

/// Tax components of one line, shaped by the active tax mode.
///
/// Values are rounded to two decimals. Under [`TaxConfig::None`] there are
/// no tax fields at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", rename_all = "snake_case")]
#[ts(tag = "mode", rename_all = "snake_case")]
pub enum ItemTax {
    None,
    Flat {
        rate: Percent,
        #[serde(rename = "taxAmount")]
        #[ts(rename = "taxAmount")]
        tax_amount: Money,
    },
    Igst { rate: Percent, igst: Money },
    CgstSgst { rate: Percent, cgst: Money, sgst: Money },
}

impl ItemTax {
    /// Sum of the tax components.
    pub fn total(&self) -> Money {
        match self {
            ItemTax::None => Money::zero(),
            ItemTax::Flat { tax_amount, .. } => *tax_amount,
            ItemTax::Igst { igst, .. } => *igst,
            ItemTax::CgstSgst { cgst, sgst, .. } => *cgst + *sgst,
        }
    }
}

/// Pre-formatted strings for one row of the items table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub struct ItemDisplay {
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tax_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub igst: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub cgst: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub sgst: Option<String>,
    pub item_total: String,
}

/// Computed view of one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub struct ItemBreakdown {
    pub id: u64,
    /// `quantity × rate`, rounded.
    pub amount: Money,
    pub tax: ItemTax,
    /// Amount plus tax, rounded.
    pub item_total: Money,
    pub display: ItemDisplay,
}

// =============================================================================
// Totals
// =============================================================================

/// Pre-formatted strings for the totals panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub struct TotalsDisplay {
    pub subtotal: String,
    /// `"Discount (10%)"` or `"Discount"`; `None` when no discount line shows.
    pub discount_label: Option<String>,
    pub discount: String,
    pub total: String,
}

/// Document-level figures.
///
/// The numeric fields are exact; only `display` is rounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub total: Money,
    pub display: TotalsDisplay,
}

/// Everything the editor renders from one computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub struct Breakdown {
    pub items: Vec<ItemBreakdown>,
    pub totals: Totals,
    pub currency_symbol: String,
}

// =============================================================================
// Computation
// =============================================================================

/// Computes the per-item breakdown and document totals.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::engine::compute;
/// use tally_core::line_item::LineItem;
/// use tally_core::money::Money;
/// use tally_core::types::{DiscountSpec, Percent, TaxConfig};
///
/// let items = vec![
///     LineItem::with_values(1, "Design", Decimal::ONE, Money::new(Decimal::from(500)))
///         .with_tax_rate(Percent::new(Decimal::from(5))),
/// ];
/// let breakdown = compute(&items, &DiscountSpec::default(), TaxConfig::Flat, "$");
///
/// assert_eq!(breakdown.items[0].display.tax_amount.as_deref(), Some("$25.00"));
/// assert_eq!(breakdown.items[0].display.item_total, "$525.00");
/// assert_eq!(breakdown.totals.display.total, "$500.00");
/// ```
pub fn compute(
    items: &[LineItem],
    discount: &DiscountSpec,
    tax: TaxConfig,
    currency_symbol: &str,
) -> Breakdown {
    Breakdown {
        items: items
            .iter()
            .map(|item| item_breakdown(item, tax, currency_symbol))
            .collect(),
        totals: compute_totals(items, discount, currency_symbol),
        currency_symbol: currency_symbol.to_string(),
    }
}

/// Tax components of one item at full precision.
fn exact_tax(item: &LineItem, tax: TaxConfig) -> ItemTax {
    let amount = item.amount();
    match tax {
        TaxConfig::None => ItemTax::None,
        TaxConfig::Flat => ItemTax::Flat {
            rate: item.tax_rate(),
            tax_amount: amount.percent_of(item.tax_rate()),
        },
        TaxConfig::Gst(GstMode::Igst) => ItemTax::Igst {
            rate: item.gst_rate(),
            igst: amount.percent_of(item.gst_rate()),
        },
        TaxConfig::Gst(GstMode::CgstSgst) => {
            let half = amount.half_percent_of(item.gst_rate());
            ItemTax::CgstSgst {
                rate: item.gst_rate(),
                cgst: half,
                sgst: half,
            }
        }
    }
}

fn round_tax(tax: ItemTax) -> ItemTax {
    match tax {
        ItemTax::None => ItemTax::None,
        ItemTax::Flat { rate, tax_amount } => ItemTax::Flat {
            rate,
            tax_amount: tax_amount.rounded(),
        },
        ItemTax::Igst { rate, igst } => ItemTax::Igst {
            rate,
            igst: igst.rounded(),
        },
        ItemTax::CgstSgst { rate, cgst, sgst } => ItemTax::CgstSgst {
            rate,
            cgst: cgst.rounded(),
            sgst: sgst.rounded(),
        },
    }
}

/// Computes one row of the breakdown.
///
/// `item_total` is summed from the exact components and rounded once, so
/// it can differ by a cent from adding the rounded columns.
pub fn item_breakdown(item: &LineItem, tax: TaxConfig, currency_symbol: &str) -> ItemBreakdown {
    let exact = exact_tax(item, tax);
    let item_total = item.amount() + exact.total();

    let mut display = ItemDisplay {
        amount: item.amount().display_with(currency_symbol),
        item_total: item_total.display_with(currency_symbol),
        ..ItemDisplay::default()
    };
    match exact {
        ItemTax::None => {}
        ItemTax::Flat { tax_amount, .. } => {
            display.tax_amount = Some(tax_amount.display_with(currency_symbol));
        }
        ItemTax::Igst { igst, .. } => {
            display.igst = Some(igst.display_with(currency_symbol));
        }
        ItemTax::CgstSgst { cgst, sgst, .. } => {
            display.cgst = Some(cgst.display_with(currency_symbol));
            display.sgst = Some(sgst.display_with(currency_symbol));
        }
    }

    ItemBreakdown {
        id: item.id(),
        amount: item.amount().rounded(),
        tax: round_tax(exact),
        item_total: item_total.rounded(),
        display,
    }
}

/// Computes subtotal, discount and total for `items`.
///
/// Tax mode plays no part here.
pub fn compute_totals(items: &[LineItem], discount: &DiscountSpec, currency_symbol: &str) -> Totals {
    let subtotal: Money = items.iter().map(LineItem::amount).sum();
    let discount_amount = discount.amount_for(subtotal);
    let total = subtotal - discount_amount;

    Totals {
        subtotal,
        discount_amount,
        total,
        display: TotalsDisplay {
            subtotal: subtotal.display_with(currency_symbol),
            discount_label: discount_label(discount),
            discount: discount_amount.display_with(currency_symbol),
            total: total.display_with(currency_symbol),
        },
    }
}

/// Label of the discount line, or `None` when the line is hidden.
pub fn discount_label(discount: &DiscountSpec) -> Option<String> {
    if !discount.is_visible() {
        return None;
    }

    Some(match discount.discount_type {
        DiscountType::Percentage => format!("Discount ({})", Percent::new(discount.value)),
        DiscountType::Fixed => "Discount".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn m(s: &str) -> Money {
        Money::new(d(s))
    }

    fn item(id: u64, qty: &str, rate: &str) -> LineItem {
        LineItem::with_values(id, "", d(qty), m(rate))
    }

    #[test]
    fn test_none_mode_has_no_tax_fields() {
        let items = vec![item(1, "2", "50").with_gst_rate(Percent::new(d("18")))];
        let b = compute(&items, &DiscountSpec::default(), TaxConfig::None, "₹");

        assert_eq!(b.items[0].tax, ItemTax::None);
        assert_eq!(b.items[0].item_total, m("100"));
        assert!(b.items[0].display.tax_amount.is_none());
        assert!(b.items[0].display.cgst.is_none());
        assert!(b.items[0].display.igst.is_none());
    }

    #[test]
    fn test_flat_tax_uses_tax_rate_only() {
        let items = vec![item(1, "1", "500")
            .with_tax_rate(Percent::new(d("5")))
            .with_gst_rate(Percent::new(d("28")))];
        let b = compute(&items, &DiscountSpec::default(), TaxConfig::Flat, "$");

        assert_eq!(
            b.items[0].tax,
            ItemTax::Flat {
                rate: Percent::new(d("5")),
                tax_amount: m("25")
            }
        );
        assert_eq!(b.items[0].item_total, m("525"));
    }

    #[test]
    fn test_gst_split_matches_igst() {
        let items = vec![item(1, "1", "1000").with_gst_rate(Percent::new(d("18")))];

        let split = compute(&items, &DiscountSpec::default(), TaxConfig::Gst(GstMode::CgstSgst), "₹");
        let igst = compute(&items, &DiscountSpec::default(), TaxConfig::Gst(GstMode::Igst), "₹");

        match split.items[0].tax {
            ItemTax::CgstSgst { cgst, sgst, .. } => {
                assert_eq!(cgst, m("90"));
                assert_eq!(sgst, m("90"));
            }
            other => panic!("expected cgst/sgst, got {other:?}"),
        }
        assert_eq!(split.items[0].item_total, m("1180"));
        assert_eq!(igst.items[0].item_total, m("1180"));
        assert_eq!(split.items[0].display.cgst.as_deref(), Some("₹90.00"));
    }

    #[test]
    fn test_item_total_rounds_once() {
        // each half is 0.0025 and shows as 0.00, the exact total 0.055 shows as 0.06
        let items = vec![item(1, "1", "0.05").with_gst_rate(Percent::new(d("10")))];
        let b = compute(&items, &DiscountSpec::default(), TaxConfig::Gst(GstMode::CgstSgst), "$");

        assert_eq!(b.items[0].display.cgst.as_deref(), Some("$0.00"));
        assert_eq!(b.items[0].display.item_total, "$0.06");
    }

    #[test]
    fn test_tax_never_reaches_document_total() {
        let items = vec![item(1, "1", "1000").with_gst_rate(Percent::new(d("18")))];
        let b = compute(&items, &DiscountSpec::default(), TaxConfig::Gst(GstMode::Igst), "₹");

        assert_eq!(b.totals.subtotal, m("1000"));
        assert_eq!(b.totals.total, m("1000"));
    }

    #[test]
    fn test_percentage_discount() {
        let items = vec![item(1, "1", "100"), item(2, "1", "200"), item(3, "1", "300")];
        let b = compute(&items, &DiscountSpec::percentage(d("10")), TaxConfig::None, "₹");

        assert_eq!(b.totals.subtotal, m("600"));
        assert_eq!(b.totals.discount_amount, m("60"));
        assert_eq!(b.totals.total, m("540"));
        assert_eq!(b.totals.display.discount_label.as_deref(), Some("Discount (10%)"));
        assert_eq!(b.totals.display.discount, "₹60.00");
    }

    #[test]
    fn test_fixed_discount_label() {
        let items = vec![item(1, "6", "100")];
        let b = compute(&items, &DiscountSpec::fixed(d("50")), TaxConfig::None, "€");

        assert_eq!(b.totals.total, m("550"));
        assert_eq!(b.totals.display.discount_label.as_deref(), Some("Discount"));
        assert_eq!(b.totals.display.total, "€550.00");
    }

    #[test]
    fn test_hidden_discount_has_no_label() {
        let items = vec![item(1, "1", "100")];
        let mut discount = DiscountSpec::percentage(d("10"));
        discount.enabled = false;
        let b = compute(&items, &discount, TaxConfig::None, "$");

        assert!(b.totals.display.discount_label.is_none());
        assert_eq!(b.totals.discount_amount, Money::zero());
        assert_eq!(b.totals.total, m("100"));
    }

    #[test]
    fn test_fixed_discount_over_subtotal_goes_negative() {
        let items = vec![item(1, "1", "30")];
        let b = compute(&items, &DiscountSpec::fixed(d("50")), TaxConfig::None, "$");

        assert_eq!(b.totals.total, m("-20"));
        assert_eq!(b.totals.display.total, "-$20.00");
    }

    #[test]
    fn test_empty_items() {
        let b = compute(&[], &DiscountSpec::percentage(d("10")), TaxConfig::default(), "₹");

        assert!(b.items.is_empty());
        assert_eq!(b.totals.subtotal, Money::zero());
        assert_eq!(b.totals.discount_amount, Money::zero());
        assert_eq!(b.totals.total, Money::zero());
        assert_eq!(b.totals.display.total, "₹0.00");
    }

    #[test]
    fn test_serialized_tax_shape() {
        let tax = ItemTax::CgstSgst {
            rate: Percent::new(d("18")),
            cgst: m("90.00"),
            sgst: m("90.00"),
        };
        let json = serde_json::to_value(tax).unwrap();
        assert_eq!(json["mode"], "cgst_sgst");
        assert_eq!(json["cgst"], "90.00");

        let flat = ItemTax::Flat {
            rate: Percent::new(d("5")),
            tax_amount: m("25"),
        };
        let json = serde_json::to_value(flat).unwrap();
        assert_eq!(json["taxAmount"], "25");
    }

    #[test]
    fn test_bindings_use_wire_names() {
        use crate::document::{Document, DocumentRecord};
        use crate::line_item::LineItem;
        use crate::types::DocumentKind;

        let item_tax = ItemTax::decl();
        assert!(item_tax.contains(r#""mode": "cgst_sgst""#));
        assert!(item_tax.contains("taxAmount: Money"));

        let display = ItemDisplay::decl();
        assert!(display.contains("taxAmount?: string"));
        assert!(display.contains("itemTotal: string"));

        let tax = TaxConfig::decl();
        assert!(tax.contains(r#"{ "taxType": "tax" }"#));
        assert!(tax.contains(r#""gstMode": GstMode"#));
        assert!(GstMode::decl().contains(r#""cgst_sgst""#));

        assert!(DiscountSpec::decl().contains("type: DiscountType"));
        assert!(DocumentKind::decl().contains(r#""delivery_challan""#));
        assert!(LineItem::decl().contains("taxRate: Percent"));
        assert!(Document::decl().contains("items: Array<LineItem>"));

        let record = DocumentRecord::decl();
        assert!(record.contains("id?: string"));
        assert!(record.contains("type: string | null"));
        assert!(record.contains("invoiceNo: string"));
    }
}
