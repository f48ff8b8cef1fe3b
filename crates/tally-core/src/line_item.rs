//! # Line-Item Model
//!
//! One billable row per [`LineItem`], held in an ordered [`LineItems`]
//! collection that keeps every `amount` in step with its quantity and rate.
//!
//! ## Edit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Line Item Operations                                │
//! │                                                                         │
//! │  Editor Action           Operation                 Effect              │
//! │  ─────────────           ─────────                 ──────              │
//! │                                                                         │
//! │  Click "Add Item" ─────► add_item() ─────────────► push, id = max + 1  │
//! │                                                                         │
//! │  Type quantity/rate ───► update_item() ──────────► amount = q × r      │
//! │                                                                         │
//! │  Type tax/GST rate ────► update_item_tax() ──────► rate only           │
//! │                                                                         │
//! │  Click remove ─────────► remove_item() ──────────► row gone            │
//! │                                                                         │
//! │  Unknown id anywhere ──► no-op (returns false)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariant
//! `amount == quantity × rate` at all times. The field is private and only
//! ever written by `LineItem::recompute_amount`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::ids;
use crate::money::Money;
use crate::parse::{self, parse_number_or_zero};
use crate::types::Percent;

// =============================================================================
// Field Selectors
// =============================================================================

/// Editable base fields of a line item.
///
/// There is deliberately no `Amount` variant: the amount is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub enum ItemField {
    Description,
    Quantity,
    Rate,
}

impl FromStr for ItemField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "description" => Ok(ItemField::Description),
            "quantity" => Ok(ItemField::Quantity),
            "rate" => Ok(ItemField::Rate),
            _ => Err(ValidationError::NotAllowed {
                field: "item field".to_string(),
                allowed: vec![
                    "description".to_string(),
                    "quantity".to_string(),
                    "rate".to_string(),
                ],
            }),
        }
    }
}

/// Tax inputs of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[ts(rename_all = "camelCase")]
pub enum TaxField {
    /// Used when the document is on flat tax.
    TaxRate,
    /// Used when the document is on GST.
    GstRate,
}

impl FromStr for TaxField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "taxRate" | "tax_rate" => Ok(TaxField::TaxRate),
            "gstRate" | "gst_rate" => Ok(TaxField::GstRate),
            _ => Err(ValidationError::NotAllowed {
                field: "tax field".to_string(),
                allowed: vec!["taxRate".to_string(), "gstRate".to_string()],
            }),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One row of a billing document.
///
/// ## Serialization
/// Serializes with camelCase names (`taxRate`, `gstRate`). Deserializes
/// through [`ItemRecord`], which accepts loosely typed stored values and
/// recomputes `amount` rather than trusting a stored one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", from = "ItemRecord")]
#[ts(rename_all = "camelCase")]
pub struct LineItem {
    id: u64,
    description: String,
    #[ts(type = "string")]
    quantity: Decimal,
    rate: Money,
    amount: Money,
    tax_rate: Percent,
    gst_rate: Percent,
}

impl LineItem {
    /// A fresh row: quantity 1, everything else zero.
    pub fn new(id: u64) -> Self {
        LineItem {
            id,
            description: String::new(),
            quantity: Decimal::ONE,
            rate: Money::zero(),
            amount: Money::zero(),
            tax_rate: Percent::zero(),
            gst_rate: Percent::zero(),
        }
    }

    /// Builder-style constructor used by tests and record loading.
    pub fn with_values(
        id: u64,
        description: impl Into<String>,
        quantity: Decimal,
        rate: Money,
    ) -> Self {
        let mut item = LineItem {
            id,
            description: description.into(),
            quantity,
            rate,
            amount: Money::zero(),
            tax_rate: Percent::zero(),
            gst_rate: Percent::zero(),
        };
        item.recompute_amount();
        item
    }

    /// Sets the flat tax rate (builder style).
    pub fn with_tax_rate(mut self, rate: Percent) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Sets the GST rate (builder style).
    pub fn with_gst_rate(mut self, rate: Percent) -> Self {
        self.gst_rate = rate;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn rate(&self) -> Money {
        self.rate
    }

    /// `quantity × rate`, always current.
    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn tax_rate(&self) -> Percent {
        self.tax_rate
    }

    pub fn gst_rate(&self) -> Percent {
        self.gst_rate
    }

    /// Applies one edit from the editor.
    ///
    /// Quantity and rate are coerced with [`parse_number_or_zero`] and the
    /// amount is recomputed; the description is stored verbatim.
    pub fn set_field(&mut self, field: ItemField, value: &str) {
        match field {
            ItemField::Description => self.description = value.to_string(),
            ItemField::Quantity => {
                self.quantity = parse_number_or_zero(value);
                self.recompute_amount();
            }
            ItemField::Rate => {
                self.rate = Money::new(parse_number_or_zero(value));
                self.recompute_amount();
            }
        }
    }

    /// Applies a tax-rate edit. Never touches `amount`.
    pub fn set_tax_field(&mut self, field: TaxField, value: &str) {
        let rate = Percent::from_input(value);
        match field {
            TaxField::TaxRate => self.tax_rate = rate,
            TaxField::GstRate => self.gst_rate = rate,
        }
    }

    fn recompute_amount(&mut self) {
        self.amount = self.rate.times(self.quantity);
    }
}

/// Loosely typed stored form of a line item.
///
/// Any numeric field may be a number, a numeric string, an empty string or
/// missing. A stored `amount` is read but ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(default, deserialize_with = "parse::lenient_id")]
    pub id: u64,
    #[serde(default, deserialize_with = "parse::lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "parse::lenient_decimal")]
    pub quantity: Decimal,
    #[serde(default, deserialize_with = "parse::lenient_money")]
    pub rate: Money,
    #[serde(default, deserialize_with = "parse::lenient_money")]
    pub amount: Money,
    #[serde(default, deserialize_with = "parse::lenient_percent")]
    pub tax_rate: Percent,
    #[serde(default, deserialize_with = "parse::lenient_percent")]
    pub gst_rate: Percent,
}

impl From<ItemRecord> for LineItem {
    fn from(record: ItemRecord) -> Self {
        LineItem::with_values(record.id, record.description, record.quantity, record.rate)
            .with_tax_rate(record.tax_rate)
            .with_gst_rate(record.gst_rate)
    }
}

impl From<&LineItem> for ItemRecord {
    fn from(item: &LineItem) -> Self {
        ItemRecord {
            id: item.id,
            description: item.description.clone(),
            quantity: item.quantity,
            rate: item.rate,
            amount: item.amount,
            tax_rate: item.tax_rate,
            gst_rate: item.gst_rate,
        }
    }
}

// =============================================================================
// Line Items Collection
// =============================================================================

/// The ordered rows of one document.
///
/// ## Invariants
/// - ids are unique and non-zero
/// - a new id is greater than every id currently present, until
///   [`ids::MAX_ID`] itself is taken; then the smallest free id is reused
/// - an empty collection is valid (totals are then all zero)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItems {
    items: Vec<LineItem>,
}

impl LineItems {
    /// Creates an empty collection.
    pub fn new() -> Self {
        LineItems { items: Vec::new() }
    }

    /// Adopts existing rows (e.g. from a stored record).
    ///
    /// Rows with id `0`, an id above [`ids::MAX_ID`] or an id already seen
    /// are renumbered so the uniqueness invariant holds.
    pub fn from_items(mut items: Vec<LineItem>) -> Self {
        ids::repair(items.iter_mut().map(|item| &mut item.id));
        LineItems { items }
    }

    /// The id the next [`add_item`](Self::add_item) will use.
    pub fn next_id(&self) -> u64 {
        ids::next_id(self.items.iter().map(|i| i.id))
    }

    /// Appends a default row and returns its id.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::line_item::LineItems;
    ///
    /// let mut items = LineItems::new();
    /// assert_eq!(items.add_item(), 1);
    /// assert_eq!(items.add_item(), 2);
    /// ```
    pub fn add_item(&mut self) -> u64 {
        let id = self.next_id();
        self.items.push(LineItem::new(id));
        id
    }

    /// Sets a base field on the row with `id`.
    ///
    /// Returns `false` (and changes nothing) when no row has that id.
    pub fn update_item(&mut self, id: u64, field: ItemField, value: &str) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.set_field(field, value);
                true
            }
            None => false,
        }
    }

    /// Sets a tax rate on the row with `id`.
    ///
    /// Returns `false` (and changes nothing) when no row has that id.
    pub fn update_item_tax(&mut self, id: u64, field: TaxField, value: &str) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.set_tax_field(field, value);
                true
            }
            None => false,
        }
    }

    /// Removes the row with `id`. Returns whether a row was removed.
    pub fn remove_item(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// Removes every row.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: u64) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
