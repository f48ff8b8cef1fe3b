//! # tally-core: Pure Billing Logic for Tally
//!
//! This crate is the **heart** of Tally. It holds the line-item model and
//! the tax & totals engine behind invoices, quotations and the other billing
//! documents, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Web frontend / console host                     │   │
//! │  │    Items table ──► Tax modal ──► Discount ──► Totals panel      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ line_item │  │  engine   │  │ document  │  │ validation│  │   │
//! │  │   │ LineItems │  │ Breakdown │  │ Document  │  │  opt-in   │  │   │
//! │  │   │  amount   │  │  Totals   │  │  Record   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Money` newtype over exact decimals
//! - [`parse`] - Lenient numeric coercion (`parse_number_or_zero`)
//! - [`types`] - Percent, discount and tax configuration types
//! - [`line_item`] - Line items with a derived `amount`
//! - [`engine`] - Per-item tax breakdown and document totals
//! - [`currency`] - ISO 4217 code to display symbol lookup
//! - [`document`] - The document aggregate and its stored record shape
//! - [`validation`] - Opt-in strict validation layer
//! - [`ids`] - Row id allocation for items and custom fields
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: the engine is deterministic and owns no state
//! 2. **Coerce, Never Throw**: malformed numeric input becomes zero
//! 3. **Exact Decimals**: no floating point anywhere near money
//! 4. **Explicit Errors**: the few fallible operations return typed errors
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::engine;
//! use tally_core::line_item::{ItemField, LineItems, TaxField};
//! use tally_core::types::{DiscountSpec, GstMode, TaxConfig};
//!
//! let mut items = LineItems::new();
//! let id = items.add_item();
//! items.update_item(id, ItemField::Rate, "1000");
//! items.update_item_tax(id, TaxField::GstRate, "18");
//!
//! let breakdown = engine::compute(
//!     items.as_slice(),
//!     &DiscountSpec::default(),
//!     TaxConfig::Gst(GstMode::CgstSgst),
//!     "₹",
//! );
//!
//! assert_eq!(breakdown.items[0].display.item_total, "₹1180.00");
//! assert_eq!(breakdown.totals.display.total, "₹1000.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod currency;
pub mod document;
pub mod engine;
pub mod error;
pub mod ids;
pub mod line_item;
pub mod money;
pub mod parse;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use document::{Document, DocumentRecord};
pub use engine::{Breakdown, ItemBreakdown, ItemTax, Totals};
pub use error::{CoreError, ValidationError};
pub use line_item::{LineItem, LineItems};
pub use money::Money;
pub use parse::parse_number_or_zero;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency used when a document or record does not name one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Decimal places shown for every monetary figure.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Longest item description accepted by strict validation.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Longest document number accepted by strict validation.
pub const MAX_DOCUMENT_NUMBER_LEN: usize = 50;
