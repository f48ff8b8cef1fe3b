//! # Validation Module
//!
//! Opt-in strict checks for billing documents.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Editing (line_item, engine)                                  │
//! │  ├── Coerces every numeric input, never rejects                        │
//! │  └── Totals always render, even for half-typed values                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called before sending or saving)                │
//! │  ├── Negative quantities, rates, discounts                             │
//! │  ├── Rates outside 0-100%                                              │
//! │  └── Fixed discount larger than the subtotal                           │
//! │                                                                         │
//! │  Validation never changes the document or the engine's output.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::document::Document;
//! use tally_core::validation::validate_document;
//!
//! let mut doc = Document::default();
//! doc.add_item();
//!
//! // the new row has no description yet
//! let issues = validate_document(&doc);
//! assert_eq!(issues.len(), 1);
//! assert_eq!(issues[0].field(), "items[1].description");
//! ```

use rust_decimal::Decimal;

use crate::document::Document;
use crate::error::ValidationError;
use crate::line_item::LineItem;
use crate::money::Money;
use crate::types::{DiscountSpec, DiscountType, DocumentStatus, TaxConfig};
use crate::{MAX_DESCRIPTION_LEN, MAX_DOCUMENT_NUMBER_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item description.
///
/// ## Rules
/// - Must not be empty
/// - At most `MAX_DESCRIPTION_LEN` characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

/// Validates a document number.
///
/// ## Rules
/// - Must not be empty
/// - At most `MAX_DOCUMENT_NUMBER_LEN` characters
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_document_number;
///
/// assert!(validate_document_number("INV-2024-001").is_ok());
/// assert!(validate_document_number("  ").is_err());
/// ```
pub fn validate_document_number(number: &str) -> ValidationResult<()> {
    let number = number.trim();

    if number.is_empty() {
        return Err(ValidationError::Required {
            field: "number".to_string(),
        });
    }

    if number.chars().count() > MAX_DOCUMENT_NUMBER_LEN {
        return Err(ValidationError::TooLong {
            field: "number".to_string(),
            max: MAX_DOCUMENT_NUMBER_LEN,
        });
    }

    Ok(())
}

/// Validates an ISO 4217 currency code: exactly three ASCII letters.
///
/// Codes outside the symbol table are still valid; they just print as
/// the code itself.
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter ISO 4217 code".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity. Zero and fractions are allowed.
pub fn validate_quantity(quantity: Decimal) -> ValidationResult<()> {
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit rate. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::money::Money;
/// use tally_core::validation::validate_rate;
///
/// assert!(validate_rate(Money::new(Decimal::from(10))).is_ok());
/// assert!(validate_rate(Money::new(Decimal::from(-1))).is_err());
/// ```
pub fn validate_rate(rate: Money) -> ValidationResult<()> {
    if rate.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "rate".to_string(),
        });
    }

    Ok(())
}

/// Validates a percentage (tax rate, GST rate, percentage discount).
///
/// ## Rules
/// - Must be between 0 and 100 inclusive
pub fn validate_percentage(field: &str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        });
    }

    Ok(())
}

/// Validates a discount against the subtotal it applies to.
///
/// ## Rules
/// - A disabled discount is always valid
/// - Value must not be negative
/// - Percentage: 0 to 100
/// - Fixed: must not exceed `subtotal` (the engine would go negative)
pub fn validate_discount(discount: &DiscountSpec, subtotal: Money) -> ValidationResult<()> {
    if !discount.enabled {
        return Ok(());
    }

    if discount.value.is_sign_negative() && !discount.value.is_zero() {
        return Err(ValidationError::MustBeNonNegative {
            field: "discount".to_string(),
        });
    }

    match discount.discount_type {
        DiscountType::Percentage => validate_percentage("discount", discount.value),
        DiscountType::Fixed => {
            let amount = Money::new(discount.value);
            if amount > subtotal {
                return Err(ValidationError::ExceedsSubtotal {
                    field: "discount".to_string(),
                    amount: amount.to_string(),
                    subtotal: subtotal.to_string(),
                });
            }
            Ok(())
        }
    }
}

// =============================================================================
// Document Validation
// =============================================================================

fn validate_item(item: &LineItem, tax: TaxConfig) -> Vec<ValidationError> {
    let mut checks = vec![
        validate_description(item.description()),
        validate_quantity(item.quantity()),
        validate_rate(item.rate()),
    ];

    // only the rate the current mode reads
    match tax {
        TaxConfig::None => {}
        TaxConfig::Flat => checks.push(validate_percentage("taxRate", item.tax_rate().value())),
        TaxConfig::Gst(_) => checks.push(validate_percentage("gstRate", item.gst_rate().value())),
    }

    let scope = format!("items[{}]", item.id());
    checks
        .into_iter()
        .filter_map(Result::err)
        .map(|err| err.scoped(&scope))
        .collect()
}

/// Runs every check and returns all issues found, in document order.
///
/// An empty result means the document is ready to send. A draft may go
/// without a number; any other status needs one.
pub fn validate_document(doc: &Document) -> Vec<ValidationError> {
    let mut issues = Vec::new();

    if doc.status() != DocumentStatus::Draft {
        if let Err(err) = validate_document_number(&doc.header.number) {
            issues.push(err);
        }
    } else if doc.header.number.chars().count() > MAX_DOCUMENT_NUMBER_LEN {
        issues.push(ValidationError::TooLong {
            field: "number".to_string(),
            max: MAX_DOCUMENT_NUMBER_LEN,
        });
    }

    if let (Some(date), Some(due)) = (doc.header.date, doc.header.due_date) {
        if due < date {
            issues.push(ValidationError::InvalidFormat {
                field: "dueDate".to_string(),
                reason: "must not be before the document date".to_string(),
            });
        }
    }

    if let Err(err) = validate_currency_code(&doc.currency) {
        issues.push(err);
    }

    for item in doc.items.iter() {
        issues.extend(validate_item(item, doc.tax));
    }

    if let Err(err) = validate_discount(&doc.discount, doc.totals().subtotal) {
        issues.push(err);
    }

    issues
}

// =============================================================================
// Unit Tests
// =============================================================================
