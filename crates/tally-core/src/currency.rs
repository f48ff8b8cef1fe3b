//! # Currency Symbols
//!
//! Maps ISO 4217 codes to the symbol printed in front of every amount.
//! Conversion rates are out of scope: a document is in exactly one
//! currency and amounts are never converted.

use serde::Serialize;

/// One selectable currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
}

const fn c(code: &'static str, symbol: &'static str) -> CurrencyInfo {
    CurrencyInfo { code, symbol }
}

/// Supported currencies, sorted by code.
const CURRENCIES: &[CurrencyInfo] = &[
    c("AED", "د.إ"),
    c("AUD", "$"),
    c("BDT", "৳"),
    c("BRL", "R$"),
    c("CAD", "$"),
    c("CHF", "CHF"),
    c("CNY", "¥"),
    c("CZK", "Kč"),
    c("DKK", "kr"),
    c("EGP", "£"),
    c("EUR", "€"),
    c("GBP", "£"),
    c("HKD", "$"),
    c("IDR", "Rp"),
    c("ILS", "₪"),
    c("INR", "₹"),
    c("JPY", "¥"),
    c("KES", "KSh"),
    c("KRW", "₩"),
    c("LKR", "₨"),
    c("MXN", "$"),
    c("MYR", "RM"),
    c("NGN", "₦"),
    c("NOK", "kr"),
    c("NPR", "₨"),
    c("NZD", "$"),
    c("PHP", "₱"),
    c("PKR", "₨"),
    c("PLN", "zł"),
    c("RUB", "₽"),
    c("SAR", "﷼"),
    c("SEK", "kr"),
    c("SGD", "$"),
    c("THB", "฿"),
    c("TRY", "₺"),
    c("UAH", "₴"),
    c("USD", "$"),
    c("VND", "₫"),
    c("ZAR", "R"),
];

fn lookup(code: &str) -> Option<&'static CurrencyInfo> {
    let upper = code.trim().to_ascii_uppercase();
    CURRENCIES
        .binary_search_by(|info| info.code.cmp(upper.as_str()))
        .ok()
        .map(|idx| &CURRENCIES[idx])
}

/// Returns the display symbol for a currency code.
///
/// Unknown codes fall back to the upper-cased code itself, so an amount is
/// never printed without some currency marker.
///
/// ```rust
/// use tally_core::currency::symbol_for;
///
/// assert_eq!(symbol_for("INR"), "₹");
/// assert_eq!(symbol_for("usd"), "$");
/// assert_eq!(symbol_for("xyz"), "XYZ");
/// ```
pub fn symbol_for(code: &str) -> String {
    match lookup(code) {
        Some(info) => info.symbol.to_string(),
        None => code.trim().to_ascii_uppercase(),
    }
}

/// Whether `code` is in the supported table.
pub fn is_known(code: &str) -> bool {
    lookup(code).is_some()
}

/// All supported currencies.
pub fn supported() -> &'static [CurrencyInfo] {
    CURRENCIES
}
