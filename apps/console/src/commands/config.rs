//! # Config Commands
//!
//! Commands for retrieving session configuration.

use tally_core::currency::{self, CurrencyInfo};
use tracing::debug;

use crate::state::ConfigState;

/// Gets the current configuration.
///
/// ## When Used
/// - Frontend startup (business name, default currency)
/// - Pre-selecting the tax and discount pickers
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}

/// Currencies offered in the currency picker, sorted by code.
pub fn list_currencies() -> &'static [CurrencyInfo] {
    debug!("list_currencies command");
    currency::supported()
}
