//! Reverse-geocoded address

use serde::{Deserialize, Serialize};

/// Human-readable address of a position; every field is empty when unresolved
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub display_name: String,
    pub street: String,
    pub house_number: String,
    pub city: String,
    pub district: String,
    pub postcode: String,
    pub country: String,
    /// Short "street number, city" summary, or a localized unknown-location label
    pub short: String,
}
