//! Process-wide business configuration.
//!
//! A singleton created with defaults at first run and mutated in place; it is
//! never deleted. The logo is kept as raw bytes in memory and base64 at rest,
//! with the aspect ratio cached at upload time so render paths never decode
//! the image.

use serde::{Deserialize, Serialize};

use crate::money;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessConfig {
    #[serde(default = "default_business_name")]
    pub business_name: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, with = "crate::wire::logo", skip_serializing_if = "Option::is_none")]
    pub logo: Option<Vec<u8>>,
    #[serde(default = "default_logo_aspect_ratio")]
    pub logo_aspect_ratio: f64,
}

fn default_business_name() -> String {
    "Nexus Finance".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_logo_aspect_ratio() -> f64 {
    1.0
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            business_name: default_business_name(),
            currency_symbol: default_currency_symbol(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            logo: None,
            logo_aspect_ratio: default_logo_aspect_ratio(),
        }
    }
}

impl BusinessConfig {
    /// Stores a logo image and caches its aspect ratio from the pixel
    /// dimensions. A zero dimension falls back to a square ratio.
    pub fn set_logo(&mut self, bytes: Vec<u8>, width: u32, height: u32) {
        self.logo_aspect_ratio = if width == 0 || height == 0 {
            1.0
        } else {
            f64::from(width) / f64::from(height)
        };
        self.logo = Some(bytes);
    }

    /// Formats an amount with the configured currency symbol.
    pub fn format_amount(&self, amount: f64) -> String {
        money::format_amount(&self.currency_symbol, amount)
    }
}
