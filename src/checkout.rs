//! Hosted checkout URL construction
//!
//! The checkout frame receives the resolved button configuration as a
//! base64-encoded JSON document appended to `{checkout}/checkout/`.

use crate::config::ButtonConfig;
use crate::types::Amount;
use crate::Result;
use base64::{engine::general_purpose, Engine as _};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration handed to the hosted checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutPayload {
    /// Merchant embed token
    #[serde(rename = "embedToken")]
    pub embed_token: String,
    /// Amount to charge
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Currency of the amount ("USD" or "BTC")
    pub currency: String,
    /// Reference of the transaction
    #[serde(rename = "ref")]
    pub reference: String,
    /// Redirect target after acceptance
    #[serde(rename = "redirectUrl", skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Opaque merchant data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl CheckoutPayload {
    /// Build the payload from a resolved button configuration
    pub fn from_config(config: &ButtonConfig) -> Self {
        Self::from_parts(config, config.amount())
    }

    /// Build the payload when a fiat and a bitcoin amount are both known
    ///
    /// The fiat amount wins.
    pub fn with_amounts(config: &ButtonConfig, fiat: Option<Decimal>, bitcoin: Option<Decimal>) -> Self {
        let amount = match (fiat, bitcoin) {
            (Some(usd), _) => Amount::Fiat(usd),
            (None, Some(btc)) => Amount::Bitcoin(btc),
            (None, None) => config.amount(),
        };
        Self::from_parts(config, amount)
    }

    fn from_parts(config: &ButtonConfig, amount: Amount) -> Self {
        Self {
            embed_token: config.embed_token().to_string(),
            amount: amount.value(),
            currency: amount.currency().to_string(),
            reference: config.reference().to_string(),
            redirect_url: config.redirect_url().map(|url| url.to_string()),
            data: config.data().map(str::to_string),
        }
    }

    /// Encode the payload to base64
    pub fn to_base64(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(general_purpose::STANDARD.encode(json))
    }

    /// Decode a base64-encoded payload
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = general_purpose::STANDARD.decode(encoded)?;
        let payload: CheckoutPayload = serde_json::from_slice(&decoded)?;
        Ok(payload)
    }
}

/// Build the checkout frame URL for a button
pub fn checkout_url(checkout_base: &str, config: &ButtonConfig) -> Result<Url> {
    let encoded = CheckoutPayload::from_config(config).to_base64()?;
    let url = Url::parse(&format!(
        "{}/checkout/{}",
        checkout_base.trim_end_matches('/'),
        encoded
    ))?;
    Ok(url)
}
