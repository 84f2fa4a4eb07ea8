//! Core types for the payment button

use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Maximum length of the opaque data payload, in characters
pub const MAX_DATA_LENGTH: usize = 500;

/// Interval between status requests while the overlay is open
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Currency code of fiat amounts
pub const FIAT_CURRENCY: &str = "USD";

/// Currency code of bitcoin amounts
pub const BITCOIN_CURRENCY: &str = "BTC";

/// Markup attributes read during auto-initialisation
pub mod attributes {
    /// Merchant embed token
    pub const EMBED_TOKEN: &str = "embed-token";
    /// Amount in bitcoin
    pub const BTC: &str = "btc";
    /// Amount in US dollars
    pub const USD: &str = "usd";
    /// Redirect target after acceptance
    pub const REDIRECT_URL: &str = "redirect-url";
    /// Caller supplied reference
    pub const REFERENCE: &str = "ref";
    /// Opaque merchant data
    pub const DATA: &str = "data";

    /// All attributes consumed by the widget
    pub fn all() -> [&'static str; 6] {
        [EMBED_TOKEN, BTC, USD, REDIRECT_URL, REFERENCE, DATA]
    }
}

/// Payment amount, either in bitcoin or in the fiat equivalent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "currency", content = "value")]
pub enum Amount {
    #[serde(rename = "BTC")]
    Bitcoin(Decimal),
    #[serde(rename = "USD")]
    Fiat(Decimal),
}

impl Amount {
    /// Numeric value of the amount
    pub fn value(&self) -> Decimal {
        match self {
            Amount::Bitcoin(value) | Amount::Fiat(value) => *value,
        }
    }

    /// Currency code of the amount
    pub fn currency(&self) -> &'static str {
        match self {
            Amount::Bitcoin(_) => BITCOIN_CURRENCY,
            Amount::Fiat(_) => FIAT_CURRENCY,
        }
    }

    /// Whether this is a fiat amount
    pub fn is_fiat(&self) -> bool {
        matches!(self, Amount::Fiat(_))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Bitcoin(value) => write!(f, "{} BTC", value.normalize()),
            Amount::Fiat(value) => write!(f, "${:.2}", value),
        }
    }
}

/// Unvalidated button options as supplied by application code or markup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonOptions {
    /// Merchant embed token
    #[serde(rename = "embedToken")]
    pub embed_token: Option<String>,
    /// Amount in bitcoin
    pub btc: Option<String>,
    /// Amount in US dollars
    pub usd: Option<String>,
    /// Redirect target after acceptance
    #[serde(rename = "redirectUrl")]
    pub redirect_url: Option<String>,
    /// Caller supplied reference
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    /// Opaque merchant data
    pub data: Option<String>,
}

impl ButtonOptions {
    /// Create options with the given embed token
    pub fn new(embed_token: impl Into<String>) -> Self {
        Self {
            embed_token: Some(embed_token.into()),
            ..Self::default()
        }
    }

    /// Set the bitcoin amount
    pub fn with_btc(mut self, btc: impl Into<String>) -> Self {
        self.btc = Some(btc.into());
        self
    }

    /// Set the fiat amount
    pub fn with_usd(mut self, usd: impl Into<String>) -> Self {
        self.usd = Some(usd.into());
        self
    }

    /// Set the redirect URL
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Set the reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Set the opaque data payload
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Read options from element attributes
    ///
    /// Attributes that are missing or blank are treated as absent, so
    /// `<div btc="">` behaves like an element without a `btc` attribute.
    pub fn from_attributes<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            embed_token: read(attributes::EMBED_TOKEN),
            btc: read(attributes::BTC),
            usd: read(attributes::USD),
            redirect_url: read(attributes::REDIRECT_URL),
            reference: read(attributes::REFERENCE),
            data: read(attributes::DATA),
        }
    }
}

/// Latest transaction status reported by the backend
///
/// Only the acceptance flag is required. The other known fields are read
/// leniently: a value of the wrong shape becomes `None` and stays in
/// [`TransactionStatus::extra`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionStatus {
    /// Whether the payment has been accepted
    pub accepted: bool,
    /// Amount received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Backend transaction identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Backend status label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Where to send the shopper once accepted
    #[serde(rename = "redirectUrl", skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Remaining fields of the response
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const ID_FIELDS: &[&str] = &["id", "transactionId", "transaction_id"];
const REDIRECT_FIELDS: &[&str] = &["redirectUrl", "redirect_url"];

impl<'de> Deserialize<'de> for TransactionStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut extra = Map::<String, Value>::deserialize(deserializer)?;

        let accepted = match extra.remove("accepted") {
            Some(Value::Bool(accepted)) => accepted,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "invalid type for `accepted`: {}, expected a boolean",
                    other
                )))
            }
            None => return Err(de::Error::missing_field("accepted")),
        };

        let amount = take_field(&mut extra, &["amount"], decimal_value);
        let id = take_field(&mut extra, ID_FIELDS, text_value);
        let status = take_field(&mut extra, &["status"], text_value);
        let redirect_url = take_field(&mut extra, REDIRECT_FIELDS, |value| {
            value.as_str().map(str::to_string)
        });

        Ok(Self {
            accepted,
            amount,
            id,
            status,
            redirect_url,
            extra,
        })
    }
}

/// Take the first usable value among `names`; unusable values stay in `extra`
fn take_field<T>(
    extra: &mut Map<String, Value>,
    names: &[&str],
    convert: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    for name in names {
        let converted = extra.get(*name).and_then(&convert);
        if converted.is_some() {
            extra.remove(*name);
            return converted;
        }
    }
    None
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn decimal_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

impl TransactionStatus {
    /// Create a status with only the acceptance flag set
    pub fn new(accepted: bool) -> Self {
        Self {
            accepted,
            amount: None,
            id: None,
            status: None,
            redirect_url: None,
            extra: Map::new(),
        }
    }

    /// Set the transaction id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the status label
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the redirect URL
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Redirect URL, ignoring blank values
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
