//! Button and widget configuration
//!
//! [`ButtonConfig`] is the validated form of [`ButtonOptions`]. Fatal problems
//! (missing token, missing or duplicate amount, unparsable amount) are returned as
//! errors; recoverable ones (bad redirect URL, oversized data) are logged, recorded
//! as [`ConfigWarning`]s and corrected.
//!
//! [`WidgetConfig`] holds the endpoints shared by every button on a page.

use crate::template::ButtonTheme;
use crate::types::{Amount, ButtonOptions, DEFAULT_POLL_INTERVAL, MAX_DATA_LENGTH};
use crate::{PayButtonError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Default hosted checkout base URL
pub const DEFAULT_CHECKOUT_URL: &str = "https://checkout.paybutton.io";

/// Default status API base URL
pub const DEFAULT_STATUS_URL: &str = "https://api.paybutton.io";

/// Recoverable problem found while resolving button options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The redirect URL was not an absolute http(s) URL and was dropped
    InvalidRedirectUrl { value: String },
    /// The data payload exceeded the length bound and was truncated
    DataTruncated { original_length: usize },
}

/// Validated configuration of a single payment button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonConfig {
    embed_token: String,
    amount: Amount,
    redirect_url: Option<Url>,
    reference: String,
    data: Option<String>,
    warnings: Vec<ConfigWarning>,
}

impl ButtonConfig {
    /// Resolve raw options into a button configuration
    pub fn resolve(options: ButtonOptions) -> Result<Self> {
        let embed_token = options
            .embed_token
            .filter(|token| !token.trim().is_empty())
            .ok_or(PayButtonError::MissingEmbedToken)?;

        let amount = resolve_amount(options.btc.as_deref(), options.usd.as_deref())?;

        let mut warnings = Vec::new();

        let redirect_url = match options.redirect_url {
            Some(raw) => match parse_redirect_url(&raw) {
                Some(url) => Some(url),
                None => {
                    warn!("Ignoring invalid redirect URL: {}", raw);
                    warnings.push(ConfigWarning::InvalidRedirectUrl { value: raw });
                    None
                }
            },
            None => None,
        };

        let reference = options
            .reference
            .filter(|reference| !reference.trim().is_empty())
            .unwrap_or_else(generate_reference);

        let data = options.data.map(|data| {
            let original_length = data.chars().count();
            if original_length > MAX_DATA_LENGTH {
                warn!(
                    "Data payload is {} characters, truncating to {}",
                    original_length, MAX_DATA_LENGTH
                );
                warnings.push(ConfigWarning::DataTruncated { original_length });
                data.chars().take(MAX_DATA_LENGTH).collect()
            } else {
                data
            }
        });

        Ok(Self {
            embed_token,
            amount,
            redirect_url,
            reference,
            data,
            warnings,
        })
    }

    /// Merchant embed token
    pub fn embed_token(&self) -> &str {
        &self.embed_token
    }

    /// Amount to charge
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Configured redirect target
    pub fn redirect_url(&self) -> Option<&Url> {
        self.redirect_url.as_ref()
    }

    /// Reference correlating this button with a backend transaction
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Opaque merchant data
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Recoverable problems found during resolution
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }
}

impl TryFrom<ButtonOptions> for ButtonConfig {
    type Error = PayButtonError;

    fn try_from(options: ButtonOptions) -> Result<Self> {
        Self::resolve(options)
    }
}

fn resolve_amount(btc: Option<&str>, usd: Option<&str>) -> Result<Amount> {
    fn present(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    match (present(btc), present(usd)) {
        (Some(_), Some(_)) => Err(PayButtonError::DuplicateAmount),
        (None, None) => Err(PayButtonError::MissingAmount),
        (Some(btc), None) => parse_amount(btc).map(Amount::Bitcoin),
        (None, Some(usd)) => parse_amount(usd).map(Amount::Fiat),
    }
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| PayButtonError::invalid_amount(raw))?;

    if value <= Decimal::ZERO {
        return Err(PayButtonError::invalid_amount(raw));
    }

    Ok(value)
}

fn parse_redirect_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Some(url),
        _ => None,
    }
}

fn generate_reference() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Endpoints and timings shared by every button
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Base URL of the hosted checkout
    pub checkout_url: String,
    /// Base URL of the transaction status API
    pub status_url: String,
    /// Seconds between status requests
    pub poll_interval_secs: u64,
    /// Seconds before a status request is abandoned
    pub request_timeout_secs: u64,
    /// Button and overlay styling
    pub theme: ButtonTheme,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            checkout_url: DEFAULT_CHECKOUT_URL.to_string(),
            status_url: DEFAULT_STATUS_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            request_timeout_secs: 30,
            theme: ButtonTheme::default(),
        }
    }
}

impl WidgetConfig {
    /// Create a widget config pointing at the given endpoints
    pub fn new(checkout_url: impl Into<String>, status_url: impl Into<String>) -> Self {
        Self {
            checkout_url: checkout_url.into(),
            status_url: status_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PayButtonError::config(format!("Failed to read config file: {}", e)))?;

        let config: WidgetConfig = serde_json::from_str(&content)
            .map_err(|e| PayButtonError::config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(checkout_url) = std::env::var("PAYBUTTON_CHECKOUT_URL") {
            config.checkout_url = checkout_url;
        }

        if let Ok(status_url) = std::env::var("PAYBUTTON_STATUS_URL") {
            config.status_url = status_url;
        }

        if let Ok(interval) = std::env::var("PAYBUTTON_POLL_INTERVAL_SECS") {
            config.poll_interval_secs = interval.parse().map_err(|e| {
                PayButtonError::config(format!("Invalid PAYBUTTON_POLL_INTERVAL_SECS: {}", e))
            })?;
        }

        if let Ok(timeout) = std::env::var("PAYBUTTON_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout.parse().map_err(|e| {
                PayButtonError::config(format!("Invalid PAYBUTTON_REQUEST_TIMEOUT_SECS: {}", e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("checkout URL", &self.checkout_url),
            ("status URL", &self.status_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| PayButtonError::config(format!("Invalid {}: {}", name, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(PayButtonError::config(format!(
                    "{} must start with http:// or https://",
                    name
                )));
            }
        }

        if self.poll_interval_secs == 0 {
            return Err(PayButtonError::config("Poll interval must be positive"));
        }

        if self.request_timeout_secs == 0 {
            return Err(PayButtonError::config("Request timeout must be positive"));
        }

        Ok(())
    }

    /// Set the checkout base URL
    pub fn with_checkout_url(mut self, url: impl Into<String>) -> Self {
        self.checkout_url = url.into();
        self
    }

    /// Set the status API base URL
    pub fn with_status_url(mut self, url: impl Into<String>) -> Self {
        self.status_url = url.into();
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_secs = interval.as_secs().max(1);
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Set the theme
    pub fn with_theme(mut self, theme: ButtonTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Interval between status requests, at least one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Timeout of a single status request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options() -> ButtonOptions {
        ButtonOptions::new("tok_live_123")
    }

    #[test]
    fn test_exactly_one_amount_is_accepted() {
        let config = ButtonConfig::resolve(options().with_btc("0.001")).unwrap();
        assert_eq!(config.amount(), Amount::Bitcoin(Decimal::from_str("0.001").unwrap()));

        let config = ButtonConfig::resolve(options().with_usd("19.99")).unwrap();
        assert_eq!(config.amount(), Amount::Fiat(Decimal::from_str("19.99").unwrap()));
    }

    #[test]
    fn test_both_amounts_are_rejected() {
        let result = ButtonConfig::resolve(options().with_btc("0.001").with_usd("10"));
        assert!(matches!(result, Err(PayButtonError::DuplicateAmount)));
    }

    #[test]
    fn test_missing_amount_is_rejected() {
        let result = ButtonConfig::resolve(options());
        assert!(matches!(result, Err(PayButtonError::MissingAmount)));

        let result = ButtonConfig::resolve(options().with_usd("   "));
        assert!(matches!(result, Err(PayButtonError::MissingAmount)));
    }

    #[test]
    fn test_unparsable_amount_is_rejected() {
        let result = ButtonConfig::resolve(options().with_btc("one bitcoin"));
        match result {
            Err(PayButtonError::InvalidAmount { value }) => assert_eq!(value, "one bitcoin"),
            other => panic!("expected invalid amount, got {:?}", other),
        }

        assert!(ButtonConfig::resolve(options().with_usd("-5")).is_err());
        assert!(ButtonConfig::resolve(options().with_usd("0")).is_err());
    }

    #[test]
    fn test_scientific_amount_is_accepted() {
        let config = ButtonConfig::resolve(options().with_btc("1e-4")).unwrap();
        assert_eq!(config.amount().value(), Decimal::from_str("0.0001").unwrap());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let result = ButtonConfig::resolve(ButtonOptions::default().with_usd("5"));
        assert!(matches!(result, Err(PayButtonError::MissingEmbedToken)));

        let result = ButtonConfig::resolve(ButtonOptions::new("  ").with_usd("5"));
        assert!(matches!(result, Err(PayButtonError::MissingEmbedToken)));
    }

    #[test]
    fn test_reference_is_generated_when_absent() {
        let first = ButtonConfig::resolve(options().with_usd("5")).unwrap();
        let second = ButtonConfig::resolve(options().with_usd("5")).unwrap();

        assert!(!first.reference().is_empty());
        assert_ne!(first.reference(), second.reference());
    }

    #[test]
    fn test_reference_is_preserved() {
        let config =
            ButtonConfig::resolve(options().with_usd("5").with_reference(" order #42 ")).unwrap();
        assert_eq!(config.reference(), " order #42 ");
    }

    #[test]
    fn test_long_data_is_truncated() {
        let data = "x".repeat(MAX_DATA_LENGTH + 25);
        let config = ButtonConfig::resolve(options().with_usd("5").with_data(data)).unwrap();

        assert_eq!(config.data().unwrap().chars().count(), MAX_DATA_LENGTH);
        assert_eq!(
            config.warnings(),
            &[ConfigWarning::DataTruncated {
                original_length: MAX_DATA_LENGTH + 25
            }]
        );
    }

    #[test]
    fn test_truncation_counts_characters() {
        let data = "é".repeat(MAX_DATA_LENGTH + 1);
        let config = ButtonConfig::resolve(options().with_usd("5").with_data(data)).unwrap();
        assert_eq!(config.data().unwrap(), "é".repeat(MAX_DATA_LENGTH));
    }

    #[test]
    fn test_data_at_limit_is_untouched() {
        let data = "z".repeat(MAX_DATA_LENGTH);
        let config =
            ButtonConfig::resolve(options().with_usd("5").with_data(data.clone())).unwrap();

        assert_eq!(config.data(), Some(data.as_str()));
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn test_short_data_is_untouched() {
        let config =
            ButtonConfig::resolve(options().with_usd("5").with_data("{\"sku\":1}")).unwrap();
        assert_eq!(config.data(), Some("{\"sku\":1}"));
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn test_invalid_redirect_is_dropped() {
        for raw in ["not a url", "/thanks", "javascript:alert(1)", "mailto:a@b.c"] {
            let config =
                ButtonConfig::resolve(options().with_usd("5").with_redirect_url(raw)).unwrap();
            assert!(config.redirect_url().is_none(), "{} should be dropped", raw);
            assert_eq!(
                config.warnings(),
                &[ConfigWarning::InvalidRedirectUrl {
                    value: raw.to_string()
                }]
            );
        }
    }

    #[test]
    fn test_valid_redirect_is_kept() {
        let config = ButtonConfig::resolve(
            options()
                .with_usd("5")
                .with_redirect_url("https://shop.example/thanks?order=1"),
        )
        .unwrap();

        assert_eq!(
            config.redirect_url().map(Url::as_str),
            Some("https://shop.example/thanks?order=1")
        );
    }

    #[test]
    fn test_widget_config_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_widget_config_validation() {
        assert!(WidgetConfig::new("ftp://checkout", DEFAULT_STATUS_URL)
            .validate()
            .is_err());
        assert!(WidgetConfig::new(DEFAULT_CHECKOUT_URL, "not a url")
            .validate()
            .is_err());

        let mut config = WidgetConfig::default();
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_is_never_zero() {
        let config = WidgetConfig {
            poll_interval_secs: 0,
            ..WidgetConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_widget_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"checkout_url": "https://checkout.test", "poll_interval_secs": 5}}"#
        )
        .unwrap();

        let config = WidgetConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.checkout_url, "https://checkout.test");
        assert_eq!(config.status_url, DEFAULT_STATUS_URL);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_widget_config_from_missing_file() {
        let result = WidgetConfig::from_file("/nonexistent/paybutton.json");
        assert!(matches!(result, Err(PayButtonError::Config { .. })));
    }
}
