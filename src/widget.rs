//! Entry point for application code
//!
//! A [`Widget`] holds the endpoints shared by every button on a page and creates
//! buttons either from explicit [`ButtonOptions`] or from the markup attributes of
//! their container.

use crate::button::PayButton;
use crate::client::{StatusClient, StatusSource};
use crate::config::{ButtonConfig, WidgetConfig};
use crate::host::Host;
use crate::types::ButtonOptions;
use crate::Result;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Factory for payment buttons
#[derive(Clone)]
pub struct Widget {
    config: WidgetConfig,
    source: Arc<dyn StatusSource>,
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("config", &self.config)
            .field("source", &"<status source>")
            .finish()
    }
}

impl Widget {
    /// Create a widget polling the configured status API
    pub fn new(config: WidgetConfig) -> Result<Self> {
        config.validate()?;
        let client = StatusClient::from_config(&config)?;
        Ok(Self {
            config,
            source: Arc::new(client),
        })
    }

    /// Create a widget with a custom status source
    pub fn with_status_source(config: WidgetConfig, source: Arc<dyn StatusSource>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, source })
    }

    /// Create a widget configured from `PAYBUTTON_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(WidgetConfig::from_env()?)
    }

    /// Widget configuration
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Create and render a button in the given container
    pub fn create(&self, options: ButtonOptions, host: Arc<dyn Host>) -> Result<PayButton> {
        let config = ButtonConfig::resolve(options)?;
        let button = PayButton::new(config, host, Arc::clone(&self.source), &self.config)?;
        button.render();
        Ok(button)
    }

    /// Create and render a button from the markup attributes of its container
    pub fn from_element(&self, host: Arc<dyn Host>) -> Result<PayButton> {
        let options = ButtonOptions::from_attributes(|name| host.attribute(name));
        self.create(options, host)
    }

    /// Create buttons for every declared container
    ///
    /// Containers with invalid attributes are logged and skipped.
    pub fn auto_init<I>(&self, hosts: I) -> Vec<PayButton>
    where
        I: IntoIterator<Item = Arc<dyn Host>>,
    {
        let mut buttons = Vec::new();
        for (index, host) in hosts.into_iter().enumerate() {
            match self.from_element(host) {
                Ok(button) => buttons.push(button),
                Err(e) => warn!("Skipping payment button #{}: {}", index, e),
            }
        }
        info!("Initialised {} payment button(s)", buttons.len());
        buttons
    }
}
