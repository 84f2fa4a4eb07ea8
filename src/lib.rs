//! # paybutton - embeddable Bitcoin payment button
//!
//! Renders a payment button for a merchant embed token and an amount in bitcoin or
//! US dollars, opens the hosted checkout in an overlay, and polls the status API
//! until the payment is accepted or the shopper closes the overlay.
//!
//! The page is reached through the [`Host`] trait; [`HeadlessHost`] keeps it in
//! memory.
//!
//! ```rust,no_run
//! use paybutton::{ButtonOptions, HeadlessHost, Widget, WidgetConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> paybutton::Result<()> {
//! let widget = Widget::new(WidgetConfig::default())?;
//! let button = widget.create(
//!     ButtonOptions::new("embed-token").with_usd("25"),
//!     Arc::new(HeadlessHost::new()),
//! )?;
//! button.activate()?;
//! # Ok(())
//! # }
//! ```

pub mod button;
pub mod checkout;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
mod poller;
pub mod template;
pub mod types;
pub mod widget;

// Re-exports for convenience
pub use button::{CloseTrigger, OverlayState, PayButton};
pub use client::{StatusClient, StatusSource};
pub use config::{ButtonConfig, ConfigWarning, WidgetConfig};
pub use error::{PayButtonError, Result};
pub use events::{ButtonEvent, EventBus, EventKind, SubscriptionId};
pub use host::{HeadlessHost, Host};
pub use types::*;
pub use widget::Widget;

/// Current version of the paybutton library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
