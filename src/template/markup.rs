//! Button and overlay markup

use super::escape_html;
use crate::config::ButtonConfig;
use url::Url;

/// Class of the overlay root element
pub const OVERLAY_CLASS: &str = "paybutton-overlay";

/// Class of the close control inside the overlay
pub const CLOSE_CONTROL_CLASS: &str = "paybutton-close";

/// Class of the checkout frame
pub const FRAME_CLASS: &str = "paybutton-frame";

/// Overlay subtree hosting the checkout frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    /// URL loaded by the checkout frame
    pub frame_url: Url,
    /// Rendered overlay markup
    pub markup: String,
}

impl Overlay {
    /// Whether the markup contains the close control
    pub fn has_close_control(&self) -> bool {
        self.markup.contains(CLOSE_CONTROL_CLASS)
    }

    /// Whether the markup contains the checkout frame
    pub fn has_frame(&self) -> bool {
        self.markup.contains("<iframe")
    }
}

/// Render the clickable payment button
pub fn button_markup(config: &ButtonConfig) -> String {
    format!(
        r#"<button type="button" class="paybutton" data-ref="{reference}">Pay {amount}</button>"#,
        reference = escape_html(config.reference()),
        amount = escape_html(&config.amount().to_string()),
    )
}

/// Render the overlay with its checkout frame and close control
pub fn overlay_markup(frame_url: &Url) -> Overlay {
    let markup = format!(
        r#"<div class="{overlay}" role="dialog" aria-modal="true">
  <div class="paybutton-frame-wrapper">
    <button type="button" class="{close}" aria-label="Close">&times;</button>
    <iframe class="{frame}" src="{src}" allow="clipboard-write" title="Checkout"></iframe>
  </div>
</div>"#,
        overlay = OVERLAY_CLASS,
        close = CLOSE_CONTROL_CLASS,
        frame = FRAME_CLASS,
        src = escape_html(frame_url.as_str()),
    );

    Overlay {
        frame_url: frame_url.clone(),
        markup,
    }
}
