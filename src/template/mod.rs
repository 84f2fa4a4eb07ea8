//! HTML and CSS templates for the payment button
//!
//! The button, the overlay with its checkout frame, and the stylesheet are all
//! produced as strings so any [`Host`](crate::host::Host) can attach them to its
//! own document model.

pub mod markup;
pub mod styles;

pub use markup::{button_markup, overlay_markup, Overlay, CLOSE_CONTROL_CLASS, OVERLAY_CLASS};
pub use styles::{ensure_styles, stylesheet, ButtonTheme};

/// Escape text for use inside HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
