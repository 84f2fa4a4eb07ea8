//! Widget stylesheet
//!
//! Styles are shared by every button in the process, so they are injected once.

use crate::host::Host;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static STYLES_INJECTED: OnceCell<()> = OnceCell::new();

/// Theme configuration for the button and overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonTheme {
    /// Button background color
    pub primary_color: String,
    /// Button label color
    pub text_color: String,
    /// Overlay backdrop color
    pub backdrop_color: String,
    /// Border radius of the button and frame
    pub border_radius: String,
}

impl Default for ButtonTheme {
    fn default() -> Self {
        Self {
            primary_color: "#f7931a".to_string(),
            text_color: "#ffffff".to_string(),
            backdrop_color: "rgba(0, 0, 0, 0.6)".to_string(),
            border_radius: "8px".to_string(),
        }
    }
}

impl ButtonTheme {
    /// Create a new theme
    pub fn new() -> Self {
        Self::default()
    }

    /// Set primary color
    pub fn with_primary_color(mut self, color: impl Into<String>) -> Self {
        self.primary_color = color.into();
        self
    }

    /// Set text color
    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = color.into();
        self
    }

    /// Set backdrop color
    pub fn with_backdrop_color(mut self, color: impl Into<String>) -> Self {
        self.backdrop_color = color.into();
        self
    }

    /// Set border radius
    pub fn with_border_radius(mut self, radius: impl Into<String>) -> Self {
        self.border_radius = radius.into();
        self
    }
}

/// Render the widget stylesheet for a theme
pub fn stylesheet(theme: &ButtonTheme) -> String {
    format!(
        r#":root {{
  --paybutton-primary: {primary};
  --paybutton-text: {text};
  --paybutton-backdrop: {backdrop};
  --paybutton-radius: {radius};
}}
.paybutton {{
  background: var(--paybutton-primary);
  color: var(--paybutton-text);
  border: none;
  border-radius: var(--paybutton-radius);
  padding: 0.6rem 1.2rem;
  font-weight: 600;
  cursor: pointer;
}}
.paybutton-overlay {{
  position: fixed;
  inset: 0;
  z-index: 2147483647;
  display: flex;
  align-items: center;
  justify-content: center;
  background: var(--paybutton-backdrop);
}}
.paybutton-frame-wrapper {{
  position: relative;
  width: 420px;
  max-width: 95vw;
  height: 640px;
  max-height: 95vh;
}}
.paybutton-frame {{
  width: 100%;
  height: 100%;
  border: none;
  border-radius: var(--paybutton-radius);
  background: #ffffff;
}}
.paybutton-close {{
  position: absolute;
  top: -2rem;
  right: 0;
  background: none;
  border: none;
  color: #ffffff;
  font-size: 1.5rem;
  cursor: pointer;
}}"#,
        primary = theme.primary_color,
        text = theme.text_color,
        backdrop = theme.backdrop_color,
        radius = theme.border_radius,
    )
}

/// Inject the stylesheet into the host unless it has already been injected
///
/// Returns `true` when this call performed the injection.
pub fn ensure_styles(host: &dyn Host, theme: &ButtonTheme) -> bool {
    if STYLES_INJECTED.set(()).is_err() {
        return false;
    }
    host.inject_styles(&stylesheet(theme));
    true
}
