//! Configuration types and defaults for the highlighter widget
//!
//! Every field has a default, so a JS options object only needs to carry the
//! keys it wants to override.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::WidgetError;

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_PLACEHOLDER: &str = "Type something...";
pub const DEFAULT_TOOLTIP_MESSAGE: &str = "This text matches your comparison string.";
pub const DEFAULT_TOOLTIP_DELAY_MS: u32 = 150;
pub const DEFAULT_MATCH_ATTRIBUTE: &str = "data-match";

// =============================================================================
// Main Configuration
// =============================================================================

/// Widget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Text shown while the surface is empty and unfocused. Default: "Type something..."
    pub placeholder: String,
    /// Fixed tooltip text shown over a matched run
    pub tooltip_message: String,
    /// Hover time before the tooltip appears. Default: 150
    pub tooltip_delay_ms: u32,
    /// CSS colour of the match underline. Default: #e53935
    pub underline_color: String,
    /// CSS thickness of the match underline. Default: 2px
    pub underline_thickness: String,
    /// CSS colour of the placeholder text. Default: #9e9e9e
    pub placeholder_color: String,
    /// Attribute that marks matched spans for hit-testing. Default: data-match
    pub match_attribute: String,
    /// Log every rebuild to the developer console. Default: false
    pub debug_logging: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            tooltip_message: DEFAULT_TOOLTIP_MESSAGE.to_string(),
            tooltip_delay_ms: DEFAULT_TOOLTIP_DELAY_MS,
            underline_color: "#e53935".to_string(),
            underline_thickness: "2px".to_string(),
            placeholder_color: "#9e9e9e".to_string(),
            match_attribute: DEFAULT_MATCH_ATTRIBUTE.to_string(),
            debug_logging: false,
        }
    }
}

impl WidgetConfig {
    /// No hover delay; tooltip shows on the next tick
    pub fn quiet() -> Self {
        Self {
            tooltip_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Parse from a JSON string (e.g. a `data-` attribute)
    pub fn from_json(json: &str) -> Result<Self, WidgetError> {
        serde_json::from_str(json).map_err(|e| WidgetError::Config(e.to_string()))
    }

    /// Parse from optional JS options: an object, or a JSON string.
    /// `undefined` / `null` yield the defaults.
    pub fn from_js(options: JsValue) -> Result<Self, WidgetError> {
        if options.is_undefined() || options.is_null() {
            return Ok(Self::default());
        }
        if let Some(json) = options.as_string() {
            return Self::from_json(&json);
        }
        serde_wasm_bindgen::from_value(options).map_err(|e| WidgetError::Config(e.to_string()))
    }

    /// Inline style for a matched span
    pub fn match_style(&self) -> String {
        format!(
            "text-decoration: underline; text-decoration-color: {}; \
             text-decoration-thickness: {}; cursor: help;",
            self.underline_color, self.underline_thickness
        )
    }

    /// Inline style for the placeholder span
    pub fn placeholder_style(&self) -> String {
        format!("color: {}; pointer-events: none;", self.placeholder_color)
    }

    /// CSS selector for every discoverable matched span
    pub fn match_selector(&self) -> String {
        format!("[{}=\"true\"]", self.match_attribute)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(config.placeholder, "Type something...");
        assert_eq!(config.tooltip_delay_ms, 150);
        assert_eq!(config.underline_thickness, "2px");
        assert_eq!(config.match_attribute, "data-match");
        assert!(!config.debug_logging);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = WidgetConfig::from_json(r#"{ "tooltip_delay_ms": 300, "underline_color": "teal" }"#)
            .unwrap();
        assert_eq!(config.tooltip_delay_ms, 300);
        assert_eq!(config.underline_color, "teal");
        assert_eq!(config.placeholder, DEFAULT_PLACEHOLDER);
        assert_eq!(config.tooltip_message, DEFAULT_TOOLTIP_MESSAGE);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(WidgetConfig::from_json("{}").unwrap(), WidgetConfig::default());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = WidgetConfig::from_json(r#"{ "tooltip_delay_ms": "soon" }"#).unwrap_err();
        assert!(matches!(err, WidgetError::Config(_)));
    }

    #[test]
    fn test_presets() {
        assert_eq!(WidgetConfig::quiet().tooltip_delay_ms, 0);
        assert!(!WidgetConfig::quiet().debug_logging);
    }

    #[test]
    fn test_match_style_and_selector() {
        let config = WidgetConfig::default();
        let style = config.match_style();
        assert!(style.contains("text-decoration-thickness: 2px"));
        assert!(style.contains("cursor: help"));
        assert_eq!(config.match_selector(), "[data-match=\"true\"]");
    }
}
