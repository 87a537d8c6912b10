//! Error types for widget mounting and DOM access

use wasm_bindgen::JsValue;

/// Mount-time and DOM failures surfaced to JS callers
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetError {
    MissingWindow,
    MissingDocument,
    /// A DOM call threw; holds the debug rendering of the exception
    Dom(String),
    Config(String),
}

impl std::fmt::Display for WidgetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingWindow => write!(f, "No global window available"),
            Self::MissingDocument => write!(f, "Window has no document"),
            Self::Dom(e) => write!(f, "DOM operation failed: {}", e),
            Self::Config(e) => write!(f, "Invalid widget options: {}", e),
        }
    }
}

impl std::error::Error for WidgetError {}

impl From<JsValue> for WidgetError {
    fn from(value: JsValue) -> Self {
        Self::Dom(format!("{:?}", value))
    }
}

impl From<WidgetError> for JsValue {
    fn from(err: WidgetError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(WidgetError::MissingWindow.to_string(), "No global window available");
        assert_eq!(
            WidgetError::Config("bad".to_string()).to_string(),
            "Invalid widget options: bad"
        );
        assert_eq!(
            WidgetError::Dom("boom".to_string()).to_string(),
            "DOM operation failed: boom"
        );
    }
}
