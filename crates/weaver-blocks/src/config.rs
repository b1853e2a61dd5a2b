//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Tunables for an editor context.
///
/// Read once when the context is built. The style registry derives its
/// fixed tag table from the colour and font fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Window for telling a double click from two single clicks.
    pub click_window_ms: u64,
    /// Text colour applied by the `color` tag.
    pub text_color: String,
    /// Background colour applied by the `background` tag.
    pub highlight_color: String,
    /// Font family applied by the `code` tag.
    pub code_font_family: String,
    /// Background applied by the `code` tag.
    pub code_background: String,
    /// Font sizes for heading blocks, largest first.
    pub heading_sizes: [String; 3],
    /// Enter with a caret at the very start of a block inserts above it.
    pub enter_at_start_inserts_before: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            click_window_ms: 200,
            text_color: "#d1383d".to_owned(),
            highlight_color: "#fff3a3".to_owned(),
            code_font_family: "monospace".to_owned(),
            code_background: "#f2f2f2".to_owned(),
            heading_sizes: ["3em".to_owned(), "2em".to_owned(), "1.5em".to_owned()],
            enter_at_start_inserts_before: true,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{ "click_window_ms": 350 }"#).unwrap();
        assert_eq!(config.click_window_ms, 350);
        assert_eq!(config.code_font_family, "monospace");
        assert!(config.enter_at_start_inserts_before);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = EditorConfig::from_json(r#"{ "spellcheck": true }"#).unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }
}
