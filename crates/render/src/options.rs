//! Rendering options shared by the HTML renderers.

use kyozai_core::MarkdownOptions;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Options for HTML rendering.
///
/// Deserializes from snake_case or camelCase keys; missing keys keep their
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Emit the MathJax configuration and loader script.
    #[serde(default = "default_true", alias = "includeMathjax", alias = "includeMathJax")]
    pub include_mathjax: bool,
    /// Pass raw HTML in text fields through. When disabled it is escaped.
    #[serde(default = "default_true", alias = "allowRawHtml")]
    pub allow_raw_html: bool,
    /// Show dashed guides where pages break on screen.
    #[serde(default = "default_true", alias = "pageBreakPreview")]
    pub page_break_preview: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_mathjax: true,
            allow_raw_html: true,
            page_break_preview: true,
        }
    }
}

impl RenderOptions {
    /// Options for markdown-lite conversion.
    pub fn markdown(&self) -> MarkdownOptions {
        MarkdownOptions {
            allow_raw_html: self.allow_raw_html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_default_to_true() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RenderOptions::default());
    }

    #[test]
    fn accepts_camel_case() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"includeMathJax": false, "allowRawHtml": false}"#).unwrap();
        assert!(!options.include_mathjax);
        assert!(!options.allow_raw_html);
        assert!(options.page_break_preview);
    }

    #[test]
    fn accepts_snake_case() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"page_break_preview": false}"#).unwrap();
        assert!(!options.page_break_preview);
    }
}
