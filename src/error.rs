//! Structured error types for the layout engine.
//!
//! Parsing, font loading, rendering and the page cache are the real error
//! sources. Layout itself never fails: content that does not fit is
//! reported through resume indices, and degenerate metrics are logged and
//! substituted.

use thiserror::Error;

/// The unified error type returned by the public API.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// JSON input failed to parse as a valid document.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// A font could not be decoded or parsed.
    #[error("Font error: {0}")]
    Font(String),
    /// A renderer rejected a page.
    #[error("Render error on page {page}: {message}")]
    Render { page: String, message: String },
    /// Reading or writing a cached page failed.
    #[error("Page cache error: {0}")]
    Cache(#[from] std::io::Error),
    /// A cached page could not be decoded.
    #[error("Corrupt cached page: {0}")]
    CacheFormat(String),
    /// The engine configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the document schema. Check node types and field names.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input, is the JSON truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        LayoutError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_carry_a_hint() {
        let err: LayoutError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.contains("Hint: Check for trailing commas"), "got: {}", msg);
    }

    #[test]
    fn render_error_names_the_page() {
        let err = LayoutError::Render {
            page: "3".to_string(),
            message: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "Render error on page 3: disk full");
    }
}
