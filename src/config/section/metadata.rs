//! `[metadata]` section configuration.
//!
//! Book metadata, exposed to templates as `metadata` and forwarded to the
//! PDF renderer as document info.
//!
//! # Example
//!
//! ```toml
//! [metadata]
//! title = "My Book"
//! author = "Your Name"
//! subject = "A book created with Crown"
//! keywords = ["book", "crown", "pdf"]
//! lang = "en"
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: Vec<String>,
    pub lang: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            title: "Untitled Book".into(),
            author: "Unknown Author".into(),
            subject: String::new(),
            keywords: Vec::new(),
            lang: "en".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_metadata_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.metadata.title, "Untitled Book");
        assert_eq!(config.metadata.author, "Unknown Author");
        assert_eq!(config.metadata.lang, "en");
        assert!(config.metadata.keywords.is_empty());
    }

    #[test]
    fn test_metadata_partial_override() {
        let config = test_parse_config("[metadata]\ntitle = \"Field Notes\"\nkeywords = [\"a\", \"b\"]");
        assert_eq!(config.metadata.title, "Field Notes");
        assert_eq!(config.metadata.author, "Unknown Author");
        assert_eq!(config.metadata.keywords, vec!["a", "b"]);
    }
}
