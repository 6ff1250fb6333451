// src/github/model.rs
// =============================================================================
// Display records: the flat, render-ready shapes the page cards are built from.
//
// GitHub payloads carry dozens of fields; the REST and GraphQL modules each
// decode their own raw structs and map them into these types, keeping only
// what a card shows. Records are plain values: created once per build and
// never mutated afterwards.
// =============================================================================

use serde::Serialize;

/// A repository as shown on a repo card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub name: String,
    /// Empty when the repository has no description
    pub description: String,
    /// Browser link to the repository
    pub url: String,
}

/// A gist as shown on a gist card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gist {
    pub description: String,
    /// Browser link to the gist
    pub url: String,
    /// The first file of the gist, which acts as its title and preview
    pub file: GistFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistFile {
    pub filename: String,
    /// Language as GitHub names it ("JavaScript", "Rust", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Raw download URL (REST only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_url: Option<String>,
    /// File body, when it has been fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl GistFile {
    /// Language class suffix used by the highlighter, e.g. "javascript"
    pub fn language_class(&self) -> String {
        match &self.language {
            Some(language) if !language.is_empty() => language.to_lowercase(),
            _ => "none".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(language: Option<&str>) -> GistFile {
        GistFile {
            filename: "main.js".to_string(),
            language: language.map(str::to_string),
            raw_url: None,
            code: None,
        }
    }

    #[test]
    fn test_language_class() {
        assert_eq!(file(Some("JavaScript")).language_class(), "javascript");
        assert_eq!(file(None).language_class(), "none");
        assert_eq!(file(Some("")).language_class(), "none");
    }

    #[test]
    fn test_json_skips_missing_fields() {
        let json = serde_json::to_value(file(None)).unwrap();
        assert_eq!(json, serde_json::json!({ "filename": "main.js" }));
    }
}
