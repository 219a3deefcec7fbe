//! Catalog metadata describing a dataset or code list.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::identifier::{ResolveError, Token};

/// Catalog-level description of a published dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_page_uri: Option<String>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub theme_uris: IndexSet<String>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub keywords: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_issued: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_contact_point_uri: Option<String>,
    /// Overrides the token otherwise derived from [`identifier`](Self::identifier).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_safe_identifier_override: Option<String>,
}

impl CatalogMetadata {
    /// Create metadata with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set an explicit identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Add a keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.insert(keyword.into());
        self
    }

    /// The explicit identifier when set and non-blank, else the title.
    pub fn identifier(&self) -> &str {
        self.identifier
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(&self.title)
    }

    /// Token used to name the dataset's files and URIs.
    pub fn uri_safe_identifier(&self) -> Result<Token, ResolveError> {
        match self.uri_safe_identifier_override.as_deref() {
            Some(id) if !id.trim().is_empty() => Token::resolve(id),
            _ => Token::resolve(self.identifier()),
        }
    }
}
