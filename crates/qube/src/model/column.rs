//! Cube columns.

use serde::{Deserialize, Serialize};

use super::components::Component;
use crate::identifier::{csvw_column_name, uri_safe};

/// One column of the cube's CSV.
///
/// A column without a structural definition is suppressed: it stays in the
/// CSV but produces no triples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub title: String,
    /// Overrides the value URI template the writer would otherwise derive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<Component>,
}

impl Column {
    pub fn new(title: impl Into<String>, definition: Component) -> Self {
        Self {
            title: title.into(),
            uri_template: None,
            definition: Some(definition),
        }
    }

    pub fn suppressed(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri_template: None,
            definition: None,
        }
    }

    pub fn with_uri_template(mut self, template: impl Into<String>) -> Self {
        self.uri_template = Some(template.into());
        self
    }

    pub fn is_suppressed(&self) -> bool {
        self.definition.is_none()
    }

    /// URI-safe token for this column's title.
    pub fn token(&self) -> String {
        uri_safe(&self.title)
    }

    /// Name used for this column in CSV-W documents and URI templates.
    pub fn csvw_name(&self) -> String {
        csvw_column_name(&self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimension;

    #[test]
    fn test_names() {
        let column = Column::new("Reference Area", Component::Dimension(Dimension::new("Area")));
        assert_eq!(column.token(), "reference-area");
        assert_eq!(column.csvw_name(), "reference_area");
        assert!(!column.is_suppressed());
        assert!(Column::suppressed("Notes").is_suppressed());
    }

    #[test]
    fn test_suppressed_column_round_trips_without_definition() {
        let json = serde_json::to_string(&Column::suppressed("Notes")).unwrap();
        assert_eq!(json, r#"{"title":"Notes"}"#);
        let back: Column = serde_json::from_str(&json).unwrap();
        assert!(back.is_suppressed());
    }
}
