//! Code lists and their concepts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::identifier::uri_safe;

/// A controlled vocabulary used by a coded dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CodeList {
    /// A concept scheme published elsewhere.
    Existing { concept_scheme_uri: String },
    /// A code list defined and published alongside this cube.
    New(NewCodeList),
}

/// A dataset-local code list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCodeList {
    /// Label of the scheme; defaults to the owning dimension's label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub concepts: Vec<Concept>,
}

/// One entry in a code list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub label: String,
    /// Defaults to the URI-safe form of the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notation: Option<String>,
    /// Notation of the broader concept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_notation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Concept {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            notation: None,
            parent_notation: None,
            sort_priority: None,
            description: None,
        }
    }

    pub fn with_notation(mut self, notation: impl Into<String>) -> Self {
        self.notation = Some(notation.into());
        self
    }

    pub fn with_parent(mut self, parent_notation: impl Into<String>) -> Self {
        self.parent_notation = Some(parent_notation.into());
        self
    }

    /// The concept's notation, derived from its label if not given.
    pub fn notation(&self) -> String {
        match self.notation.as_deref() {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => uri_safe(&self.label),
        }
    }
}

impl NewCodeList {
    pub fn new(concepts: Vec<Concept>) -> Self {
        Self {
            label: None,
            concepts,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Build a code list from the distinct non-blank values of a column.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut distinct: Vec<&str> = values
            .into_iter()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        distinct.sort_unstable();
        distinct.dedup();

        Self::new(distinct.into_iter().map(Concept::new).collect())
    }

    /// Look a concept up by notation.
    pub fn concept(&self, notation: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.notation() == notation)
    }

    /// Parent notations that do not name a concept in this list.
    pub fn unknown_parents(&self) -> Vec<(String, String)> {
        let notations: HashSet<String> = self.concepts.iter().map(Concept::notation).collect();
        self.concepts
            .iter()
            .filter_map(|c| {
                let parent = c.parent_notation.as_ref()?;
                (!notations.contains(parent)).then(|| (c.notation(), parent.clone()))
            })
            .collect()
    }

    /// A cycle in the broader/narrower hierarchy, if one exists.
    ///
    /// Returns the notations on the cycle, starting from the first concept
    /// (in list order) that leads into it.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut cleared: HashSet<String> = HashSet::new();

        for start in &self.concepts {
            let mut path: Vec<String> = Vec::new();
            let mut current = Some(start.notation());

            while let Some(notation) = current {
                if cleared.contains(&notation) {
                    break;
                }
                if let Some(pos) = path.iter().position(|n| *n == notation) {
                    return Some(path[pos..].to_vec());
                }
                current = self
                    .concept(&notation)
                    .and_then(|c| c.parent_notation.clone());
                path.push(notation);
            }

            cleared.extend(path);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notation_defaults_to_label_token() {
        assert_eq!(Concept::new("North East").notation(), "north-east");
        assert_eq!(Concept::new("North East").with_notation("E12").notation(), "E12");
    }

    #[test]
    fn test_from_values_sorts_and_dedupes() {
        let list = NewCodeList::from_values(["b", "a", "", "b"]);
        let labels: Vec<&str> = list.concepts.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_parent() {
        let list = NewCodeList::new(vec![
            Concept::new("All"),
            Concept::new("Child").with_parent("missing"),
        ]);
        assert_eq!(
            list.unknown_parents(),
            vec![("child".to_string(), "missing".to_string())]
        );
    }

    #[test]
    fn test_hierarchy_without_cycle() {
        let list = NewCodeList::new(vec![
            Concept::new("All"),
            Concept::new("England").with_parent("all"),
            Concept::new("London").with_parent("england"),
        ]);
        assert_eq!(list.find_cycle(), None);
    }

    #[test]
    fn test_hierarchy_cycle_detected() {
        let list = NewCodeList::new(vec![
            Concept::new("Root"),
            Concept::new("A").with_parent("b"),
            Concept::new("B").with_parent("a"),
        ]);
        let cycle = list.find_cycle().unwrap();
        assert_eq!(cycle, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let list = NewCodeList::new(vec![Concept::new("A").with_parent("a")]);
        assert_eq!(list.find_cycle(), Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_code_list_serde_tagging() {
        let json = r#"{"type": "existing", "concept_scheme_uri": "http://example.org/scheme"}"#;
        let list: CodeList = serde_json::from_str(json).unwrap();
        assert!(matches!(list, CodeList::Existing { .. }));

        let json = r#"{"type": "new", "concepts": [{"label": "a"}]}"#;
        let list: CodeList = serde_json::from_str(json).unwrap();
        match list {
            CodeList::New(new) => assert_eq!(new.concepts.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }
}
