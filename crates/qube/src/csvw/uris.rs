//! URIs of the resources a cube document defines.
//!
//! Every URI is relative to the cube's CSV file, so a document can be moved
//! together with its CSV without rewriting anything.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{QubeError, Result};
use crate::identifier::Token;

/// Fragment naming a dataset-local concept scheme.
pub const CODE_LIST_FRAGMENT: &str = "code-list";

static TEMPLATE_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\+?([^{}]*)\}").expect("template variable pattern is valid"));

static COLUMN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("column name pattern is valid"));

/// URIs for one cube, keyed off its CSV file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeUris {
    csv_file: String,
}

impl CubeUris {
    pub fn new(identifier: &Token) -> Self {
        Self {
            csv_file: format!("{identifier}.csv"),
        }
    }

    /// Build from an existing CSV file name.
    pub fn for_csv(csv_file: impl Into<String>) -> Self {
        Self {
            csv_file: csv_file.into(),
        }
    }

    pub fn csv_file(&self) -> &str {
        &self.csv_file
    }

    pub fn metadata_file(&self) -> String {
        format!("{}-metadata.json", self.csv_file)
    }

    fn fragment(&self, fragment: &str) -> String {
        format!("{}#{}", self.csv_file, fragment)
    }

    /// Whether `uri` names a resource this cube defines.
    pub fn is_local(&self, uri: &str) -> bool {
        uri.strip_prefix(self.csv_file.as_str())
            .is_some_and(|rest| rest.starts_with('#'))
    }

    pub fn dataset(&self) -> String {
        self.fragment("dataset")
    }

    pub fn structure(&self) -> String {
        self.fragment("structure")
    }

    pub fn component(&self, token: &str) -> String {
        self.fragment(&format!("component/{token}"))
    }

    pub fn dimension(&self, token: &str) -> String {
        self.fragment(&format!("dimension/{token}"))
    }

    pub fn attribute(&self, token: &str) -> String {
        self.fragment(&format!("attribute/{token}"))
    }

    /// A value defined for a new coded attribute.
    pub fn attribute_value(&self, attribute: &str, value: &str) -> String {
        self.fragment(&format!("attribute/{attribute}/{value}"))
    }

    pub fn attribute_value_template(&self, attribute: &str, column_name: &str) -> String {
        self.fragment(&format!("attribute/{attribute}/{{+{column_name}}}"))
    }

    pub fn measure(&self, token: &str) -> String {
        self.fragment(&format!("measure/{token}"))
    }

    pub fn measure_template(&self, column_name: &str) -> String {
        self.fragment(&format!("measure/{{+{column_name}}}"))
    }

    pub fn unit(&self, token: &str) -> String {
        self.fragment(&format!("unit/{token}"))
    }

    pub fn unit_template(&self, column_name: &str) -> String {
        self.fragment(&format!("unit/{{+{column_name}}}"))
    }

    /// Observation URI of a standard-shape row.
    pub fn observation_template(&self, dimension_names: &[String], measure_column: &str) -> String {
        let key = path_template(dimension_names);
        self.fragment(&format!("obs/{key}@{{+{measure_column}}}"))
    }

    /// Observation URI of one pivoted column's value in a row.
    pub fn pivoted_observation_template(&self, dimension_names: &[String], measure: &str) -> String {
        let key = path_template(dimension_names);
        self.fragment(&format!("obs/{key}@{measure}"))
    }

    /// URI of the slice a pivoted row forms.
    pub fn slice_template(&self, dimension_names: &[String]) -> String {
        self.fragment(&format!("slice/{}", path_template(dimension_names)))
    }

    pub fn slice_key(&self) -> String {
        self.fragment("slice/cross-measures")
    }
}

fn path_template(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("{{+{n}}}"))
        .collect::<Vec<_>>()
        .join("/")
}

/// URIs for a dataset-local code list, keyed off its file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeListUris {
    stem: String,
}

impl CodeListUris {
    pub fn new(stem: &Token) -> Self {
        Self {
            stem: stem.to_string(),
        }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn csv_file(&self) -> String {
        format!("{}.csv", self.stem)
    }

    pub fn table_schema_file(&self) -> String {
        format!("{}.table.json", self.stem)
    }

    pub fn metadata_file(&self) -> String {
        format!("{}.csv-metadata.json", self.stem)
    }

    pub fn scheme(&self) -> String {
        format!("{}.csv#{CODE_LIST_FRAGMENT}", self.stem)
    }

    pub fn concept(&self, notation: &str) -> String {
        format!("{}.csv#{notation}", self.stem)
    }

    pub fn concept_template(&self, column_name: &str) -> String {
        format!("{}.csv#{{+{column_name}}}", self.stem)
    }
}

/// Names of the variables a URI template refers to, in order.
pub fn template_variables(template: &str) -> Result<Vec<String>> {
    let mut depth = 0usize;
    for ch in template.chars() {
        match ch {
            '{' if depth > 0 => return Err(malformed(template, "nested '{'")),
            '{' => depth += 1,
            '}' if depth == 0 => return Err(malformed(template, "unmatched '}'")),
            '}' => depth -= 1,
            _ => {}
        }
    }
    if depth != 0 {
        return Err(malformed(template, "unclosed '{'"));
    }

    TEMPLATE_VARIABLE
        .captures_iter(template)
        .map(|caps| {
            let name = &caps[1];
            if COLUMN_NAME.is_match(name) {
                Ok(name.to_string())
            } else {
                Err(malformed(template, &format!("'{name}' is not a column name")))
            }
        })
        .collect()
}

/// Check a user template only refers to columns that exist.
pub fn check_template<S: AsRef<str>>(template: &str, column_names: &[S]) -> Result<()> {
    for variable in template_variables(template)? {
        if !column_names.iter().any(|n| n.as_ref() == variable) {
            return Err(malformed(template, &format!("no column is named '{variable}'")));
        }
    }
    Ok(())
}

fn malformed(template: &str, reason: &str) -> QubeError {
    QubeError::MalformedUriTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    }
}
