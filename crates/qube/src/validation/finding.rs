//! Structural findings reported by the validation engine.

use serde::Serialize;
use thiserror::Error;

use crate::identifier::ResolveError;
use crate::model::ComponentKind;

/// Most undefined values quoted in a finding's message.
pub const MAX_REPORTED_VALUES: usize = 5;

/// A structural problem found in a cube.
///
/// Findings are values, not failures: the engine collects all of them and
/// leaves the caller to decide what is fatal.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralError {
    #[error("Column title '{title}' is used more than once")]
    DuplicateColumnTitle { title: String },

    #[error("Column '{column}' is not present in the data")]
    ColumnNotFoundInData { column: String },

    #[error(transparent)]
    Identifier(ResolveError),

    #[error("Code list for '{column}' has concept '{notation}' with unknown parent '{parent}'")]
    UndefinedParentConcept {
        column: String,
        notation: String,
        parent: String,
    },

    #[error("Code list for '{column}' has a cycle in its hierarchy: {notations:?}")]
    ConceptHierarchyCycle {
        column: String,
        notations: Vec<String>,
    },

    #[error("The cube's shape is not supported: {reason} (columns: {columns:?})")]
    HybridShape { reason: String, columns: Vec<String> },

    #[error("The cube does not contain an observation value column")]
    NoObservedValuesColumn,

    #[error("The cube has more than one observation value column: {columns:?}")]
    MoreThanOneObservationsColumn { columns: Vec<String> },

    #[error("No measure is defined for observation value column(s) {columns:?}")]
    NoMeasuresDefined { columns: Vec<String> },

    #[error("The cube has more than one measure dimension column: {columns:?}")]
    MoreThanOneMeasureColumn { columns: Vec<String> },

    #[error("Measure dimension column '{column}' defines no measures")]
    EmptyMeasureDimension { column: String },

    #[error("No unit is defined for observation value column '{column}'")]
    NoUnitsDefined { column: String },

    #[error("More than one units column applies to the observations: {columns:?}")]
    MoreThanOneUnitsColumn { columns: Vec<String> },

    #[error("Observation value column '{column}' defines a unit and is also qualified by units column '{units_column}'")]
    BothUnitTypesDefined { column: String, units_column: String },

    #[error("Measure '{measure}' is used by more than one observation value column: {columns:?}")]
    DuplicateMeasureAcrossPivotedColumns { measure: String, columns: Vec<String> },

    #[error("{component} column '{column}' does not say which observation value column it qualifies")]
    AttributeNotLinked {
        component: ComponentKind,
        column: String,
    },

    #[error("Column '{column}' qualifies observation value column '{linked}', which does not exist")]
    LinkedObservationColumnDoesNotExist { column: String, linked: String },

    #[error("Column '{column}' qualifies '{linked}', which is not an observation value column")]
    LinkedToNonObservationColumn { column: String, linked: String },

    #[error("Column '{column}' holds literal values and cannot also define a URI template")]
    LiteralWithUriTemplateConflict { column: String },

    #[error("{component} column '{column}' only references existing resources and must define a URI template")]
    UriTemplateMissingForExistingOnlyReference {
        component: ComponentKind,
        column: String,
    },

    #[error(
        "Found undefined value(s) for '{component}' of '{location}'. Undefined values: {}",
        preview(.values)
    )]
    UndefinedValues {
        component: String,
        location: String,
        values: Vec<String>,
    },

    #[error("Missing value(s) in observation value column '{column}' at row(s) {row_numbers:?}")]
    ObservationValuesMissing {
        column: String,
        row_numbers: Vec<usize>,
    },
}

fn preview(values: &[String]) -> String {
    let mut shown: Vec<&str> = values
        .iter()
        .take(MAX_REPORTED_VALUES)
        .map(|v| v.as_str())
        .collect();
    if values.len() > MAX_REPORTED_VALUES {
        shown.push("...");
    }
    shown.join(", ")
}

impl StructuralError {
    /// Stable snake-case name of the finding.
    pub fn kind(&self) -> &'static str {
        match self {
            StructuralError::DuplicateColumnTitle { .. } => "duplicate_column_title",
            StructuralError::ColumnNotFoundInData { .. } => "column_not_found_in_data",
            StructuralError::Identifier(ResolveError::LabelCollision { .. }) => "label_collision",
            StructuralError::Identifier(ResolveError::ReservedTokenUsed { .. }) => {
                "reserved_token_used"
            }
            StructuralError::Identifier(ResolveError::EmptyToken { .. }) => "empty_token",
            StructuralError::UndefinedParentConcept { .. } => "undefined_parent_concept",
            StructuralError::ConceptHierarchyCycle { .. } => "concept_hierarchy_cycle",
            StructuralError::HybridShape { .. } => "hybrid_shape",
            StructuralError::NoObservedValuesColumn => "no_observed_values_column",
            StructuralError::MoreThanOneObservationsColumn { .. } => {
                "more_than_one_observations_column"
            }
            StructuralError::NoMeasuresDefined { .. } => "no_measures_defined",
            StructuralError::MoreThanOneMeasureColumn { .. } => "more_than_one_measure_column",
            StructuralError::EmptyMeasureDimension { .. } => "empty_measure_dimension",
            StructuralError::NoUnitsDefined { .. } => "no_units_defined",
            StructuralError::MoreThanOneUnitsColumn { .. } => "more_than_one_units_column",
            StructuralError::BothUnitTypesDefined { .. } => "both_unit_types_defined",
            StructuralError::DuplicateMeasureAcrossPivotedColumns { .. } => {
                "duplicate_measure_across_pivoted_columns"
            }
            StructuralError::AttributeNotLinked { .. } => "attribute_not_linked",
            StructuralError::LinkedObservationColumnDoesNotExist { .. } => {
                "linked_observation_column_does_not_exist"
            }
            StructuralError::LinkedToNonObservationColumn { .. } => {
                "linked_to_non_observation_column"
            }
            StructuralError::LiteralWithUriTemplateConflict { .. } => {
                "literal_with_uri_template_conflict"
            }
            StructuralError::UriTemplateMissingForExistingOnlyReference { .. } => {
                "uri_template_missing_for_existing_only_reference"
            }
            StructuralError::UndefinedValues { .. } => "undefined_values",
            StructuralError::ObservationValuesMissing { .. } => "observation_values_missing",
        }
    }

    /// Titles of the columns the finding is about.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            StructuralError::DuplicateColumnTitle { title } => vec![title.as_str()],
            StructuralError::ColumnNotFoundInData { column }
            | StructuralError::UndefinedParentConcept { column, .. }
            | StructuralError::ConceptHierarchyCycle { column, .. }
            | StructuralError::EmptyMeasureDimension { column }
            | StructuralError::NoUnitsDefined { column }
            | StructuralError::AttributeNotLinked { column, .. }
            | StructuralError::LiteralWithUriTemplateConflict { column }
            | StructuralError::UriTemplateMissingForExistingOnlyReference { column, .. }
            | StructuralError::ObservationValuesMissing { column, .. } => vec![column.as_str()],
            StructuralError::BothUnitTypesDefined {
                column,
                units_column,
            } => vec![column.as_str(), units_column.as_str()],
            StructuralError::LinkedObservationColumnDoesNotExist { column, linked }
            | StructuralError::LinkedToNonObservationColumn { column, linked } => {
                vec![column.as_str(), linked.as_str()]
            }
            StructuralError::UndefinedValues { location, .. } => vec![location.as_str()],
            StructuralError::HybridShape { columns, .. }
            | StructuralError::MoreThanOneObservationsColumn { columns }
            | StructuralError::NoMeasuresDefined { columns }
            | StructuralError::MoreThanOneMeasureColumn { columns }
            | StructuralError::MoreThanOneUnitsColumn { columns }
            | StructuralError::DuplicateMeasureAcrossPivotedColumns { columns, .. } => {
                columns.iter().map(|c| c.as_str()).collect()
            }
            StructuralError::Identifier(_) | StructuralError::NoObservedValuesColumn => Vec::new(),
        }
    }
}
