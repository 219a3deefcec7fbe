//! Structural definitions attached to cube columns.
//!
//! Every component kind is a closed sum type over its `Existing` (defined
//! elsewhere, referenced by URI) and `New` (defined by this cube) forms.

use serde::{Deserialize, Serialize};

use super::codelist::CodeList;
use crate::identifier::uri_safe;
use crate::vocab::SDMX_OBS_STATUS;

/// What a column contributes to the cube's structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Component {
    Dimension(Dimension),
    Attribute(Attribute),
    MeasureDimension(MeasureDimension),
    Units(UnitsColumn),
    ObservationValue(ObservationValue),
}

/// Coarse component kind, used in findings and reader records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Dimension,
    Attribute,
    Measure,
    MeasureDimension,
    Units,
    ObservationValue,
}

impl ComponentKind {
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::Dimension => "dimension",
            ComponentKind::Attribute => "attribute",
            ComponentKind::Measure => "measure",
            ComponentKind::MeasureDimension => "measure dimension",
            ComponentKind::Units => "units",
            ComponentKind::ObservationValue => "observation value",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Dimension(_) => ComponentKind::Dimension,
            Component::Attribute(_) => ComponentKind::Attribute,
            Component::MeasureDimension(_) => ComponentKind::MeasureDimension,
            Component::Units(_) => ComponentKind::Units,
            Component::ObservationValue(_) => ComponentKind::ObservationValue,
        }
    }

    /// The observation-value column this component qualifies, if declared.
    pub fn observed_value_column(&self) -> Option<&str> {
        match self {
            Component::Attribute(a) => a.observed_value_column.as_deref(),
            Component::Units(u) => u.observed_value_column.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Dimension {
    Existing {
        dimension_uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range_uri: Option<String>,
    },
    New(NewDimension),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDimension {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_list: Option<CodeList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dimension_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl NewDimension {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            code_list: None,
            parent_dimension_uri: None,
            source_uri: None,
        }
    }

    pub fn with_code_list(mut self, code_list: CodeList) -> Self {
        self.code_list = Some(code_list);
        self
    }

    /// Name the new code list is published under: its own label, or
    /// this dimension's. `None` without a new code list.
    pub fn code_list_name(&self) -> Option<&str> {
        match &self.code_list {
            Some(CodeList::New(list)) => Some(list.label.as_deref().unwrap_or(&self.label)),
            _ => None,
        }
    }
}

impl Dimension {
    pub fn new(label: impl Into<String>) -> Self {
        Dimension::New(NewDimension::new(label))
    }

    pub fn existing(dimension_uri: impl Into<String>) -> Self {
        Dimension::Existing {
            dimension_uri: dimension_uri.into(),
            range_uri: None,
        }
    }
}

/// An attribute column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub definition: AttributeDefinition,
    #[serde(default)]
    pub values: AttributeValues,
    #[serde(default)]
    pub is_required: bool,
    /// Title of the observation-value column this attribute qualifies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value_column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeDefinition {
    Existing {
        attribute_uri: String,
    },
    New {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_attribute_uri: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_uri: Option<String>,
    },
}

/// Values an attribute column may hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeValues {
    /// Each cell maps to a resource. An empty list means the resources
    /// are all defined elsewhere.
    Coded {
        #[serde(default)]
        values: Vec<AttributeValue>,
    },
    /// Each cell is a literal of the given datatype.
    Literal { data_type: String },
}

impl Default for AttributeValues {
    fn default() -> Self {
        AttributeValues::Coded { values: Vec::new() }
    }
}

/// A permitted value of a coded attribute, defined by this cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_attribute_value_uri: Option<String>,
}

impl AttributeValue {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            parent_attribute_value_uri: None,
        }
    }
}

impl Attribute {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            definition: AttributeDefinition::New {
                label: label.into(),
                description: None,
                parent_attribute_uri: None,
                source_uri: None,
            },
            values: AttributeValues::default(),
            is_required: false,
            observed_value_column: None,
        }
    }

    pub fn existing(attribute_uri: impl Into<String>) -> Self {
        Self {
            definition: AttributeDefinition::Existing {
                attribute_uri: attribute_uri.into(),
            },
            values: AttributeValues::default(),
            is_required: false,
            observed_value_column: None,
        }
    }

    pub fn with_values(mut self, values: Vec<AttributeValue>) -> Self {
        self.values = AttributeValues::Coded { values };
        self
    }

    pub fn literal(mut self, data_type: impl Into<String>) -> Self {
        self.values = AttributeValues::Literal {
            data_type: data_type.into(),
        };
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn qualifying(mut self, observation_column: impl Into<String>) -> Self {
        self.observed_value_column = Some(observation_column.into());
        self
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.values, AttributeValues::Literal { .. })
    }

    /// New attribute values declared for this column.
    pub fn new_values(&self) -> &[AttributeValue] {
        match &self.values {
            AttributeValues::Coded { values } => values,
            AttributeValues::Literal { .. } => &[],
        }
    }

    /// Whether this attribute records observation status.
    pub fn is_observation_status(&self) -> bool {
        match &self.definition {
            AttributeDefinition::Existing { attribute_uri } => attribute_uri == SDMX_OBS_STATUS,
            AttributeDefinition::New {
                parent_attribute_uri,
                ..
            } => parent_attribute_uri.as_deref() == Some(SDMX_OBS_STATUS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Measure {
    Existing {
        measure_uri: String,
    },
    New {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_measure_uri: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_uri: Option<String>,
    },
}

impl Measure {
    pub fn new(label: impl Into<String>) -> Self {
        Measure::New {
            label: label.into(),
            description: None,
            parent_measure_uri: None,
            source_uri: None,
        }
    }

    pub fn existing(measure_uri: impl Into<String>) -> Self {
        Measure::Existing {
            measure_uri: measure_uri.into(),
        }
    }

    /// Identity used to detect the same measure used twice.
    pub fn identity(&self) -> String {
        match self {
            Measure::Existing { measure_uri } => measure_uri.clone(),
            Measure::New { label, .. } => uri_safe(label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Unit {
    Existing {
        unit_uri: String,
    },
    New(NewUnit),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUnit {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_unit: Option<Box<Unit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_unit_scaling_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub si_base_unit_conversion_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qudt_quantity_kind_uri: Option<String>,
}

impl Unit {
    pub fn new(label: impl Into<String>) -> Self {
        Unit::New(NewUnit {
            label: label.into(),
            description: None,
            base_unit: None,
            base_unit_scaling_factor: None,
            si_base_unit_conversion_multiplier: None,
            qudt_quantity_kind_uri: None,
        })
    }

    pub fn existing(unit_uri: impl Into<String>) -> Self {
        Unit::Existing {
            unit_uri: unit_uri.into(),
        }
    }

    /// A new unit defined as a scaled version of `base`.
    pub fn scaled(label: impl Into<String>, base: Unit, factor: f64) -> Self {
        match Unit::new(label) {
            Unit::New(mut unit) => {
                unit.base_unit = Some(Box::new(base));
                unit.base_unit_scaling_factor = Some(factor);
                Unit::New(unit)
            }
            existing => existing,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Unit::Existing { .. } => None,
            Unit::New(unit) => Some(&unit.label),
        }
    }
}

/// A column whose values name the measure of each row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureDimension {
    pub measures: Vec<Measure>,
}

impl MeasureDimension {
    pub fn new(measures: Vec<Measure>) -> Self {
        Self { measures }
    }

    /// True when no measure here is defined by this cube.
    pub fn is_existing_only(&self) -> bool {
        !self.measures.is_empty()
            && self
                .measures
                .iter()
                .all(|m| matches!(m, Measure::Existing { .. }))
    }
}

/// A column whose values name the unit of each row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitsColumn {
    pub units: Vec<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value_column: Option<String>,
}

impl UnitsColumn {
    pub fn new(units: Vec<Unit>) -> Self {
        Self {
            units,
            observed_value_column: None,
        }
    }

    pub fn qualifying(mut self, observation_column: impl Into<String>) -> Self {
        self.observed_value_column = Some(observation_column.into());
        self
    }

    /// True when no unit here is defined by this cube.
    pub fn is_existing_only(&self) -> bool {
        !self.units.is_empty() && self.units.iter().all(|u| matches!(u, Unit::Existing { .. }))
    }
}

/// The column holding observed values.
///
/// With a `measure` the column is in pivoted form and carries its own
/// measure; without one the measure comes from a measure-dimension column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationValue {
    #[serde(default = "default_data_type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

fn default_data_type() -> String {
    "decimal".to_string()
}

impl ObservationValue {
    /// An observation column deferring to measure and units columns.
    pub fn standard() -> Self {
        Self {
            data_type: default_data_type(),
            measure: None,
            unit: None,
        }
    }

    /// An observation column owning its measure and unit.
    pub fn pivoted(measure: Measure, unit: Option<Unit>) -> Self {
        Self {
            data_type: default_data_type(),
            measure: Some(measure),
            unit,
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    pub fn is_pivoted(&self) -> bool {
        self.measure.is_some()
    }
}
