//! Validation rules for checking a cube's structure against its data.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::identifier::{uri_safe, ScopeResolver, RESERVED_TOKENS};
use crate::input::{DataTable, TabularData};
use crate::model::{
    AttributeDefinition, CodeList, Component, ComponentKind, Cube, Dimension, Measure, Unit,
};
use crate::shape::{CubeShape, HybridReason, ShapeError};

use super::finding::StructuralError;
use super::ValidationConfig;

/// Everything a rule may look at.
pub struct ValidationContext<'a> {
    pub cube: &'a Cube,
    pub shape: &'a Result<CubeShape, ShapeError>,
    pub config: &'a ValidationConfig,
}

/// Trait for validation rules.
pub trait Rule {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Run the rule and return its findings.
    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<StructuralError>;
}

/// Column titles must be unique and resolve to distinct names.
pub struct ColumnRule;

impl Rule for ColumnRule {
    fn name(&self) -> &'static str {
        "columns"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<StructuralError> {
        let mut findings = Vec::new();
        let mut seen = HashSet::new();

        for column in &ctx.cube.columns {
            if !seen.insert(column.title.as_str()) {
                findings.push(StructuralError::DuplicateColumnTitle {
                    title: column.title.clone(),
                });
            }
        }

        let distinct: Vec<&str> = {
            let mut once = HashSet::new();
            ctx.cube
                .columns
                .iter()
                .map(|c| c.title.as_str())
                .filter(|t| once.insert(*t))
                .collect()
        };
        if let Err(errors) = ScopeResolver::resolve_all("columns", distinct, &[]) {
            findings.extend(errors.into_iter().map(StructuralError::Identifier));
        }

        findings
    }
}

/// Labels within each scope must resolve to distinct, unreserved tokens.
pub struct IdentifierRule;

impl Rule for IdentifierRule {
    fn name(&self) -> &'static str {
        "identifiers"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<StructuralError> {
        let cube = ctx.cube;
        let mut findings = Vec::new();

        let mut dimension_labels = Vec::new();
        let mut code_list_names = Vec::new();
        for (column, dimension) in cube.dimension_columns() {
            if let Dimension::New(dim) = dimension {
                dimension_labels.push(dim.label.as_str());
                // A blank dimension label is already reported in its own scope.
                match dim.code_list_name() {
                    Some(name) if name != dim.label || !uri_safe(name).is_empty() => {
                        code_list_names.push((column.title.as_str(), name));
                    }
                    _ => {}
                }
                if let Some(CodeList::New(list)) = &dim.code_list {
                    let notations: Vec<String> =
                        list.concepts.iter().map(|c| c.notation()).collect();
                    let entries = list
                        .concepts
                        .iter()
                        .zip(&notations)
                        .map(|(c, n)| (c.label.as_str(), n.as_str()));
                    if let Err(errors) = ScopeResolver::resolve_keyed(
                        format!("code list of '{}'", column.title),
                        entries,
                        RESERVED_TOKENS,
                    ) {
                        findings.extend(errors.into_iter().map(StructuralError::Identifier));
                    }
                }
            }
        }
        scope_findings("dimensions", dimension_labels, &mut findings);
        if let Err(errors) = ScopeResolver::resolve_keyed("code lists", code_list_names, &[]) {
            findings.extend(errors.into_iter().map(StructuralError::Identifier));
        }

        let mut attribute_labels = Vec::new();
        for (column, attribute) in cube.attribute_columns() {
            if let AttributeDefinition::New { label, .. } = &attribute.definition {
                attribute_labels.push(label.as_str());
            }
            let values = attribute.new_values();
            if !values.is_empty() {
                scope_findings(
                    &format!("attribute values of '{}'", column.title),
                    values.iter().map(|v| v.label.as_str()),
                    &mut findings,
                );
            }
        }
        scope_findings("attributes", attribute_labels, &mut findings);

        let mut measure_labels = Vec::new();
        let mut unit_labels = Vec::new();
        for (_, component) in cube.qb_columns() {
            match component {
                Component::MeasureDimension(m) => {
                    measure_labels.extend(m.measures.iter().filter_map(new_measure_label));
                }
                Component::Units(u) => {
                    unit_labels.extend(u.units.iter().filter_map(Unit::label));
                }
                Component::ObservationValue(obs) => {
                    measure_labels.extend(obs.measure.iter().filter_map(new_measure_label));
                    unit_labels.extend(obs.unit.iter().filter_map(Unit::label));
                }
                _ => {}
            }
        }
        scope_findings("measures", measure_labels, &mut findings);
        scope_findings("units", unit_labels, &mut findings);

        findings
    }
}

fn scope_findings<'a>(
    scope: &str,
    labels: impl IntoIterator<Item = &'a str>,
    findings: &mut Vec<StructuralError>,
) {
    let mut seen = HashSet::new();
    let labels: Vec<&str> = labels.into_iter().filter(|l| seen.insert(*l)).collect();
    if let Err(errors) = ScopeResolver::resolve_all(scope, labels, &[]) {
        findings.extend(errors.into_iter().map(StructuralError::Identifier));
    }
}

fn new_measure_label(measure: &Measure) -> Option<&str> {
    match measure {
        Measure::New { label, .. } => Some(label),
        Measure::Existing { .. } => None,
    }
}

/// Code list hierarchies must reference known parents and be acyclic.
pub struct CodeListRule;

impl Rule for CodeListRule {
    fn name(&self) -> &'static str {
        "code_lists"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<StructuralError> {
        let mut findings = Vec::new();

        for (column, dimension) in ctx.cube.dimension_columns() {
            let Dimension::New(dim) = dimension else {
                continue;
            };
            let Some(CodeList::New(list)) = &dim.code_list else {
                continue;
            };

            for (notation, parent) in list.unknown_parents() {
                findings.push(StructuralError::UndefinedParentConcept {
                    column: column.title.clone(),
                    notation,
                    parent,
                });
            }
            if let Some(notations) = list.find_cycle() {
                findings.push(StructuralError::ConceptHierarchyCycle {
                    column: column.title.clone(),
                    notations,
                });
            }
        }

        findings
    }
}

/// Shape-dependent cardinality and linking rules.
///
/// Nothing here runs when the shape could not be classified: the shape
/// failure itself is reported as a single finding instead.
pub struct ShapeRule;

impl Rule for ShapeRule {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<StructuralError> {
        let observation_columns = ctx.cube.observation_value_columns();

        if !ctx.config.allow_multiple_observation_columns && observation_columns.len() > 1 {
            return vec![StructuralError::MoreThanOneObservationsColumn {
                columns: observation_columns
                    .iter()
                    .map(|(c, _)| c.title.clone())
                    .collect(),
            }];
        }

        match ctx.shape {
            Err(ShapeError::NoObservationColumn) => vec![StructuralError::NoObservedValuesColumn],
            Err(ShapeError::Hybrid { reason, columns }) => vec![hybrid_finding(ctx, *reason, columns)],
            Ok(CubeShape::Standard) => check_standard(ctx),
            Ok(CubeShape::Pivoted) => check_pivoted(ctx),
        }
    }
}

fn hybrid_finding(
    ctx: &ValidationContext<'_>,
    reason: HybridReason,
    columns: &[String],
) -> StructuralError {
    let observation_titles = || -> Vec<String> {
        ctx.cube
            .observation_value_columns()
            .iter()
            .map(|(c, _)| c.title.clone())
            .collect()
    };

    match reason {
        HybridReason::MultipleStandardWithoutMeasureDimension => {
            StructuralError::NoMeasuresDefined {
                columns: observation_titles(),
            }
        }
        HybridReason::MultipleStandardWithMeasureDimension => {
            StructuralError::MoreThanOneObservationsColumn {
                columns: observation_titles(),
            }
        }
        HybridReason::MixedPivotedAndStandard | HybridReason::MeasureDimensionWithPivoted => {
            StructuralError::HybridShape {
                reason: reason.to_string(),
                columns: columns.to_vec(),
            }
        }
    }
}

fn check_standard(ctx: &ValidationContext<'_>) -> Vec<StructuralError> {
    let cube = ctx.cube;
    let mut findings = Vec::new();
    let observation_columns = cube.observation_value_columns();
    let Some((obs_column, obs)) = observation_columns.first() else {
        return findings;
    };

    let measure_columns = cube.measure_dimension_columns();
    match measure_columns.as_slice() {
        [] => findings.push(StructuralError::NoMeasuresDefined {
            columns: vec![obs_column.title.clone()],
        }),
        [(column, measures)] => {
            if measures.measures.is_empty() {
                findings.push(StructuralError::EmptyMeasureDimension {
                    column: column.title.clone(),
                });
            }
        }
        many => findings.push(StructuralError::MoreThanOneMeasureColumn {
            columns: many.iter().map(|(c, _)| c.title.clone()).collect(),
        }),
    }

    let units_columns = cube.units_columns();
    match (obs.unit.is_some(), units_columns.as_slice()) {
        (false, []) => findings.push(StructuralError::NoUnitsDefined {
            column: obs_column.title.clone(),
        }),
        (true, [(units_column, _), ..]) => findings.push(StructuralError::BothUnitTypesDefined {
            column: obs_column.title.clone(),
            units_column: units_column.title.clone(),
        }),
        _ => {}
    }
    if units_columns.len() > 1 {
        findings.push(StructuralError::MoreThanOneUnitsColumn {
            columns: units_columns.iter().map(|(c, _)| c.title.clone()).collect(),
        });
    }

    findings
}

fn check_pivoted(ctx: &ValidationContext<'_>) -> Vec<StructuralError> {
    let cube = ctx.cube;
    let mut findings = Vec::new();
    let observation_columns = cube.observation_value_columns();
    let observation_titles: HashSet<&str> = observation_columns
        .iter()
        .map(|(c, _)| c.title.as_str())
        .collect();

    let mut by_measure: IndexMap<String, Vec<String>> = IndexMap::new();
    for (column, obs) in &observation_columns {
        if let Some(measure) = &obs.measure {
            by_measure
                .entry(measure.identity())
                .or_default()
                .push(column.title.clone());
        }
    }
    for (measure, columns) in by_measure {
        if columns.len() > 1 {
            findings.push(StructuralError::DuplicateMeasureAcrossPivotedColumns { measure, columns });
        }
    }

    let implicit_link = match observation_columns.as_slice() {
        [(only, _)] => Some(only.title.as_str()),
        _ => None,
    };

    // Units columns grouped by the observation column they qualify.
    let mut units_for: HashMap<&str, Vec<&str>> = HashMap::new();

    for (column, component) in cube.qb_columns() {
        let kind = match component {
            Component::Attribute(_) => ComponentKind::Attribute,
            Component::Units(_) => ComponentKind::Units,
            _ => continue,
        };

        let linked = match component.observed_value_column().or(implicit_link) {
            Some(linked) => linked,
            None => {
                findings.push(StructuralError::AttributeNotLinked {
                    component: kind,
                    column: column.title.clone(),
                });
                continue;
            }
        };

        if cube.column(linked).is_none() {
            findings.push(StructuralError::LinkedObservationColumnDoesNotExist {
                column: column.title.clone(),
                linked: linked.to_string(),
            });
        } else if !observation_titles.contains(linked) {
            findings.push(StructuralError::LinkedToNonObservationColumn {
                column: column.title.clone(),
                linked: linked.to_string(),
            });
        } else if kind == ComponentKind::Units {
            units_for.entry(linked).or_default().push(&column.title);
        }
    }

    for (column, obs) in &observation_columns {
        let units = units_for.get(column.title.as_str()).cloned().unwrap_or_default();
        match (obs.unit.is_some(), units.as_slice()) {
            (false, []) => findings.push(StructuralError::NoUnitsDefined {
                column: column.title.clone(),
            }),
            (true, [units_column, ..]) => findings.push(StructuralError::BothUnitTypesDefined {
                column: column.title.clone(),
                units_column: units_column.to_string(),
            }),
            _ => {}
        }
        if units.len() > 1 {
            findings.push(StructuralError::MoreThanOneUnitsColumn {
                columns: units.iter().map(|u| u.to_string()).collect(),
            });
        }
    }

    findings
}

/// Rules about URI templates declared (or not) on columns.
pub struct UriTemplateRule;

impl Rule for UriTemplateRule {
    fn name(&self) -> &'static str {
        "uri_templates"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<StructuralError> {
        let mut findings = Vec::new();

        for (column, component) in ctx.cube.qb_columns() {
            let has_template = column.uri_template.is_some();

            let literal = match component {
                Component::Attribute(attr) => attr.is_literal(),
                Component::ObservationValue(_) => true,
                _ => false,
            };
            if literal && has_template {
                findings.push(StructuralError::LiteralWithUriTemplateConflict {
                    column: column.title.clone(),
                });
                continue;
            }

            let existing_only = match component {
                Component::Dimension(Dimension::Existing { .. }) => true,
                Component::Dimension(Dimension::New(dim)) => {
                    matches!(dim.code_list, Some(CodeList::Existing { .. }))
                }
                Component::Attribute(attr) => !attr.is_literal() && attr.new_values().is_empty(),
                Component::MeasureDimension(m) => m.is_existing_only(),
                Component::Units(u) => u.is_existing_only(),
                Component::ObservationValue(_) => false,
            };
            if existing_only && !has_template {
                findings.push(StructuralError::UriTemplateMissingForExistingOnlyReference {
                    component: component.kind(),
                    column: column.title.clone(),
                });
            }
        }

        findings
    }
}

/// Every value in a coded column must be declared.
pub struct UndefinedValuesRule;

impl Rule for UndefinedValuesRule {
    fn name(&self) -> &'static str {
        "undefined_values"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<StructuralError> {
        let Some(data) = ctx.cube.data.as_ref() else {
            return Vec::new();
        };
        let mut findings = Vec::new();

        for (column, component) in ctx.cube.qb_columns() {
            let Some(categorical) = data.to_categorical(&column.title) else {
                findings.push(StructuralError::ColumnNotFoundInData {
                    column: column.title.clone(),
                });
                continue;
            };

            let Some((component_name, codes)) = declared_codes(component) else {
                continue;
            };

            let mut undefined: Vec<String> = categorical
                .categories
                .iter()
                .map(|v| v.trim())
                .filter(|v| !codes.contains(*v))
                .map(str::to_string)
                .collect();
            undefined.sort();
            undefined.dedup();

            if !undefined.is_empty() {
                debug!(column = %column.title, count = undefined.len(), "undefined values");
                findings.push(StructuralError::UndefinedValues {
                    component: component_name.to_string(),
                    location: column.title.clone(),
                    values: undefined,
                });
            }
        }

        findings
    }
}

/// Labels and tokens a coded column's values may take, when they are all
/// declared by the cube.
fn declared_codes(component: &Component) -> Option<(&'static str, HashSet<String>)> {
    let mut codes = HashSet::new();
    let name = match component {
        Component::Dimension(Dimension::New(dim)) => match &dim.code_list {
            Some(CodeList::New(list)) => {
                for concept in &list.concepts {
                    codes.insert(concept.label.clone());
                    codes.insert(concept.notation());
                }
                "code list"
            }
            _ => return None,
        },
        Component::Attribute(attr) if !attr.new_values().is_empty() => {
            for value in attr.new_values() {
                codes.insert(value.label.clone());
                codes.insert(uri_safe(&value.label));
            }
            "attribute values"
        }
        Component::MeasureDimension(m) if !m.measures.is_empty() => {
            for measure in &m.measures {
                match measure {
                    Measure::New { label, .. } => {
                        codes.insert(label.clone());
                        codes.insert(uri_safe(label));
                    }
                    Measure::Existing { .. } => return None,
                }
            }
            "measures"
        }
        Component::Units(u) if !u.units.is_empty() => {
            for unit in &u.units {
                match unit.label() {
                    Some(label) => {
                        codes.insert(label.to_string());
                        codes.insert(uri_safe(label));
                    }
                    None => return None,
                }
            }
            "units"
        }
        _ => return None,
    };
    Some((name, codes))
}

/// Blank observations need an observation-status explanation.
pub struct MissingObservationRule;

impl Rule for MissingObservationRule {
    fn name(&self) -> &'static str {
        "missing_observations"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<StructuralError> {
        let Some(data) = ctx.cube.data.as_ref() else {
            return Vec::new();
        };

        let status_columns: Vec<Vec<&str>> = ctx
            .cube
            .observation_status_columns()
            .iter()
            .filter_map(|c| data.column(&c.title))
            .collect();

        let mut findings = Vec::new();
        for (column, _) in ctx.cube.observation_value_columns() {
            let Some(values) = data.column(&column.title) else {
                continue;
            };

            let row_numbers: Vec<usize> = values
                .iter()
                .enumerate()
                .filter(|(_, v)| DataTable::is_missing_observation(v))
                .filter(|(row, _)| {
                    !status_columns
                        .iter()
                        .any(|status| status.get(*row).is_some_and(|s| !DataTable::is_blank(s)))
                })
                .map(|(row, _)| row)
                .collect();

            if !row_numbers.is_empty() {
                findings.push(StructuralError::ObservationValuesMissing {
                    column: column.title.clone(),
                    row_numbers,
                });
            }
        }

        findings
    }
}
