//! Rewriting coded data values into the tokens used in URIs.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::Strictness;
use crate::error::{QubeError, Result};
use crate::identifier::uri_safe;
use crate::input::{DataTable, TabularData};
use crate::model::{CodeList, Component, Cube, Dimension, Measure, Unit};

/// How the values of one column map onto tokens.
enum ValueMapping {
    /// Declared labels (and tokens) to tokens.
    Declared(HashMap<String, String>),
    /// Any value becomes its URI-safe form.
    Tokenise,
}

impl ValueMapping {
    fn declared<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> Self {
        let mut map = HashMap::new();
        for (label, token) in pairs {
            map.insert(label.trim().to_string(), token.clone());
            map.insert(token.clone(), token);
        }
        ValueMapping::Declared(map)
    }

    fn map(&self, value: &str) -> Option<String> {
        let value = value.trim();
        match self {
            ValueMapping::Declared(map) => map.get(value).cloned(),
            ValueMapping::Tokenise => Some(uri_safe(value)).filter(|t| !t.is_empty()),
        }
    }
}

/// The mapping for a column, or `None` when its values are used verbatim.
fn value_mapping(component: &Component) -> Option<ValueMapping> {
    match component {
        Component::Dimension(Dimension::New(dim)) => match &dim.code_list {
            Some(CodeList::New(list)) => Some(ValueMapping::declared(
                list.concepts.iter().map(|c| (c.label.as_str(), c.notation())),
            )),
            Some(CodeList::Existing { .. }) => None,
            None => Some(ValueMapping::Tokenise),
        },
        Component::Dimension(Dimension::Existing { .. }) => None,
        Component::Attribute(attr) => {
            let values = attr.new_values();
            (!values.is_empty()).then(|| {
                ValueMapping::declared(values.iter().map(|v| (v.label.as_str(), uri_safe(&v.label))))
            })
        }
        Component::MeasureDimension(md) => {
            let labels: Option<Vec<&str>> = md
                .measures
                .iter()
                .map(|m| match m {
                    Measure::New { label, .. } => Some(label.as_str()),
                    Measure::Existing { .. } => None,
                })
                .collect();
            labels.map(|labels| ValueMapping::declared(labels.into_iter().map(|l| (l, uri_safe(l)))))
        }
        Component::Units(units) => {
            let labels: Option<Vec<&str>> = units.units.iter().map(Unit::label).collect();
            labels.map(|labels| ValueMapping::declared(labels.into_iter().map(|l| (l, uri_safe(l)))))
        }
        Component::ObservationValue(_) => None,
    }
}

/// Replace coded values in the cube's data with their URI-safe tokens.
///
/// Values that are already tokens are left alone. In strict mode a value
/// with no mapping fails the conversion; in lenient mode it is kept as is.
/// A cube without data is left untouched.
pub fn convert_data_values_to_uri_safe_values(cube: &mut Cube, strictness: Strictness) -> Result<()> {
    let Some(mut data) = cube.data.take() else {
        return Ok(());
    };
    let result = rewrite_columns(cube, &mut data, strictness);
    cube.data = Some(data);
    result
}

fn rewrite_columns(cube: &Cube, data: &mut DataTable, strictness: Strictness) -> Result<()> {
    for (column, component) in cube.qb_columns() {
        let Some(mapping) = value_mapping(component) else {
            continue;
        };
        let Some(categorical) = data.to_categorical(&column.title) else {
            continue;
        };

        let renamed = categorical.rename_categories(|value| match mapping.map(value) {
            Some(token) => Ok(token),
            None if strictness == Strictness::Lenient => {
                warn!(column = %column.title, value, "no URI-safe mapping for value, keeping it");
                Ok(value.to_string())
            }
            None => Err(QubeError::MissingValueMapping {
                column: column.title.clone(),
                value: value.to_string(),
            }),
        })?;

        debug!(
            column = %column.title,
            categories = renamed.categories.len(),
            "rewrote column values to URI-safe tokens"
        );
        data.set_categorical(&column.title, &renamed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Attribute, AttributeValue, CatalogMetadata, Column, Concept, MeasureDimension,
        NewCodeList, NewDimension, ObservationValue, UnitsColumn,
    };

    fn make_table(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> DataTable {
        DataTable::new(
            headers.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
            b',',
        )
    }

    fn make_cube(rows: Vec<Vec<&str>>) -> Cube {
        let area = NewDimension::new("Area").with_code_list(CodeList::New(NewCodeList::new(vec![
            Concept::new("North East"),
            Concept::new("South").with_notation("S1"),
        ])));
        Cube::new(
            CatalogMetadata::new("Cube"),
            vec![
                Column::new("Area", Component::Dimension(Dimension::New(area))),
                Column::new(
                    "Measure",
                    Component::MeasureDimension(MeasureDimension::new(vec![Measure::new("Some Measure")])),
                ),
                Column::new("Unit", Component::Units(UnitsColumn::new(vec![Unit::new("Some Unit")]))),
                Column::new(
                    "Marker",
                    Component::Attribute(
                        Attribute::new("Marker").with_values(vec![AttributeValue::new("Provisional")]),
                    ),
                ),
                Column::suppressed("Notes"),
                Column::new("Value", Component::ObservationValue(ObservationValue::standard())),
            ],
        )
        .with_data(make_table(
            vec!["Area", "Measure", "Unit", "Marker", "Notes", "Value"],
            rows,
        ))
    }

    fn column<'a>(cube: &'a Cube, name: &str) -> Vec<&'a str> {
        cube.data.as_ref().unwrap().column(name).unwrap()
    }

    #[test]
    fn test_values_become_tokens() {
        let mut cube = make_cube(vec![
            vec!["North East", "Some Measure", "Some Unit", "Provisional", "Free Text", "1"],
            vec!["South", "some-measure", "Some Unit", "", "More Text", "2"],
        ]);
        convert_data_values_to_uri_safe_values(&mut cube, Strictness::Strict).unwrap();

        assert_eq!(column(&cube, "Area"), vec!["north-east", "S1"]);
        assert_eq!(column(&cube, "Measure"), vec!["some-measure", "some-measure"]);
        assert_eq!(column(&cube, "Unit"), vec!["some-unit", "some-unit"]);
        assert_eq!(column(&cube, "Marker"), vec!["provisional", ""]);
        assert_eq!(column(&cube, "Notes"), vec!["Free Text", "More Text"]);
        assert_eq!(column(&cube, "Value"), vec!["1", "2"]);
    }

    #[test]
    fn test_strict_rejects_unmapped_value() {
        let mut cube = make_cube(vec![vec!["Nowhere", "Some Measure", "Some Unit", "", "", "1"]]);
        let err = convert_data_values_to_uri_safe_values(&mut cube, Strictness::Strict).unwrap_err();
        match err {
            QubeError::MissingValueMapping { column, value } => {
                assert_eq!(column, "Area");
                assert_eq!(value, "Nowhere");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(cube.data.is_some());
    }

    #[test]
    fn test_lenient_keeps_unmapped_value() {
        let mut cube = make_cube(vec![vec!["Nowhere", "Some Measure", "Some Unit", "", "", "1"]]);
        convert_data_values_to_uri_safe_values(&mut cube, Strictness::Lenient).unwrap();
        assert_eq!(column(&cube, "Area"), vec!["Nowhere"]);
        assert_eq!(column(&cube, "Measure"), vec!["some-measure"]);
    }

    #[test]
    fn test_cube_without_data_is_untouched() {
        let mut cube = make_cube(vec![]);
        cube.data = None;
        convert_data_values_to_uri_safe_values(&mut cube, Strictness::Strict).unwrap();
        assert!(cube.data.is_none());
    }
}
