//! The cube: metadata, columns and the data they describe.

use serde::{Deserialize, Serialize};

use super::catalog::CatalogMetadata;
use super::column::Column;
use super::components::{
    Attribute, Component, Dimension, MeasureDimension, ObservationValue, UnitsColumn,
};
use crate::input::DataTable;
use crate::shape::{detect_shape, CubeShape, ObservationColumnShape, ShapeError, ShapeInput};

/// In-memory structural model of a statistical dataset.
///
/// Serializing a cube writes its definition only (metadata and columns);
/// the data travels separately as CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub metadata: CatalogMetadata,
    pub columns: Vec<Column>,
    #[serde(skip)]
    pub data: Option<DataTable>,
}

impl Cube {
    pub fn new(metadata: CatalogMetadata, columns: Vec<Column>) -> Self {
        Self {
            metadata,
            columns,
            data: None,
        }
    }

    pub fn with_data(mut self, data: DataTable) -> Self {
        self.data = Some(data);
        self
    }

    /// Look a column up by title.
    pub fn column(&self, title: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.title == title)
    }

    /// Columns carrying a structural definition, in order.
    pub fn qb_columns(&self) -> impl Iterator<Item = (&Column, &Component)> {
        self.columns
            .iter()
            .filter_map(|c| c.definition.as_ref().map(|d| (c, d)))
    }

    pub fn suppressed_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_suppressed())
    }

    pub fn dimension_columns(&self) -> Vec<(&Column, &Dimension)> {
        self.qb_columns()
            .filter_map(|(c, d)| match d {
                Component::Dimension(dim) => Some((c, dim)),
                _ => None,
            })
            .collect()
    }

    pub fn attribute_columns(&self) -> Vec<(&Column, &Attribute)> {
        self.qb_columns()
            .filter_map(|(c, d)| match d {
                Component::Attribute(attr) => Some((c, attr)),
                _ => None,
            })
            .collect()
    }

    pub fn measure_dimension_columns(&self) -> Vec<(&Column, &MeasureDimension)> {
        self.qb_columns()
            .filter_map(|(c, d)| match d {
                Component::MeasureDimension(m) => Some((c, m)),
                _ => None,
            })
            .collect()
    }

    pub fn units_columns(&self) -> Vec<(&Column, &UnitsColumn)> {
        self.qb_columns()
            .filter_map(|(c, d)| match d {
                Component::Units(u) => Some((c, u)),
                _ => None,
            })
            .collect()
    }

    pub fn observation_value_columns(&self) -> Vec<(&Column, &ObservationValue)> {
        self.qb_columns()
            .filter_map(|(c, d)| match d {
                Component::ObservationValue(o) => Some((c, o)),
                _ => None,
            })
            .collect()
    }

    /// Attribute columns recording observation status.
    pub fn observation_status_columns(&self) -> Vec<&Column> {
        self.attribute_columns()
            .into_iter()
            .filter(|(_, attr)| attr.is_observation_status())
            .map(|(c, _)| c)
            .collect()
    }

    /// What the shape detector needs to know about this cube.
    pub fn shape_input(&self) -> ShapeInput {
        ShapeInput {
            observation_columns: self
                .observation_value_columns()
                .into_iter()
                .map(|(c, obs)| ObservationColumnShape {
                    title: c.title.clone(),
                    pivoted: obs.is_pivoted(),
                })
                .collect(),
            measure_dimension_columns: self
                .measure_dimension_columns()
                .into_iter()
                .map(|(c, _)| c.title.clone())
                .collect(),
            units_columns: self
                .units_columns()
                .into_iter()
                .map(|(c, _)| c.title.clone())
                .collect(),
        }
    }

    /// Classify this cube's shape.
    pub fn shape(&self) -> Result<CubeShape, ShapeError> {
        detect_shape(&self.shape_input())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Measure, Unit};
    use crate::vocab::SDMX_OBS_STATUS;

    fn standard_cube() -> Cube {
        Cube::new(
            CatalogMetadata::new("Cube"),
            vec![
                Column::new("A", Component::Dimension(Dimension::new("A"))),
                Column::new(
                    "Measure",
                    Component::MeasureDimension(MeasureDimension::new(vec![Measure::new("M")])),
                ),
                Column::new("Unit", Component::Units(UnitsColumn::new(vec![Unit::new("U")]))),
                Column::new("Status", Component::Attribute(Attribute::existing(SDMX_OBS_STATUS))),
                Column::suppressed("Notes"),
                Column::new("Value", Component::ObservationValue(ObservationValue::standard())),
            ],
        )
    }

    #[test]
    fn test_column_accessors() {
        let cube = standard_cube();
        assert_eq!(cube.dimension_columns().len(), 1);
        assert_eq!(cube.measure_dimension_columns().len(), 1);
        assert_eq!(cube.units_columns().len(), 1);
        assert_eq!(cube.attribute_columns().len(), 1);
        assert_eq!(cube.observation_value_columns().len(), 1);
        assert_eq!(cube.suppressed_columns().count(), 1);
        assert_eq!(cube.observation_status_columns()[0].title, "Status");
        assert!(cube.column("Notes").is_some());
    }

    #[test]
    fn test_shape_input() {
        let input = standard_cube().shape_input();
        assert_eq!(input.observation_columns.len(), 1);
        assert!(!input.observation_columns[0].pivoted);
        assert_eq!(input.measure_dimension_columns, vec!["Measure"]);
        assert_eq!(input.units_columns, vec!["Unit"]);
        assert_eq!(standard_cube().shape(), Ok(CubeShape::Standard));
    }

    #[test]
    fn test_definition_round_trip_skips_data() {
        let cube = standard_cube().with_data(DataTable::new(vec![], vec![], b','));
        let json = serde_json::to_string(&cube).unwrap();
        let back: Cube = serde_json::from_str(&json).unwrap();
        assert!(back.data.is_none());
        assert_eq!(back.columns, cube.columns);
    }
}
