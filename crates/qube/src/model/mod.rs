//! Structural model of a data cube.

mod catalog;
mod codelist;
mod column;
mod components;
mod cube;

pub use catalog::CatalogMetadata;
pub use codelist::{CodeList, Concept, NewCodeList};
pub use column::Column;
pub use components::{
    Attribute, AttributeDefinition, AttributeValue, AttributeValues, Component, ComponentKind,
    Dimension, Measure, MeasureDimension, NewDimension, NewUnit, ObservationValue, Unit,
    UnitsColumn,
};
pub use cube::Cube;
