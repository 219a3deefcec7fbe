//! The fixed set of structural questions asked of a cube document.
//!
//! Every select-style question returns a flat list of records, each naming
//! the CSV table it belongs to so answers for a dataset and its code lists
//! never get mixed up.

use serde::Serialize;

use crate::csvw::ComponentRole;
use crate::error::Result;

/// Catalog metadata of a dataset or code list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogRecord {
    pub uri: String,
    pub title: Option<String>,
    pub label: Option<String>,
    pub identifier: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub creator: Option<String>,
    pub publisher: Option<String>,
    pub license: Option<String>,
    pub landing_page: Option<String>,
    pub contact_point: Option<String>,
    pub issued: Option<String>,
    pub modified: Option<String>,
    pub keywords: Vec<String>,
    pub themes: Vec<String>,
}

/// A dataset and its data structure definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureRecord {
    pub csv_url: String,
    pub dataset_uri: String,
    pub structure_uri: String,
}

/// One component of a data structure definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentRecord {
    pub csv_url: String,
    pub component_uri: String,
    pub role: ComponentRole,
    pub property: String,
    /// Label from the property's definition, when the document has one.
    pub property_label: Option<String>,
    /// Whether the document defines the property.
    pub property_defined: bool,
    pub order: i64,
    pub required: bool,
    /// Titles of the columns whose values use the property.
    pub column_titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuppressedColumnRecord {
    pub csv_url: String,
    pub title: String,
}

/// A code list and the columns using it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeListRecord {
    pub csv_url: String,
    pub code_list_uri: String,
    pub column_titles: Vec<String>,
}

/// A column of a described table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRecord {
    pub csv_url: String,
    pub title: Option<String>,
    pub name: String,
    pub property_url: Option<String>,
    pub value_url: Option<String>,
    pub datatype: Option<String>,
    pub required: bool,
    pub suppressed: bool,
    pub is_virtual: bool,
}

/// Whether a measure is carried directly by an observation column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureShapeRecord {
    pub csv_url: String,
    pub measure_uri: String,
    pub is_pivoted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitRecord {
    pub csv_url: String,
    pub unit_uri: String,
    pub label: Option<String>,
    pub base_unit_uri: Option<String>,
    pub scaling_factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptSchemeRecord {
    pub csv_url: String,
    pub scheme_uri: String,
    pub label: Option<String>,
}

/// Answers the structural questions the reader asks.
///
/// Implementations are expected to be deterministic for a given document;
/// the reader asks each question at most once per document handle.
pub trait CubeQueries {
    /// Does the document describe a code list?
    fn is_code_list(&self) -> Result<bool>;

    /// Does the document describe a data cube?
    fn is_data_cube(&self) -> Result<bool>;

    fn catalog_metadata(&self) -> Result<Vec<CatalogRecord>>;

    fn dataset_structure(&self) -> Result<Vec<StructureRecord>>;

    fn components(&self) -> Result<Vec<ComponentRecord>>;

    fn suppressed_columns(&self) -> Result<Vec<SuppressedColumnRecord>>;

    fn code_lists(&self) -> Result<Vec<CodeListRecord>>;

    fn columns(&self) -> Result<Vec<ColumnRecord>>;

    fn measure_shapes(&self) -> Result<Vec<MeasureShapeRecord>>;

    fn units(&self) -> Result<Vec<UnitRecord>>;

    /// URLs of the tables the document publishes (not merely references).
    fn dataset_csv_url(&self) -> Result<Vec<String>>;

    fn concept_scheme(&self) -> Result<Vec<ConceptSchemeRecord>>;
}
