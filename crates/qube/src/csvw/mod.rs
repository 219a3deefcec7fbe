//! CSV-W serialization of cubes.
//!
//! A cube is written as its CSV plus a `-metadata.json` document describing
//! every column as RDF and carrying the data structure definition in
//! `rdfs:seeAlso`. Each dataset-local code list gets its own CSV, table
//! schema and metadata document next to the cube.

mod codelist;
mod document;
mod dsd;
mod standardise;
mod uris;
mod writer;

use serde::{Deserialize, Serialize};

pub use codelist::{CodeListOutput, KEY_COLUMN};
pub use document::{
    CsvwColumn, CsvwMetadata, ForeignKey, ForeignKeyReference, RdfNode, Table, TableSchema,
    TableSchemaRef,
};
pub use dsd::{ComponentList, ComponentRole, ComponentSpec};
pub use standardise::convert_data_values_to_uri_safe_values;
pub use uris::{check_template, template_variables, CodeListUris, CubeUris, CODE_LIST_FRAGMENT};
pub use writer::{CubeWriter, WriteOutput, WriterConfig};

/// How missing value mappings are handled.
///
/// Strict mode fails the operation; lenient mode keeps going, leaving the
/// value unresolved, which suits inspection-only workflows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    #[default]
    Strict,
    Lenient,
}
