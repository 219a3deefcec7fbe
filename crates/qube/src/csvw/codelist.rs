//! Files published for a dataset-local code list.

use std::path::{Path, PathBuf};

use super::document::{write_json, CsvwColumn, CsvwMetadata, RdfNode, Table, TableSchema, TableSchemaRef};
use super::uris::CodeListUris;
use crate::error::{QubeError, Result};
use crate::identifier::Token;
use crate::model::NewCodeList;
use crate::vocab::*;

/// Name of the code-list column other tables reference.
pub const KEY_COLUMN: &str = "uri_identifier";
const PARENT_COLUMN: &str = "parent_uri_identifier";

const HEADERS: [&str; 5] = ["Label", "Uri Identifier", "Parent Uri Identifier", "Sort Priority", "Description"];

/// A code list's CSV, table schema and metadata document.
#[derive(Debug, Clone)]
pub struct CodeListOutput {
    pub uris: CodeListUris,
    pub label: String,
    pub csv: String,
    pub table_schema: TableSchema,
    pub metadata: CsvwMetadata,
}

impl CodeListOutput {
    /// Build the output for a code list whose scheme is labelled `label`.
    pub fn build(stem: &Token, label: &str, code_list: &NewCodeList) -> Result<Self> {
        let uris = CodeListUris::new(stem);
        let table_schema = table_schema(&uris);

        let mut metadata = CsvwMetadata::new(
            uris.scheme(),
            vec![Table {
                url: uris.csv_file(),
                table_schema: TableSchemaRef::Reference(uris.table_schema_file()),
                suppress_output: false,
            }],
        );
        metadata.see_also.push(
            RdfNode::new(uris.scheme())
                .with_type(SKOS_CONCEPT_SCHEME)
                .with_type(DCAT_DATASET)
                .with_literal(RDFS_LABEL, label)
                .with_literal(SKOS_PREF_LABEL, label)
                .with_literal(DCTERMS_TITLE, label)
                .with_literal(DCTERMS_IDENTIFIER, stem.as_str()),
        );

        Ok(Self {
            csv: concepts_csv(code_list)?,
            uris,
            label: label.to_string(),
            table_schema,
            metadata,
        })
    }

    /// Write the CSV, table schema and metadata into `dir`.
    pub fn save(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let csv_path = dir.join(self.uris.csv_file());
        std::fs::write(&csv_path, &self.csv).map_err(|e| QubeError::io(&csv_path, e))?;

        let schema_path = dir.join(self.uris.table_schema_file());
        write_json(&schema_path, &self.table_schema)?;

        let metadata_path = dir.join(self.uris.metadata_file());
        self.metadata.save(&metadata_path)?;

        Ok(vec![csv_path, schema_path, metadata_path])
    }
}

fn table_schema(uris: &CodeListUris) -> TableSchema {
    let column = |title: &str, name: &str, property: &str| CsvwColumn {
        property_url: Some(property.to_string()),
        ..CsvwColumn::source(title, name)
    };

    TableSchema {
        columns: vec![
            CsvwColumn {
                required: true,
                ..column(HEADERS[0], "label", RDFS_LABEL)
            },
            CsvwColumn {
                required: true,
                ..column(HEADERS[1], KEY_COLUMN, SKOS_NOTATION)
            },
            CsvwColumn {
                value_url: Some(uris.concept_template(PARENT_COLUMN)),
                ..column(HEADERS[2], PARENT_COLUMN, SKOS_BROADER)
            },
            CsvwColumn {
                datatype: Some("integer".to_string()),
                ..column(HEADERS[3], "sort_priority", UI_SORT_PRIORITY)
            },
            column(HEADERS[4], "description", RDFS_COMMENT),
            CsvwColumn::virtual_triple("virt_type", None, RDF_TYPE, SKOS_CONCEPT),
            CsvwColumn::virtual_triple("virt_scheme", None, SKOS_IN_SCHEME, uris.scheme()),
        ],
        foreign_keys: Vec::new(),
        primary_key: vec![KEY_COLUMN.to_string()],
        about_url: Some(uris.concept_template(KEY_COLUMN)),
    }
}

/// One row per concept; concepts without a sort priority keep list order.
fn concepts_csv(code_list: &NewCodeList) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for (index, concept) in code_list.concepts.iter().enumerate() {
        let priority = concept.sort_priority.unwrap_or(index as i64);
        writer.write_record([
            concept.label.as_str(),
            concept.notation().as_str(),
            concept.parent_notation.as_deref().unwrap_or(""),
            priority.to_string().as_str(),
            concept.description.as_deref().unwrap_or(""),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| QubeError::io("<memory>", e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| QubeError::Parse {
        row: 0,
        column: 0,
        message: e.to_string(),
    })
}
