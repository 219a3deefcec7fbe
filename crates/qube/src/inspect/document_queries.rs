//! Answering the structural questions from a parsed CSV-W document.

use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use super::queries::*;
use crate::csvw::{ComponentRole, CsvwMetadata, RdfNode, TableSchema, TableSchemaRef};
use crate::error::{QubeError, Result};
use crate::vocab::*;

/// A CSV-W document plus the table schemas it refers to.
#[derive(Debug, Clone)]
pub struct DocumentQueries {
    document: CsvwMetadata,
    /// Table schemas by CSV URL, inline ones and any loaded from disk.
    schemas: IndexMap<String, TableSchema>,
}

impl DocumentQueries {
    /// Use only the schemas the document holds inline.
    pub fn from_document(document: CsvwMetadata) -> Self {
        let schemas = document
            .tables
            .iter()
            .filter_map(|t| t.table_schema.inline().map(|s| (t.url.clone(), s.clone())))
            .collect();
        Self { document, schemas }
    }

    /// Load a document from disk together with any table schemas it refers
    /// to that sit next to it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = CsvwMetadata::load(path)?;
        let dir = path.parent().unwrap_or_else(|| Path::new(""));

        let references: Vec<(String, String)> = document
            .tables
            .iter()
            .filter_map(|t| match &t.table_schema {
                TableSchemaRef::Reference(file) => Some((t.url.clone(), file.clone())),
                TableSchemaRef::Inline(_) => None,
            })
            .collect();

        let mut queries = Self::from_document(document);
        for (url, file) in references {
            let schema_path = dir.join(&file);
            if schema_path.is_file() {
                debug!(table = %url, schema = %schema_path.display(), "loading referenced table schema");
                queries.schemas.insert(url, TableSchema::load(&schema_path)?);
            } else {
                debug!(table = %url, schema = %file, "referenced table schema not found, skipping");
            }
        }
        Ok(queries)
    }

    pub fn with_table_schema(mut self, csv_url: impl Into<String>, schema: TableSchema) -> Self {
        self.schemas.insert(csv_url.into(), schema);
        self
    }

    pub fn document(&self) -> &CsvwMetadata {
        &self.document
    }

    fn source_columns_using(&self, csv_url: &str, property: &str) -> Vec<String> {
        self.schemas
            .get(csv_url)
            .map(|schema| {
                schema
                    .source_columns()
                    .filter(|c| c.property_url.as_deref() == Some(property))
                    .map(|c| c.titles.clone().unwrap_or_else(|| c.name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn structures(&self) -> Vec<(String, &RdfNode, &RdfNode)> {
        self.document
            .nodes_of_type(QB_DATA_SET)
            .filter_map(|dataset| {
                let structure = self.document.node(dataset.reference(QB_STRUCTURE)?)?;
                Some((csv_url_of(&dataset.id).to_string(), dataset, structure))
            })
            .collect()
    }
}

/// The CSV file a relative URI belongs to.
fn csv_url_of(uri: &str) -> &str {
    uri.split_once('#').map_or(uri, |(file, _)| file)
}

fn component_role(node: &RdfNode) -> Option<(ComponentRole, &str)> {
    [ComponentRole::Dimension, ComponentRole::Attribute, ComponentRole::Measure]
        .into_iter()
        .find_map(|role| node.reference(role.predicate()).map(|p| (role, p)))
}

impl CubeQueries for DocumentQueries {
    fn is_code_list(&self) -> Result<bool> {
        Ok(self.document.nodes_of_type(SKOS_CONCEPT_SCHEME).next().is_some())
    }

    fn is_data_cube(&self) -> Result<bool> {
        Ok(self.document.nodes_of_type(QB_DATA_SET).next().is_some())
    }

    fn catalog_metadata(&self) -> Result<Vec<CatalogRecord>> {
        let owned = |node: &RdfNode, property: &str| node.literal(property).map(String::from);
        let reference = |node: &RdfNode, property: &str| node.reference(property).map(String::from);

        Ok(self
            .document
            .nodes_of_type(DCAT_DATASET)
            .map(|node| CatalogRecord {
                uri: node.id.clone(),
                title: owned(node, DCTERMS_TITLE),
                label: owned(node, RDFS_LABEL),
                identifier: owned(node, DCTERMS_IDENTIFIER),
                summary: owned(node, DCTERMS_ABSTRACT),
                description: owned(node, DCTERMS_DESCRIPTION),
                creator: reference(node, DCTERMS_CREATOR),
                publisher: reference(node, DCTERMS_PUBLISHER),
                license: reference(node, DCTERMS_LICENSE),
                landing_page: reference(node, DCAT_LANDING_PAGE),
                contact_point: reference(node, DCAT_CONTACT_POINT),
                issued: owned(node, DCTERMS_ISSUED),
                modified: owned(node, DCTERMS_MODIFIED),
                keywords: node.literals(DCAT_KEYWORD).into_iter().map(String::from).collect(),
                themes: node.references(DCAT_THEME).into_iter().map(String::from).collect(),
            })
            .collect())
    }

    fn dataset_structure(&self) -> Result<Vec<StructureRecord>> {
        Ok(self
            .structures()
            .into_iter()
            .map(|(csv_url, dataset, structure)| StructureRecord {
                csv_url,
                dataset_uri: dataset.id.clone(),
                structure_uri: structure.id.clone(),
            })
            .collect())
    }

    fn components(&self) -> Result<Vec<ComponentRecord>> {
        let mut records = Vec::new();
        for (csv_url, _, structure) in self.structures() {
            for component_uri in structure.references(QB_COMPONENT) {
                let node = self.document.node(component_uri).ok_or_else(|| {
                    QubeError::MissingDocumentSection {
                        section: format!("component specification '{component_uri}'"),
                    }
                })?;
                let (role, property) = component_role(node).ok_or_else(|| QubeError::MissingDocumentSection {
                    section: format!("component property of '{component_uri}'"),
                })?;
                let definition = self.document.node(property);

                records.push(ComponentRecord {
                    csv_url: csv_url.clone(),
                    component_uri: component_uri.to_string(),
                    role,
                    property: property.to_string(),
                    property_label: definition.and_then(|d| d.literal(RDFS_LABEL)).map(String::from),
                    property_defined: definition.is_some(),
                    order: node.integer(QB_ORDER).unwrap_or_default(),
                    required: node.boolean(QB_COMPONENT_REQUIRED).unwrap_or(false),
                    column_titles: self.source_columns_using(&csv_url, property),
                });
            }
        }
        Ok(records)
    }

    fn suppressed_columns(&self) -> Result<Vec<SuppressedColumnRecord>> {
        Ok(self
            .schemas
            .iter()
            .flat_map(|(url, schema)| {
                schema
                    .columns
                    .iter()
                    .filter(|c| c.suppress_output)
                    .map(move |c| SuppressedColumnRecord {
                        csv_url: url.clone(),
                        title: c.titles.clone().unwrap_or_else(|| c.name.clone()),
                    })
            })
            .collect())
    }

    fn code_lists(&self) -> Result<Vec<CodeListRecord>> {
        Ok(self
            .components()?
            .into_iter()
            .filter(|c| c.role == ComponentRole::Dimension)
            .filter_map(|c| {
                let code_list = self.document.node(&c.property)?.reference(QB_CODE_LIST)?;
                Some(CodeListRecord {
                    code_list_uri: code_list.to_string(),
                    column_titles: c.column_titles,
                    csv_url: c.csv_url,
                })
            })
            .collect())
    }

    fn columns(&self) -> Result<Vec<ColumnRecord>> {
        Ok(self
            .schemas
            .iter()
            .flat_map(|(url, schema)| {
                schema.columns.iter().map(move |c| ColumnRecord {
                    csv_url: url.clone(),
                    title: c.titles.clone(),
                    name: c.name.clone(),
                    property_url: c.property_url.clone(),
                    value_url: c.value_url.clone(),
                    datatype: c.datatype.clone(),
                    required: c.required,
                    suppressed: c.suppress_output,
                    is_virtual: c.is_virtual,
                })
            })
            .collect())
    }

    fn measure_shapes(&self) -> Result<Vec<MeasureShapeRecord>> {
        Ok(self
            .components()?
            .into_iter()
            .filter(|c| c.role == ComponentRole::Measure)
            .map(|c| MeasureShapeRecord {
                is_pivoted: !self.source_columns_using(&c.csv_url, &c.property).is_empty(),
                csv_url: c.csv_url,
                measure_uri: c.property,
            })
            .collect())
    }

    fn units(&self) -> Result<Vec<UnitRecord>> {
        Ok(self
            .document
            .nodes_of_type(QUDT_UNIT)
            .map(|node| UnitRecord {
                csv_url: csv_url_of(&node.id).to_string(),
                unit_uri: node.id.clone(),
                label: node.literal(RDFS_LABEL).map(String::from),
                base_unit_uri: node.reference(QUDT_IS_SCALING_OF).map(String::from),
                scaling_factor: node.number(QUDT_SCALING_FACTOR),
            })
            .collect())
    }

    fn dataset_csv_url(&self) -> Result<Vec<String>> {
        Ok(self
            .document
            .tables
            .iter()
            .filter(|t| !t.suppress_output)
            .map(|t| t.url.clone())
            .collect())
    }

    fn concept_scheme(&self) -> Result<Vec<ConceptSchemeRecord>> {
        Ok(self
            .document
            .nodes_of_type(SKOS_CONCEPT_SCHEME)
            .map(|node| ConceptSchemeRecord {
                csv_url: csv_url_of(&node.id).to_string(),
                scheme_uri: node.id.clone(),
                label: node
                    .literal(RDFS_LABEL)
                    .or_else(|| node.literal(SKOS_PREF_LABEL))
                    .map(String::from),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csvw::{CsvwColumn, Table};

    fn make_document() -> CsvwMetadata {
        let schema = TableSchema {
            columns: vec![
                CsvwColumn {
                    property_url: Some("c.csv#dimension/area".to_string()),
                    ..CsvwColumn::source("Area", "area")
                },
                CsvwColumn {
                    suppress_output: true,
                    ..CsvwColumn::source("Notes", "notes")
                },
                CsvwColumn {
                    property_url: Some("c.csv#measure/count".to_string()),
                    ..CsvwColumn::source("Count", "count")
                },
            ],
            ..TableSchema::default()
        };
        let mut document = CsvwMetadata::new(
            "c.csv#dataset",
            vec![
                Table {
                    url: "c.csv".to_string(),
                    table_schema: TableSchemaRef::Inline(schema),
                    suppress_output: false,
                },
                Table {
                    url: "area.csv".to_string(),
                    table_schema: TableSchemaRef::Reference("area.table.json".to_string()),
                    suppress_output: true,
                },
            ],
        );
        let mut structure = RdfNode::new("c.csv#structure");
        structure.push_ref(QB_COMPONENT, "c.csv#component/area");
        structure.push_ref(QB_COMPONENT, "c.csv#component/count");
        document.see_also = vec![
            RdfNode::new("c.csv#dataset")
                .with_type(DCAT_DATASET)
                .with_type(QB_DATA_SET)
                .with_literal(DCTERMS_TITLE, "C")
                .with_ref(QB_STRUCTURE, "c.csv#structure"),
            structure,
            RdfNode::new("c.csv#component/area")
                .with_literal(QB_ORDER, 1)
                .with_ref(QB_DIMENSION, "c.csv#dimension/area"),
            RdfNode::new("c.csv#component/count")
                .with_literal(QB_ORDER, 2)
                .with_ref(QB_MEASURE, "c.csv#measure/count"),
            RdfNode::new("c.csv#dimension/area")
                .with_literal(RDFS_LABEL, "Area")
                .with_ref(QB_CODE_LIST, "area.csv#code-list"),
        ];
        document
    }

    #[test]
    fn test_kind_questions() {
        let queries = DocumentQueries::from_document(make_document());
        assert!(queries.is_data_cube().unwrap());
        assert!(!queries.is_code_list().unwrap());
        assert_eq!(queries.dataset_csv_url().unwrap(), vec!["c.csv".to_string()]);
    }

    #[test]
    fn test_components() {
        let queries = DocumentQueries::from_document(make_document());
        let components = queries.components().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].role, ComponentRole::Dimension);
        assert_eq!(components[0].property_label.as_deref(), Some("Area"));
        assert_eq!(components[0].column_titles, vec!["Area".to_string()]);
        assert!(!components[1].property_defined);
    }

    #[test]
    fn test_code_lists_and_measures() {
        let queries = DocumentQueries::from_document(make_document());
        let code_lists = queries.code_lists().unwrap();
        assert_eq!(code_lists[0].code_list_uri, "area.csv#code-list");
        assert_eq!(code_lists[0].column_titles, vec!["Area".to_string()]);

        let shapes = queries.measure_shapes().unwrap();
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].is_pivoted);
    }

    #[test]
    fn test_suppressed_columns() {
        let queries = DocumentQueries::from_document(make_document());
        let suppressed = queries.suppressed_columns().unwrap();
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].title, "Notes");
        assert_eq!(suppressed[0].csv_url, "c.csv");
    }

    #[test]
    fn test_missing_component_node() {
        let mut document = make_document();
        document.see_also.retain(|n| n.id != "c.csv#component/count");
        let err = DocumentQueries::from_document(document).components().unwrap_err();
        assert!(matches!(err, QubeError::MissingDocumentSection { .. }));
    }

    #[test]
    fn test_load_skips_missing_referenced_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.csv-metadata.json");
        make_document().save(&path).unwrap();

        let queries = DocumentQueries::load(&path).unwrap();
        assert_eq!(queries.columns().unwrap().len(), 3);

        let schema = TableSchema {
            columns: vec![CsvwColumn::source("Label", "label")],
            ..TableSchema::default()
        };
        std::fs::write(
            dir.path().join("area.table.json"),
            serde_json::to_string(&schema).unwrap(),
        )
        .unwrap();
        let queries = DocumentQueries::load(&path).unwrap();
        assert_eq!(queries.columns().unwrap().len(), 4);
    }
}
