//! Reading a cube or code list back out of its document.

use std::collections::HashMap;

use once_cell::unsync::OnceCell;
use serde::Serialize;
use tracing::{debug, warn};

use super::queries::*;
use crate::csvw::{ComponentRole, Strictness};
use crate::error::{QubeError, Result};
use crate::shape::{classify_measures, CubeShape};

/// Reader settings.
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    pub strictness: Strictness,
}

type ByTable<T> = HashMap<String, Vec<T>>;

fn by_table<T>(records: Vec<T>, url: impl Fn(&T) -> &str) -> ByTable<T> {
    let mut grouped: ByTable<T> = HashMap::new();
    for record in records {
        grouped.entry(url(&record).to_string()).or_default().push(record);
    }
    grouped
}

/// Answers already received for one document.
#[derive(Debug, Default)]
pub struct QueryCache {
    is_code_list: OnceCell<bool>,
    is_data_cube: OnceCell<bool>,
    catalog_metadata: OnceCell<Vec<CatalogRecord>>,
    dataset_structure: OnceCell<Vec<StructureRecord>>,
    components: OnceCell<ByTable<ComponentRecord>>,
    suppressed_columns: OnceCell<ByTable<SuppressedColumnRecord>>,
    code_lists: OnceCell<ByTable<CodeListRecord>>,
    columns: OnceCell<ByTable<ColumnRecord>>,
    measure_shapes: OnceCell<ByTable<MeasureShapeRecord>>,
    units: OnceCell<ByTable<UnitRecord>>,
    dataset_csv_url: OnceCell<Vec<String>>,
    concept_scheme: OnceCell<Vec<ConceptSchemeRecord>>,
}

/// An open document: its query interface and the answers cached for it.
///
/// Each question is put to the query interface at most once for the life
/// of the handle.
pub struct DocumentHandle<Q> {
    queries: Q,
    cache: QueryCache,
    config: ReaderConfig,
}

fn exactly_one<'a, T>(query: &'static str, records: &'a [T]) -> Result<&'a T> {
    match records {
        [one] => Ok(one),
        _ => Err(QubeError::UnexpectedRecordCount {
            query,
            expected: 1,
            actual: records.len(),
        }),
    }
}

fn for_table<'a, T>(grouped: &'a ByTable<T>, csv_url: &str) -> &'a [T] {
    grouped.get(csv_url).map(Vec::as_slice).unwrap_or(&[])
}

impl<Q: CubeQueries> DocumentHandle<Q> {
    pub fn new(queries: Q) -> Self {
        Self::with_config(queries, ReaderConfig::default())
    }

    pub fn with_config(queries: Q, config: ReaderConfig) -> Self {
        Self {
            queries,
            cache: QueryCache::default(),
            config,
        }
    }

    pub fn queries(&self) -> &Q {
        &self.queries
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn is_code_list(&self) -> Result<bool> {
        self.cache
            .is_code_list
            .get_or_try_init(|| self.queries.is_code_list())
            .copied()
    }

    pub fn is_data_cube(&self) -> Result<bool> {
        self.cache
            .is_data_cube
            .get_or_try_init(|| self.queries.is_data_cube())
            .copied()
    }

    /// The one catalog record the document must have.
    pub fn catalog_metadata(&self) -> Result<&CatalogRecord> {
        let records = self
            .cache
            .catalog_metadata
            .get_or_try_init(|| self.queries.catalog_metadata())?;
        exactly_one("catalog_metadata", records)
    }

    /// The one dataset structure the document must have.
    pub fn dataset_structure(&self) -> Result<&StructureRecord> {
        let records = self
            .cache
            .dataset_structure
            .get_or_try_init(|| self.queries.dataset_structure())?;
        exactly_one("dataset_structure", records)
    }

    /// The one table the document publishes.
    pub fn dataset_csv_url(&self) -> Result<&str> {
        let urls = self
            .cache
            .dataset_csv_url
            .get_or_try_init(|| self.queries.dataset_csv_url())?;
        exactly_one("dataset_csv_url", urls).map(String::as_str)
    }

    pub fn concept_scheme(&self) -> Result<&ConceptSchemeRecord> {
        let records = self
            .cache
            .concept_scheme
            .get_or_try_init(|| self.queries.concept_scheme())?;
        exactly_one("concept_scheme", records)
    }

    pub fn components(&self, csv_url: &str) -> Result<&[ComponentRecord]> {
        let grouped = self
            .cache
            .components
            .get_or_try_init(|| Ok::<_, QubeError>(by_table(self.queries.components()?, |r| r.csv_url.as_str())))?;
        Ok(for_table(grouped, csv_url))
    }

    pub fn suppressed_columns(&self, csv_url: &str) -> Result<&[SuppressedColumnRecord]> {
        let grouped = self.cache.suppressed_columns.get_or_try_init(|| {
            Ok::<_, QubeError>(by_table(self.queries.suppressed_columns()?, |r| r.csv_url.as_str()))
        })?;
        Ok(for_table(grouped, csv_url))
    }

    pub fn code_lists(&self, csv_url: &str) -> Result<&[CodeListRecord]> {
        let grouped = self
            .cache
            .code_lists
            .get_or_try_init(|| Ok::<_, QubeError>(by_table(self.queries.code_lists()?, |r| r.csv_url.as_str())))?;
        Ok(for_table(grouped, csv_url))
    }

    pub fn columns(&self, csv_url: &str) -> Result<&[ColumnRecord]> {
        let grouped = self
            .cache
            .columns
            .get_or_try_init(|| Ok::<_, QubeError>(by_table(self.queries.columns()?, |r| r.csv_url.as_str())))?;
        Ok(for_table(grouped, csv_url))
    }

    pub fn measure_shapes(&self, csv_url: &str) -> Result<&[MeasureShapeRecord]> {
        let grouped = self.cache.measure_shapes.get_or_try_init(|| {
            Ok::<_, QubeError>(by_table(self.queries.measure_shapes()?, |r| r.csv_url.as_str()))
        })?;
        Ok(for_table(grouped, csv_url))
    }

    pub fn units(&self, csv_url: &str) -> Result<&[UnitRecord]> {
        let grouped = self
            .cache
            .units
            .get_or_try_init(|| Ok::<_, QubeError>(by_table(self.queries.units()?, |r| r.csv_url.as_str())))?;
        Ok(for_table(grouped, csv_url))
    }

    /// Shape of the table's cube, from whether each measure is pivoted.
    pub fn shape(&self, csv_url: &str) -> Result<CubeShape> {
        let measures = self.measure_shapes(csv_url)?;
        Ok(classify_measures(
            measures.iter().map(|m| (m.measure_uri.as_str(), m.is_pivoted)),
        )?)
    }
}

/// A component as read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSummary {
    pub role: ComponentRole,
    pub property: String,
    pub label: Option<String>,
    pub order: i64,
    pub required: bool,
    pub column_titles: Vec<String>,
}

/// What a cube document describes.
#[derive(Debug, Clone, Serialize)]
pub struct CubeSummary {
    pub catalog: CatalogRecord,
    pub csv_url: String,
    pub structure_uri: String,
    pub shape: CubeShape,
    /// Components in order.
    pub components: Vec<ComponentSummary>,
    pub code_lists: Vec<CodeListRecord>,
    pub suppressed_columns: Vec<String>,
    pub units: Vec<UnitRecord>,
}

impl CubeSummary {
    pub fn components_with_role(&self, role: ComponentRole) -> impl Iterator<Item = &ComponentSummary> {
        self.components.iter().filter(move |c| c.role == role)
    }
}

/// What a code-list document describes.
#[derive(Debug, Clone, Serialize)]
pub struct CodeListSummary {
    pub catalog: CatalogRecord,
    pub scheme_uri: String,
    pub label: Option<String>,
    pub csv_url: String,
    pub columns: Vec<ColumnRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inspection {
    DataCube(CubeSummary),
    CodeList(CodeListSummary),
}

/// Work out what a document describes and read it.
pub fn read<Q: CubeQueries>(handle: &DocumentHandle<Q>) -> Result<Inspection> {
    if handle.is_data_cube()? {
        return Ok(Inspection::DataCube(read_cube(handle)?));
    }
    if handle.is_code_list()? {
        return Ok(Inspection::CodeList(read_code_list(handle)?));
    }
    Err(QubeError::InputNotSupported)
}

fn read_cube<Q: CubeQueries>(handle: &DocumentHandle<Q>) -> Result<CubeSummary> {
    let catalog = handle.catalog_metadata()?.clone();
    let csv_url = handle.dataset_csv_url()?.to_string();
    let structure = handle.dataset_structure()?;
    debug!(csv = %csv_url, structure = %structure.structure_uri, "reading cube");

    let local_prefix = format!("{csv_url}#");
    let mut components = Vec::new();
    for record in handle.components(&csv_url)? {
        if !record.property_defined && record.property.starts_with(&local_prefix) {
            match handle.config().strictness {
                Strictness::Strict => {
                    return Err(QubeError::MissingDocumentSection {
                        section: format!("definition of '{}'", record.property),
                    });
                }
                Strictness::Lenient => {
                    warn!(property = %record.property, "component has no definition, reading it without a label");
                }
            }
        }
        components.push(ComponentSummary {
            role: record.role,
            property: record.property.clone(),
            label: record.property_label.clone(),
            order: record.order,
            required: record.required,
            column_titles: record.column_titles.clone(),
        });
    }
    components.sort_by_key(|c| c.order);

    let shape = handle.shape(&csv_url)?;

    Ok(CubeSummary {
        catalog,
        structure_uri: structure.structure_uri.clone(),
        shape,
        components,
        code_lists: handle.code_lists(&csv_url)?.to_vec(),
        suppressed_columns: handle
            .suppressed_columns(&csv_url)?
            .iter()
            .map(|r| r.title.clone())
            .collect(),
        units: handle.units(&csv_url)?.to_vec(),
        csv_url,
    })
}

fn read_code_list<Q: CubeQueries>(handle: &DocumentHandle<Q>) -> Result<CodeListSummary> {
    let catalog = handle.catalog_metadata()?.clone();
    let scheme = handle.concept_scheme()?;
    let csv_url = handle.dataset_csv_url()?.to_string();
    debug!(csv = %csv_url, scheme = %scheme.scheme_uri, "reading code list");

    Ok(CodeListSummary {
        catalog,
        scheme_uri: scheme.scheme_uri.clone(),
        label: scheme.label.clone(),
        columns: handle.columns(&csv_url)?.to_vec(),
        csv_url,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::csvw::{CsvwColumn, CsvwMetadata, RdfNode, Table, TableSchema, TableSchemaRef};
    use crate::inspect::DocumentQueries;
    use crate::vocab::*;

    fn make_document(pivoted: bool) -> CsvwMetadata {
        let property = if pivoted { "c.csv#measure/count" } else { "c.csv#measure/{+measure}" };
        let schema = TableSchema {
            columns: vec![
                CsvwColumn {
                    property_url: Some("c.csv#dimension/area".to_string()),
                    ..CsvwColumn::source("Area", "area")
                },
                CsvwColumn {
                    property_url: Some(property.to_string()),
                    ..CsvwColumn::source("Value", "value")
                },
            ],
            ..TableSchema::default()
        };
        let mut document = CsvwMetadata::new(
            "c.csv#dataset",
            vec![Table {
                url: "c.csv".to_string(),
                table_schema: TableSchemaRef::Inline(schema),
                suppress_output: false,
            }],
        );
        let mut structure = RdfNode::new("c.csv#structure");
        structure.push_ref(QB_COMPONENT, "c.csv#component/count");
        structure.push_ref(QB_COMPONENT, "c.csv#component/area");
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
            RdfNode::new("c.csv#dimension/area").with_literal(RDFS_LABEL, "Area"),
            RdfNode::new("c.csv#measure/count").with_literal(RDFS_LABEL, "Count"),
        ];
        document
    }

    fn handle(document: CsvwMetadata) -> DocumentHandle<DocumentQueries> {
        DocumentHandle::new(DocumentQueries::from_document(document))
    }

    #[test]
    fn test_read_cube() {
        let inspection = read(&handle(make_document(false))).unwrap();
        let Inspection::DataCube(cube) = inspection else {
            panic!("expected a data cube");
        };
        assert_eq!(cube.shape, CubeShape::Standard);
        assert_eq!(cube.csv_url, "c.csv");
        assert_eq!(cube.catalog.title.as_deref(), Some("C"));
        let orders: Vec<i64> = cube.components.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(cube.components[0].label.as_deref(), Some("Area"));
        assert_eq!(cube.components_with_role(ComponentRole::Measure).count(), 1);
    }

    #[test]
    fn test_read_pivoted_cube() {
        let Inspection::DataCube(cube) = read(&handle(make_document(true))).unwrap() else {
            panic!("expected a data cube");
        };
        assert_eq!(cube.shape, CubeShape::Pivoted);
    }

    #[test]
    fn test_two_catalog_records_is_an_error() {
        let mut document = make_document(false);
        document.see_also.push(RdfNode::new("other").with_type(DCAT_DATASET));
        let err = read(&handle(document)).unwrap_err();
        assert!(matches!(
            err,
            QubeError::UnexpectedRecordCount {
                query: "catalog_metadata",
                expected: 1,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_missing_definition_strict_and_lenient() {
        let mut document = make_document(false);
        document.see_also.retain(|n| n.id != "c.csv#dimension/area");

        let err = read(&handle(document.clone())).unwrap_err();
        assert!(matches!(err, QubeError::MissingDocumentSection { .. }));

        let lenient = DocumentHandle::with_config(
            DocumentQueries::from_document(document),
            ReaderConfig {
                strictness: Strictness::Lenient,
            },
        );
        let Inspection::DataCube(cube) = read(&lenient).unwrap() else {
            panic!("expected a data cube");
        };
        assert_eq!(cube.components[0].label, None);
    }

    #[test]
    fn test_unsupported_input() {
        let document = CsvwMetadata::new("x.csv", vec![]);
        let err = read(&handle(document)).unwrap_err();
        assert!(matches!(err, QubeError::InputNotSupported));
    }

    /// Counts how often each question reaches the document.
    struct CountingQueries {
        inner: DocumentQueries,
        components: Cell<usize>,
        catalog: Cell<usize>,
    }

    impl CubeQueries for CountingQueries {
        fn is_code_list(&self) -> Result<bool> {
            self.inner.is_code_list()
        }
        fn is_data_cube(&self) -> Result<bool> {
            self.inner.is_data_cube()
        }
        fn catalog_metadata(&self) -> Result<Vec<CatalogRecord>> {
            self.catalog.set(self.catalog.get() + 1);
            self.inner.catalog_metadata()
        }
        fn dataset_structure(&self) -> Result<Vec<StructureRecord>> {
            self.inner.dataset_structure()
        }
        fn components(&self) -> Result<Vec<ComponentRecord>> {
            self.components.set(self.components.get() + 1);
            self.inner.components()
        }
        fn suppressed_columns(&self) -> Result<Vec<SuppressedColumnRecord>> {
            self.inner.suppressed_columns()
        }
        fn code_lists(&self) -> Result<Vec<CodeListRecord>> {
            self.inner.code_lists()
        }
        fn columns(&self) -> Result<Vec<ColumnRecord>> {
            self.inner.columns()
        }
        fn measure_shapes(&self) -> Result<Vec<MeasureShapeRecord>> {
            self.inner.measure_shapes()
        }
        fn units(&self) -> Result<Vec<UnitRecord>> {
            self.inner.units()
        }
        fn dataset_csv_url(&self) -> Result<Vec<String>> {
            self.inner.dataset_csv_url()
        }
        fn concept_scheme(&self) -> Result<Vec<ConceptSchemeRecord>> {
            self.inner.concept_scheme()
        }
    }

    #[test]
    fn test_answers_are_memoized_per_handle() {
        let handle = DocumentHandle::new(CountingQueries {
            inner: DocumentQueries::from_document(make_document(false)),
            components: Cell::new(0),
            catalog: Cell::new(0),
        });

        read(&handle).unwrap();
        read(&handle).unwrap();
        handle.components("c.csv").unwrap();
        handle.components("other.csv").unwrap();

        assert_eq!(handle.queries().components.get(), 1);
        assert_eq!(handle.queries().catalog.get(), 1);
    }
}
