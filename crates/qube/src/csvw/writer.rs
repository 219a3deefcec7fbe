//! Serializing a cube into a CSV-W document.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::codelist::{CodeListOutput, KEY_COLUMN};
use super::document::{
    CsvwColumn, CsvwMetadata, ForeignKey, ForeignKeyReference, RdfNode, Table, TableSchema,
    TableSchemaRef,
};
use super::dsd::{self, ComponentList, ComponentSpec};
use super::standardise::convert_data_values_to_uri_safe_values;
use super::uris::{check_template, CodeListUris, CubeUris};
use super::Strictness;
use crate::error::{QubeError, Result};
use crate::identifier::{uri_safe, ScopeResolver, Token};
use crate::model::{
    Attribute, AttributeDefinition, AttributeValues, CodeList, Column, Component, Cube, Dimension,
    Measure, MeasureDimension, NewDimension, ObservationValue, UnitsColumn,
};
use crate::shape::CubeShape;
use crate::vocab::*;

/// Writer settings.
#[derive(Debug, Clone, Default)]
pub struct WriterConfig {
    pub strictness: Strictness,
}

/// Everything produced for one cube.
#[derive(Debug, Clone)]
pub struct WriteOutput {
    pub uris: CubeUris,
    pub shape: CubeShape,
    pub metadata: CsvwMetadata,
    /// The cube's data with coded values rewritten, if the cube had data.
    pub csv: Option<String>,
    pub code_lists: Vec<CodeListOutput>,
}

impl WriteOutput {
    /// Write every file into `dir`, returning their paths.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| QubeError::io(dir, e))?;

        let mut written = Vec::new();
        if let Some(csv) = &self.csv {
            let path = dir.join(self.uris.csv_file());
            std::fs::write(&path, csv).map_err(|e| QubeError::io(&path, e))?;
            written.push(path);
        }

        let path = dir.join(self.uris.metadata_file());
        self.metadata.save(&path)?;
        written.push(path);

        for code_list in &self.code_lists {
            written.extend(code_list.save(dir)?);
        }
        info!(files = written.len(), dir = %dir.display(), "cube written");
        Ok(written)
    }
}

/// Serializes cubes into CSV-W.
#[derive(Debug, Clone, Default)]
pub struct CubeWriter {
    config: WriterConfig,
}

impl CubeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Serialize a cube.
    ///
    /// The cube's data is rewritten in place so coded values become the
    /// tokens used in URIs. The cube is expected to have passed validation.
    pub fn write(&self, cube: &mut Cube) -> Result<WriteOutput> {
        let shape = cube.shape()?;
        let identifier = cube.metadata.uri_safe_identifier()?;
        let uris = CubeUris::new(&identifier);
        debug!(%shape, csv = uris.csv_file(), "writing cube");

        check_uri_templates(cube)?;
        check_code_list_names(cube)?;
        convert_data_values_to_uri_safe_values(cube, self.config.strictness)?;

        let plan = CubePlan::new(cube, shape, &uris);
        let metadata = plan.metadata()?;
        let code_lists = plan.code_lists()?;
        let csv = cube.data.as_ref().map(|d| d.to_csv_string()).transpose()?;

        Ok(WriteOutput {
            uris,
            shape,
            metadata,
            csv,
            code_lists,
        })
    }
}

fn check_uri_templates(cube: &Cube) -> Result<()> {
    let names: Vec<String> = cube.columns.iter().map(Column::csvw_name).collect();
    for column in &cube.columns {
        if let Some(template) = &column.uri_template {
            check_template(template, &names)?;
        }
    }
    Ok(())
}

/// Each new code list needs a file stem of its own.
fn check_code_list_names(cube: &Cube) -> Result<()> {
    let entries = cube.dimension_columns().into_iter().filter_map(|(column, d)| match d {
        Dimension::New(dim) => dim.code_list_name().map(|name| (column.title.as_str(), name)),
        Dimension::Existing { .. } => None,
    });
    match ScopeResolver::resolve_keyed("code lists", entries, &[]) {
        Ok(_) => Ok(()),
        Err(mut errors) => Err(errors.remove(0).into()),
    }
}

/// Code-list file stem for a new dimension.
fn code_list_stem(dimension: &NewDimension) -> Result<Token> {
    let label = dimension.code_list_name().unwrap_or(&dimension.label);
    Ok(Token::resolve(label)?)
}

/// Token naming a column's component in the structure.
fn component_token(column: &Column, component: &Component) -> String {
    match component {
        Component::Dimension(Dimension::New(dim)) => uri_safe(&dim.label),
        Component::Attribute(Attribute {
            definition: AttributeDefinition::New { label, .. },
            ..
        }) => uri_safe(label),
        _ => column.token(),
    }
}

struct CubePlan<'a> {
    cube: &'a Cube,
    shape: CubeShape,
    uris: &'a CubeUris,
    dimension_names: Vec<String>,
}

impl<'a> CubePlan<'a> {
    fn new(cube: &'a Cube, shape: CubeShape, uris: &'a CubeUris) -> Self {
        let dimension_names = cube
            .dimension_columns()
            .into_iter()
            .map(|(c, _)| c.csvw_name())
            .collect();
        Self {
            cube,
            shape,
            uris,
            dimension_names,
        }
    }

    fn metadata(&self) -> Result<CsvwMetadata> {
        let mut schema = TableSchema {
            columns: Vec::new(),
            foreign_keys: self.foreign_keys()?,
            primary_key: self.primary_key(),
            about_url: Some(self.about_url()),
        };
        for column in &self.cube.columns {
            schema.columns.push(self.source_column(column)?);
        }
        schema.columns.extend(self.virtual_columns()?);

        let mut tables = vec![Table {
            url: self.uris.csv_file().to_string(),
            table_schema: TableSchemaRef::Inline(schema),
            suppress_output: false,
        }];
        for (_, dim) in self.new_code_list_dimensions() {
            let stem = code_list_stem(dim)?;
            let uris = CodeListUris::new(&stem);
            tables.push(Table {
                url: uris.csv_file(),
                table_schema: TableSchemaRef::Reference(uris.table_schema_file()),
                suppress_output: true,
            });
        }

        let mut metadata = CsvwMetadata::new(self.uris.dataset(), tables);
        metadata.see_also = self.structure_nodes()?;
        Ok(metadata)
    }

    fn code_lists(&self) -> Result<Vec<CodeListOutput>> {
        self.new_code_list_dimensions()
            .into_iter()
            .filter_map(|(_, dim)| match &dim.code_list {
                Some(CodeList::New(list)) => Some((dim, list)),
                _ => None,
            })
            .map(|(dim, list)| {
                let stem = code_list_stem(dim)?;
                let label = list.label.as_deref().unwrap_or(&dim.label);
                CodeListOutput::build(&stem, label, list)
            })
            .collect()
    }

    fn new_code_list_dimensions(&self) -> Vec<(&'a Column, &'a NewDimension)> {
        self.cube
            .dimension_columns()
            .into_iter()
            .filter_map(|(c, d)| match d {
                Dimension::New(dim) if matches!(dim.code_list, Some(CodeList::New(_))) => Some((c, dim)),
                _ => None,
            })
            .collect()
    }

    fn foreign_keys(&self) -> Result<Vec<ForeignKey>> {
        self.new_code_list_dimensions()
            .into_iter()
            .filter(|(c, _)| c.uri_template.is_none())
            .map(|(c, dim)| -> Result<ForeignKey> {
                let uris = CodeListUris::new(&code_list_stem(dim)?);
                Ok(ForeignKey {
                    column_reference: c.csvw_name(),
                    reference: ForeignKeyReference {
                        resource: uris.csv_file(),
                        column_reference: KEY_COLUMN.to_string(),
                    },
                })
            })
            .collect()
    }

    fn primary_key(&self) -> Vec<String> {
        let mut key = self.dimension_names.clone();
        if self.shape == CubeShape::Standard {
            key.extend(
                self.cube
                    .measure_dimension_columns()
                    .into_iter()
                    .map(|(c, _)| c.csvw_name()),
            );
        }
        key
    }

    fn about_url(&self) -> String {
        match self.shape {
            CubeShape::Standard => {
                let measure_column = self
                    .cube
                    .measure_dimension_columns()
                    .first()
                    .map(|(c, _)| c.csvw_name())
                    .unwrap_or_default();
                self.uris.observation_template(&self.dimension_names, &measure_column)
            }
            CubeShape::Pivoted => self.uris.slice_template(&self.dimension_names),
        }
    }

    fn observation_uri(&self, observation_column: &Column) -> String {
        self.uris
            .pivoted_observation_template(&self.dimension_names, &observation_column.token())
    }

    /// Observation URI of the column a qualifying column applies to, in pivoted shape.
    fn qualified_observation_uri(&self, component: &Component) -> Option<String> {
        if self.shape != CubeShape::Pivoted {
            return None;
        }
        let observations = self.cube.observation_value_columns();
        let target = match component.observed_value_column() {
            Some(title) => observations.iter().find(|(c, _)| c.title == title),
            None if observations.len() == 1 => observations.first(),
            None => None,
        };
        target.map(|(c, _)| self.observation_uri(c))
    }

    fn source_column(&self, column: &Column) -> Result<CsvwColumn> {
        let name = column.csvw_name();
        let mut out = CsvwColumn::source(column.title.as_str(), name.as_str());
        let Some(component) = &column.definition else {
            out.suppress_output = true;
            return Ok(out);
        };
        let default_value = || format!("{{+{name}}}");

        match component {
            Component::Dimension(Dimension::Existing { dimension_uri, .. }) => {
                out.property_url = Some(dimension_uri.clone());
                out.value_url = Some(default_value());
                out.required = true;
            }
            Component::Dimension(Dimension::New(dim)) => {
                out.property_url = Some(self.uris.dimension(&uri_safe(&dim.label)));
                out.value_url = Some(match &dim.code_list {
                    Some(CodeList::New(_)) => CodeListUris::new(&code_list_stem(dim)?).concept_template(&name),
                    _ => default_value(),
                });
                out.required = true;
            }
            Component::Attribute(attr) => {
                out.property_url = Some(self.attribute_property(attr));
                match &attr.values {
                    AttributeValues::Literal { data_type } => out.datatype = Some(data_type.clone()),
                    AttributeValues::Coded { values } if !values.is_empty() => {
                        let token = component_token(column, component);
                        out.value_url = Some(self.uris.attribute_value_template(&token, &name));
                    }
                    AttributeValues::Coded { .. } => out.value_url = Some(default_value()),
                }
                out.required = attr.is_required;
                out.about_url = self.qualified_observation_uri(component);
            }
            Component::MeasureDimension(_) => {
                out.property_url = Some(QB_MEASURE_TYPE.to_string());
                out.value_url = Some(self.uris.measure_template(&name));
                out.required = true;
            }
            Component::Units(_) => {
                out.property_url = Some(SDMX_UNIT_MEASURE.to_string());
                out.value_url = Some(self.uris.unit_template(&name));
                out.required = true;
                out.about_url = self.qualified_observation_uri(component);
            }
            Component::ObservationValue(obs) => {
                match &obs.measure {
                    Some(measure) => {
                        out.property_url = Some(dsd::measure_uri(self.uris, measure));
                        out.about_url = Some(self.observation_uri(column));
                    }
                    None => out.property_url = Some(self.standard_measure_property()),
                }
                out.datatype = Some(obs.data_type.clone());
                out.required = self.cube.observation_status_columns().is_empty();
            }
        }

        // A literal column keeps no value URL even if it declares a template.
        if let Some(template) = &column.uri_template {
            if out.value_url.is_some() {
                out.value_url = Some(template.clone());
            }
        }
        Ok(out)
    }

    fn attribute_property(&self, attr: &Attribute) -> String {
        match &attr.definition {
            AttributeDefinition::Existing { attribute_uri } => attribute_uri.clone(),
            AttributeDefinition::New { label, .. } => self.uris.attribute(&uri_safe(label)),
        }
    }

    /// Property of a standard observation: the measure named by the measure column.
    fn standard_measure_property(&self) -> String {
        match self.cube.measure_dimension_columns().first() {
            Some((column, _)) => column
                .uri_template
                .clone()
                .unwrap_or_else(|| self.uris.measure_template(&column.csvw_name())),
            None => QB_MEASURE_TYPE.to_string(),
        }
    }

    fn value_url_of(&self, column: &Column) -> Result<Option<String>> {
        Ok(self.source_column(column)?.value_url)
    }

    fn virtual_columns(&self) -> Result<Vec<CsvwColumn>> {
        match self.shape {
            CubeShape::Standard => Ok(self.standard_virtual_columns()),
            CubeShape::Pivoted => self.pivoted_virtual_columns(),
        }
    }

    fn standard_virtual_columns(&self) -> Vec<CsvwColumn> {
        let mut columns = vec![
            CsvwColumn::virtual_triple("virt_type", None, RDF_TYPE, QB_OBSERVATION),
            CsvwColumn::virtual_triple("virt_dataset", None, QB_DATA_SET_PROPERTY, self.uris.dataset()),
        ];
        let fixed_unit = self
            .cube
            .observation_value_columns()
            .into_iter()
            .find_map(|(_, obs)| obs.unit.as_ref());
        if let Some(unit) = fixed_unit {
            columns.push(CsvwColumn::virtual_triple(
                "virt_unit",
                None,
                SDMX_UNIT_MEASURE,
                dsd::unit_uri(self.uris, unit),
            ));
        }
        columns
    }

    fn pivoted_virtual_columns(&self) -> Result<Vec<CsvwColumn>> {
        let dimensions = self.cube.dimension_columns();
        let mut columns = Vec::new();

        for (column, obs) in self.cube.observation_value_columns() {
            let name = column.csvw_name();
            let obs_uri = self.observation_uri(column);
            let about = || Some(obs_uri.clone());

            columns.push(CsvwColumn::virtual_triple(
                format!("virt_obs_{name}"),
                None,
                QB_OBSERVATION_PROPERTY,
                obs_uri.clone(),
            ));
            if let Some(measure) = &obs.measure {
                columns.push(CsvwColumn::virtual_triple(
                    format!("virt_obs_{name}_meas"),
                    about(),
                    QB_MEASURE_TYPE,
                    dsd::measure_uri(self.uris, measure),
                ));
            }
            if let Some(unit) = &obs.unit {
                columns.push(CsvwColumn::virtual_triple(
                    format!("virt_obs_{name}_unit"),
                    about(),
                    SDMX_UNIT_MEASURE,
                    dsd::unit_uri(self.uris, unit),
                ));
            }
            for (dim_column, dim) in &dimensions {
                let property = match dim {
                    Dimension::Existing { dimension_uri, .. } => dimension_uri.clone(),
                    Dimension::New(new) => self.uris.dimension(&uri_safe(&new.label)),
                };
                let value = self
                    .value_url_of(dim_column)?
                    .unwrap_or_else(|| format!("{{+{}}}", dim_column.csvw_name()));
                columns.push(CsvwColumn::virtual_triple(
                    format!("virt_dim_{name}_{}", dim_column.csvw_name()),
                    about(),
                    property,
                    value,
                ));
            }
            columns.push(CsvwColumn::virtual_triple(
                format!("virt_obs_{name}_type"),
                about(),
                RDF_TYPE,
                QB_OBSERVATION,
            ));
            columns.push(CsvwColumn::virtual_triple(
                format!("virt_dataSet_{name}"),
                about(),
                QB_DATA_SET_PROPERTY,
                self.uris.dataset(),
            ));
        }

        columns.push(CsvwColumn::virtual_triple("virt_slice", None, RDF_TYPE, QB_SLICE));
        columns.push(CsvwColumn::virtual_triple(
            "virt_slice_structure",
            None,
            QB_SLICE_STRUCTURE,
            self.uris.slice_key(),
        ));
        Ok(columns)
    }

    /// Component specifications in column order.
    fn components(&self) -> ComponentList {
        let mut list = ComponentList::default();
        let unit_spec = || ComponentSpec::attribute("unit", SDMX_UNIT_MEASURE, true);
        let measure_type_spec = || ComponentSpec::dimension("measure-type", QB_MEASURE_TYPE);

        for (column, component) in self.cube.qb_columns() {
            let token = component_token(column, component);
            match component {
                Component::Dimension(Dimension::Existing { dimension_uri, .. }) => {
                    list.push(ComponentSpec::dimension(token, dimension_uri.as_str()));
                }
                Component::Dimension(Dimension::New(dim)) => {
                    let property = self.uris.dimension(&uri_safe(&dim.label));
                    list.push(ComponentSpec::dimension(token, property));
                }
                Component::Attribute(attr) => {
                    let property = self.attribute_property(attr);
                    list.push(ComponentSpec::attribute(token, property, attr.is_required));
                }
                Component::MeasureDimension(MeasureDimension { measures }) => {
                    list.push(measure_type_spec());
                    for measure in measures {
                        let property = dsd::measure_uri(self.uris, measure);
                        list.push(ComponentSpec::measure(measure_token(measure), property));
                    }
                }
                Component::Units(UnitsColumn { .. }) => list.push(unit_spec()),
                Component::ObservationValue(ObservationValue { measure, unit, .. }) => {
                    if let Some(measure) = measure {
                        let property = dsd::measure_uri(self.uris, measure);
                        list.push(ComponentSpec::measure(measure_token(measure), property));
                    }
                    if unit.is_some() {
                        list.push(unit_spec());
                    }
                }
            }
        }

        if self.shape == CubeShape::Pivoted {
            list.push(measure_type_spec());
        }
        list
    }

    fn structure_nodes(&self) -> Result<Vec<RdfNode>> {
        let components = self.components();
        let pivoted = self.shape == CubeShape::Pivoted;

        let mut nodes = vec![
            dsd::dataset_node(self.uris, &self.cube.metadata),
            dsd::structure_node(self.uris, &components, pivoted),
        ];
        nodes.extend(dsd::component_nodes(self.uris, &components));
        if pivoted {
            nodes.push(dsd::slice_key_node(self.uris, &components));
        }

        let mut seen_units = std::collections::HashSet::new();
        let mut push_units = |nodes: &mut Vec<RdfNode>, unit_nodes: Vec<RdfNode>| {
            for node in unit_nodes {
                if seen_units.insert(node.id.clone()) {
                    nodes.push(node);
                }
            }
        };

        for (column, component) in self.cube.qb_columns() {
            match component {
                Component::Dimension(Dimension::New(dim)) => {
                    let code_list_uri = match &dim.code_list {
                        Some(CodeList::New(_)) => Some(CodeListUris::new(&code_list_stem(dim)?).scheme()),
                        Some(CodeList::Existing { concept_scheme_uri }) => Some(concept_scheme_uri.clone()),
                        None => None,
                    };
                    let uri = self.uris.dimension(&uri_safe(&dim.label));
                    nodes.push(dsd::dimension_node(uri, dim, code_list_uri.as_deref()));
                }
                Component::Dimension(Dimension::Existing { .. }) => {}
                Component::Attribute(attr) => {
                    let literal_type = match &attr.values {
                        AttributeValues::Literal { data_type } => Some(data_type.as_str()),
                        AttributeValues::Coded { .. } => None,
                    };
                    let uri = self.attribute_property(attr);
                    nodes.extend(dsd::attribute_node(uri, &attr.definition, literal_type));
                    let token = component_token(column, component);
                    for value in attr.new_values() {
                        nodes.push(dsd::attribute_value_node(self.uris, &token, value));
                    }
                }
                Component::MeasureDimension(md) => {
                    nodes.extend(md.measures.iter().filter_map(|m| dsd::measure_node(self.uris, m)));
                }
                Component::Units(units) => {
                    for unit in &units.units {
                        push_units(&mut nodes, dsd::unit_nodes(self.uris, unit));
                    }
                }
                Component::ObservationValue(obs) => {
                    if let Some(measure) = &obs.measure {
                        nodes.extend(dsd::measure_node(self.uris, measure));
                    }
                    if let Some(unit) = &obs.unit {
                        push_units(&mut nodes, dsd::unit_nodes(self.uris, unit));
                    }
                }
            }
        }
        Ok(nodes)
    }
}

fn measure_token(measure: &Measure) -> String {
    match measure {
        Measure::New { label, .. } => uri_safe(label),
        Measure::Existing { measure_uri } => {
            let tail = measure_uri.rsplit(['/', '#']).next().unwrap_or(measure_uri);
            uri_safe(tail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::ResolveError;
    use crate::input::DataTable;
    use crate::model::{
        AttributeValue, CatalogMetadata, Concept, NewCodeList, Unit,
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

    fn standard_cube() -> Cube {
        let area = NewDimension::new("Area").with_code_list(CodeList::New(NewCodeList::new(vec![
            Concept::new("North"),
            Concept::new("South"),
        ])));
        Cube::new(
            CatalogMetadata::new("Road Accidents"),
            vec![
                Column::new("Area", Component::Dimension(Dimension::New(area))),
                Column::new(
                    "Period",
                    Component::Dimension(Dimension::existing("http://example.org/period")),
                )
                .with_uri_template("http://example.org/year/{+period}"),
                Column::new(
                    "Measure",
                    Component::MeasureDimension(MeasureDimension::new(vec![Measure::new("Count")])),
                ),
                Column::new("Unit", Component::Units(UnitsColumn::new(vec![Unit::new("Accidents")]))),
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
            vec!["Area", "Period", "Measure", "Unit", "Marker", "Notes", "Value"],
            vec![
                vec!["North", "2020", "Count", "Accidents", "Provisional", "x", "3"],
                vec!["South", "2020", "Count", "Accidents", "", "", "5"],
            ],
        ))
    }

    fn pivoted_cube() -> Cube {
        Cube::new(
            CatalogMetadata::new("Pivoted"),
            vec![
                Column::new("Area", Component::Dimension(Dimension::new("Area"))),
                Column::new(
                    "Count",
                    Component::ObservationValue(ObservationValue::pivoted(
                        Measure::new("Count"),
                        Some(Unit::new("Accidents")),
                    )),
                ),
                Column::new(
                    "Rate",
                    Component::ObservationValue(ObservationValue::pivoted(Measure::new("Rate"), None)),
                ),
                Column::new("Rate Unit", Component::Units(UnitsColumn::new(vec![Unit::new("Percent")]).qualifying("Rate"))),
            ],
        )
    }

    fn schema(output: &WriteOutput) -> &TableSchema {
        output.metadata.tables[0].table_schema.inline().unwrap()
    }

    fn column<'a>(schema: &'a TableSchema, name: &str) -> &'a CsvwColumn {
        schema.columns.iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn test_standard_columns() {
        let mut cube = standard_cube();
        let output = CubeWriter::new().write(&mut cube).unwrap();
        let schema = schema(&output);

        let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["area", "period", "measure", "unit", "marker", "notes", "value", "virt_type", "virt_dataset"]
        );
        assert_eq!(
            schema.about_url.as_deref(),
            Some("road-accidents.csv#obs/{+area}/{+period}@{+measure}")
        );
        assert_eq!(schema.primary_key, vec!["area", "period", "measure"]);

        let area = column(schema, "area");
        assert_eq!(area.property_url.as_deref(), Some("road-accidents.csv#dimension/area"));
        assert_eq!(area.value_url.as_deref(), Some("area.csv#{+area}"));
        assert!(area.required);

        let period = column(schema, "period");
        assert_eq!(period.value_url.as_deref(), Some("http://example.org/year/{+period}"));

        let marker = column(schema, "marker");
        assert_eq!(
            marker.value_url.as_deref(),
            Some("road-accidents.csv#attribute/marker/{+marker}")
        );
        assert!(!marker.required);

        assert!(column(schema, "notes").suppress_output);

        let value = column(schema, "value");
        assert_eq!(value.property_url.as_deref(), Some("road-accidents.csv#measure/{+measure}"));
        assert_eq!(value.datatype.as_deref(), Some("decimal"));
        assert!(value.required);
    }

    #[test]
    fn test_standard_code_list_and_foreign_key() {
        let mut cube = standard_cube();
        let output = CubeWriter::new().write(&mut cube).unwrap();

        assert_eq!(output.code_lists.len(), 1);
        assert_eq!(output.metadata.tables.len(), 2);
        assert_eq!(output.metadata.tables[1].url, "area.csv");
        assert!(output.metadata.tables[1].suppress_output);

        let keys = &schema(&output).foreign_keys;
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].column_reference, "area");
        assert_eq!(keys[0].reference.resource, "area.csv");
        assert_eq!(keys[0].reference.column_reference, KEY_COLUMN);
    }

    #[test]
    fn test_standard_data_is_standardised() {
        let mut cube = standard_cube();
        let output = CubeWriter::new().write(&mut cube).unwrap();
        let csv = output.csv.unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "north,2020,count,accidents,provisional,x,3");
        assert_eq!(lines[2], "south,2020,count,accidents,,,5");
    }

    #[test]
    fn test_standard_structure() {
        let mut cube = standard_cube();
        let output = CubeWriter::new().write(&mut cube).unwrap();
        let metadata = &output.metadata;

        let structure = metadata.node("road-accidents.csv#structure").unwrap();
        let components = structure.references(QB_COMPONENT);
        assert_eq!(components.len(), 6);

        let properties: Vec<&str> = components
            .iter()
            .map(|id| {
                let node = metadata.node(id).unwrap();
                node.reference(QB_DIMENSION)
                    .or_else(|| node.reference(QB_ATTRIBUTE))
                    .or_else(|| node.reference(QB_MEASURE))
                    .unwrap()
            })
            .collect();
        assert_eq!(
            properties,
            vec![
                "road-accidents.csv#dimension/area",
                "http://example.org/period",
                QB_MEASURE_TYPE,
                "road-accidents.csv#measure/count",
                SDMX_UNIT_MEASURE,
                "road-accidents.csv#attribute/marker",
            ]
        );

        let area = metadata.node("road-accidents.csv#dimension/area").unwrap();
        assert_eq!(area.reference(QB_CODE_LIST), Some("area.csv#code-list"));
        assert!(metadata.node("road-accidents.csv#unit/accidents").is_some());
        assert!(metadata.node("road-accidents.csv#attribute/marker/provisional").is_some());
        assert!(structure.reference(QB_SLICE_KEY_PROPERTY).is_none());
    }

    #[test]
    fn test_observation_not_required_with_status_column() {
        let mut cube = standard_cube();
        cube.columns.insert(
            5,
            Column::new("Status", Component::Attribute(Attribute::existing(SDMX_OBS_STATUS)))
                .with_uri_template("http://example.org/status/{+status}"),
        );
        cube.data = None;
        let output = CubeWriter::new().write(&mut cube).unwrap();
        assert!(!column(schema(&output), "value").required);
        assert!(output.csv.is_none());
    }

    #[test]
    fn test_pivoted_columns() {
        let mut cube = pivoted_cube();
        let output = CubeWriter::new().write(&mut cube).unwrap();
        assert_eq!(output.shape, CubeShape::Pivoted);
        let schema = schema(&output);

        assert_eq!(schema.about_url.as_deref(), Some("pivoted.csv#slice/{+area}"));
        assert_eq!(schema.primary_key, vec!["area"]);

        let count = column(schema, "count");
        assert_eq!(count.property_url.as_deref(), Some("pivoted.csv#measure/count"));
        assert_eq!(count.about_url.as_deref(), Some("pivoted.csv#obs/{+area}@count"));

        let rate_unit = column(schema, "rate_unit");
        assert_eq!(rate_unit.about_url.as_deref(), Some("pivoted.csv#obs/{+area}@rate"));

        let virtuals: Vec<&str> = schema
            .columns
            .iter()
            .filter(|c| c.is_virtual)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            virtuals,
            vec![
                "virt_obs_count",
                "virt_obs_count_meas",
                "virt_obs_count_unit",
                "virt_dim_count_area",
                "virt_obs_count_type",
                "virt_dataSet_count",
                "virt_obs_rate",
                "virt_obs_rate_meas",
                "virt_dim_rate_area",
                "virt_obs_rate_type",
                "virt_dataSet_rate",
                "virt_slice",
                "virt_slice_structure",
            ]
        );
        let dim = column(schema, "virt_dim_count_area");
        assert_eq!(dim.property_url.as_deref(), Some("pivoted.csv#dimension/area"));
        assert_eq!(dim.value_url.as_deref(), Some("{+area}"));
    }

    #[test]
    fn test_pivoted_structure_has_slice_key() {
        let mut cube = pivoted_cube();
        let output = CubeWriter::new().write(&mut cube).unwrap();
        let metadata = &output.metadata;

        let structure = metadata.node("pivoted.csv#structure").unwrap();
        assert_eq!(structure.reference(QB_SLICE_KEY_PROPERTY), Some("pivoted.csv#slice/cross-measures"));
        let slice_key = metadata.node("pivoted.csv#slice/cross-measures").unwrap();
        assert_eq!(slice_key.references(QB_COMPONENT_PROPERTY), vec!["pivoted.csv#dimension/area"]);

        // area, count, unit, rate, measure type
        assert_eq!(structure.references(QB_COMPONENT).len(), 5);
        assert!(metadata.node("pivoted.csv#unit/percent").is_some());
    }

    #[test]
    fn test_hybrid_cube_is_rejected() {
        let mut cube = pivoted_cube();
        cube.columns.push(Column::new(
            "Other",
            Component::ObservationValue(ObservationValue::standard()),
        ));
        let err = CubeWriter::new().write(&mut cube).unwrap_err();
        assert!(matches!(err, QubeError::UnsupportedShape(_)));
    }

    #[test]
    fn test_malformed_template_is_rejected() {
        let mut cube = standard_cube();
        cube.columns[1].uri_template = Some("http://example.org/{+year".to_string());
        let err = CubeWriter::new().write(&mut cube).unwrap_err();
        assert!(matches!(err, QubeError::MalformedUriTemplate { .. }));
    }

    fn two_geographies(area_list: Option<&str>, region_list: Option<&str>) -> Cube {
        let coded = |title: &str, list_label: Option<&str>| {
            let mut list = NewCodeList::new(vec![Concept::new("North"), Concept::new("South")]);
            list.label = list_label.map(String::from);
            Column::new(
                title,
                Component::Dimension(Dimension::New(
                    NewDimension::new(title).with_code_list(CodeList::New(list)),
                )),
            )
        };
        Cube::new(
            CatalogMetadata::new("Geographies"),
            vec![
                coded("Area", area_list),
                coded("Region", region_list),
                Column::new(
                    "Count",
                    Component::ObservationValue(ObservationValue::pivoted(
                        Measure::new("Count"),
                        Some(Unit::new("People")),
                    )),
                ),
            ],
        )
        .with_data(make_table(
            vec!["Area", "Region", "Count"],
            vec![vec!["North", "South", "1"], vec!["South", "North", "2"]],
        ))
    }

    #[test]
    fn test_code_list_files_are_distinct() {
        let mut cube = two_geographies(None, Some("Regions"));
        let output = CubeWriter::new().write(&mut cube).unwrap();

        let files: Vec<String> = output.code_lists.iter().map(|c| c.uris.csv_file()).collect();
        assert_eq!(files, vec!["area.csv", "regions.csv"]);

        let keys: Vec<&str> = schema(&output)
            .foreign_keys
            .iter()
            .map(|k| k.reference.resource.as_str())
            .collect();
        assert_eq!(keys, vec!["area.csv", "regions.csv"]);
    }

    #[test]
    fn test_code_lists_sharing_a_name_are_rejected() {
        let mut cube = two_geographies(Some("Geography"), Some("Geography"));
        let err = CubeWriter::new().write(&mut cube).unwrap_err();
        match err {
            QubeError::Resolution(ResolveError::LabelCollision { labels, token, .. }) => {
                assert_eq!(labels, vec!["Area", "Region"]);
                assert_eq!(token, "geography");
            }
            other => panic!("expected a label collision, got {other:?}"),
        }
    }

    #[test]
    fn test_non_latin_code_list_label_is_rejected() {
        let mut cube = two_geographies(Some("地域"), None);
        let err = CubeWriter::new().write(&mut cube).unwrap_err();
        assert!(matches!(
            err,
            QubeError::Resolution(ResolveError::EmptyToken { ref label }) if label == "地域"
        ));
    }

    #[test]
    fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut cube = standard_cube();
        let written = CubeWriter::new().write(&mut cube).unwrap().save(dir.path()).unwrap();
        assert_eq!(written.len(), 5);
        assert!(dir.path().join("road-accidents.csv").exists());
        assert!(dir.path().join("road-accidents.csv-metadata.json").exists());

        let back = CsvwMetadata::load(dir.path().join("road-accidents.csv-metadata.json")).unwrap();
        assert_eq!(back.tables.len(), 2);
        assert!(back.node("road-accidents.csv#dataset").is_some());
    }
}
