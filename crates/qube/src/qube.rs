//! Main Qube struct and public API.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::csvw::{CubeWriter, WriteOutput, WriterConfig};
use crate::error::{QubeError, Result};
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::inspect::{read, DocumentHandle, DocumentQueries, Inspection, ReaderConfig};
use crate::model::Cube;
use crate::shape::CubeShape;
use crate::validation::{StructuralError, ValidationConfig, ValidationEngine, ValidationReport};

/// Configuration for every stage of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct QubeConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Validation settings.
    pub validation: ValidationConfig,
    /// Writer settings.
    pub writer: WriterConfig,
    /// Reader settings.
    pub reader: ReaderConfig,
}

/// Result of building a cube from a CSV file and a definition.
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    /// Metadata about the source CSV.
    pub source: SourceMetadata,
    /// The detected shape, when classification succeeded.
    pub shape: Option<CubeShape>,
    /// Structural problems found. Nothing is written unless this is empty.
    pub findings: Vec<StructuralError>,
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
}

impl BuildResult {
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }
}

/// The main Qube pipeline: parse, validate, write and inspect.
pub struct Qube {
    config: QubeConfig,
    parser: Parser,
    validation: ValidationEngine,
    writer: CubeWriter,
}

impl Qube {
    /// Create a new Qube instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(QubeConfig::default())
    }

    /// Create a Qube instance with custom configuration.
    pub fn with_config(config: QubeConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        let validation = ValidationEngine::with_config(config.validation.clone());
        let writer = CubeWriter::with_config(config.writer.clone());

        Self {
            config,
            parser,
            validation,
            writer,
        }
    }

    pub fn config(&self) -> &QubeConfig {
        &self.config
    }

    /// Read a cube definition (catalog metadata and columns) from JSON.
    pub fn load_definition(&self, path: impl AsRef<Path>) -> Result<Cube> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| QubeError::io(path, e))?;
        let cube: Cube = serde_json::from_str(&text)?;
        debug!(path = %path.display(), columns = cube.columns.len(), "loaded cube definition");
        Ok(cube)
    }

    /// Parse a CSV and attach it to the definition read from `definition`.
    pub fn load_cube(
        &self,
        csv: impl AsRef<Path>,
        definition: impl AsRef<Path>,
    ) -> Result<(Cube, SourceMetadata)> {
        let (data, source) = self.parser.parse_file(csv)?;
        let cube = self.load_definition(definition)?.with_data(data);
        Ok((cube, source))
    }

    /// Detect the cube's shape and collect every structural finding.
    pub fn validate(&self, cube: &Cube) -> ValidationReport {
        self.validation.validate_cube(cube)
    }

    /// Serialize a cube that has already passed validation.
    pub fn write(&self, cube: &mut Cube) -> Result<WriteOutput> {
        self.writer.write(cube)
    }

    /// Parse, validate and, when the cube is valid, write it into `out_dir`.
    pub fn build(
        &self,
        csv: impl AsRef<Path>,
        definition: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<BuildResult> {
        let (mut cube, source) = self.load_cube(csv, definition)?;
        info!(file = %source.file, rows = source.row_count, "building cube");

        let report = self.validate(&cube);
        if !report.is_valid() {
            warn!(findings = report.findings.len(), "cube is invalid, nothing written");
            return Ok(BuildResult {
                source,
                shape: report.shape,
                findings: report.findings,
                written: Vec::new(),
            });
        }

        let output = self.write(&mut cube)?;
        let written = output.save(out_dir)?;
        info!(shape = %output.shape, files = written.len(), "cube built");

        Ok(BuildResult {
            source,
            shape: Some(output.shape),
            findings: Vec::new(),
            written,
        })
    }

    /// Read a cube or code list back from its `-metadata.json` document.
    pub fn inspect(&self, path: impl AsRef<Path>) -> Result<Inspection> {
        let path = path.as_ref();
        let queries = DocumentQueries::load(path)?;
        let handle = DocumentHandle::with_config(queries, self.config.reader.clone());
        let inspection = read(&handle)?;
        debug!(path = %path.display(), "document inspected");
        Ok(inspection)
    }
}

impl Default for Qube {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const DEFINITION: &str = r#"{
        "metadata": {"title": "Population"},
        "columns": [
            {"title": "Area", "definition": {"kind": "dimension", "type": "new", "label": "Area",
                "code_list": {"type": "new", "concepts": [{"label": "North"}, {"label": "South"}]}}},
            {"title": "Value", "definition": {"kind": "observation_value",
                "measure": {"type": "new", "label": "People"},
                "unit": {"type": "new", "label": "Count"}}}
        ]
    }"#;

    #[test]
    fn test_load_definition() {
        let file = create_test_file(DEFINITION);
        let cube = Qube::new().load_definition(file.path()).unwrap();
        assert_eq!(cube.metadata.title, "Population");
        assert_eq!(cube.columns.len(), 2);
        assert!(cube.data.is_none());
    }

    #[test]
    fn test_build_writes_valid_cube() {
        let csv = create_test_file("Area,Value\nNorth,1\nSouth,2\n");
        let definition = create_test_file(DEFINITION);
        let out = tempfile::tempdir().unwrap();

        let result = Qube::new()
            .build(csv.path(), definition.path(), out.path())
            .unwrap();

        assert!(result.is_valid());
        assert_eq!(result.shape, Some(CubeShape::Pivoted));
        assert_eq!(result.source.row_count, 2);
        assert!(out.path().join("population.csv").is_file());
        assert!(out.path().join("population.csv-metadata.json").is_file());
    }

    #[test]
    fn test_build_skips_write_on_findings() {
        let csv = create_test_file("Area,Value\nNorth,1\nWest,2\n");
        let definition = create_test_file(DEFINITION);
        let out = tempfile::tempdir().unwrap();

        let result = Qube::new()
            .build(csv.path(), definition.path(), out.path())
            .unwrap();

        assert!(!result.is_valid());
        assert_eq!(result.findings[0].kind(), "undefined_values");
        assert!(result.written.is_empty());
        assert!(!out.path().join("population.csv").exists());
    }

    #[test]
    fn test_missing_definition_is_io_error() {
        let err = Qube::new().load_definition("/nonexistent/definition.json").unwrap_err();
        assert!(matches!(err, QubeError::Io { .. }));
    }
}
