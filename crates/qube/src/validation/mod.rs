//! Validation engine for structural problems in a cube.

mod finding;
mod rules;

use serde::Serialize;
use tracing::debug;

use crate::model::Cube;
use crate::shape::{CubeShape, ShapeError};

pub use finding::{StructuralError, MAX_REPORTED_VALUES};
pub use rules::{
    CodeListRule, ColumnRule, IdentifierRule, MissingObservationRule, Rule, ShapeRule,
    UndefinedValuesRule, UriTemplateRule, ValidationContext,
};

/// Validation settings.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Whether a cube may have more than one observation-value column.
    /// When false, a second column is reported before any shape check runs.
    pub allow_multiple_observation_columns: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allow_multiple_observation_columns: true,
        }
    }
}

/// Outcome of validating one cube.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// The detected shape, when classification succeeded.
    pub shape: Option<CubeShape>,
    pub findings: Vec<StructuralError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Runs every rule over a cube and collects the findings.
pub struct ValidationEngine {
    config: ValidationConfig,
    rules: Vec<Box<dyn Rule>>,
}

impl ValidationEngine {
    /// Create a new validation engine with all default rules.
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            rules: vec![
                Box::new(ColumnRule),
                Box::new(IdentifierRule),
                Box::new(CodeListRule),
                Box::new(ShapeRule),
                Box::new(UriTemplateRule),
                Box::new(UndefinedValuesRule),
                Box::new(MissingObservationRule),
            ],
        }
    }

    /// Run all rules against a cube whose shape has already been detected.
    ///
    /// Findings come back in rule order; nothing is deduplicated or sorted.
    pub fn validate(
        &self,
        cube: &Cube,
        shape: &Result<CubeShape, ShapeError>,
    ) -> Vec<StructuralError> {
        let ctx = ValidationContext {
            cube,
            shape,
            config: &self.config,
        };

        let mut findings = Vec::new();
        for rule in &self.rules {
            let found = rule.check(&ctx);
            debug!(rule = rule.name(), findings = found.len(), "validation rule finished");
            findings.extend(found);
        }
        findings
    }

    /// Detect the cube's shape and validate it.
    pub fn validate_cube(&self, cube: &Cube) -> ValidationReport {
        let shape = cube.shape();
        let findings = self.validate(cube, &shape);
        ValidationReport {
            shape: shape.ok(),
            findings,
        }
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}
