//! Qube: build, validate and inspect linked-data statistical cubes.
//!
//! A cube is a CSV of observations plus a structural description of its
//! columns (dimensions, attributes, measures and units). Qube classifies the
//! cube's shape, reports every structural problem it finds, and writes the
//! cube as CSV-W: the CSV alongside a `-metadata.json` document carrying the
//! RDF Data Cube structure definition. Written documents can be read back
//! for inspection.
//!
//! # Core Principles
//!
//! - **Findings, not failures**: structural problems are collected as values
//!   so a caller sees all of them at once
//! - **Stable identifiers**: every URI is derived from labels through a
//!   collision-checked URI-safe token
//! - **Two shapes**: standard (measure and unit columns) and pivoted (one
//!   observation column per measure); hybrids are rejected
//!
//! # Example
//!
//! ```no_run
//! use qube::Qube;
//!
//! let qube = Qube::new();
//! let result = qube.build("data.csv", "cube.json", "out").unwrap();
//!
//! for finding in &result.findings {
//!     println!("{}: {}", finding.kind(), finding);
//! }
//! println!("Files written: {}", result.written.len());
//! ```

pub mod csvw;
pub mod error;
pub mod identifier;
pub mod input;
pub mod inspect;
pub mod model;
pub mod shape;
pub mod validation;
pub mod vocab;

mod qube;

pub use crate::qube::{BuildResult, Qube, QubeConfig};
pub use csvw::{CubeWriter, Strictness, WriteOutput, WriterConfig};
pub use error::{QubeError, Result};
pub use identifier::{uri_safe, ResolveError, ScopeResolver, Token};
pub use input::{DataTable, Parser, ParserConfig, SourceMetadata, TabularData};
pub use inspect::{read, CubeSummary, DocumentHandle, DocumentQueries, Inspection, ReaderConfig};
pub use model::{CatalogMetadata, Column, Component, Cube};
pub use shape::{CubeShape, ShapeError};
pub use validation::{StructuralError, ValidationConfig, ValidationEngine, ValidationReport};
