//! Validate command - report structural problems in a cube.

use std::path::PathBuf;

use colored::Colorize;
use qube::{CubeShape, ParserConfig, Qube, QubeConfig, StructuralError, ValidationConfig};
use serde::Serialize;

use super::{print_findings, CommandResult};
use crate::cli::Delimiter;

#[derive(Serialize)]
struct ValidateOutput<'a> {
    file: &'a str,
    rows: usize,
    shape: Option<CubeShape>,
    valid: bool,
    findings: &'a [StructuralError],
}

pub fn run(
    csv: PathBuf,
    definition: PathBuf,
    delimiter: Delimiter,
    single_observation_column: bool,
    json_output: bool,
    verbose: bool,
) -> CommandResult {
    let config = QubeConfig {
        parser: ParserConfig {
            delimiter: delimiter.0,
            ..ParserConfig::default()
        },
        validation: ValidationConfig {
            allow_multiple_observation_columns: !single_observation_column,
        },
        ..QubeConfig::default()
    };
    let qube = Qube::with_config(config);

    let (cube, source) = qube.load_cube(&csv, &definition)?;
    let report = qube.validate(&cube);

    if json_output {
        let output = ValidateOutput {
            file: &source.file,
            rows: source.row_count,
            shape: report.shape,
            valid: report.is_valid(),
            findings: &report.findings,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(report.is_valid());
    }

    println!(
        "{} {} ({} rows, {} columns)",
        "Validating".cyan().bold(),
        source.file.white(),
        source.row_count,
        source.column_count
    );
    if verbose {
        println!("  Definition: {}", definition.display());
        println!("  SHA-256:    {}", source.hash);
    }

    match report.shape {
        Some(shape) => println!("Shape: {}", shape.to_string().green()),
        None => println!("Shape: {}", "unsupported".red()),
    }
    println!();

    if report.is_valid() {
        println!("{}", "No structural problems found.".green().bold());
    } else {
        print_findings(&report.findings);
    }

    Ok(report.is_valid())
}
