//! Build command - validate a cube and write it as CSV-W.

use std::path::PathBuf;

use colored::Colorize;
use qube::{ParserConfig, Qube, QubeConfig, Strictness, WriterConfig};

use super::{print_findings, CommandResult};
use crate::cli::Delimiter;

pub fn run(
    csv: PathBuf,
    definition: PathBuf,
    output: Option<PathBuf>,
    delimiter: Delimiter,
    lenient: bool,
    json_output: bool,
    verbose: bool,
) -> CommandResult {
    let out_dir = output.unwrap_or_else(|| {
        csv.parent()
            .map(|p| p.join("out"))
            .unwrap_or_else(|| PathBuf::from("out"))
    });

    let strictness = if lenient {
        Strictness::Lenient
    } else {
        Strictness::Strict
    };
    let config = QubeConfig {
        parser: ParserConfig {
            delimiter: delimiter.0,
            ..ParserConfig::default()
        },
        writer: WriterConfig { strictness },
        ..QubeConfig::default()
    };

    let result = Qube::with_config(config).build(&csv, &definition, &out_dir)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(result.is_valid());
    }

    println!(
        "{} {} ({} rows)",
        "Building".cyan().bold(),
        result.source.file.white(),
        result.source.row_count
    );
    if let Some(shape) = result.shape {
        println!("Shape: {}", shape.to_string().green());
    }
    println!();

    if !result.is_valid() {
        print_findings(&result.findings);
        println!();
        println!("{}", "Nothing was written.".yellow());
        return Ok(false);
    }

    println!(
        "{} {} file(s) to {}",
        "Wrote".green().bold(),
        result.written.len(),
        out_dir.display().to_string().white()
    );
    if verbose {
        for path in &result.written {
            println!("  {}", path.display());
        }
    }

    Ok(true)
}
