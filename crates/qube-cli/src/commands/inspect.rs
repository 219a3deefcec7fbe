//! Inspect command - read a cube or code list back from its metadata.

use std::path::PathBuf;

use colored::Colorize;
use qube::csvw::ComponentRole;
use qube::inspect::{CodeListSummary, CubeSummary};
use qube::{Inspection, Qube, QubeConfig, ReaderConfig, Strictness};

use super::CommandResult;

pub fn run(file: PathBuf, lenient: bool, json_output: bool, verbose: bool) -> CommandResult {
    let strictness = if lenient {
        Strictness::Lenient
    } else {
        Strictness::Strict
    };
    let config = QubeConfig {
        reader: ReaderConfig { strictness },
        ..QubeConfig::default()
    };

    let inspection = Qube::with_config(config).inspect(&file)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        return Ok(true);
    }

    match &inspection {
        Inspection::DataCube(cube) => print_cube(cube, verbose),
        Inspection::CodeList(code_list) => print_code_list(code_list, verbose),
    }
    Ok(true)
}

fn print_cube(cube: &CubeSummary, verbose: bool) {
    let title = cube.catalog.title.as_deref().unwrap_or("(untitled)");
    println!("{} {}", "Data cube".cyan().bold(), title.white().bold());
    println!("  CSV:       {}", cube.csv_url);
    println!("  Structure: {}", cube.structure_uri);
    println!("  Shape:     {}", cube.shape.to_string().green());
    if verbose {
        if let Some(issued) = &cube.catalog.issued {
            println!("  Issued:    {}", issued);
        }
        if let Some(license) = &cube.catalog.license {
            println!("  License:   {}", license);
        }
    }
    println!();

    for (role, heading) in [
        (ComponentRole::Dimension, "Dimensions:"),
        (ComponentRole::Attribute, "Attributes:"),
        (ComponentRole::Measure, "Measures:"),
    ] {
        let components: Vec<_> = cube.components_with_role(role).collect();
        if components.is_empty() {
            continue;
        }
        println!("{}", heading.yellow().bold());
        for component in components {
            let label = component.label.as_deref().unwrap_or(&component.property);
            let columns = if component.column_titles.is_empty() {
                String::new()
            } else {
                format!(" [{}]", component.column_titles.join(", "))
            };
            println!(
                "  {}. {}{}{}",
                component.order,
                label.white(),
                columns.dimmed(),
                if component.required { " (required)" } else { "" }
            );
            if verbose && component.label.is_some() {
                println!("     {}", component.property.dimmed());
            }
        }
        println!();
    }

    if !cube.units.is_empty() {
        println!("{}", "Units:".yellow().bold());
        for unit in &cube.units {
            let label = unit.label.as_deref().unwrap_or(&unit.unit_uri);
            match (&unit.base_unit_uri, unit.scaling_factor) {
                (Some(base), Some(factor)) => {
                    println!("  {} = {} x {}", label.white(), factor, base)
                }
                _ => println!("  {}", label.white()),
            }
        }
        println!();
    }

    if !cube.code_lists.is_empty() {
        println!("{}", "Code lists:".yellow().bold());
        for code_list in &cube.code_lists {
            println!(
                "  {} used by {}",
                code_list.code_list_uri.white(),
                code_list.column_titles.join(", ")
            );
        }
        println!();
    }

    if !cube.suppressed_columns.is_empty() {
        println!(
            "{} {}",
            "Suppressed columns:".yellow().bold(),
            cube.suppressed_columns.join(", ")
        );
    }
}

fn print_code_list(code_list: &CodeListSummary, verbose: bool) {
    let label = code_list
        .label
        .as_deref()
        .or(code_list.catalog.title.as_deref())
        .unwrap_or("(unlabelled)");
    println!("{} {}", "Code list".cyan().bold(), label.white().bold());
    println!("  CSV:    {}", code_list.csv_url);
    println!("  Scheme: {}", code_list.scheme_uri);
    println!();

    println!("{}", "Columns:".yellow().bold());
    for column in code_list.columns.iter().filter(|c| !c.is_virtual || verbose) {
        let title = column.title.as_deref().unwrap_or(&column.name);
        let property = column.property_url.as_deref().unwrap_or("-");
        println!("  {} -> {}", title.white(), property.dimmed());
    }
}
