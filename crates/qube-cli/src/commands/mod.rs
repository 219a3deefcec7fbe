//! CLI command implementations.
//!
//! Each command returns `Ok(false)` when it ran but found structural
//! problems, so the process can exit non-zero without printing an error.

pub mod build;
pub mod inspect;
pub mod validate;

use colored::Colorize;
use qube::StructuralError;

pub type CommandResult = Result<bool, Box<dyn std::error::Error>>;

/// Print findings grouped under a heading, one per line.
pub fn print_findings(findings: &[StructuralError]) {
    println!(
        "{} {}",
        "Findings:".red().bold(),
        findings.len().to_string().white().bold()
    );
    for finding in findings {
        println!("  {} {}", format!("[{}]", finding.kind()).red(), finding);
    }
}
