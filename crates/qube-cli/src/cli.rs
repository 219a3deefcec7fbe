//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Qube: build, validate and inspect linked-data statistical cubes
#[derive(Parser)]
#[command(name = "qube")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a CSV against a cube definition and write it as CSV-W
    Build {
        /// Path to the data file
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Cube definition (JSON)
        #[arg(short, long, value_name = "JSON")]
        definition: PathBuf,

        /// Output directory (default: the CSV's directory followed by "out")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter of the data file
        #[arg(long, default_value = ",")]
        delimiter: Delimiter,

        /// Keep coded values that have no URI-safe mapping instead of failing
        #[arg(long)]
        lenient: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report structural problems without writing anything
    Validate {
        /// Path to the data file
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Cube definition (JSON)
        #[arg(short, long, value_name = "JSON")]
        definition: PathBuf,

        /// Field delimiter of the data file
        #[arg(long, default_value = ",")]
        delimiter: Delimiter,

        /// Reject cubes with more than one observation value column
        #[arg(long)]
        single_observation_column: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read a cube or code list back from its metadata document
    Inspect {
        /// Path to the -metadata.json document
        #[arg(value_name = "METADATA")]
        file: PathBuf,

        /// Read components whose definitions are missing instead of failing
        #[arg(long)]
        lenient: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// A single-byte field delimiter.
#[derive(Clone, Copy, Debug)]
pub struct Delimiter(pub u8);

impl std::str::FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tab" | "\\t" => Ok(Delimiter(b'\t')),
            _ if s.len() == 1 && s.is_ascii() => Ok(Delimiter(s.as_bytes()[0])),
            _ => Err(format!(
                "Invalid delimiter: {}. Use a single ASCII character or 'tab'.",
                s
            )),
        }
    }
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            b'\t' => write!(f, "tab"),
            b => write!(f, "{}", b as char),
        }
    }
}
