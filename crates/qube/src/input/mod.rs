//! Input parsing and the tabular data abstraction.

mod parser;
mod source;

pub use parser::{Parser, ParserConfig};
pub use source::{Categorical, DataTable, SourceMetadata, TabularData};
