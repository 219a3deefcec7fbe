//! URI-safe identifiers derived from human labels.

mod resolver;
mod token;

pub use resolver::{ResolveError, ScopeResolver, RESERVED_TOKENS};
pub use token::{csvw_column_name, uri_safe, Token};
