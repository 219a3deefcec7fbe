//! Label to token normalisation.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::resolver::ResolveError;

/// Reduce a label to its URI-safe form.
///
/// Accented letters are folded to their base letter first (NFKD, combining
/// marks dropped). The result is lowercase ASCII, with every run of
/// characters outside `[a-z0-9]` collapsed into a single `-` and no leading
/// or trailing `-`. Applying it to its own output returns the output unchanged.
pub fn uri_safe(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_dash = false;

    for ch in label.nfkd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Name of the CSV-W column for a token (`-` is not allowed in CSV-W names).
pub fn csvw_column_name(token: &str) -> String {
    token.replace('-', "_")
}

/// A resolved, non-empty URI-safe token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Resolve a label into a token.
    pub fn resolve(label: &str) -> Result<Self, ResolveError> {
        let token = uri_safe(label);
        if token.is_empty() {
            return Err(ResolveError::EmptyToken {
                label: label.to_string(),
            });
        }
        Ok(Token(token))
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The CSV-W column name derived from this token.
    pub fn column_name(&self) -> String {
        csvw_column_name(&self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
