//! Collision-checked resolution of labels within a scope.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use super::token::Token;

/// Tokens a concept may not take: `code-list` names the scheme itself
/// within a code list's namespace.
pub const RESERVED_TOKENS: &[&str] = &["code-list"];

/// Failure to turn a label into a usable token.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolveError {
    /// Distinct labels in one scope share a token.
    #[error("Labels {labels:?} in '{scope}' all resolve to the identifier '{token}'")]
    LabelCollision {
        labels: Vec<String>,
        scope: String,
        token: String,
    },

    /// A label resolves to a token reserved for structural use.
    #[error("Label '{label}' resolves to the reserved identifier '{token}'")]
    ReservedTokenUsed { label: String, token: String },

    /// A label has no URI-safe characters at all.
    #[error("Label '{label}' does not contain any URI-safe characters")]
    EmptyToken { label: String },
}

/// Resolves labels to tokens within a single scope.
///
/// Resolving the same label twice is fine. Resolving a second, different
/// label to a token already taken is a [`ResolveError::LabelCollision`].
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    scope: String,
    reserved: Vec<String>,
    seen: IndexMap<String, String>,
}

impl ScopeResolver {
    /// Create a resolver checking against [`RESERVED_TOKENS`].
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            reserved: RESERVED_TOKENS.iter().map(|t| t.to_string()).collect(),
            seen: IndexMap::new(),
        }
    }

    /// Replace the reserved token set.
    pub fn with_reserved(mut self, reserved: &[&str]) -> Self {
        self.reserved = reserved.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Name of the scope being resolved.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Resolve one label, remembering it for later collision checks.
    pub fn resolve(&mut self, label: &str) -> Result<Token, ResolveError> {
        let token = Token::resolve(label)?;

        if self.reserved.iter().any(|r| r == token.as_str()) {
            return Err(ResolveError::ReservedTokenUsed {
                label: label.to_string(),
                token: token.to_string(),
            });
        }

        match self.seen.get(token.as_str()) {
            Some(existing) if existing != label => Err(ResolveError::LabelCollision {
                labels: vec![existing.clone(), label.to_string()],
                scope: self.scope.clone(),
                token: token.to_string(),
            }),
            Some(_) => Ok(token),
            None => {
                self.seen.insert(token.to_string(), label.to_string());
                Ok(token)
            }
        }
    }

    /// Resolve a whole scope at once.
    ///
    /// Reports one collision per shared token listing every label involved,
    /// rather than one per conflicting pair.
    pub fn resolve_all<'a>(
        scope: impl Into<String>,
        labels: impl IntoIterator<Item = &'a str>,
        reserved: &[&str],
    ) -> Result<Vec<Token>, Vec<ResolveError>> {
        Self::resolve_keyed(scope, labels.into_iter().map(|l| (l, l)), reserved)
    }

    /// Like [`resolve_all`](Self::resolve_all), but each label brings the
    /// key its token is derived from (a concept's notation, for instance).
    pub fn resolve_keyed<'a>(
        scope: impl Into<String>,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
        reserved: &[&str],
    ) -> Result<Vec<Token>, Vec<ResolveError>> {
        let scope = scope.into();
        let mut by_token: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut errors = Vec::new();
        let mut tokens = Vec::new();

        for (label, key) in entries {
            let token = match Token::resolve(key) {
                Ok(token) => token,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            if reserved.contains(&token.as_str()) {
                errors.push(ResolveError::ReservedTokenUsed {
                    label: label.to_string(),
                    token: token.to_string(),
                });
                continue;
            }
            let labels = by_token.entry(token.to_string()).or_default();
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
            tokens.push(token);
        }

        for (token, labels) in by_token {
            if labels.len() > 1 {
                errors.push(ResolveError::LabelCollision {
                    labels,
                    scope: scope.clone(),
                    token,
                });
            }
        }

        if errors.is_empty() {
            Ok(tokens)
        } else {
            Err(errors)
        }
    }
}
