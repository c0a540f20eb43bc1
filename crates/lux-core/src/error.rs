//! Error types for lux-core.
//!
//! [`QueryError`] covers everything a caller of the compiler can get back;
//! [`SchemaError`] covers registry loading and is only seen at startup.

use crate::scope::Scope;
use thiserror::Error;

/// Result type alias for compilation.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors returned while compiling a term or checking a query tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The scope name is not one of the declared entity kinds.
    #[error("unknown scope: {0}")]
    UnknownScope(String),

    /// The term is not declared in the scope's term table.
    #[error("unknown term {term:?} in scope {scope}")]
    UnknownTerm { scope: Scope, term: String },

    /// The supplied value does not have the shape the term's pattern needs.
    #[error("invalid value for {scope}.{term}: {reason}")]
    InvalidValue {
        scope: Scope,
        term: String,
        reason: String,
    },

    /// A related-list expansion asked for more levels than the term allows
    /// and clamping was disabled.
    #[error("{scope}.{term} allows at most {max} levels, {requested} requested")]
    TraversalBoundExceeded {
        scope: Scope,
        term: String,
        requested: u8,
        max: u8,
    },

    /// A wire-form query document is not shaped as a query: a non-object
    /// root, a root without `_scope`, or a `multi` root that is not a single
    /// boolean over scoped branches.
    #[error("malformed query document: {0}")]
    MalformedDocument(String),
}

impl QueryError {
    pub fn unknown_term(scope: Scope, term: impl Into<String>) -> Self {
        QueryError::UnknownTerm {
            scope,
            term: term.into(),
        }
    }

    pub fn invalid_value(scope: Scope, term: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidValue {
            scope,
            term: term.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for registry loading.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Errors raised while loading or validating the term registry.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Registry document is not valid JSON or has the wrong shape.
    #[error("registry JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An extension registry file could not be read.
    #[error("cannot read registry file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A registry document keys a term table by an undeclared scope.
    #[error("registry declares unknown scope {0:?}")]
    UnknownScope(String),

    /// The term-name index could not be built.
    #[error("term index error: {0}")]
    Index(#[from] fst::Error),

    /// A term definition is missing an attribute its pattern requires.
    #[error("{scope}.{term}: {reason}")]
    InvalidDefinition {
        scope: Scope,
        term: String,
        reason: String,
    },

    /// A term points at a scope that has no term table.
    #[error("{scope}.{term} targets scope {target}, which has no term table")]
    DanglingScope {
        scope: Scope,
        term: String,
        target: Scope,
    },

    /// A declared inverse term is missing or does not traverse back.
    #[error("{scope}.{term} declares inverse {target}.{inverse}: {reason}")]
    BrokenInverse {
        scope: Scope,
        term: String,
        target: Scope,
        inverse: String,
        reason: String,
    },

    /// A related-list term has no path to its target within its bound.
    #[error("{scope}.{term} cannot reach {target} within {max_level} levels")]
    UnreachableTarget {
        scope: Scope,
        term: String,
        target: Scope,
        max_level: u8,
    },
}

impl SchemaError {
    pub fn invalid_definition(scope: Scope, term: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidDefinition {
            scope,
            term: term.into(),
            reason: reason.into(),
        }
    }
}
