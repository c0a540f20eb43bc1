//! lux-core: term registry and query compiler for linked-art search.
//!
//! This crate turns `(scope, term, value)` requests into query trees in the
//! search executor's wire form, plus the relation labels shown next to
//! related lists.
//!
//! # Architecture
//!
//! ```text
//! registry JSON ──► ScopeSchema ──► QueryCompiler ──► QueryNode ──► wire JSON
//!                       │                 │
//!                       └──► traversal ◄──┘
//!
//! RelationLabelTable ──► RelationResolver ──► display label
//! ```
//!
//! Everything is built once at startup and read-only afterwards; no type
//! here holds interior mutability.

pub mod compiler;
pub mod config;
pub mod document;
pub mod error;
pub mod labels;
pub mod query;
pub mod schema;
pub mod scope;
pub mod traversal;

pub use compiler::{CompileOptions, QueryCompiler, TermValue};
pub use config::Config;
pub use error::{QueryError, Result, SchemaError, SchemaResult};
pub use labels::{fallback_label, RelationLabelTable, RelationResolver};
pub use query::{BoolOp, Comparator, Hop, HopTarget, Leaf, LeafKind, LeafValue, QueryNode, Scalar};
pub use schema::{ScopeSchema, SchemaBuilder, TermDefinition, TermPattern};
pub use scope::{QueryScope, Scope};
