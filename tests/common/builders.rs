//! Test builders: a fluent compile request.
//!
//! These builders are for readability in test assertions, not for production
//! use. `run` returns the compiler's `Result` so error cases read naturally.

use lux_core::{CompileOptions, Comparator, QueryCompiler, QueryNode, Scope, ScopeSchema, TermValue};

/// Fluent builder for a single `compile_with` call.
///
/// ```rust
/// let node = CompileRequest::new(Scope::Work, "relatedToEvent")
///     .id(EVENT_ID)
///     .levels(2)
///     .run(schema())
///     .unwrap();
/// ```
pub struct CompileRequest {
    scope: Scope,
    term: String,
    value: TermValue,
    options: CompileOptions,
}

impl CompileRequest {
    pub fn new(scope: Scope, term: impl Into<String>) -> Self {
        Self {
            scope,
            term: term.into(),
            value: TermValue::text(""),
            options: CompileOptions::default(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.value = TermValue::id(id);
        self
    }

    pub fn text(mut self, s: &str) -> Self {
        self.value = TermValue::text(s);
        self
    }

    pub fn number(mut self, n: i64) -> Self {
        self.value = TermValue::number(n);
        self
    }

    pub fn nested(mut self, node: QueryNode) -> Self {
        self.value = TermValue::Query(node);
        self
    }

    pub fn levels(mut self, levels: u8) -> Self {
        self.options.related_levels = Some(levels);
        self
    }

    pub fn no_clamp(mut self) -> Self {
        self.options.clamp_related_levels = false;
        self
    }

    pub fn comparator(mut self, comp: Comparator) -> Self {
        self.options.comparator = Some(comp);
        self
    }

    pub fn run(self, schema: &ScopeSchema) -> lux_core::Result<QueryNode> {
        QueryCompiler::new(schema).compile_with(self.scope, &self.term, self.value, &self.options)
    }
}
