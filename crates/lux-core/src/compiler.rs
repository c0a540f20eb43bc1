//! QueryCompiler: expands `(scope, term, value)` into a query tree.
//!
//! Each term's declared [`TermPattern`] picks the expansion:
//!
//! | Pattern | Output |
//! |---------|--------|
//! | `documentId` | `Leaf{id: value}` |
//! | `indexedWord` / `indexedValue` | `Leaf{<index>: value}`, numeric when the term is |
//! | `text` | full-text `Leaf{<index>: value}` |
//! | `similar` | `Leaf{similar: {id}}` |
//! | `hopWithField` | `Hop{<predicate>: {id} \| nested}` |
//! | `relatedList` | `OR` of hop chains grouped by length, see [`traversal`] |
//!
//! The compiler borrows a validated [`ScopeSchema`] and holds no other state,
//! so one instance can serve concurrent requests.

use crate::config::CompilerConfig;
use crate::error::{QueryError, Result};
use crate::query::{Comparator, Hop, HopTarget, Leaf, LeafKind, LeafValue, QueryNode, Scalar};
use crate::schema::{ScalarType, ScopeSchema, TermDefinition, TermPattern};
use crate::scope::{QueryScope, Scope};
use crate::traversal::{self, RelatedPath};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The value a term is compiled against.
#[derive(Debug, Clone, PartialEq)]
pub enum TermValue {
    /// An entity identifier (resource URI or id).
    Identifier(String),
    Scalar(Scalar),
    /// A constraint on the entity a traversal reaches.
    Query(QueryNode),
}

impl TermValue {
    pub fn id(id: impl Into<String>) -> Self {
        TermValue::Identifier(id.into())
    }

    pub fn text(s: impl Into<String>) -> Self {
        TermValue::Scalar(Scalar::Text(s.into()))
    }

    pub fn number(n: i64) -> Self {
        TermValue::Scalar(Scalar::from(n))
    }

    fn shape(&self) -> &'static str {
        match self {
            TermValue::Identifier(_) => "an identifier",
            TermValue::Scalar(Scalar::Text(_)) => "a string",
            TermValue::Scalar(Scalar::Number(_)) => "a number",
            TermValue::Query(_) => "a nested query",
        }
    }
}

impl From<QueryNode> for TermValue {
    fn from(node: QueryNode) -> Self {
        TermValue::Query(node)
    }
}

/// Per-call knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Levels to expand for a `relatedList` term. `None` uses the term's
    /// `maxLevel`.
    pub related_levels: Option<u8>,
    /// Clamp `related_levels` to `maxLevel` instead of failing.
    pub clamp_related_levels: bool,
    /// Comparison for a numeric leaf.
    pub comparator: Option<Comparator>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            related_levels: None,
            clamp_related_levels: true,
            comparator: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Compiler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'s> {
    schema: &'s ScopeSchema,
    clamp_related_levels: bool,
}

impl<'s> QueryCompiler<'s> {
    pub fn new(schema: &'s ScopeSchema) -> Self {
        Self {
            schema,
            clamp_related_levels: true,
        }
    }

    pub fn with_config(schema: &'s ScopeSchema, config: &CompilerConfig) -> Self {
        Self {
            schema,
            clamp_related_levels: config.clamp_related_levels,
        }
    }

    pub fn schema(&self) -> &'s ScopeSchema {
        self.schema
    }

    /// Options this compiler applies when the caller passes none.
    pub fn default_options(&self) -> CompileOptions {
        CompileOptions {
            clamp_related_levels: self.clamp_related_levels,
            ..CompileOptions::default()
        }
    }

    /// Compile `term` of `scope` against `value`.
    pub fn compile(&self, scope: Scope, term: &str, value: TermValue) -> Result<QueryNode> {
        self.compile_with(scope, term, value, &self.default_options())
    }

    /// [`compile`](Self::compile) with the scope given by name.
    pub fn compile_named(&self, scope: &str, term: &str, value: TermValue) -> Result<QueryNode> {
        self.compile(scope.parse()?, term, value)
    }

    pub fn compile_with(
        &self,
        scope: Scope,
        term: &str,
        value: TermValue,
        options: &CompileOptions,
    ) -> Result<QueryNode> {
        let def = self.schema.lookup(scope, term)?;
        tracing::debug!(scope = %scope, term, pattern = def.pattern.name(), "compile: term");

        if options.comparator.is_some() && def.scalar_type != ScalarType::Number {
            return Err(invalid(scope, def, "comparisons need a numeric term"));
        }

        match &def.pattern {
            TermPattern::DocumentId => {
                let id = match value {
                    TermValue::Identifier(id) | TermValue::Scalar(Scalar::Text(id)) => id,
                    other => return Err(expected(scope, def, "an identifier", &other)),
                };
                Ok(leaf(scope, "id", LeafValue::Scalar(Scalar::Text(id)), LeafKind::Exact, None))
            }
            TermPattern::IndexedWord | TermPattern::IndexedValue => {
                let (scalar, kind) = match def.scalar_type {
                    ScalarType::Number => (self.numeric(scope, def, value)?, LeafKind::Number),
                    ScalarType::String => (textual(scope, def, value)?, LeafKind::Exact),
                };
                Ok(leaf(
                    scope,
                    def.wire_field(),
                    LeafValue::Scalar(scalar),
                    kind,
                    options.comparator,
                ))
            }
            TermPattern::Text => {
                let scalar = textual(scope, def, value)?;
                Ok(leaf(scope, def.wire_field(), LeafValue::Scalar(scalar), LeafKind::Text, None))
            }
            TermPattern::Similar => match value {
                TermValue::Identifier(id) => Ok(leaf(
                    scope,
                    def.wire_field(),
                    LeafValue::Identifier(id),
                    LeafKind::Similar,
                    None,
                )),
                other => Err(expected(scope, def, "an identifier", &other)),
            },
            TermPattern::HopWithField { target_scope, .. } => {
                let target = self.hop_target(scope, def, *target_scope, value)?;
                Ok(QueryNode::Hop(Hop {
                    scope,
                    field: def.wire_field().to_string(),
                    target,
                }))
            }
            TermPattern::RelatedList {
                target_scope,
                in_between_scopes,
                max_level,
            } => {
                let levels = resolve_levels(scope, def, *max_level, options)?;
                let terminal = self.hop_target(scope, def, *target_scope, value)?;
                let groups =
                    traversal::related_paths(self.schema, scope, *target_scope, in_between_scopes, levels);
                let branches: Vec<QueryNode> = groups
                    .iter()
                    .filter(|group| !group.is_empty())
                    .map(|group| QueryNode::or(group.iter().filter_map(|p| path_node(p, &terminal)).collect()))
                    .collect();
                tracing::debug!(
                    scope = %scope,
                    term = def.name.as_str(),
                    levels,
                    groups = branches.len(),
                    paths = groups.iter().map(Vec::len).sum::<usize>(),
                    "compile: related list expanded"
                );
                if branches.is_empty() {
                    return Err(invalid(scope, def, format!("no path to {target_scope} within {levels} levels")));
                }
                Ok(QueryNode::or(branches))
            }
        }
    }

    fn numeric(&self, scope: Scope, def: &TermDefinition, value: TermValue) -> Result<Scalar> {
        match value {
            TermValue::Scalar(n @ Scalar::Number(_)) => Ok(n),
            TermValue::Scalar(Scalar::Text(s)) => Scalar::parse_number(&s)
                .ok_or_else(|| invalid(scope, def, format!("{s:?} is not a number"))),
            other => Err(expected(scope, def, "a number", &other)),
        }
    }

    fn hop_target(
        &self,
        scope: Scope,
        def: &TermDefinition,
        target_scope: Scope,
        value: TermValue,
    ) -> Result<HopTarget> {
        match value {
            TermValue::Identifier(id) => Ok(HopTarget::Identifier(id)),
            TermValue::Query(node) => {
                let found = node
                    .check_scoping()
                    .map_err(|e| invalid(scope, def, e.to_string()))?;
                if found != QueryScope::Single(target_scope) {
                    return Err(invalid(
                        scope,
                        def,
                        format!("nested query must be scoped to {target_scope}, found {found}"),
                    ));
                }
                Ok(HopTarget::Node(Box::new(node)))
            }
            other => Err(expected(scope, def, "an identifier or nested query", &other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn leaf(
    scope: Scope,
    field: &str,
    value: LeafValue,
    kind: LeafKind,
    comparator: Option<Comparator>,
) -> QueryNode {
    QueryNode::Leaf(Leaf {
        scope,
        field: field.to_string(),
        value,
        kind,
        comparator,
    })
}

fn textual(scope: Scope, def: &TermDefinition, value: TermValue) -> Result<Scalar> {
    match value {
        TermValue::Scalar(Scalar::Text(s)) | TermValue::Identifier(s) => Ok(Scalar::Text(s)),
        TermValue::Scalar(Scalar::Number(n)) => Ok(Scalar::Text(n.to_string())),
        other => Err(expected(scope, def, "a string", &other)),
    }
}

fn resolve_levels(scope: Scope, def: &TermDefinition, max: u8, options: &CompileOptions) -> Result<u8> {
    match options.related_levels {
        None => Ok(max),
        Some(0) => Err(invalid(scope, def, "related level count must be positive")),
        Some(requested) if requested > max => {
            if options.clamp_related_levels {
                tracing::debug!(scope = %scope, term = def.name.as_str(), requested, max, "compile: levels clamped");
                Ok(max)
            } else {
                Err(QueryError::TraversalBoundExceeded {
                    scope,
                    term: def.name.clone(),
                    requested,
                    max,
                })
            }
        }
        Some(requested) => Ok(requested),
    }
}

/// Nest a path's hops innermost-last, ending at `terminal`.
fn path_node(path: &RelatedPath<'_>, terminal: &HopTarget) -> Option<QueryNode> {
    let (last, rest) = path.steps.split_last()?;
    let innermost = QueryNode::Hop(Hop {
        scope: last.from,
        field: last.term.wire_field().to_string(),
        target: terminal.clone(),
    });
    Some(
        rest.iter()
            .rev()
            .fold(innermost, |inner, step| QueryNode::hop(step.from, step.term.wire_field(), inner)),
    )
}

fn invalid(scope: Scope, def: &TermDefinition, reason: impl Into<String>) -> QueryError {
    QueryError::invalid_value(scope, def.name.as_str(), reason)
}

fn expected(scope: Scope, def: &TermDefinition, what: &str, got: &TermValue) -> QueryError {
    invalid(
        scope,
        def,
        format!("{} expects {what}, got {}", def.pattern.name(), got.shape()),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> ScopeSchema {
        ScopeSchema::builtin().unwrap()
    }

    #[test]
    fn hop_to_identifier() {
        let schema = schema();
        let node = QueryCompiler::new(&schema)
            .compile(Scope::Item, "classification", TermValue::id("concept:123"))
            .unwrap();
        assert_eq!(
            node.to_json(),
            json!({"_scope": "item", "classification": {"id": "concept:123"}})
        );
    }

    #[test]
    fn hop_to_nested_query() {
        let schema = schema();
        let compiler = QueryCompiler::new(&schema);
        let inner = compiler
            .compile(Scope::Agent, "nationality", TermValue::id("concept:dutch"))
            .unwrap();
        let node = compiler.compile(Scope::Work, "createdBy", inner.into()).unwrap();
        assert_eq!(
            node.to_json(),
            json!({"_scope": "work", "createdBy": {"nationality": {"id": "concept:dutch"}}})
        );
    }

    #[test]
    fn nested_query_in_wrong_scope_is_invalid() {
        let schema = schema();
        let compiler = QueryCompiler::new(&schema);
        let inner = compiler.compile(Scope::Place, "name", TermValue::text("Leiden")).unwrap();
        let err = compiler.compile(Scope::Work, "createdBy", inner.into()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { ref term, .. } if term == "createdBy"));
    }

    #[test]
    fn document_id_leaf() {
        let schema = schema();
        let node = QueryCompiler::new(&schema)
            .compile(Scope::Place, "id", TermValue::id("place:5"))
            .unwrap();
        assert_eq!(node.to_json(), json!({"_scope": "place", "id": "place:5"}));
    }

    #[test]
    fn indexed_word_uses_first_index_reference() {
        let schema = schema();
        let node = QueryCompiler::new(&schema)
            .compile(Scope::Agent, "name", TermValue::text("Rembrandt"))
            .unwrap();
        assert_eq!(node.to_json(), json!({"_scope": "agent", "agentName": "Rembrandt"}));
    }

    #[test]
    fn numeric_term_coerces_strings() {
        let schema = schema();
        let options = CompileOptions {
            comparator: Some(Comparator::Lt),
            ..CompileOptions::default()
        };
        let node = QueryCompiler::new(&schema)
            .compile_with(Scope::Work, "publishedDate", TermValue::text("1650"), &options)
            .unwrap();
        assert_eq!(
            node.to_json(),
            json!({"_scope": "work", "workPublicationDateLong": 1650, "_comp": "<"})
        );
    }

    #[test]
    fn numeric_term_rejects_words() {
        let schema = schema();
        let err = QueryCompiler::new(&schema)
            .compile(Scope::Item, "height", TermValue::text("tall"))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { .. }));
    }

    #[test]
    fn comparator_on_string_term_is_invalid() {
        let schema = schema();
        let options = CompileOptions {
            comparator: Some(Comparator::Gt),
            ..CompileOptions::default()
        };
        let err = QueryCompiler::new(&schema)
            .compile_with(Scope::Agent, "name", TermValue::text("a"), &options)
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { .. }));
    }

    #[test]
    fn text_leaf_is_flagged_full_text() {
        let schema = schema();
        let node = QueryCompiler::new(&schema)
            .compile(Scope::Concept, "text", TermValue::text("oil on canvas"))
            .unwrap();
        match node {
            QueryNode::Leaf(leaf) => {
                assert_eq!(leaf.kind, LeafKind::Text);
                assert_eq!(leaf.field, "conceptAnyText");
            }
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn similar_marker() {
        let schema = schema();
        let node = QueryCompiler::new(&schema)
            .compile(Scope::Item, "similar", TermValue::id("item:7"))
            .unwrap();
        assert_eq!(node.to_json(), json!({"_scope": "item", "similar": {"id": "item:7"}}));
    }

    #[test]
    fn hop_rejects_bare_scalar() {
        let schema = schema();
        let err = QueryCompiler::new(&schema)
            .compile(Scope::Item, "classification", TermValue::number(3))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { .. }));
    }

    #[test]
    fn related_list_rejects_bare_scalar() {
        let schema = schema();
        let err = QueryCompiler::new(&schema)
            .compile(Scope::Work, "relatedToEvent", TermValue::text("event:7"))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { .. }));
    }

    #[test]
    fn related_list_groups_by_length() {
        let schema = schema();
        let node = QueryCompiler::new(&schema)
            .compile(Scope::Work, "relatedToEvent", TermValue::id("event:7"))
            .unwrap();
        assert_eq!(
            node.to_json(),
            json!({"_scope": "work", "OR": [
                {"OR": [{"aboutEvent": {"id": "event:7"}}]},
                {"OR": [{"memberOf": {"usedForEvent": {"id": "event:7"}}}]},
                {"OR": [
                    {"carriedBy": {"memberOf": {"usedForEvent": {"id": "event:7"}}}},
                    {"shownBy": {"memberOf": {"usedForEvent": {"id": "event:7"}}}}
                ]}
            ]})
        );
    }

    #[test]
    fn related_levels_are_clamped_by_default() {
        let schema = schema();
        let compiler = QueryCompiler::new(&schema);
        let options = CompileOptions {
            related_levels: Some(9),
            ..compiler.default_options()
        };
        let clamped = compiler
            .compile_with(Scope::Work, "relatedToEvent", TermValue::id("event:7"), &options)
            .unwrap();
        let full = compiler
            .compile(Scope::Work, "relatedToEvent", TermValue::id("event:7"))
            .unwrap();
        assert_eq!(clamped, full);
    }

    #[test]
    fn related_levels_above_bound_fail_without_clamping() {
        let schema = schema();
        let options = CompileOptions {
            related_levels: Some(4),
            clamp_related_levels: false,
            comparator: None,
        };
        let err = QueryCompiler::new(&schema)
            .compile_with(Scope::Work, "relatedToEvent", TermValue::id("event:7"), &options)
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::TraversalBoundExceeded {
                scope: Scope::Work,
                term: "relatedToEvent".into(),
                requested: 4,
                max: 3,
            }
        );
    }

    #[test]
    fn config_can_disable_clamping() {
        let schema = schema();
        let compiler = QueryCompiler::with_config(
            &schema,
            &CompilerConfig {
                clamp_related_levels: false,
            },
        );
        let options = CompileOptions {
            related_levels: Some(5),
            ..compiler.default_options()
        };
        assert!(compiler
            .compile_with(Scope::Work, "relatedToEvent", TermValue::id("event:7"), &options)
            .is_err());
    }

    #[test]
    fn zero_levels_is_invalid() {
        let schema = schema();
        let options = CompileOptions {
            related_levels: Some(0),
            ..CompileOptions::default()
        };
        let err = QueryCompiler::new(&schema)
            .compile_with(Scope::Work, "relatedToEvent", TermValue::id("event:7"), &options)
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidValue { .. }));
    }

    #[test]
    fn unknown_term_and_scope() {
        let schema = schema();
        let compiler = QueryCompiler::new(&schema);
        assert_eq!(
            compiler.compile(Scope::Agent, "bogusTerm", TermValue::text("x")).unwrap_err(),
            QueryError::unknown_term(Scope::Agent, "bogusTerm")
        );
        assert_eq!(
            compiler.compile_named("person", "name", TermValue::text("x")).unwrap_err(),
            QueryError::UnknownScope("person".into())
        );
    }
}
