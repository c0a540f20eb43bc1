//! ScopeSchema: the per-scope term registry.
//!
//! The built-in registry is a JSON document embedded in the binary via
//! [`include_str!`]. Deployments layer generator output on top with
//! [`SchemaBuilder::layer_file`]; a later definition of the same
//! `(scope, term)` replaces the earlier one. The merged registry is
//! validated once in [`SchemaBuilder::build`] and is read-only afterwards,
//! so a single [`ScopeSchema`] can be shared across threads by reference.
//!
//! # Registry document shape
//!
//! ```text
//! { "<scope>": { "<termName>": { "pattern": "hopWithField",
//!                                "predicates": ["classification"],
//!                                "targetScope": "concept",
//!                                "inverseTermName": "classificationOfItem" } } }
//! ```

use crate::config::RegistryConfig;
use crate::error::{QueryError, Result, SchemaError, SchemaResult};
use crate::query::{HopTarget, QueryNode};
use crate::scope::{QueryScope, Scope};
use crate::traversal;
use fst::automaton::{Automaton, Str};
use fst::{IntoStreamer, Set};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_REGISTRY: &str = include_str!("registry/default.json");

// ---------------------------------------------------------------------------
// Raw (serde) types: mirror the JSON structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
enum RawPattern {
    DocumentId,
    IndexedWord,
    IndexedValue,
    Text,
    HopWithField,
    RelatedList,
    Similar,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTerm {
    pattern: RawPattern,
    #[serde(default)]
    predicates: Vec<String>,
    target_scope: Option<Scope>,
    inverse_term_name: Option<String>,
    #[serde(default)]
    index_references: Vec<String>,
    #[serde(default)]
    id_index_references: Vec<String>,
    scalar_type: Option<ScalarType>,
    #[serde(default)]
    in_between_scopes: Vec<Scope>,
    max_level: Option<u8>,
}

type RawRegistry = BTreeMap<String, BTreeMap<String, RawTerm>>;

impl RawTerm {
    fn into_definition(self, scope: Scope, name: String) -> SchemaResult<TermDefinition> {
        let require_target = |target: Option<Scope>| {
            target.ok_or_else(|| SchemaError::invalid_definition(scope, &name, "targetScope is required"))
        };

        let pattern = match self.pattern {
            RawPattern::DocumentId => TermPattern::DocumentId,
            RawPattern::IndexedWord => TermPattern::IndexedWord,
            RawPattern::IndexedValue => TermPattern::IndexedValue,
            RawPattern::Text => TermPattern::Text,
            RawPattern::Similar => TermPattern::Similar,
            RawPattern::HopWithField => {
                if self.predicates.is_empty() {
                    return Err(SchemaError::invalid_definition(
                        scope,
                        &name,
                        "hopWithField needs at least one predicate",
                    ));
                }
                TermPattern::HopWithField {
                    target_scope: require_target(self.target_scope)?,
                    predicates: self.predicates,
                    inverse_term_name: self.inverse_term_name,
                }
            }
            RawPattern::RelatedList => {
                let target_scope = require_target(self.target_scope)?;
                let max_level = match self.max_level {
                    Some(level) if level >= 1 => level,
                    _ => {
                        return Err(SchemaError::invalid_definition(
                            scope,
                            &name,
                            "relatedList needs a positive maxLevel",
                        ))
                    }
                };
                if target_scope == scope {
                    return Err(SchemaError::invalid_definition(
                        scope,
                        &name,
                        "relatedList cannot target its own scope",
                    ));
                }
                let mut seen = Vec::with_capacity(self.in_between_scopes.len());
                for via in &self.in_between_scopes {
                    if seen.contains(via) {
                        return Err(SchemaError::invalid_definition(
                            scope,
                            &name,
                            format!("inBetweenScopes lists {via} twice"),
                        ));
                    }
                    seen.push(*via);
                }
                TermPattern::RelatedList {
                    target_scope,
                    in_between_scopes: self.in_between_scopes,
                    max_level,
                }
            }
        };

        Ok(TermDefinition {
            name,
            pattern,
            index_references: self.index_references,
            id_index_references: self.id_index_references,
            scalar_type: self.scalar_type.unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Public term types
// ---------------------------------------------------------------------------

/// Scalar type of a leaf term's values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    #[default]
    String,
    Number,
}

/// Traversal pattern of a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermPattern {
    DocumentId,
    IndexedWord,
    IndexedValue,
    Text,
    Similar,
    /// A single relation hop. Extra predicates are alternative encodings of
    /// the same hop; the first one is the wire field.
    HopWithField {
        predicates: Vec<String>,
        target_scope: Scope,
        inverse_term_name: Option<String>,
    },
    /// Bounded multi-hop traversal to `target_scope` through
    /// `in_between_scopes`.
    RelatedList {
        target_scope: Scope,
        in_between_scopes: Vec<Scope>,
        max_level: u8,
    },
}

impl TermPattern {
    pub fn name(&self) -> &'static str {
        match self {
            TermPattern::DocumentId => "documentId",
            TermPattern::IndexedWord => "indexedWord",
            TermPattern::IndexedValue => "indexedValue",
            TermPattern::Text => "text",
            TermPattern::Similar => "similar",
            TermPattern::HopWithField { .. } => "hopWithField",
            TermPattern::RelatedList { .. } => "relatedList",
        }
    }
}

/// One named term of a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDefinition {
    pub name: String,
    pub pattern: TermPattern,
    /// Search indexes used for leaf matching. Opaque.
    pub index_references: Vec<String>,
    /// Search indexes used for fast identifier lookups. Opaque.
    pub id_index_references: Vec<String>,
    pub scalar_type: ScalarType,
}

impl TermDefinition {
    /// Scope reached by traversing this term, if it traverses at all.
    pub fn target_scope(&self) -> Option<Scope> {
        match &self.pattern {
            TermPattern::HopWithField { target_scope, .. }
            | TermPattern::RelatedList { target_scope, .. } => Some(*target_scope),
            _ => None,
        }
    }

    pub fn inverse_term_name(&self) -> Option<&str> {
        match &self.pattern {
            TermPattern::HopWithField {
                inverse_term_name, ..
            } => inverse_term_name.as_deref(),
            _ => None,
        }
    }

    pub fn is_hop(&self) -> bool {
        matches!(self.pattern, TermPattern::HopWithField { .. })
    }

    /// Field name this term writes on the wire.
    pub fn wire_field(&self) -> &str {
        match &self.pattern {
            TermPattern::DocumentId => "id",
            TermPattern::Similar => "similar",
            TermPattern::IndexedWord | TermPattern::IndexedValue | TermPattern::Text => self
                .index_references
                .first()
                .map(String::as_str)
                .unwrap_or(self.name.as_str()),
            TermPattern::HopWithField { predicates, .. } => predicates[0].as_str(),
            TermPattern::RelatedList { .. } => self.name.as_str(),
        }
    }
}

// ---------------------------------------------------------------------------
// ScopeSchema
// ---------------------------------------------------------------------------

/// Term table of one scope, with an FST over its term names.
#[derive(Debug)]
struct ScopeTable {
    terms: BTreeMap<String, TermDefinition>,
    names: Set<Vec<u8>>,
}

impl ScopeTable {
    fn new(terms: BTreeMap<String, TermDefinition>) -> SchemaResult<Self> {
        // BTreeMap keys iterate in byte order, which is what the FST needs.
        let names = Set::from_iter(terms.keys())?;
        Ok(Self { terms, names })
    }
}

/// The validated term registry.
#[derive(Debug)]
pub struct ScopeSchema {
    tables: BTreeMap<Scope, ScopeTable>,
}

impl ScopeSchema {
    /// The registry embedded in the binary.
    pub fn builtin() -> SchemaResult<Self> {
        SchemaBuilder::new().with_builtin()?.build()
    }

    /// The built-in registry plus every extension file named in `config`.
    pub fn load(config: &RegistryConfig) -> SchemaResult<Self> {
        let mut builder = SchemaBuilder::new().with_builtin()?;
        for path in &config.extensions {
            builder = builder.layer_file(path)?;
        }
        builder.build()
    }

    /// Look up a term definition.
    pub fn lookup(&self, scope: Scope, term: &str) -> Result<&TermDefinition> {
        self.tables
            .get(&scope)
            .and_then(|table| table.terms.get(term))
            .ok_or_else(|| QueryError::unknown_term(scope, term))
    }

    /// Look up a term by name, else by the field it writes on the wire, so
    /// `agentName` finds `agent.name`.
    pub fn resolve_field(&self, scope: Scope, field: &str) -> Result<&TermDefinition> {
        self.lookup(scope, field).or_else(|err| {
            self.terms(scope)
                .find(|term| term.wire_field() == field)
                .ok_or(err)
        })
    }

    /// [`lookup`](Self::lookup) with the scope given by name.
    pub fn lookup_named(&self, scope: &str, term: &str) -> Result<&TermDefinition> {
        self.lookup(scope.parse()?, term)
    }

    /// Scopes that have a term table.
    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.tables.keys().copied()
    }

    /// All terms of a scope, ordered by name.
    pub fn terms(&self, scope: Scope) -> impl Iterator<Item = &TermDefinition> + '_ {
        self.tables
            .get(&scope)
            .into_iter()
            .flat_map(|table| table.terms.values())
    }

    pub fn term_count(&self) -> usize {
        self.tables.values().map(|t| t.terms.len()).sum()
    }

    /// Term names of `scope` starting with `prefix`, in byte order.
    pub fn suggest(&self, scope: Scope, prefix: &str) -> Vec<String> {
        let Some(table) = self.tables.get(&scope) else {
            return Vec::new();
        };
        let matcher = Str::new(prefix).starts_with();
        table
            .names
            .search(matcher)
            .into_stream()
            .into_strs()
            .unwrap_or_default()
    }

    /// Single-hop terms of `from` whose target is `to`, ordered by name.
    pub fn hops_between(&self, from: Scope, to: Scope) -> impl Iterator<Item = &TermDefinition> + '_ {
        self.terms(from)
            .filter(move |term| term.is_hop() && term.target_scope() == Some(to))
    }

    /// The `(scope, term)` that walks `term` back, when one is declared.
    pub fn inverse_of(&self, scope: Scope, term: &str) -> Result<Option<(Scope, &TermDefinition)>> {
        let def = self.lookup(scope, term)?;
        match (def.target_scope(), def.inverse_term_name()) {
            (Some(target), Some(inverse)) => Ok(Some((target, self.lookup(target, inverse)?))),
            _ => Ok(None),
        }
    }

    /// Check that a tree only uses declared fields and that every nested
    /// hop target is scoped to the hop's target scope.
    pub fn conforms(&self, node: &QueryNode) -> Result<()> {
        match node {
            QueryNode::Leaf(leaf) => {
                let known = self.terms(leaf.scope).any(|term| {
                    !term.is_hop() && (term.name == leaf.field || term.wire_field() == leaf.field)
                });
                if known {
                    Ok(())
                } else {
                    Err(QueryError::unknown_term(leaf.scope, &leaf.field))
                }
            }
            QueryNode::Hop(hop) => {
                let term = self
                    .terms(hop.scope)
                    .find(|term| term.is_hop() && (term.wire_field() == hop.field || term.name == hop.field))
                    .ok_or_else(|| QueryError::unknown_term(hop.scope, &hop.field))?;
                let HopTarget::Node(inner) = &hop.target else {
                    return Ok(());
                };
                let target = term.target_scope().map(QueryScope::Single);
                if Some(inner.scope()) != target {
                    return Err(QueryError::invalid_value(
                        hop.scope,
                        &hop.field,
                        format!("nested query is scoped to {}", inner.scope()),
                    ));
                }
                self.conforms(inner)
            }
            QueryNode::Boolean(b) => b.children.iter().try_for_each(|child| self.conforms(child)),
        }
    }

    fn validate(&self) -> SchemaResult<()> {
        for (&scope, table) in &self.tables {
            for term in table.terms.values() {
                self.validate_term(scope, term)?;
            }
        }
        Ok(())
    }

    fn validate_term(&self, scope: Scope, term: &TermDefinition) -> SchemaResult<()> {
        if let Some(target) = term.target_scope() {
            if !self.tables.contains_key(&target) {
                return Err(SchemaError::DanglingScope {
                    scope,
                    term: term.name.clone(),
                    target,
                });
            }
        }

        match &term.pattern {
            TermPattern::HopWithField {
                target_scope,
                inverse_term_name: Some(inverse),
                ..
            } => {
                let broken = |reason: &str| SchemaError::BrokenInverse {
                    scope,
                    term: term.name.clone(),
                    target: *target_scope,
                    inverse: inverse.clone(),
                    reason: reason.to_string(),
                };
                let back = self
                    .tables
                    .get(target_scope)
                    .and_then(|t| t.terms.get(inverse))
                    .ok_or_else(|| broken("not declared"))?;
                if !back.is_hop() || back.target_scope() != Some(scope) {
                    return Err(broken("does not hop back to the originating scope"));
                }
                if let Some(back_inverse) = back.inverse_term_name() {
                    if back_inverse != term.name {
                        return Err(broken("declares a different inverse"));
                    }
                }
                Ok(())
            }
            TermPattern::RelatedList {
                target_scope,
                in_between_scopes,
                max_level,
            } => {
                if let Some(via) = in_between_scopes.iter().find(|s| !self.tables.contains_key(*s)) {
                    return Err(SchemaError::DanglingScope {
                        scope,
                        term: term.name.clone(),
                        target: *via,
                    });
                }
                let groups =
                    traversal::related_paths(self, scope, *target_scope, in_between_scopes, *max_level);
                if groups.iter().all(Vec::is_empty) {
                    return Err(SchemaError::UnreachableTarget {
                        scope,
                        term: term.name.clone(),
                        target: *target_scope,
                        max_level: *max_level,
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Layers registry documents and validates the result.
#[derive(Debug)]
pub struct SchemaBuilder {
    raw: RawRegistry,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    /// Start from an empty registry.
    pub fn new() -> Self {
        Self {
            raw: RawRegistry::new(),
        }
    }

    /// Merge the registry embedded in the binary.
    pub fn with_builtin(self) -> SchemaResult<Self> {
        self.layer_json(DEFAULT_REGISTRY)
    }

    /// Merge a registry document over what is already loaded.
    pub fn layer_json(mut self, src: &str) -> SchemaResult<Self> {
        let layer: RawRegistry = serde_json::from_str(src)?;
        let mut added = 0usize;
        for (scope, terms) in layer {
            added += terms.len();
            self.raw.entry(scope).or_default().extend(terms);
        }
        tracing::debug!(terms = added, "registry: layer merged");
        Ok(self)
    }

    /// Merge a registry document read from `path`.
    pub fn layer_file(self, path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), "registry: loading extension");
        self.layer_json(&src)
    }

    /// Convert, index and validate the merged registry.
    pub fn build(self) -> SchemaResult<ScopeSchema> {
        let mut tables = BTreeMap::new();
        for (scope_name, raw_terms) in self.raw {
            let scope: Scope = scope_name
                .parse()
                .map_err(|_| SchemaError::UnknownScope(scope_name.clone()))?;
            let mut terms = BTreeMap::new();
            for (name, raw) in raw_terms {
                let def = raw.into_definition(scope, name.clone())?;
                terms.insert(name, def);
            }
            tables.insert(scope, ScopeTable::new(terms)?);
        }

        let schema = ScopeSchema { tables };
        schema.validate()?;
        tracing::info!(
            scopes = schema.tables.len(),
            terms = schema.term_count(),
            "registry: loaded"
        );
        Ok(schema)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
