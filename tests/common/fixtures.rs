//! Registry fixtures and sample identifiers used across harnesses.

use lux_core::{Scope, ScopeSchema, TermDefinition, TermPattern};
use lux_query::Service;
use std::sync::OnceLock;

pub const AGENT_ID: &str = "https://lux.collections.yale.edu/data/person/agent-9";
pub const CONCEPT_ID: &str = "https://lux.collections.yale.edu/data/concept/concept-123";
pub const EVENT_ID: &str = "https://lux.collections.yale.edu/data/activity/event-7";
pub const ITEM_ID: &str = "https://lux.collections.yale.edu/data/object/item-42";
pub const SET_ID: &str = "https://lux.collections.yale.edu/data/set/set-1";

/// The built-in registry, parsed once per harness binary.
pub fn schema() -> &'static ScopeSchema {
    static SCHEMA: OnceLock<ScopeSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| ScopeSchema::builtin().expect("built-in registry must load"))
}

pub fn service() -> Service {
    Service::builtin().expect("built-in service must load")
}

/// Every `(scope, term)` in the built-in registry.
pub fn all_terms() -> Vec<(Scope, &'static TermDefinition)> {
    let schema = schema();
    schema
        .scopes()
        .flat_map(|scope| schema.terms(scope).map(move |term| (scope, term)))
        .collect()
}

/// Every related-list term with its declared bound.
pub fn related_terms() -> Vec<(Scope, &'static TermDefinition, u8)> {
    all_terms()
        .into_iter()
        .filter_map(|(scope, term)| match &term.pattern {
            TermPattern::RelatedList { max_level, .. } => Some((scope, term, *max_level)),
            _ => None,
        })
        .collect()
}

/// Extension document adding one hop pair between agents and places.
pub const EXTENSION_REGISTRY: &str = r#"{
  "agent": {
    "residedAt": {
      "pattern": "hopWithField",
      "predicates": ["residedAt"],
      "targetScope": "place",
      "inverseTermName": "residenceOf"
    }
  },
  "place": {
    "residenceOf": {
      "pattern": "hopWithField",
      "predicates": ["residenceOf"],
      "targetScope": "agent",
      "inverseTermName": "residedAt"
    }
  }
}"#;
