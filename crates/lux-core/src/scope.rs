//! Entity scopes of the linked-art knowledge graph.
//!
//! The set is closed: every term table, hop target and template result is
//! keyed by one of these eight kinds. Parsing an unknown name yields
//! [`QueryError::UnknownScope`](crate::error::QueryError::UnknownScope).

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An entity kind in the knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Agent,
    Concept,
    Event,
    Item,
    Place,
    Set,
    Work,
    Reference,
}

impl Scope {
    /// All scopes, in declaration order.
    pub const ALL: [Scope; 8] = [
        Scope::Agent,
        Scope::Concept,
        Scope::Event,
        Scope::Item,
        Scope::Place,
        Scope::Set,
        Scope::Work,
        Scope::Reference,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Agent => "agent",
            Scope::Concept => "concept",
            Scope::Event => "event",
            Scope::Item => "item",
            Scope::Place => "place",
            Scope::Set => "set",
            Scope::Work => "work",
            Scope::Reference => "reference",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| QueryError::UnknownScope(s.to_string()))
    }
}

/// Scope tag of a compiled tree: a single entity kind, or `multi` for a
/// root boolean whose branches return different kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    Single(Scope),
    Multi,
}

impl QueryScope {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryScope::Single(scope) => scope.as_str(),
            QueryScope::Multi => "multi",
        }
    }
}

impl std::fmt::Display for QueryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Scope> for QueryScope {
    fn from(scope: Scope) -> Self {
        QueryScope::Single(scope)
    }
}
