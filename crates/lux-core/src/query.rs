//! Query trees: the compiled artifact handed to the search executor.
//!
//! A [`QueryNode`] is built bottom-up and never mutated afterwards. Its
//! [`Serialize`] impl writes the executor's wire convention:
//!
//! ```text
//! {"_scope": "item", "OR": [{"producedBy": {"id": "agent:9"}},
//!                           {"encounteredBy": {"id": "agent:9"}}]}
//! ```
//!
//! `_scope` is written at the root and on each branch of a `multi` root.
//! Nested hop targets are implicitly scoped by the hop and carry no tag.

use crate::scope::{QueryScope, Scope};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A scalar leaf value. Numbers keep their JSON representation so `1900`
/// stays an integer on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    pub fn text(s: impl Into<String>) -> Self {
        Scalar::Text(s.into())
    }

    /// Parse a string as a number, preferring integers.
    pub fn parse_number(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return Some(Scalar::Number(n.into()));
        }
        s.parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Scalar::Number)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Text(s) => serializer.serialize_str(s),
            Scalar::Number(n) => n.serialize(serializer),
        }
    }
}

/// What a leaf matches against.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    Scalar(Scalar),
    /// Written as `{"id": ...}`.
    Identifier(String),
}

/// How the executor should treat a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Exact,
    Number,
    /// Full-text; tokenization happens engine-side.
    Text,
    Similar,
}

/// Numeric comparison applied to a `Number` leaf. Wire key `_comp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "==" => Comparator::Eq,
            "!=" => Comparator::Ne,
            "<" => Comparator::Lt,
            "<=" => Comparator::Le,
            ">" => Comparator::Gt,
            ">=" => Comparator::Ge,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// A direct field match.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub scope: Scope,
    pub field: String,
    pub value: LeafValue,
    pub kind: LeafKind,
    pub comparator: Option<Comparator>,
}

/// Where a hop ends: a bare identifier, or a further constraint on the
/// entity reached.
#[derive(Debug, Clone, PartialEq)]
pub enum HopTarget {
    Identifier(String),
    Node(Box<QueryNode>),
}

/// One relation traversal from `scope` through `field`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub scope: Scope,
    pub field: String,
    pub target: HopTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanNode {
    pub op: BoolOp,
    pub children: Vec<QueryNode>,
}

/// A compiled query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    Leaf(Leaf),
    Hop(Hop),
    Boolean(BooleanNode),
}

/// Scoping violations found by [`QueryNode::check_scoping`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopingError {
    #[error("boolean {0} node has no children")]
    EmptyBoolean(&'static str),
    #[error("nested {0} node mixes scopes; mixed scopes are only legal at the root")]
    NestedMulti(&'static str),
}

impl QueryNode {
    /// `{field: value}` exact match.
    pub fn exact(scope: Scope, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        QueryNode::Leaf(Leaf {
            scope,
            field: field.into(),
            value: LeafValue::Scalar(value.into()),
            kind: LeafKind::Exact,
            comparator: None,
        })
    }

    /// `{field: {id: id}}`.
    pub fn hop_id(scope: Scope, field: impl Into<String>, id: impl Into<String>) -> Self {
        QueryNode::Hop(Hop {
            scope,
            field: field.into(),
            target: HopTarget::Identifier(id.into()),
        })
    }

    /// `{field: <target>}` with `target` scoped to the entity reached.
    pub fn hop(scope: Scope, field: impl Into<String>, target: QueryNode) -> Self {
        QueryNode::Hop(Hop {
            scope,
            field: field.into(),
            target: HopTarget::Node(Box::new(target)),
        })
    }

    pub fn and(children: Vec<QueryNode>) -> Self {
        QueryNode::Boolean(BooleanNode {
            op: BoolOp::And,
            children,
        })
    }

    pub fn or(children: Vec<QueryNode>) -> Self {
        QueryNode::Boolean(BooleanNode {
            op: BoolOp::Or,
            children,
        })
    }

    /// Scope of the entities this tree returns. A boolean whose children
    /// disagree (or that has none) is `multi`.
    pub fn scope(&self) -> QueryScope {
        match self {
            QueryNode::Leaf(leaf) => QueryScope::Single(leaf.scope),
            QueryNode::Hop(hop) => QueryScope::Single(hop.scope),
            QueryNode::Boolean(b) => {
                let mut scopes = b.children.iter().map(QueryNode::scope);
                match scopes.next() {
                    Some(first) if scopes.all(|s| s == first) => first,
                    _ => QueryScope::Multi,
                }
            }
        }
    }

    /// Check that mixed-scope booleans appear only at the root and that no
    /// boolean is empty. Returns the root scope.
    pub fn check_scoping(&self) -> Result<QueryScope, ScopingError> {
        match self {
            QueryNode::Boolean(b) if b.children.is_empty() => {
                Err(ScopingError::EmptyBoolean(b.op.as_str()))
            }
            QueryNode::Boolean(b) if self.scope() == QueryScope::Multi => {
                for child in &b.children {
                    child.check_nested()?;
                }
                Ok(QueryScope::Multi)
            }
            _ => {
                self.check_nested()?;
                Ok(self.scope())
            }
        }
    }

    fn check_nested(&self) -> Result<(), ScopingError> {
        match self {
            QueryNode::Leaf(_) => Ok(()),
            QueryNode::Hop(hop) => match &hop.target {
                HopTarget::Identifier(_) => Ok(()),
                HopTarget::Node(node) => node.check_nested(),
            },
            QueryNode::Boolean(b) => {
                if b.children.is_empty() {
                    return Err(ScopingError::EmptyBoolean(b.op.as_str()));
                }
                if self.scope() == QueryScope::Multi {
                    return Err(ScopingError::NestedMulti(b.op.as_str()));
                }
                b.children.iter().try_for_each(QueryNode::check_nested)
            }
        }
    }

    /// Every identifier this tree ends at, in depth-first order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_identifiers(&mut out);
        out
    }

    fn collect_identifiers<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            QueryNode::Leaf(leaf) => {
                if let LeafValue::Identifier(id) = &leaf.value {
                    out.push(id);
                }
            }
            QueryNode::Hop(hop) => match &hop.target {
                HopTarget::Identifier(id) => out.push(id),
                HopTarget::Node(node) => node.collect_identifiers(out),
            },
            QueryNode::Boolean(b) => {
                for child in &b.children {
                    child.collect_identifiers(out);
                }
            }
        }
    }

    /// The wire form as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        // String keys and plain values only; this cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn write_condition<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        match self {
            QueryNode::Leaf(leaf) => {
                match &leaf.value {
                    LeafValue::Scalar(s) => map.serialize_entry(&leaf.field, s)?,
                    LeafValue::Identifier(id) => map.serialize_entry(&leaf.field, &IdRef { id })?,
                }
                if let Some(comp) = leaf.comparator {
                    map.serialize_entry("_comp", comp.as_str())?;
                }
                Ok(())
            }
            QueryNode::Hop(hop) => match &hop.target {
                HopTarget::Identifier(id) => map.serialize_entry(&hop.field, &IdRef { id }),
                HopTarget::Node(node) => map.serialize_entry(&hop.field, &Condition::nested(node)),
            },
            QueryNode::Boolean(b) => {
                let tag_children = self.scope() == QueryScope::Multi;
                map.serialize_entry(
                    b.op.as_str(),
                    &Branches {
                        children: &b.children,
                        tag_children,
                    },
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Wire serialization
// ---------------------------------------------------------------------------

impl Serialize for QueryNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Condition {
            node: self,
            tagged: true,
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
struct IdRef<'a> {
    id: &'a str,
}

struct Condition<'a> {
    node: &'a QueryNode,
    tagged: bool,
}

impl<'a> Condition<'a> {
    fn nested(node: &'a QueryNode) -> Self {
        Self {
            node,
            tagged: false,
        }
    }
}

impl Serialize for Condition<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if self.tagged {
            map.serialize_entry("_scope", self.node.scope().as_str())?;
        }
        self.node.write_condition(&mut map)?;
        map.end()
    }
}

struct Branches<'a> {
    children: &'a [QueryNode],
    tag_children: bool,
}

impl Serialize for Branches<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.children.len()))?;
        for node in self.children {
            seq.serialize_element(&Condition {
                node,
                tagged: self.tag_children,
            })?;
        }
        seq.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
