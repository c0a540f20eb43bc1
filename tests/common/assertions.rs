//! Domain-specific assertion macros for lux-query harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that name the
//! query shape that was violated.

use lux_core::{HopTarget, QueryNode};

/// Assert that a query tree serializes to the expected wire JSON.
///
/// ```rust
/// assert_wire!(node, {"_scope": "item", "classification": {"id": "c:1"}});
/// ```
#[macro_export]
macro_rules! assert_wire {
    ($node:expr, $($json:tt)+) => {{
        let node: &lux_core::QueryNode = &$node;
        pretty_assertions::assert_eq!(node.to_json(), serde_json::json!($($json)+));
    }};
}

/// Assert that a result is an error matching a `QueryError` pattern.
///
/// ```rust
/// assert_query_error!(result, QueryError::UnknownTerm { .. });
/// ```
#[macro_export]
macro_rules! assert_query_error {
    ($result:expr, $pattern:pat) => {{
        match $result {
            Err(err @ $pattern) => err,
            Err(other) => panic!(
                "assert_query_error! failed: expected {}, got error {:?}",
                stringify!($pattern),
                other
            ),
            Ok(node) => panic!(
                "assert_query_error! failed: expected {}, got query {}",
                stringify!($pattern),
                node.to_json()
            ),
        }
    }};
}

/// Every hop chain in a tree as `(fields, terminal identifier)`, depth-first.
pub fn hop_chains(node: &QueryNode) -> Vec<(Vec<String>, Option<String>)> {
    let mut out = Vec::new();
    collect_chains(node, Vec::new(), &mut out);
    out
}

fn collect_chains(node: &QueryNode, prefix: Vec<String>, out: &mut Vec<(Vec<String>, Option<String>)>) {
    match node {
        QueryNode::Leaf(leaf) => {
            let mut fields = prefix;
            fields.push(leaf.field.clone());
            out.push((fields, None));
        }
        QueryNode::Hop(hop) => {
            let mut fields = prefix;
            fields.push(hop.field.clone());
            match &hop.target {
                HopTarget::Identifier(id) => out.push((fields, Some(id.clone()))),
                HopTarget::Node(inner) => collect_chains(inner, fields, out),
            }
        }
        QueryNode::Boolean(b) => {
            for child in &b.children {
                collect_chains(child, prefix.clone(), out);
            }
        }
    }
}
