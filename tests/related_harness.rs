#![allow(unused)]
//! Related-list integration harness.
//!
//! # What this covers
//!
//! - **Bound**: expanding a related list at `N` levels yields at most `N`
//!   length groups, and no hop chain longer than `N`.
//! - **Simple paths**: no chain revisits the origin scope or passes through
//!   a scope outside the term's `inBetweenScopes`.
//! - **Termination**: every chain ends at the supplied identifier or nested
//!   query.
//! - **Determinism**: the same request always produces the same tree.
//! - **Property: clamping** (proptest): any requested level count compiles
//!   when clamping is on, and fails exactly when it exceeds the bound when
//!   clamping is off.
//!
//! # Running
//!
//! ```sh
//! cargo test --test related_harness
//! ```

mod common;
use common::*;
use lux_core::traversal::related_paths;
use lux_core::{BoolOp, QueryError, QueryNode, Scope, TermPattern};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn groups_of(node: &QueryNode) -> &[QueryNode] {
    match node {
        QueryNode::Boolean(b) if b.op == BoolOp::Or => &b.children,
        other => panic!("related list did not compile to an OR: {}", other.to_json()),
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

#[test]
fn group_count_never_exceeds_requested_levels() {
    for (scope, term, max) in related_terms() {
        for levels in 1..=max {
            let Ok(node) = CompileRequest::new(scope, term.name.as_str())
                .id("urn:target")
                .levels(levels)
                .run(schema())
            else {
                // Not every term has a direct hop, so low levels can be empty.
                continue;
            };
            let groups = groups_of(&node);
            assert!(groups.len() <= levels as usize, "{scope}.{} at {levels}", term.name);
            for (fields, id) in hop_chains(&node) {
                assert!(fields.len() <= levels as usize, "{fields:?} longer than {levels}");
                assert_eq!(id.as_deref(), Some("urn:target"));
            }
        }
    }
}

#[test]
fn groups_ascend_by_chain_length() {
    let node = CompileRequest::new(Scope::Work, "relatedToEvent")
        .id(EVENT_ID)
        .run(schema())
        .unwrap();
    let lengths: Vec<Vec<usize>> = groups_of(&node)
        .iter()
        .map(|group| hop_chains(group).iter().map(|(f, _)| f.len()).collect())
        .collect();
    assert_eq!(lengths, vec![vec![1], vec![2], vec![3, 3]]);
}

#[test]
fn paths_stay_inside_declared_scopes() {
    let schema = schema();
    for (scope, term, max) in related_terms() {
        let TermPattern::RelatedList {
            target_scope,
            in_between_scopes,
            ..
        } = &term.pattern
        else {
            unreachable!();
        };
        let groups = related_paths(schema, scope, *target_scope, in_between_scopes, max);
        for path in groups.iter().flatten() {
            let scopes: Vec<Scope> = path.scopes().collect();
            let (last, intermediates) = scopes.split_last().unwrap();
            assert_eq!(last, target_scope);
            for via in intermediates {
                assert_ne!(*via, scope, "{scope}.{} revisits its origin", term.name);
                assert!(in_between_scopes.contains(via), "{scope}.{} passes {via}", term.name);
            }
        }
    }
}

#[test]
fn nested_target_constraint_terminates_every_chain() {
    let dutch = CompileRequest::new(Scope::Agent, "nationality")
        .id("concept:dutch")
        .run(schema())
        .unwrap();
    let node = CompileRequest::new(Scope::Item, "relatedToAgent")
        .nested(dutch)
        .run(schema())
        .unwrap();
    for (fields, id) in hop_chains(&node) {
        assert_eq!(fields.last().map(String::as_str), Some("nationality"));
        assert_eq!(id.as_deref(), Some("concept:dutch"));
    }
    assert_eq!(node.check_scoping().unwrap(), Scope::Item.into());
}

#[test]
fn expansion_is_deterministic() {
    for (scope, term, _) in related_terms() {
        let first = CompileRequest::new(scope, term.name.as_str()).id("urn:a").run(schema()).unwrap();
        let second = CompileRequest::new(scope, term.name.as_str()).id("urn:a").run(schema()).unwrap();
        assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn clamping_accepts_any_positive_level(levels in 1u8..=u8::MAX) {
        let clamped = CompileRequest::new(Scope::Work, "relatedToEvent")
            .id(EVENT_ID)
            .levels(levels)
            .run(schema());
        prop_assert!(clamped.is_ok());
        prop_assert!(groups_of(clamped.as_ref().unwrap()).len() <= 3);
    }

    #[test]
    fn unclamped_levels_fail_only_above_the_bound(levels in 1u8..=u8::MAX) {
        let result = CompileRequest::new(Scope::Work, "relatedToEvent")
            .id(EVENT_ID)
            .levels(levels)
            .no_clamp()
            .run(schema());
        if levels > 3 {
            let is_bound_error = matches!(result, Err(QueryError::TraversalBoundExceeded { .. }));
            prop_assert!(is_bound_error);
        } else {
            prop_assert!(result.is_ok());
        }
    }
}
