//! Bounded path enumeration for related-list terms.
//!
//! The relation graph is cyclic (agents create works that are about agents),
//! so enumeration iterates path length explicitly from 1 up to a hard cap
//! instead of recursing. Paths are simple: a scope is never entered twice,
//! the origin is never an intermediate, and intermediates come only from the
//! term's `inBetweenScopes`.
//!
//! Output order is deterministic: groups ascend by length; within a group
//! paths follow the declaration order of their intermediate scopes, then
//! term names.

use crate::schema::{ScopeSchema, TermDefinition};
use crate::scope::Scope;

/// One hop of a related path.
#[derive(Debug, Clone, Copy)]
pub struct HopStep<'a> {
    pub from: Scope,
    pub term: &'a TermDefinition,
    pub to: Scope,
}

/// A complete hop sequence from the origin to the related-list target.
#[derive(Debug, Clone)]
pub struct RelatedPath<'a> {
    pub steps: Vec<HopStep<'a>>,
}

impl RelatedPath<'_> {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Scopes entered after the origin, target included.
    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.steps.iter().map(|step| step.to)
    }
}

#[derive(Clone)]
struct Partial<'a> {
    at: Scope,
    visited: Vec<Scope>,
    steps: Vec<HopStep<'a>>,
}

impl<'a> Partial<'a> {
    fn extend(&self, term: &'a TermDefinition, to: Scope) -> Self {
        let mut next = self.clone();
        next.steps.push(HopStep {
            from: self.at,
            term,
            to,
        });
        next.visited.push(to);
        next.at = to;
        next
    }
}

/// Enumerate every path of length `1..=levels` from `origin` to `target`.
///
/// The result has one entry per length, index 0 holding length-1 paths. A
/// length with no path yields an empty group; enumeration stops early when
/// no partial path can be extended.
pub fn related_paths<'a>(
    schema: &'a ScopeSchema,
    origin: Scope,
    target: Scope,
    in_between: &[Scope],
    levels: u8,
) -> Vec<Vec<RelatedPath<'a>>> {
    let mut groups = Vec::with_capacity(levels as usize);
    let mut frontier = vec![Partial {
        at: origin,
        visited: vec![origin],
        steps: Vec::new(),
    }];

    for level in 1..=levels {
        let complete: Vec<RelatedPath<'a>> = frontier
            .iter()
            .flat_map(|partial| {
                schema
                    .hops_between(partial.at, target)
                    .map(move |term| RelatedPath {
                        steps: partial.extend(term, target).steps,
                    })
            })
            .collect();
        tracing::trace!(%origin, %target, level, paths = complete.len(), "related: level enumerated");
        groups.push(complete);

        if level == levels {
            break;
        }

        let mut next = Vec::new();
        for partial in &frontier {
            for &via in in_between {
                if via == target || partial.visited.contains(&via) {
                    continue;
                }
                for term in schema.hops_between(partial.at, via) {
                    next.push(partial.extend(term, via));
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    groups
}
