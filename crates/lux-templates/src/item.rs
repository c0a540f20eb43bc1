//! Templates returning objects, plus the item-or-set sibling listing.

use crate::ARCHIVAL_HIERARCHY_CLASSIFICATION;
use lux_core::{QueryNode, Scope};

/// Objects produced or encountered (found, collected) by agent `id`.
pub fn items_produced_encountered_by_agent(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop_id(Scope::Item, "producedBy", id),
        QueryNode::hop_id(Scope::Item, "encounteredBy", id),
    ])
}

pub fn items_classified_as(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Item, "classification", id)
}

pub fn items_made_of(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Item, "material", id)
}

pub fn items_in_set(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Item, "memberOf", id)
}

/// Objects produced or encountered at place `id`.
pub fn items_produced_encountered_at(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop_id(Scope::Item, "producedAt", id),
        QueryNode::hop_id(Scope::Item, "encounteredAt", id),
    ])
}

/// Objects carrying or showing work `id`.
pub fn items_carrying_work(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop_id(Scope::Item, "carries", id),
        QueryNode::hop_id(Scope::Item, "shows", id),
    ])
}

/// Items and sets filed in the same archival unit as item `id`.
///
/// The archival unit is the set classified as an archival hierarchy level
/// that contains `id`. Either kind may be a sibling, so the root is a
/// `multi` OR with one branch per scope.
pub fn current_item_and_siblings(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop(Scope::Item, "memberOf", archival_parent(id)),
        QueryNode::hop(Scope::Set, "memberOf", archival_parent(id)),
    ])
}

fn archival_parent(item: &str) -> QueryNode {
    QueryNode::and(vec![
        QueryNode::hop(
            Scope::Set,
            "classification",
            QueryNode::exact(Scope::Concept, "identifier", ARCHIVAL_HIERARCHY_CLASSIFICATION),
        ),
        QueryNode::hop_id(Scope::Set, "containingItem", item),
    ])
}
