//! Templates returning sets (collections, archives, exhibitions).

use lux_core::{QueryNode, Scope};

/// Sets created by, published by, or about agent `id`.
pub fn sets_related_to_agent(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop_id(Scope::Set, "createdBy", id),
        QueryNode::hop_id(Scope::Set, "publishedBy", id),
        QueryNode::hop_id(Scope::Set, "aboutAgent", id),
    ])
}

/// Direct members of set `id`: objects and nested sets.
pub fn set_items_and_subsets(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop_id(Scope::Item, "memberOf", id),
        QueryNode::hop_id(Scope::Set, "memberOf", id),
    ])
}

pub fn sets_containing_item(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Set, "containingItem", id)
}

pub fn sets_used_for_event(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Set, "usedForEvent", id)
}
