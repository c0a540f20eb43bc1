//! Templates returning events.

use lux_core::{QueryNode, Scope};

pub fn events_carried_out_by_agent(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Event, "carriedOutBy", id)
}

/// Events (exhibitions, loans) that used the set `id`.
pub fn events_using_set(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Event, "used", id)
}

pub fn events_at_place(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Event, "tookPlaceAt", id)
}
