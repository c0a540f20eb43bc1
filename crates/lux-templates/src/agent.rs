//! Templates returning agents.

use lux_core::{QueryNode, Scope};

/// Members of the group `id`.
pub fn agents_member_of_group(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Agent, "memberOf", id)
}

/// Agents born, active or deceased at place `id`.
pub fn agents_associated_with_place(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop_id(Scope::Agent, "startAt", id),
        QueryNode::hop_id(Scope::Agent, "activeAt", id),
        QueryNode::hop_id(Scope::Agent, "endAt", id),
    ])
}

pub fn agents_with_occupation(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Agent, "occupation", id)
}

pub fn agents_with_nationality(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Agent, "nationality", id)
}

/// Agents who carried out an event that took place at `id`.
pub fn agents_carrying_out_events_at(id: &str) -> QueryNode {
    QueryNode::hop(
        Scope::Agent,
        "carriedOut",
        QueryNode::hop_id(Scope::Event, "tookPlaceAt", id),
    )
}
