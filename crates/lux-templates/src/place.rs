//! Templates returning places.

use lux_core::{QueryNode, Scope};

/// Places directly contained by place `id`.
pub fn places_part_of(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Place, "partOf", id)
}

/// Places where agent `id` was born, active or died.
pub fn places_of_agent(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop_id(Scope::Place, "startPlaceOfAgent", id),
        QueryNode::hop_id(Scope::Place, "activePlaceOfAgent", id),
        QueryNode::hop_id(Scope::Place, "endPlaceOfAgent", id),
    ])
}
