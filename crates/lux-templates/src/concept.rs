//! Templates returning concepts.

use lux_core::{QueryNode, Scope};

/// Direct children of concept `id` in its hierarchy.
pub fn concepts_narrower(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Concept, "broader", id)
}

pub fn concepts_broader(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Concept, "narrower", id)
}

/// Concepts used to classify works created by agent `id`.
pub fn concepts_classifying_works_by_agent(id: &str) -> QueryNode {
    QueryNode::hop(
        Scope::Concept,
        "classificationOfWork",
        QueryNode::hop_id(Scope::Work, "createdBy", id),
    )
}
