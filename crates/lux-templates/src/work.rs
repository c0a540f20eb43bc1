//! Templates returning works.

use lux_core::{QueryNode, Scope};

pub fn works_classified_as(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Work, "classification", id)
}

/// Works created or published by agent `id`.
pub fn works_created_published_by_agent(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop_id(Scope::Work, "createdBy", id),
        QueryNode::hop_id(Scope::Work, "publishedBy", id),
    ])
}

pub fn works_about_agent(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Work, "aboutAgent", id)
}

pub fn works_about_concept(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Work, "aboutConcept", id)
}

/// Works carried or shown by object `id`.
pub fn works_carried_by_item(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop_id(Scope::Work, "carriedBy", id),
        QueryNode::hop_id(Scope::Work, "shownBy", id),
    ])
}

pub fn works_in_set(id: &str) -> QueryNode {
    QueryNode::hop_id(Scope::Work, "memberOf", id)
}

/// Works created or published at place `id`.
pub fn works_created_published_at(id: &str) -> QueryNode {
    QueryNode::or(vec![
        QueryNode::hop_id(Scope::Work, "createdAt", id),
        QueryNode::hop_id(Scope::Work, "publishedAt", id),
    ])
}

/// Works created by agents of nationality `id`.
pub fn works_by_creator_nationality(id: &str) -> QueryNode {
    QueryNode::hop(
        Scope::Work,
        "createdBy",
        QueryNode::hop_id(Scope::Agent, "nationality", id),
    )
}

/// Works in language `id` that are available online.
pub fn online_works_in_language(id: &str) -> QueryNode {
    QueryNode::and(vec![
        QueryNode::hop_id(Scope::Work, "language", id),
        QueryNode::exact(Scope::Work, "isOnline", 1i64),
    ])
}
