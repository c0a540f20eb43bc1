//! lux-templates: curated, pre-composed query trees.
//!
//! Each template is a pure `fn(&str) -> QueryNode` from an entity identifier
//! to a tree rooted at a declared `_scope`. Templates are composed directly
//! from hop and boolean nodes rather than driven through the compiler, and
//! are grouped by the scope of the entities they return.
//!
//! ```text
//! TemplateLibrary::builtin().build("worksClassifiedAs", "concept:1")
//!   ──► {"_scope": "work", "classification": {"id": "concept:1"}}
//! ```

pub mod agent;
pub mod concept;
pub mod event;
pub mod item;
pub mod place;
pub mod set;
pub mod work;

use lux_core::QueryNode;
use phf::phf_map;

/// Concept marking a set as a level of an archival hierarchy.
pub const ARCHIVAL_HIERARCHY_CLASSIFICATION: &str = "http://vocab.getty.edu/aat/300375748";

pub type TemplateFn = fn(&str) -> QueryNode;

static TEMPLATES: phf::Map<&'static str, TemplateFn> = phf_map! {
    "agentsMemberOfGroup" => agent::agents_member_of_group as TemplateFn,
    "agentsAssociatedWithPlace" => agent::agents_associated_with_place as TemplateFn,
    "agentsWithOccupation" => agent::agents_with_occupation as TemplateFn,
    "agentsWithNationality" => agent::agents_with_nationality as TemplateFn,
    "agentsCarryingOutEventsAt" => agent::agents_carrying_out_events_at as TemplateFn,
    "conceptsNarrower" => concept::concepts_narrower as TemplateFn,
    "conceptsBroader" => concept::concepts_broader as TemplateFn,
    "conceptsClassifyingWorksByAgent" => concept::concepts_classifying_works_by_agent as TemplateFn,
    "eventsCarriedOutByAgent" => event::events_carried_out_by_agent as TemplateFn,
    "eventsUsingSet" => event::events_using_set as TemplateFn,
    "eventsAtPlace" => event::events_at_place as TemplateFn,
    "itemsProducedEncounteredByAgent" => item::items_produced_encountered_by_agent as TemplateFn,
    "itemsClassifiedAs" => item::items_classified_as as TemplateFn,
    "itemsMadeOf" => item::items_made_of as TemplateFn,
    "itemsInSet" => item::items_in_set as TemplateFn,
    "itemsProducedEncounteredAt" => item::items_produced_encountered_at as TemplateFn,
    "itemsCarryingWork" => item::items_carrying_work as TemplateFn,
    "currentItemAndSiblings" => item::current_item_and_siblings as TemplateFn,
    "placesPartOf" => place::places_part_of as TemplateFn,
    "placesOfAgent" => place::places_of_agent as TemplateFn,
    "setsRelatedToAgent" => set::sets_related_to_agent as TemplateFn,
    "setItemsAndSubsets" => set::set_items_and_subsets as TemplateFn,
    "setsContainingItem" => set::sets_containing_item as TemplateFn,
    "setsUsedForEvent" => set::sets_used_for_event as TemplateFn,
    "worksClassifiedAs" => work::works_classified_as as TemplateFn,
    "worksCreatedPublishedByAgent" => work::works_created_published_by_agent as TemplateFn,
    "worksAboutAgent" => work::works_about_agent as TemplateFn,
    "worksAboutConcept" => work::works_about_concept as TemplateFn,
    "worksCarriedByItem" => work::works_carried_by_item as TemplateFn,
    "worksInSet" => work::works_in_set as TemplateFn,
    "worksCreatedPublishedAt" => work::works_created_published_at as TemplateFn,
    "worksByCreatorNationality" => work::works_by_creator_nationality as TemplateFn,
    "onlineWorksInLanguage" => work::online_works_in_language as TemplateFn,
};

/// Name-indexed view over the built-in templates.
#[derive(Debug, Clone, Copy)]
pub struct TemplateLibrary {
    templates: &'static phf::Map<&'static str, TemplateFn>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateLibrary {
    pub fn builtin() -> Self {
        Self {
            templates: &TEMPLATES,
        }
    }

    pub fn get(&self, name: &str) -> Option<TemplateFn> {
        self.templates.get(name).copied()
    }

    /// Template names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.templates.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Run template `name` for `id`. `None` when no such template exists.
    pub fn build(&self, name: &str, id: &str) -> Option<QueryNode> {
        let template = self.get(name)?;
        tracing::debug!(template = name, id, "templates: building");
        Some(template(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_core::{QueryScope, Scope, ScopeSchema};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn every_template_conforms_to_the_builtin_registry() {
        let schema = ScopeSchema::builtin().unwrap();
        let library = TemplateLibrary::builtin();
        for name in library.names() {
            let node = library.build(name, "urn:test:1").unwrap();
            node.check_scoping()
                .unwrap_or_else(|e| panic!("{name}: {e}"));
            schema
                .conforms(&node)
                .unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn every_template_ends_at_its_identifier() {
        let library = TemplateLibrary::builtin();
        for name in library.names() {
            let node = library.build(name, "urn:test:1").unwrap();
            assert!(
                node.identifiers().contains(&"urn:test:1"),
                "{name} does not reference its identifier"
            );
        }
    }

    #[test]
    fn items_produced_or_encountered() {
        let node = TemplateLibrary::builtin()
            .build("itemsProducedEncounteredByAgent", "agent:9")
            .unwrap();
        assert_eq!(
            node.to_json(),
            json!({"_scope": "item", "OR": [
                {"producedBy": {"id": "agent:9"}},
                {"encounteredBy": {"id": "agent:9"}}
            ]})
        );
    }

    #[test]
    fn current_item_and_siblings_is_multi_scoped() {
        let node = item::current_item_and_siblings("item:42");
        let parent = json!({"AND": [
            {"classification": {"identifier": ARCHIVAL_HIERARCHY_CLASSIFICATION}},
            {"containingItem": {"id": "item:42"}}
        ]});
        assert_eq!(node.check_scoping(), Ok(QueryScope::Multi));
        assert_eq!(
            node.to_json(),
            json!({"_scope": "multi", "OR": [
                {"_scope": "item", "memberOf": parent},
                {"_scope": "set", "memberOf": parent}
            ]})
        );
    }

    #[rstest]
    #[case("agentsMemberOfGroup", Scope::Agent)]
    #[case("conceptsNarrower", Scope::Concept)]
    #[case("eventsUsingSet", Scope::Event)]
    #[case("itemsInSet", Scope::Item)]
    #[case("placesPartOf", Scope::Place)]
    #[case("setsRelatedToAgent", Scope::Set)]
    #[case("worksClassifiedAs", Scope::Work)]
    fn templates_return_their_scope(#[case] name: &str, #[case] scope: Scope) {
        let node = TemplateLibrary::builtin().build(name, "x:1").unwrap();
        assert_eq!(node.scope(), QueryScope::Single(scope));
    }

    #[test]
    fn unknown_template_is_none() {
        assert!(TemplateLibrary::builtin().build("noSuchTemplate", "x").is_none());
    }

    #[test]
    fn templates_are_deterministic() {
        let library = TemplateLibrary::builtin();
        for name in library.names() {
            assert_eq!(library.build(name, "a:1"), library.build(name, "a:1"));
        }
    }
}
