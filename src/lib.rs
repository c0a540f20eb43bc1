//! lux-query: search-term registry and query-tree compiler.
//!
//! This crate wires the workspace libraries into one read-only [`Service`]
//! built at startup, so the `luxq` binary and the integration harnesses
//! share the same construction path.
//!
//! # Architecture
//!
//! ```text
//! Config ──► Service ─┬─► ScopeSchema ──► QueryCompiler ──► QueryNode
//!                     ├─► TemplateLibrary ─────────────────► QueryNode
//!                     └─► RelationLabelTable ──► RelationResolver ──► label
//! ```

pub mod input;

pub use lux_core;
pub use lux_templates;

use anyhow::Context;
use lux_core::{Config, QueryCompiler, RelationLabelTable, RelationResolver, Scope, ScopeSchema};
use lux_templates::TemplateLibrary;

/// Process-wide, immutable state: the registry, labels and templates.
#[derive(Debug)]
pub struct Service {
    config: Config,
    schema: ScopeSchema,
    labels: RelationLabelTable,
    templates: TemplateLibrary,
}

impl Service {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let schema = ScopeSchema::load(&config.registry).context("loading term registry")?;
        let labels =
            RelationLabelTable::from_config(&config.labels).context("loading relation label overrides")?;
        let templates = TemplateLibrary::builtin();
        tracing::info!(
            terms = schema.term_count(),
            templates = templates.len(),
            labels = labels.curated_len(),
            "service: ready"
        );
        Ok(Self {
            config,
            schema,
            labels,
            templates,
        })
    }

    /// Built-in registry, labels and templates with default settings.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_config(Config::defaults())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schema(&self) -> &ScopeSchema {
        &self.schema
    }

    pub fn compiler(&self) -> QueryCompiler<'_> {
        QueryCompiler::with_config(&self.schema, &self.config.compiler)
    }

    pub fn resolver(&self) -> RelationResolver<'_> {
        RelationResolver::new(&self.labels)
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    /// Terms of `scope` that share the longest possible prefix with `term`.
    /// Empty when nothing shares even the first character.
    pub fn did_you_mean(&self, scope: Scope, term: &str) -> Vec<String> {
        let boundaries: Vec<usize> = term
            .char_indices()
            .map(|(i, _)| i)
            .skip(1)
            .chain([term.len()])
            .collect();
        for &end in boundaries.iter().rev() {
            let hits = self.schema.suggest(scope, &term[..end]);
            if !hits.is_empty() {
                return hits;
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn did_you_mean_narrows_to_the_longest_prefix() {
        let service = Service::builtin().unwrap();
        assert_eq!(service.did_you_mean(Scope::Work, "aboutAgnet"), vec!["aboutAgent"]);
        assert_eq!(service.did_you_mean(Scope::Item, "producedByy"), vec!["producedBy"]);
        assert!(service.did_you_mean(Scope::Reference, "zzz").is_empty());
    }
}
