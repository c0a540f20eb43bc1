//! Display labels for related-list relation keys.
//!
//! A key is `"<sourceTerm>-<targetTerm>"`, the pair of relations a related
//! list walks, e.g. `"classificationOfItem-producedBy"` on a concept page.
//! Labels come from, in order: deployment overrides, the curated table, and
//! a word split of the source term.

use crate::config::LabelsConfig;
use crate::error::{SchemaError, SchemaResult};
use phf::phf_map;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Label used when a key yields no words at all.
pub const DEFAULT_LABEL: &str = "Related";

static CURATED_LABELS: phf::Map<&'static str, &'static str> = phf_map! {
    // agent pages
    "created-aboutConcept" => "Created Works About",
    "created-classification" => "Created Works Classified As",
    "created-language" => "Created Works In Language",
    "created-createdAt" => "Created Works Created At",
    "published-aboutConcept" => "Published Works About",
    "published-classification" => "Published Works Classified As",
    "published-publishedAt" => "Published Works Published At",
    "subjectOfAgent-createdBy" => "Works About Them Created By",
    "subjectOfAgent-publishedBy" => "Works About Them Published By",
    "produced-classification" => "Produced Objects Classified As",
    "produced-material" => "Produced Objects Made Of",
    "produced-producedAt" => "Produced Objects Made At",
    "encountered-classification" => "Encountered Objects Classified As",
    "encountered-encounteredAt" => "Encountered Objects Found At",
    "carriedOut-tookPlaceAt" => "Events Carried Out At",
    "memberOf-activeAt" => "Groups Active At",
    // concept pages
    "classificationOfItem-producedBy" => "Objects Classified As This Produced By",
    "classificationOfItem-encounteredBy" => "Objects Classified As This Encountered By",
    "classificationOfWork-createdBy" => "Works Classified As This Created By",
    "classificationOfWork-publishedBy" => "Works Classified As This Published By",
    "classificationOfSet-createdBy" => "Collections Classified As This Created By",
    "materialOfItem-producedBy" => "Objects Made Of This Produced By",
    "subjectOfConcept-createdBy" => "Works About This Created By",
    "subjectOfConcept-aboutAgent" => "Works About This Also About",
    "languageOf-createdBy" => "Works In This Language Created By",
    // place pages
    "producedHere-producedBy" => "Objects Produced Here By",
    "encounteredHere-encounteredBy" => "Objects Encountered Here By",
    "createdHere-createdBy" => "Works Created Here By",
    "publishedHere-publishedBy" => "Works Published Here By",
    "subjectOfPlace-createdBy" => "Works About This Place Created By",
    // Same text as classificationOfWork-publishedBy; kept as shipped until
    // the content team confirms the intended wording.
    "subjectOfPlace-publishedBy" => "Works Classified As This Published By",
    "placeOfEvent-carriedOutBy" => "Events Here Carried Out By",
    // object and work pages
    "carriedBy-producedBy" => "Carried By Objects Produced By",
    "shownBy-producedBy" => "Shown By Objects Produced By",
    "carries-createdBy" => "Carries Works Created By",
    "shows-createdBy" => "Shows Works Created By",
    "memberOf-createdBy" => "Member Of Collections Created By",
    "memberOf-usedForEvent" => "Member Of Collections Used For",
    "aboutEvent-carriedOutBy" => "About Events Carried Out By",
    // set and event pages
    "containingItem-producedBy" => "Contains Objects Produced By",
    "containingWork-createdBy" => "Contains Works Created By",
    "used-createdBy" => "Used Collections Created By",
    "subjectOfEvent-createdBy" => "Works About This Event Created By",
};

static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("case boundary pattern is valid"));

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Curated labels plus deployment overrides.
#[derive(Debug, Clone, Default)]
pub struct RelationLabelTable {
    overrides: HashMap<String, String>,
}

impl RelationLabelTable {
    /// The curated table with no overrides.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Add overrides; an override wins over the curated label for its key.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Read a JSON object of overrides from `path`.
    pub fn load_overrides(self, path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let overrides: HashMap<String, String> = serde_json::from_str(&src)?;
        tracing::info!(path = %path.display(), entries = overrides.len(), "labels: overrides loaded");
        Ok(self.with_overrides(overrides))
    }

    pub fn from_config(config: &LabelsConfig) -> SchemaResult<Self> {
        match &config.overrides {
            Some(path) => Self::builtin().load_overrides(path),
            None => Ok(Self::builtin()),
        }
    }

    /// The configured label for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.overrides
            .get(key)
            .map(String::as_str)
            .or_else(|| CURATED_LABELS.get(key).copied())
    }

    /// Number of curated entries.
    pub fn curated_len(&self) -> usize {
        CURATED_LABELS.len()
    }

    /// Every curated key, in no particular order.
    pub fn curated_keys(&self) -> impl Iterator<Item = &'static str> {
        CURATED_LABELS.keys().copied()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Turns relation keys into display text. Never fails.
#[derive(Debug, Clone, Copy)]
pub struct RelationResolver<'t> {
    table: &'t RelationLabelTable,
}

impl<'t> RelationResolver<'t> {
    pub fn new(table: &'t RelationLabelTable) -> Self {
        Self { table }
    }

    pub fn resolve_label(&self, key: &str) -> String {
        match self.table.get(key) {
            Some(label) => label.to_string(),
            None => {
                tracing::trace!(key, "labels: no entry, deriving");
                fallback_label(key)
            }
        }
    }
}

/// Derive a label from the source term of `key`: split at case boundaries
/// and capitalise the first letter, so `"fooBar-baz"` becomes `"Foo Bar"`
/// and `"related to-x"` becomes `"Related to"`. A key with no
/// source term is split whole; a key with no words at all gets
/// [`DEFAULT_LABEL`].
pub fn fallback_label(key: &str) -> String {
    let source = key.split_once('-').map_or(key, |(left, _)| left);
    let words = if source.trim().is_empty() {
        split_words(&key.replace('-', " "))
    } else {
        split_words(source)
    };
    if words.is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        words
    }
}

fn split_words(s: &str) -> String {
    let spaced = CASE_BOUNDARY.replace_all(s, "$1 $2");
    capitalise(&spaced.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
