//! Command-line value parsing.
//!
//! A raw argument becomes a [`TermValue`] by these rules, first match wins:
//!
//! - `@<json>` is a nested condition object in the term's target scope
//! - `id:<x>` is the identifier `x`
//! - otherwise the term's pattern decides: traversals, `similar` and
//!   `documentId` take identifiers, numeric terms take numbers, the rest
//!   take strings

use anyhow::{bail, Context};
use lux_core::schema::ScalarType;
use lux_core::{QueryCompiler, Scalar, Scope, TermPattern, TermValue};
use std::path::Path;

pub fn parse_term_value(
    compiler: &QueryCompiler<'_>,
    scope: Scope,
    term: &str,
    raw: &str,
) -> anyhow::Result<TermValue> {
    let def = compiler.schema().lookup(scope, term)?;

    if let Some(json) = raw.strip_prefix('@') {
        let Some(target) = def.target_scope() else {
            bail!("{scope}.{term} does not traverse; nested queries are not allowed");
        };
        let cond: serde_json::Value =
            serde_json::from_str(json).with_context(|| format!("parsing nested query for {scope}.{term}"))?;
        return Ok(TermValue::Query(compiler.compile_condition(target, &cond)?));
    }
    if let Some(id) = raw.strip_prefix("id:") {
        return Ok(TermValue::id(id));
    }

    Ok(match &def.pattern {
        TermPattern::DocumentId
        | TermPattern::Similar
        | TermPattern::HopWithField { .. }
        | TermPattern::RelatedList { .. } => TermValue::id(raw),
        _ if def.scalar_type == ScalarType::Number => match Scalar::parse_number(raw) {
            Some(n) => TermValue::Scalar(n),
            None => TermValue::text(raw),
        },
        _ => TermValue::text(raw),
    })
}

/// Read a query document given inline or as `@path`.
pub fn read_document(arg: &str) -> anyhow::Result<serde_json::Value> {
    let src = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("reading query document {path}"))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&src).context("query document is not valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_core::ScopeSchema;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn hop_terms_take_identifiers() {
        let schema = ScopeSchema::builtin().unwrap();
        let compiler = QueryCompiler::new(&schema);
        let value = parse_term_value(&compiler, Scope::Item, "classification", "concept:1").unwrap();
        assert_eq!(value, TermValue::id("concept:1"));
    }

    #[test]
    fn numeric_terms_take_numbers() {
        let schema = ScopeSchema::builtin().unwrap();
        let compiler = QueryCompiler::new(&schema);
        let value = parse_term_value(&compiler, Scope::Work, "createdDate", "1642").unwrap();
        assert_eq!(value, TermValue::number(1642));
    }

    #[test]
    fn prefixed_identifier_and_nested_query() {
        let schema = ScopeSchema::builtin().unwrap();
        let compiler = QueryCompiler::new(&schema);
        assert_eq!(
            parse_term_value(&compiler, Scope::Agent, "name", "id:x").unwrap(),
            TermValue::id("x")
        );
        let nested = parse_term_value(
            &compiler,
            Scope::Work,
            "createdBy",
            r#"@{"nationality": {"id": "concept:dutch"}}"#,
        )
        .unwrap();
        assert!(matches!(nested, TermValue::Query(_)));
    }

    #[test]
    fn nested_query_on_leaf_term_fails() {
        let schema = ScopeSchema::builtin().unwrap();
        let compiler = QueryCompiler::new(&schema);
        assert!(parse_term_value(&compiler, Scope::Agent, "name", "@{}").is_err());
    }

    #[test]
    fn document_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"_scope": "place", "name": "Leiden"}}"#).unwrap();
        let arg = format!("@{}", file.path().display());
        let doc = read_document(&arg).unwrap();
        assert_eq!(doc["_scope"], "place");
    }
}
