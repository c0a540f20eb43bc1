//! Compile a wire-form JSON query back into a [`QueryNode`].
//!
//! Conventions, per condition object:
//!
//! - strings and numbers are scalars
//! - `{"id": X}` is an identifier
//! - any other object is a nested query in the term's target scope
//! - `"_comp"` applies a comparison to the object's one numeric term
//! - `"AND"` / `"OR"` take arrays of conditions in the same scope
//! - several terms in one object are ANDed, in key order
//! - keys are term names or the fields terms write, so compiled output
//!   reads back unchanged
//!
//! The root carries `"_scope"`. A `"multi"` root must hold a single
//! `AND`/`OR` whose branches carry their own, single, `_scope`.

use crate::compiler::{CompileOptions, QueryCompiler, TermValue};
use crate::error::{QueryError, Result};
use crate::query::{BoolOp, Comparator, QueryNode, Scalar};
use crate::scope::Scope;
use serde_json::{Map, Value};

const SCOPE_KEY: &str = "_scope";
const COMP_KEY: &str = "_comp";
const MULTI: &str = "multi";

impl QueryCompiler<'_> {
    /// Compile a complete query document.
    pub fn compile_document(&self, doc: &Value) -> Result<QueryNode> {
        if root_scope(doc)? == MULTI {
            let node = self.compile_multi(doc)?;
            node.check_scoping()
                .map_err(|e| QueryError::MalformedDocument(e.to_string()))?;
            return Ok(node);
        }
        self.compile_scoped(doc)
    }

    fn compile_scoped(&self, doc: &Value) -> Result<QueryNode> {
        let scope: Scope = root_scope(doc)?.parse()?;
        tracing::debug!(scope = %scope, "document: compiling");
        self.compile_condition(scope, doc)
    }

    /// Compile one condition object in `scope`. `_scope`, when present,
    /// must agree.
    pub fn compile_condition(&self, scope: Scope, cond: &Value) -> Result<QueryNode> {
        let obj = cond
            .as_object()
            .ok_or_else(|| malformed(scope, "_query", format!("expected an object, got {cond}")))?;

        if let Some(tag) = obj.get(SCOPE_KEY) {
            if tag.as_str() != Some(scope.as_str()) {
                return Err(malformed(scope, SCOPE_KEY, format!("{tag} inside a {scope} query")));
            }
        }

        let comparator = match obj.get(COMP_KEY) {
            None => None,
            Some(raw) => Some(
                raw.as_str()
                    .and_then(Comparator::parse)
                    .ok_or_else(|| malformed(scope, COMP_KEY, format!("unknown comparator {raw}")))?,
            ),
        };

        if let Some(key) = obj
            .keys()
            .find(|k| k.starts_with('_') && *k != SCOPE_KEY && *k != COMP_KEY)
        {
            return Err(malformed(scope, key, "unknown control key"));
        }

        let terms: Vec<(&String, &Value)> = obj.iter().filter(|(k, _)| !k.starts_with('_')).collect();
        if comparator.is_some() {
            match terms.as_slice() {
                [(key, _)] if !is_boolean_key(key) => {}
                _ => return Err(malformed(scope, COMP_KEY, "_comp needs exactly one sibling term")),
            }
        }

        let mut nodes = Vec::with_capacity(terms.len());
        for (key, value) in terms {
            let node = match key.as_str() {
                "AND" => self.compile_branches(scope, BoolOp::And, value)?,
                "OR" => self.compile_branches(scope, BoolOp::Or, value)?,
                term => self.compile_term(scope, term, value, comparator)?,
            };
            nodes.push(node);
        }

        match nodes.len() {
            0 => Err(malformed(scope, "_query", "condition has no terms")),
            1 => Ok(nodes.remove(0)),
            _ => Ok(QueryNode::and(nodes)),
        }
    }

    fn compile_term(
        &self,
        scope: Scope,
        term: &str,
        value: &Value,
        comparator: Option<Comparator>,
    ) -> Result<QueryNode> {
        let def = self.schema().resolve_field(scope, term)?;
        let term_value = match value {
            Value::String(s) => TermValue::Scalar(Scalar::Text(s.clone())),
            Value::Number(n) => TermValue::Scalar(Scalar::Number(n.clone())),
            Value::Object(inner) => match identifier(inner) {
                Some(id) => TermValue::Identifier(id.to_string()),
                None => {
                    let target = def
                        .target_scope()
                        .ok_or_else(|| malformed(scope, term, "nested query on a term that does not traverse"))?;
                    TermValue::Query(self.compile_condition(target, value)?)
                }
            },
            other => return Err(malformed(scope, term, format!("unsupported value {other}"))),
        };
        let options = CompileOptions {
            comparator,
            ..self.default_options()
        };
        self.compile_with(scope, &def.name, term_value, &options)
    }

    fn compile_branches(&self, scope: Scope, op: BoolOp, value: &Value) -> Result<QueryNode> {
        let items = value
            .as_array()
            .ok_or_else(|| malformed(scope, op.as_str(), "expected an array of conditions"))?;
        if items.is_empty() {
            return Err(malformed(scope, op.as_str(), "empty boolean"));
        }
        let children = items
            .iter()
            .map(|item| self.compile_condition(scope, item))
            .collect::<Result<Vec<_>>>()?;
        Ok(boolean(op, children))
    }

    fn compile_multi(&self, doc: &Value) -> Result<QueryNode> {
        let mut keys = doc
            .as_object()
            .into_iter()
            .flatten()
            .filter(|(k, _)| k.as_str() != SCOPE_KEY);
        let (op, branches) = match (keys.next(), keys.next()) {
            (Some((k, v)), None) if k == "AND" => (BoolOp::And, v),
            (Some((k, v)), None) if k == "OR" => (BoolOp::Or, v),
            _ => return Err(shape("a multi query holds exactly one AND or OR")),
        };
        let items = branches
            .as_array()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| shape(format!("multi {} needs a non-empty array", op.as_str())))?;
        let children = items
            .iter()
            .map(|item| match root_scope(item)? {
                MULTI => Err(shape("a multi branch cannot itself be multi")),
                _ => self.compile_scoped(item),
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(branches = children.len(), "document: multi root compiled");
        Ok(boolean(op, children))
    }
}

/// The `_scope` tag of a document or multi branch.
fn root_scope(doc: &Value) -> Result<&str> {
    doc.as_object()
        .ok_or_else(|| shape(format!("query root is not an object: {doc}")))?
        .get(SCOPE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| shape("query root has no _scope"))
}

fn is_boolean_key(key: &str) -> bool {
    key == "AND" || key == "OR"
}

fn identifier(obj: &Map<String, Value>) -> Option<&str> {
    match (obj.len(), obj.get("id")) {
        (1, Some(Value::String(id))) => Some(id),
        _ => None,
    }
}

fn boolean(op: BoolOp, children: Vec<QueryNode>) -> QueryNode {
    match op {
        BoolOp::And => QueryNode::and(children),
        BoolOp::Or => QueryNode::or(children),
    }
}

fn shape(reason: impl Into<String>) -> QueryError {
    QueryError::MalformedDocument(reason.into())
}

fn malformed(scope: Scope, term: &str, reason: impl Into<String>) -> QueryError {
    QueryError::invalid_value(scope, term, reason)
}
