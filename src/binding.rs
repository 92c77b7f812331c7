//! Typed query result atoms
//!
//! Parses SPARQL 1.1 JSON results into rows of `Binding` atoms keyed by
//! variable name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::MetaError;

/// Whether an atom names a resource or carries a plain value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtomKind {
    Identity,
    Literal,
}

/// One typed value bound to one variable in one result row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub kind: AtomKind,
    pub value: String,
}

impl Binding {
    pub fn identity(value: impl Into<String>) -> Self {
        Self {
            kind: AtomKind::Identity,
            value: value.into(),
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: AtomKind::Literal,
            value: value.into(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.kind == AtomKind::Identity
    }

    pub fn is_literal(&self) -> bool {
        self.kind == AtomKind::Literal
    }
}

/// Variable name -> atom for one result row
pub type BindingRow = BTreeMap<String, Binding>;

#[derive(Debug, Deserialize)]
struct SparqlResults {
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<BTreeMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    #[serde(rename = "type")]
    term_type: String,
    value: String,
}

impl SparqlTerm {
    fn into_binding(self) -> Binding {
        match self.term_type.as_str() {
            "uri" => Binding::identity(self.value),
            // literal, typed-literal, and blank nodes, which cannot be dereferenced
            _ => Binding::literal(self.value),
        }
    }
}

/// Parse a `application/sparql-results+json` document into binding rows
pub fn parse_sparql_json(content: &str) -> Result<Vec<BindingRow>, MetaError> {
    let results: SparqlResults = serde_json::from_str(content)?;
    Ok(results
        .results
        .bindings
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(var, term)| (var, term.into_binding()))
                .collect()
        })
        .collect())
}
