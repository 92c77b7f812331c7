//! Recursive flattening of an entity's metadata graph
//!
//! Produces one flat name -> value dictionary for a root entity by pulling
//! in the attributes of every entity it references, except through the
//! deny-listed back-reference links.
//!
//! Merge policy: first writer wins. The entity's own literal and verbatim
//! values are written before any reference is expanded, references are
//! expanded in attribute-name order, and a value already present is never
//! replaced by one coming from a referenced entity.

use std::collections::{BTreeSet, HashSet};

use serde_json::{Map, Value};
use tracing::debug;

use crate::binding::Binding;
use crate::cache::MetadataCache;
use crate::error::MetaError;
use crate::kind::Kind;
use crate::vocab::{DO_NOT_RECURSE, ROOT_VAR};

/// Flat attribute dictionary of one root entity
pub type FlatAttributes = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct Flattener {
    deny_list: BTreeSet<String>,
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new(DO_NOT_RECURSE.iter().copied())
    }
}

impl Flattener {
    pub fn new<I, S>(deny_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            deny_list: deny_list.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether references held by this attribute are kept verbatim
    pub fn is_denied(&self, name: &str) -> bool {
        self.deny_list.contains(name)
    }

    /// Flatten one entity and everything it references
    pub fn flatten<'a>(
        &self,
        cache: &mut MetadataCache<'a>,
        kind: &'a Kind,
        id: &str,
    ) -> Result<FlatAttributes, MetaError> {
        let mut path = HashSet::new();
        self.flatten_inner(cache, kind, id, &mut path)
    }

    fn flatten_inner<'a>(
        &self,
        cache: &mut MetadataCache<'a>,
        kind: &'a Kind,
        id: &str,
        path: &mut HashSet<String>,
    ) -> Result<FlatAttributes, MetaError> {
        if !path.insert(id.to_string()) {
            return Err(MetaError::CycleDetected(id.to_string()));
        }

        let attributes = cache.get_or_fetch(kind, id)?;
        let mut flat = FlatAttributes::new();
        flat.insert(ROOT_VAR.to_string(), Value::String(id.to_string()));

        let mut references: Vec<&str> = Vec::new();
        for (name, atoms) in &attributes {
            if atoms.is_empty() {
                continue;
            }
            if name == ROOT_VAR || self.is_denied(name) || atoms.iter().all(Binding::is_literal) {
                flat.entry(name.clone()).or_insert_with(|| to_value(atoms.iter()));
                continue;
            }

            let literals: Vec<&Binding> = atoms.iter().filter(|a| a.is_literal()).collect();
            if !literals.is_empty() {
                flat.entry(name.clone())
                    .or_insert_with(|| to_value(literals.into_iter()));
            }
            references.extend(atoms.iter().filter(|a| a.is_identity()).map(|a| a.value.as_str()));
        }

        for reference in references {
            let referenced_kind = cache.kind_of(reference)?;
            debug!(
                from = id,
                to = reference,
                kind = referenced_kind.name,
                "Expanding reference"
            );
            let nested = self.flatten_inner(cache, referenced_kind, reference, path)?;
            for (name, value) in nested {
                flat.entry(name).or_insert(value);
            }
        }

        path.remove(id);
        Ok(flat)
    }
}

/// One atom becomes a string, several become an array of strings
fn to_value<'b>(atoms: impl Iterator<Item = &'b Binding>) -> Value {
    let mut values: Vec<Value> = atoms.map(|a| Value::String(a.value.clone())).collect();
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}
