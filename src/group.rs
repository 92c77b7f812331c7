//! Grouping of flat result rows into per-entity attribute lists
//!
//! Optional clauses match independently, so one entity is usually spread
//! over many rows, each carrying a different subset of its variables.

use std::collections::BTreeMap;

use tracing::debug;

use crate::binding::{AtomKind, Binding, BindingRow};
use crate::id::{classify_iri, IriKind};
use crate::vocab::{METADATA_PREFIX, ROOT_VAR};

/// Attribute name -> deduplicated atoms, in first-seen order
pub type EntityAttributes = BTreeMap<String, Vec<Binding>>;

/// Entity id -> its grouped attributes
pub type GroupedAttributes = BTreeMap<String, EntityAttributes>;

/// Groups result rows by the root variable
#[derive(Debug, Clone)]
pub struct ResultGrouper {
    metadata_prefix: String,
    root_var: String,
}

impl Default for ResultGrouper {
    fn default() -> Self {
        Self::new(METADATA_PREFIX)
    }
}

impl ResultGrouper {
    pub fn new(metadata_prefix: impl Into<String>) -> Self {
        Self {
            metadata_prefix: metadata_prefix.into(),
            root_var: ROOT_VAR.to_string(),
        }
    }

    pub fn metadata_prefix(&self) -> &str {
        &self.metadata_prefix
    }

    pub fn group(&self, rows: &[BindingRow]) -> GroupedAttributes {
        let mut grouped = GroupedAttributes::new();
        self.group_into(rows, &mut grouped);
        grouped
    }

    /// Add rows to an existing grouping
    pub fn group_into(&self, rows: &[BindingRow], grouped: &mut GroupedAttributes) {
        for row in rows {
            let key = match row.get(&self.root_var) {
                Some(binding) => binding.value.clone(),
                None => {
                    debug!("Skipping result row without ?{}", self.root_var);
                    continue;
                }
            };

            let attributes = grouped.entry(key).or_default();
            for (var, binding) in row {
                if *var == self.root_var {
                    continue;
                }
                let atom = self.reclassify(binding);
                let atoms = attributes.entry(var.clone()).or_default();
                if !atoms.contains(&atom) {
                    atoms.push(atom);
                }
            }
        }
    }

    /// Identity atoms outside the metadata universe become literals
    fn reclassify(&self, binding: &Binding) -> Binding {
        if binding.kind == AtomKind::Identity
            && classify_iri(&binding.value, &self.metadata_prefix) != IriKind::Metadata
        {
            Binding::literal(binding.value.clone())
        } else {
            binding.clone()
        }
    }
}
