//! Entity kinds and the kind registry
//!
//! A `Kind` mirrors one class of the remote ontology as a plain record:
//! its parent, its canonical type IRI, the properties it declares and the
//! kinds it is equivalent to. Inheritance is resolved by the composer over
//! this table, never by language-level subtyping.

use std::collections::{BTreeMap, HashMap};

use crate::compose::compose;
use crate::error::MetaError;
use crate::id::{is_absolute_iri, is_valid_var_name};
use crate::vocab::{expand_curie, PRODUCT_SPEC_VAR, ROOT_VAR, SUBMISSION_TIME_VAR};

/// A statically declared entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kind {
    /// Unique name within the registry
    pub name: &'static str,
    /// Parent kind name, `None` for roots
    pub parent: Option<&'static str>,
    /// Authoritative type IRI, unique across all kinds
    pub canonical_type: &'static str,
    /// Remote property (prefixed name) -> local attribute name
    pub own_attributes: &'static [(&'static str, &'static str)],
    /// Kinds whose composed attributes are merged in with lowest priority
    pub equivalent_kinds: &'static [&'static str],
    /// Leaf product kinds are selected through their spec's dataset type
    /// (the canonical type) instead of `rdf:type`
    pub leaf_product: bool,
}

impl Kind {
    pub const fn new(
        name: &'static str,
        parent: Option<&'static str>,
        canonical_type: &'static str,
        own_attributes: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            name,
            parent,
            canonical_type,
            own_attributes,
            equivalent_kinds: &[],
            leaf_product: false,
        }
    }

    pub const fn with_equivalents(mut self, equivalent_kinds: &'static [&'static str]) -> Self {
        self.equivalent_kinds = equivalent_kinds;
        self
    }

    pub const fn leaf_product(mut self) -> Self {
        self.leaf_product = true;
        self
    }
}

/// Composite property -> the finer-grained properties it subsumes
#[derive(Debug, Clone, Default)]
pub struct SubpropertyTable {
    entries: BTreeMap<&'static str, Vec<(&'static str, &'static str)>>,
}

impl SubpropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the children of a parent property; repeated declarations extend the list
    pub fn declare(
        mut self,
        parent: &'static str,
        children: &[(&'static str, &'static str)],
    ) -> Self {
        self.entries
            .entry(parent)
            .or_default()
            .extend_from_slice(children);
        self
    }

    pub fn children(&self, property: &str) -> Option<&[(&'static str, &'static str)]> {
        self.entries.get(property).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[(&'static str, &'static str)])> {
        self.entries.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

/// Process-wide table of kinds, looked up by name or canonical type
#[derive(Debug, Clone)]
pub struct KindRegistry {
    kinds: Vec<Kind>,
    by_name: HashMap<&'static str, usize>,
    by_type: HashMap<&'static str, usize>,
    subproperties: SubpropertyTable,
}

impl KindRegistry {
    /// Build a registry, rejecting duplicate names and canonical types
    pub fn new(kinds: Vec<Kind>, subproperties: SubpropertyTable) -> Result<Self, MetaError> {
        let mut by_name = HashMap::new();
        let mut by_type = HashMap::new();

        for (index, kind) in kinds.iter().enumerate() {
            if by_name.insert(kind.name, index).is_some() {
                return Err(MetaError::InvalidRegistry(format!(
                    "kind '{}' declared twice",
                    kind.name
                )));
            }
            if let Some(other) = by_type.insert(kind.canonical_type, index) {
                return Err(MetaError::InvalidRegistry(format!(
                    "canonical type '{}' shared by '{}' and '{}'",
                    kind.canonical_type, kinds[other].name, kind.name
                )));
            }
        }

        Ok(Self {
            kinds,
            by_name,
            by_type,
            subproperties,
        })
    }

    /// The builtin Carbon Portal registry
    pub fn builtin() -> Result<Self, MetaError> {
        Self::new(
            crate::catalog::KINDS.to_vec(),
            crate::catalog::subproperties(),
        )
    }

    pub fn lookup_by_name(&self, name: &str) -> Result<&Kind, MetaError> {
        self.by_name
            .get(name)
            .map(|&i| &self.kinds[i])
            .ok_or_else(|| MetaError::UnknownKind(name.to_string()))
    }

    pub fn lookup_by_canonical_type(&self, iri: &str) -> Result<&Kind, MetaError> {
        self.by_type
            .get(iri)
            .map(|&i| &self.kinds[i])
            .ok_or_else(|| MetaError::UnknownKind(iri.to_string()))
    }

    pub fn contains_canonical_type(&self, iri: &str) -> bool {
        self.by_type.contains_key(iri)
    }

    /// Kinds in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Kind> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn subproperties(&self) -> &SubpropertyTable {
        &self.subproperties
    }

    /// Check every declaration and compose every kind once
    ///
    /// Surfaces dangling references, unusable attribute names, unresolvable
    /// properties and composition cycles before any query is built.
    pub fn validate(&self) -> Result<(), MetaError> {
        for kind in &self.kinds {
            if !is_absolute_iri(kind.canonical_type) {
                return Err(MetaError::InvalidRegistry(format!(
                    "kind '{}' has a non-absolute canonical type '{}'",
                    kind.name, kind.canonical_type
                )));
            }
            if let Some(parent) = kind.parent {
                self.lookup_by_name(parent).map_err(|_| {
                    MetaError::InvalidRegistry(format!(
                        "kind '{}' extends unknown kind '{}'",
                        kind.name, parent
                    ))
                })?;
            }
            for equivalent in kind.equivalent_kinds {
                self.lookup_by_name(equivalent).map_err(|_| {
                    MetaError::InvalidRegistry(format!(
                        "kind '{}' is equivalent to unknown kind '{}'",
                        kind.name, equivalent
                    ))
                })?;
            }

            let mut names: HashMap<&str, &str> = HashMap::new();
            for (property, name) in kind.own_attributes {
                validate_attribute(kind.name, property, name)?;
                match names.insert(*name, *property) {
                    Some(previous) if previous != *property => {
                        return Err(MetaError::InvalidRegistry(format!(
                            "kind '{}' maps both '{}' and '{}' to attribute '{}'",
                            kind.name, previous, property, name
                        )));
                    }
                    _ => {}
                }
            }
        }

        for (parent, children) in self.subproperties.iter() {
            for (property, name) in children {
                validate_attribute(parent, property, name)?;
            }
        }

        for kind in &self.kinds {
            compose(self, kind)?;
        }
        Ok(())
    }
}

fn validate_attribute(owner: &str, property: &str, name: &str) -> Result<(), MetaError> {
    if expand_curie(property).is_none() {
        return Err(MetaError::InvalidRegistry(format!(
            "'{}' declares property '{}' with an unknown prefix",
            owner, property
        )));
    }
    if !is_valid_var_name(name) || [ROOT_VAR, PRODUCT_SPEC_VAR, SUBMISSION_TIME_VAR].contains(&name) {
        return Err(MetaError::InvalidRegistry(format!(
            "'{}' declares unusable attribute name '{}'",
            owner, name
        )));
    }
    Ok(())
}
