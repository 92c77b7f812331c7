//! Per-run cache of grouped entity metadata
//!
//! Entries are keyed by kind name and entity id. A miss triggers a fetch of
//! that single entity through the query builder, the executor and the
//! grouper; the result (possibly empty) is stored so the same pair is never
//! fetched twice.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::compose::{compose, AttributeMap};
use crate::error::MetaError;
use crate::executor::{QueryExecutor, TypeLookup};
use crate::group::{EntityAttributes, GroupedAttributes, ResultGrouper};
use crate::kind::{Kind, KindRegistry};
use crate::query::{build_query_with, Filters};

pub struct MetadataCache<'a> {
    registry: &'a KindRegistry,
    executor: &'a dyn QueryExecutor,
    type_lookup: &'a dyn TypeLookup,
    grouper: ResultGrouper,
    entries: BTreeMap<&'static str, GroupedAttributes>,
    compositions: HashMap<&'static str, AttributeMap>,
    types: HashMap<String, &'a Kind>,
    fetch_count: usize,
}

impl<'a> MetadataCache<'a> {
    pub fn new(
        registry: &'a KindRegistry,
        executor: &'a dyn QueryExecutor,
        type_lookup: &'a dyn TypeLookup,
        grouper: ResultGrouper,
    ) -> Self {
        Self {
            registry,
            executor,
            type_lookup,
            grouper,
            entries: BTreeMap::new(),
            compositions: HashMap::new(),
            types: HashMap::new(),
            fetch_count: 0,
        }
    }

    pub fn registry(&self) -> &'a KindRegistry {
        self.registry
    }

    /// Store already grouped results for a kind, replacing existing entries
    pub fn seed(&mut self, kind: &'a Kind, grouped: GroupedAttributes) {
        for id in grouped.keys() {
            self.types.entry(id.clone()).or_insert(kind);
        }
        self.entries.entry(kind.name).or_default().extend(grouped);
    }

    pub fn contains(&self, kind: &Kind, id: &str) -> bool {
        self.entries
            .get(kind.name)
            .is_some_and(|grouped| grouped.contains_key(id))
    }

    /// Number of single-entity fetches performed so far
    pub fn fetch_count(&self) -> usize {
        self.fetch_count
    }

    /// Number of cached (kind, id) pairs
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Composed attributes of a kind, composed at most once per cache
    pub fn composition(&mut self, kind: &Kind) -> Result<&AttributeMap, MetaError> {
        if !self.compositions.contains_key(kind.name) {
            let attributes = compose(self.registry, kind)?;
            self.compositions.insert(kind.name, attributes);
        }
        self.compositions
            .get(kind.name)
            .ok_or_else(|| MetaError::UnknownKind(kind.name.to_string()))
    }

    /// Grouped attributes of one entity, fetching them on a miss
    pub fn get_or_fetch(&mut self, kind: &'a Kind, id: &str) -> Result<EntityAttributes, MetaError> {
        if let Some(attributes) = self.entries.get(kind.name).and_then(|g| g.get(id)) {
            return Ok(attributes.clone());
        }

        let filters = Filters::new().with_identity(id);
        let query = build_query_with(kind, self.composition(kind)?, &filters)?;
        let rows = self.executor.execute(&query)?;
        self.fetch_count += 1;

        let mut grouped = self.grouper.group(&rows);
        let attributes = grouped.remove(id).unwrap_or_default();
        if !grouped.is_empty() {
            debug!(
                kind = kind.name,
                id,
                extra = grouped.len(),
                "Ignoring rows for other entities"
            );
        }
        debug!(
            kind = kind.name,
            id,
            attributes = attributes.len(),
            "Fetched entity on demand"
        );

        self.types.entry(id.to_string()).or_insert(kind);
        self.entries
            .entry(kind.name)
            .or_default()
            .insert(id.to_string(), attributes.clone());
        Ok(attributes)
    }

    /// Resolve the kind of a referenced entity
    ///
    /// Tries the memo, then any kind that already caches the id, then the
    /// type lookup. The answer is memoized.
    pub fn kind_of(&mut self, id: &str) -> Result<&'a Kind, MetaError> {
        if let Some(&kind) = self.types.get(id) {
            return Ok(kind);
        }

        let cached = self
            .entries
            .iter()
            .find(|(_, grouped)| grouped.contains_key(id))
            .map(|(name, _)| *name);

        let kind = match cached {
            Some(name) => self.registry.lookup_by_name(name)?,
            None => {
                let canonical_type = self.type_lookup.type_of(id)?;
                self.registry.lookup_by_canonical_type(&canonical_type)?
            }
        };
        self.types.insert(id.to_string(), kind);
        Ok(kind)
    }
}
