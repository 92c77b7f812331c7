//! In-memory collaborators for unit tests

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use crate::binding::{Binding, BindingRow};
use crate::error::MetaError;
use crate::executor::{QueryExecutor, TypeLookup};

/// Answers queries by matching `<iri>` occurrences in the query text
///
/// Entity rows are returned for every known id the query mentions; a query
/// mentioning none of them gets the unfiltered rows.
#[derive(Default)]
pub(crate) struct FakeEndpoint {
    entities: BTreeMap<String, Vec<BindingRow>>,
    unfiltered: Vec<BindingRow>,
    queries: RefCell<Vec<String>>,
}

impl FakeEndpoint {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register an entity as sparse rows, one attribute per row
    pub(crate) fn with_entity(mut self, id: &str, attributes: &[(&str, Binding)]) -> Self {
        let rows = entity_rows(id, attributes);
        self.entities.insert(id.to_string(), rows);
        self
    }

    /// Rows returned for queries that mention no registered entity
    pub(crate) fn with_unfiltered(mut self, rows: Vec<BindingRow>) -> Self {
        self.unfiltered = rows;
        self
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.borrow().len()
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl QueryExecutor for FakeEndpoint {
    fn execute(&self, query: &str) -> Result<Vec<BindingRow>, MetaError> {
        self.queries.borrow_mut().push(query.to_string());

        let matched: Vec<BindingRow> = self
            .entities
            .iter()
            .filter(|(id, _)| query.contains(&format!("<{}>", id)))
            .flat_map(|(_, rows)| rows.iter().cloned())
            .collect();

        if matched.is_empty() {
            Ok(self.unfiltered.clone())
        } else {
            Ok(matched)
        }
    }
}

/// Executor that fails every query
pub(crate) struct FailingEndpoint;

impl QueryExecutor for FailingEndpoint {
    fn execute(&self, _query: &str) -> Result<Vec<BindingRow>, MetaError> {
        Err(MetaError::QueryExecution {
            endpoint: "http://unreachable.invalid/sparql".to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

/// Map-backed type lookup that records how often it is asked
#[derive(Default)]
pub(crate) struct FakeTypes {
    types: HashMap<String, String>,
    calls: Cell<usize>,
}

impl FakeTypes {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_type(mut self, id: &str, canonical_type: &str) -> Self {
        self.types.insert(id.to_string(), canonical_type.to_string());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl TypeLookup for FakeTypes {
    fn type_of(&self, entity_id: &str) -> Result<String, MetaError> {
        self.calls.set(self.calls.get() + 1);
        self.types
            .get(entity_id)
            .cloned()
            .ok_or_else(|| MetaError::UnknownKind(entity_id.to_string()))
    }
}

/// Sparse result rows for one entity, as an endpoint would return them
pub(crate) fn entity_rows(id: &str, attributes: &[(&str, Binding)]) -> Vec<BindingRow> {
    let root = || {
        let mut row = BindingRow::new();
        row.insert("uri".to_string(), Binding::identity(id));
        row
    };
    if attributes.is_empty() {
        return vec![root()];
    }
    attributes
        .iter()
        .map(|(name, binding)| {
            let mut row = root();
            row.insert(name.to_string(), binding.clone());
            row
        })
        .collect()
}
