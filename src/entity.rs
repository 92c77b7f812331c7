//! A kind bound to a filter set
//!
//! `EntityQuery` is the unit the aggregator works with: it resolves its
//! kind once, composes the attribute map once, and keeps the grouped
//! results of its last fetch.

use tracing::debug;

use crate::compose::{compose, AttributeMap};
use crate::error::MetaError;
use crate::executor::QueryExecutor;
use crate::group::{GroupedAttributes, ResultGrouper};
use crate::kind::{Kind, KindRegistry};
use crate::query::{build_query_with, Filters};

#[derive(Debug, Clone)]
pub struct EntityQuery<'a> {
    kind: &'a Kind,
    attributes: AttributeMap,
    filters: Filters,
    results: GroupedAttributes,
}

impl<'a> EntityQuery<'a> {
    pub fn new(
        registry: &'a KindRegistry,
        kind_name: &str,
        filters: Filters,
    ) -> Result<Self, MetaError> {
        let kind = registry.lookup_by_name(kind_name)?;
        let attributes = compose(registry, kind)?;
        Ok(Self {
            kind,
            attributes,
            filters,
            results: GroupedAttributes::new(),
        })
    }

    pub fn kind(&self) -> &'a Kind {
        self.kind
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Render the query for this kind and filter set
    pub fn query(&self) -> Result<String, MetaError> {
        build_query_with(self.kind, &self.attributes, &self.filters)
    }

    /// Execute the query and replace the stored results with its grouping
    pub fn fetch(
        &mut self,
        executor: &dyn QueryExecutor,
        grouper: &ResultGrouper,
    ) -> Result<&GroupedAttributes, MetaError> {
        let query = self.query()?;
        let rows = executor.execute(&query)?;
        self.results = grouper.group(&rows);
        debug!(
            kind = self.kind.name,
            rows = rows.len(),
            entities = self.results.len(),
            "Fetched entity metadata"
        );
        Ok(&self.results)
    }

    pub fn results(&self) -> &GroupedAttributes {
        &self.results
    }

    pub fn into_results(self) -> GroupedAttributes {
        self.results
    }

    /// Ids of the fetched entities, in sorted order
    pub fn root_ids(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Binding, BindingRow};
    use std::cell::RefCell;

    struct RecordingExecutor {
        rows: Vec<BindingRow>,
        queries: RefCell<Vec<String>>,
    }

    impl QueryExecutor for RecordingExecutor {
        fn execute(&self, query: &str) -> Result<Vec<BindingRow>, MetaError> {
            self.queries.borrow_mut().push(query.to_string());
            Ok(self.rows.clone())
        }
    }

    fn row(uri: &str, name: &str) -> BindingRow {
        let mut row = BindingRow::new();
        row.insert("uri".to_string(), Binding::identity(uri));
        row.insert("name".to_string(), Binding::literal(name));
        row
    }

    #[test]
    fn test_unknown_kind() {
        let registry = KindRegistry::builtin().unwrap();
        assert!(matches!(
            EntityQuery::new(&registry, "Spaceship", Filters::new()),
            Err(MetaError::UnknownKind(name)) if name == "Spaceship"
        ));
    }

    #[test]
    fn test_query_uses_filters() {
        let registry = KindRegistry::builtin().unwrap();
        let entity = EntityQuery::new(
            &registry,
            "Station",
            Filters::new().with_identity("http://meta.icos-cp.eu/resources/stations/AS_HTM"),
        )
        .unwrap();
        let query = entity.query().unwrap();
        assert!(query.contains("<http://meta.icos-cp.eu/resources/stations/AS_HTM>"));
        assert!(query.contains("?name"));
        assert_eq!(entity.kind().name, "Station");
    }

    #[test]
    fn test_fetch_groups_results() {
        let registry = KindRegistry::builtin().unwrap();
        let executor = RecordingExecutor {
            rows: vec![
                row("http://meta.icos-cp.eu/resources/stations/AS_SMR", "Hyytiälä"),
                row("http://meta.icos-cp.eu/resources/stations/AS_HTM", "Hyltemossa"),
            ],
            queries: RefCell::new(Vec::new()),
        };
        let mut entity = EntityQuery::new(&registry, "Station", Filters::new()).unwrap();
        assert!(entity.results().is_empty());

        entity.fetch(&executor, &ResultGrouper::default()).unwrap();

        assert_eq!(executor.queries.borrow().len(), 1);
        assert_eq!(
            entity.root_ids().collect::<Vec<_>>(),
            vec![
                "http://meta.icos-cp.eu/resources/stations/AS_HTM",
                "http://meta.icos-cp.eu/resources/stations/AS_SMR",
            ]
        );
    }

    #[test]
    fn test_invalid_filter_does_not_execute() {
        let registry = KindRegistry::builtin().unwrap();
        let executor = RecordingExecutor {
            rows: vec![],
            queries: RefCell::new(Vec::new()),
        };
        let mut entity = EntityQuery::new(
            &registry,
            "DataObject",
            Filters::new().with_date_from("not-a-date"),
        )
        .unwrap();
        assert!(matches!(
            entity.fetch(&executor, &ResultGrouper::default()),
            Err(MetaError::InvalidDate(_))
        ));
        assert!(executor.queries.borrow().is_empty());
    }
}
