//! Query execution against a SPARQL endpoint
//!
//! The core only depends on the `QueryExecutor` and `TypeLookup` traits;
//! `SparqlEndpoint` is the blocking HTTP implementation used by the CLI.

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::binding::{parse_sparql_json, BindingRow};
use crate::error::MetaError;
use crate::id::is_absolute_iri;
use crate::kind::KindRegistry;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Runs a query string and returns its result rows
pub trait QueryExecutor {
    /// Execute a query; row keys are the query's variable names
    fn execute(&self, query: &str) -> Result<Vec<BindingRow>, MetaError>;
}

/// Resolves the canonical type of an entity
pub trait TypeLookup {
    fn type_of(&self, entity_id: &str) -> Result<String, MetaError>;
}

/// Blocking HTTP client for a SPARQL 1.1 endpoint
pub struct SparqlEndpoint {
    url: String,
    client: Client,
}

impl SparqlEndpoint {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, MetaError> {
        let url = url.into();
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| MetaError::QueryExecution {
            endpoint: url.clone(),
            reason: format!("Failed to build HTTP client: {}", e),
        })?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn execution_error(&self, reason: String) -> MetaError {
        MetaError::QueryExecution {
            endpoint: self.url.clone(),
            reason,
        }
    }
}

impl QueryExecutor for SparqlEndpoint {
    fn execute(&self, query: &str) -> Result<Vec<BindingRow>, MetaError> {
        debug!(endpoint = %self.url, "Executing query:\n{}", query);

        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query)])
            .send()
            .map_err(|e| self.execution_error(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| self.execution_error(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let excerpt: String = body.chars().take(500).collect();
            return Err(self.execution_error(format!("HTTP {}: {}", status, excerpt)));
        }

        let rows = parse_sparql_json(&body)
            .map_err(|e| self.execution_error(format!("Malformed query results: {}", e)))?;
        debug!(rows = rows.len(), "Query returned");
        Ok(rows)
    }
}

/// Looks types up with a query through any executor
///
/// When an entity carries several types, types known to the registry are
/// preferred and the lexicographically smallest candidate is chosen.
pub struct ExecutorTypeLookup<'a> {
    executor: &'a dyn QueryExecutor,
    registry: &'a KindRegistry,
}

impl<'a> ExecutorTypeLookup<'a> {
    pub fn new(executor: &'a dyn QueryExecutor, registry: &'a KindRegistry) -> Self {
        Self { executor, registry }
    }
}

/// Query listing the asserted types of one entity
pub fn type_query(entity_id: &str) -> String {
    format!("select distinct ?type where {{ <{}> a ?type }}\n", entity_id)
}

impl TypeLookup for ExecutorTypeLookup<'_> {
    fn type_of(&self, entity_id: &str) -> Result<String, MetaError> {
        if !is_absolute_iri(entity_id) {
            return Err(MetaError::UnknownKind(entity_id.to_string()));
        }

        let rows = self.executor.execute(&type_query(entity_id))?;
        let types: BTreeSet<String> = rows
            .into_iter()
            .filter_map(|mut row| row.remove("type"))
            .map(|binding| binding.value)
            .collect();

        if types.len() > 1 {
            warn!(
                entity = entity_id,
                "Entity has {} distinct types: {:?}",
                types.len(),
                types
            );
        }

        let known = types
            .iter()
            .find(|t| self.registry.contains_canonical_type(t));
        known
            .or_else(|| types.iter().next())
            .cloned()
            .ok_or_else(|| MetaError::UnknownKind(entity_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Binding;

    struct FixedRows(Vec<BindingRow>);

    impl QueryExecutor for FixedRows {
        fn execute(&self, _query: &str) -> Result<Vec<BindingRow>, MetaError> {
            Ok(self.0.clone())
        }
    }

    fn type_row(iri: &str) -> BindingRow {
        let mut row = BindingRow::new();
        row.insert("type".to_string(), Binding::identity(iri));
        row
    }

    #[test]
    fn test_type_query() {
        assert_eq!(
            type_query("http://x/1"),
            "select distinct ?type where { <http://x/1> a ?type }\n"
        );
    }

    #[test]
    fn test_type_of_single() {
        let registry = KindRegistry::builtin().unwrap();
        let executor = FixedRows(vec![type_row(
            "http://meta.icos-cp.eu/ontologies/cpmeta/DataSubmission",
        )]);
        let lookup = ExecutorTypeLookup::new(&executor, &registry);
        assert_eq!(
            lookup.type_of("http://meta.icos-cp.eu/resources/subm_1").unwrap(),
            "http://meta.icos-cp.eu/ontologies/cpmeta/DataSubmission"
        );
    }

    #[test]
    fn test_type_of_prefers_registered_type() {
        let registry = KindRegistry::builtin().unwrap();
        let executor = FixedRows(vec![
            type_row("http://a.example/Unregistered"),
            type_row("http://meta.icos-cp.eu/ontologies/cpmeta/Position"),
        ]);
        let lookup = ExecutorTypeLookup::new(&executor, &registry);
        assert_eq!(
            lookup.type_of("http://meta.icos-cp.eu/resources/pos_1").unwrap(),
            "http://meta.icos-cp.eu/ontologies/cpmeta/Position"
        );
    }

    #[test]
    fn test_type_of_none() {
        let registry = KindRegistry::builtin().unwrap();
        let executor = FixedRows(vec![]);
        let lookup = ExecutorTypeLookup::new(&executor, &registry);
        assert!(matches!(
            lookup.type_of("http://meta.icos-cp.eu/resources/ghost"),
            Err(MetaError::UnknownKind(_))
        ));
        assert!(matches!(
            lookup.type_of("not an iri"),
            Err(MetaError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint() {
        let endpoint =
            SparqlEndpoint::new("http://127.0.0.1:9/sparql", Some(Duration::from_secs(2)))
                .unwrap();
        assert!(matches!(
            endpoint.execute("select * where { ?s ?p ?o } limit 1"),
            Err(MetaError::QueryExecution { .. })
        ));
    }
}
