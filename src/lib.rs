//! Carbon Portal Metadata Harvesting Library
//!
//! This library maps the classes of the Carbon Portal metadata ontology onto
//! statically declared kinds, builds SPARQL queries for them, and flattens
//! the resulting entity graphs into one attribute dictionary per dataset.
//!
//! # Overview
//!
//! 1. A `KindRegistry` holds every kind: its parent, canonical type IRI,
//!    own property mappings and equivalent kinds
//! 2. The composer folds ancestors, subproperties and equivalents into one
//!    property -> attribute-name map per kind
//! 3. The query builder renders that map plus caller filters into a query
//! 4. The grouper turns sparse result rows into per-entity attribute lists
//! 5. The flattener walks references between entities, fetching uncached
//!    ones on demand, and merges everything into a flat dictionary
//!
//! A drift checker compares the registry with the live ontology graph.
//!
//! # Usage
//!
//! ```ignore
//! use cpmeta_harvest::{
//!     harvest, to_json_string, ExecutorTypeLookup, Filters, HarvestOptions, KindRegistry,
//!     SparqlEndpoint,
//! };
//!
//! let registry = KindRegistry::builtin()?;
//! let endpoint = SparqlEndpoint::new("https://meta.icos-cp.eu/sparql", None)?;
//! let types = ExecutorTypeLookup::new(&endpoint, &registry);
//!
//! let result = harvest(
//!     &registry,
//!     &endpoint,
//!     &types,
//!     "StationTimeSeriesObject",
//!     Filters::new().with_last_version_only(true).with_limit(10),
//!     &HarvestOptions::default(),
//! )?;
//!
//! println!("{}", to_json_string(&result, true)?);
//! ```

pub mod binding;
pub mod cache;
pub mod catalog;
pub mod compose;
pub mod drift;
pub mod entity;
pub mod error;
pub mod executor;
pub mod flatten;
pub mod group;
pub mod harvest;
pub mod id;
pub mod kind;
pub mod query;
pub mod vocab;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use crate::binding::{parse_sparql_json, AtomKind, Binding, BindingRow};
pub use crate::cache::MetadataCache;
pub use crate::compose::{compose, AttributeMap};
pub use crate::drift::{DriftCheck, DriftReport, OntologySnapshot, SubclassMismatch};
pub use crate::entity::EntityQuery;
pub use crate::error::MetaError;
pub use crate::executor::{ExecutorTypeLookup, QueryExecutor, SparqlEndpoint, TypeLookup};
pub use crate::flatten::{FlatAttributes, Flattener};
pub use crate::group::{EntityAttributes, GroupedAttributes, ResultGrouper};
pub use crate::harvest::{
    harvest, to_json_string, FlatRecord, HarvestOptions, HarvestResult, HarvestStats,
};
pub use crate::kind::{Kind, KindRegistry, SubpropertyTable};
pub use crate::query::{build_query, build_query_with, Filters};
pub use crate::vocab::{DEFAULT_ENDPOINT, METADATA_PREFIX};
