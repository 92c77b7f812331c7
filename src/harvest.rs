//! Harvesting flat metadata records
//!
//! Runs the root query for a kind, seeds the cache with its results and
//! flattens every root entity into a record keyed by a dataset identifier.

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::MetadataCache;
use crate::entity::EntityQuery;
use crate::error::MetaError;
use crate::executor::{QueryExecutor, TypeLookup};
use crate::flatten::{FlatAttributes, Flattener};
use crate::group::ResultGrouper;
use crate::id::dataset_id;
use crate::kind::KindRegistry;
use crate::query::Filters;

/// Options for harvesting
#[derive(Debug, Clone)]
pub struct HarvestOptions {
    /// Log and skip roots whose references cannot be resolved instead of aborting
    pub skip_unresolvable: bool,
    /// Grouping of result rows (metadata namespace check)
    pub grouper: ResultGrouper,
    /// Flattening policy (deny-listed links)
    pub flattener: Flattener,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            skip_unresolvable: false,
            grouper: ResultGrouper::default(),
            flattener: Flattener::default(),
        }
    }
}

/// Flat metadata of one root entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    pub dataset_id: String,
    pub uri: String,
    pub attributes: FlatAttributes,
}

/// Result of a harvest
#[derive(Debug)]
pub struct HarvestResult {
    /// One record per flattened root, in root id order
    pub records: Vec<FlatRecord>,
    /// Statistics about the harvest
    pub stats: HarvestStats,
}

/// Statistics from a harvest
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestStats {
    /// Number of root entities returned by the root query
    pub roots: usize,
    /// Number of roots flattened into records
    pub flattened: usize,
    /// Number of roots skipped as unresolvable
    pub skipped: usize,
    /// Number of referenced entities fetched one by one
    pub on_demand_fetches: usize,
}

/// Harvest flat records for every entity of a kind matching the filters
pub fn harvest(
    registry: &KindRegistry,
    executor: &dyn QueryExecutor,
    type_lookup: &dyn TypeLookup,
    kind_name: &str,
    filters: Filters,
    options: &HarvestOptions,
) -> Result<HarvestResult, MetaError> {
    let mut stats = HarvestStats::default();

    let mut root = EntityQuery::new(registry, kind_name, filters)?;
    root.fetch(executor, &options.grouper)?;
    let kind = root.kind();
    let grouped = root.into_results();
    let root_ids: Vec<String> = grouped.keys().cloned().collect();
    stats.roots = root_ids.len();
    info!(kind = kind.name, roots = stats.roots, "Root query returned");

    let mut cache = MetadataCache::new(registry, executor, type_lookup, options.grouper.clone());
    cache.seed(kind, grouped);

    let mut records = Vec::with_capacity(root_ids.len());
    for id in &root_ids {
        match options.flattener.flatten(&mut cache, kind, id) {
            Ok(attributes) => {
                records.push(FlatRecord {
                    dataset_id: dataset_id(id),
                    uri: id.clone(),
                    attributes,
                });
                stats.flattened += 1;
            }
            Err(e) if options.skip_unresolvable && e.is_unresolvable() => {
                warn!(root = %id, "Skipping root entity: {}", e);
                stats.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    stats.on_demand_fetches = cache.fetch_count();
    info!(
        kind = kind.name,
        flattened = stats.flattened,
        skipped = stats.skipped,
        fetches = stats.on_demand_fetches,
        "Harvest complete"
    );

    Ok(HarvestResult { records, stats })
}

/// Serialize harvested records to a JSON string
pub fn to_json_string(result: &HarvestResult, pretty: bool) -> Result<String, MetaError> {
    if pretty {
        Ok(serde_json::to_string_pretty(&result.records)?)
    } else {
        Ok(serde_json::to_string(&result.records)?)
    }
}
