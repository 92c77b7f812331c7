//! Ontology drift detection
//!
//! Compares what the kind registry declares with what the live ontology
//! graph defines. The result is informational only: nothing in harvesting
//! depends on it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::binding::BindingRow;
use crate::error::MetaError;
use crate::executor::QueryExecutor;
use crate::kind::KindRegistry;
use crate::vocab::{expand_curie, prefix_preamble, CPMETA_NS, ONTOLOGY_GRAPH};

/// Classes, properties and direct superclass edges of one ontology view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OntologySnapshot {
    pub classes: BTreeSet<String>,
    pub properties: BTreeSet<String>,
    /// Class -> its direct superclasses
    pub superclasses: BTreeMap<String, BTreeSet<String>>,
}

impl OntologySnapshot {
    /// What the registry assumes about the ontology
    ///
    /// Leaf product kinds contribute properties only: their canonical types
    /// are dataset type resources, not classes.
    pub fn from_registry(registry: &KindRegistry) -> Result<Self, MetaError> {
        let mut snapshot = Self::default();

        for kind in registry.iter() {
            if !kind.leaf_product {
                snapshot.classes.insert(kind.canonical_type.to_string());
                if let Some(parent) = kind.parent {
                    let parent = registry.lookup_by_name(parent)?;
                    snapshot.add_superclass(kind.canonical_type, parent.canonical_type);
                }
            }
            for (property, _) in kind.own_attributes {
                snapshot.properties.insert(expand_property(property)?);
            }
        }

        for (parent, children) in registry.subproperties().iter() {
            snapshot.properties.insert(expand_property(parent)?);
            for (property, _) in children {
                snapshot.properties.insert(expand_property(property)?);
            }
        }

        Ok(snapshot)
    }

    pub fn add_superclass(&mut self, class: &str, superclass: &str) {
        self.superclasses
            .entry(class.to_string())
            .or_default()
            .insert(superclass.to_string());
    }

    /// All superclasses reachable from `class`, excluding itself
    pub fn transitive_superclasses(&self, class: &str) -> BTreeSet<String> {
        let mut reached = BTreeSet::new();
        let mut pending: Vec<&str> = vec![class];
        while let Some(current) = pending.pop() {
            for superclass in self.superclasses.get(current).into_iter().flatten() {
                if superclass != class && reached.insert(superclass.clone()) {
                    pending.push(superclass);
                }
            }
        }
        reached
    }
}

fn expand_property(property: &str) -> Result<String, MetaError> {
    expand_curie(property).ok_or_else(|| {
        MetaError::InvalidRegistry(format!("property '{}' has an unknown prefix", property))
    })
}

/// A declared parent the live ontology does not confirm
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubclassMismatch {
    pub class: String,
    pub declared_parent: String,
    pub live_superclasses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub namespace: String,
    /// Declared classes absent from the live ontology
    pub missing_classes: Vec<String>,
    /// Declared properties absent from the live ontology
    pub missing_properties: Vec<String>,
    pub subclass_mismatches: Vec<SubclassMismatch>,
    /// Live classes no kind maps
    pub unmapped_classes: Vec<String>,
}

impl DriftReport {
    /// No declaration contradicts the live ontology
    pub fn is_clean(&self) -> bool {
        self.missing_classes.is_empty()
            && self.missing_properties.is_empty()
            && self.subclass_mismatches.is_empty()
    }
}

/// One drift check run
///
/// Holds both snapshots and the namespace under comparison, so that
/// repeated runs never share state.
#[derive(Debug, Clone)]
pub struct DriftCheck {
    namespace: String,
    declared: OntologySnapshot,
    live: OntologySnapshot,
}

impl DriftCheck {
    pub fn new(namespace: impl Into<String>, declared: OntologySnapshot, live: OntologySnapshot) -> Self {
        Self {
            namespace: namespace.into(),
            declared,
            live,
        }
    }

    /// Snapshot the registry and the live ontology graph for the cpmeta namespace
    pub fn against_live(
        registry: &KindRegistry,
        executor: &dyn QueryExecutor,
    ) -> Result<Self, MetaError> {
        let declared = OntologySnapshot::from_registry(registry)?;
        let live = Self::fetch_live(executor, ONTOLOGY_GRAPH)?;
        Ok(Self::new(CPMETA_NS, declared, live))
    }

    /// Read classes, properties and subclass edges from an ontology graph
    pub fn fetch_live(executor: &dyn QueryExecutor, graph: &str) -> Result<OntologySnapshot, MetaError> {
        let mut snapshot = OntologySnapshot::default();

        for row in executor.execute(&class_query(graph))? {
            let Some(class) = identity_value(&row, "class") else {
                continue;
            };
            snapshot.classes.insert(class.to_string());
            if let Some(superclass) = identity_value(&row, "superclass") {
                snapshot.add_superclass(class, superclass);
            }
        }

        for row in executor.execute(&property_query(graph))? {
            if let Some(property) = identity_value(&row, "property") {
                snapshot.properties.insert(property.to_string());
            }
        }

        debug!(
            graph,
            classes = snapshot.classes.len(),
            properties = snapshot.properties.len(),
            "Fetched live ontology"
        );
        Ok(snapshot)
    }

    pub fn declared(&self) -> &OntologySnapshot {
        &self.declared
    }

    pub fn live(&self) -> &OntologySnapshot {
        &self.live
    }

    fn in_namespace(&self, iri: &str) -> bool {
        iri.starts_with(&self.namespace)
    }

    /// Compare the declared snapshot with the live one
    pub fn diff(&self) -> DriftReport {
        let missing_classes = self
            .declared
            .classes
            .iter()
            .filter(|c| self.in_namespace(c) && !self.live.classes.contains(*c))
            .cloned()
            .collect();

        let missing_properties = self
            .declared
            .properties
            .iter()
            .filter(|p| self.in_namespace(p) && !self.live.properties.contains(*p))
            .cloned()
            .collect();

        let mut subclass_mismatches = Vec::new();
        for (class, parents) in &self.declared.superclasses {
            if !self.in_namespace(class) || !self.live.classes.contains(class) {
                continue;
            }
            let live_superclasses = self.live.transitive_superclasses(class);
            for parent in parents.iter().filter(|p| self.in_namespace(p)) {
                if !live_superclasses.contains(parent) {
                    subclass_mismatches.push(SubclassMismatch {
                        class: class.clone(),
                        declared_parent: parent.clone(),
                        live_superclasses: live_superclasses.iter().cloned().collect(),
                    });
                }
            }
        }

        let unmapped_classes = self
            .live
            .classes
            .iter()
            .filter(|c| self.in_namespace(c) && !self.declared.classes.contains(*c))
            .cloned()
            .collect();

        let report = DriftReport {
            namespace: self.namespace.clone(),
            missing_classes,
            missing_properties,
            subclass_mismatches,
            unmapped_classes,
        };
        info!(
            missing_classes = report.missing_classes.len(),
            missing_properties = report.missing_properties.len(),
            subclass_mismatches = report.subclass_mismatches.len(),
            unmapped_classes = report.unmapped_classes.len(),
            "Drift check complete"
        );
        report
    }
}

/// Blank-node superclasses (restrictions, unions) come back as literals and are ignored
fn identity_value<'r>(row: &'r BindingRow, var: &str) -> Option<&'r str> {
    row.get(var)
        .filter(|b| b.is_identity())
        .map(|b| b.value.as_str())
}

/// Query listing classes with their direct superclasses
pub fn class_query(graph: &str) -> String {
    format!(
        "{}\nselect distinct ?class ?superclass\nfrom <{}>\nwhere {{\n\
         \tVALUES ?classType {{ owl:Class rdfs:Class }}\n\
         \t?class a ?classType .\n\
         \tOPTIONAL {{ ?class rdfs:subClassOf ?superclass }}\n}}\n",
        prefix_preamble(),
        graph
    )
}

/// Query listing declared properties
pub fn property_query(graph: &str) -> String {
    format!(
        "{}\nselect distinct ?property\nfrom <{}>\nwhere {{\n\
         \tVALUES ?propertyType {{ owl:ObjectProperty owl:DatatypeProperty owl:AnnotationProperty rdf:Property }}\n\
         \t?property a ?propertyType .\n}}\n",
        prefix_preamble(),
        graph
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Binding;

    const NS: &str = "http://meta.icos-cp.eu/ontologies/cpmeta/";

    fn cp(local: &str) -> String {
        format!("{}{}", NS, local)
    }

    fn snapshot(classes: &[&str], properties: &[&str], edges: &[(&str, &str)]) -> OntologySnapshot {
        let mut snapshot = OntologySnapshot {
            classes: classes.iter().map(|c| cp(c)).collect(),
            properties: properties.iter().map(|p| cp(p)).collect(),
            ..OntologySnapshot::default()
        };
        for (class, superclass) in edges {
            snapshot.add_superclass(&cp(class), &cp(superclass));
        }
        snapshot
    }

    /// Dispatches on the selected variable
    struct OntologyGraph {
        classes: Vec<BindingRow>,
        properties: Vec<BindingRow>,
    }

    impl QueryExecutor for OntologyGraph {
        fn execute(&self, query: &str) -> Result<Vec<BindingRow>, MetaError> {
            if query.contains("select distinct ?property") {
                Ok(self.properties.clone())
            } else {
                Ok(self.classes.clone())
            }
        }
    }

    fn row(pairs: &[(&str, Binding)]) -> BindingRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_from_registry() {
        let registry = KindRegistry::builtin().unwrap();
        let snapshot = OntologySnapshot::from_registry(&registry).unwrap();

        assert!(snapshot.classes.contains(&cp("Station")));
        assert!(snapshot.classes.contains("http://www.w3.org/ns/prov#Agent"));
        assert!(!snapshot.classes.contains(&cp("stationTimeSeries")));
        assert!(snapshot.properties.contains(&cp("hasName")));
        assert!(snapshot.properties.contains(&cp("hasPolicy")));
        assert!(snapshot.properties.contains(&cp("hideFromSearchPolicy")));
        assert!(snapshot.superclasses[&cp("Station")].contains(&cp("Organization")));
    }

    #[test]
    fn test_transitive_superclasses() {
        let snapshot = snapshot(
            &["AS", "Station", "Organization"],
            &[],
            &[("AS", "Station"), ("Station", "Organization"), ("Organization", "AS")],
        );
        let reached = snapshot.transitive_superclasses(&cp("AS"));
        assert_eq!(reached.len(), 2);
        assert!(reached.contains(&cp("Organization")));
    }

    #[test]
    fn test_diff() {
        let declared = snapshot(
            &["Station", "Organization", "Instrument", "AS"],
            &["hasName", "hasStationId", "hasOldProperty"],
            &[("AS", "Station"), ("Station", "Organization"), ("Instrument", "Organization")],
        );
        let mut live = snapshot(
            &["Station", "Organization", "AS", "Instrument", "Sensor"],
            &["hasName", "hasStationId"],
            &[("AS", "Station"), ("Station", "Organization")],
        );
        live.add_superclass(&cp("Instrument"), "http://www.w3.org/ns/prov#Entity");

        let report = DriftCheck::new(NS, declared, live).diff();

        assert!(report.missing_classes.is_empty());
        assert_eq!(report.missing_properties, vec![cp("hasOldProperty")]);
        assert_eq!(
            report.subclass_mismatches,
            vec![SubclassMismatch {
                class: cp("Instrument"),
                declared_parent: cp("Organization"),
                live_superclasses: vec!["http://www.w3.org/ns/prov#Entity".to_string()],
            }]
        );
        assert_eq!(report.unmapped_classes, vec![cp("Sensor")]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_diff_ignores_other_namespaces() {
        let mut declared = snapshot(&["Station"], &[], &[]);
        declared.classes.insert("http://www.w3.org/ns/prov#Agent".to_string());
        declared
            .properties
            .insert("http://www.w3.org/2000/01/rdf-schema#label".to_string());
        let live = snapshot(&["Station", "Retired"], &[], &[]);

        let report = DriftCheck::new(NS, declared, live).diff();
        assert!(report.is_clean());
        assert_eq!(report.unmapped_classes, vec![cp("Retired")]);
    }

    #[test]
    fn test_fetch_live() {
        let graph = OntologyGraph {
            classes: vec![
                row(&[("class", Binding::identity(cp("Station")))]),
                row(&[
                    ("class", Binding::identity(cp("AS"))),
                    ("superclass", Binding::identity(cp("Station"))),
                ]),
                row(&[
                    ("class", Binding::identity(cp("AS"))),
                    ("superclass", Binding::literal("b12")),
                ]),
            ],
            properties: vec![row(&[("property", Binding::identity(cp("hasName")))])],
        };

        let live = DriftCheck::fetch_live(&graph, ONTOLOGY_GRAPH).unwrap();
        assert_eq!(live, snapshot(&["Station", "AS"], &["hasName"], &[("AS", "Station")]));
    }

    #[test]
    fn test_queries_read_the_ontology_graph() {
        assert!(class_query(ONTOLOGY_GRAPH)
            .contains("from <http://meta.icos-cp.eu/ontologies/cpmeta/>"));
        assert!(property_query(ONTOLOGY_GRAPH).contains("owl:DatatypeProperty"));
    }
}
