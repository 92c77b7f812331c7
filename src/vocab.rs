//! Vocabulary definitions for Carbon Portal metadata queries
//!
//! Defines the namespace table shared by every generated query, the
//! well-known properties the query builder keys its filters on, and the
//! link names the flattener refuses to follow.

/// Carbon Portal metadata ontology
pub const CPMETA_NS: &str = "http://meta.icos-cp.eu/ontologies/cpmeta/";

/// Carbon Portal metadata resources (specs, dataset types, individuals)
pub const CPRES_NS: &str = "http://meta.icos-cp.eu/resources/cpmeta/";

pub const PROV_NS: &str = "http://www.w3.org/ns/prov#";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";

/// Prefix table rendered at the top of every query
pub const NAMESPACES: &[(&str, &str)] = &[
    ("cpmeta", CPMETA_NS),
    ("cpres", CPRES_NS),
    ("prov", PROV_NS),
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("owl", OWL_NS),
    ("xsd", XSD_NS),
    ("dcterms", DCTERMS_NS),
];

/// Identity values outside this prefix are not part of the metadata universe
pub const METADATA_PREFIX: &str = "http://meta.icos-cp.eu/";

/// Named graph holding the ontology itself
pub const ONTOLOGY_GRAPH: &str = "http://meta.icos-cp.eu/ontologies/cpmeta/";

/// Default public SPARQL endpoint
pub const DEFAULT_ENDPOINT: &str = "https://meta.icos-cp.eu/sparql";

/// Query variable holding the root entity identifier
pub const ROOT_VAR: &str = "uri";

/// Query variable used for the spec restriction of leaf product kinds
pub const PRODUCT_SPEC_VAR: &str = "productSpec";

/// Query variable bound to the submission end time by date filters
pub const SUBMISSION_TIME_VAR: &str = "submissionTime";

/// Links an object to its submission activity
pub const SUBMISSION_PROPERTY: &str = "cpmeta:wasSubmittedBy";

/// Time property of the submission activity used by date filters
pub const SUBMISSION_TIME_PROPERTY: &str = "prov:endedAtTime";

/// Links a new object version to the one it supersedes
pub const NEXT_VERSION_PROPERTY: &str = "cpmeta:isNextVersionOf";

/// Links a data object to its spec
pub const SPEC_PROPERTY: &str = "cpmeta:hasObjectSpec";

/// Links a spec to its specific dataset type
pub const DATASET_TYPE_PROPERTY: &str = "cpmeta:hasSpecificDatasetType";

/// Attribute names that form back-references in the provenance graph
pub const DO_NOT_RECURSE: &[&str] = &["isNextVersionOf", "hadPrimarySource", "hasPart"];

/// Serialization of timestamps inside filter clauses
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Render the `prefix` preamble for all known namespaces
pub fn prefix_preamble() -> String {
    NAMESPACES
        .iter()
        .map(|(prefix, ns)| format!("prefix {}: <{}>\n", prefix, ns))
        .collect()
}

/// Expand a prefixed name (`cpmeta:hasName`) or bracketed IRI to a full IRI
pub fn expand_curie(term: &str) -> Option<String> {
    if let Some(iri) = term.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Some(iri.to_string());
    }
    let (prefix, local) = term.split_once(':')?;
    NAMESPACES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, ns)| format!("{}{}", ns, local))
}

/// Shorten a full IRI to a prefixed name when a namespace matches
pub fn compact_iri(iri: &str) -> String {
    for (prefix, ns) in NAMESPACES {
        if let Some(local) = iri.strip_prefix(ns) {
            if !local.is_empty() && !local.contains(['/', '#']) {
                return format!("{}:{}", prefix, local);
            }
        }
    }
    format!("<{}>", iri)
}
