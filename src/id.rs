//! IRI classification and identifier derivation
//!
//! Decides which identity values belong to the metadata universe, which
//! strings may be used as query variables, and how a root entity IRI is
//! turned into a dataset identifier.

use url::Url;

/// Classification of an identity value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IriKind {
    /// Absolute IRI inside the metadata namespace: dereferenceable
    Metadata,
    /// Absolute IRI outside the metadata namespace: kept as a plain value
    Foreign,
    /// Not an absolute IRI at all
    NotAbsolute,
}

/// Classify an identity value against the known metadata prefix
pub fn classify_iri(value: &str, metadata_prefix: &str) -> IriKind {
    if !is_absolute_iri(value) {
        IriKind::NotAbsolute
    } else if value.starts_with(metadata_prefix) {
        IriKind::Metadata
    } else {
        IriKind::Foreign
    }
}

/// Check that a string is a well-formed absolute IRI usable inside `<...>`
pub fn is_absolute_iri(value: &str) -> bool {
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || "<>\"{}|^`\\".contains(c))
    {
        return false;
    }
    Url::parse(value).is_ok()
}

/// Check that a string is a usable SPARQL variable name
pub fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Derive a dataset identifier from a root entity IRI
///
/// "https://meta.icos-cp.eu/objects/a9Xk-3Bz" -> "a9Xk_3Bz"
/// "http://meta.icos-cp.eu/resources/stations/AS_HTM" -> "AS_HTM"
/// "https://meta.icos-cp.eu/objects/1abc" -> "cp_1abc"
pub fn dataset_id(uri: &str) -> String {
    let trimmed = uri.trim_end_matches(['/', '#']);
    let segment = trimmed
        .rsplit(['/', '#'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(trimmed);

    let sanitized: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    match sanitized.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => sanitized,
        _ => format!("cp_{}", sanitized),
    }
}
