//! SPARQL query construction
//!
//! Turns a kind, its composed attributes and a set of caller-supplied
//! filters into one complete query string. Filters arrive as loosely typed
//! JSON values (from the command line or a filters file) and are validated
//! here before anything is rendered.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;

use crate::compose::{compose, AttributeMap};
use crate::error::MetaError;
use crate::id::is_absolute_iri;
use crate::kind::{Kind, KindRegistry};
use crate::vocab::{
    prefix_preamble, CPRES_NS, DATASET_TYPE_PROPERTY, DATE_FORMAT, NEXT_VERSION_PROPERTY,
    PRODUCT_SPEC_VAR, ROOT_VAR, SPEC_PROPERTY, SUBMISSION_PROPERTY, SUBMISSION_TIME_PROPERTY,
    SUBMISSION_TIME_VAR,
};

/// Optional restrictions on the entities a query returns
///
/// Every field accepts the loose shapes callers actually send; `null` is
/// the same as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Filters {
    /// One IRI or a non-empty list of IRIs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Value>,
    /// Lower bound on the submission end time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<Value>,
    /// Upper bound on the submission end time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_until: Option<Value>,
    /// Spec IRI (or local name under the resources namespace), or a list of them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<Value>,
    /// Only objects with no newer version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_version_only: Option<Value>,
    /// Row limit; non-positive means unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Value>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: impl Into<Value>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_date_from(mut self, date: impl Into<Value>) -> Self {
        self.date_from = Some(date.into());
        self
    }

    pub fn with_date_until(mut self, date: impl Into<Value>) -> Self {
        self.date_until = Some(date.into());
        self
    }

    pub fn with_product_type(mut self, product_type: impl Into<Value>) -> Self {
        self.product_type = Some(product_type.into());
        self
    }

    pub fn with_last_version_only(mut self, flag: impl Into<Value>) -> Self {
        self.last_version_only = Some(flag.into());
        self
    }

    pub fn with_limit(mut self, limit: impl Into<Value>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Fields set in `overrides` replace the ones in `self`
    pub fn overridden_by(self, overrides: Filters) -> Filters {
        Filters {
            identity: overrides.identity.or(self.identity),
            date_from: overrides.date_from.or(self.date_from),
            date_until: overrides.date_until.or(self.date_until),
            product_type: overrides.product_type.or(self.product_type),
            last_version_only: overrides.last_version_only.or(self.last_version_only),
            limit: overrides.limit.or(self.limit),
        }
    }
}

/// A validated IRI restriction on one query variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restriction {
    Exact(String),
    OneOf(Vec<String>),
}

impl Restriction {
    fn render_values(&self, var: &str) -> Option<String> {
        match self {
            Restriction::OneOf(iris) => {
                let list: Vec<String> = iris.iter().map(|iri| format!("<{}>", iri)).collect();
                Some(format!("VALUES ?{} {{ {} }}", var, list.join(" ")))
            }
            Restriction::Exact(_) => None,
        }
    }

    fn render_filter(&self, var: &str) -> Option<String> {
        match self {
            Restriction::Exact(iri) => Some(format!("FILTER(?{} = <{}>)", var, iri)),
            Restriction::OneOf(_) => None,
        }
    }
}

/// Build the query for a kind, composing its attributes from the registry
pub fn build_query(
    registry: &KindRegistry,
    kind: &Kind,
    filters: &Filters,
) -> Result<String, MetaError> {
    let attributes = compose(registry, kind)?;
    build_query_with(kind, &attributes, filters)
}

/// Build the query for a kind whose attributes are already composed
pub fn build_query_with(
    kind: &Kind,
    attributes: &AttributeMap,
    filters: &Filters,
) -> Result<String, MetaError> {
    // Validate everything before rendering anything
    let identity = identity_restriction(present(&filters.identity))?;
    let product = if kind.leaf_product {
        product_restriction(present(&filters.product_type))?
    } else {
        None
    };
    let date_from = present(&filters.date_from)
        .map(format_filter_date)
        .transpose()?;
    let date_until = present(&filters.date_until)
        .map(format_filter_date)
        .transpose()?;
    let last_version_only = last_version_flag(present(&filters.last_version_only))?;
    let limit = coerce_limit(present(&filters.limit))?;

    let mut query = prefix_preamble();
    query.push('\n');

    let _ = write!(query, "select distinct ?{}", ROOT_VAR);
    for name in attributes.names() {
        let _ = write!(query, " ?{}", name);
    }
    query.push_str("\nwhere {\n");

    let mut clauses: Vec<String> = Vec::new();

    if let Some(values) = identity.as_ref().and_then(|r| r.render_values(ROOT_VAR)) {
        clauses.push(values);
    }
    if let Some(values) = product.as_ref().and_then(|r| r.render_values(PRODUCT_SPEC_VAR)) {
        clauses.push(values);
    }

    if kind.leaf_product {
        clauses.push(format!("?{} {} ?{} .", ROOT_VAR, SPEC_PROPERTY, PRODUCT_SPEC_VAR));
        clauses.push(format!(
            "?{} {} <{}> .",
            PRODUCT_SPEC_VAR, DATASET_TYPE_PROPERTY, kind.canonical_type
        ));
    } else {
        clauses.push(format!(
            "?{} rdf:type/rdfs:subClassOf* <{}> .",
            ROOT_VAR, kind.canonical_type
        ));
    }

    if let Some(filter) = identity.as_ref().and_then(|r| r.render_filter(ROOT_VAR)) {
        clauses.push(filter);
    }
    if let Some(filter) = product.as_ref().and_then(|r| r.render_filter(PRODUCT_SPEC_VAR)) {
        clauses.push(filter);
    }

    if attributes.contains_property(SUBMISSION_PROPERTY)
        && (date_from.is_some() || date_until.is_some())
    {
        clauses.push(format!(
            "?{} {}/{} ?{} .",
            ROOT_VAR, SUBMISSION_PROPERTY, SUBMISSION_TIME_PROPERTY, SUBMISSION_TIME_VAR
        ));
        if let Some(from) = &date_from {
            clauses.push(format!(
                "FILTER(?{} >= \"{}\"^^xsd:dateTime)",
                SUBMISSION_TIME_VAR, from
            ));
        }
        if let Some(until) = &date_until {
            clauses.push(format!(
                "FILTER(?{} <= \"{}\"^^xsd:dateTime)",
                SUBMISSION_TIME_VAR, until
            ));
        }
    }

    if last_version_only && attributes.contains_property(NEXT_VERSION_PROPERTY) {
        clauses.push(format!(
            "FILTER NOT EXISTS {{ [] {} ?{} }}",
            NEXT_VERSION_PROPERTY, ROOT_VAR
        ));
    }

    for (property, name) in attributes.iter() {
        clauses.push(format!("OPTIONAL {{ ?{} {} ?{} }}", ROOT_VAR, property, name));
    }

    for clause in clauses {
        query.push('\t');
        query.push_str(&clause);
        query.push('\n');
    }
    query.push_str("}\n");
    query.push_str(&limit_clause(limit));

    Ok(query)
}

/// Treat JSON `null` as absent
fn present(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

fn identity_restriction(value: Option<&Value>) -> Result<Option<Restriction>, MetaError> {
    let value = match value {
        Some(v) => v,
        None => return Ok(None),
    };
    iri_restriction("identity", value, |s| {
        if is_absolute_iri(s) {
            Ok(s.to_string())
        } else {
            Err(MetaError::invalid_filter(
                "identity",
                format!("'{}' is not an absolute IRI", s),
            ))
        }
    })
    .map(Some)
}

fn product_restriction(value: Option<&Value>) -> Result<Option<Restriction>, MetaError> {
    let value = match value {
        Some(v) => v,
        None => return Ok(None),
    };
    iri_restriction("productType", value, |s| {
        let iri = if is_absolute_iri(s) {
            s.to_string()
        } else {
            format!("{}{}", CPRES_NS, s)
        };
        if s.is_empty() || !is_absolute_iri(&iri) {
            return Err(MetaError::invalid_filter(
                "productType",
                format!("'{}' is not a spec IRI or local name", s),
            ));
        }
        Ok(iri)
    })
    .map(Some)
}

/// A string gives an exact restriction, a non-empty list of strings a set restriction
fn iri_restriction(
    filter: &str,
    value: &Value,
    resolve: impl Fn(&str) -> Result<String, MetaError>,
) -> Result<Restriction, MetaError> {
    match value {
        Value::String(s) => Ok(Restriction::Exact(resolve(s)?)),
        Value::Array(items) if !items.is_empty() => {
            let mut iris = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => iris.push(resolve(s)?),
                    other => {
                        return Err(MetaError::invalid_filter(
                            filter,
                            format!("list entries must be strings, got {}", other),
                        ))
                    }
                }
            }
            Ok(Restriction::OneOf(iris))
        }
        Value::Array(_) => Err(MetaError::invalid_filter(filter, "empty list")),
        other => Err(MetaError::invalid_filter(
            filter,
            format!("expected a string or a list of strings, got {}", other),
        )),
    }
}

/// Parse a caller-supplied date into the canonical UTC timestamp string
///
/// Accepts RFC 3339, naive date-times (taken as UTC) and plain dates.
pub fn format_timestamp(input: &str) -> Result<String, MetaError> {
    let trimmed = input.trim();
    let parsed: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        dt.with_timezone(&Utc)
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.and_utc()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        dt.and_utc()
    } else if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)
            .ok_or_else(|| MetaError::InvalidDate(input.to_string()))?
            .and_utc()
    } else {
        return Err(MetaError::InvalidDate(input.to_string()));
    };
    Ok(parsed.format(DATE_FORMAT).to_string())
}

fn format_filter_date(value: &Value) -> Result<String, MetaError> {
    match value {
        Value::String(s) => format_timestamp(s),
        other => Err(MetaError::InvalidDate(other.to_string())),
    }
}

fn last_version_flag(value: Option<&Value>) -> Result<bool, MetaError> {
    match value {
        None => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(other) if is_truthy(other) => Err(MetaError::invalid_filter(
            "lastVersionOnly",
            format!("expected a boolean, got {}", other),
        )),
        Some(_) => Ok(false),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Coerce a limit to a positive row count; non-positive means no limit
pub fn coerce_limit(value: Option<&Value>) -> Result<Option<u64>, MetaError> {
    let limit: i64 = match value {
        None => return Ok(None),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.is_finite() => f.trunc() as i64,
            _ => {
                return Err(MetaError::invalid_filter(
                    "limit",
                    format!("{} is not an integer", n),
                ))
            }
        },
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| {
            MetaError::invalid_filter("limit", format!("'{}' is not an integer", s))
        })?,
        Some(other) => {
            return Err(MetaError::invalid_filter(
                "limit",
                format!("expected an integer, got {}", other),
            ))
        }
    };
    Ok((limit > 0).then_some(limit as u64))
}

fn limit_clause(limit: Option<u64>) -> String {
    match limit {
        Some(n) => format!("limit {}\n", n),
        None => String::new(),
    }
}
