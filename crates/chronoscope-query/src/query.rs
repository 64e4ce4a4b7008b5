//! Query string parsing: identifier splitting and `QuerySpec` validation

use crate::modal::ModalOperator;
use crate::time::{parse_instant, IsoDuration};
use chrono::{DateTime, Utc};
use chronoscope_core::{Error, ResourceIdentifier, Result};
use std::cmp::Ordering;

pub const OBSERVED_PROPERTY: &str = "observedProperty";
pub const MADE_BY_SENSOR: &str = "madeBySensor";
pub const INTERVAL_START: &str = "intervalStart";
pub const INTERVAL_END: &str = "intervalEnd";
pub const INTERVAL_ABSOLUTE_START: &str = "intervalAbsoluteStart";
pub const INTERVAL_ABSOLUTE_END: &str = "intervalAbsoluteEnd";
pub const VALUE: &str = "value";
pub const OPERATOR: &str = "operator";

/// Separate the query string from an identifier. The target is the
/// identifier text up to the first `?`, byte for byte; pairs keep their order
/// and duplicates. A fragment after the query is dropped.
pub fn split_query(identifier: &ResourceIdentifier) -> (ResourceIdentifier, Vec<(String, String)>) {
    match identifier.as_str().split_once('?') {
        Some((target, query)) => {
            let query = query.split_once('#').map_or(query, |(query, _)| query);
            (ResourceIdentifier::new(target), query_pairs(query))
        }
        None => (identifier.clone(), Vec::new()),
    }
}

fn query_pairs(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

// ---------------------------------------------------------------------------
// Value comparison
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Numeric when both sides parse as finite numbers, lexical otherwise.
pub fn compare_values(left: &str, right: &str) -> Option<Ordering> {
    match (parse_number(left), parse_number(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r),
        _ => Some(left.cmp(right)),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// The `value` parameter: an optional comparator prefix and an operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueFilter {
    pub comparator: Comparator,
    pub operand: String,
}

impl ValueFilter {
    pub fn parse(raw: &str) -> Self {
        let prefixes = [
            ("gte_", Comparator::Gte),
            ("gt_", Comparator::Gt),
            ("lte_", Comparator::Lte),
            ("lt_", Comparator::Lt),
        ];
        for (prefix, comparator) in prefixes {
            if let Some(operand) = raw.strip_prefix(prefix) {
                return Self {
                    comparator,
                    operand: operand.to_string(),
                };
            }
        }
        Self {
            comparator: Comparator::Eq,
            operand: raw.to_string(),
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        let Some(ordering) = compare_values(value, &self.operand) else {
            return false;
        };
        match self.comparator {
            Comparator::Eq => ordering == Ordering::Equal,
            Comparator::Gt => ordering == Ordering::Greater,
            Comparator::Gte => ordering != Ordering::Less,
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Lte => ordering != Ordering::Greater,
        }
    }
}

// ---------------------------------------------------------------------------
// QuerySpec
// ---------------------------------------------------------------------------

/// Validated query parameters for one request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuerySpec {
    pub observed_property: Option<String>,
    pub made_by_sensor: Option<String>,
    pub interval_start: Option<IsoDuration>,
    pub interval_end: Option<IsoDuration>,
    pub interval_absolute_start: Option<DateTime<Utc>>,
    pub interval_absolute_end: Option<DateTime<Utc>>,
    pub value: Option<ValueFilter>,
    pub operator: Option<ModalOperator>,
}

impl QuerySpec {
    /// Build from decoded pairs. The first occurrence of a key wins and
    /// unknown keys are ignored. Unparseable durations or instants fail.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self> {
        Ok(Self {
            observed_property: first(pairs, OBSERVED_PROPERTY).map(str::to_string),
            made_by_sensor: first(pairs, MADE_BY_SENSOR).map(str::to_string),
            interval_start: duration_param(pairs, INTERVAL_START)?,
            interval_end: duration_param(pairs, INTERVAL_END)?,
            interval_absolute_start: instant_param(pairs, INTERVAL_ABSOLUTE_START)?,
            interval_absolute_end: instant_param(pairs, INTERVAL_ABSOLUTE_END)?,
            value: first(pairs, VALUE).map(ValueFilter::parse),
            operator: first(pairs, OPERATOR).and_then(ModalOperator::parse),
        })
    }

    pub fn parse(query: &str) -> Result<Self> {
        Self::from_pairs(&query_pairs(query))
    }
}

fn first<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn duration_param(pairs: &[(String, String)], key: &str) -> Result<Option<IsoDuration>> {
    first(pairs, key)
        .map(|raw| IsoDuration::parse(raw).map_err(|m| Error::malformed_query(key, m)))
        .transpose()
}

fn instant_param(pairs: &[(String, String)], key: &str) -> Result<Option<DateTime<Utc>>> {
    first(pairs, key)
        .map(|raw| {
            parse_instant(raw).ok_or_else(|| {
                Error::malformed_query(key, format!("'{}' is not an ISO-8601 instant", raw))
            })
        })
        .transpose()
}
