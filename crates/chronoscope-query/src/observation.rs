//! Observation extractor: projects SOSA observations out of a parsed graph.
//!
//! Shape read per observation subject `?o`:
//!
//! ```text
//! ?o a sosa:Observation ;
//!    sosa:resultTime "2024-05-01T08:00:00Z" ;
//!    sosa:hasResult [ qudt:numericValue 21.5 ; qudt:hasUnit unit:DEG_C ] .
//! ```
//!
//! Multi-valued properties are read in term order. Only the first result time
//! is used. The first result carrying a numeric value supplies both value and
//! unit; any further results are ignored.

use crate::filter::StructuralFilter;
use crate::time::parse_instant;
use chrono::{DateTime, Utc};
use chronoscope_core::vocab::{iri, qudt, rdf, sosa};
use chronoscope_core::graph::as_subject;
use chronoscope_core::{term_value, NamedOrBlankNodeRef, TriplePattern};

/// One decoded sensor reading. Ordering is lexical over
/// `(timestamp, value, unit)`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObservationRecord {
    pub timestamp: String,
    pub value: String,
    pub unit: Option<String>,
}

impl ObservationRecord {
    pub fn new(timestamp: impl Into<String>, value: impl Into<String>, unit: Option<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: value.into(),
            unit,
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.timestamp)
    }

    /// `timestamp, value, unit` with an empty unit field when none is known.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{}, {}, {}",
            self.timestamp,
            self.value,
            self.unit.as_deref().unwrap_or_default()
        )
    }

    pub fn from_csv_line(line: &str) -> Option<Self> {
        let mut fields = line.splitn(3, ", ");
        let timestamp = fields.next()?;
        let value = fields.next()?;
        let unit = fields.next()?;
        Some(Self::new(
            timestamp,
            value,
            (!unit.is_empty()).then(|| unit.to_string()),
        ))
    }
}

/// Subjects typed `sosa:Observation`.
pub fn observation_subjects<G: TriplePattern>(graph: &G) -> Vec<NamedOrBlankNodeRef<'_>> {
    graph.subjects(iri(rdf::TYPE), iri(sosa::OBSERVATION).into())
}

/// Project one observation subject. `None` when it lacks a result time or a
/// numeric value.
pub fn project<G: TriplePattern>(
    graph: &G,
    subject: NamedOrBlankNodeRef<'_>,
) -> Option<ObservationRecord> {
    let timestamp = graph
        .objects(subject, iri(sosa::RESULT_TIME))
        .into_iter()
        .find_map(term_value)?
        .to_string();

    graph
        .objects(subject, iri(sosa::HAS_RESULT))
        .into_iter()
        .filter_map(as_subject)
        .find_map(|result| {
            let value = graph
                .objects(result, iri(qudt::NUMERIC_VALUE))
                .into_iter()
                .find_map(term_value)?
                .to_string();
            let unit = graph
                .objects(result, iri(qudt::HAS_UNIT))
                .into_iter()
                .find_map(term_value)
                .map(str::to_string);
            Some(ObservationRecord::new(timestamp.clone(), value, unit))
        })
}

/// Every observation in `graph` that passes the structural filter.
pub fn extract<G: TriplePattern>(graph: &G, filter: &StructuralFilter) -> Vec<ObservationRecord> {
    observation_subjects(graph)
        .into_iter()
        .filter(|subject| filter.admits(graph, *subject))
        .filter_map(|subject| project(graph, subject))
        .collect()
}
