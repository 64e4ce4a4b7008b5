//! Filter pipeline
//!
//! Order is fixed: structural filters run during extraction, then the
//! interval bounds, then the record count is snapshotted, then the value
//! filter. The snapshot is what `box` compares against.

use crate::observation::ObservationRecord;
use crate::query::{QuerySpec, ValueFilter};
use chrono::{DateTime, Utc};
use chronoscope_core::vocab::{iri, sosa};
use chronoscope_core::{Error, NamedOrBlankNodeRef, Result, TriplePattern};

/// Existence checks on the observation subject, evaluated against the graph
/// before projection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructuralFilter {
    pub observed_property: Option<String>,
    pub made_by_sensor: Option<String>,
}

impl StructuralFilter {
    pub fn from_spec(spec: &QuerySpec) -> Self {
        Self {
            observed_property: spec.observed_property.clone(),
            made_by_sensor: spec.made_by_sensor.clone(),
        }
    }

    pub fn admits<G: TriplePattern>(&self, graph: &G, subject: NamedOrBlankNodeRef<'_>) -> bool {
        let asserted = |predicate: &str, object: &Option<String>| match object {
            Some(object) => graph.has(Some(subject), iri(predicate), iri(object).into()),
            None => true,
        };
        asserted(sosa::OBSERVED_PROPERTY, &self.observed_property)
            && asserted(sosa::MADE_BY_SENSOR, &self.made_by_sensor)
    }
}

/// Conjunction of inclusive time bounds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntervalBounds {
    /// Records must not be later than any of these.
    pub not_after: Vec<DateTime<Utc>>,
    /// Records must not be earlier than any of these.
    pub not_before: Vec<DateTime<Utc>>,
}

impl IntervalBounds {
    /// Resolve relative bounds against `now`. `intervalStart` and
    /// `intervalAbsoluteStart` are upper bounds, the `End` pair lower bounds.
    pub fn resolve(spec: &QuerySpec, now: DateTime<Utc>) -> Result<Self> {
        let mut bounds = Self::default();
        let relative = [
            (crate::query::INTERVAL_START, &spec.interval_start, true),
            (crate::query::INTERVAL_END, &spec.interval_end, false),
        ];
        for (key, duration, upper) in relative {
            let Some(duration) = duration else { continue };
            let cutoff = duration
                .before(now)
                .ok_or_else(|| Error::malformed_query(key, "duration out of range"))?;
            if upper {
                bounds.not_after.push(cutoff);
            } else {
                bounds.not_before.push(cutoff);
            }
        }
        bounds.not_after.extend(spec.interval_absolute_start);
        bounds.not_before.extend(spec.interval_absolute_end);
        Ok(bounds)
    }

    pub fn is_unbounded(&self) -> bool {
        self.not_after.is_empty() && self.not_before.is_empty()
    }

    /// A record whose timestamp does not parse fails every bound.
    pub fn contains(&self, record: &ObservationRecord) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(at) = record.instant() else {
            return false;
        };
        self.not_after.iter().all(|bound| at <= *bound)
            && self.not_before.iter().all(|bound| at >= *bound)
    }
}

/// Records left after every filter, and how many there were before the value
/// filter ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub records: Vec<ObservationRecord>,
    pub original_value_count: usize,
}

/// Apply interval and value filters. Record order is preserved.
pub fn apply(records: Vec<ObservationRecord>, spec: &QuerySpec, now: DateTime<Utc>) -> Result<FilterOutcome> {
    let bounds = IntervalBounds::resolve(spec, now)?;
    let records: Vec<ObservationRecord> = records.into_iter().filter(|r| bounds.contains(r)).collect();
    let original_value_count = records.len();
    let records = match &spec.value {
        Some(filter) => apply_value(records, filter),
        None => records,
    };
    Ok(FilterOutcome {
        records,
        original_value_count,
    })
}

fn apply_value(records: Vec<ObservationRecord>, filter: &ValueFilter) -> Vec<ObservationRecord> {
    records.into_iter().filter(|r| filter.accepts(&r.value)).collect()
}
