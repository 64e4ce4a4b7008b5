//! IRIs of the vocabularies the evaluator reads.

use crate::graph::NamedNodeRef;

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

pub mod ldp {
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
    pub const RESOURCE: &str = "http://www.w3.org/ns/ldp#Resource";
}

pub mod tc {
    pub const TEMPORAL_CONTAINER: &str =
        "https://solid.ti.rw.fau.de/public/ns/tc#TemporalContainer";
}

pub mod sosa {
    pub const OBSERVATION: &str = "http://www.w3.org/ns/sosa/Observation";
    pub const OBSERVED_PROPERTY: &str = "http://www.w3.org/ns/sosa/observedProperty";
    pub const MADE_BY_SENSOR: &str = "http://www.w3.org/ns/sosa/madeBySensor";
    pub const RESULT_TIME: &str = "http://www.w3.org/ns/sosa/resultTime";
    pub const HAS_RESULT: &str = "http://www.w3.org/ns/sosa/hasResult";
}

pub mod qudt {
    // Published sensor data uses the unit namespace for numericValue.
    pub const NUMERIC_VALUE: &str = "http://qudt.org/vocab/unit/numericValue";
    pub const HAS_UNIT: &str = "http://qudt.org/schema/qudt/hasUnit";
}

/// Borrow an IRI as a named node. The IRI is not validated; lookups with a
/// malformed one simply match nothing.
pub const fn iri(value: &str) -> NamedNodeRef<'_> {
    NamedNodeRef::new_unchecked(value)
}
