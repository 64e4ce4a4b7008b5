//! Tests for chronoscope-core: identifiers, preferences, graphs, parsing, the memory store

use chronoscope_core::parser::{parse_bytes, parse_representation, N_TRIPLES, TURTLE};
use chronoscope_core::vocab::{iri, ldp, rdf, sosa, tc};
use chronoscope_core::*;

// ===========================================================================
// ResourceIdentifier
// ===========================================================================

#[test]
fn identifier_container_detection() {
    assert!(ResourceIdentifier::new("http://pod.example/c/").is_container());
    assert!(!ResourceIdentifier::new("http://pod.example/c/r.ttl").is_container());
    let id: ResourceIdentifier = "http://pod.example/".into();
    assert_eq!(format!("{}", id), "http://pod.example/");
}

// ===========================================================================
// RepresentationPreferences
// ===========================================================================

#[test]
fn accept_header_weights() {
    let prefs = RepresentationPreferences::from_accept("Text/HTML, text/turtle;q=0.8, */*;q=0.1");
    assert_eq!(prefs.types.get("text/html"), Some(&1.0));
    assert_eq!(prefs.types.get("text/turtle"), Some(&0.8));
    assert_eq!(prefs.types.get("*/*"), Some(&0.1));
}

#[test]
fn accept_header_drops_bad_weights() {
    let prefs = RepresentationPreferences::from_accept("text/html;q=high, text/csv");
    assert!(!prefs.types.contains_key("text/html"));
    assert!(prefs.types.contains_key("text/csv"));
}

#[test]
fn empty_accept_header() {
    assert!(RepresentationPreferences::from_accept("").types.is_empty());
}

// ===========================================================================
// Graph
// ===========================================================================

#[test]
fn graph_deduplicates_and_answers_patterns() {
    let s = iri("http://ex.org/s");
    let time = Literal::new_simple_literal("2024-01-01T00:00:00Z");
    let mut graph = Graph::new();
    assert!(graph.insert(TripleRef::new(s, iri(rdf::TYPE), iri(sosa::OBSERVATION))));
    assert!(!graph.insert(TripleRef::new(s, iri(rdf::TYPE), iri(sosa::OBSERVATION))));
    graph.insert(TripleRef::new(s, iri(sosa::RESULT_TIME), &time));
    assert_eq!(graph.len(), 2);
    assert!(graph.has(Some(s.into()), iri(rdf::TYPE), iri(sosa::OBSERVATION).into()));
    assert!(graph.has(None, iri(rdf::TYPE), iri(sosa::OBSERVATION).into()));
    assert_eq!(
        graph.subjects(iri(rdf::TYPE), iri(sosa::OBSERVATION).into()),
        vec![NamedOrBlankNodeRef::from(s)]
    );
    let objects = graph.objects(s.into(), iri(sosa::RESULT_TIME));
    assert_eq!(term_value(objects[0]), Some("2024-01-01T00:00:00Z"));
}

#[test]
fn graph_display_is_ntriples() {
    let mut graph = Graph::new();
    graph.insert(&Triple::new(
        iri("http://pod.example/c/"),
        iri(ldp::CONTAINS),
        iri("http://pod.example/c/a"),
    ));
    assert_eq!(
        graph.to_string(),
        "<http://pod.example/c/> <http://www.w3.org/ns/ldp#contains> <http://pod.example/c/a> .\n"
    );
}

// ===========================================================================
// Parsing
// ===========================================================================

#[test]
fn turtle_relative_iris_resolve_against_identifier() {
    let graph = parse_bytes(
        "http://pod.example/c/r1",
        b"<#obs> a <http://www.w3.org/ns/sosa/Observation> .",
        TURTLE,
    )
    .unwrap();
    let subject = iri("http://pod.example/c/r1#obs");
    assert!(graph.has(Some(subject.into()), iri(rdf::TYPE), iri(sosa::OBSERVATION).into()));
}

#[test]
fn ntriples_parse() {
    let graph = parse_bytes(
        "http://pod.example/c/",
        b"<http://pod.example/c/> <http://www.w3.org/ns/ldp#contains> <http://pod.example/c/a> .\n",
        N_TRIPLES,
    )
    .unwrap();
    assert_eq!(graph.len(), 1);
}

#[test]
fn broken_turtle_is_parse_failure() {
    let err = parse_bytes("http://pod.example/r", b"<a> <b> ", TURTLE).unwrap_err();
    assert!(matches!(err, Error::ParseFailure { .. }));
}

#[tokio::test]
async fn non_graph_representation_is_parse_failure() {
    let rep = Representation::text(&"http://pod.example/r".into(), "<p>hi</p>", "text/html");
    let err = parse_representation(rep).await.unwrap_err();
    assert!(matches!(err, Error::ParseFailure { .. }));
}

#[tokio::test]
async fn content_type_parameters_are_ignored() {
    let rep = Representation::text(
        &"http://pod.example/r".into(),
        "<#a> <#b> <#c> .",
        "text/turtle; charset=utf-8",
    );
    assert_eq!(parse_representation(rep).await.unwrap().len(), 1);
}

// ===========================================================================
// MemoryStore
// ===========================================================================

#[tokio::test]
async fn container_metadata_round_trips_through_its_body() {
    let store = MemoryStore::new();
    store.insert_container(
        "http://pod.example/c/",
        vec!["http://pod.example/c/a", "http://pod.example/c/b"],
    );
    store
        .add_metadata("http://pod.example/c/", rdf::TYPE, iri(tc::TEMPORAL_CONTAINER))
        .unwrap();

    let rep = store
        .get_representation(&"http://pod.example/c/".into(), &Default::default(), None)
        .await
        .unwrap();
    assert!(rep.metadata.has(rdf::TYPE, iri(tc::TEMPORAL_CONTAINER)));
    assert_eq!(rep.metadata.get_all(ldp::CONTAINS).len(), 2);

    let graph = parse_representation(rep).await.unwrap();
    let container = iri("http://pod.example/c/");
    assert!(graph.has(Some(container.into()), iri(rdf::TYPE), iri(tc::TEMPORAL_CONTAINER).into()));
    assert_eq!(store.open_handles(), 0);
}

#[test]
fn metadata_on_missing_resource_is_not_found() {
    let store = MemoryStore::new();
    let err = store
        .add_metadata("http://pod.example/nope", rdf::TYPE, iri(ldp::RESOURCE))
        .unwrap_err();
    assert!(err.is_not_found());
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn error_display() {
    assert_eq!(
        Error::malformed_query("intervalStart", "bad duration").to_string(),
        "malformed query parameter intervalStart: bad duration"
    );
    assert_eq!(Error::not_found("http://x/").to_string(), "resource not found: http://x/");
}
