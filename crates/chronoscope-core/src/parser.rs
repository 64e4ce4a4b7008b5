//! Graph parser: Turtle and N-Triples payloads into a `Graph`

use crate::error::{Error, Result};
use crate::graph::{Graph, Triple};
use crate::types::Representation;
use oxttl::{NTriplesParser, TurtleParser};
use tracing::debug;

pub const TURTLE: &str = "text/turtle";
pub const N_TRIPLES: &str = "application/n-triples";

/// Media type without parameters, lowercased.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn is_graph_type(content_type: &str) -> bool {
    matches!(essence(content_type).as_str(), TURTLE | N_TRIPLES)
}

/// Consume a representation's body and parse it. Representations without a
/// content type are read as Turtle.
pub async fn parse_representation(representation: Representation) -> Result<Graph> {
    let Representation { metadata, data } = representation;
    let identifier = metadata.identifier().to_string();
    let content_type = metadata
        .content_type()
        .map(essence)
        .unwrap_or_else(|| TURTLE.to_string());

    if !is_graph_type(&content_type) {
        data.release();
        return Err(Error::parse_failure(
            identifier,
            format!("{} is not a graph serialization", content_type),
        ));
    }

    let bytes = data.read_to_bytes().await?;
    parse_bytes(&identifier, &bytes, &content_type)
}

/// Parse an in-memory payload, resolving relative IRIs against `base_iri`.
pub fn parse_bytes(base_iri: &str, bytes: &[u8], content_type: &str) -> Result<Graph> {
    let graph = if essence(content_type) == N_TRIPLES {
        collect(base_iri, NTriplesParser::new().for_reader(bytes))?
    } else {
        let parser = match TurtleParser::new().with_base_iri(base_iri) {
            Ok(parser) => parser,
            Err(e) => {
                debug!("base {} rejected ({}), parsing without base", base_iri, e);
                TurtleParser::new()
            }
        };
        collect(base_iri, parser.for_reader(bytes))?
    };
    debug!("parsed {} triples from {}", graph.len(), base_iri);
    Ok(graph)
}

fn collect<I, E>(identifier: &str, triples: I) -> Result<Graph>
where
    I: Iterator<Item = std::result::Result<Triple, E>>,
    E: std::fmt::Display,
{
    let mut graph = Graph::new();
    for triple in triples {
        let triple = triple.map_err(|e| Error::parse_failure(identifier, e.to_string()))?;
        graph.insert(&triple);
    }
    Ok(graph)
}
