//! Chronoscope Core - graph types, the resource store seam, configuration and errors

pub mod config;
pub mod error;
pub mod graph;
pub mod parser;
pub mod store;
pub mod types;
pub mod vocab;

pub use config::{ChronoscopeConfig, IndexConfig, MemberFailurePolicy, ServerConfig, TemporalConfig};
pub use error::{Error, Result};
pub use graph::{
    term_value, Graph, Literal, NamedNode, NamedNodeRef, NamedOrBlankNodeRef, Term, TermRef, Triple,
    TripleRef, TriplePattern,
};
pub use store::{MemoryStore, ResourceStore};
pub use types::*;
