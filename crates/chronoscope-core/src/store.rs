//! Resource store abstraction: the read interface every evaluator consumes.
//!
//! Stores are layered: a decorator wraps a source store and either answers a
//! request itself or forwards it. `MemoryStore` is the in-process backend used
//! by tests and by anything that wants to serve a fixed set of resources.

use crate::error::{Error, Result};
use crate::graph::{NamedNode, Term};
use crate::parser::TURTLE;
use crate::types::{
    Body, Conditions, Representation, RepresentationMetadata, RepresentationPreferences,
    ResourceIdentifier,
};
use crate::vocab::{iri, ldp, rdf};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Read side of a hierarchical resource store.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch the representation of `identifier`. Fails with
    /// `Error::NotFound` when nothing is stored there.
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&Conditions>,
    ) -> Result<Representation>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct StoredResource {
    content_type: String,
    data: Bytes,
    metadata: Vec<(String, Term)>,
}

/// Counts a body handle as open until dropped.
struct HandleGuard(Arc<AtomicUsize>);

impl HandleGuard {
    fn open(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory store. Every body it hands out is guarded, so callers can check
/// that all handles were released.
#[derive(Default)]
pub struct MemoryStore {
    resources: DashMap<String, StoredResource>,
    open_handles: Arc<AtomicUsize>,
    fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document. Replaces any existing resource, metadata included.
    pub fn insert_resource(
        &self,
        identifier: impl Into<String>,
        content_type: &str,
        data: impl Into<Bytes>,
    ) {
        let resource = StoredResource {
            content_type: content_type.to_string(),
            data: data.into(),
            metadata: vec![(rdf::TYPE.to_string(), iri(ldp::RESOURCE).into())],
        };
        self.resources.insert(identifier.into(), resource);
    }

    /// Store a container listing `members`. The body is the metadata as
    /// N-Triples.
    pub fn insert_container<I, M>(&self, identifier: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let mut metadata: Vec<(String, Term)> = vec![
            (rdf::TYPE.to_string(), iri(ldp::CONTAINER).into()),
            (rdf::TYPE.to_string(), iri(ldp::BASIC_CONTAINER).into()),
        ];
        for member in members {
            let member = NamedNode::new_unchecked(member);
            metadata.push((ldp::CONTAINS.to_string(), member.into()));
        }
        let resource = StoredResource {
            content_type: TURTLE.to_string(),
            data: Bytes::new(),
            metadata,
        };
        self.resources.insert(identifier.into(), resource);
    }

    /// Add `<identifier> predicate object` to an existing resource's metadata.
    pub fn add_metadata(
        &self,
        identifier: &str,
        predicate: &str,
        object: impl Into<Term>,
    ) -> Result<()> {
        let mut resource = self
            .resources
            .get_mut(identifier)
            .ok_or_else(|| Error::not_found(identifier))?;
        resource.metadata.push((predicate.to_string(), object.into()));
        Ok(())
    }

    /// Body handles handed out and not yet released.
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Number of `get_representation` calls served, including misses.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        _preferences: &RepresentationPreferences,
        _conditions: Option<&Conditions>,
    ) -> Result<Representation> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let resource = self
            .resources
            .get(identifier.as_str())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found(identifier.as_str()))?;

        let mut metadata =
            RepresentationMetadata::new(identifier).with_content_type(&resource.content_type);
        for (predicate, object) in resource.metadata {
            metadata.add(&predicate, object);
        }

        let data = if resource.data.is_empty() && identifier.is_container() {
            Bytes::from(metadata.graph().to_string())
        } else {
            resource.data
        };
        debug!("memory store served {} ({} bytes)", identifier, data.len());

        let body = Body::from_bytes(data).with_guard(HandleGuard::open(&self.open_handles));
        Ok(Representation::new(metadata, body))
    }
}
