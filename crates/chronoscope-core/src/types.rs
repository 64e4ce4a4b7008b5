//! Request and representation types shared by every store

use crate::graph::{Graph, NamedNode, Term, TermRef, TripleRef, TriplePattern};
use crate::vocab::iri;
use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt, TryStreamExt};
use std::any::Any;
use std::collections::BTreeMap;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Identifier of a stored resource. Containers end with `/`.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ResourceIdentifier {
    pub path: String,
}

impl ResourceIdentifier {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn is_container(&self) -> bool {
        self.path.ends_with('/')
    }
}

impl std::fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl From<&str> for ResourceIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ResourceIdentifier {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Media range preferences, keyed by range with a weight in `0.0..=1.0`.
#[derive(Clone, Debug, Default)]
pub struct RepresentationPreferences {
    pub types: BTreeMap<String, f32>,
}

impl RepresentationPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, range: impl Into<String>, weight: f32) -> Self {
        self.types.insert(range.into(), weight);
        self
    }

    /// Parse an HTTP `Accept` header. Entries without `q` weigh 1.0; entries
    /// with an unparseable `q` are dropped.
    pub fn from_accept(header: &str) -> Self {
        let mut prefs = Self::new();
        for entry in header.split(',') {
            let mut parts = entry.split(';').map(str::trim);
            let Some(range) = parts.next().filter(|r| !r.is_empty()) else {
                continue;
            };
            let mut weight = Some(1.0);
            for param in parts {
                if let Some(q) = param.strip_prefix("q=") {
                    weight = q.trim().parse::<f32>().ok().map(|w| w.clamp(0.0, 1.0));
                }
            }
            if let Some(w) = weight {
                prefs.types.insert(range.to_ascii_lowercase(), w);
            }
        }
        prefs
    }
}

/// Conditional request headers, forwarded to the backing store untouched.
#[derive(Clone, Debug, Default)]
pub struct Conditions {
    pub if_match: Option<Vec<String>>,
    pub if_none_match: Option<Vec<String>>,
}

impl Conditions {
    pub fn is_empty(&self) -> bool {
        self.if_match.is_none() && self.if_none_match.is_none()
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Lazily streamed payload of a representation.
///
/// A body may hold a guard owned by the store that produced it (a read lock,
/// an open file). The guard is released when the body is fully consumed or
/// dropped; `release` is the explicit form for bodies nobody reads.
pub struct Body {
    stream: BoxStream<'static, std::io::Result<Bytes>>,
    guard: Option<Box<dyn Any + Send + Sync>>,
}

impl Body {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        Self {
            stream: stream.boxed(),
            guard: None,
        }
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes: Bytes = bytes.into();
        Self::from_stream(futures::stream::once(async move { Ok(bytes) }))
    }

    pub fn empty() -> Self {
        Self::from_stream(futures::stream::empty())
    }

    /// Attach a guard that lives exactly as long as this body.
    pub fn with_guard(mut self, guard: impl Send + Sync + 'static) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Drain the stream into memory. The guard is released on return.
    pub async fn read_to_bytes(mut self) -> std::io::Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.stream.try_next().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    pub async fn read_to_string(self) -> std::io::Result<String> {
        let bytes = self.read_to_bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Discard the payload without reading it.
    pub fn release(self) {
        drop(self);
    }
}

impl Stream for Body {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Body")
            .field("guarded", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Representation
// ---------------------------------------------------------------------------

/// Triples describing a resource, plus its content type.
///
/// `has` and `get_all` look at statements whose subject is the resource
/// itself; `graph` exposes everything.
#[derive(Clone, Debug)]
pub struct RepresentationMetadata {
    identifier: NamedNode,
    content_type: Option<String>,
    graph: Graph,
}

impl RepresentationMetadata {
    pub fn new(identifier: &ResourceIdentifier) -> Self {
        Self {
            // Identifiers are opaque store keys; they are not validated as IRIs.
            identifier: NamedNode::new_unchecked(identifier.as_str()),
            content_type: None,
            graph: Graph::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    /// Add `<self> predicate object`.
    pub fn add(&mut self, predicate: &str, object: impl Into<Term>) {
        let object = object.into();
        self.graph
            .insert(TripleRef::new(&self.identifier, iri(predicate), &object));
    }

    pub fn add_triple<'a>(&mut self, triple: impl Into<TripleRef<'a>>) {
        self.graph.insert(triple);
    }

    pub fn has<'a>(&self, predicate: &str, object: impl Into<TermRef<'a>>) -> bool {
        self.graph
            .has(Some((&self.identifier).into()), iri(predicate), object.into())
    }

    /// Objects of `<self> predicate ?o`, in term order.
    pub fn get_all(&self, predicate: &str) -> Vec<TermRef<'_>> {
        self.graph.objects((&self.identifier).into(), iri(predicate))
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

pub struct Representation {
    pub metadata: RepresentationMetadata,
    pub data: Body,
}

impl Representation {
    pub fn new(metadata: RepresentationMetadata, data: Body) -> Self {
        Self { metadata, data }
    }

    /// In-memory representation of `content` with the given content type.
    pub fn text(
        identifier: &ResourceIdentifier,
        content: impl Into<String>,
        content_type: &str,
    ) -> Self {
        let metadata = RepresentationMetadata::new(identifier).with_content_type(content_type);
        Self::new(metadata, Body::from_bytes(content.into()))
    }
}

impl std::fmt::Debug for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Representation")
            .field("metadata", &self.metadata)
            .field("data", &self.data)
            .finish()
    }
}
