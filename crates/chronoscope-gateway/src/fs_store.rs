//! Read-only filesystem store
//!
//! A directory tree served under a base URL. Directories are containers and
//! list their children with `ldp:contains`; a `.meta` Turtle sidecar next to a
//! resource (or inside a directory) adds triples to its metadata, which is
//! how a container is marked as a temporal container:
//!
//! ```text
//! data/temperature/.meta   <> a <https://solid.ti.rw.fau.de/public/ns/tc#TemporalContainer> .
//! data/temperature/r1.ttl
//! data/temperature/r2.ttl
//! ```
//!
//! Child names are percent-encoded in listings and request segments are
//! decoded before they touch the filesystem.

use async_trait::async_trait;
use chronoscope_core::parser::{parse_bytes, TURTLE};
use chronoscope_core::vocab::{iri, ldp, rdf};
use chronoscope_core::{
    Body, Conditions, Error, NamedNode, Representation, RepresentationMetadata,
    RepresentationPreferences, ResourceIdentifier, ResourceStore, Result,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;
use tracing::debug;

const META_SUFFIX: &str = ".meta";

/// Characters escaped in a path segment: everything an IRI path forbids,
/// plus `%` and the separators.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

pub struct FsStore {
    root: PathBuf,
    base_url: String,
}

impl FsStore {
    pub fn new(root: impl AsRef<Path>, base_url: impl AsRef<str>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            base_url: format!("{}/", base_url.as_ref().trim_end_matches('/')),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map an identifier under the base URL onto a path below the root.
    fn resolve(&self, identifier: &ResourceIdentifier) -> Result<PathBuf> {
        let relative = identifier
            .as_str()
            .strip_prefix(&self.base_url)
            .or_else(|| (identifier.as_str() == self.base_url.trim_end_matches('/')).then_some(""))
            .ok_or_else(|| Error::not_found(identifier.as_str()))?;

        let mut path = self.root.clone();
        for raw in relative.split('/').filter(|s| !s.is_empty()) {
            let segment = percent_decode_str(raw)
                .decode_utf8()
                .map_err(|_| Error::InvalidIdentifier(identifier.to_string()))?;
            if segment == ".."
                || segment == "."
                || segment.contains(['/', '\\', '\0'])
            {
                return Err(Error::InvalidIdentifier(identifier.to_string()));
            }
            if segment.ends_with(META_SUFFIX) {
                return Err(Error::not_found(identifier.as_str()));
            }
            path.push(&*segment);
        }
        Ok(path)
    }

    async fn container(&self, identifier: &ResourceIdentifier, dir: &Path) -> Result<Representation> {
        let mut children = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(META_SUFFIX) {
                continue;
            }
            let is_dir = entry.file_type().await?.is_dir();
            let encoded = utf8_percent_encode(&name, SEGMENT).to_string();
            children.push(if is_dir { format!("{}/", encoded) } else { encoded });
        }
        children.sort();

        let mut metadata = RepresentationMetadata::new(identifier).with_content_type(TURTLE);
        metadata.add(rdf::TYPE, iri(ldp::CONTAINER));
        metadata.add(rdf::TYPE, iri(ldp::BASIC_CONTAINER));
        for child in &children {
            let member = format!("{}{}", identifier, child);
            let member = NamedNode::new(member.as_str())
                .map_err(|e| Error::InvalidIdentifier(format!("{}: {}", member, e)))?;
            metadata.add(ldp::CONTAINS, member);
        }
        self.merge_sidecar(identifier, &dir.join(META_SUFFIX), &mut metadata)
            .await?;

        debug!("listed {} ({} children)", identifier, children.len());
        let body = Body::from_bytes(metadata.graph().to_string());
        Ok(Representation::new(metadata, body))
    }

    async fn document(&self, identifier: &ResourceIdentifier, file: &Path) -> Result<Representation> {
        let handle = tokio::fs::File::open(file).await?;
        let mut metadata =
            RepresentationMetadata::new(identifier).with_content_type(content_type_for(file));
        metadata.add(rdf::TYPE, iri(ldp::RESOURCE));

        let mut sidecar = file.as_os_str().to_owned();
        sidecar.push(META_SUFFIX);
        self.merge_sidecar(identifier, Path::new(&sidecar), &mut metadata)
            .await?;

        debug!("streaming {}", file.display());
        Ok(Representation::new(metadata, Body::from_stream(ReaderStream::new(handle))))
    }

    async fn merge_sidecar(
        &self,
        identifier: &ResourceIdentifier,
        sidecar: &Path,
        metadata: &mut RepresentationMetadata,
    ) -> Result<()> {
        let bytes = match tokio::fs::read(sidecar).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let graph = parse_bytes(identifier.as_str(), &bytes, TURTLE)?;
        for triple in graph.iter() {
            metadata.add_triple(triple);
        }
        Ok(())
    }
}

/// Content type from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ttl") => TURTLE,
        Some("nt") => "application/n-triples",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl ResourceStore for FsStore {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        _preferences: &RepresentationPreferences,
        _conditions: Option<&Conditions>,
    ) -> Result<Representation> {
        let path = self.resolve(identifier)?;
        let stat = match tokio::fs::metadata(&path).await {
            Ok(stat) => stat,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::not_found(identifier.as_str()))
            }
            Err(e) => return Err(e.into()),
        };

        match (stat.is_dir(), identifier.is_container()) {
            (true, true) => self.container(identifier, &path).await,
            (false, false) => self.document(identifier, &path).await,
            // `/c` for a directory or `/r.ttl/` for a file
            _ => Err(Error::not_found(identifier.as_str())),
        }
    }
}
