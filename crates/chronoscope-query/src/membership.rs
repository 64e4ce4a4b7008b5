//! Membership resolver: is the target a temporal container, and what does it hold?

use chronoscope_core::vocab::{iri, ldp, rdf, tc};
use chronoscope_core::{
    Conditions, Representation, RepresentationPreferences, ResourceIdentifier, ResourceStore,
    Result, TermRef,
};
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Membership {
    /// The target lacks the temporal container type.
    NotTemporal,
    /// Member identifiers, capped; `total` counts them before the cap.
    Temporal {
        members: Vec<ResourceIdentifier>,
        total: usize,
    },
}

/// Fetch the target's representation and read its container metadata. The
/// body is released before anything else is inspected.
pub async fn resolve_membership(
    store: &dyn ResourceStore,
    target: &ResourceIdentifier,
    preferences: &RepresentationPreferences,
    conditions: Option<&Conditions>,
    max_members: usize,
) -> Result<Membership> {
    let Representation { metadata, data } = store
        .get_representation(target, preferences, conditions)
        .await?;
    data.release();

    if !metadata.has(rdf::TYPE, iri(tc::TEMPORAL_CONTAINER)) {
        debug!("{} is not a temporal container", target);
        return Ok(Membership::NotTemporal);
    }

    let contained: Vec<&str> = metadata
        .get_all(ldp::CONTAINS)
        .into_iter()
        .filter_map(|t| match t {
            TermRef::NamedNode(member) => Some(member.as_str()),
            other => {
                debug!("{} lists non-IRI member {}, skipping", target, other);
                None
            }
        })
        .collect();
    let total = contained.len();
    let members: Vec<ResourceIdentifier> = contained
        .into_iter()
        .take(max_members)
        .map(ResourceIdentifier::new)
        .collect();

    if total > members.len() {
        debug!(
            "{} holds {} members, reading the first {}",
            target,
            total,
            members.len()
        );
    }
    for member in &members {
        trace!(container = %target, member = %member, "contains");
    }

    Ok(Membership::Temporal { members, total })
}
