//! Member fetcher: reads every member of a temporal container concurrently.
//!
//! All fetches are issued at once on the calling task and awaited together;
//! nothing is filtered until the whole batch has settled. There is no timeout
//! here, so one slow member holds up the request.

use crate::filter::StructuralFilter;
use crate::observation::{extract, ObservationRecord};
use chronoscope_core::parser::parse_representation;
use chronoscope_core::{
    Conditions, MemberFailurePolicy, RepresentationPreferences, ResourceIdentifier, ResourceStore,
    Result,
};
use futures::future::{join_all, try_join_all};
use tracing::{debug, warn};

/// Fetch, parse and extract every member, concatenating the records.
pub async fn fetch_observations(
    store: &dyn ResourceStore,
    members: &[ResourceIdentifier],
    preferences: &RepresentationPreferences,
    conditions: Option<&Conditions>,
    filter: &StructuralFilter,
    policy: MemberFailurePolicy,
) -> Result<Vec<ObservationRecord>> {
    let fetches = members
        .iter()
        .map(|member| fetch_member(store, member, preferences, conditions, filter));

    let records: Vec<ObservationRecord> = match policy {
        MemberFailurePolicy::FailFast => try_join_all(fetches).await?.into_iter().flatten().collect(),
        MemberFailurePolicy::Skip => {
            let mut records = Vec::new();
            for (member, result) in members.iter().zip(join_all(fetches).await) {
                match result {
                    Ok(batch) => records.extend(batch),
                    Err(e) => warn!("skipping member {}: {}", member, e),
                }
            }
            records
        }
    };

    debug!(
        "extracted {} observations from {} members",
        records.len(),
        members.len()
    );
    Ok(records)
}

async fn fetch_member(
    store: &dyn ResourceStore,
    member: &ResourceIdentifier,
    preferences: &RepresentationPreferences,
    conditions: Option<&Conditions>,
    filter: &StructuralFilter,
) -> Result<Vec<ObservationRecord>> {
    let representation = store
        .get_representation(member, preferences, conditions)
        .await?;
    let graph = parse_representation(representation).await?;
    Ok(extract(&graph, filter))
}
