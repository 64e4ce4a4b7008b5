//! TemporalStore: evaluates temporal queries in front of a source store.
//!
//! A request without query parameters is forwarded untouched. With
//! parameters, the target is checked for the temporal container type; members
//! of a temporal container are fetched, filtered and rendered as CSV or as a
//! modal boolean. Anything else is forwarded with the query removed.

use crate::fetch::fetch_observations;
use crate::filter::{self, StructuralFilter};
use crate::format;
use crate::membership::{resolve_membership, Membership};
use crate::query::{split_query, QuerySpec};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chronoscope_core::{
    Conditions, Representation, RepresentationPreferences, ResourceIdentifier, ResourceStore,
    Result, TemporalConfig,
};
use std::sync::Arc;
use tracing::{debug, info};

pub struct TemporalStore {
    source: Arc<dyn ResourceStore>,
    config: TemporalConfig,
}

impl TemporalStore {
    pub fn new(source: Arc<dyn ResourceStore>, config: TemporalConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &TemporalConfig {
        &self.config
    }

    /// Evaluate against an explicit request time. Relative interval bounds
    /// are resolved against `now`.
    pub async fn evaluate(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&Conditions>,
        now: DateTime<Utc>,
    ) -> Result<Representation> {
        if !identifier.as_str().contains('?') {
            return self
                .source
                .get_representation(identifier, preferences, conditions)
                .await;
        }

        let (target, pairs) = split_query(identifier);
        if pairs.is_empty() {
            return self
                .source
                .get_representation(&target, preferences, conditions)
                .await;
        }

        let spec = QuerySpec::from_pairs(&pairs)?;
        let store = self.source.as_ref();
        let members = match resolve_membership(
            store,
            &target,
            preferences,
            conditions,
            self.config.max_members,
        )
        .await?
        {
            Membership::Temporal { members, .. } => members,
            Membership::NotTemporal => {
                debug!("query on {} ignored, forwarding", target);
                return store.get_representation(&target, preferences, conditions).await;
            }
        };

        let records = fetch_observations(
            store,
            &members,
            preferences,
            conditions,
            &StructuralFilter::from_spec(&spec),
            self.config.member_failure,
        )
        .await?;
        let outcome = filter::apply(records, &spec, now)?;

        info!(
            target = %target,
            members = members.len(),
            matched = outcome.records.len(),
            before_value_filter = outcome.original_value_count,
            operator = spec.operator.map(|op| op.as_str()).unwrap_or("none"),
            "temporal query evaluated"
        );
        Ok(format::render(&target, spec.operator, &outcome))
    }
}

#[async_trait]
impl ResourceStore for TemporalStore {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&Conditions>,
    ) -> Result<Representation> {
        let now = Utc::now();
        self.evaluate(identifier, preferences, conditions, now).await
    }
}
