//! Container index resources
//!
//! A request for a container is answered with the container's index resource
//! (`index.html` by default) when that resource exists and the client's
//! highest-weighted media range matches the configured one. Set the media
//! range to `*/*` to always prefer the index.

use async_trait::async_trait;
use chronoscope_core::{
    Conditions, Error, IndexConfig, Representation, RepresentationPreferences, ResourceIdentifier,
    ResourceStore, Result,
};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

pub struct IndexRepresentationStore {
    source: Arc<dyn ResourceStore>,
    index_name: String,
    media_range: String,
}

impl IndexRepresentationStore {
    pub fn new(
        source: Arc<dyn ResourceStore>,
        index_name: impl Into<String>,
        media_range: impl Into<String>,
    ) -> Result<Self> {
        let index_name = index_name.into();
        let valid = Regex::new(r"^[\w.-]+$").map_err(|e| Error::Internal(e.to_string()))?;
        if !valid.is_match(&index_name) {
            return Err(Error::Config(format!("invalid index name '{}'", index_name)));
        }
        Ok(Self {
            source,
            index_name,
            media_range: media_range.into().to_ascii_lowercase(),
        })
    }

    pub fn from_config(source: Arc<dyn ResourceStore>, config: &IndexConfig) -> Result<Self> {
        Self::new(source, config.name.clone(), config.media_range.clone())
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// True when a range carrying the top weight matches the configured range.
    pub fn matches_preferences(&self, preferences: &RepresentationPreferences) -> bool {
        let cleaned: Vec<(&str, f32)> = preferences
            .types
            .iter()
            .filter(|(range, _)| !range.starts_with("internal/"))
            .map(|(range, weight)| (range.as_str(), *weight))
            .collect();
        if cleaned.is_empty() {
            return matches_media_type("*/*", &self.media_range);
        }
        let max = cleaned.iter().map(|(_, w)| *w).fold(f32::MIN, f32::max);
        cleaned
            .iter()
            .any(|(range, weight)| *weight == max && matches_media_type(range, &self.media_range))
    }
}

/// Media range match where either side may be a wildcard.
pub fn matches_media_type(left: &str, right: &str) -> bool {
    if left == "*/*" || right == "*/*" {
        return true;
    }
    let (Some((left_main, left_sub)), Some((right_main, right_sub))) =
        (left.split_once('/'), right.split_once('/'))
    else {
        return left == right;
    };
    if left_main != right_main {
        return false;
    }
    left_sub == "*" || right_sub == "*" || left_sub == right_sub
}

#[async_trait]
impl ResourceStore for IndexRepresentationStore {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
        conditions: Option<&Conditions>,
    ) -> Result<Representation> {
        if identifier.is_container() && self.matches_preferences(preferences) {
            let index = ResourceIdentifier::new(format!("{}{}", identifier, self.index_name));
            match self
                .source
                .get_representation(&index, preferences, conditions)
                .await
            {
                Ok(representation) => {
                    debug!("serving {} for {}", index, identifier);
                    return Ok(representation);
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        self.source
            .get_representation(identifier, preferences, conditions)
            .await
    }
}
