//! Quest loading: the Quest Fetch contract, the validation chokepoint, and
//! a per-loader cache.
//!
//! The host supplies a [`QuestSource`]; the loader owns everything after the
//! fetch. Transport failures and non-success envelopes surface as
//! [`QuestError::LoadFailed`] with the offending id, so no raw transport
//! error ever escapes to UI code. A structurally broken payload surfaces as
//! [`QuestError::InvalidQuest`] and is never partially loaded.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use stackquest_logic::quest::{self, Quest, QuestError, RawQuest};

/// Transport-level failure reported by a [`QuestSource`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct FetchError(pub String);

/// Success envelope returned by the quest store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The Quest Fetch contract. The fetch is the engine's only blocking
/// boundary operation; it completes before any layer is entered.
pub trait QuestSource {
    fn fetch_quest(&self, id: &str) -> Result<QuestEnvelope, FetchError>;
}

/// Fetches, validates, and caches quest definitions.
pub struct QuestLoader<S: QuestSource> {
    source: S,
    cache: HashMap<String, Quest>,
}

impl<S: QuestSource> QuestLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    /// Load a quest by id, hitting the quest store only on a cache miss.
    pub fn load(&mut self, id: &str) -> Result<Quest, QuestError> {
        if let Some(quest) = self.cache.get(id) {
            log::debug!("quest `{id}` served from cache");
            return Ok(quest.clone());
        }

        let envelope = self.source.fetch_quest(id).map_err(|e| QuestError::LoadFailed {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        if !envelope.success {
            return Err(QuestError::LoadFailed {
                id: id.to_string(),
                reason: envelope
                    .error
                    .unwrap_or_else(|| "quest store reported failure".to_string()),
            });
        }
        let data = envelope.data.ok_or_else(|| QuestError::InvalidQuest {
            reason: format!("success envelope for `{id}` carried no quest"),
        })?;
        let raw: RawQuest = serde_json::from_value(data).map_err(|e| QuestError::InvalidQuest {
            reason: format!("malformed quest JSON for `{id}`: {e}"),
        })?;

        let quest = quest::validate(raw)?;
        log::info!(
            "loaded quest `{}` ({}, {} layers)",
            quest.id,
            quest.name,
            quest.layers.len()
        );
        self.cache.insert(id.to_string(), quest.clone());
        Ok(quest)
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.cache.contains_key(id)
    }

    /// Drop all cached quests. Used for test isolation and forced refresh.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
