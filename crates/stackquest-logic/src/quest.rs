//! Quest data model and structural validation.
//!
//! Quests arrive as foreign JSON through the quest store boundary. The raw
//! shapes here accept anything structurally; [`validate`] is the single
//! chokepoint that turns a raw payload into a [`Quest`] or rejects it, so a
//! malformed quest can never reach the state machine half-built.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors surfaced by quest loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuestError {
    /// Structural defect in a loaded quest. Fatal to that load; not retried.
    #[error("invalid quest: {reason}")]
    InvalidQuest { reason: String },
    /// Transport or availability failure. The caller may retry.
    #[error("failed to load quest `{id}`: {reason}")]
    LoadFailed { id: String, reason: String },
}

/// One stage of a quest, tagged by the part of the stack it teaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LayerKind {
    Browser,
    Network,
    Api,
    Database,
}

impl LayerKind {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "BROWSER" => Some(Self::Browser),
            "NETWORK" => Some(Self::Network),
            "API" => Some(Self::Api),
            "DATABASE" => Some(Self::Database),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Browser => "BROWSER",
            Self::Network => "NETWORK",
            Self::Api => "API",
            Self::Database => "DATABASE",
        }
    }
}

/// A layer's teaching task: a type tag plus an opaque configuration map
/// whose shape depends on the tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    pub kind: String,
    pub config: Map<String, Value>,
}

impl Challenge {
    /// Whether this challenge needs a generated level to play.
    pub fn is_platformer(&self) -> bool {
        self.kind == "platformer"
    }
}

/// One validated quest layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    /// Zero-based position in the quest.
    pub order: u32,
    /// Optional per-layer time limit in seconds.
    pub time_limit: Option<f32>,
    pub challenge: Challenge,
}

/// A validated quest. Immutable once loaded; layers are sorted by ascending
/// `order` and are never skipped or reordered during play.
#[derive(Debug, Clone, PartialEq)]
pub struct Quest {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: String,
    pub layers: Vec<Layer>,
}

// ── Raw JSON shapes ─────────────────────────────────────────────────────

/// Unvalidated quest payload as it arrives from the quest store.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub layers: Option<Vec<RawLayer>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLayer {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(rename = "timeLimit", default)]
    pub time_limit: Option<f32>,
    #[serde(default)]
    pub challenge: Option<RawChallenge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawChallenge {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub config: Map<String, Value>,
}

// ── Validation ──────────────────────────────────────────────────────────

fn invalid(reason: impl Into<String>) -> QuestError {
    QuestError::InvalidQuest {
        reason: reason.into(),
    }
}

/// Validate a raw payload into a [`Quest`], or reject the whole load.
///
/// A quest must carry an id, a name, and at least one layer; every layer
/// must carry a known type tag and a typed challenge. A layer without a
/// challenge is an authoring defect and is caught here, never mid-play.
pub fn validate(raw: RawQuest) -> Result<Quest, QuestError> {
    let id = match raw.id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(invalid("quest id is missing")),
    };
    let name = match raw.name {
        Some(name) if !name.is_empty() => name,
        _ => return Err(invalid(format!("quest `{id}` has no name"))),
    };
    let raw_layers = match raw.layers {
        Some(layers) => layers,
        None => return Err(invalid(format!("quest `{id}` has no layer list"))),
    };
    if raw_layers.is_empty() {
        return Err(invalid(format!("quest `{id}` has an empty layer list")));
    }

    let mut layers = Vec::with_capacity(raw_layers.len());
    for (position, raw_layer) in raw_layers.into_iter().enumerate() {
        let tag = raw_layer
            .kind
            .ok_or_else(|| invalid(format!("layer {position} is missing a type")))?;
        let kind = LayerKind::parse(&tag)
            .ok_or_else(|| invalid(format!("layer {position} has unknown type `{tag}`")))?;
        let raw_challenge = raw_layer
            .challenge
            .ok_or_else(|| invalid(format!("layer {position} is missing a challenge")))?;
        let challenge_kind = raw_challenge
            .kind
            .ok_or_else(|| invalid(format!("layer {position} challenge is missing a type")))?;

        layers.push(Layer {
            kind,
            order: raw_layer.order.unwrap_or(position as u32),
            time_limit: raw_layer.time_limit.filter(|t| *t > 0.0),
            challenge: Challenge {
                kind: challenge_kind,
                config: raw_challenge.config,
            },
        });
    }

    // Layers play strictly in ascending order; the sort is stable so authored
    // order breaks ties.
    layers.sort_by_key(|l| l.order);

    Ok(Quest {
        id,
        name,
        description: raw.description.unwrap_or_default(),
        difficulty: raw.difficulty.unwrap_or_default(),
        layers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_from(value: serde_json::Value) -> RawQuest {
        serde_json::from_value(value).expect("raw quest should always deserialize")
    }

    fn minimal_quest() -> serde_json::Value {
        json!({
            "id": "q1",
            "name": "Test Quest",
            "layers": [
                {
                    "type": "NETWORK",
                    "order": 0,
                    "challenge": { "type": "platformer", "config": { "theme": "tcp" } }
                }
            ]
        })
    }

    #[test]
    fn test_valid_quest_passes() {
        let quest = validate(raw_from(minimal_quest())).unwrap();
        assert_eq!(quest.id, "q1");
        assert_eq!(quest.layers.len(), 1);
        assert_eq!(quest.layers[0].kind, LayerKind::Network);
        assert!(quest.layers[0].challenge.is_platformer());
    }

    #[test]
    fn test_missing_id_rejected() {
        let mut value = minimal_quest();
        value.as_object_mut().unwrap().remove("id");
        assert!(matches!(
            validate(raw_from(value)),
            Err(QuestError::InvalidQuest { .. })
        ));
    }

    #[test]
    fn test_missing_name_rejected() {
        let mut value = minimal_quest();
        value.as_object_mut().unwrap().remove("name");
        assert!(matches!(
            validate(raw_from(value)),
            Err(QuestError::InvalidQuest { .. })
        ));
    }

    #[test]
    fn test_empty_layer_list_rejected() {
        let mut value = minimal_quest();
        value["layers"] = json!([]);
        let err = validate(raw_from(value)).unwrap_err();
        assert!(matches!(err, QuestError::InvalidQuest { .. }));
    }

    #[test]
    fn test_missing_layer_list_rejected() {
        let mut value = minimal_quest();
        value.as_object_mut().unwrap().remove("layers");
        assert!(matches!(
            validate(raw_from(value)),
            Err(QuestError::InvalidQuest { .. })
        ));
    }

    #[test]
    fn test_layer_without_type_rejected() {
        let mut value = minimal_quest();
        value["layers"][0].as_object_mut().unwrap().remove("type");
        assert!(matches!(
            validate(raw_from(value)),
            Err(QuestError::InvalidQuest { .. })
        ));
    }

    #[test]
    fn test_layer_with_unknown_type_rejected() {
        let mut value = minimal_quest();
        value["layers"][0]["type"] = json!("KERNEL");
        assert!(matches!(
            validate(raw_from(value)),
            Err(QuestError::InvalidQuest { .. })
        ));
    }

    #[test]
    fn test_layer_without_challenge_rejected() {
        let mut value = minimal_quest();
        value["layers"][0].as_object_mut().unwrap().remove("challenge");
        assert!(matches!(
            validate(raw_from(value)),
            Err(QuestError::InvalidQuest { .. })
        ));
    }

    #[test]
    fn test_layers_sorted_by_order() {
        let value = json!({
            "id": "q2",
            "name": "Out of order",
            "layers": [
                { "type": "API", "order": 2, "challenge": { "type": "rest-calls" } },
                { "type": "BROWSER", "order": 0, "challenge": { "type": "platformer" } },
                { "type": "NETWORK", "order": 1, "challenge": { "type": "platformer" } }
            ]
        });
        let quest = validate(raw_from(value)).unwrap();
        let kinds: Vec<LayerKind> = quest.layers.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LayerKind::Browser, LayerKind::Network, LayerKind::Api]
        );
    }

    #[test]
    fn test_missing_order_defaults_to_position() {
        let value = json!({
            "id": "q3",
            "name": "Implicit order",
            "layers": [
                { "type": "BROWSER", "challenge": { "type": "platformer" } },
                { "type": "DATABASE", "challenge": { "type": "quiz" } }
            ]
        });
        let quest = validate(raw_from(value)).unwrap();
        assert_eq!(quest.layers[0].order, 0);
        assert_eq!(quest.layers[1].order, 1);
    }

    #[test]
    fn test_non_positive_time_limit_dropped() {
        let value = json!({
            "id": "q4",
            "name": "Timed",
            "layers": [
                { "type": "BROWSER", "timeLimit": 0.0, "challenge": { "type": "platformer" } }
            ]
        });
        let quest = validate(raw_from(value)).unwrap();
        assert_eq!(quest.layers[0].time_limit, None);
    }

    #[test]
    fn test_layer_kind_parse_case_insensitive() {
        assert_eq!(LayerKind::parse("browser"), Some(LayerKind::Browser));
        assert_eq!(LayerKind::parse("Database"), Some(LayerKind::Database));
        assert_eq!(LayerKind::parse("CLOUD"), None);
    }
}
