//! The engine→UI event catalog.
//!
//! Events are the only channel between the engine and its render/UI
//! collaborator. The catalog is a closed enum so a consumer can match
//! exhaustively; [`EventKind`] is the payload-free discriminant used to key
//! subscriptions on the bus.

use serde::{Deserialize, Serialize};

use stackquest_logic::collect::HttpMethod;
use stackquest_logic::quest::LayerKind;
use stackquest_logic::theme::CollectibleTheme;

/// Everything the engine tells the outside world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// The player took damage; `health` is the post-clamp value.
    Damage { amount: u32, health: u32 },
    /// Score was awarded; `total` is the attempt-wide running score.
    ScoreAdded { amount: u32, total: u32 },
    LayerEntered {
        index: usize,
        kind: LayerKind,
    },
    LayerCompleted {
        index: usize,
        layer_score: u32,
        total_score: u32,
    },
    /// The final layer completed: quest victory.
    QuestCompleted { score: u32 },
    /// Health hit zero or the layer timer expired. Terminal for the attempt.
    PlayerDied { index: usize },
    CollectibleCollected {
        id: String,
        in_order: bool,
        position: usize,
    },
    SequenceComplete {
        theme: CollectibleTheme,
        all_in_order: bool,
    },
    SequenceViolated {
        expected: Option<String>,
        actual: String,
    },
    /// The named gate's requirement was just satisfied.
    GateUnlocked { requires: String },
    /// The player bumped a gate whose requirement is not yet collected.
    GateLocked { requires: String },
    CrudRecorded {
        method: HttpMethod,
        first_success: bool,
    },
    /// All four CRUD methods have succeeded at least once. Fires once.
    CrudComplete,
    /// An educational popup should be shown.
    PopupShown { title: String, body: String },
    PopupHidden,
    Paused,
    Resumed,
}

/// Payload-free discriminant for subscription keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Damage,
    ScoreAdded,
    LayerEntered,
    LayerCompleted,
    QuestCompleted,
    PlayerDied,
    CollectibleCollected,
    SequenceComplete,
    SequenceViolated,
    GateUnlocked,
    GateLocked,
    CrudRecorded,
    CrudComplete,
    PopupShown,
    PopupHidden,
    Paused,
    Resumed,
}

impl EventKind {
    pub const ALL: [EventKind; 17] = [
        Self::Damage,
        Self::ScoreAdded,
        Self::LayerEntered,
        Self::LayerCompleted,
        Self::QuestCompleted,
        Self::PlayerDied,
        Self::CollectibleCollected,
        Self::SequenceComplete,
        Self::SequenceViolated,
        Self::GateUnlocked,
        Self::GateLocked,
        Self::CrudRecorded,
        Self::CrudComplete,
        Self::PopupShown,
        Self::PopupHidden,
        Self::Paused,
        Self::Resumed,
    ];
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Damage { .. } => EventKind::Damage,
            Self::ScoreAdded { .. } => EventKind::ScoreAdded,
            Self::LayerEntered { .. } => EventKind::LayerEntered,
            Self::LayerCompleted { .. } => EventKind::LayerCompleted,
            Self::QuestCompleted { .. } => EventKind::QuestCompleted,
            Self::PlayerDied { .. } => EventKind::PlayerDied,
            Self::CollectibleCollected { .. } => EventKind::CollectibleCollected,
            Self::SequenceComplete { .. } => EventKind::SequenceComplete,
            Self::SequenceViolated { .. } => EventKind::SequenceViolated,
            Self::GateUnlocked { .. } => EventKind::GateUnlocked,
            Self::GateLocked { .. } => EventKind::GateLocked,
            Self::CrudRecorded { .. } => EventKind::CrudRecorded,
            Self::CrudComplete => EventKind::CrudComplete,
            Self::PopupShown { .. } => EventKind::PopupShown,
            Self::PopupHidden => EventKind::PopupHidden,
            Self::Paused => EventKind::Paused,
            Self::Resumed => EventKind::Resumed,
        }
    }
}
