//! Ordered-token collection and CRUD completion tracking.
//!
//! Mutable per-layer state in, plain outcome values out. Event publication is
//! the runtime crate's job; nothing here knows about the bus.

use serde::{Deserialize, Serialize};

use crate::theme::CollectibleTheme;

/// Result of recording one collected token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOutcome {
    /// The token matched the theme's next expected id.
    pub in_order: bool,
    /// Zero-based position in the collected list after the append.
    pub position: usize,
    /// This collect satisfied the full in-order sequence.
    pub newly_complete: bool,
    /// Valid with `newly_complete`: no out-of-order collect ever happened.
    pub all_in_order: bool,
    /// Handshake-style theme collected out of order.
    pub violation: bool,
}

/// Per-layer collection state against a theme's required token order.
///
/// Collection is never blocked: a valid token always counts, even out of
/// order, and unlocks its gate. Only the in-order path can satisfy the
/// sequence and earn the bonus — a full-but-scrambled set reaches every
/// token without ever completing the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionProgress {
    theme: CollectibleTheme,
    collected: Vec<String>,
    violated: bool,
    sequence_complete: bool,
}

impl CollectionProgress {
    pub fn new(theme: CollectibleTheme) -> Self {
        Self {
            theme,
            collected: Vec::new(),
            violated: false,
            sequence_complete: false,
        }
    }

    pub fn theme(&self) -> CollectibleTheme {
        self.theme
    }

    /// Ids collected so far, in collection order.
    pub fn collected(&self) -> &[String] {
        &self.collected
    }

    /// The id the theme expects next, if the sequence is still open.
    pub fn expected_next(&self) -> Option<&'static str> {
        self.theme
            .spec()
            .tokens
            .get(self.collected.len())
            .map(|t| t.id)
    }

    /// Whether any out-of-order collect has happened.
    pub fn violated(&self) -> bool {
        self.violated
    }

    /// Whether the full in-order sequence has been satisfied.
    pub fn is_sequence_complete(&self) -> bool {
        self.sequence_complete
    }

    /// Whether every theme token id appears in the collected list,
    /// regardless of order. This is the layer-completion predicate for
    /// themed levels.
    pub fn all_collected(&self) -> bool {
        let tokens = self.theme.spec().tokens;
        !tokens.is_empty()
            && tokens
                .iter()
                .all(|t| self.collected.iter().any(|c| c == t.id))
    }

    /// Gate unlock rule: a gate requiring `id` is passable exactly when `id`
    /// appears anywhere in the collected list. Order-independent, even
    /// though scoring rewards strict order.
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.collected.iter().any(|c| c == id)
    }

    /// Record a collected token and report how it landed.
    pub fn collect(&mut self, id: &str) -> CollectOutcome {
        let spec = self.theme.spec();
        let in_order = spec
            .tokens
            .get(self.collected.len())
            .map(|t| t.id == id)
            .unwrap_or(false);
        if !in_order {
            self.violated = true;
        }
        self.collected.push(id.to_string());

        let newly_complete =
            in_order && !self.sequence_complete && self.collected.len() == spec.tokens.len();
        if newly_complete {
            self.sequence_complete = true;
        }

        CollectOutcome {
            in_order,
            position: self.collected.len() - 1,
            newly_complete,
            all_in_order: newly_complete && !self.violated,
            violation: spec.handshake && !in_order,
        }
    }
}

/// HTTP methods tracked by the API-layer CRUD variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Result of recording one API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrudOutcome {
    /// First successful request for this method.
    pub first_success: bool,
    /// All four methods have now succeeded; fires at most once.
    pub newly_complete: bool,
}

/// Tracks which CRUD methods have completed at least one successful request.
///
/// Completion is independent of call order, and repeating one method never
/// substitutes for a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrudProgress {
    succeeded: [bool; 4],
    complete_fired: bool,
}

impl CrudProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request. Failed requests never advance progress.
    pub fn record(&mut self, method: HttpMethod, success: bool) -> CrudOutcome {
        if !success {
            return CrudOutcome {
                first_success: false,
                newly_complete: false,
            };
        }
        let idx = method as usize;
        let first_success = !self.succeeded[idx];
        self.succeeded[idx] = true;

        let newly_complete = !self.complete_fired && self.succeeded.iter().all(|s| *s);
        if newly_complete {
            self.complete_fired = true;
        }
        CrudOutcome {
            first_success,
            newly_complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.succeeded.iter().all(|s| *s)
    }

    pub fn has_succeeded(&self, method: HttpMethod) -> bool {
        self.succeeded[method as usize]
    }
}
