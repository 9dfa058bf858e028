//! Quest progression engine for StackQuest.
//!
//! The runtime half of the engine: everything here is single-threaded and
//! frame-driven. The host render loop calls [`session::QuestSession::update`]
//! once per frame and consumes engine state exclusively through events on the
//! [`bus::EventBus`] — no direct field access crosses the engine/UI boundary.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bus`] | Injectable synchronous publish/subscribe channel |
//! | [`event`] | The closed engine→UI event catalog |
//! | [`loader`] | Quest Fetch contract, validation chokepoint, cache |
//! | [`run`] | The layer state machine driving one quest attempt |
//! | [`session`] | Façade tying loader, bus, and run together |

pub mod bus;
pub mod event;
pub mod loader;
pub mod run;
pub mod session;

pub use bus::{EventBus, SubscriptionId};
pub use event::{EngineEvent, EventKind};
pub use loader::{FetchError, QuestEnvelope, QuestLoader, QuestSource};
pub use run::{AttemptOutcome, Phase, PlayerInput, PlayerRunState, QuestRun};
pub use session::QuestSession;
