//! The session façade: one loader, one bus, at most one live attempt.
//!
//! A [`QuestSession`] is what a host embeds. The host subscribes its UI
//! handlers on [`QuestSession::bus`], starts an attempt, and forwards one
//! `update` per frame. Ending an attempt clears the bus, so handlers from a
//! finished attempt can never fire during the next one.

use stackquest_logic::collect::HttpMethod;
use stackquest_logic::quest::QuestError;

use crate::bus::EventBus;
use crate::loader::{QuestLoader, QuestSource};
use crate::run::{PlayerInput, QuestRun};

pub struct QuestSession<S: QuestSource> {
    loader: QuestLoader<S>,
    bus: EventBus,
    run: Option<QuestRun>,
}

impl<S: QuestSource> QuestSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            loader: QuestLoader::new(source),
            bus: EventBus::new(),
            run: None,
        }
    }

    /// The attempt-scoped event bus. Subscribe UI handlers here.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn loader(&self) -> &QuestLoader<S> {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut QuestLoader<S> {
        &mut self.loader
    }

    pub fn run(&self) -> Option<&QuestRun> {
        self.run.as_ref()
    }

    /// Load the quest (the engine's only blocking boundary call — it
    /// finishes before any layer is entered) and enter its first layer.
    /// A previous attempt, if any, is discarded first.
    pub fn start_attempt(&mut self, quest_id: &str) -> Result<(), QuestError> {
        let quest = self.loader.load(quest_id)?;
        log::info!("starting attempt on quest `{quest_id}`");
        let mut run = QuestRun::new(quest);
        run.start(&self.bus);
        self.run = Some(run);
        Ok(())
    }

    /// Advance the live attempt by one frame.
    pub fn update(&mut self, dt: f32, input: PlayerInput) {
        if let Some(run) = self.run.as_mut() {
            run.update(&self.bus, dt, input);
        }
    }

    pub fn pause(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.pause(&self.bus);
        }
    }

    pub fn resume(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.resume(&self.bus);
        }
    }

    pub fn record_api_call(&mut self, method: HttpMethod, success: bool) {
        if let Some(run) = self.run.as_mut() {
            run.record_api_call(&self.bus, method, success);
        }
    }

    pub fn complete_challenge(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.complete_challenge(&self.bus);
        }
    }

    pub fn dismiss_popup(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.dismiss_popup(&self.bus);
        }
    }

    /// Tear down the live attempt and unsubscribe every handler.
    pub fn end_attempt(&mut self) {
        self.run = None;
        self.bus.clear();
    }
}
