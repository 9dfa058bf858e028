//! The layer state machine: one quest attempt from first layer to victory or
//! death.
//!
//! A [`QuestRun`] owns the attempt-wide [`PlayerRunState`] and, while a layer
//! is live, a [`LayerRuntime`] holding everything layer-scoped: the generated
//! level, collection and CRUD trackers, the per-layer score, and pending
//! respawn timers. Dropping the runtime on layer exit cancels its timers and
//! discards its level, so nothing layer-scoped ever leaks across layers.
//!
//! Transition logic lives in free functions over these state records — there
//! is one machine for all four layer kinds, dispatching on the tag where
//! behavior differs.

use stackquest_logic::collect::{CollectionProgress, CrudProgress, HttpMethod};
use stackquest_logic::collision::{circles_overlap, rects_overlap, Circle, Rect};
use stackquest_logic::constants::{combat, level as level_c, player as player_c, scoring};
use stackquest_logic::level::{self, GeneratedLevel, LevelConfig};
use stackquest_logic::quest::{Layer, LayerKind, Quest};
use stackquest_logic::theme::CollectibleTheme;

use crate::bus::EventBus;
use crate::event::EngineEvent;

/// Lifecycle of a quest attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Active,
    Completing,
    Dying,
    Transitioning,
    Finished(AttemptOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Victory,
    Defeat,
}

/// Host-sampled player displacement for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInput {
    pub dx: f32,
    pub dy: f32,
}

impl PlayerInput {
    pub const IDLE: PlayerInput = PlayerInput { dx: 0.0, dy: 0.0 };
}

/// Attempt-wide player state. Health and the cumulative score persist across
/// layer transitions; everything layer-scoped lives on [`LayerRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRunState {
    /// Clamped to `0..=100`; zero is terminal for the attempt.
    pub health: u32,
    pub score: u32,
    pub layer_index: usize,
}

impl Default for PlayerRunState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerRunState {
    pub fn new() -> Self {
        Self {
            health: player_c::MAX_HEALTH,
            score: 0,
            layer_index: 0,
        }
    }

    /// Apply damage, clamped at zero. Returns the new health.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    pub fn add_score(&mut self, amount: u32) -> u32 {
        self.score = self.score.saturating_add(amount);
        self.score
    }
}

/// A deferred obstacle respawn, keyed to the layer's elapsed time. Timers
/// die with the runtime that owns them.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RespawnTimer {
    due: f32,
    obstacle: usize,
}

/// Everything scoped to one live layer. Built on entry, dropped on exit.
#[derive(Debug)]
pub struct LayerRuntime {
    pub index: usize,
    pub kind: LayerKind,
    /// Present only for challenges that play on a generated level.
    pub level: Option<GeneratedLevel>,
    pub collection: CollectionProgress,
    pub crud: CrudProgress,
    pub layer_score: u32,
    pub elapsed: f32,
    pub time_limit: Option<f32>,
    /// The player's collision box within the level.
    pub player: Rect,
    taken: Vec<bool>,
    downed: Vec<bool>,
    respawns: Vec<RespawnTimer>,
    challenge_done: bool,
    popup_open: bool,
}

impl LayerRuntime {
    /// Whether an obstacle is currently struck-down and awaiting respawn.
    pub fn is_obstacle_downed(&self, index: usize) -> bool {
        self.downed.get(index).copied().unwrap_or(false)
    }
}

fn build_runtime(layer: &Layer, index: usize) -> LayerRuntime {
    let level = layer
        .challenge
        .is_platformer()
        .then(|| level::generate(&LevelConfig::from_challenge_config(&layer.challenge.config)));
    let theme = level
        .as_ref()
        .map(|l| l.theme)
        .unwrap_or(CollectibleTheme::None);
    let collectible_count = level.as_ref().map(|l| l.collectibles.len()).unwrap_or(0);
    let obstacle_count = level.as_ref().map(|l| l.obstacles.len()).unwrap_or(0);

    LayerRuntime {
        index,
        kind: layer.kind,
        level,
        collection: CollectionProgress::new(theme),
        crud: CrudProgress::new(),
        layer_score: 0,
        elapsed: 0.0,
        time_limit: layer.time_limit,
        player: Rect::new(
            player_c::START_X,
            level_c::GROUND_Y - player_c::HEIGHT,
            player_c::WIDTH,
            player_c::HEIGHT,
        ),
        taken: vec![false; collectible_count],
        downed: vec![false; obstacle_count],
        respawns: Vec::new(),
        challenge_done: false,
        popup_open: false,
    }
}

/// One quest attempt.
pub struct QuestRun {
    quest: Quest,
    state: PlayerRunState,
    phase: Phase,
    layer: Option<LayerRuntime>,
    paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Continue,
    Died,
    Completed,
}

impl QuestRun {
    /// Begin a fresh attempt on a loaded quest. Run state starts at
    /// defaults; call [`QuestRun::start`] to enter the first layer.
    pub fn new(quest: Quest) -> Self {
        Self {
            quest,
            state: PlayerRunState::new(),
            phase: Phase::Entering,
            layer: None,
            paused: false,
        }
    }

    pub fn quest(&self) -> &Quest {
        &self.quest
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run_state(&self) -> &PlayerRunState {
        &self.state
    }

    pub fn current_layer(&self) -> Option<&LayerRuntime> {
        self.layer.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Enter the first layer.
    pub fn start(&mut self, bus: &EventBus) {
        if self.phase == Phase::Entering && self.layer.is_none() {
            self.enter_layer(bus, 0);
        }
    }

    /// Advance one frame. All collision checks and state transitions happen
    /// synchronously inside this call.
    pub fn update(&mut self, bus: &EventBus, dt: f32, input: PlayerInput) {
        if self.paused || self.phase != Phase::Active {
            return;
        }
        let outcome = match self.layer.as_mut() {
            Some(runtime) => tick_layer(runtime, &mut self.state, bus, dt, input),
            None => return,
        };
        match outcome {
            TickOutcome::Continue => {}
            TickOutcome::Died => self.fail_attempt(bus),
            TickOutcome::Completed => self.complete_layer(bus),
        }
    }

    /// Record one API request against the CRUD tracker. Only meaningful on
    /// an API layer.
    pub fn record_api_call(&mut self, bus: &EventBus, method: HttpMethod, success: bool) {
        if self.paused || self.phase != Phase::Active {
            return;
        }
        let completed = {
            let Some(runtime) = self.layer.as_mut() else {
                return;
            };
            if runtime.kind != LayerKind::Api {
                return;
            }
            let outcome = runtime.crud.record(method, success);
            if success {
                bus.publish(EngineEvent::CrudRecorded {
                    method,
                    first_success: outcome.first_success,
                });
                if outcome.first_success {
                    award(&mut self.state, runtime, bus, scoring::CRUD_METHOD);
                }
                if outcome.newly_complete {
                    bus.publish(EngineEvent::CrudComplete);
                    award(&mut self.state, runtime, bus, scoring::CRUD_BONUS);
                }
            }
            completion_met(runtime)
        };
        if completed {
            self.complete_layer(bus);
        }
    }

    /// Host signal that a non-platformer challenge (quiz, SQL exercise) was
    /// solved. The engine still owns the transition and its events.
    pub fn complete_challenge(&mut self, bus: &EventBus) {
        if self.paused || self.phase != Phase::Active {
            return;
        }
        let Some(runtime) = self.layer.as_mut() else {
            return;
        };
        runtime.challenge_done = true;
        self.complete_layer(bus);
    }

    pub fn pause(&mut self, bus: &EventBus) {
        if !self.paused && self.phase == Phase::Active {
            self.paused = true;
            bus.publish(EngineEvent::Paused);
        }
    }

    pub fn resume(&mut self, bus: &EventBus) {
        if self.paused {
            self.paused = false;
            bus.publish(EngineEvent::Resumed);
        }
    }

    /// Close the currently shown educational popup, if any.
    pub fn dismiss_popup(&mut self, bus: &EventBus) {
        if let Some(runtime) = self.layer.as_mut() {
            if runtime.popup_open {
                runtime.popup_open = false;
                bus.publish(EngineEvent::PopupHidden);
            }
        }
    }

    fn enter_layer(&mut self, bus: &EventBus, index: usize) {
        let Some(layer) = self.quest.layers.get(index) else {
            return;
        };
        log::debug!(
            "entering layer {index} ({}) of quest `{}`",
            layer.kind.as_str(),
            self.quest.id
        );
        self.state.layer_index = index;
        let kind = layer.kind;
        self.layer = Some(build_runtime(layer, index));
        self.phase = Phase::Active;
        bus.publish(EngineEvent::LayerEntered { index, kind });
    }

    fn complete_layer(&mut self, bus: &EventBus) {
        self.phase = Phase::Completing;
        let (index, layer_score) = match &self.layer {
            Some(runtime) => (runtime.index, runtime.layer_score),
            None => (self.state.layer_index, 0),
        };
        log::info!(
            "layer {index} of quest `{}` completed (layer score {layer_score})",
            self.quest.id
        );
        bus.publish(EngineEvent::LayerCompleted {
            index,
            layer_score,
            total_score: self.state.score,
        });
        // Dropping the runtime discards the generated level and cancels any
        // pending respawn timers.
        self.layer = None;

        let next = index + 1;
        if next < self.quest.layers.len() {
            self.phase = Phase::Transitioning;
            self.enter_layer(bus, next);
        } else {
            self.phase = Phase::Finished(AttemptOutcome::Victory);
            log::info!(
                "quest `{}` completed, final score {}",
                self.quest.id,
                self.state.score
            );
            bus.publish(EngineEvent::QuestCompleted {
                score: self.state.score,
            });
        }
    }

    fn fail_attempt(&mut self, bus: &EventBus) {
        self.phase = Phase::Dying;
        let index = self.state.layer_index;
        log::info!(
            "attempt on quest `{}` ended at layer {index} (score {})",
            self.quest.id,
            self.state.score
        );
        bus.publish(EngineEvent::PlayerDied { index });
        self.layer = None;
        self.phase = Phase::Finished(AttemptOutcome::Defeat);
    }
}

// ── Per-tick layer logic ────────────────────────────────────────────────

fn tick_layer(
    runtime: &mut LayerRuntime,
    state: &mut PlayerRunState,
    bus: &EventBus,
    dt: f32,
    input: PlayerInput,
) -> TickOutcome {
    runtime.elapsed += dt;
    if let Some(limit) = runtime.time_limit {
        if runtime.elapsed >= limit {
            log::info!("layer {} timed out after {:.1}s", runtime.index, limit);
            return TickOutcome::Died;
        }
    }

    fire_due_respawns(runtime);
    move_player(runtime, input);

    if runtime.level.is_some() {
        if resolve_obstacle_hits(runtime, state, bus) {
            return TickOutcome::Died;
        }
        resolve_collectible_pickups(runtime, state, bus);
        resolve_gate_contact(runtime, bus);
    }

    if completion_met(runtime) {
        TickOutcome::Completed
    } else {
        TickOutcome::Continue
    }
}

fn fire_due_respawns(runtime: &mut LayerRuntime) {
    let elapsed = runtime.elapsed;
    let mut due = Vec::new();
    runtime.respawns.retain(|timer| {
        if timer.due <= elapsed {
            due.push(timer.obstacle);
            false
        } else {
            true
        }
    });
    for index in due {
        if let Some(flag) = runtime.downed.get_mut(index) {
            *flag = false;
        }
    }
}

fn move_player(runtime: &mut LayerRuntime, input: PlayerInput) {
    let Some(length) = runtime.level.as_ref().map(|l| l.length) else {
        return;
    };
    let max_x = (length - runtime.player.width).max(0.0);
    runtime.player.x = (runtime.player.x + input.dx).clamp(0.0, max_x);
    let floor = level_c::GROUND_Y - runtime.player.height;
    runtime.player.y = (runtime.player.y + input.dy).clamp(0.0, floor);
}

fn player_circle(player: &Rect) -> Circle {
    let center = player.center();
    Circle::new(center.x, center.y, player.width.max(player.height) / 2.0)
}

/// Returns true if damage drove health to zero.
fn resolve_obstacle_hits(
    runtime: &mut LayerRuntime,
    state: &mut PlayerRunState,
    bus: &EventBus,
) -> bool {
    let mut hits = Vec::new();
    if let Some(level) = &runtime.level {
        for (i, obstacle) in level.obstacles.iter().enumerate() {
            if !runtime.downed[i] && rects_overlap(&runtime.player, &obstacle.bounds()) {
                hits.push(i);
            }
        }
    }
    for index in hits {
        runtime.downed[index] = true;
        runtime.respawns.push(RespawnTimer {
            due: runtime.elapsed + combat::OBSTACLE_RESPAWN_DELAY,
            obstacle: index,
        });
        let health = state.apply_damage(combat::OBSTACLE_DAMAGE);
        log::debug!("obstacle {index} hit, health now {health}");
        bus.publish(EngineEvent::Damage {
            amount: combat::OBSTACLE_DAMAGE,
            health,
        });
        if health == 0 {
            return true;
        }
    }
    false
}

fn resolve_collectible_pickups(
    runtime: &mut LayerRuntime,
    state: &mut PlayerRunState,
    bus: &EventBus,
) {
    let mut picked = Vec::new();
    if let Some(level) = &runtime.level {
        let probe = player_circle(&runtime.player);
        for (i, token) in level.collectibles.iter().enumerate() {
            if !runtime.taken[i] && circles_overlap(&probe, &token.bounds()) {
                picked.push((i, token.id.clone(), token.label.clone()));
            }
        }
    }

    for (index, id, label) in picked {
        runtime.taken[index] = true;
        let expected = runtime.collection.expected_next().map(str::to_string);
        let outcome = runtime.collection.collect(&id);

        bus.publish(EngineEvent::CollectibleCollected {
            id: id.clone(),
            in_order: outcome.in_order,
            position: outcome.position,
        });
        award(state, runtime, bus, scoring::TOKEN);

        if outcome.violation {
            bus.publish(EngineEvent::SequenceViolated {
                expected,
                actual: id.clone(),
            });
        }

        let gated = runtime
            .level
            .as_ref()
            .map(|l| l.gates.iter().any(|g| g.requires == id))
            .unwrap_or(false);
        if gated {
            bus.publish(EngineEvent::GateUnlocked {
                requires: id.clone(),
            });
        }

        runtime.popup_open = true;
        bus.publish(EngineEvent::PopupShown {
            title: id,
            body: label,
        });

        if outcome.newly_complete {
            bus.publish(EngineEvent::SequenceComplete {
                theme: runtime.collection.theme(),
                all_in_order: outcome.all_in_order,
            });
            award(state, runtime, bus, scoring::SEQUENCE_BONUS);
        }
    }
}

/// A locked gate blocks: the player is pushed back out of the gate and the
/// lock is reported. Unlocked gates are pass-through.
fn resolve_gate_contact(runtime: &mut LayerRuntime, bus: &EventBus) {
    let mut blocked = None;
    if let Some(level) = &runtime.level {
        for gate in &level.gates {
            if !runtime.collection.is_unlocked(&gate.requires)
                && rects_overlap(&runtime.player, &gate.bounds())
            {
                blocked = Some((
                    gate.requires.clone(),
                    (gate.x - runtime.player.width - 1.0).max(0.0),
                ));
                break;
            }
        }
    }
    if let Some((requires, pushback_x)) = blocked {
        runtime.player.x = pushback_x;
        bus.publish(EngineEvent::GateLocked { requires });
    }
}

/// The per-kind completion predicate: themed platformers need every token,
/// unthemed ones the level's end, API layers full CRUD coverage. Quiz-style
/// challenges complete only through the host's `complete_challenge` signal.
fn completion_met(runtime: &LayerRuntime) -> bool {
    if runtime.challenge_done {
        return true;
    }
    match runtime.kind {
        LayerKind::Api => runtime.crud.is_complete(),
        _ => match &runtime.level {
            Some(level) if !level.collectibles.is_empty() => runtime.collection.all_collected(),
            Some(level) => runtime.player.right() >= level.length,
            None => false,
        },
    }
}

fn award(state: &mut PlayerRunState, runtime: &mut LayerRuntime, bus: &EventBus, amount: u32) {
    runtime.layer_score += amount;
    let total = state.add_score(amount);
    bus.publish(EngineEvent::ScoreAdded { amount, total });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use serde_json::json;
    use stackquest_logic::quest::Challenge;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn platformer_layer(kind: LayerKind, order: u32, config: serde_json::Value) -> Layer {
        Layer {
            kind,
            order,
            time_limit: None,
            challenge: Challenge {
                kind: "platformer".to_string(),
                config: config.as_object().expect("config literal").clone(),
            },
        }
    }

    fn quest_of(layers: Vec<Layer>) -> Quest {
        Quest {
            id: "test-quest".to_string(),
            name: "Test Quest".to_string(),
            description: String::new(),
            difficulty: String::new(),
            layers,
        }
    }

    fn capture(bus: &EventBus, kind: EventKind) -> Rc<RefCell<Vec<EngineEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        bus.subscribe(kind, move |e| sink.borrow_mut().push(e.clone()));
        log
    }

    #[test]
    fn test_health_clamps_at_zero() {
        let mut state = PlayerRunState::new();
        assert_eq!(state.apply_damage(30), 70);
        assert_eq!(state.apply_damage(200), 0);
        assert_eq!(state.apply_damage(10), 0);
    }

    #[test]
    fn test_start_enters_first_layer() {
        let bus = EventBus::new();
        let entered = capture(&bus, EventKind::LayerEntered);
        let mut run = QuestRun::new(quest_of(vec![platformer_layer(
            LayerKind::Browser,
            0,
            json!({}),
        )]));
        run.start(&bus);
        assert_eq!(run.phase(), Phase::Active);
        assert_eq!(
            entered.borrow()[0],
            EngineEvent::LayerEntered {
                index: 0,
                kind: LayerKind::Browser
            }
        );
        assert!(run.current_layer().expect("layer live").level.is_some());
    }

    #[test]
    fn test_walking_to_level_end_completes_unthemed_layer() {
        let bus = EventBus::new();
        let completed = capture(&bus, EventKind::LayerCompleted);
        let quest_done = capture(&bus, EventKind::QuestCompleted);
        let mut run = QuestRun::new(quest_of(vec![platformer_layer(
            LayerKind::Browser,
            0,
            json!({}),
        )]));
        run.start(&bus);

        run.update(&bus, 0.016, PlayerInput { dx: 1.0e6, dy: 0.0 });
        assert_eq!(run.phase(), Phase::Finished(AttemptOutcome::Victory));
        assert_eq!(completed.borrow().len(), 1);
        assert_eq!(quest_done.borrow().len(), 1);
        assert!(run.current_layer().is_none());
    }

    #[test]
    fn test_lethal_damage_fires_exactly_one_death() {
        let bus = EventBus::new();
        let died = capture(&bus, EventKind::PlayerDied);
        let damage = capture(&bus, EventKind::Damage);
        let mut run = QuestRun::new(quest_of(vec![platformer_layer(
            LayerKind::Network,
            0,
            json!({ "obstacles": 3 }),
        )]));
        run.start(&bus);

        // Park the player on the first obstacle and let it respawn into them
        // until health runs out: 100 / 20 = 5 hits.
        {
            let runtime = run.layer.as_mut().expect("layer live");
            let target = runtime.level.as_ref().expect("level").obstacles[0].bounds();
            runtime.player.x = target.x;
            runtime.player.y = target.y;
        }
        for _ in 0..10 {
            run.update(&bus, combat::OBSTACLE_RESPAWN_DELAY + 0.1, PlayerInput::IDLE);
        }

        assert_eq!(run.run_state().health, 0);
        assert_eq!(damage.borrow().len(), 5);
        assert_eq!(died.borrow().len(), 1, "death must fire exactly once");
        assert_eq!(run.phase(), Phase::Finished(AttemptOutcome::Defeat));
    }

    #[test]
    fn test_obstacle_respawns_after_delay() {
        let bus = EventBus::new();
        let damage = capture(&bus, EventKind::Damage);
        let mut run = QuestRun::new(quest_of(vec![platformer_layer(
            LayerKind::Network,
            0,
            json!({ "obstacles": 3 }),
        )]));
        run.start(&bus);
        {
            let runtime = run.layer.as_mut().expect("layer live");
            let target = runtime.level.as_ref().expect("level").obstacles[0].bounds();
            runtime.player.x = target.x;
            runtime.player.y = target.y;
        }

        run.update(&bus, 0.016, PlayerInput::IDLE);
        assert_eq!(damage.borrow().len(), 1);
        assert!(run.current_layer().expect("layer").is_obstacle_downed(0));

        // Still down within the delay window: no second hit.
        run.update(&bus, 1.0, PlayerInput::IDLE);
        assert_eq!(damage.borrow().len(), 1);

        // Past the delay the obstacle returns and strikes again.
        run.update(&bus, combat::OBSTACLE_RESPAWN_DELAY, PlayerInput::IDLE);
        assert_eq!(damage.borrow().len(), 2);
    }

    #[test]
    fn test_time_limit_expiry_ends_attempt() {
        let bus = EventBus::new();
        let died = capture(&bus, EventKind::PlayerDied);
        let mut layer = platformer_layer(LayerKind::Browser, 0, json!({}));
        layer.time_limit = Some(5.0);
        let mut run = QuestRun::new(quest_of(vec![layer]));
        run.start(&bus);

        run.update(&bus, 4.0, PlayerInput::IDLE);
        assert_eq!(run.phase(), Phase::Active);
        run.update(&bus, 1.5, PlayerInput::IDLE);
        assert_eq!(run.phase(), Phase::Finished(AttemptOutcome::Defeat));
        assert_eq!(died.borrow().len(), 1);
    }

    #[test]
    fn test_pause_blocks_updates_until_resume() {
        let bus = EventBus::new();
        let mut run = QuestRun::new(quest_of(vec![platformer_layer(
            LayerKind::Browser,
            0,
            json!({}),
        )]));
        run.start(&bus);
        let before = run.current_layer().expect("layer").player.x;

        run.pause(&bus);
        run.update(&bus, 0.016, PlayerInput { dx: 50.0, dy: 0.0 });
        assert_eq!(run.current_layer().expect("layer").player.x, before);

        run.resume(&bus);
        run.update(&bus, 0.016, PlayerInput { dx: 50.0, dy: 0.0 });
        assert!(run.current_layer().expect("layer").player.x > before);
    }

    #[test]
    fn test_locked_gate_blocks_and_unlocks_after_collection() {
        let bus = EventBus::new();
        let locked = capture(&bus, EventKind::GateLocked);
        let unlocked = capture(&bus, EventKind::GateUnlocked);
        let mut run = QuestRun::new(quest_of(vec![platformer_layer(
            LayerKind::Network,
            0,
            json!({ "theme": "tcp", "obstacles": 5 }),
        )]));
        run.start(&bus);

        let (gate, token_center) = {
            let runtime = run.layer.as_ref().expect("layer live");
            let level = runtime.level.as_ref().expect("level");
            let token = &level.collectibles[0];
            (level.gates[0].clone(), (token.x, token.y))
        };

        // Walk into the locked gate: blocked and pushed back.
        {
            let runtime = run.layer.as_mut().expect("layer live");
            runtime.player.x = gate.x - runtime.player.width - 5.0;
            runtime.player.y = gate.y + 10.0;
        }
        run.update(&bus, 0.016, PlayerInput { dx: 20.0, dy: 0.0 });
        assert_eq!(locked.borrow().len(), 1);
        let pushed = run.layer.as_ref().expect("layer").player;
        assert!(pushed.right() <= gate.x);

        // Collect SYN, then the same gate lets the player through.
        {
            let runtime = run.layer.as_mut().expect("layer live");
            runtime.player.x = token_center.0 - runtime.player.width / 2.0;
            runtime.player.y = token_center.1 - runtime.player.height / 2.0;
        }
        run.update(&bus, 0.016, PlayerInput::IDLE);
        assert_eq!(unlocked.borrow().len(), 1);

        {
            let runtime = run.layer.as_mut().expect("layer live");
            runtime.player.x = gate.x - runtime.player.width - 5.0;
            runtime.player.y = gate.y + 10.0;
        }
        run.update(&bus, 0.016, PlayerInput { dx: 20.0, dy: 0.0 });
        assert_eq!(locked.borrow().len(), 1, "unlocked gate must not block");
        let through = run.layer.as_ref().expect("layer").player;
        assert!(through.right() > gate.x);
    }

    #[test]
    fn test_api_layer_completes_on_crud_coverage() {
        let bus = EventBus::new();
        let crud_done = capture(&bus, EventKind::CrudComplete);
        let completed = capture(&bus, EventKind::LayerCompleted);
        let mut run = QuestRun::new(quest_of(vec![Layer {
            kind: LayerKind::Api,
            order: 0,
            time_limit: None,
            challenge: Challenge {
                kind: "rest-calls".to_string(),
                config: serde_json::Map::new(),
            },
        }]));
        run.start(&bus);
        assert!(run.current_layer().expect("layer").level.is_none());

        run.record_api_call(&bus, HttpMethod::Post, true);
        run.record_api_call(&bus, HttpMethod::Get, false);
        run.record_api_call(&bus, HttpMethod::Get, true);
        run.record_api_call(&bus, HttpMethod::Delete, true);
        assert!(completed.borrow().is_empty());

        run.record_api_call(&bus, HttpMethod::Put, true);
        assert_eq!(crud_done.borrow().len(), 1);
        assert_eq!(completed.borrow().len(), 1);
        assert_eq!(run.phase(), Phase::Finished(AttemptOutcome::Victory));
    }

    #[test]
    fn test_quiz_layer_completes_on_host_signal() {
        let bus = EventBus::new();
        let mut run = QuestRun::new(quest_of(vec![Layer {
            kind: LayerKind::Database,
            order: 0,
            time_limit: None,
            challenge: Challenge {
                kind: "quiz".to_string(),
                config: serde_json::Map::new(),
            },
        }]));
        run.start(&bus);

        run.update(&bus, 0.016, PlayerInput::IDLE);
        assert_eq!(run.phase(), Phase::Active, "quiz cannot self-complete");
        run.complete_challenge(&bus);
        assert_eq!(run.phase(), Phase::Finished(AttemptOutcome::Victory));
    }

    #[test]
    fn test_health_persists_across_layers_score_accumulates() {
        let bus = EventBus::new();
        let mut run = QuestRun::new(quest_of(vec![
            platformer_layer(LayerKind::Browser, 0, json!({ "obstacles": 3 })),
            platformer_layer(LayerKind::Network, 1, json!({})),
        ]));
        run.start(&bus);

        // Take one hit, then finish the layer.
        {
            let runtime = run.layer.as_mut().expect("layer live");
            let target = runtime.level.as_ref().expect("level").obstacles[0].bounds();
            runtime.player.x = target.x;
            runtime.player.y = target.y;
        }
        run.update(&bus, 0.016, PlayerInput::IDLE);
        assert_eq!(run.run_state().health, 80);
        run.update(&bus, 0.016, PlayerInput { dx: 1.0e6, dy: -200.0 });

        assert_eq!(run.run_state().layer_index, 1);
        assert_eq!(run.phase(), Phase::Active);
        assert_eq!(run.run_state().health, 80, "health persists across layers");
        assert_eq!(
            run.current_layer().expect("layer").layer_score,
            0,
            "layer score resets on entry"
        );
    }

    #[test]
    fn test_popup_shown_on_collect_and_dismissed() {
        let bus = EventBus::new();
        let shown = capture(&bus, EventKind::PopupShown);
        let hidden = capture(&bus, EventKind::PopupHidden);
        let mut run = QuestRun::new(quest_of(vec![platformer_layer(
            LayerKind::Browser,
            0,
            json!({ "theme": "http" }),
        )]));
        run.start(&bus);

        {
            let runtime = run.layer.as_mut().expect("layer live");
            let token = &runtime.level.as_ref().expect("level").collectibles[0];
            let (x, y) = (token.x, token.y);
            runtime.player.x = x - runtime.player.width / 2.0;
            runtime.player.y = y - runtime.player.height / 2.0;
        }
        run.update(&bus, 0.016, PlayerInput::IDLE);
        assert_eq!(shown.borrow().len(), 1);

        run.dismiss_popup(&bus);
        run.dismiss_popup(&bus);
        assert_eq!(hidden.borrow().len(), 1);
    }
}
