//! StackQuest headless validation harness.
//!
//! Validates pure logic and the quest engine without a renderer or a real
//! quest store. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p stackquest-simtest
//!   cargo run -p stackquest-simtest -- --verbose

use std::cell::RefCell;
use std::rc::Rc;

use stackquest_engine::{
    EngineEvent, EventKind, FetchError, PlayerInput, QuestEnvelope, QuestSession, QuestSource,
};
use stackquest_logic::collect::{CollectionProgress, CrudProgress, HttpMethod};
use stackquest_logic::collision::{
    circle_contains_point, circles_overlap, rect_contains_point, rects_overlap, Circle, Rect, Vec2,
};
use stackquest_logic::level::{generate, LevelConfig};
use stackquest_logic::quest::{self, RawQuest};
use stackquest_logic::rng::SeededRng;
use stackquest_logic::theme::CollectibleTheme;

// ── Sample quest (same JSON a quest store would serve) ──────────────────
const SAMPLE_QUEST_JSON: &str = include_str!("../../../data/sample_quest.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== StackQuest Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Sample quest definition
    results.extend(validate_sample_quest(verbose));

    // 2. Collision predicate sweep
    results.extend(validate_collision(verbose));

    // 3. Seeded RNG stream
    results.extend(validate_rng(verbose));

    // 4. Level generation properties
    results.extend(validate_generation(verbose));

    // 5. Collection and CRUD trackers
    results.extend(validate_collection(verbose));

    // 6. Full scripted attempt through the engine
    results.extend(validate_full_attempt(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Sample quest ─────────────────────────────────────────────────────

fn validate_sample_quest(_verbose: bool) -> Vec<TestResult> {
    println!("--- Sample Quest ---");
    let mut results = Vec::new();

    let raw: RawQuest = match serde_json::from_str(SAMPLE_QUEST_JSON) {
        Ok(raw) => raw,
        Err(e) => {
            results.push(check("quest_parse", false, format!("JSON error: {e}")));
            return results;
        }
    };
    let quest = match quest::validate(raw) {
        Ok(quest) => quest,
        Err(e) => {
            results.push(check("quest_validate", false, e.to_string()));
            return results;
        }
    };

    results.push(check(
        "quest_validate",
        true,
        format!("`{}` with {} layers", quest.id, quest.layers.len()),
    ));
    results.push(check(
        "quest_layer_count",
        quest.layers.len() == 4,
        format!("{} layers", quest.layers.len()),
    ));
    let ascending = quest.layers.windows(2).all(|w| w[0].order < w[1].order);
    results.push(check(
        "quest_layers_ascending",
        ascending,
        "orders strictly ascending",
    ));
    let all_typed = quest.layers.iter().all(|l| !l.challenge.kind.is_empty());
    results.push(check(
        "quest_challenges_typed",
        all_typed,
        "every layer has a typed challenge",
    ));
    results
}

// ── 2. Collision ────────────────────────────────────────────────────────

fn validate_collision(_verbose: bool) -> Vec<TestResult> {
    println!("--- Collision Predicates ---");
    let mut results = Vec::new();

    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(10.0, 0.0, 10.0, 10.0);
    results.push(check(
        "edge_sharing_rects",
        !rects_overlap(&a, &b),
        "rects sharing an edge do not collide",
    ));

    let degenerate = Rect::new(0.0, 0.0, 0.0, 10.0);
    results.push(check(
        "degenerate_rect",
        !rects_overlap(&degenerate, &a),
        "zero-width rect never collides",
    ));

    let c1 = Circle::new(0.0, 0.0, 5.0);
    let c2 = Circle::new(10.0, 0.0, 5.0);
    let c3 = Circle::new(9.9, 0.0, 5.0);
    results.push(check(
        "touching_circles",
        !circles_overlap(&c1, &c2) && circles_overlap(&c1, &c3),
        "touching circles excluded, overlapping included",
    ));

    let half_open = rect_contains_point(Vec2::new(0.0, 0.0), &a)
        && !rect_contains_point(Vec2::new(10.0, 0.0), &a);
    results.push(check(
        "half_open_containment",
        half_open,
        "min edge inclusive, max edge exclusive",
    ));

    results.push(check(
        "strict_circle_containment",
        !circle_contains_point(Vec2::new(5.0, 0.0), &c1),
        "boundary point is outside",
    ));
    results
}

// ── 3. RNG ──────────────────────────────────────────────────────────────

fn validate_rng(verbose: bool) -> Vec<TestResult> {
    println!("--- Seeded RNG ---");
    let mut results = Vec::new();

    let mut a = SeededRng::for_obstacle_count(5);
    let mut b = SeededRng::for_obstacle_count(5);
    let streams_match = (0..256).all(|_| a.next_f64() == b.next_f64());
    results.push(check(
        "stream_determinism",
        streams_match,
        "same seed, same 256-value stream",
    ));

    let mut rng = SeededRng::for_obstacle_count(5);
    let first = rng.next_f64();
    let expected = 206_552.0 / 233_280.0;
    results.push(check(
        "stream_pinned",
        (first - expected).abs() < 1e-12,
        format!("first draw {first:.6}"),
    ));

    let mut rng = SeededRng::new(1);
    let in_bounds = (0..10_000).all(|_| {
        let v = rng.next_f64();
        (0.0..1.0).contains(&v)
    });
    results.push(check("stream_bounds", in_bounds, "10k draws inside [0,1)"));

    if verbose {
        let mut sample = SeededRng::for_obstacle_count(5);
        let head: Vec<String> = (0..5).map(|_| format!("{:.4}", sample.next_f64())).collect();
        println!("  stream head: {}", head.join(", "));
    }
    results
}

// ── 4. Level generation ─────────────────────────────────────────────────

fn validate_generation(verbose: bool) -> Vec<TestResult> {
    println!("--- Level Generation ---");
    let mut results = Vec::new();

    let tcp = LevelConfig {
        obstacles: 5,
        theme: CollectibleTheme::Tcp,
        ..Default::default()
    };
    results.push(check(
        "generation_deterministic",
        generate(&tcp) == generate(&tcp),
        "identical configs yield identical levels",
    ));

    let mut lengths = Vec::new();
    for obstacles in 1..=10 {
        lengths.push(
            generate(&LevelConfig {
                obstacles,
                ..Default::default()
            })
            .length,
        );
    }
    let monotonic = lengths.windows(2).all(|w| w[0] < w[1]);
    results.push(check(
        "length_monotonic",
        monotonic,
        format!("lengths {:.0}..{:.0}", lengths[0], lengths[lengths.len() - 1]),
    ));

    let level = generate(&tcp);
    let ids: Vec<&str> = level.collectibles.iter().map(|c| c.id.as_str()).collect();
    results.push(check(
        "tcp_scenario_tokens",
        ids == ["SYN", "SYN-ACK", "ACK"],
        format!("{ids:?}"),
    ));
    let gates_after_tokens = level.gates.len() == 3
        && level
            .gates
            .iter()
            .zip(&level.collectibles)
            .all(|(g, c)| g.requires == c.id && g.x > c.x);
    results.push(check(
        "tcp_scenario_gates",
        gates_after_tokens,
        format!("{} gates, each strictly after its token", level.gates.len()),
    ));

    let bare = generate(&LevelConfig::default());
    results.push(check(
        "none_theme_empty",
        bare.collectibles.is_empty() && bare.gates.is_empty(),
        "default theme places no tokens or gates",
    ));

    if verbose {
        println!(
            "  tcp level: length {:.0}, {} platforms, {} obstacles",
            level.length,
            level.platforms.len(),
            level.obstacles.len()
        );
    }
    results
}

// ── 5. Collection & CRUD ────────────────────────────────────────────────

fn validate_collection(_verbose: bool) -> Vec<TestResult> {
    println!("--- Collection Trackers ---");
    let mut results = Vec::new();

    let mut ordered = CollectionProgress::new(CollectibleTheme::Tcp);
    let steps = [
        ordered.collect("SYN"),
        ordered.collect("SYN-ACK"),
        ordered.collect("ACK"),
    ];
    results.push(check(
        "in_order_sequence",
        steps.iter().all(|s| s.in_order)
            && steps[2].newly_complete
            && steps[2].all_in_order,
        "ordered handshake completes with bonus flag",
    ));

    let mut scrambled = CollectionProgress::new(CollectibleTheme::Tcp);
    let first = scrambled.collect("ACK");
    scrambled.collect("SYN");
    scrambled.collect("SYN-ACK");
    results.push(check(
        "out_of_order_counts",
        first.violation && scrambled.all_collected() && !scrambled.is_sequence_complete(),
        "scrambled set counts fully but never completes the sequence",
    ));
    results.push(check(
        "gate_unlock_order_free",
        scrambled.is_unlocked("ACK") && scrambled.is_unlocked("SYN"),
        "unlocking ignores collection order",
    ));

    let mut crud = CrudProgress::new();
    crud.record(HttpMethod::Delete, true);
    crud.record(HttpMethod::Delete, true);
    crud.record(HttpMethod::Get, true);
    crud.record(HttpMethod::Post, true);
    let before = crud.is_complete();
    let last = crud.record(HttpMethod::Put, true);
    results.push(check(
        "crud_completion",
        !before && last.newly_complete && crud.is_complete(),
        "fires only once all four methods succeeded",
    ));

    let mut failures = CrudProgress::new();
    for method in HttpMethod::ALL {
        failures.record(method, false);
    }
    results.push(check(
        "crud_ignores_failures",
        !failures.is_complete(),
        "failed requests never advance progress",
    ));
    results
}

// ── 6. Full attempt ─────────────────────────────────────────────────────

/// Quest store stub serving the bundled sample quest.
struct SampleStore;

impl QuestSource for SampleStore {
    fn fetch_quest(&self, id: &str) -> Result<QuestEnvelope, FetchError> {
        if id == "web-stack" {
            Ok(QuestEnvelope {
                success: true,
                data: Some(
                    serde_json::from_str(SAMPLE_QUEST_JSON)
                        .map_err(|e| FetchError(e.to_string()))?,
                ),
                error: None,
            })
        } else {
            Ok(QuestEnvelope {
                success: false,
                data: None,
                error: Some(format!("no quest with id `{id}`")),
            })
        }
    }
}

fn collect_layer_tokens(session: &mut QuestSession<SampleStore>) -> bool {
    let tokens: Vec<(f32, f32)> = match session
        .run()
        .and_then(|r| r.current_layer())
        .and_then(|l| l.level.as_ref())
    {
        Some(level) => level.collectibles.iter().map(|t| (t.x, t.y)).collect(),
        None => return false,
    };
    for (x, y) in tokens {
        let player = match session.run().and_then(|r| r.current_layer()) {
            Some(layer) => layer.player,
            None => return false,
        };
        session.update(
            0.016,
            PlayerInput {
                dx: x - (player.x + player.width / 2.0),
                dy: y - (player.y + player.height / 2.0),
            },
        );
    }
    true
}

fn validate_full_attempt(verbose: bool) -> Vec<TestResult> {
    println!("--- Full Attempt ---");
    let mut results = Vec::new();

    let mut session = QuestSession::new(SampleStore);
    let log: Rc<RefCell<Vec<EngineEvent>>> = Rc::new(RefCell::new(Vec::new()));
    for kind in EventKind::ALL {
        let sink = Rc::clone(&log);
        session
            .bus()
            .subscribe(kind, move |e| sink.borrow_mut().push(e.clone()));
    }

    if let Err(e) = session.start_attempt("web-stack") {
        results.push(check("attempt_start", false, e.to_string()));
        return results;
    }
    results.push(check("attempt_start", true, "first layer entered"));

    // BROWSER and NETWORK layers: collect every themed token in order.
    let browser_ok = collect_layer_tokens(&mut session);
    let network_ok = collect_layer_tokens(&mut session);
    results.push(check(
        "platformer_layers",
        browser_ok && network_ok,
        "both themed layers cleared by collection",
    ));

    // API layer: cover all four CRUD methods, with one failure mixed in.
    session.record_api_call(HttpMethod::Get, true);
    session.record_api_call(HttpMethod::Post, false);
    session.record_api_call(HttpMethod::Post, true);
    session.record_api_call(HttpMethod::Put, true);
    session.record_api_call(HttpMethod::Delete, true);

    // DATABASE layer: the host reports the quiz solved.
    session.complete_challenge();

    let events = log.borrow();
    let count = |kind: EventKind| events.iter().filter(|e| e.kind() == kind).count();

    results.push(check(
        "four_layers_entered",
        count(EventKind::LayerEntered) == 4,
        format!("{} layer-entered events", count(EventKind::LayerEntered)),
    ));
    results.push(check(
        "four_layers_completed",
        count(EventKind::LayerCompleted) == 4,
        format!("{} layer-completed events", count(EventKind::LayerCompleted)),
    ));
    results.push(check(
        "quest_victory",
        count(EventKind::QuestCompleted) == 1 && count(EventKind::PlayerDied) == 0,
        "quest completed without dying",
    ));
    results.push(check(
        "sequences_completed",
        count(EventKind::SequenceComplete) == 2,
        "http and tcp sequences both completed",
    ));
    results.push(check(
        "crud_completed",
        count(EventKind::CrudComplete) == 1,
        "crud completion fired once",
    ));

    let final_score = events.iter().rev().find_map(|e| match e {
        EngineEvent::QuestCompleted { score } => Some(*score),
        _ => None,
    });
    results.push(check(
        "score_accumulated",
        final_score.unwrap_or(0) > 0,
        format!("final score {:?}", final_score),
    ));

    if verbose {
        println!("  {} events captured", events.len());
    }
    drop(events);

    // Teardown must leave no handlers behind for the next attempt.
    session.end_attempt();
    let clean = EventKind::ALL
        .iter()
        .all(|k| session.bus().handler_count(*k) == 0);
    results.push(check(
        "teardown_clears_bus",
        clean,
        "no handlers survive end_attempt",
    ));
    results
}
