//! Integration tests for the full level generation pipeline.
//!
//! Exercises: LevelConfig → SeededRng → platforms → obstacles
//! → collectibles → gates.
//!
//! All tests are pure logic — no engine, no rendering.

use stackquest_logic::constants::level as c;
use stackquest_logic::level::{generate, LevelConfig};
use stackquest_logic::theme::CollectibleTheme;

fn tcp_config() -> LevelConfig {
    LevelConfig {
        obstacles: 5,
        theme: CollectibleTheme::Tcp,
        ..Default::default()
    }
}

// ── Determinism ─────────────────────────────────────────────────────────

#[test]
fn deterministic_output() {
    let config = tcp_config();
    let a = generate(&config);
    let b = generate(&config);
    assert_eq!(a.platforms, b.platforms);
    assert_eq!(a.obstacles, b.obstacles);
    assert_eq!(a.collectibles, b.collectibles);
    assert_eq!(a.gates, b.gates);
    assert_eq!(a, b);
}

#[test]
fn determinism_holds_across_all_themes() {
    for theme in [
        CollectibleTheme::Tcp,
        CollectibleTheme::Http,
        CollectibleTheme::Auth,
        CollectibleTheme::Api,
        CollectibleTheme::None,
    ] {
        let config = LevelConfig {
            theme,
            ..Default::default()
        };
        assert_eq!(generate(&config), generate(&config), "{:?}", theme);
    }
}

#[test]
fn different_obstacle_counts_produce_different_layouts() {
    let a = generate(&LevelConfig {
        obstacles: 3,
        ..Default::default()
    });
    let b = generate(&LevelConfig {
        obstacles: 4,
        ..Default::default()
    });
    assert_ne!(a.platforms, b.platforms);
}

// ── Length scaling ──────────────────────────────────────────────────────

#[test]
fn length_scales_monotonically_with_obstacles() {
    let mut previous = 0.0;
    for obstacles in 1..=12 {
        let level = generate(&LevelConfig {
            obstacles,
            ..Default::default()
        });
        assert!(
            level.length > previous,
            "length {} at {} obstacles did not grow past {}",
            level.length,
            obstacles,
            previous
        );
        previous = level.length;
    }
}

// ── The TCP handshake scenario ──────────────────────────────────────────

#[test]
fn tcp_scenario_produces_handshake_tokens_and_gates() {
    let level = generate(&tcp_config());

    let ids: Vec<&str> = level.collectibles.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["SYN", "SYN-ACK", "ACK"]);
    for (i, token) in level.collectibles.iter().enumerate() {
        assert_eq!(token.order, i);
    }

    assert_eq!(level.gates.len(), 3);
    for (gate, token) in level.gates.iter().zip(&level.collectibles) {
        assert_eq!(gate.requires, token.id);
        assert!(
            gate.x > token.x,
            "gate for {} at {} not strictly after token at {}",
            token.id,
            gate.x,
            token.x
        );
    }
}

#[test]
fn tcp_collectibles_have_teaching_labels() {
    let level = generate(&tcp_config());
    for token in &level.collectibles {
        assert!(!token.label.is_empty());
        assert!(token.label.contains(&token.id[..3]));
    }
}

// ── Geometry sanity ─────────────────────────────────────────────────────

#[test]
fn all_geometry_stays_within_level_bounds() {
    let level = generate(&tcp_config());
    for o in &level.obstacles {
        assert!(o.x > 0.0 && o.x < level.length);
        assert!(o.y <= c::GROUND_Y - c::OBSTACLE_SIZE);
    }
    for t in &level.collectibles {
        assert!(t.x > 0.0 && t.x < level.length);
    }
    for p in &level.platforms {
        assert!(p.x >= 0.0);
    }
}

#[test]
fn obstacles_sit_on_ground_or_on_a_floating_platform() {
    let level = generate(&LevelConfig {
        obstacles: 20,
        ..Default::default()
    });
    let ground_top = c::GROUND_Y - c::OBSTACLE_SIZE;
    let float_tops: Vec<f32> = level
        .platforms
        .iter()
        .filter(|p| p.y != c::GROUND_Y)
        .map(|p| p.y - c::OBSTACLE_SIZE)
        .collect();
    for o in &level.obstacles {
        let on_ground = (o.y - ground_top).abs() < f32::EPSILON;
        let on_platform = float_tops.iter().any(|t| (o.y - *t).abs() < f32::EPSILON);
        assert!(on_ground || on_platform, "obstacle at y={}", o.y);
    }
}

#[test]
fn gated_theme_gate_offsets_grow_per_index() {
    let level = generate(&LevelConfig {
        theme: CollectibleTheme::Auth,
        ..Default::default()
    });
    let offsets: Vec<f32> = level
        .gates
        .iter()
        .zip(&level.collectibles)
        .map(|(g, t)| g.x - t.x)
        .collect();
    for pair in offsets.windows(2) {
        assert!(pair[1] > pair[0]);
    }
}
