//! Deterministic procedural level generation.
//!
//! [`generate`] is a pure function from a [`LevelConfig`] to a
//! [`GeneratedLevel`]: same config, same level, bit for bit. All randomness
//! comes from the seeded LCG in [`crate::rng`], seeded from the obstacle
//! count alone, so a level can be reproduced or shared without ever
//! persisting its geometry.
//!
//! Generation passes run in a fixed order — ground, floating platforms,
//! obstacles, collectibles, gates — because the passes share one RNG stream
//! and reordering them would change every level.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collision::{Circle, Rect};
use crate::constants::level as c;
use crate::rng::SeededRng;
use crate::theme::CollectibleTheme;

/// A platform segment: ground tile or floating ledge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Platform {
    fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// A hazard placed along the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    /// Type tag drawn from the challenge's palette.
    pub kind: String,
}

impl Obstacle {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, c::OBSTACLE_SIZE, c::OBSTACLE_SIZE)
    }
}

/// A themed token. `x`/`y` is the token's center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub x: f32,
    pub y: f32,
    pub id: String,
    /// Teaching text shown on collection.
    pub label: String,
    /// Zero-based required collection order.
    pub order: usize,
}

impl Collectible {
    pub fn bounds(&self) -> Circle {
        Circle::new(self.x, self.y, c::COLLECTIBLE_RADIUS)
    }
}

/// A barrier that opens once its required collectible has been gathered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub x: f32,
    pub y: f32,
    /// Id of the collectible that unlocks this gate.
    pub requires: String,
}

impl Gate {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, c::GATE_WIDTH, c::GATE_HEIGHT)
    }
}

/// A fully generated level. Ephemeral: built fresh on layer entry, dropped
/// on layer exit, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLevel {
    pub length: f32,
    /// Cosmetic scroll speed for the renderer; generation ignores it.
    pub scroll_speed: f32,
    /// Ground segments first, floating platforms after, both left-to-right.
    pub platforms: Vec<Platform>,
    pub obstacles: Vec<Obstacle>,
    pub theme: CollectibleTheme,
    pub collectibles: Vec<Collectible>,
    pub gates: Vec<Gate>,
}

/// Parsed platformer challenge configuration.
///
/// Every field degrades to a sensible default rather than erroring: a bad
/// config is an authoring defect, not a runtime failure.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    pub obstacles: u32,
    pub obstacle_types: Vec<String>,
    pub level_length: Option<f32>,
    pub theme: CollectibleTheme,
    pub speed: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            obstacles: c::DEFAULT_OBSTACLE_COUNT,
            obstacle_types: default_obstacle_types(),
            level_length: None,
            theme: CollectibleTheme::None,
            speed: c::DEFAULT_SPEED,
        }
    }
}

pub fn default_obstacle_types() -> Vec<String> {
    c::DEFAULT_OBSTACLE_TYPES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl LevelConfig {
    /// Read the recognized keys out of a challenge's opaque config map.
    /// Unrecognized keys are ignored; wrong-typed or out-of-range values
    /// fall back to defaults.
    pub fn from_challenge_config(config: &Map<String, Value>) -> Self {
        let mut parsed = Self::default();
        if let Some(n) = config.get("obstacles").and_then(Value::as_u64) {
            if n > 0 {
                parsed.obstacles = n as u32;
            }
        }
        if let Some(types) = config.get("obstacleTypes").and_then(Value::as_array) {
            let names: Vec<String> = types
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            if !names.is_empty() {
                parsed.obstacle_types = names;
            }
        }
        if let Some(length) = config.get("levelLength").and_then(Value::as_f64) {
            if length > 0.0 {
                parsed.level_length = Some(length as f32);
            }
        }
        if let Some(theme) = config.get("theme").and_then(Value::as_str) {
            parsed.theme = CollectibleTheme::parse(theme);
        }
        if let Some(speed) = config.get("speed").and_then(Value::as_f64) {
            if speed > 0.0 {
                parsed.speed = speed as f32;
            }
        }
        parsed
    }

    /// Obstacle count with the zero-count defect degraded to the default.
    pub fn effective_obstacles(&self) -> u32 {
        if self.obstacles == 0 {
            c::DEFAULT_OBSTACLE_COUNT
        } else {
            self.obstacles
        }
    }

    /// Level length: explicit override, or the base plus a fixed stretch per
    /// obstacle, so more obstacles always means a longer level.
    pub fn length(&self) -> f32 {
        self.level_length
            .unwrap_or(c::BASE_LENGTH + self.effective_obstacles() as f32 * c::LENGTH_PER_OBSTACLE)
    }
}

/// Build a complete level from a config. Pure and deterministic.
pub fn generate(config: &LevelConfig) -> GeneratedLevel {
    let obstacle_count = config.effective_obstacles();
    let mut rng = SeededRng::for_obstacle_count(obstacle_count);
    let length = config.length();

    let mut platforms = ground_platforms(&mut rng, length);
    let floating = floating_platforms(&mut rng, length);
    let obstacles = place_obstacles(&mut rng, config, obstacle_count, length, &floating);
    let collectibles = place_collectibles(config.theme, length, &floating);
    let gates = place_gates(config.theme, &collectibles);
    platforms.extend(floating);

    GeneratedLevel {
        length,
        scroll_speed: config.speed,
        platforms,
        obstacles,
        theme: config.theme,
        collectibles,
        gates,
    }
}

// ── Generation passes ───────────────────────────────────────────────────

/// Tile the ground left-to-right with randomly sized segments separated by
/// randomly sized gaps, starting at x = 0.
fn ground_platforms(rng: &mut SeededRng, length: f32) -> Vec<Platform> {
    let mut platforms = Vec::new();
    let mut x = 0.0;
    while x < length {
        let width = rng.range(c::GROUND_WIDTH_MIN, c::GROUND_WIDTH_MAX);
        platforms.push(Platform {
            x,
            y: c::GROUND_Y,
            width,
            height: c::GROUND_THICKNESS,
        });
        let gap = rng.range(c::GROUND_GAP_MIN, c::GROUND_GAP_MAX);
        x += width + gap;
    }
    platforms
}

/// Place `floor(length / FLOAT_INTERVAL)` ledges at roughly even x-spacing
/// with jitter, at a randomized reachable height.
fn floating_platforms(rng: &mut SeededRng, length: f32) -> Vec<Platform> {
    let count = (length / c::FLOAT_INTERVAL) as usize;
    let mut platforms = Vec::with_capacity(count);
    if count == 0 {
        return platforms;
    }
    let spacing = length / count as f32;
    for i in 0..count {
        let x = (i as f32 * spacing + rng.range(-c::FLOAT_JITTER, c::FLOAT_JITTER)).max(0.0);
        let y = rng.range(c::FLOAT_Y_MIN, c::FLOAT_Y_MAX);
        let width = rng.range(c::FLOAT_WIDTH_MIN, c::FLOAT_WIDTH_MAX);
        platforms.push(Platform {
            x,
            y,
            width,
            height: c::FLOAT_THICKNESS,
        });
    }
    platforms
}

/// Place the requested count at evenly spaced intervals with jitter. Type is
/// drawn uniformly from the palette; a fixed fraction get raised onto the
/// nearest floating platform instead of sitting on the ground.
fn place_obstacles(
    rng: &mut SeededRng,
    config: &LevelConfig,
    count: u32,
    length: f32,
    floating: &[Platform],
) -> Vec<Obstacle> {
    let fallback = default_obstacle_types();
    let palette: &[String] = if config.obstacle_types.is_empty() {
        &fallback
    } else {
        &config.obstacle_types
    };

    let interval = length / (count + 1) as f32;
    let ground_top = c::GROUND_Y - c::OBSTACLE_SIZE;

    let mut obstacles = Vec::with_capacity(count as usize);
    for i in 1..=count {
        // Three draws per obstacle, branch or not, so placement of later
        // obstacles never depends on earlier raise decisions.
        let x = i as f32 * interval + rng.range(-c::OBSTACLE_JITTER, c::OBSTACLE_JITTER);
        let kind = palette[rng.index(palette.len())].clone();
        let raised = rng.chance(c::OBSTACLE_RAISE_CHANCE);

        let y = if raised {
            nearest_platform(floating, x)
                .map(|p| p.y - c::OBSTACLE_SIZE)
                .unwrap_or(ground_top)
        } else {
            ground_top
        };
        obstacles.push(Obstacle { x, y, kind });
    }
    obstacles
}

/// One collectible per theme token, evenly spaced in required order, snapped
/// onto a floating platform when one is close enough.
fn place_collectibles(
    theme: CollectibleTheme,
    length: f32,
    floating: &[Platform],
) -> Vec<Collectible> {
    let tokens = theme.spec().tokens;
    if tokens.is_empty() {
        return Vec::new();
    }
    let spacing = length / (tokens.len() + 1) as f32;
    tokens
        .iter()
        .enumerate()
        .map(|(order, token)| {
            let ideal_x = spacing * (order + 1) as f32;
            let (x, y) = match nearest_platform(floating, ideal_x) {
                Some(p) if (p.center_x() - ideal_x).abs() <= c::COLLECTIBLE_SNAP_RADIUS => (
                    p.center_x(),
                    p.y - c::COLLECTIBLE_RADIUS - c::COLLECTIBLE_CLEARANCE,
                ),
                _ => (ideal_x, c::GROUND_Y - c::COLLECTIBLE_HOVER),
            };
            Collectible {
                x,
                y,
                id: token.id.to_string(),
                label: token.label.to_string(),
                order,
            }
        })
        .collect()
}

/// Gated themes get one gate per collectible, strictly after it, pushed
/// further right per order index.
fn place_gates(theme: CollectibleTheme, collectibles: &[Collectible]) -> Vec<Gate> {
    if !theme.spec().gated {
        return Vec::new();
    }
    collectibles
        .iter()
        .map(|collectible| Gate {
            x: collectible.x + c::GATE_BASE_OFFSET + collectible.order as f32 * c::GATE_STEP,
            y: c::GROUND_Y - c::GATE_HEIGHT,
            requires: collectible.id.clone(),
        })
        .collect()
}

fn nearest_platform<'a>(platforms: &'a [Platform], x: f32) -> Option<&'a Platform> {
    platforms.iter().min_by(|a, b| {
        let da = (a.center_x() - x).abs();
        let db = (b.center_x() - x).abs();
        da.partial_cmp(&db).unwrap_or(Ordering::Equal)
    })
}
