//! Tuning constants — level geometry, combat, scoring, timing.
//!
//! Plain values with no runtime dependency. Both the engine crate and the
//! native simtest use these.

pub mod level {
    /// Base level length when no explicit override is configured.
    pub const BASE_LENGTH: f32 = 2000.0;
    /// Additional length per requested obstacle.
    pub const LENGTH_PER_OBSTACLE: f32 = 300.0;
    /// Obstacle count used when a challenge omits or zeroes the field.
    pub const DEFAULT_OBSTACLE_COUNT: u32 = 5;
    /// Default hazard palette for platformer challenges.
    pub const DEFAULT_OBSTACLE_TYPES: [&str; 4] = ["bug", "firewall", "virus", "error404"];
    /// Cosmetic scroll speed passed through to the renderer.
    pub const DEFAULT_SPEED: f32 = 1.0;

    /// Top edge of the ground band (y grows downward).
    pub const GROUND_Y: f32 = 400.0;
    pub const GROUND_THICKNESS: f32 = 50.0;
    pub const GROUND_WIDTH_MIN: f32 = 200.0;
    pub const GROUND_WIDTH_MAX: f32 = 400.0;
    pub const GROUND_GAP_MIN: f32 = 50.0;
    pub const GROUND_GAP_MAX: f32 = 150.0;

    /// One floating platform per this many units of level length.
    pub const FLOAT_INTERVAL: f32 = 300.0;
    pub const FLOAT_JITTER: f32 = 60.0;
    pub const FLOAT_WIDTH_MIN: f32 = 80.0;
    pub const FLOAT_WIDTH_MAX: f32 = 160.0;
    pub const FLOAT_THICKNESS: f32 = 20.0;
    /// Reachable height band for floating platforms.
    pub const FLOAT_Y_MIN: f32 = 220.0;
    pub const FLOAT_Y_MAX: f32 = 330.0;

    pub const OBSTACLE_SIZE: f32 = 40.0;
    pub const OBSTACLE_JITTER: f32 = 40.0;
    /// Chance an obstacle is raised onto the nearest floating platform.
    pub const OBSTACLE_RAISE_CHANCE: f64 = 0.3;

    pub const COLLECTIBLE_RADIUS: f32 = 15.0;
    /// Max distance from the ideal spot at which a collectible snaps to a
    /// floating platform.
    pub const COLLECTIBLE_SNAP_RADIUS: f32 = 120.0;
    /// Hover height above the ground for unsnapped collectibles.
    pub const COLLECTIBLE_HOVER: f32 = 150.0;
    pub const COLLECTIBLE_CLEARANCE: f32 = 6.0;

    pub const GATE_WIDTH: f32 = 30.0;
    pub const GATE_HEIGHT: f32 = 120.0;
    /// First gate sits this far right of its collectible.
    pub const GATE_BASE_OFFSET: f32 = 150.0;
    /// Each later gate is pushed further right by this much per order index.
    pub const GATE_STEP: f32 = 50.0;
}

pub mod player {
    pub const MAX_HEALTH: u32 = 100;
    pub const WIDTH: f32 = 32.0;
    pub const HEIGHT: f32 = 48.0;
    pub const START_X: f32 = 20.0;
}

pub mod combat {
    /// Health lost on obstacle contact.
    pub const OBSTACLE_DAMAGE: u32 = 20;
    /// Seconds before a struck obstacle reappears.
    pub const OBSTACLE_RESPAWN_DELAY: f32 = 3.0;
}

pub mod scoring {
    /// Awarded for each collected token.
    pub const TOKEN: u32 = 100;
    /// Awarded when a theme's token sequence completes in order.
    pub const SEQUENCE_BONUS: u32 = 500;
    /// Awarded the first time each CRUD method succeeds.
    pub const CRUD_METHOD: u32 = 100;
    /// Awarded once when all four CRUD methods have succeeded.
    pub const CRUD_BONUS: u32 = 300;
}
