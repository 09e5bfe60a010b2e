//! Air Strike - A vertical-scrolling arcade shoot-em-up
//!
//! Core modules:
//! - `sim`: Per-frame simulation (spawning, movement, collisions, scoring, bosses)
//! - `game`: Command facade for input/audio/render collaborators
//! - `audio`: Sound event vocabulary and the caller-supplied audio sink
//! - `platform`: Frame clock abstraction
//! - `settings`: Persisted player preferences
//! - `config`: Arena and difficulty configuration

pub mod audio;
pub mod config;
pub mod game;
pub mod platform;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, EnemyRoster, GameConfig, MovementMode};
pub use game::Game;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default arena dimensions (overridden by `GameConfig`)
    pub const DEFAULT_ARENA_WIDTH: f32 = 800.0;
    pub const DEFAULT_ARENA_HEIGHT: f32 = 600.0;

    /// Entity sizes
    pub const PLAYER_SIZE: f32 = 50.0;
    pub const BULLET_WIDTH: f32 = 8.0;
    pub const BULLET_HEIGHT: f32 = 20.0;
    pub const LASER_WIDTH: f32 = 4.0;
    pub const LASER_HEIGHT: f32 = 300.0;
    pub const ENEMY_SIZE: f32 = 45.0;

    /// Speeds (pixels per frame)
    pub const BULLET_SPEED: f32 = 15.0;
    pub const ENEMY_SPEED: f32 = 3.0;
    pub const ITEM_FALL_SPEED: f32 = 3.0;

    /// Player movement smoothing (fraction of remaining distance per frame)
    pub const MOVE_SMOOTHING: f32 = 0.2;
    /// Movement below this is treated as "no change"
    pub const MOVE_DEADZONE: f32 = 0.1;

    /// Cadences (milliseconds)
    pub const SHOOT_INTERVAL_MS: u64 = 200;
    pub const LASER_INTERVAL_MS: u64 = 50;
    pub const SPAWN_INTERVAL_MS: u64 = 1200;
    pub const MIN_SPAWN_INTERVAL_MS: u64 = 500;
    pub const SPAWN_SPEEDUP_PER_LEVEL_MS: u64 = 100;
    pub const SHOOTER_INTERVAL_MS: u64 = 2000;
    pub const BOSS_SHOOT_INTERVAL_MS: u64 = 1000;

    /// Player stats
    pub const PLAYER_MAX_HP: f32 = 100.0;
    pub const MAX_POWER: u8 = 5;
    pub const SHIELD_MAX: f32 = 100.0;
    pub const SHIELD_ITEM_BONUS: f32 = 50.0;

    /// Damage dealt to the player
    pub const BULLET_HIT_DAMAGE: f32 = 10.0;
    pub const ENEMY_CONTACT_DAMAGE: f32 = 30.0;
    pub const BOSS_CONTACT_DAMAGE: f32 = 50.0;

    /// Hit shapes (fraction of entity size)
    pub const PLAYER_HIT_RADIUS: f32 = 0.4;
    pub const ENEMY_HIT_RADIUS: f32 = 0.4;
    pub const BOSS_HIT_RADIUS: f32 = 0.45;
    pub const BOMBER_RADIUS_X: f32 = 0.6;
    pub const BOMBER_RADIUS_Y: f32 = 0.8;

    /// Boss tuning
    pub const BOSS_DAMAGE_MULTIPLIER: f32 = 2.0;
    pub const BOSS_LASER_DAMAGE_CAP: f32 = 4.0;
    pub const BOSS_PHASE2_HP_RATIO: f32 = 0.5;
    pub const BOSS_PHASE1_BULLETS: i32 = 3;
    pub const BOSS_PHASE2_BULLETS: u32 = 8;
    pub const BOSS_HOVER_RATIO: f32 = 0.4;
    pub const BOSS_TOP_BOUND: f32 = 50.0;

    /// Progression
    pub const SCORE_PER_LEVEL: u64 = 500;
    pub const LEVELS_PER_STAGE: u32 = 5;
    pub const INITIAL_BOMBS: u32 = 3;

    /// Combo reset delay after the last kill
    pub const COMBO_RESET_MS: u64 = 3000;

    /// Chance that a destroyed enemy drops an item
    pub const ITEM_DROP_CHANCE: f64 = 0.12;

    /// Explosion particles
    pub const EXPLOSION_PARTICLES: usize = 15;
    pub const BOMB_EXPLOSION_PARTICLES: usize = 20;
    pub const CHAIN_EXPLOSION_PARTICLES: usize = 8;
    pub const CHAIN_EXPLOSION_DELAY_MS: u64 = 80;
    pub const PARTICLE_DECAY: f32 = 0.03;
    pub const PARTICLE_SHRINK: f32 = 0.95;

    /// Initial pool capacities (soft caps; pools grow on exhaustion)
    pub const POOL_BULLETS: usize = 200;
    pub const POOL_ENEMIES: usize = 100;
    pub const POOL_PARTICLES: usize = 1000;
    pub const POOL_EXPLOSIONS: usize = 50;
    pub const POOL_ITEMS: usize = 50;

    /// Guard for normalizing direction vectors
    pub const AIM_EPSILON: f32 = 1e-4;
}

/// Unit vector from `from` toward `to`, or straight down when the two points coincide
#[inline]
pub fn aim_direction(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    if dist < consts::AIM_EPSILON {
        Vec2::Y
    } else {
        delta / dist
    }
}

/// Convert a heading angle and speed to a velocity (angle measured from +x, y down)
#[inline]
pub fn polar_velocity(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.cos() * speed, angle.sin() * speed)
}
