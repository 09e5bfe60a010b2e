//! Arena and difficulty configuration
//!
//! Defaults match the classic 800x600 cabinet. Every field can be overridden
//! from the environment by the headless runner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// How the player follows the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// Close a fraction of the remaining distance each step
    #[default]
    Smooth,
    /// Jump straight to the target
    Snap,
}

impl MovementMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "smooth" => Some(MovementMode::Smooth),
            "snap" => Some(MovementMode::Snap),
            _ => None,
        }
    }
}

/// Which enemy types can spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyRoster {
    /// All six enemy types
    #[default]
    Full,
    /// Normal, fast, tank and shooter only
    Classic,
}

impl EnemyRoster {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Some(EnemyRoster::Full),
            "classic" => Some(EnemyRoster::Classic),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("arena must be at least {min}x{min}, got {width}x{height}")]
    ArenaTooSmall { width: f32, height: f32, min: f32 },
    #[error("arena dimensions must be finite")]
    NonFiniteArena,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    pub movement: MovementMode,
    pub roster: EnemyRoster,
    pub initial_bombs: u32,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::with_seed(clock_seed())
    }
}

impl GameConfig {
    /// Defaults with a fixed RNG seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            arena_width: DEFAULT_ARENA_WIDTH,
            arena_height: DEFAULT_ARENA_HEIGHT,
            movement: MovementMode::Smooth,
            roster: EnemyRoster::Full,
            initial_bombs: INITIAL_BOMBS,
            seed,
        }
    }

    /// Defaults overridden by environment variables. Bad values are logged and ignored.
    pub fn load_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, "ARENA_WIDTH", |s| s.parse::<f32>().ok()) {
            config.arena_width = v;
        }
        if let Some(v) = parse_var(&lookup, "ARENA_HEIGHT", |s| s.parse::<f32>().ok()) {
            config.arena_height = v;
        }
        if let Some(v) = parse_var(&lookup, "MOVE_MODE", MovementMode::from_str) {
            config.movement = v;
        }
        if let Some(v) = parse_var(&lookup, "ENEMY_ROSTER", EnemyRoster::from_str) {
            config.roster = v;
        }
        if let Some(v) = parse_var(&lookup, "INITIAL_BOMBS", |s| s.parse::<u32>().ok()) {
            config.initial_bombs = v;
        }
        if let Some(v) = parse_var(&lookup, "GAME_SEED", |s| s.parse::<u64>().ok()) {
            config.seed = v;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.arena_width.is_finite() || !self.arena_height.is_finite() {
            return Err(ConfigError::NonFiniteArena);
        }
        if self.arena_width < PLAYER_SIZE || self.arena_height < PLAYER_SIZE {
            return Err(ConfigError::ArenaTooSmall {
                width: self.arena_width,
                height: self.arena_height,
                min: PLAYER_SIZE,
            });
        }
        Ok(())
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let value = parse(raw.trim());
    if value.is_none() {
        log::warn!("Ignoring invalid {}={:?}", key, raw);
    }
    value
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
