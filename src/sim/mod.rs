//! Per-frame simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform code:
//! - Wall-clock `now` passed in by the caller, never read from the OS
//! - Seeded RNG only
//! - Deferred effects go through the timer queue, drained at the start of a step

pub mod behavior;
pub mod collision;
pub mod factory;
pub mod geometry;
pub mod pool;
pub mod skills;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{BossReport, CollisionReport, check_boss_collisions, check_enemy_collisions};
pub use factory::{WeightedTable, create_boss, create_player_bullets, random_item_type};
pub use geometry::{HitShape, Rect};
pub use pool::{Pool, PoolKind, Pooled, Pools};
pub use skills::{SkillError, SkillKind, SkillStatus};
pub use snapshot::{FrameSnapshot, PlayerView};
pub use state::{
    Arena, Boss, BossPhase, Bullet, BulletMotion, BulletOrigin, Enemy, EnemyKind, EntityId,
    Explosion, GameEvent, GamePhase, GameState, Item, ItemKind, MovePattern, Particle, Player,
    Weapon,
};
pub use tick::{TickInput, fire_bomb, tick};
pub use timers::{TimerEvent, TimerQueue};
