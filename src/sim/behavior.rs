//! Per-kind enemy behavior and the boss state machine
//!
//! Each function works on one entity plus the pieces of state it needs, and
//! returns whatever it spawned. The caller appends the results and plays sounds.

use std::f32::consts::{FRAC_PI_6, PI, TAU};

use glam::Vec2;

use super::pool::Pool;
use super::state::{
    Arena, Boss, BossPhase, Bullet, BulletOrigin, Enemy, EnemyKind, IdAllocator, MovePattern,
};
use crate::consts::*;
use crate::{aim_direction, polar_velocity};

/// Bomber drops its fan once it passes this fraction of the arena height
const BOMBER_TRIGGER_RATIO: f32 = 0.3;
/// Angle between bomber fan bullets (radians)
const BOMBER_FAN_STEP: f32 = 0.3;
/// Angle between phase-one boss cone bullets (radians)
const BOSS_CONE_STEP: f32 = 0.2;

/// Move an enemy one frame: fall at its own speed, then add any extra velocity
pub fn advance_enemy(enemy: &mut Enemy) {
    enemy.pos.y += enemy.speed;
    if let Some(vel) = enemy.vel {
        enemy.pos += vel;
    }
}

/// Shooter: one aimed bullet every two seconds
pub fn shooter_fire(
    enemy: &mut Enemy,
    target: Vec2,
    now: u64,
    ids: &mut IdAllocator,
    pool: &mut Pool<Bullet>,
) -> Option<Bullet> {
    if enemy.kind != EnemyKind::Shooter || now.saturating_sub(enemy.last_shot) <= SHOOTER_INTERVAL_MS {
        return None;
    }
    enemy.last_shot = now;

    let center = enemy.center();
    let vel = aim_direction(center, target) * BULLET_SPEED * 0.6;
    let id = ids.next_id();
    Some(pool.get(|| Bullet::enemy(id, center, vel, 1.0, BulletOrigin::Shooter)))
}

/// Bomber: a single three-bullet fan straight down once it crosses 30% of the arena
pub fn bomber_drop(
    enemy: &mut Enemy,
    arena: &Arena,
    ids: &mut IdAllocator,
    pool: &mut Pool<Bullet>,
) -> Vec<Bullet> {
    if enemy.kind != EnemyKind::Bomber
        || enemy.has_dropped
        || enemy.pos.y <= arena.height * BOMBER_TRIGGER_RATIO
    {
        return Vec::new();
    }
    enemy.has_dropped = true;

    let center = enemy.center();
    let speed = BULLET_SPEED * 0.8;
    (-1..=1)
        .map(|i| {
            // Heading measured from straight down
            let angle = i as f32 * BOMBER_FAN_STEP;
            let vel = Vec2::new(angle.sin(), angle.cos()) * speed;
            let id = ids.next_id();
            pool.get(|| Bullet::enemy(id, center, vel, 2.0, BulletOrigin::Bomber))
        })
        .collect()
}

/// Splitter: on death, break into three fast fragments radiating 120 degrees apart.
///
/// Only fires once per splitter; a second call on the same enemy returns nothing.
pub fn split(enemy: &mut Enemy, ids: &mut IdAllocator, pool: &mut Pool<Enemy>) -> Vec<Enemy> {
    if enemy.kind != EnemyKind::Splitter || !enemy.is_dead() || enemy.has_split {
        return Vec::new();
    }
    enemy.has_split = true;

    let origin = enemy.center();
    let speed = ENEMY_SPEED * 1.8;
    (0..3)
        .map(|i| {
            let angle = i as f32 * TAU / 3.0 + FRAC_PI_6;
            let id = ids.next_id();
            pool.get(|| Enemy {
                id,
                pos: origin,
                size: ENEMY_SIZE * 0.5,
                kind: EnemyKind::Fast,
                hp: 1.0,
                max_hp: 1.0,
                speed: ENEMY_SPEED * 1.5,
                score: 15,
                last_shot: 0,
                has_dropped: false,
                has_split: false,
                vel: Some(polar_velocity(angle, speed)),
                original_speed: None,
            })
        })
        .collect()
}

/// Boss movement for one frame.
///
/// The boss always sinks by its speed. Horizontal drift flips to vertical at
/// either side wall, vertical bobbing flips back at the top bound or the hover
/// line. The boss never leaves the arena sideways and never sinks past the hover
/// line (40% of the arena height).
pub fn move_boss(boss: &mut Boss, arena: &Arena, now: u64) {
    let t = now as f64;
    let hover_line = arena.height * BOSS_HOVER_RATIO;
    let max_x = (arena.width - boss.size).max(0.0);

    boss.pos.y += boss.speed;

    match boss.move_pattern {
        MovePattern::Horizontal => {
            boss.pos.x += ((t / 1000.0).sin() * 3.0) as f32;
            if boss.pos.x <= 0.0 || boss.pos.x >= max_x {
                boss.move_pattern = MovePattern::Vertical;
            }
        }
        MovePattern::Vertical => {
            boss.pos.y += ((t / 800.0).sin() * 2.0) as f32;
            if boss.pos.y <= BOSS_TOP_BOUND || boss.pos.y >= hover_line {
                boss.move_pattern = MovePattern::Horizontal;
            }
        }
    }

    boss.pos.x = boss.pos.x.min(max_x).max(0.0);
    boss.pos.y = boss.pos.y.min(hover_line);
}

/// Boss attack on a fixed one-second cadence.
///
/// Phase one fires a three-bullet cone at the player, phase two a radial ring of
/// eight. The phase check runs after each volley.
pub fn boss_attack(
    boss: &mut Boss,
    target: Vec2,
    now: u64,
    ids: &mut IdAllocator,
    pool: &mut Pool<Bullet>,
) -> Vec<Bullet> {
    if now.saturating_sub(boss.last_shot) <= BOSS_SHOOT_INTERVAL_MS {
        return Vec::new();
    }

    let center = boss.center();
    let mut volley = Vec::new();
    match boss.phase {
        BossPhase::One => {
            let aim = aim_direction(center, target);
            let base = aim.y.atan2(aim.x);
            let half = BOSS_PHASE1_BULLETS / 2;
            for i in -half..=half {
                let vel = polar_velocity(base + i as f32 * BOSS_CONE_STEP, BULLET_SPEED * 0.7);
                let id = ids.next_id();
                volley.push(pool.get(|| Bullet::enemy(id, center, vel, 3.0, BulletOrigin::Boss)));
            }
        }
        BossPhase::Two => {
            for i in 0..BOSS_PHASE2_BULLETS {
                let angle = i as f32 * 2.0 * PI / BOSS_PHASE2_BULLETS as f32;
                let vel = polar_velocity(angle, BULLET_SPEED * 0.6);
                let id = ids.next_id();
                volley.push(pool.get(|| Bullet::enemy(id, center, vel, 2.0, BulletOrigin::Boss)));
            }
        }
    }

    boss.last_shot = now;
    boss.update_phase();
    volley
}
