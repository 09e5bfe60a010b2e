//! Per-frame simulation step
//!
//! Called once per display refresh with the current wall-clock time. Cadences
//! (shooting, spawning, enemy fire, boss attacks, timers) compare against `now`;
//! movement is per frame.

use std::collections::HashSet;

use glam::Vec2;

use super::behavior::{advance_enemy, bomber_drop, boss_attack, move_boss, shooter_fire, split};
use super::collision::{check_boss_collisions, check_enemy_collisions};
use super::factory::{
    Burst, create_boss, create_explosion, create_player_bullets, maybe_drop_item, should_spawn,
    spawn_enemy,
};
use super::skills::{self, SkillKind};
use super::state::{
    Enemy, EnemyKind, EntityId, GameEvent, GamePhase, GameState, ItemKind, Weapon,
};
use super::timers::TimerEvent;
use crate::audio::SoundEffect;
use crate::config::MovementMode;
use crate::consts::*;

/// Commands collected since the previous step
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// New pointer/touch target (player center)
    pub move_target: Option<Vec2>,
    /// Pointer released: stop steering
    pub clear_target: bool,
    /// Detonate a bomb
    pub bomb: bool,
    /// Activate a skill
    pub skill: Option<SkillKind>,
    /// Pause toggle
    pub pause: bool,
    /// Start (or restart) a run
    pub start: bool,
    /// Idle/demo mode - AI steers and bombs
    pub autopilot: bool,
}

/// Advance the game by one frame at wall-clock time `now` (ms)
pub fn tick(state: &mut GameState, input: &TickInput, now: u64) {
    state.now = now;

    if input.start {
        state.start_game();
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    if let Some(target) = input.move_target {
        state.move_target = Some(target);
    }
    if input.clear_target {
        state.move_target = None;
    }

    // Nothing moves outside of play; the host keeps calling so resume works
    if state.phase != GamePhase::Playing {
        return;
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input, now);
        state.move_target = input.move_target;
    }

    run_timers(state, now);

    if let Some(kind) = input.skill {
        if let Err(err) = skills::activate(state, kind, now) {
            log::debug!("Skill refused: {}", err);
        }
    }
    if input.bomb {
        fire_bomb(state, now);
    }

    state.frame += 1;

    move_player(state);
    fire_player_weapon(state, now);

    if should_spawn(now, state.last_spawn, state.level) {
        let enemy = spawn_enemy(
            state.roster,
            &state.arena,
            &mut state.rng,
            &mut state.ids,
            &mut state.pools.enemies,
        );
        state.enemies.push(enemy);
        state.last_spawn = now;
    }

    resolve_boss_collisions(state);
    update_boss(state, now);
    update_enemies(state, now);
    update_bullets(state);

    let kills = resolve_enemy_collisions(state);

    if state.snapshot.sync_player(&state.player) {
        state.events.push(GameEvent::PlayerChanged);
    }

    update_progression(state);
    update_items(state);

    // No kill this frame: start the combo countdown (once)
    if kills == 0 && state.combo > 0 && !state.combo_reset_armed {
        state.combo_reset_armed = true;
        state.timers.schedule(
            now + COMBO_RESET_MS,
            TimerEvent::ComboReset {
                generation: state.combo_generation,
            },
        );
    }

    age_explosions(state);
}

/// Apply every deferred event that has come due
fn run_timers(state: &mut GameState, now: u64) {
    for event in state.timers.drain_due(now) {
        match event {
            TimerEvent::ComboReset { generation } => {
                if generation == state.combo_generation {
                    state.combo = 0;
                    state.combo_reset_armed = false;
                }
            }
            TimerEvent::TimeSlowEnd => skills::end_time_slow(state),
            TimerEvent::AutoAimEnd => skills::end_auto_aim(state),
            TimerEvent::EnergyShieldEnd => skills::end_energy_shield(state),
            TimerEvent::ChainExplosion { pos } => {
                let explosion = create_explosion(
                    pos,
                    Burst::Chain,
                    &mut state.rng,
                    &mut state.ids,
                    &mut state.pools.explosions,
                    &mut state.pools.particles,
                );
                state.explosions.push(explosion);
            }
        }
    }
}

/// Destroy every enemy on screen. Returns false (and changes nothing) when not
/// playing or out of bombs.
pub fn fire_bomb(state: &mut GameState, now: u64) -> bool {
    if state.phase != GamePhase::Playing || state.bomb_count == 0 {
        return false;
    }
    state.bomb_count -= 1;
    state.push_sound(SoundEffect::Bomb);

    let enemies = std::mem::take(&mut state.enemies);
    log::info!("Bomb detonated, {} enemies destroyed", enemies.len());

    for enemy in &enemies {
        state.pools.enemies.release(enemy);
        state.score += enemy.score;

        let center = enemy.center();
        let explosion = create_explosion(
            center,
            Burst::Bomb,
            &mut state.rng,
            &mut state.ids,
            &mut state.pools.explosions,
            &mut state.pools.particles,
        );
        state.explosions.push(explosion);
        state
            .timers
            .schedule(now + CHAIN_EXPLOSION_DELAY_MS, TimerEvent::ChainExplosion { pos: center });
        state.events.push(GameEvent::EnemyKilled {
            kind: enemy.kind,
            pos: center,
            score: enemy.score,
        });
    }
    true
}

/// Steer toward the pointer target: exponential approach or snap, clamped to the arena
fn move_player(state: &mut GameState) {
    let Some(target) = state.move_target else {
        return;
    };
    let current = state.player.pos;
    let desired = match state.movement {
        MovementMode::Smooth => current + (target - current) * MOVE_SMOOTHING,
        MovementMode::Snap => target,
    };
    let next = state.arena.clamp_player(desired);

    if (next.x - current.x).abs() > MOVE_DEADZONE || (next.y - current.y).abs() > MOVE_DEADZONE {
        state.player.pos = next;
    }
}

/// Closest live enemy (or the boss) to the player
fn nearest_target(state: &GameState) -> Option<Vec2> {
    let from = state.player.pos;
    state
        .enemies
        .iter()
        .filter(|e| !e.is_dead())
        .map(Enemy::center)
        .chain(state.boss.iter().filter(|b| !b.is_dead()).map(|b| b.center()))
        .min_by(|a, b| {
            a.distance_squared(from)
                .partial_cmp(&b.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

fn fire_player_weapon(state: &mut GameState, now: u64) {
    let weapon = state.player.weapon;
    if now.saturating_sub(state.last_shot) <= weapon.cadence_ms() {
        return;
    }

    let aim = if state.player.auto_aim && weapon != Weapon::Laser {
        nearest_target(state)
    } else {
        None
    };
    let volley = create_player_bullets(&state.player, aim, &mut state.ids, &mut state.pools.bullets);
    if !volley.is_empty() {
        state.push_sound(weapon.fire_sound());
    }
    state.bullets.extend(volley);
    state.last_shot = now;
}

/// Drop every bullet in `hit` and hand its slot back to the pool
fn remove_bullets(state: &mut GameState, hit: &HashSet<EntityId>) {
    if hit.is_empty() {
        return;
    }
    let pool = &mut state.pools.bullets;
    state.bullets.retain(|b| {
        if hit.contains(&b.id) {
            pool.release(b);
            false
        } else {
            true
        }
    });
}

fn resolve_boss_collisions(state: &mut GameState) {
    let Some(boss) = state.boss.as_ref() else {
        return;
    };
    let report = check_boss_collisions(boss, &state.bullets, &state.player);
    remove_bullets(state, &report.hit_bullets);

    if report.hits > 0 {
        state.push_sound(SoundEffect::Hit);
    }

    let defeated = match state.boss.as_mut() {
        Some(boss) => {
            boss.hp = (boss.hp - report.total_damage).max(0.0);
            boss.is_dead()
        }
        None => false,
    };
    if defeated {
        defeat_boss(state);
    }

    state.damage_player(report.player_damage());
}

fn defeat_boss(state: &mut GameState) {
    let Some(boss) = state.boss.take() else {
        return;
    };
    state.score += boss.score;
    state.skill_points += 5;
    state.push_sound(SoundEffect::Explosion);
    state.events.push(GameEvent::BossDefeated { score: boss.score });

    let explosion = create_explosion(
        boss.center(),
        Burst::Bomb,
        &mut state.rng,
        &mut state.ids,
        &mut state.pools.explosions,
        &mut state.pools.particles,
    );
    state.explosions.push(explosion);
    log::info!("Stage {} boss defeated (+{})", boss.stage, boss.score);
}

fn update_boss(state: &mut GameState, now: u64) {
    let target = state.player.pos;
    let volley = match state.boss.as_mut() {
        Some(boss) if !boss.is_dead() => {
            move_boss(boss, &state.arena, now);
            boss_attack(boss, target, now, &mut state.ids, &mut state.pools.bullets)
        }
        _ => return,
    };
    if !volley.is_empty() {
        state.push_sound(SoundEffect::EnemyShoot);
        state.bullets.extend(volley);
    }
}

fn update_enemies(state: &mut GameState, now: u64) {
    let target = state.player.pos;
    let mut fired = Vec::new();
    let mut shots = 0;

    for enemy in &mut state.enemies {
        advance_enemy(enemy);
        let volley: Vec<_> = match enemy.kind {
            EnemyKind::Shooter => {
                shooter_fire(enemy, target, now, &mut state.ids, &mut state.pools.bullets)
                    .into_iter()
                    .collect()
            }
            EnemyKind::Bomber => {
                bomber_drop(enemy, &state.arena, &mut state.ids, &mut state.pools.bullets)
            }
            _ => Vec::new(),
        };
        if !volley.is_empty() {
            shots += 1;
            fired.extend(volley);
        }
    }

    for _ in 0..shots {
        state.push_sound(SoundEffect::EnemyShoot);
    }
    state.bullets.extend(fired);
}

fn update_bullets(state: &mut GameState) {
    let arena = state.arena;
    let pool = &mut state.pools.bullets;
    state.bullets.retain_mut(|b| {
        b.advance();
        if b.is_off_arena(&arena) {
            pool.release(b);
            false
        } else {
            true
        }
    });
}

/// Run the enemy collision pass and the death pass. Returns the number of kills.
fn resolve_enemy_collisions(state: &mut GameState) -> usize {
    let report = check_enemy_collisions(&state.enemies, &state.bullets, &state.player);
    remove_bullets(state, &report.hit_bullets);

    for enemy in &mut state.enemies {
        if let Some(&hp) = report.enemy_hp.get(&enemy.id) {
            enemy.hp = hp;
        }
        if report.rammed.contains(&enemy.id) {
            enemy.hp = 0.0;
        }
    }
    if report.wounding_hits > 0 {
        state.push_sound(SoundEffect::Hit);
    }

    // Every enemy at zero hp dies here, whatever brought it down
    let mut survivors = Vec::with_capacity(state.enemies.len());
    let mut fragments = Vec::new();
    let mut killed = Vec::new();
    for mut enemy in std::mem::take(&mut state.enemies) {
        if enemy.is_dead() {
            fragments.extend(split(&mut enemy, &mut state.ids, &mut state.pools.enemies));
            state.pools.enemies.release(&enemy);
            killed.push(enemy);
        } else if enemy.is_off_arena(&state.arena) {
            state.pools.enemies.release(&enemy);
        } else {
            survivors.push(enemy);
        }
    }
    survivors.extend(fragments);
    state.enemies = survivors;

    state.damage_player(report.bullet_damage() + report.contact_damage());

    for enemy in &killed {
        award_kill(state, enemy);
    }
    killed.len()
}

/// Score, combo, skill points, item drop and explosion for one destroyed enemy
fn award_kill(state: &mut GameState, enemy: &Enemy) {
    let bonus = state.register_kill();
    let score = enemy.score + bonus;
    state.score += score;
    state.skill_points += enemy.kind.skill_points();

    let center = enemy.center();
    if let Some(item) = maybe_drop_item(
        center,
        &mut state.rng,
        &mut state.ids,
        &mut state.pools.items,
    ) {
        state.items.push(item);
    }

    let explosion = create_explosion(
        center,
        Burst::Kill,
        &mut state.rng,
        &mut state.ids,
        &mut state.pools.explosions,
        &mut state.pools.particles,
    );
    state.explosions.push(explosion);
    state.push_sound(SoundEffect::Explosion);
    state.events.push(GameEvent::EnemyKilled {
        kind: enemy.kind,
        pos: center,
        score,
    });
}

/// Level from score; stage and boss on every fifth level
fn update_progression(state: &mut GameState) {
    let level = (state.score / SCORE_PER_LEVEL) as u32 + 1;
    if level > state.level {
        state.level = level;
        state.events.push(GameEvent::LevelUp { level });
        log::info!("Level {} (score {})", level, state.score);
    }

    let stage = (state.level - 1) / LEVELS_PER_STAGE + 1;
    if stage > state.stage && state.level % LEVELS_PER_STAGE == 0 {
        state.stage = stage;
        state.events.push(GameEvent::StageAdvanced { stage });
        log::info!("Stage {}", stage);

        if state.boss.is_none() {
            let id = state.next_entity_id();
            state.boss = Some(create_boss(id, stage, state.arena.width));
            state.push_sound(SoundEffect::Start);
            state.events.push(GameEvent::BossSpawned { stage });
            log::info!("Stage {} boss incoming", stage);
        }
    }
}

fn update_items(state: &mut GameState) {
    let arena = state.arena;
    let player = state.player.pos;
    let pool = &mut state.pools.items;
    let mut collected = Vec::new();

    state.items.retain_mut(|item| {
        item.pos.y += ITEM_FALL_SPEED;
        let picked = (item.pos.x - player.x).abs() < PLAYER_SIZE
            && (item.pos.y - player.y).abs() < PLAYER_SIZE;
        if picked {
            collected.push(item.kind);
        }
        if picked || item.pos.y >= arena.height {
            pool.release(item);
            false
        } else {
            true
        }
    });

    for kind in collected {
        apply_item(state, kind);
    }
}

fn apply_item(state: &mut GameState, kind: ItemKind) {
    let player = &mut state.player;
    let sound = match kind {
        ItemKind::Power => {
            player.power = (player.power + 1).min(MAX_POWER);
            SoundEffect::PowerUp
        }
        ItemKind::Bomb => {
            state.bomb_count += 1;
            SoundEffect::BombItem
        }
        ItemKind::Shield => {
            player.shield = (player.shield + SHIELD_ITEM_BONUS).min(SHIELD_MAX);
            SoundEffect::Shield
        }
        ItemKind::Weapon => {
            player.weapon = player.weapon.next();
            player.power = 1;
            SoundEffect::PowerUp
        }
    };
    state.push_sound(sound);
    state.events.push(GameEvent::ItemCollected { kind });
}

fn age_explosions(state: &mut GameState) {
    let particles = &mut state.pools.particles;
    let explosions = &mut state.pools.explosions;

    state.explosions.retain_mut(|explosion| {
        explosion.particles.retain_mut(|p| {
            p.age();
            if p.life <= 0.0 {
                particles.release(p);
                false
            } else {
                true
            }
        });
        if explosion.particles.is_empty() {
            explosions.release(explosion);
            false
        } else {
            true
        }
    });
}

/// Demo play: hover under the nearest threat, pick up items when nothing is
/// close, bomb when swarmed and shield up when hurt.
fn autopilot(state: &GameState, input: &mut TickInput, now: u64) {
    let cruise_y = state.arena.height - 100.0;
    let player = state.player.pos;

    let threat = nearest_target(state);
    let item = state
        .items
        .iter()
        .map(|i| i.pos)
        .min_by(|a, b| {
            a.distance_squared(player)
                .partial_cmp(&b.distance_squared(player))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let target_x = match (threat, item) {
        (Some(t), Some(i)) if t.distance(player) > 250.0 => i.x,
        (Some(t), _) => t.x,
        (None, Some(i)) => i.x,
        (None, None) => state.arena.width / 2.0,
    };

    // Weave a little so the ship doesn't sit still under fire
    let weave = ((now as f64 / 700.0).sin() * 40.0) as f32;
    input.move_target = Some(Vec2::new(target_x + weave, cruise_y));

    if state.bomb_count > 0 && state.enemies.len() >= 12 {
        input.bomb = true;
    }

    let shield = SkillKind::EnergyShield;
    if input.skill.is_none()
        && state.player.hp < PLAYER_MAX_HP / 2.0
        && state.skill_points >= shield.cost()
        && state.skills.is_ready(shield, now)
    {
        input.skill = Some(shield);
    }
}
