//! Player skills: point costs, cooldowns, effects and their reverts
//!
//! Timed effects schedule their revert on the timer queue. Reverts are
//! idempotent and only touch entities that still exist, so an enemy that
//! despawned during Time Slow is simply skipped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{GamePhase, GameState};
use super::timers::TimerEvent;
use crate::audio::SoundEffect;

/// Hp removed from every enemy and the boss by Area Damage
pub const AREA_DAMAGE: f32 = 50.0;
/// Bonus shield granted by Energy Shield
pub const ENERGY_SHIELD_AMOUNT: f32 = 100.0;
/// Speed factor applied by Time Slow
pub const TIME_SLOW_FACTOR: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    TimeSlow,
    AreaDamage,
    AutoAim,
    EnergyShield,
}

impl SkillKind {
    pub const ALL: [SkillKind; 4] = [
        SkillKind::TimeSlow,
        SkillKind::AreaDamage,
        SkillKind::AutoAim,
        SkillKind::EnergyShield,
    ];

    fn index(self) -> usize {
        match self {
            SkillKind::TimeSlow => 0,
            SkillKind::AreaDamage => 1,
            SkillKind::AutoAim => 2,
            SkillKind::EnergyShield => 3,
        }
    }

    /// Skill points spent on activation
    pub fn cost(self) -> u32 {
        match self {
            SkillKind::TimeSlow => 3,
            SkillKind::AreaDamage => 5,
            SkillKind::AutoAim => 4,
            SkillKind::EnergyShield => 6,
        }
    }

    pub fn cooldown_ms(self) -> u64 {
        match self {
            SkillKind::TimeSlow => 15_000,
            SkillKind::AreaDamage => 20_000,
            SkillKind::AutoAim => 25_000,
            SkillKind::EnergyShield => 30_000,
        }
    }

    /// How long the effect lasts (None = instant)
    pub fn duration_ms(self) -> Option<u64> {
        match self {
            SkillKind::TimeSlow => Some(3_000),
            SkillKind::AreaDamage => None,
            SkillKind::AutoAim => Some(5_000),
            SkillKind::EnergyShield => Some(8_000),
        }
    }

    fn sound(self) -> SoundEffect {
        match self {
            SkillKind::AreaDamage => SoundEffect::Explosion,
            SkillKind::EnergyShield => SoundEffect::Shield,
            SkillKind::TimeSlow | SkillKind::AutoAim => SoundEffect::PowerUp,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillKind::TimeSlow => "timeSlow",
            SkillKind::AreaDamage => "areaDamage",
            SkillKind::AutoAim => "autoAim",
            SkillKind::EnergyShield => "energyShield",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

/// Why a skill activation was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillError {
    #[error("skills can only be used while playing")]
    NotPlaying,
    #[error("{} is on cooldown for another {remaining_ms}ms", skill.as_str())]
    OnCooldown { skill: SkillKind, remaining_ms: u64 },
    #[error("{} needs {needed} skill points, have {available}", skill.as_str())]
    NotEnoughPoints {
        skill: SkillKind,
        needed: u32,
        available: u32,
    },
}

/// Cooldown state of one skill, as shown on the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkillStatus {
    pub kind: SkillKind,
    pub cost: u32,
    pub remaining_ms: u64,
    /// Remaining cooldown as a fraction of the full cooldown (1.0 = just used)
    pub cooldown_fraction: f32,
}

/// Cooldown bookkeeping for every skill
#[derive(Debug, Clone, Default)]
pub struct SkillBook {
    /// Time each skill becomes available again (0 = never used)
    ready_at: [u64; 4],
}

impl SkillBook {
    pub fn remaining_ms(&self, kind: SkillKind, now: u64) -> u64 {
        self.ready_at[kind.index()].saturating_sub(now)
    }

    pub fn is_ready(&self, kind: SkillKind, now: u64) -> bool {
        self.remaining_ms(kind, now) == 0
    }

    fn start_cooldown(&mut self, kind: SkillKind, now: u64) {
        self.ready_at[kind.index()] = now + kind.cooldown_ms();
    }

    pub fn status(&self, now: u64) -> Vec<SkillStatus> {
        SkillKind::ALL
            .into_iter()
            .map(|kind| {
                let remaining_ms = self.remaining_ms(kind, now);
                SkillStatus {
                    kind,
                    cost: kind.cost(),
                    remaining_ms,
                    cooldown_fraction: remaining_ms as f32 / kind.cooldown_ms() as f32,
                }
            })
            .collect()
    }
}

/// Spend points, start the cooldown, apply the effect and schedule its revert
pub fn activate(state: &mut GameState, kind: SkillKind, now: u64) -> Result<(), SkillError> {
    if state.phase != GamePhase::Playing {
        return Err(SkillError::NotPlaying);
    }
    let remaining_ms = state.skills.remaining_ms(kind, now);
    if remaining_ms > 0 {
        return Err(SkillError::OnCooldown {
            skill: kind,
            remaining_ms,
        });
    }
    if state.skill_points < kind.cost() {
        return Err(SkillError::NotEnoughPoints {
            skill: kind,
            needed: kind.cost(),
            available: state.skill_points,
        });
    }

    state.skill_points -= kind.cost();
    state.skills.start_cooldown(kind, now);

    match kind {
        SkillKind::TimeSlow => {
            for enemy in &mut state.enemies {
                if enemy.original_speed.is_none() {
                    enemy.original_speed = Some(enemy.speed);
                    enemy.speed *= TIME_SLOW_FACTOR;
                }
            }
            if let Some(boss) = state.boss.as_mut() {
                if boss.original_speed.is_none() {
                    boss.original_speed = Some(boss.speed);
                    boss.speed *= TIME_SLOW_FACTOR;
                }
            }
        }
        SkillKind::AreaDamage => {
            // Deaths are picked up by the regular death pass
            for enemy in &mut state.enemies {
                enemy.hp = (enemy.hp - AREA_DAMAGE).max(0.0);
            }
            if let Some(boss) = state.boss.as_mut() {
                boss.hp = (boss.hp - AREA_DAMAGE).max(0.0);
            }
        }
        SkillKind::AutoAim => state.player.auto_aim = true,
        SkillKind::EnergyShield => state.player.energy_shield = ENERGY_SHIELD_AMOUNT,
    }

    if let Some(duration) = kind.duration_ms() {
        let event = match kind {
            SkillKind::TimeSlow => TimerEvent::TimeSlowEnd,
            SkillKind::AutoAim => TimerEvent::AutoAimEnd,
            _ => TimerEvent::EnergyShieldEnd,
        };
        state.timers.schedule(now + duration, event);
    }

    state.push_sound(kind.sound());
    log::debug!(
        "Skill {} activated ({} points left)",
        kind.as_str(),
        state.skill_points
    );
    Ok(())
}

/// Restore every speed recorded by Time Slow
pub fn end_time_slow(state: &mut GameState) {
    for enemy in &mut state.enemies {
        if let Some(speed) = enemy.original_speed.take() {
            enemy.speed = speed;
        }
    }
    if let Some(boss) = state.boss.as_mut() {
        if let Some(speed) = boss.original_speed.take() {
            boss.speed = speed;
        }
    }
    log::debug!("Time slow ended");
}

pub fn end_auto_aim(state: &mut GameState) {
    state.player.auto_aim = false;
    log::debug!("Auto aim ended");
}

/// Drop the energy shield. The item shield is untouched.
pub fn end_energy_shield(state: &mut GameState) {
    state.player.energy_shield = 0.0;
    log::debug!("Energy shield ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::factory::create_enemy;
    use crate::sim::state::EnemyKind;
    use glam::Vec2;

    fn playing() -> GameState {
        let mut s = GameState::new(&GameConfig::with_seed(1));
        s.start_game();
        s.skill_points = 20;
        s
    }

    fn add_enemy(s: &mut GameState, kind: EnemyKind) {
        let e = create_enemy(kind, Vec2::new(100.0, 100.0), &mut s.ids, &mut s.pools.enemies);
        s.enemies.push(e);
    }

    #[test]
    fn test_refused_when_not_playing() {
        let mut s = GameState::new(&GameConfig::with_seed(1));
        s.skill_points = 10;
        assert_eq!(
            activate(&mut s, SkillKind::AutoAim, 0),
            Err(SkillError::NotPlaying)
        );
    }

    #[test]
    fn test_cost_and_cooldown() {
        let mut s = playing();
        activate(&mut s, SkillKind::AutoAim, 1000).unwrap();
        assert_eq!(s.skill_points, 16);
        assert!(s.player.auto_aim);

        let err = activate(&mut s, SkillKind::AutoAim, 2000).unwrap_err();
        assert_eq!(
            err,
            SkillError::OnCooldown {
                skill: SkillKind::AutoAim,
                remaining_ms: 24_000
            }
        );
        // Other skills have independent cooldowns
        activate(&mut s, SkillKind::EnergyShield, 2000).unwrap();
        assert_eq!(s.player.energy_shield, ENERGY_SHIELD_AMOUNT);
    }

    #[test]
    fn test_not_enough_points() {
        let mut s = playing();
        s.skill_points = 2;
        let err = activate(&mut s, SkillKind::TimeSlow, 0).unwrap_err();
        assert!(matches!(err, SkillError::NotEnoughPoints { needed: 3, .. }));
        assert_eq!(s.skill_points, 2);
    }

    #[test]
    fn test_time_slow_restores_only_recorded_speeds() {
        let mut s = playing();
        add_enemy(&mut s, EnemyKind::Normal);
        let base = s.enemies[0].speed;

        activate(&mut s, SkillKind::TimeSlow, 0).unwrap();
        assert_eq!(s.enemies[0].speed, base * 0.5);

        // Spawned during the slow window: unaffected
        add_enemy(&mut s, EnemyKind::Fast);
        let fast = s.enemies[1].speed;

        end_time_slow(&mut s);
        assert_eq!(s.enemies[0].speed, base);
        assert_eq!(s.enemies[1].speed, fast);

        // Second revert is a no-op
        end_time_slow(&mut s);
        assert_eq!(s.enemies[0].speed, base);
    }

    #[test]
    fn test_time_slow_revert_tolerates_despawned_enemies() {
        let mut s = playing();
        add_enemy(&mut s, EnemyKind::Normal);
        activate(&mut s, SkillKind::TimeSlow, 0).unwrap();
        s.enemies.clear();
        end_time_slow(&mut s);
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn test_area_damage_floors_hp() {
        let mut s = playing();
        add_enemy(&mut s, EnemyKind::Tank);
        s.boss = Some(crate::sim::factory::create_boss(99, 2, 800.0));

        activate(&mut s, SkillKind::AreaDamage, 0).unwrap();
        assert_eq!(s.enemies[0].hp, 0.0);
        assert_eq!(s.boss.as_ref().map(|b| b.hp), Some(0.0));
    }

    #[test]
    fn test_timed_skills_schedule_revert() {
        let mut s = playing();
        activate(&mut s, SkillKind::EnergyShield, 100).unwrap();
        assert!(s.timers.drain_due(8099).is_empty());
        assert_eq!(s.timers.drain_due(8100), vec![TimerEvent::EnergyShieldEnd]);
    }

    #[test]
    fn test_energy_shield_end_keeps_item_shield() {
        let mut s = playing();
        s.player.shield = 40.0;
        activate(&mut s, SkillKind::EnergyShield, 0).unwrap();
        end_energy_shield(&mut s);
        assert_eq!(s.player.energy_shield, 0.0);
        assert_eq!(s.player.shield, 40.0);
    }

    #[test]
    fn test_status_reports_cooldowns() {
        let mut s = playing();
        activate(&mut s, SkillKind::TimeSlow, 0).unwrap();
        let status = s.skills.status(7500);
        assert_eq!(status.len(), 4);
        assert_eq!(status[0].remaining_ms, 7500);
        assert!((status[0].cooldown_fraction - 0.5).abs() < 1e-6);
        assert_eq!(status[1].remaining_ms, 0);
    }

    #[test]
    fn test_names_round_trip() {
        for kind in SkillKind::ALL {
            assert_eq!(SkillKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(SkillKind::from_name("teleport"), None);
    }
}
