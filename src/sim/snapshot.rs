//! Read-only views published to the renderer
//!
//! The simulation mutates `GameState` every step. The renderer reads a
//! `FrameSnapshot` built from it, and the player's HUD-relevant fields are only
//! republished when they actually change.

use glam::Vec2;
use serde::Serialize;

use super::skills::SkillStatus;
use super::state::{
    Boss, Bullet, Enemy, Explosion, GamePhase, GameState, Item, Player, Weapon,
};

/// Player fields the HUD cares about
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub hp: f32,
    pub shield: f32,
    pub energy_shield: f32,
    pub power: u8,
    pub weapon: Weapon,
    pub auto_aim: bool,
}

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            pos: p.pos,
            hp: p.hp,
            shield: p.shield,
            energy_shield: p.energy_shield,
            power: p.power,
            weapon: p.weapon,
            auto_aim: p.auto_aim,
        }
    }
}

/// Last published player view plus a revision counter
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuffer {
    published: Option<PlayerView>,
    revision: u64,
}

impl SnapshotBuffer {
    /// Publish the player's view if anything changed. Returns true when a new
    /// revision was published.
    pub fn sync_player(&mut self, player: &Player) -> bool {
        let view = PlayerView::from(player);
        if self.published == Some(view) {
            return false;
        }
        self.published = Some(view);
        self.revision += 1;
        true
    }

    pub fn player(&self) -> Option<&PlayerView> {
        self.published.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Everything the renderer needs for one redraw
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub arena: (f32, f32),
    pub player: Option<PlayerView>,
    pub player_revision: u64,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub items: Vec<Item>,
    pub explosions: Vec<Explosion>,
    pub score: u64,
    pub level: u32,
    pub stage: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub bomb_count: u32,
    pub skill_points: u32,
    pub skills: Vec<SkillStatus>,
}

impl FrameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            phase: state.phase,
            arena: (state.arena.width, state.arena.height),
            player: state.snapshot.player().copied(),
            player_revision: state.snapshot.revision(),
            bullets: state.bullets.clone(),
            enemies: state.enemies.clone(),
            boss: state.boss.clone(),
            items: state.items.clone(),
            explosions: state.explosions.clone(),
            score: state.score,
            level: state.level,
            stage: state.stage,
            combo: state.combo,
            max_combo: state.max_combo,
            bomb_count: state.bomb_count,
            skill_points: state.skill_points,
            skills: state.skills.status(state.now),
        }
    }
}
