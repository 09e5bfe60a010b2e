//! Game state and core simulation types
//!
//! `GameState` is the authoritative store mutated by every simulation step. The
//! renderer never sees it directly; it reads snapshots (see `snapshot`).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{HitShape, Rect};
use super::pool::{Pooled, Pools};
use super::skills::SkillBook;
use super::snapshot::SnapshotBuffer;
use super::timers::TimerQueue;
use crate::audio::SoundEffect;
use crate::config::{EnemyRoster, GameConfig, MovementMode};
use crate::consts::*;

/// Stable identity for pooled entities
pub type EntityId = u32;

/// Monotonic entity ID source (0 is never handed out)
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: EntityId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next = self.next.wrapping_add(1).max(1);
        id
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulated yet
    Start,
    /// Active gameplay
    Playing,
    /// Frozen; the loop keeps ticking so it can resume
    Paused,
    /// Player hp reached zero
    GameOver,
}

/// Arena bounds, (0,0) top-left with y growing downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp a player center so the ship stays fully inside. An arena smaller
    /// than the ship pins it to the far edge instead of panicking.
    pub fn clamp_player(&self, pos: Vec2) -> Vec2 {
        let half = PLAYER_SIZE / 2.0;
        Vec2::new(
            pos.x.max(half).min(self.width - half),
            pos.y.max(half).min(self.height - half),
        )
    }
}

/// Player weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weapon {
    #[default]
    Normal,
    Laser,
    Spread,
}

impl Weapon {
    /// Weapon pickups cycle Normal -> Laser -> Spread -> Normal
    pub fn next(self) -> Self {
        match self {
            Weapon::Normal => Weapon::Laser,
            Weapon::Laser => Weapon::Spread,
            Weapon::Spread => Weapon::Normal,
        }
    }

    /// Minimum time between volleys
    pub fn cadence_ms(self) -> u64 {
        match self {
            Weapon::Laser => LASER_INTERVAL_MS,
            Weapon::Normal | Weapon::Spread => SHOOT_INTERVAL_MS,
        }
    }

    /// Sound played when a volley is fired
    pub fn fire_sound(self) -> SoundEffect {
        match self {
            Weapon::Laser => SoundEffect::Laser,
            Weapon::Normal | Weapon::Spread => SoundEffect::Shoot,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Ship center
    pub pos: Vec2,
    pub hp: f32,
    /// Item-granted shield (0-100)
    pub shield: f32,
    /// Timed bonus shield from the Energy Shield skill
    pub energy_shield: f32,
    /// Weapon intensity tier (1-5)
    pub power: u8,
    pub weapon: Weapon,
    /// Auto Aim skill active
    pub auto_aim: bool,
}

impl Player {
    pub fn new(arena: &Arena) -> Self {
        Self {
            pos: Vec2::new(arena.width / 2.0, arena.height - 100.0),
            hp: PLAYER_MAX_HP,
            shield: 0.0,
            energy_shield: 0.0,
            power: 1,
            weapon: Weapon::Normal,
            auto_aim: false,
        }
    }

    /// Bounding box used for contact and pickups
    pub fn rect(&self) -> Rect {
        Rect::centered(self.pos, PLAYER_SIZE)
    }

    /// Circle used for bullet hits
    pub fn hit_shape(&self) -> HitShape {
        HitShape::Circle {
            center: self.pos,
            radius: PLAYER_SIZE * PLAYER_HIT_RADIUS,
        }
    }

    /// Apply damage: energy shield absorbs first, then the item shield, and only
    /// the overflow reaches hp. Returns the hp actually lost.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let mut remaining = amount.max(0.0);

        let absorbed = remaining.min(self.energy_shield);
        self.energy_shield -= absorbed;
        remaining -= absorbed;

        let absorbed = remaining.min(self.shield);
        self.shield -= absorbed;
        remaining -= absorbed;

        let before = self.hp;
        self.hp = (self.hp - remaining).max(0.0);
        before - self.hp
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }
}

/// How a bullet advances each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BulletMotion {
    /// Straight up at full bullet speed
    Straight,
    /// Heading in radians from straight up (x += sin*speed, y -= cos*speed)
    Angled(f32),
    /// Explicit per-frame velocity
    Velocity(Vec2),
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOrigin {
    Player(Weapon),
    Shooter,
    Bomber,
    Boss,
}

/// A projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    /// Top-left corner
    pub pos: Vec2,
    /// Position before the last advance (None until the first move)
    pub prev_pos: Option<Vec2>,
    pub motion: BulletMotion,
    /// Damage dealt on hit (always positive)
    pub damage: f32,
    pub is_enemy: bool,
    pub is_laser: bool,
    pub size: Vec2,
    pub origin: BulletOrigin,
}

impl Bullet {
    /// Standard 8x20 player bullet
    pub fn player(id: EntityId, pos: Vec2, motion: BulletMotion, weapon: Weapon) -> Self {
        Self {
            id,
            pos,
            prev_pos: None,
            motion,
            damage: 1.0,
            is_enemy: false,
            is_laser: false,
            size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
            origin: BulletOrigin::Player(weapon),
        }
    }

    /// Enemy bullet fired from `center` with explicit velocity
    pub fn enemy(id: EntityId, center: Vec2, vel: Vec2, damage: f32, origin: BulletOrigin) -> Self {
        Self {
            id,
            pos: Vec2::new(center.x - BULLET_WIDTH / 2.0, center.y),
            prev_pos: None,
            motion: BulletMotion::Velocity(vel),
            damage,
            is_enemy: true,
            is_laser: false,
            size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
            origin,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Move one frame, remembering the previous position for swept tests
    pub fn advance(&mut self) {
        let delta = match self.motion {
            BulletMotion::Velocity(v) => v,
            BulletMotion::Angled(angle) => {
                Vec2::new(angle.sin() * BULLET_SPEED, -angle.cos() * BULLET_SPEED)
            }
            BulletMotion::Straight => {
                let speed = if self.is_enemy {
                    BULLET_SPEED * 0.6
                } else {
                    BULLET_SPEED
                };
                Vec2::new(0.0, -speed)
            }
        };
        self.prev_pos = Some(self.pos);
        self.pos += delta;
    }

    /// True once the bullet has fully left the arena. Lasers are long, so they
    /// are only dropped well past either vertical edge.
    pub fn is_off_arena(&self, arena: &Arena) -> bool {
        let Vec2 { x: w, y: h } = self.size;
        if self.is_laser {
            self.pos.y <= -h || self.pos.y >= arena.height + 100.0
        } else {
            self.pos.y <= -h
                || self.pos.y >= arena.height + h
                || self.pos.x <= -w
                || self.pos.x >= arena.width + w
        }
    }
}

impl Pooled for Bullet {
    fn pool_id(&self) -> EntityId {
        self.id
    }
}

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Normal,
    Fast,
    Tank,
    Shooter,
    Bomber,
    Splitter,
}

/// Per-kind stat block derived from the base constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub hp: f32,
    pub speed: f32,
    pub size: f32,
    pub score: u64,
}

impl EnemyKind {
    pub fn stats(self) -> EnemyStats {
        let (hp, speed, size, score) = match self {
            EnemyKind::Normal => (1.0, 1.0, 1.0, 10),
            EnemyKind::Fast => (1.0, 1.5, 0.7, 20),
            EnemyKind::Tank => (5.0, 0.5, 1.3, 50),
            EnemyKind::Shooter => (2.0, 0.7, 1.1, 30),
            EnemyKind::Bomber => (3.0, 0.8, 1.2, 40),
            EnemyKind::Splitter => (2.0, 1.2, 0.9, 25),
        };
        EnemyStats {
            hp,
            speed: ENEMY_SPEED * speed,
            size: ENEMY_SIZE * size,
            score,
        }
    }

    /// Skill points granted when destroyed
    pub fn skill_points(self) -> u32 {
        match self {
            EnemyKind::Tank | EnemyKind::Bomber => 1,
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Normal => "normal",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
            EnemyKind::Shooter => "shooter",
            EnemyKind::Bomber => "bomber",
            EnemyKind::Splitter => "splitter",
        }
    }
}

/// An enemy ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    pub kind: EnemyKind,
    pub hp: f32,
    pub max_hp: f32,
    /// Downward speed per frame
    pub speed: f32,
    pub score: u64,
    /// Timestamp (ms) of the last shot
    pub last_shot: u64,
    /// Bomber already dropped its fan
    #[serde(default)]
    pub has_dropped: bool,
    /// Splitter already spawned fragments
    #[serde(default)]
    pub has_split: bool,
    /// Extra per-frame velocity (split fragments)
    #[serde(default)]
    pub vel: Option<Vec2>,
    /// Speed recorded by Time Slow, restored on revert
    #[serde(skip)]
    pub original_speed: Option<f32>,
}

impl Enemy {
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(self.size),
        }
    }

    /// Bullet hit shape: bombers render as a tall ellipse, everything else as a circle
    pub fn hit_shape(&self) -> HitShape {
        match self.kind {
            EnemyKind::Bomber => HitShape::Ellipse {
                center: self.center(),
                radii: Vec2::new(self.size * BOMBER_RADIUS_X, self.size * BOMBER_RADIUS_Y),
            },
            _ => HitShape::Circle {
                center: self.center(),
                radius: self.size * ENEMY_HIT_RADIUS,
            },
        }
    }

    /// Body contact with the player's bounding box
    pub fn touches(&self, player_box: Rect) -> bool {
        match self.kind {
            EnemyKind::Bomber => self.hit_shape().overlaps_rect(player_box),
            _ => super::geometry::rect_intersect(player_box, self.rect()),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Fully outside the arena (below, or drifted off the sides/top)
    pub fn is_off_arena(&self, arena: &Arena) -> bool {
        self.pos.y >= arena.height + self.size
            || self.pos.y < -2.0 * self.size
            || self.pos.x < -2.0 * self.size
            || self.pos.x > arena.width + self.size
    }
}

impl Pooled for Enemy {
    fn pool_id(&self) -> EntityId {
        self.id
    }
}

/// Boss phase. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossPhase {
    One,
    Two,
}

/// Boss movement pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePattern {
    Horizontal,
    Vertical,
}

/// The stage boss (at most one alive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub score: u64,
    pub phase: BossPhase,
    pub move_pattern: MovePattern,
    pub last_shot: u64,
    pub stage: u32,
    #[serde(skip)]
    pub original_speed: Option<f32>,
}

impl Boss {
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(self.size),
        }
    }

    pub fn hit_shape(&self) -> HitShape {
        HitShape::Circle {
            center: self.center(),
            radius: self.size * BOSS_HIT_RADIUS,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Enter phase two once hp drops to half. Never reverts.
    pub fn update_phase(&mut self) {
        if self.phase == BossPhase::One && self.hp <= self.max_hp * BOSS_PHASE2_HP_RATIO {
            self.phase = BossPhase::Two;
            log::info!("Boss {} entered phase two ({}/{} hp)", self.id, self.hp, self.max_hp);
        }
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Power,
    Bomb,
    Shield,
    Weapon,
}

/// A falling pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    /// Item center
    pub pos: Vec2,
    pub kind: ItemKind,
}

impl Pooled for Item {
    fn pool_id(&self) -> EntityId {
        self.id
    }
}

/// Explosion debris
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: EntityId,
    /// Offset from the explosion origin
    pub offset: Vec2,
    pub vel: Vec2,
    pub life: f32, // 1.0 -> 0.0
    pub size: f32,
    pub color: u32, // 0xRRGGBB
}

impl Particle {
    /// Age one frame
    pub fn age(&mut self) {
        self.offset += self.vel;
        self.life -= PARTICLE_DECAY;
        self.size *= PARTICLE_SHRINK;
    }
}

impl Pooled for Particle {
    fn pool_id(&self) -> EntityId {
        self.id
    }
}

/// A burst of particles around an origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub id: EntityId,
    pub pos: Vec2,
    pub particles: Vec<Particle>,
}

impl Pooled for Explosion {
    fn pool_id(&self) -> EntityId {
        self.id
    }
}

/// Something the host should react to (audio, HUD, logs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
    EnemyKilled { kind: EnemyKind, pos: Vec2, score: u64 },
    BossSpawned { stage: u32 },
    BossDefeated { score: u64 },
    PlayerDamaged { hp_lost: f32 },
    ItemCollected { kind: ItemKind },
    LevelUp { level: u32 },
    StageAdvanced { stage: u32 },
    PlayerChanged,
    GameOver { score: u64 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub rng: Pcg32,
    pub arena: Arena,
    pub movement: MovementMode,
    pub roster: EnemyRoster,
    pub initial_bombs: u32,

    pub phase: GamePhase,
    pub score: u64,
    pub level: u32,
    pub stage: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub bomb_count: u32,
    pub skill_points: u32,

    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub items: Vec<Item>,
    pub explosions: Vec<Explosion>,

    pub pools: Pools,
    pub timers: TimerQueue,
    pub skills: SkillBook,
    pub snapshot: SnapshotBuffer,

    /// Pointer/touch target while the player is steering
    pub move_target: Option<Vec2>,
    pub last_shot: u64,
    pub last_spawn: u64,
    /// Wall-clock time of the most recent step
    pub now: u64,
    /// Steps simulated while playing
    pub frame: u64,
    /// Bumped on every kill; a combo reset only fires if it still matches
    pub combo_generation: u64,
    pub combo_reset_armed: bool,

    /// Events produced since the host last drained them
    pub events: Vec<GameEvent>,
    pub ids: IdAllocator,
}

impl GameState {
    /// Create a session on the title screen
    pub fn new(config: &GameConfig) -> Self {
        let seed = config.seed;
        let arena = Arena::new(config.arena_width, config.arena_height);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            arena,
            movement: config.movement,
            roster: config.roster,
            initial_bombs: config.initial_bombs,
            phase: GamePhase::Start,
            score: 0,
            level: 1,
            stage: 1,
            combo: 0,
            max_combo: 0,
            bomb_count: config.initial_bombs,
            skill_points: 0,
            player: Player::new(&arena),
            bullets: Vec::new(),
            enemies: Vec::new(),
            boss: None,
            items: Vec::new(),
            explosions: Vec::new(),
            pools: Pools::default(),
            timers: TimerQueue::default(),
            skills: SkillBook::default(),
            snapshot: SnapshotBuffer::default(),
            move_target: None,
            last_shot: 0,
            last_spawn: 0,
            now: 0,
            frame: 0,
            combo_generation: 0,
            combo_reset_armed: false,
            events: Vec::new(),
            ids: IdAllocator::default(),
        }
    }

    /// Reset everything for a fresh run and enter Playing
    pub fn start_game(&mut self) {
        self.score = 0;
        self.level = 1;
        self.stage = 1;
        self.combo = 0;
        self.max_combo = 0;
        self.bomb_count = self.initial_bombs;
        self.skill_points = 0;
        self.player = Player::new(&self.arena);
        self.bullets.clear();
        self.enemies.clear();
        self.boss = None;
        self.items.clear();
        self.explosions.clear();
        self.pools.clear();
        // Pending reverts from the previous run must not leak into this one
        self.timers.clear();
        self.skills = SkillBook::default();
        self.snapshot = SnapshotBuffer::default();
        self.move_target = None;
        self.last_shot = 0;
        self.last_spawn = 0;
        self.frame = 0;
        self.combo_generation = 0;
        self.combo_reset_armed = false;
        self.phase = GamePhase::Playing;
        self.push_sound(SoundEffect::Start);
        log::info!("Game started (seed {})", self.seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    pub fn push_sound(&mut self, sound: SoundEffect) {
        self.events.push(GameEvent::Sound(sound));
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Damage the player (shield-first) and handle the game-over transition
    pub fn damage_player(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        let hp_lost = self.player.take_damage(amount);
        self.events.push(GameEvent::PlayerDamaged { hp_lost });
        self.push_sound(SoundEffect::PlayerHit);
        self.check_player_death();
    }

    /// Switch to GameOver once hp is gone
    pub fn check_player_death(&mut self) {
        if self.player.is_dead() && self.phase == GamePhase::Playing {
            self.phase = GamePhase::GameOver;
            self.push_sound(SoundEffect::GameOver);
            self.events.push(GameEvent::GameOver { score: self.score });
            log::info!(
                "Game over: score {}, level {}, max combo {}",
                self.score,
                self.level,
                self.max_combo
            );
        }
    }

    /// Register a kill for combo tracking. Returns the bonus score for this kill.
    pub fn register_kill(&mut self) -> u64 {
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.combo_generation += 1;
        self.combo_reset_armed = false;
        combo_bonus(self.combo)
    }
}

/// Extra score for a kill at the given combo count
pub fn combo_bonus(combo: u32) -> u64 {
    ((combo as f64 + 1.0).ln() * 10.0).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(&GameConfig::with_seed(7))
    }

    #[test]
    fn test_shield_absorbs_first() {
        let mut player = Player::new(&Arena::new(800.0, 600.0));
        player.shield = 30.0;
        let lost = player.take_damage(50.0);
        assert_eq!(player.shield, 0.0);
        assert_eq!(player.hp, 80.0);
        assert_eq!(lost, 20.0);
    }

    #[test]
    fn test_energy_shield_absorbs_before_item_shield() {
        let mut player = Player::new(&Arena::new(800.0, 600.0));
        player.energy_shield = 100.0;
        player.shield = 50.0;
        player.take_damage(120.0);
        assert_eq!(player.energy_shield, 0.0);
        assert_eq!(player.shield, 30.0);
        assert_eq!(player.hp, 100.0);
    }

    #[test]
    fn test_hp_floors_at_zero() {
        let mut player = Player::new(&Arena::new(800.0, 600.0));
        player.take_damage(500.0);
        assert_eq!(player.hp, 0.0);
        assert!(player.is_dead());
    }

    #[test]
    fn test_clamp_player_inside_arena() {
        let arena = Arena::new(800.0, 600.0);
        assert_eq!(
            arena.clamp_player(Vec2::new(-10.0, 900.0)),
            Vec2::new(PLAYER_SIZE / 2.0, 600.0 - PLAYER_SIZE / 2.0)
        );
        assert_eq!(
            arena.clamp_player(Vec2::new(300.0, 200.0)),
            Vec2::new(300.0, 200.0)
        );
    }

    #[test]
    fn test_clamp_player_in_undersized_arena_is_total() {
        let narrow = Arena::new(30.0, 600.0);
        let pos = narrow.clamp_player(Vec2::new(10.0, 300.0));
        assert_eq!(pos, Vec2::new(5.0, 300.0));

        let broken = Arena::new(f32::NAN, f32::NAN);
        let pos = broken.clamp_player(Vec2::new(10.0, 300.0));
        assert_eq!(pos, Vec2::new(PLAYER_SIZE / 2.0, 300.0));
    }

    #[test]
    fn test_weapon_cycle() {
        assert_eq!(Weapon::Normal.next(), Weapon::Laser);
        assert_eq!(Weapon::Laser.next(), Weapon::Spread);
        assert_eq!(Weapon::Spread.next(), Weapon::Normal);
    }

    #[test]
    fn test_enemy_stats_scale_base() {
        let tank = EnemyKind::Tank.stats();
        assert_eq!(tank.hp, 5.0);
        assert!((tank.size - ENEMY_SIZE * 1.3).abs() < 1e-4);
        assert!((tank.speed - ENEMY_SPEED * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_boss_phase_monotonic() {
        let mut boss = crate::sim::factory::create_boss(1, 2, 800.0);
        boss.hp = boss.max_hp * 0.5;
        boss.update_phase();
        assert_eq!(boss.phase, BossPhase::Two);
        boss.hp = boss.max_hp;
        boss.update_phase();
        assert_eq!(boss.phase, BossPhase::Two);
    }

    #[test]
    fn test_start_game_resets() {
        let mut s = state();
        s.score = 1234;
        s.level = 3;
        s.bomb_count = 0;
        s.player.hp = 10.0;
        s.start_game();
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.score, 0);
        assert_eq!(s.level, 1);
        assert_eq!(s.bomb_count, INITIAL_BOMBS);
        assert_eq!(s.player.hp, PLAYER_MAX_HP);
        assert!(s.events.contains(&GameEvent::Sound(SoundEffect::Start)));
    }

    #[test]
    fn test_register_kill_tracks_max_combo() {
        let mut s = state();
        s.register_kill();
        s.register_kill();
        s.combo = 0;
        s.register_kill();
        assert_eq!(s.combo, 1);
        assert_eq!(s.max_combo, 2);
    }

    #[test]
    fn test_combo_bonus() {
        assert_eq!(combo_bonus(0), 0);
        assert_eq!(combo_bonus(1), 6); // ln 2 * 10 = 6.93
        assert_eq!(combo_bonus(9), 23); // ln 10 * 10 = 23.02
    }

    #[test]
    fn test_bullet_off_arena_laser_margin() {
        let arena = Arena::new(800.0, 600.0);
        let mut laser = Bullet::player(1, Vec2::new(100.0, -250.0), BulletMotion::Straight, Weapon::Laser);
        laser.is_laser = true;
        laser.size = Vec2::new(LASER_WIDTH, LASER_HEIGHT);
        assert!(!laser.is_off_arena(&arena));
        laser.pos.y = -300.0;
        assert!(laser.is_off_arena(&arena));
    }
}
