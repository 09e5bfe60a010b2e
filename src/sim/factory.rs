//! Entity construction: player volleys, enemy spawns, bosses, pickups, explosions

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::pool::Pool;
use super::state::{
    Arena, Boss, BossPhase, Bullet, BulletMotion, Enemy, EnemyKind, EntityId, Explosion,
    IdAllocator, Item, ItemKind, MovePattern, Particle, Player, Weapon,
};
use crate::config::EnemyRoster;
use crate::consts::*;

/// Table of (variant, weight) pairs sampled by cumulative weight
#[derive(Debug, Clone, Copy)]
pub struct WeightedTable<T: 'static> {
    entries: &'static [(T, f64)],
}

impl<T: Copy> WeightedTable<T> {
    pub const fn new(entries: &'static [(T, f64)]) -> Self {
        Self { entries }
    }

    /// Pick by a roll in [0, 1). Rolls past the total weight fall back to the
    /// first entry.
    pub fn pick(&self, roll: f64) -> T {
        let mut cumulative = 0.0;
        for &(value, weight) in self.entries {
            cumulative += weight;
            if roll < cumulative {
                return value;
            }
        }
        self.entries[0].0
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.pick(rng.random::<f64>())
    }
}

pub const FULL_ROSTER: WeightedTable<EnemyKind> = WeightedTable::new(&[
    (EnemyKind::Normal, 0.4),
    (EnemyKind::Fast, 0.2),
    (EnemyKind::Tank, 0.12),
    (EnemyKind::Shooter, 0.08),
    (EnemyKind::Bomber, 0.12),
    (EnemyKind::Splitter, 0.08),
]);

pub const CLASSIC_ROSTER: WeightedTable<EnemyKind> = WeightedTable::new(&[
    (EnemyKind::Normal, 0.5),
    (EnemyKind::Fast, 0.25),
    (EnemyKind::Tank, 0.15),
    (EnemyKind::Shooter, 0.1),
]);

pub const ITEM_TABLE: WeightedTable<ItemKind> = WeightedTable::new(&[
    (ItemKind::Power, 0.35),
    (ItemKind::Bomb, 0.25),
    (ItemKind::Shield, 0.25),
    (ItemKind::Weapon, 0.15),
]);

impl EnemyRoster {
    pub fn table(self) -> WeightedTable<EnemyKind> {
        match self {
            EnemyRoster::Full => FULL_ROSTER,
            EnemyRoster::Classic => CLASSIC_ROSTER,
        }
    }
}

// --- Player volleys ---

/// Spread volley headings (radians from straight up), innermost pair first
const SPREAD_ANGLES: [f32; 2] = [0.2, 0.4];

/// Build this tick's volley for the player's weapon and power tier.
///
/// With `aim_at` set (Auto Aim), regular bullets fly toward that point instead of
/// their default heading. Lasers are never redirected.
pub fn create_player_bullets(
    player: &Player,
    aim_at: Option<Vec2>,
    ids: &mut IdAllocator,
    pool: &mut Pool<Bullet>,
) -> Vec<Bullet> {
    let weapon = player.weapon;
    let muzzle_y = player.pos.y - BULLET_HEIGHT;
    let mut volley = Vec::new();

    let mut fire = |x_offset: f32, motion: BulletMotion| {
        let id = ids.next_id();
        let pos = Vec2::new(player.pos.x - BULLET_WIDTH / 2.0 + x_offset, muzzle_y);
        let from = pos + Vec2::new(BULLET_WIDTH, BULLET_HEIGHT) / 2.0;
        let motion = match aim_at.and_then(|target| aim_heading(from, target)) {
            // Spread bullets keep their fan around the aimed heading
            Some(dir) => {
                let offset = match motion {
                    BulletMotion::Angled(angle) => angle,
                    _ => 0.0,
                };
                BulletMotion::Velocity(Vec2::from_angle(offset).rotate(dir) * BULLET_SPEED)
            }
            None => motion,
        };
        volley.push(pool.get(|| Bullet::player(id, pos, motion, weapon)));
    };

    match weapon {
        Weapon::Normal => {
            let offsets: &[f32] = match player.power {
                0 | 1 => &[0.0],
                2 => &[-BULLET_WIDTH, BULLET_WIDTH],
                _ => &[-BULLET_WIDTH * 1.5, 0.0, BULLET_WIDTH * 1.5],
            };
            for &dx in offsets {
                fire(dx, BulletMotion::Straight);
            }
        }
        Weapon::Spread => {
            fire(0.0, BulletMotion::Angled(0.0));
            let pairs = (player.power as usize).min(SPREAD_ANGLES.len());
            for &angle in &SPREAD_ANGLES[..pairs] {
                fire(0.0, BulletMotion::Angled(-angle));
                fire(0.0, BulletMotion::Angled(angle));
            }
        }
        Weapon::Laser => {
            let id = ids.next_id();
            let pos = Vec2::new(player.pos.x - LASER_WIDTH / 2.0, player.pos.y - LASER_HEIGHT);
            let damage = player.power.max(1) as f32;
            volley.push(pool.get(|| Bullet {
                damage,
                is_laser: true,
                size: Vec2::new(LASER_WIDTH, LASER_HEIGHT),
                ..Bullet::player(id, pos, BulletMotion::Straight, Weapon::Laser)
            }));
        }
    }

    volley
}

/// Unit heading from `from` toward `target`, or None when they coincide
fn aim_heading(from: Vec2, target: Vec2) -> Option<Vec2> {
    let delta = target - from;
    let dist = delta.length();
    (dist >= AIM_EPSILON).then(|| delta / dist)
}

// --- Enemies ---

/// Spawn interval for a level: 1200ms shrinking 100ms per level, floored at 500ms
pub fn spawn_interval_ms(level: u32) -> u64 {
    SPAWN_INTERVAL_MS
        .saturating_sub(level as u64 * SPAWN_SPEEDUP_PER_LEVEL_MS)
        .max(MIN_SPAWN_INTERVAL_MS)
}

/// Whether the spawn timer has elapsed
pub fn should_spawn(now: u64, last_spawn: u64, level: u32) -> bool {
    now.saturating_sub(last_spawn) > spawn_interval_ms(level)
}

/// Build an enemy of `kind` with its top-left corner at `pos`
pub fn create_enemy(
    kind: EnemyKind,
    pos: Vec2,
    ids: &mut IdAllocator,
    pool: &mut Pool<Enemy>,
) -> Enemy {
    let stats = kind.stats();
    let id = ids.next_id();
    pool.get(|| Enemy {
        id,
        pos,
        size: stats.size,
        kind,
        hp: stats.hp,
        max_hp: stats.hp,
        speed: stats.speed,
        score: stats.score,
        last_shot: 0,
        has_dropped: false,
        has_split: false,
        vel: None,
        original_speed: None,
    })
}

/// Spawn a random enemy just above the arena at a random column
pub fn spawn_enemy<R: Rng + ?Sized>(
    roster: EnemyRoster,
    arena: &Arena,
    rng: &mut R,
    ids: &mut IdAllocator,
    pool: &mut Pool<Enemy>,
) -> Enemy {
    let kind = roster.table().sample(rng);
    let size = kind.stats().size;
    let max_x = (arena.width - size).max(0.0);
    let x = rng.random::<f32>() * max_x;
    create_enemy(kind, Vec2::new(x, -size), ids, pool)
}

// --- Boss ---

/// Boss for `stage`: 3x enemy size, 20 hp plus 10 per stage past the first,
/// centered horizontally just above the arena.
pub fn create_boss(id: EntityId, stage: u32, arena_width: f32) -> Boss {
    let size = ENEMY_SIZE * 3.0;
    let hp = 20.0 + (stage.max(1) - 1) as f32 * 10.0;
    Boss {
        id,
        pos: Vec2::new(arena_width / 2.0 - size / 2.0, -size),
        size,
        hp,
        max_hp: hp,
        speed: ENEMY_SPEED * 0.3,
        score: (hp * 10.0) as u64,
        phase: BossPhase::One,
        move_pattern: MovePattern::Horizontal,
        last_shot: 0,
        stage,
        original_speed: None,
    }
}

// --- Items ---

pub fn random_item_type<R: Rng + ?Sized>(rng: &mut R) -> ItemKind {
    ITEM_TABLE.sample(rng)
}

/// Roll the drop chance; on success build a random pickup centered at `pos`
pub fn maybe_drop_item<R: Rng + ?Sized>(
    pos: Vec2,
    rng: &mut R,
    ids: &mut IdAllocator,
    pool: &mut Pool<Item>,
) -> Option<Item> {
    if !rng.random_bool(ITEM_DROP_CHANCE) {
        return None;
    }
    let kind = random_item_type(rng);
    let id = ids.next_id();
    Some(pool.get(|| Item { id, pos, kind }))
}

// --- Explosions ---

/// Particle burst flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Burst {
    /// Regular enemy death
    Kill,
    /// Bomb detonation (bigger, faster)
    Bomb,
    /// Secondary flash after a bomb
    Chain,
}

impl Burst {
    fn count(self) -> usize {
        match self {
            Burst::Kill => EXPLOSION_PARTICLES,
            Burst::Bomb => BOMB_EXPLOSION_PARTICLES,
            Burst::Chain => CHAIN_EXPLOSION_PARTICLES,
        }
    }

    /// (min speed, speed spread, min size, size spread)
    fn ranges(self) -> (f32, f32, f32, f32) {
        match self {
            Burst::Kill => (2.0, 4.0, 3.0, 6.0),
            Burst::Bomb => (2.0, 5.0, 4.0, 8.0),
            Burst::Chain => (1.0, 3.0, 2.0, 4.0),
        }
    }

    fn palette(self) -> &'static [u32] {
        match self {
            Burst::Kill => &[0xff6b6b, 0xffd93d, 0xff8800],
            Burst::Bomb | Burst::Chain => &[0xff6b6b, 0xffd93d, 0xff8800, 0xff0000],
        }
    }
}

/// Build an explosion at `pos` with randomly scattered particles
pub fn create_explosion<R: Rng + ?Sized>(
    pos: Vec2,
    burst: Burst,
    rng: &mut R,
    ids: &mut IdAllocator,
    explosions: &mut Pool<Explosion>,
    particles: &mut Pool<Particle>,
) -> Explosion {
    let (min_speed, speed_spread, min_size, size_spread) = burst.ranges();
    let palette = burst.palette();

    let burst_particles = (0..burst.count())
        .map(|_| {
            let angle = rng.random::<f32>() * TAU;
            let speed = rng.random::<f32>() * speed_spread + min_speed;
            let size = rng.random::<f32>() * size_spread + min_size;
            let color = palette[rng.random_range(0..palette.len())];
            let id = ids.next_id();
            particles.get(|| Particle {
                id,
                offset: Vec2::ZERO,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: 1.0,
                size,
                color,
            })
        })
        .collect();

    let id = ids.next_id();
    explosions.get(|| Explosion {
        id,
        pos,
        particles: burst_particles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pool::PoolKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn bullets_for(weapon: Weapon, power: u8) -> Vec<Bullet> {
        let mut player = Player::new(&Arena::new(800.0, 600.0));
        player.weapon = weapon;
        player.power = power;
        let mut ids = IdAllocator::default();
        let mut pool = Pool::with_capacity(PoolKind::Bullets, 8);
        create_player_bullets(&player, None, &mut ids, &mut pool)
    }

    fn center_x(b: &Bullet) -> f32 {
        b.pos.x + b.size.x / 2.0
    }

    #[test]
    fn test_normal_volley_counts() {
        assert_eq!(bullets_for(Weapon::Normal, 1).len(), 1);
        assert_eq!(bullets_for(Weapon::Normal, 2).len(), 2);
        assert_eq!(bullets_for(Weapon::Normal, 3).len(), 3);
        assert_eq!(bullets_for(Weapon::Normal, 5).len(), 3);
    }

    #[test]
    fn test_normal_volley_symmetric() {
        let volley = bullets_for(Weapon::Normal, 2);
        let sum: f32 = volley.iter().map(|b| center_x(b) - 400.0).sum();
        assert!(sum.abs() < 1e-4);
        assert!(volley.iter().all(|b| b.motion == BulletMotion::Straight));
    }

    #[test]
    fn test_laser_volley() {
        let volley = bullets_for(Weapon::Laser, 4);
        assert_eq!(volley.len(), 1);
        let laser = &volley[0];
        assert!(laser.is_laser);
        assert_eq!(laser.size, Vec2::new(4.0, 300.0));
        assert_eq!(laser.damage, 4.0);
        assert!((center_x(laser) - 400.0).abs() < 1e-4);
    }

    #[test]
    fn test_spread_volley() {
        assert_eq!(bullets_for(Weapon::Spread, 1).len(), 3);
        let volley = bullets_for(Weapon::Spread, 3);
        assert_eq!(volley.len(), 5);
        let angles: Vec<f32> = volley
            .iter()
            .map(|b| match b.motion {
                BulletMotion::Angled(a) => a,
                _ => panic!("spread bullets move by angle"),
            })
            .collect();
        assert!(angles.iter().sum::<f32>().abs() < 1e-5);
        assert!(angles.iter().all(|a| a.abs() <= 0.4 + 1e-6));
    }

    #[test]
    fn test_auto_aim_redirects_regular_bullets() {
        let mut player = Player::new(&Arena::new(800.0, 600.0));
        player.auto_aim = true;
        let mut ids = IdAllocator::default();
        let mut pool = Pool::with_capacity(PoolKind::Bullets, 8);
        let target = Vec2::new(100.0, 100.0);
        let volley = create_player_bullets(&player, Some(target), &mut ids, &mut pool);
        match volley[0].motion {
            BulletMotion::Velocity(v) => {
                assert!(v.x < 0.0 && v.y < 0.0);
                assert!((v.length() - BULLET_SPEED).abs() < 1e-3);
            }
            other => panic!("expected aimed velocity, got {:?}", other),
        }
    }

    #[test]
    fn test_auto_aim_on_muzzle_keeps_firing_up() {
        let player = Player::new(&Arena::new(800.0, 600.0));
        let mut ids = IdAllocator::default();
        let mut pool = Pool::with_capacity(PoolKind::Bullets, 8);
        // Exactly the single bullet's center
        let muzzle = Vec2::new(player.pos.x, player.pos.y - BULLET_HEIGHT / 2.0);
        let volley = create_player_bullets(&player, Some(muzzle), &mut ids, &mut pool);
        assert_eq!(volley.len(), 1);
        assert_eq!(volley[0].motion, BulletMotion::Straight);
    }

    #[test]
    fn test_auto_aim_keeps_spread_fan() {
        let mut player = Player::new(&Arena::new(800.0, 600.0));
        player.weapon = Weapon::Spread;
        player.power = 3;
        let mut ids = IdAllocator::default();
        let mut pool = Pool::with_capacity(PoolKind::Bullets, 8);
        // Straight above: the aimed fan matches the unaimed one
        let target = Vec2::new(player.pos.x, 0.0);
        let volley = create_player_bullets(&player, Some(target), &mut ids, &mut pool);
        assert_eq!(volley.len(), 5);

        let mut xs: Vec<f32> = volley
            .iter()
            .map(|b| match b.motion {
                BulletMotion::Velocity(v) => {
                    assert!((v.length() - BULLET_SPEED).abs() < 1e-3);
                    assert!(v.y < 0.0);
                    v.x
                }
                other => panic!("expected aimed velocity, got {:?}", other),
            })
            .collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected = [-0.4f32, -0.2, 0.0, 0.2, 0.4].map(|a| a.sin() * BULLET_SPEED);
        for (x, want) in xs.iter().zip(expected) {
            assert!((x - want).abs() < 1e-3, "{} vs {}", x, want);
        }
    }

    #[test]
    fn test_spawn_interval_scales_with_level() {
        assert_eq!(spawn_interval_ms(1), 1100);
        assert_eq!(spawn_interval_ms(5), 700);
        assert_eq!(spawn_interval_ms(7), 500);
        assert_eq!(spawn_interval_ms(50), 500);
    }

    #[test]
    fn test_weighted_pick_boundaries() {
        assert_eq!(FULL_ROSTER.pick(0.0), EnemyKind::Normal);
        assert_eq!(FULL_ROSTER.pick(0.39), EnemyKind::Normal);
        assert_eq!(FULL_ROSTER.pick(0.41), EnemyKind::Fast);
        assert_eq!(FULL_ROSTER.pick(0.95), EnemyKind::Splitter);
        assert_eq!(ITEM_TABLE.pick(0.9), ItemKind::Weapon);
        assert_eq!(ITEM_TABLE.pick(1.5), ItemKind::Power);
        assert_eq!(CLASSIC_ROSTER.pick(0.95), EnemyKind::Shooter);
    }

    #[test]
    fn test_classic_roster_never_spawns_new_kinds() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            let kind = CLASSIC_ROSTER.sample(&mut rng);
            assert!(!matches!(kind, EnemyKind::Bomber | EnemyKind::Splitter));
        }
    }

    #[test]
    fn test_spawned_enemy_starts_above_arena() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut ids = IdAllocator::default();
        let mut pool = Pool::with_capacity(PoolKind::Enemies, 4);
        let arena = Arena::new(800.0, 600.0);
        for _ in 0..20 {
            let e = spawn_enemy(EnemyRoster::Full, &arena, &mut rng, &mut ids, &mut pool);
            assert_eq!(e.pos.y, -e.size);
            assert!(e.pos.x >= 0.0 && e.pos.x + e.size <= 800.0);
            assert_eq!(e.hp, e.max_hp);
        }
    }

    #[test]
    fn test_boss_config() {
        let boss = create_boss(1, 3, 800.0);
        assert_eq!(boss.size, ENEMY_SIZE * 3.0);
        assert_eq!(boss.hp, 40.0);
        assert_eq!(boss.score, 400);
        assert!((boss.speed - 0.9).abs() < 1e-5);
        assert_eq!(boss.phase, BossPhase::One);
        assert_eq!(boss.move_pattern, MovePattern::Horizontal);
        assert!((boss.center().x - 400.0).abs() < 1e-4);
    }

    #[test]
    fn test_explosion_particles() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = IdAllocator::default();
        let mut explosions = Pool::with_capacity(PoolKind::Explosions, 2);
        let mut particles = Pool::with_capacity(PoolKind::Particles, 4);
        let e = create_explosion(
            Vec2::new(10.0, 10.0),
            Burst::Kill,
            &mut rng,
            &mut ids,
            &mut explosions,
            &mut particles,
        );
        assert_eq!(e.particles.len(), EXPLOSION_PARTICLES);
        assert_eq!(particles.in_use(), EXPLOSION_PARTICLES);
        assert!(e.particles.iter().all(|p| p.life == 1.0 && p.size >= 3.0));
    }
}
