//! Collision detection for bullets, enemies, the boss and the player
//!
//! Both passes are read-only: they report what hit what and leave the caller to
//! apply damage, award score and remove entities. That keeps a frame's hit
//! resolution independent of the order the results get applied in.

use std::collections::{HashMap, HashSet};

use super::state::{Boss, Bullet, BulletOrigin, Enemy, EntityId, Player};
use crate::consts::*;

/// Outcome of the enemy pass
#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    /// Bullets consumed this frame (player and enemy)
    pub hit_bullets: HashSet<EntityId>,
    /// Pending hp per enemy after this frame's bullet hits
    pub enemy_hp: HashMap<EntityId, f32>,
    /// Enemies killed this frame, in detection order, each listed once
    pub dead: Vec<EntityId>,
    /// Subset of `dead` that died by ramming the player
    pub rammed: Vec<EntityId>,
    /// Enemy bullets that struck the player
    pub enemy_bullet_hits: u32,
    /// Non-lethal player bullet hits (each plays a hit cue)
    pub wounding_hits: u32,
}

impl CollisionReport {
    pub fn is_dead(&self, id: EntityId) -> bool {
        self.dead.contains(&id)
    }

    /// Flat damage owed to the player from enemy bullets
    pub fn bullet_damage(&self) -> f32 {
        self.enemy_bullet_hits as f32 * BULLET_HIT_DAMAGE
    }

    /// Flat damage owed to the player from body contact
    pub fn contact_damage(&self) -> f32 {
        self.rammed.len() as f32 * ENEMY_CONTACT_DAMAGE
    }
}

fn bullet_hits(bullet: &Bullet, shape: super::geometry::HitShape) -> bool {
    if bullet.is_laser {
        // Lasers are long and slow-moving relative to their length: a static test is enough
        shape.overlaps_rect(bullet.rect())
    } else {
        shape.hit_by_moving_rect(bullet.prev_pos, bullet.rect())
    }
}

/// Resolve player bullets against enemies, enemy bullets against the player,
/// and enemy bodies against the player.
///
/// A bullet is consumed by the first enemy it hits. Once an enemy's pending hp
/// reaches zero it stops absorbing bullets, so it is reported dead exactly once.
/// Enemies already at zero hp (area damage) are left for the caller's death pass.
pub fn check_enemy_collisions(
    enemies: &[Enemy],
    bullets: &[Bullet],
    player: &Player,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    for enemy in enemies.iter().filter(|e| !e.is_dead()) {
        let shape = enemy.hit_shape();

        for bullet in bullets.iter().filter(|b| !b.is_enemy) {
            if report.hit_bullets.contains(&bullet.id) {
                continue;
            }
            if !bullet_hits(bullet, shape) {
                continue;
            }

            report.hit_bullets.insert(bullet.id);
            let pending = report.enemy_hp.get(&enemy.id).copied().unwrap_or(enemy.hp);
            let hp = (pending - bullet.damage).max(0.0);
            report.enemy_hp.insert(enemy.id, hp);

            if hp > 0.0 {
                report.wounding_hits += 1;
            } else {
                report.dead.push(enemy.id);
                break;
            }
        }
    }

    // Any origin: boss bullets outlive their boss
    let player_shape = player.hit_shape();
    for bullet in bullets.iter().filter(|b| b.is_enemy) {
        if report.hit_bullets.contains(&bullet.id) {
            continue;
        }
        if player_shape.hit_by_moving_rect(bullet.prev_pos, bullet.rect()) {
            report.hit_bullets.insert(bullet.id);
            report.enemy_bullet_hits += 1;
        }
    }

    let player_box = player.rect();
    for enemy in enemies {
        if enemy.is_dead() || report.is_dead(enemy.id) {
            continue;
        }
        if enemy.touches(player_box) {
            report.dead.push(enemy.id);
            report.rammed.push(enemy.id);
        }
    }

    report
}

/// Outcome of the boss pass
#[derive(Debug, Clone, Default)]
pub struct BossReport {
    /// Bullets consumed this frame
    pub hit_bullets: HashSet<EntityId>,
    /// Sum of this frame's player bullet damage, already multiplied and capped
    pub total_damage: f32,
    /// Player bullets that hit the boss
    pub hits: u32,
    /// Boss bullets that struck the player
    pub boss_bullet_hits: u32,
    /// Player box overlaps the boss body
    pub body_contact: bool,
}

impl BossReport {
    /// Flat damage owed to the player from boss bullets and body contact
    pub fn player_damage(&self) -> f32 {
        let contact = if self.body_contact {
            BOSS_CONTACT_DAMAGE
        } else {
            0.0
        };
        self.boss_bullet_hits as f32 * BULLET_HIT_DAMAGE + contact
    }
}

/// Damage a single player bullet deals to the boss
pub fn boss_hit_damage(bullet: &Bullet) -> f32 {
    let damage = bullet.damage * BOSS_DAMAGE_MULTIPLIER;
    if bullet.is_laser {
        damage.min(BOSS_LASER_DAMAGE_CAP)
    } else {
        damage
    }
}

/// Resolve player bullets against the boss and the boss's own bullets and body
/// against the player.
pub fn check_boss_collisions(boss: &Boss, bullets: &[Bullet], player: &Player) -> BossReport {
    let mut report = BossReport::default();
    let boss_shape = boss.hit_shape();
    let player_shape = player.hit_shape();

    for bullet in bullets {
        if !bullet.is_enemy {
            if bullet_hits(bullet, boss_shape) {
                report.hit_bullets.insert(bullet.id);
                report.total_damage += boss_hit_damage(bullet);
                report.hits += 1;
            }
        } else if bullet.origin == BulletOrigin::Boss
            && player_shape.hit_by_moving_rect(bullet.prev_pos, bullet.rect())
        {
            report.hit_bullets.insert(bullet.id);
            report.boss_bullet_hits += 1;
        }
    }

    report.body_contact = super::geometry::rect_intersect(player.rect(), boss.rect());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::factory::{create_boss, create_enemy};
    use crate::sim::pool::{Pool, PoolKind};
    use crate::sim::state::{
        Arena, BulletMotion, EnemyKind, IdAllocator, Weapon,
    };
    use glam::Vec2;

    struct Fixture {
        ids: IdAllocator,
        enemies: Pool<Enemy>,
        player: Player,
    }

    impl Fixture {
        fn new() -> Self {
            let mut player = Player::new(&Arena::new(800.0, 600.0));
            // Park the player far from the action
            player.pos = Vec2::new(700.0, 550.0);
            Self {
                ids: IdAllocator::default(),
                enemies: Pool::with_capacity(PoolKind::Enemies, 8),
                player,
            }
        }

        fn enemy(&mut self, kind: EnemyKind, pos: Vec2) -> Enemy {
            create_enemy(kind, pos, &mut self.ids, &mut self.enemies)
        }

        /// Player bullet whose rect sits centered on `center`
        fn bullet_at(&mut self, center: Vec2, damage: f32) -> Bullet {
            let pos = center - Vec2::new(BULLET_WIDTH, BULLET_HEIGHT) / 2.0;
            Bullet {
                damage,
                ..Bullet::player(self.ids.next_id(), pos, BulletMotion::Straight, Weapon::Normal)
            }
        }
    }

    #[test]
    fn test_lethal_hit_marks_dead_once() {
        let mut f = Fixture::new();
        let e = f.enemy(EnemyKind::Shooter, Vec2::new(100.0, 100.0));
        let b1 = f.bullet_at(e.center(), 2.0);
        let b2 = f.bullet_at(e.center(), 2.0);

        let report = check_enemy_collisions(&[e.clone()], &[b1.clone(), b2.clone()], &f.player);
        assert_eq!(report.dead, vec![e.id]);
        assert_eq!(report.enemy_hp.get(&e.id), Some(&0.0));
        // Second bullet passes through the corpse
        assert!(report.hit_bullets.contains(&b1.id));
        assert!(!report.hit_bullets.contains(&b2.id));
    }

    #[test]
    fn test_two_bullets_accumulate_pending_hp() {
        let mut f = Fixture::new();
        let e = f.enemy(EnemyKind::Tank, Vec2::new(100.0, 100.0));
        let bullets = vec![f.bullet_at(e.center(), 1.0), f.bullet_at(e.center(), 1.0)];

        let report = check_enemy_collisions(&[e.clone()], &bullets, &f.player);
        assert!(report.dead.is_empty());
        assert_eq!(report.enemy_hp.get(&e.id), Some(&3.0));
        assert_eq!(report.wounding_hits, 2);
    }

    #[test]
    fn test_bullet_hits_only_first_enemy() {
        let mut f = Fixture::new();
        let a = f.enemy(EnemyKind::Tank, Vec2::new(100.0, 100.0));
        let mut b = f.enemy(EnemyKind::Tank, Vec2::new(100.0, 100.0));
        b.pos = a.pos;
        let bullet = f.bullet_at(a.center(), 1.0);

        let report = check_enemy_collisions(&[a.clone(), b.clone()], &[bullet], &f.player);
        assert!(report.enemy_hp.contains_key(&a.id));
        assert!(!report.enemy_hp.contains_key(&b.id));
    }

    #[test]
    fn test_fast_bullet_does_not_tunnel() {
        let mut f = Fixture::new();
        let e = f.enemy(EnemyKind::Fast, Vec2::new(100.0, 100.0));
        let c = e.center();
        // Jumped from well below the enemy to well above it in one frame
        let mut bullet = f.bullet_at(c - Vec2::new(0.0, 80.0), 1.0);
        bullet.prev_pos = Some(bullet.pos + Vec2::new(0.0, 160.0));

        let report = check_enemy_collisions(&[e.clone()], &[bullet], &f.player);
        assert_eq!(report.dead, vec![e.id]);
    }

    #[test]
    fn test_bomber_ellipse_is_taller_than_circle() {
        let mut f = Fixture::new();
        let e = f.enemy(EnemyKind::Bomber, Vec2::new(100.0, 100.0));
        // Just inside the ellipse's vertical reach, outside a 0.4 circle
        let probe = e.center() - Vec2::new(0.0, e.size * 0.7 + BULLET_HEIGHT / 2.0 - 1.0);
        let bullet = f.bullet_at(probe, 1.0);

        let report = check_enemy_collisions(&[e.clone()], &[bullet], &f.player);
        assert!(report.enemy_hp.contains_key(&e.id));
    }

    #[test]
    fn test_laser_uses_static_rect() {
        let mut f = Fixture::new();
        let e = f.enemy(EnemyKind::Normal, Vec2::new(100.0, 100.0));
        let c = e.center();
        let laser = Bullet {
            is_laser: true,
            size: Vec2::new(LASER_WIDTH, LASER_HEIGHT),
            damage: 3.0,
            ..Bullet::player(
                f.ids.next_id(),
                Vec2::new(c.x - LASER_WIDTH / 2.0, c.y - 100.0),
                BulletMotion::Straight,
                Weapon::Laser,
            )
        };

        let report = check_enemy_collisions(&[e.clone()], &[laser], &f.player);
        assert_eq!(report.dead, vec![e.id]);
    }

    #[test]
    fn test_enemy_bullets_hit_player_without_enemies() {
        let mut f = Fixture::new();
        let mut ids = IdAllocator::default();
        let bullet = Bullet::enemy(
            ids.next_id(),
            f.player.pos - Vec2::new(0.0, BULLET_HEIGHT / 2.0),
            Vec2::new(0.0, 9.0),
            1.0,
            BulletOrigin::Shooter,
        );

        let report = check_enemy_collisions(&[], &[bullet], &f.player);
        assert_eq!(report.enemy_bullet_hits, 1);
        assert_eq!(report.bullet_damage(), BULLET_HIT_DAMAGE);
    }

    #[test]
    fn test_ramming_kills_enemy() {
        let mut f = Fixture::new();
        let pos = f.player.pos - Vec2::splat(ENEMY_SIZE / 2.0);
        let e = f.enemy(EnemyKind::Normal, pos);

        let report = check_enemy_collisions(&[e.clone()], &[], &f.player);
        assert_eq!(report.dead, vec![e.id]);
        assert_eq!(report.rammed, vec![e.id]);
        assert_eq!(report.contact_damage(), ENEMY_CONTACT_DAMAGE);
    }

    #[test]
    fn test_already_dead_enemy_is_skipped() {
        let mut f = Fixture::new();
        let mut e = f.enemy(EnemyKind::Normal, Vec2::new(100.0, 100.0));
        e.hp = 0.0;
        let bullet = f.bullet_at(e.center(), 1.0);

        let report = check_enemy_collisions(&[e], &[bullet], &f.player);
        assert!(report.dead.is_empty());
        assert!(report.hit_bullets.is_empty());
    }

    #[test]
    fn test_boss_damage_doubled_and_laser_capped() {
        let mut f = Fixture::new();
        let mut boss = create_boss(f.ids.next_id(), 1, 800.0);
        boss.pos = Vec2::new(300.0, 50.0);
        let c = boss.center();

        let bullet = f.bullet_at(c, 1.0);
        let laser = Bullet {
            is_laser: true,
            size: Vec2::new(LASER_WIDTH, LASER_HEIGHT),
            damage: 5.0,
            ..Bullet::player(
                f.ids.next_id(),
                Vec2::new(c.x - 2.0, c.y - 100.0),
                BulletMotion::Straight,
                Weapon::Laser,
            )
        };

        let report = check_boss_collisions(&boss, &[bullet, laser], &f.player);
        assert_eq!(report.hits, 2);
        assert_eq!(report.total_damage, 2.0 + BOSS_LASER_DAMAGE_CAP);
        assert!(!report.body_contact);
    }

    #[test]
    fn test_boss_bullets_and_body_hit_player() {
        let mut f = Fixture::new();
        let mut boss = create_boss(f.ids.next_id(), 1, 800.0);
        boss.pos = f.player.pos - Vec2::splat(boss.size / 2.0);

        let boss_bullet = Bullet::enemy(
            f.ids.next_id(),
            f.player.pos,
            Vec2::new(0.0, 5.0),
            3.0,
            BulletOrigin::Boss,
        );
        let shooter_bullet = Bullet::enemy(
            f.ids.next_id(),
            f.player.pos,
            Vec2::new(0.0, 5.0),
            1.0,
            BulletOrigin::Shooter,
        );

        let report = check_boss_collisions(&boss, &[boss_bullet, shooter_bullet], &f.player);
        assert_eq!(report.boss_bullet_hits, 1);
        assert!(report.body_contact);
        assert_eq!(report.player_damage(), BULLET_HIT_DAMAGE + BOSS_CONTACT_DAMAGE);
    }
}
