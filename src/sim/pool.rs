//! Reusable-slot allocator for short-lived entities
//!
//! Each pool is an ordered list of slots. A slot is either empty or records the
//! identity of the one live object it was handed out for. `get` fills the first
//! empty slot (or appends a new one when every slot is taken), `release` finds the
//! slot holding the object's identity and empties it.
//!
//! The live object itself is owned by the caller's entity list (bullets, enemies,
//! ...). Releasing through a shared reference and then dropping the object from
//! that list keeps the single-owner invariant.

use std::marker::PhantomData;

use crate::consts::*;

use super::state::{Bullet, Enemy, EntityId, Explosion, Item, Particle};

/// Anything handed out by a pool carries a stable identity
pub trait Pooled {
    fn pool_id(&self) -> EntityId;
}

/// Which entity kind a pool serves (for diagnostics)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Bullets,
    Enemies,
    Particles,
    Explosions,
    Items,
}

impl PoolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolKind::Bullets => "bullets",
            PoolKind::Enemies => "enemies",
            PoolKind::Particles => "particles",
            PoolKind::Explosions => "explosions",
            PoolKind::Items => "items",
        }
    }
}

/// Fixed-capacity slot pool that grows on exhaustion and never shrinks
#[derive(Debug, Clone)]
pub struct Pool<T> {
    kind: PoolKind,
    slots: Vec<Option<EntityId>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Pooled> Pool<T> {
    pub fn with_capacity(kind: PoolKind, capacity: usize) -> Self {
        Self {
            kind,
            slots: vec![None; capacity],
            _marker: PhantomData,
        }
    }

    /// Build an object with `factory` and register it in the first empty slot
    pub fn get(&mut self, factory: impl FnOnce() -> T) -> T {
        let obj = factory();
        let id = obj.pool_id();

        if let Some(slot) = self.slots.iter_mut().find(|s| s.is_none()) {
            *slot = Some(id);
        } else {
            self.slots.push(Some(id));
            log::debug!(
                "{} pool exhausted, grew to {} slots",
                self.kind.as_str(),
                self.slots.len()
            );
        }
        obj
    }

    /// Empty the slot holding `obj`. Returns false (and does nothing) if not pooled here.
    pub fn release(&mut self, obj: &T) -> bool {
        let id = obj.pool_id();
        match self.slots.iter_mut().find(|s| **s == Some(id)) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    /// Index of the slot currently holding `id`
    pub fn slot_of(&self, id: EntityId) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(id))
    }

    /// Total slots (grows, never shrinks)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Occupied slots
    pub fn in_use(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Empty every slot without changing capacity
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }
}

/// One pool per pooled entity kind
#[derive(Debug, Clone)]
pub struct Pools {
    pub bullets: Pool<Bullet>,
    pub enemies: Pool<Enemy>,
    pub particles: Pool<Particle>,
    pub explosions: Pool<Explosion>,
    pub items: Pool<Item>,
}

impl Default for Pools {
    fn default() -> Self {
        Self {
            bullets: Pool::with_capacity(PoolKind::Bullets, POOL_BULLETS),
            enemies: Pool::with_capacity(PoolKind::Enemies, POOL_ENEMIES),
            particles: Pool::with_capacity(PoolKind::Particles, POOL_PARTICLES),
            explosions: Pool::with_capacity(PoolKind::Explosions, POOL_EXPLOSIONS),
            items: Pool::with_capacity(PoolKind::Items, POOL_ITEMS),
        }
    }
}

impl Pools {
    /// Empty all pools (new game)
    pub fn clear(&mut self) {
        self.bullets.clear();
        self.enemies.clear();
        self.particles.clear();
        self.explosions.clear();
        self.items.clear();
    }
}
