//! Homing projectiles in flight.

use bastion_core::{EnemyId, TowerConfig, TowerId};
use glam::Vec2;

/// Projectile travelling toward an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Enemy the projectile homes on.
    pub target: EnemyId,
    /// Current world-space position.
    pub position: Vec2,
    /// Damage dealt to the primary target.
    pub damage: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Stats of the firing tower at the moment of firing.
    pub stats: TowerConfig,
}

impl Projectile {
    /// Creates a projectile at `origin` using a snapshot of `stats`.
    #[must_use]
    pub fn launch(tower: TowerId, target: EnemyId, origin: Vec2, stats: TowerConfig) -> Self {
        Self {
            tower,
            target,
            position: origin,
            damage: stats.damage,
            speed: stats.projectile_speed,
            stats,
        }
    }
}

/// Dense store of projectiles in firing order.
///
/// Finished projectiles are compacted out in place, so the backing
/// allocation is reused from tick to tick instead of growing per shot.
#[derive(Clone, Debug, Default)]
pub struct ProjectilePool {
    active: Vec<Projectile>,
}

impl ProjectilePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Reports whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Projectiles in firing order.
    #[must_use]
    pub fn as_slice(&self) -> &[Projectile] {
        &self.active
    }

    /// Adds a projectile behind every projectile already in flight.
    pub fn push(&mut self, projectile: Projectile) {
        self.active.push(projectile);
    }

    /// Visits projectiles in firing order, keeping those for which `keep` returns true.
    pub fn retain_mut(&mut self, keep: impl FnMut(&mut Projectile) -> bool) {
        self.active.retain_mut(keep);
    }
}
