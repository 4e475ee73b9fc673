#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! System that fires towers and resolves projectile impacts.
//!
//! Pulse towers damage every valid enemy in range the moment their cooldown
//! allows. Every other tower launches a homing projectile at its current
//! target; on arrival the impact applies, in order, direct damage, slow,
//! poison, chain hops and splash.
//!
//! Unlike systems that emit commands for the world to apply, this one writes
//! through the collections borrowed from `World::parts_mut`. Later hops of an
//! impact, later projectiles and the casualty sweep of the same tick must see
//! the damage already dealt.

use bastion_core::{ChainConfig, EnemyId, SlowConfig, TowerConfig};
use bastion_system_tower_targeting::{select_target, targets_in_range};
use bastion_world::{Enemy, EnemyRoster, Projectile, ProjectilePool, TowerRegistry};
use glam::Vec2;
use tracing::trace;

/// Extra distance at which a projectile counts as arrived.
pub const HIT_TOLERANCE: f32 = 0.15;

/// Share of the projectile damage dealt to splash victims.
pub const SPLASH_DAMAGE_RATIO: f32 = 0.5;

/// Tower combat system that reuses scratch buffers between ticks.
#[derive(Debug, Default)]
pub struct TowerCombat {
    pulse_victims: Vec<EnemyId>,
    chained: Vec<EnemyId>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets every ready tower with a valid target fire once, in construction order.
    ///
    /// Returns the number of towers that fired.
    pub fn fire(
        &mut self,
        towers: &mut TowerRegistry,
        enemies: &mut EnemyRoster,
        projectiles: &mut ProjectilePool,
        waypoints: &[Vec2],
    ) -> usize {
        let mut fired = 0;

        for tower in towers.iter_mut() {
            if !tower.can_fire() {
                continue;
            }
            let Some(target) = select_target(tower, enemies, waypoints) else {
                continue;
            };

            let stats = *tower.stats();
            if stats.pulse {
                self.pulse_victims.clear();
                self.pulse_victims.extend(targets_in_range(tower, enemies));
                for victim in &self.pulse_victims {
                    if let Some(enemy) = enemies.get_mut(*victim) {
                        let _ = enemy.take_damage(stats.damage);
                    }
                }
                trace!(tower = tower.id().get(), hits = self.pulse_victims.len(), "pulse");
            } else {
                projectiles.push(Projectile::launch(tower.id(), target, tower.position(), stats));
            }

            tower.reset_cooldown();
            fired += 1;
        }

        fired
    }

    /// Moves every projectile toward its target and resolves arrivals.
    ///
    /// A projectile whose target died, left the map or reached the goal is
    /// discarded without an impact. Returns the number of impacts.
    pub fn update_projectiles(
        &mut self,
        enemies: &mut EnemyRoster,
        projectiles: &mut ProjectilePool,
        dt: f32,
    ) -> usize {
        let chained = &mut self.chained;
        let mut impacts = 0;

        projectiles.retain_mut(|projectile| {
            let aim = match enemies.get(projectile.target) {
                Some(target) if target.is_alive() && !target.reached_goal() => target.position(),
                _ => return false,
            };

            let offset = aim - projectile.position;
            let distance = offset.length();
            let step = projectile.speed * dt;
            if distance <= step + HIT_TOLERANCE {
                resolve_impact(projectile, aim, enemies, chained);
                impacts += 1;
                false
            } else {
                projectile.position += offset / distance * step;
                true
            }
        });

        impacts
    }
}

/// Counts every tower's cooldown down by `dt`.
pub fn tick_cooldowns(towers: &mut TowerRegistry, dt: f32) {
    for tower in towers.iter_mut() {
        tower.tick_cooldown(dt);
    }
}

fn resolve_impact(
    projectile: &Projectile,
    point: Vec2,
    enemies: &mut EnemyRoster,
    chained: &mut Vec<EnemyId>,
) {
    let stats = projectile.stats;
    let primary = projectile.target;
    trace!(tower = projectile.tower.get(), damage = projectile.damage, "impact");

    if let Some(enemy) = enemies.get_mut(primary) {
        if enemy.is_alive() {
            let _ = enemy.take_damage(projectile.damage);
        }
        if let Some(slow) = stats.slow {
            apply_slow(enemy, slow);
        }
        if let Some(poison) = stats.poison {
            if enemy.is_alive() {
                enemy.apply_poison(&poison);
            }
        }
    }

    if let Some(chain) = stats.chain.filter(|chain| chain.count > 0) {
        chain_hops(primary, &stats, chain, enemies, chained);
    }

    if let Some(splash) = stats.splash.filter(|splash| splash.radius > 0.0) {
        let radius_squared = splash.radius * splash.radius;
        let damage = projectile.damage * SPLASH_DAMAGE_RATIO;
        enemies.for_each_mut(|id, enemy| {
            if id == primary || !enemy.is_alive() {
                return;
            }
            if enemy.position().distance_squared(point) <= radius_squared {
                let _ = enemy.take_damage(damage);
                if let Some(slow) = stats.slow {
                    apply_slow(enemy, slow);
                }
            }
        });
    }
}

fn apply_slow(enemy: &mut Enemy, slow: SlowConfig) {
    if enemy.is_alive() {
        enemy.apply_slow(slow.factor, slow.duration);
    }
}

/// Greedy nearest-neighbour hops starting from the primary target.
///
/// The damage shrinks by the falloff before each hop and is rounded when
/// dealt. Hidden stealth units and enemies already struck are skipped.
fn chain_hops(
    primary: EnemyId,
    stats: &TowerConfig,
    chain: ChainConfig,
    enemies: &mut EnemyRoster,
    chained: &mut Vec<EnemyId>,
) {
    let range_squared = chain.range * chain.range;
    let mut damage = stats.damage;
    let mut current = primary;
    chained.clear();
    chained.push(primary);

    for _ in 0..chain.count {
        damage *= chain.falloff;
        let Some(origin) = enemies.get(current).map(Enemy::position) else {
            break;
        };

        let mut nearest: Option<(EnemyId, f32)> = None;
        for (id, enemy) in enemies.iter() {
            if !enemy.is_alive() || enemy.is_hidden() || chained.contains(&id) {
                continue;
            }
            let distance_squared = enemy.position().distance_squared(origin);
            if distance_squared <= range_squared
                && nearest.map_or(true, |(_, best)| distance_squared < best)
            {
                nearest = Some((id, distance_squared));
            }
        }

        let Some((next, _)) = nearest else {
            break;
        };
        if let Some(enemy) = enemies.get_mut(next) {
            let _ = enemy.take_damage(damage.round());
        }
        chained.push(next);
        current = next;
    }
}
