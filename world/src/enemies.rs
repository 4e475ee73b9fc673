//! Enemy instances and the arena that owns them.
//!
//! Targeting and combat borrow the roster mutably through `World::parts_mut`
//! and change enemies in place, so hits, slows and deaths are visible to every
//! later stage of the tick that dealt them.

use std::f32::consts::TAU;

use bastion_core::{EnemyConfig, EnemyId, EnemyStats, Event, Health, PoisonConfig, SplitConfig};
use bastion_system_movement::PathFollower;
use bastion_system_status_effects::{StatusEffects, TickReport};
use glam::Vec2;
use slotmap::SlotMap;
use tracing::trace;

/// Distance splitter children are pushed away from their parent.
const SPLIT_SPREAD: f32 = 0.3;

/// Mutable state of a single enemy walking the path.
#[derive(Clone, Debug)]
pub struct Enemy {
    stats: EnemyStats,
    split: Option<SplitConfig>,
    health: Health,
    follower: PathFollower,
    effects: StatusEffects,
    revealed: bool,
    heal_timer: f32,
}

impl Enemy {
    /// Instantiates `config` on the first waypoint.
    #[must_use]
    pub fn new(config: &EnemyConfig, waypoints: &[Vec2]) -> Self {
        Self::from_parts(config.stats, config.split, PathFollower::new(waypoints))
    }

    /// Instantiates `config` at an arbitrary position along the path.
    ///
    /// `next_waypoint` is clamped to the waypoint count.
    #[must_use]
    pub fn at(
        config: &EnemyConfig,
        waypoints: &[Vec2],
        position: Vec2,
        next_waypoint: usize,
    ) -> Self {
        let follower = PathFollower::resume_at(waypoints, position, next_waypoint);
        Self::from_parts(config.stats, config.split, follower)
    }

    fn from_parts(stats: EnemyStats, split: Option<SplitConfig>, follower: PathFollower) -> Self {
        Self {
            stats,
            split,
            health: Health::new(stats.hp),
            follower,
            effects: StatusEffects::new(),
            revealed: false,
            heal_timer: 0.0,
        }
    }

    /// Template stats the enemy was created from.
    #[must_use]
    pub const fn stats(&self) -> &EnemyStats {
        &self.stats
    }

    /// Children spawned when the enemy dies, if any.
    #[must_use]
    pub const fn split(&self) -> Option<&SplitConfig> {
        self.split.as_ref()
    }

    /// Current and maximum hit points.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hp(&self) -> f32 {
        self.health.current()
    }

    /// Reports whether the enemy still has hit points.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Reports whether the enemy arrived at the goal.
    #[must_use]
    pub const fn reached_goal(&self) -> bool {
        self.follower.reached_goal()
    }

    /// Current world-space position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.follower.position()
    }

    /// Index of the waypoint the enemy is heading for.
    #[must_use]
    pub const fn next_waypoint(&self) -> usize {
        self.follower.next_waypoint()
    }

    /// How far along the path the enemy has travelled.
    #[must_use]
    pub fn progress(&self, waypoints: &[Vec2]) -> f32 {
        self.follower.progress(waypoints)
    }

    /// Slow and poison state.
    #[must_use]
    pub const fn effects(&self) -> &StatusEffects {
        &self.effects
    }

    /// Reports whether the enemy flies.
    #[must_use]
    pub const fn is_flying(&self) -> bool {
        self.stats.flying
    }

    /// Reports whether the enemy is a stealth unit.
    #[must_use]
    pub const fn is_stealthed(&self) -> bool {
        self.stats.stealth.is_some()
    }

    /// Reports whether a stealth unit is currently visible to towers.
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Reports whether the enemy is hidden from towers.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.is_stealthed() && !self.revealed
    }

    /// Reports whether a tower may select the enemy as a target.
    #[must_use]
    pub fn is_targetable(&self, can_target_flying: bool) -> bool {
        self.is_alive()
            && !self.reached_goal()
            && (can_target_flying || !self.is_flying())
            && !self.is_hidden()
    }

    /// Removes hit points. Returns whether the enemy survived.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health.damage(amount)
    }

    /// Restores hit points up to the maximum. Dead enemies stay dead.
    pub fn heal(&mut self, amount: f32) {
        if self.is_alive() {
            self.health.heal(amount);
        }
    }

    /// Applies a slow through the enemy's status effects.
    pub fn apply_slow(&mut self, factor: f32, duration: f32) {
        self.effects.apply_slow(factor, duration);
    }

    /// Applies a poison stack through the enemy's status effects.
    pub fn apply_poison(&mut self, config: &PoisonConfig) {
        self.effects.apply_poison(config);
    }

    /// Marks a stealth unit as visible or hidden.
    pub fn set_revealed(&mut self, revealed: bool) {
        self.revealed = revealed;
    }

    /// Ticks status effects, then walks the path at the slowed speed.
    ///
    /// Returns what the status effects did; an enemy that is dead or already
    /// at the goal reports nothing.
    pub(crate) fn update(&mut self, dt: f32, waypoints: &[Vec2]) -> TickReport {
        if !self.is_alive() || self.reached_goal() {
            return TickReport::default();
        }

        let health = &mut self.health;
        let report = self.effects.tick(dt, |amount| health.damage(amount));
        if !report.killed {
            let speed = self.stats.speed * self.effects.slow_factor();
            self.follower.advance(waypoints, speed * dt);
        }
        report
    }

    fn heal_pulse(&mut self, dt: f32) -> Option<HealPulse> {
        let heal = self.stats.heal?;
        if !self.is_alive() || heal.tick_rate <= 0.0 {
            return None;
        }

        self.heal_timer += dt;
        if self.heal_timer < heal.tick_rate {
            return None;
        }
        self.heal_timer -= heal.tick_rate;

        Some(HealPulse {
            origin: self.position(),
            radius_squared: heal.radius * heal.radius,
            amount: heal.amount,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct HealPulse {
    origin: Vec2,
    radius_squared: f32,
    amount: f32,
}

/// Arena of live enemies iterated in spawn order.
///
/// Handles are generational: once an enemy is removed its [`EnemyId`] never
/// resolves again, so projectiles and chain hops can test "is my target still
/// here" safely.
#[derive(Clone, Debug, Default)]
pub struct EnemyRoster {
    arena: SlotMap<EnemyId, Enemy>,
    order: Vec<EnemyId>,
}

impl EnemyRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enemies in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Reports whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Looks up an enemy by handle.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&Enemy> {
        self.arena.get(enemy)
    }

    /// Looks up an enemy mutably by handle.
    pub fn get_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        self.arena.get_mut(enemy)
    }

    /// Iterates over enemies in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = (EnemyId, &Enemy)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.arena.get(*id).map(|enemy| (*id, enemy)))
    }

    /// Visits every enemy mutably in spawn order.
    pub fn for_each_mut(&mut self, mut visit: impl FnMut(EnemyId, &mut Enemy)) {
        for id in &self.order {
            if let Some(enemy) = self.arena.get_mut(*id) {
                visit(*id, enemy);
            }
        }
    }

    /// Adds an enemy at the end of the spawn order.
    pub fn insert(&mut self, enemy: Enemy) -> EnemyId {
        let id = self.arena.insert(enemy);
        self.order.push(id);
        id
    }

    /// Runs every healer's aura.
    ///
    /// Each healer heals wounded, living allies other than itself whose
    /// squared distance is within its radius. Healers resolve in spawn order
    /// and observe earlier heals.
    pub(crate) fn pulse_healers(&mut self, dt: f32) {
        for index in 0..self.order.len() {
            let healer = self.order[index];
            let Some(pulse) = self
                .arena
                .get_mut(healer)
                .and_then(|enemy| enemy.heal_pulse(dt))
            else {
                continue;
            };

            for ally in &self.order {
                if *ally == healer {
                    continue;
                }
                let Some(enemy) = self.arena.get_mut(*ally) else {
                    continue;
                };
                if !enemy.is_alive() || !enemy.health.is_wounded() {
                    continue;
                }
                if enemy.position().distance_squared(pulse.origin) <= pulse.radius_squared {
                    enemy.heal(pulse.amount);
                }
            }
        }
    }

    /// Advances status effects and movement of every enemy.
    pub(crate) fn update(&mut self, dt: f32, waypoints: &[Vec2]) {
        self.for_each_mut(|id, enemy| {
            let report = enemy.update(dt, waypoints);
            if report.poison_damage > 0.0 || report.poison_expired {
                trace!(
                    ?id,
                    damage = report.poison_damage,
                    expired = report.poison_expired,
                    killed = report.killed,
                    "status tick"
                );
            }
        });
    }

    /// Removes dead enemies and enemies at the goal.
    ///
    /// A dead splitter leaves its children behind at its last position and
    /// waypoint cursor, spread evenly on a small circle. Children are appended
    /// after every surviving enemy and are not inspected in the same sweep.
    pub(crate) fn sweep(&mut self, waypoints: &[Vec2], goal_damage: u32, out: &mut Vec<Event>) {
        let mut children_ids = Vec::new();
        let mut removed = false;

        for id in &self.order {
            let Some(enemy) = self.arena.get(*id) else {
                continue;
            };

            if !enemy.is_alive() {
                let reward = enemy.stats.reward;
                let children = enemy
                    .split
                    .map(|split| split_children(&split, enemy, waypoints))
                    .unwrap_or_default();
                let _ = self.arena.remove(*id);
                removed = true;

                for child in children {
                    let child_id = self.arena.insert(child);
                    out.push(Event::EnemySpawned { enemy: child_id });
                    children_ids.push(child_id);
                }
                out.push(Event::EnemyKilled { enemy: *id, reward });
            } else if enemy.reached_goal() {
                let _ = self.arena.remove(*id);
                removed = true;
                out.push(Event::EnemyReachedGoal {
                    enemy: *id,
                    damage: goal_damage,
                });
            }
        }

        if removed {
            let arena = &self.arena;
            self.order.retain(|id| arena.contains_key(*id));
        }
        self.order.extend(children_ids);
    }
}

fn split_children(split: &SplitConfig, parent: &Enemy, waypoints: &[Vec2]) -> Vec<Enemy> {
    let child = EnemyConfig::new(split.child);
    (0..split.count)
        .map(|index| {
            let angle = TAU * index as f32 / split.count as f32;
            let position = parent.position() + Vec2::from_angle(angle) * SPLIT_SPREAD;
            Enemy::at(&child, waypoints, position, parent.next_waypoint())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane() -> Vec<Vec2> {
        vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)]
    }

    fn poison(damage: f32) -> PoisonConfig {
        PoisonConfig {
            damage,
            duration: 1.0,
            tick_rate: 0.5,
            max_stacks: 3,
        }
    }

    #[test]
    fn status_report_matches_health_lost() {
        let waypoints = lane();
        let mut enemy = Enemy::new(&EnemyStats::new(100.0, 1.0, 1, 0.2).into(), &waypoints);
        enemy.apply_poison(&poison(5.0));
        enemy.apply_poison(&poison(7.0));

        let report = enemy.update(0.5, &waypoints);
        assert_eq!(report.poison_damage, 12.0);
        assert_eq!(enemy.hp(), 100.0 - report.poison_damage);
        assert!(!report.poison_expired);
        assert!(!report.killed);

        let report = enemy.update(0.5, &waypoints);
        assert_eq!(report.poison_damage, 12.0);
        assert!(report.poison_expired);
        assert_eq!(enemy.hp(), 76.0);
        assert!(enemy.effects().poison_stacks().is_empty());
    }

    #[test]
    fn lethal_poison_stops_the_enemy_in_place() {
        let waypoints = lane();
        let mut enemy = Enemy::new(&EnemyStats::new(4.0, 1.0, 1, 0.2).into(), &waypoints);
        enemy.apply_poison(&poison(5.0));
        let start = enemy.position();

        let report = enemy.update(0.5, &waypoints);
        assert!(report.killed);
        assert_eq!(report.poison_damage, 5.0);
        assert_eq!(enemy.hp(), 0.0);
        assert_eq!(enemy.position(), start);

        assert_eq!(enemy.update(0.5, &waypoints), TickReport::default());
    }
}
