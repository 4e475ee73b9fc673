#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bastion.
//!
//! The world owns the map, the waypoint polyline derived from it, and every
//! entity collection: enemies, towers and projectiles. Systems receive
//! disjoint mutable borrows through [`World::parts_mut`]; adapters read state
//! through the [`query`] module.

mod enemies;
mod occupancy;
mod projectiles;
mod towers;

use bastion_core::{
    CellCoord, CellKind, EnemyConfig, EnemyId, Event, MapConfig, PlacementError,
    TargetingPriority, TowerConfig, TowerId,
};
use glam::Vec2;
use tracing::debug;

pub use enemies::{Enemy, EnemyRoster};
pub use projectiles::{Projectile, ProjectilePool};
pub use towers::{Tower, TowerRegistry};

use occupancy::OccupancyGrid;

/// Represents the authoritative Bastion world state.
#[derive(Clone, Debug)]
pub struct World {
    map: MapConfig,
    waypoints: Vec<Vec2>,
    occupancy: OccupancyGrid,
    enemies: EnemyRoster,
    towers: TowerRegistry,
    projectiles: ProjectilePool,
}

/// Disjoint mutable view over the entity collections.
#[derive(Debug)]
pub struct WorldParts<'a> {
    /// Waypoint polyline shared by every enemy.
    pub waypoints: &'a [Vec2],
    /// Live enemies.
    pub enemies: &'a mut EnemyRoster,
    /// Constructed towers.
    pub towers: &'a mut TowerRegistry,
    /// Projectiles in flight.
    pub projectiles: &'a mut ProjectilePool,
}

impl World {
    /// Creates an empty world on `map`, deriving the waypoints from its path.
    #[must_use]
    pub fn new(map: MapConfig) -> Self {
        let waypoints = bastion_system_pathing::world_waypoints(&map);
        debug!(
            rows = map.rows(),
            cols = map.cols(),
            waypoints = waypoints.len(),
            "world created"
        );
        Self {
            occupancy: OccupancyGrid::new(map.cols(), map.rows()),
            map,
            waypoints,
            enemies: EnemyRoster::new(),
            towers: TowerRegistry::new(),
            projectiles: ProjectilePool::new(),
        }
    }

    /// Splits the world into independently borrowable collections.
    pub fn parts_mut(&mut self) -> WorldParts<'_> {
        WorldParts {
            waypoints: &self.waypoints,
            enemies: &mut self.enemies,
            towers: &mut self.towers,
            projectiles: &mut self.projectiles,
        }
    }

    /// Places a new enemy on the first waypoint.
    pub fn spawn_enemy(&mut self, config: &EnemyConfig, out: &mut Vec<Event>) -> EnemyId {
        let enemy = self.enemies.insert(Enemy::new(config, &self.waypoints));
        out.push(Event::EnemySpawned { enemy });
        enemy
    }

    /// Runs the healing auras of every healer.
    pub fn pulse_healers(&mut self, dt: f32) {
        self.enemies.pulse_healers(dt);
    }

    /// Ticks status effects and moves every enemy along the path.
    pub fn update_enemies(&mut self, dt: f32) {
        self.enemies.update(dt, &self.waypoints);
    }

    /// Removes dead enemies and enemies at the goal, emitting their events.
    pub fn sweep_casualties(&mut self, goal_damage: u32, out: &mut Vec<Event>) {
        self.enemies.sweep(&self.waypoints, goal_damage, out);
    }

    /// Checks whether a tower may be built on `cell`.
    pub fn check_placement(&self, cell: CellCoord) -> Result<(), PlacementError> {
        match self.map.cell(cell) {
            None => Err(PlacementError::OutOfBounds),
            Some(CellKind::Buildable) => {
                if self.occupancy.occupant(cell).is_some() {
                    Err(PlacementError::Occupied)
                } else {
                    Ok(())
                }
            }
            Some(_) => Err(PlacementError::NotBuildable),
        }
    }

    /// Constructs a tower with `stats` on `cell`.
    pub fn place_tower(
        &mut self,
        cell: CellCoord,
        stats: TowerConfig,
    ) -> Result<TowerId, PlacementError> {
        self.check_placement(cell)?;
        let position = bastion_system_pathing::grid_to_world(&self.map, cell);
        let tower = self.towers.insert(cell, position, stats);
        self.occupancy.occupy(tower, cell);
        Ok(tower)
    }

    /// Replaces a tower's stats with its next level.
    ///
    /// Returns `false` when the tower does not exist.
    pub fn upgrade_tower(&mut self, tower: TowerId, next: TowerConfig) -> bool {
        match self.towers.get_mut(tower) {
            Some(state) => {
                state.upgrade(next);
                true
            }
            None => false,
        }
    }

    /// Replaces a tower's targeting policy.
    ///
    /// Returns `false` when the tower does not exist.
    pub fn set_targeting(&mut self, tower: TowerId, priority: TargetingPriority) -> bool {
        match self.towers.get_mut(tower) {
            Some(state) => {
                state.set_targeting(priority);
                true
            }
            None => false,
        }
    }

    /// Demolishes a tower and frees its cell.
    pub fn remove_tower(&mut self, tower: TowerId) -> Option<Tower> {
        let removed = self.towers.remove(tower)?;
        self.occupancy.vacate(removed.cell());
        Some(removed)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use bastion_core::{CellCoord, MapConfig, TowerId};
    use glam::Vec2;

    use super::{EnemyRoster, ProjectilePool, Tower, TowerRegistry, World};

    /// Map the world was created on.
    #[must_use]
    pub fn map(world: &World) -> &MapConfig {
        &world.map
    }

    /// Waypoint polyline enemies follow.
    #[must_use]
    pub fn waypoints(world: &World) -> &[Vec2] {
        &world.waypoints
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn enemies(world: &World) -> &EnemyRoster {
        &world.enemies
    }

    /// Number of enemies still on the map.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Constructed towers.
    #[must_use]
    pub fn towers(world: &World) -> &TowerRegistry {
        &world.towers
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<&Tower> {
        world.towers.get(tower)
    }

    /// Tower standing on `cell`, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<&Tower> {
        world
            .occupancy
            .occupant(cell)
            .and_then(|tower| world.towers.get(tower))
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> &ProjectilePool {
        &world.projectiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{Balance, EnemyStats, TowerKind};

    fn corridor() -> MapConfig {
        let b = CellKind::Buildable;
        let p = CellKind::Path;
        let rows = vec![
            vec![b; 6],
            vec![CellKind::Spawn, p, p, p, p, CellKind::Goal],
            vec![b; 6],
        ];
        MapConfig::from_rows(&rows).expect("rectangular corridor")
    }

    fn arrow() -> TowerConfig {
        *Balance::default()
            .towers
            .level(TowerKind::Arrow, 1)
            .expect("arrow level one")
    }

    #[test]
    fn corridor_reduces_to_two_waypoints() {
        let world = World::new(corridor());
        assert_eq!(
            query::waypoints(&world),
            &[Vec2::new(-2.5, 0.0), Vec2::new(2.5, 0.0)]
        );
    }

    #[test]
    fn enemy_walks_to_goal_and_is_swept() {
        let mut world = World::new(corridor());
        let mut events = Vec::new();
        let enemy = world.spawn_enemy(&Balance::default().bestiary.basic, &mut events);
        assert_eq!(events, vec![Event::EnemySpawned { enemy }]);

        events.clear();
        for _ in 0..2 {
            world.update_enemies(1.0);
            world.sweep_casualties(1, &mut events);
        }
        assert!(events.is_empty());
        assert_eq!(query::live_enemy_count(&world), 1);

        world.update_enemies(1.0);
        world.sweep_casualties(3, &mut events);
        assert_eq!(events, vec![Event::EnemyReachedGoal { enemy, damage: 3 }]);
        assert_eq!(query::live_enemy_count(&world), 0);
        assert!(query::enemies(&world).get(enemy).is_none());
    }

    #[test]
    fn dead_splitter_leaves_children_that_cannot_split() {
        let mut world = World::new(corridor());
        let mut events = Vec::new();
        let splitter = Balance::default().bestiary.splitter;
        let parent = world.spawn_enemy(&splitter, &mut events);
        events.clear();

        let origin = {
            let parts = world.parts_mut();
            let enemy = parts.enemies.get_mut(parent).expect("parent");
            assert!(!enemy.take_damage(10_000.0));
            enemy.position()
        };
        world.sweep_casualties(1, &mut events);

        assert_eq!(events.len(), 3);
        assert_eq!(
            events.last(),
            Some(&Event::EnemyKilled {
                enemy: parent,
                reward: splitter.stats.reward
            })
        );

        let roster = query::enemies(&world);
        assert_eq!(roster.len(), 2);
        for (_, child) in roster.iter() {
            assert!(child.split().is_none());
            assert_eq!(child.hp(), 40.0);
            assert_eq!(child.next_waypoint(), 1);
            assert!((child.position().distance(origin) - 0.3).abs() < 1e-5);
        }
        let positions: Vec<Vec2> = roster.iter().map(|(_, child)| child.position()).collect();
        assert!(positions[0].distance(positions[1]) > 0.5);
    }

    #[test]
    fn healer_restores_wounded_allies_but_not_itself() {
        let mut world = World::new(corridor());
        let mut events = Vec::new();
        let bestiary = Balance::default().bestiary;
        let healer = world.spawn_enemy(&bestiary.healer, &mut events);
        let ally = world.spawn_enemy(&bestiary.basic, &mut events);
        let bystander = world.spawn_enemy(&EnemyStats::new(100.0, 0.0, 1, 0.3).into(), &mut events);

        {
            let parts = world.parts_mut();
            for id in [healer, ally] {
                let _ = parts.enemies.get_mut(id).expect("enemy").take_damage(50.0);
            }
        }

        world.pulse_healers(0.5);
        assert_eq!(query::enemies(&world).get(ally).map(Enemy::hp), Some(50.0));

        world.pulse_healers(0.5);
        let roster = query::enemies(&world);
        assert_eq!(roster.get(ally).map(Enemy::hp), Some(60.0));
        assert_eq!(roster.get(healer).map(Enemy::hp), Some(100.0));
        assert_eq!(roster.get(bystander).map(Enemy::hp), Some(100.0));
    }

    #[test]
    fn placement_rules_follow_the_map() {
        let mut world = World::new(corridor());
        let buildable = CellCoord::new(0, 0);

        assert_eq!(
            world.place_tower(CellCoord::new(0, 1), arrow()),
            Err(PlacementError::NotBuildable)
        );
        assert_eq!(
            world.place_tower(CellCoord::new(6, 0), arrow()),
            Err(PlacementError::OutOfBounds)
        );

        let tower = world.place_tower(buildable, arrow()).expect("buildable cell");
        assert_eq!(
            world.place_tower(buildable, arrow()),
            Err(PlacementError::Occupied)
        );
        assert_eq!(query::tower_at(&world, buildable).map(Tower::id), Some(tower));
        assert_eq!(
            query::tower(&world, tower).map(Tower::position),
            Some(Vec2::new(-2.5, -1.0))
        );

        let removed = world.remove_tower(tower).expect("tower exists");
        assert_eq!(removed.cell(), buildable);
        assert!(query::tower_at(&world, buildable).is_none());
        assert!(world.place_tower(buildable, arrow()).is_ok());
    }

    #[test]
    fn targeting_and_upgrades_reject_unknown_towers() {
        let mut world = World::new(corridor());
        let ghost = TowerId::new(99);
        assert!(!world.set_targeting(ghost, TargetingPriority::Weakest));
        assert!(!world.upgrade_tower(ghost, arrow()));
        assert!(world.remove_tower(ghost).is_none());

        let tower = world.place_tower(CellCoord::new(2, 2), arrow()).expect("buildable");
        assert!(world.set_targeting(tower, TargetingPriority::Weakest));
        assert_eq!(
            query::tower(&world, tower).map(Tower::targeting),
            Some(TargetingPriority::Weakest)
        );
    }
}
