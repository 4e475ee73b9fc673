//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use bastion_core::{CellCoord, TargetingPriority, TowerConfig, TowerId, TowerInfo, TowerKind};
use glam::Vec2;

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub struct Tower {
    id: TowerId,
    cell: CellCoord,
    position: Vec2,
    level: u32,
    stats: TowerConfig,
    targeting: TargetingPriority,
    cooldown: f32,
    total_invested: u32,
}

impl Tower {
    fn new(id: TowerId, cell: CellCoord, position: Vec2, stats: TowerConfig) -> Self {
        Self {
            id,
            cell,
            position,
            level: 1,
            stats,
            targeting: TargetingPriority::default(),
            cooldown: 0.0,
            total_invested: stats.cost,
        }
    }

    /// Identifier allocated by the world for the tower.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Kind of tower that was constructed.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.stats.kind
    }

    /// Cell the tower occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// World-space centre of the tower's cell.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current 1-based level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Stats of the current level.
    #[must_use]
    pub const fn stats(&self) -> &TowerConfig {
        &self.stats
    }

    /// Active targeting policy.
    #[must_use]
    pub const fn targeting(&self) -> TargetingPriority {
        self.targeting
    }

    /// Gold spent on construction and upgrades.
    #[must_use]
    pub const fn total_invested(&self) -> u32 {
        self.total_invested
    }

    /// Seconds before the tower may fire again.
    #[must_use]
    pub const fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Reports whether the cooldown has elapsed.
    #[must_use]
    pub fn can_fire(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Counts the cooldown down while it is running.
    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.cooldown > 0.0 {
            self.cooldown -= dt;
        }
    }

    /// Restarts the cooldown after firing.
    pub fn reset_cooldown(&mut self) {
        self.cooldown = self.stats.cooldown();
    }

    /// Plain-data description of the tower.
    #[must_use]
    pub fn info(&self, max_level: u32) -> TowerInfo {
        TowerInfo {
            tower: self.id,
            kind: self.kind(),
            cell: self.cell,
            level: self.level,
            max_level,
            targeting: self.targeting,
            total_invested: self.total_invested,
            stats: self.stats,
        }
    }

    pub(crate) fn upgrade(&mut self, next: TowerConfig) {
        self.total_invested = self
            .total_invested
            .saturating_add(self.stats.upgrade_cost.unwrap_or(0));
        self.stats = next;
        self.level += 1;
    }

    pub(crate) fn set_targeting(&mut self, priority: TargetingPriority) {
        self.targeting = priority;
    }
}

/// Registry that stores towers and manages identifier allocation.
///
/// Identifiers grow monotonically, so iteration order matches construction
/// order.
#[derive(Clone, Debug)]
pub struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl Default for TowerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Number of towers in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no tower was built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&Tower> {
        self.entries.get(&tower)
    }

    /// Iterates over towers in construction order.
    pub fn iter(&self) -> impl Iterator<Item = &Tower> + '_ {
        self.entries.values()
    }

    /// Iterates mutably over towers in construction order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tower> + '_ {
        self.entries.values_mut()
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&tower)
    }

    pub(crate) fn insert(&mut self, cell: CellCoord, position: Vec2, stats: TowerConfig) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, Tower::new(id, cell, position, stats));
        id
    }

    pub(crate) fn remove(&mut self, tower: TowerId) -> Option<Tower> {
        self.entries.remove(&tower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::TowerCatalog;

    fn arrow(level: u32) -> TowerConfig {
        *TowerCatalog::default()
            .level(TowerKind::Arrow, level)
            .expect("arrow level")
    }

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TowerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.next_tower_id.get(), 0);
    }

    #[test]
    fn identifiers_follow_construction_order() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(CellCoord::new(4, 1), Vec2::ZERO, arrow(1));
        let second = registry.insert(CellCoord::new(0, 0), Vec2::ZERO, arrow(1));
        let _ = registry.remove(first);
        let third = registry.insert(CellCoord::new(2, 2), Vec2::ZERO, arrow(1));

        assert_eq!(first, TowerId::new(0));
        let order: Vec<TowerId> = registry.iter().map(Tower::id).collect();
        assert_eq!(order, vec![second, third]);
        assert_eq!(third, TowerId::new(2));
    }

    #[test]
    fn upgrade_adds_previous_level_cost_to_investment() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(CellCoord::new(1, 2), Vec2::ZERO, arrow(1));
        let tower = registry.get_mut(id).expect("tower");
        let paid = tower.stats().upgrade_cost.expect("level one upgrades");
        tower.upgrade(arrow(2));

        assert_eq!(tower.level(), 2);
        assert_eq!(tower.total_invested(), arrow(1).cost + paid);
        assert_eq!(tower.info(3).max_level, 3);
    }

    #[test]
    fn cooldown_runs_from_fire_rate() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(CellCoord::new(1, 2), Vec2::ZERO, arrow(1));
        let tower = registry.get_mut(id).expect("tower");
        assert!(tower.can_fire());

        tower.reset_cooldown();
        assert!(!tower.can_fire());
        tower.tick_cooldown(tower.stats().cooldown());
        assert!(tower.can_fire());
    }
}
