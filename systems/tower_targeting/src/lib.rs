#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks tower targets and resolves stealth visibility.
//!
//! Every comparison is strict, so among equally ranked enemies the one
//! encountered first in spawn order wins. Distances are compared squared.

use bastion_core::{EnemyId, TargetingPriority};
use bastion_world::{Enemy, EnemyRoster, Tower, TowerRegistry};
use glam::Vec2;

/// Reveals every stealth enemy standing within its reveal range of any tower
/// and conceals the rest.
///
/// The boundary is inclusive and there is no hysteresis: an enemy exactly at
/// its reveal range is visible.
pub fn reveal_stealth(towers: &TowerRegistry, enemies: &mut EnemyRoster) {
    enemies.for_each_mut(|_, enemy| {
        let Some(stealth) = enemy.stats().stealth else {
            return;
        };
        if !enemy.is_alive() {
            return;
        }

        let reveal_squared = stealth.reveal_range * stealth.reveal_range;
        let position = enemy.position();
        let spotted = towers
            .iter()
            .any(|tower| tower.position().distance_squared(position) <= reveal_squared);
        enemy.set_revealed(spotted);
    });
}

/// Selects the enemy `tower` should shoot at under its targeting policy.
#[must_use]
pub fn select_target(tower: &Tower, enemies: &EnemyRoster, waypoints: &[Vec2]) -> Option<EnemyId> {
    let mut best: Option<Candidate> = None;

    for (id, enemy, distance_squared) in in_range(tower, enemies) {
        let current = Candidate {
            enemy: id,
            score: score(tower.targeting(), enemy, distance_squared, waypoints),
        };
        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best.map(|candidate| candidate.enemy)
}

/// Enemies `tower` is allowed to hit, in spawn order.
pub fn targets_in_range<'a>(
    tower: &'a Tower,
    enemies: &'a EnemyRoster,
) -> impl Iterator<Item = EnemyId> + 'a {
    in_range(tower, enemies).map(|(id, _, _)| id)
}

fn in_range<'a>(
    tower: &'a Tower,
    enemies: &'a EnemyRoster,
) -> impl Iterator<Item = (EnemyId, &'a Enemy, f32)> + 'a {
    let origin = tower.position();
    let range_squared = tower.stats().range_squared();
    let can_target_flying = tower.stats().can_target_flying;

    enemies.iter().filter_map(move |(id, enemy)| {
        if !enemy.is_targetable(can_target_flying) {
            return None;
        }
        let distance_squared = enemy.position().distance_squared(origin);
        (distance_squared <= range_squared).then_some((id, enemy, distance_squared))
    })
}

/// Higher scores win under every policy.
fn score(priority: TargetingPriority, enemy: &Enemy, distance_squared: f32, waypoints: &[Vec2]) -> f32 {
    match priority {
        TargetingPriority::First => enemy.progress(waypoints),
        TargetingPriority::Nearest => -distance_squared,
        TargetingPriority::Strongest => enemy.hp(),
        TargetingPriority::Weakest => -enemy.hp(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    enemy: EnemyId,
    score: f32,
}

impl Candidate {
    fn precedes(&self, other: &Self) -> bool {
        self.score > other.score
    }
}
