#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bastion simulation.
//!
//! This crate defines the vocabulary that connects adapters, the authoritative
//! world, and the pure systems. Adapters submit [`Command`] values describing
//! desired actions, the simulation executes those commands, and then broadcasts
//! [`Event`] values describing every observable outcome. Configuration records
//! for maps, towers, enemies and waves live here so that every crate agrees on
//! a single data-driven description of the game.

mod balance;
mod map;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use balance::{
    Balance, Bestiary, ChainConfig, EnemyConfig, EnemyKind, EnemyStats, HealConfig, PoisonConfig,
    SlowConfig, SplashConfig, SplitConfig, StealthConfig, TowerCatalog, TowerConfig, TowerKind,
    WaveConfig, WaveEntry,
};
pub use map::{CellCoord, CellKind, MapConfig, MapShapeError, NEIGHBOR_OFFSETS};

slotmap::new_key_type! {
    /// Generational handle referencing an enemy stored in the world.
    ///
    /// Handles of removed enemies never resolve again, even when their slot is
    /// reused.
    pub struct EnemyId;
}

/// Unique identifier assigned to each tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Policy a tower uses to choose among enemies in range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingPriority {
    /// Enemy furthest along the path.
    #[default]
    First,
    /// Enemy closest to the tower.
    Nearest,
    /// Enemy with the most hit points remaining.
    Strongest,
    /// Enemy with the fewest hit points remaining.
    Weakest,
}

impl TargetingPriority {
    /// Next policy in the cycle First, Nearest, Strongest, Weakest.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::First => Self::Nearest,
            Self::Nearest => Self::Strongest,
            Self::Strongest => Self::Weakest,
            Self::Weakest => Self::First,
        }
    }
}

/// Hit points of an enemy, clamped to `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Creates full health with the provided maximum.
    #[must_use]
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Reports whether any hit points remain.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Reports whether the current value sits below the maximum.
    #[must_use]
    pub fn is_wounded(&self) -> bool {
        self.current < self.max
    }

    /// Removes hit points, never dropping below zero. Returns whether life remains.
    pub fn damage(&mut self, amount: f32) -> bool {
        self.current = (self.current - amount.max(0.0)).max(0.0);
        self.is_alive()
    }

    /// Restores hit points, never exceeding the maximum.
    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }
}

/// Plain-data description of a tower, carried by selection and upgrade events.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerInfo {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Cell the tower occupies.
    pub cell: CellCoord,
    /// Current 1-based level.
    pub level: u32,
    /// Highest level available for the kind.
    pub max_level: u32,
    /// Active targeting policy.
    pub targeting: TargetingPriority,
    /// Gold spent on construction and upgrades so far.
    pub total_invested: u32,
    /// Stats of the current level.
    pub stats: TowerConfig,
}

/// Reasons a tower placement request is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The game already ended.
    #[error("the game is over")]
    GameOver,
    /// The player cannot pay for the tower.
    #[error("not enough gold")]
    InsufficientGold,
    /// No level is configured for the requested kind.
    #[error("tower kind has no configured levels")]
    UnknownKind,
    /// The cell lies outside the map.
    #[error("cell lies outside the map")]
    OutOfBounds,
    /// The cell is part of the enemy path.
    #[error("cell is not buildable")]
    NotBuildable,
    /// Another tower already occupies the cell.
    #[error("cell is already occupied")]
    Occupied,
}

/// Reasons an upgrade, sale or targeting request is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerActionError {
    /// The game already ended.
    #[error("the game is over")]
    GameOver,
    /// No tower with the identifier exists.
    #[error("tower does not exist")]
    UnknownTower,
    /// The tower is already at its final level.
    #[error("tower is already at its final level")]
    MaxLevel,
    /// The player cannot pay for the upgrade.
    #[error("not enough gold")]
    InsufficientGold,
}

/// Commands that express every action an adapter may request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Starts the next queued wave when the scheduler is idle.
    StartWave,
    /// Appends a wave to the scheduler queue.
    AddWave {
        /// Wave appended to the queue.
        wave: WaveConfig,
    },
    /// Requests construction of a tower at the provided cell.
    PlaceTower {
        /// Kind of tower to construct.
        kind: TowerKind,
        /// Cell the tower should occupy.
        cell: CellCoord,
    },
    /// Requests that a tower advance to its next level.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Requests that a tower be sold for a partial refund.
    SellTower {
        /// Tower to sell.
        tower: TowerId,
    },
    /// Requests a description of the tower at the provided cell.
    SelectTower {
        /// Cell to inspect.
        cell: CellCoord,
    },
    /// Replaces a tower's targeting policy.
    SetTargeting {
        /// Tower to reconfigure.
        tower: TowerId,
        /// Policy to apply.
        priority: TargetingPriority,
    },
    /// Advances a tower's targeting policy to the next one in the cycle.
    CycleTargeting {
        /// Tower to reconfigure.
        tower: TowerId,
    },
    /// Changes the simulation speed multiplier.
    SetSpeed {
        /// Requested multiplier, clamped to at least 0.25.
        multiplier: f32,
    },
    /// Pauses or resumes the simulation clock.
    SetPaused {
        /// Whether the clock should be paused.
        paused: bool,
    },
    /// Advances the simulation by a raw wall-clock delta.
    Tick {
        /// Unscaled time elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// An enemy entered the map.
    EnemySpawned {
        /// Handle of the new enemy.
        enemy: EnemyId,
    },
    /// An enemy died and was removed.
    EnemyKilled {
        /// Handle of the removed enemy.
        enemy: EnemyId,
        /// Gold granted for the kill.
        reward: u32,
    },
    /// An enemy reached the goal and was removed.
    EnemyReachedGoal {
        /// Handle of the removed enemy.
        enemy: EnemyId,
        /// Lives the player loses.
        damage: u32,
    },
    /// A wave began spawning.
    WaveStarted {
        /// 1-based wave number.
        wave: u32,
    },
    /// Every enemy of a wave was spawned and cleared.
    WaveCompleted {
        /// 1-based wave number.
        wave: u32,
    },
    /// A tower was constructed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of the tower.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: CellCoord,
    },
    /// A tower was inspected or had its targeting policy cycled.
    TowerSelected {
        /// Description of the tower.
        info: TowerInfo,
    },
    /// A tower advanced to its next level.
    TowerUpgraded {
        /// Description of the tower after the upgrade.
        info: TowerInfo,
    },
    /// A tower was sold.
    TowerSold {
        /// Identifier of the sold tower.
        tower: TowerId,
        /// Gold refunded to the player.
        refund: u32,
        /// Cell the tower occupied.
        cell: CellCoord,
    },
    /// A placement request was rejected.
    TowerPlacementRejected {
        /// Kind of tower requested.
        kind: TowerKind,
        /// Cell requested.
        cell: CellCoord,
        /// Why the request failed.
        reason: PlacementError,
    },
    /// An upgrade, sale or targeting request was rejected.
    TowerActionRejected {
        /// Tower named by the request.
        tower: TowerId,
        /// Why the request failed.
        reason: TowerActionError,
    },
    /// The player's gold changed.
    GoldChanged {
        /// Gold after the change.
        gold: u32,
    },
    /// The player's lives changed.
    LivesChanged {
        /// Lives after the change.
        lives: u32,
    },
    /// The game ended.
    GameOver {
        /// Whether the player won.
        win: bool,
    },
}
