//! Run summary printed when a headless session ends.

use std::fmt;

use bastion_core::Event;
use bastion_simulation::{query, Simulation};
use bastion_system_economy::Outcome;
use serde::Serialize;
use tracing::info;

/// Tally of one headless run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub(crate) struct Summary {
    pub seed: u32,
    pub rows: u32,
    pub cols: u32,
    pub map_digest: String,
    pub waypoints: usize,
    pub towers: usize,
    pub waves_started: u32,
    pub waves_completed: u32,
    pub spawned: u64,
    pub kills: u64,
    pub leaks: u64,
    pub rejections: u64,
    pub gold: u32,
    pub lives: u32,
    pub outcome: &'static str,
    pub ticks: u64,
    pub simulated_seconds: f64,
}

impl Summary {
    /// Folds one batch of simulation events into the tally.
    pub(crate) fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyKilled { .. } => self.kills += 1,
                Event::EnemyReachedGoal { .. } => self.leaks += 1,
                Event::WaveStarted { wave } => {
                    self.waves_started = *wave;
                    info!(wave, "wave started");
                }
                Event::WaveCompleted { wave } => {
                    self.waves_completed = *wave;
                    info!(wave, "wave completed");
                }
                Event::TowerPlacementRejected { .. } | Event::TowerActionRejected { .. } => {
                    self.rejections += 1;
                }
                Event::GameOver { win } => info!(win, "game over"),
                _ => {}
            }
        }
    }

    /// Copies the final ledger and tower state out of `simulation`.
    pub(crate) fn finish(&mut self, simulation: &Simulation) {
        let ledger = query::ledger(simulation);
        self.gold = ledger.gold();
        self.lives = ledger.lives();
        self.outcome = outcome_label(ledger.outcome());
        self.ticks = query::ticks(simulation);
        self.towers = bastion_world::query::towers(query::world(simulation)).len();
    }
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::InProgress => "in progress",
        Outcome::Won => "won",
        Outcome::Lost => "lost",
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "map       {}x{} seed {} ({})", self.cols, self.rows, self.seed, self.map_digest)?;
        writeln!(f, "waypoints {}", self.waypoints)?;
        writeln!(f, "towers    {}", self.towers)?;
        writeln!(
            f,
            "waves     {} started, {} completed",
            self.waves_started, self.waves_completed
        )?;
        writeln!(
            f,
            "enemies   {} spawned, {} killed, {} leaked",
            self.spawned, self.kills, self.leaks
        )?;
        writeln!(f, "gold      {}", self.gold)?;
        writeln!(f, "lives     {}", self.lives)?;
        writeln!(
            f,
            "time      {:.1}s over {} ticks",
            self.simulated_seconds, self.ticks
        )?;
        write!(f, "outcome   {}", self.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::EnemyId;

    #[test]
    fn events_are_tallied() {
        let mut summary = Summary::default();
        summary.record(&[
            Event::WaveStarted { wave: 1 },
            Event::EnemySpawned {
                enemy: EnemyId::default(),
            },
            Event::EnemySpawned {
                enemy: EnemyId::default(),
            },
            Event::EnemyKilled {
                enemy: EnemyId::default(),
                reward: 10,
            },
            Event::EnemyReachedGoal {
                enemy: EnemyId::default(),
                damage: 1,
            },
            Event::WaveCompleted { wave: 1 },
        ]);

        assert_eq!(summary.waves_started, 1);
        assert_eq!(summary.waves_completed, 1);
        assert_eq!(summary.spawned, 2);
        assert_eq!(summary.kills, 1);
        assert_eq!(summary.leaks, 1);
    }

    #[test]
    fn display_ends_with_the_outcome() {
        let summary = Summary {
            outcome: "won",
            ..Summary::default()
        };
        let text = summary.to_string();
        assert!(text.ends_with("outcome   won"));
        assert!(text.starts_with("map       0x0 seed 0"));
    }
}
