use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use bastion_core::{
    Balance, CellCoord, CellKind, Command, EnemyKind, Event, MapConfig, TowerKind, WaveConfig,
    WaveEntry,
};
use bastion_simulation::{apply, query, Simulation};
use bastion_system_map_generation::generate;
use bastion_system_waves::WaveSource;

const FRAME: Duration = Duration::from_millis(16);
const FRAMES: usize = 3_000;

#[test]
fn identical_scripts_replay_identically() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first.events, second.events, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.ticks, second.ticks);

    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::WaveStarted { wave: 1 })));
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { .. })));
}

#[test]
fn waves_complete_only_once_the_field_is_clear() {
    let outcome = replay(scripted_commands());
    let mut live: i64 = 0;
    let mut completed = Vec::new();

    for event in &outcome.events {
        match event {
            Event::EnemySpawned { .. } => live += 1,
            Event::EnemyKilled { .. } | Event::EnemyReachedGoal { .. } => live -= 1,
            Event::WaveCompleted { wave } => {
                assert_eq!(live, 0, "wave {wave} completed with enemies alive");
                completed.push(*wave);
            }
            _ => {}
        }
        assert!(live >= 0, "more removals than spawns");
    }

    let expected: Vec<u32> = (1..=u32::try_from(completed.len()).expect("few waves")).collect();
    assert_eq!(completed, expected, "each wave completes exactly once, in order");
}

#[derive(Debug)]
struct ReplayOutcome {
    events: Vec<Event>,
    ticks: u64,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for event in &self.events {
            format!("{event:?}").hash(&mut hasher);
        }
        self.ticks.hash(&mut hasher);
        hasher.finish()
    }
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let map = generate(12, 12, 20, 42);
    let balance = Balance {
        starting_gold: 1_000,
        starting_lives: 50,
        ..Balance::default()
    };
    let mut simulation = Simulation::new(map, WaveSource::Fixed(waves(&balance)), balance);
    let mut events = Vec::new();

    for command in commands {
        apply(&mut simulation, command, &mut events);
    }
    for frame in 0..FRAMES {
        if frame % 400 == 0 {
            apply(&mut simulation, Command::StartWave, &mut events);
        }
        apply(&mut simulation, Command::Tick { dt: FRAME }, &mut events);
    }

    ReplayOutcome {
        events,
        ticks: query::ticks(&simulation),
    }
}

fn waves(balance: &Balance) -> Vec<WaveConfig> {
    let bestiary = &balance.bestiary;
    let batch = |kind, count, interval| WaveEntry::new(count, interval, *bestiary.get(kind));
    vec![
        WaveConfig::new(vec![
            batch(EnemyKind::Basic, 4, 0.6),
            batch(EnemyKind::Fast, 3, 0.4),
        ]),
        WaveConfig::new(vec![
            batch(EnemyKind::Healer, 1, 1.0),
            batch(EnemyKind::Splitter, 2, 0.8),
            batch(EnemyKind::Flying, 2, 0.8),
            batch(EnemyKind::Stealth, 2, 0.8),
        ]),
    ]
}

fn scripted_commands() -> Vec<Command> {
    let map = generate(12, 12, 20, 42);

    let mut commands: Vec<Command> = beside_path(&map)
        .into_iter()
        .step_by(3)
        .zip(TowerKind::ALL)
        .map(|(cell, kind)| Command::PlaceTower { kind, cell })
        .collect();
    commands.push(Command::SetSpeed { multiplier: 2.0 });
    commands
}

/// Buildable cells touching the path, in row-major order.
fn beside_path(map: &MapConfig) -> Vec<CellCoord> {
    map.cells()
        .filter(|&(cell, kind)| {
            kind == CellKind::Buildable
                && map
                    .neighbors(cell)
                    .any(|neighbor| map.cell(neighbor).is_some_and(CellKind::is_path))
        })
        .map(|(cell, _)| cell)
        .collect()
}
