#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that releases enemies batch by batch.
//!
//! The scheduler never touches the world. Each update hands back the enemy
//! templates that are due, and the caller spawns them and reports the live
//! enemy count on the next update so the scheduler can detect a cleared wave.

mod endless;

use bastion_core::{Bestiary, EnemyConfig, Event, WaveConfig};
use tracing::debug;

pub use endless::endless_wave;

/// Number of endless waves queued before play begins.
pub const ENDLESS_SEED_WAVES: u32 = 3;

/// Where the scheduler draws its waves from.
#[derive(Clone, Debug, PartialEq)]
pub enum WaveSource {
    /// A finite list of authored waves.
    Fixed(Vec<WaveConfig>),
    /// Procedurally generated waves that never run out.
    Endless,
}

/// Lifecycle of the wave currently in play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WaveState {
    /// Waiting for the next wave to be started.
    #[default]
    Idle,
    /// Releasing the enemies of the current wave.
    Spawning,
    /// Every enemy was released; waiting for the field to clear.
    Active,
    /// The queue is exhausted.
    Done,
}

#[derive(Clone, Debug)]
struct EndlessGenerator {
    bestiary: Bestiary,
    generated: u32,
}

impl EndlessGenerator {
    fn next_wave(&mut self) -> WaveConfig {
        self.generated += 1;
        endless_wave(self.generated, &self.bestiary)
    }
}

/// State machine driving `idle → spawning → active → {idle | done}`.
#[derive(Clone, Debug)]
pub struct WaveScheduler {
    waves: Vec<WaveConfig>,
    endless: Option<EndlessGenerator>,
    state: WaveState,
    current: usize,
    entry: usize,
    spawned: u32,
    timer: f32,
}

impl WaveScheduler {
    /// Creates a scheduler over `source`; endless mode seeds the first waves
    /// from `bestiary`.
    #[must_use]
    pub fn new(source: WaveSource, bestiary: &Bestiary) -> Self {
        let (waves, endless) = match source {
            WaveSource::Fixed(waves) => (waves, None),
            WaveSource::Endless => {
                let mut generator = EndlessGenerator {
                    bestiary: bestiary.clone(),
                    generated: 0,
                };
                let waves = (0..ENDLESS_SEED_WAVES)
                    .map(|_| generator.next_wave())
                    .collect();
                (waves, Some(generator))
            }
        };

        Self {
            waves,
            endless,
            state: WaveState::Idle,
            current: 0,
            entry: 0,
            spawned: 0,
            timer: 0.0,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> WaveState {
        self.state
    }

    /// Reports whether a wave may be started.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == WaveState::Idle
    }

    /// Reports whether every queued wave has been completed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == WaveState::Done
    }

    /// Reports whether waves are generated without end.
    #[must_use]
    pub const fn is_endless(&self) -> bool {
        self.endless.is_some()
    }

    /// Number of waves completed so far.
    #[must_use]
    pub fn completed_waves(&self) -> u32 {
        u32::try_from(self.current).unwrap_or(u32::MAX)
    }

    /// Number of waves queued, including completed ones; `None` in endless mode.
    #[must_use]
    pub fn total_waves(&self) -> Option<u32> {
        if self.endless.is_some() {
            None
        } else {
            Some(u32::try_from(self.waves.len()).unwrap_or(u32::MAX))
        }
    }

    /// Waves queued, including completed ones.
    #[must_use]
    pub fn waves(&self) -> &[WaveConfig] {
        &self.waves
    }

    /// Appends a wave to the queue without disturbing the current state.
    ///
    /// `Done` is terminal: a wave added after the queue drained is recorded
    /// but never started.
    pub fn add_wave(&mut self, wave: WaveConfig) {
        self.waves.push(wave);
    }

    /// Starts the next queued wave.
    ///
    /// Only succeeds while idle with at least one wave left; emits
    /// [`Event::WaveStarted`] with the 1-based wave number.
    pub fn start_wave(&mut self, out: &mut Vec<Event>) -> bool {
        if self.state != WaveState::Idle || self.current >= self.waves.len() {
            return false;
        }

        self.state = WaveState::Spawning;
        self.entry = 0;
        self.spawned = 0;
        self.timer = 0.0;

        let wave = self.wave_number();
        debug!(wave, "wave started");
        out.push(Event::WaveStarted { wave });
        true
    }

    /// Advances the scheduler by `dt` seconds.
    ///
    /// Templates due for release are appended to `spawns` in release order.
    /// `live_enemies` is the number of enemies still on the field; an active
    /// wave completes on the first update that observes zero.
    pub fn update(
        &mut self,
        dt: f32,
        live_enemies: usize,
        spawns: &mut Vec<EnemyConfig>,
        out: &mut Vec<Event>,
    ) {
        match self.state {
            WaveState::Spawning => self.release_due(dt, spawns),
            WaveState::Active if live_enemies == 0 => self.complete(out),
            WaveState::Idle | WaveState::Active | WaveState::Done => {}
        }
    }

    fn release_due(&mut self, dt: f32, spawns: &mut Vec<EnemyConfig>) {
        self.timer -= dt;
        let entries = self
            .waves
            .get(self.current)
            .map_or(&[][..], |wave| wave.entries.as_slice());

        loop {
            let Some(entry) = entries.get(self.entry) else {
                self.state = WaveState::Active;
                debug!(wave = self.wave_number(), "wave fully released");
                return;
            };
            if self.spawned >= entry.count {
                self.entry += 1;
                self.spawned = 0;
                continue;
            }
            if self.timer > 0.0 {
                return;
            }

            spawns.push(entry.enemy);
            self.spawned += 1;
            self.timer += entry.spawn_interval.max(0.0);
        }
    }

    fn complete(&mut self, out: &mut Vec<Event>) {
        let wave = self.wave_number();
        out.push(Event::WaveCompleted { wave });
        self.current += 1;

        if let Some(generator) = &mut self.endless {
            self.waves.push(generator.next_wave());
        }

        self.state = if self.current < self.waves.len() {
            WaveState::Idle
        } else {
            WaveState::Done
        };
        debug!(wave, state = ?self.state, "wave completed");
    }

    fn wave_number(&self) -> u32 {
        u32::try_from(self.current + 1).unwrap_or(u32::MAX)
    }
}
