//! TOML scenario files describing a headless run.

use std::path::Path;

use anyhow::{Context, Result};
use bastion_core::{Balance, Bestiary, CellCoord, EnemyKind, TowerKind, WaveConfig, WaveEntry};
use bastion_system_map_generation::MapRequest;
use bastion_system_waves::{endless_wave, WaveSource};
use serde::Deserialize;

/// Number of endless waves used as the campaign when a scenario lists none.
const DEFAULT_CAMPAIGN_WAVES: u32 = 5;

/// Complete description of a headless run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Scenario {
    pub map: MapRequest,
    pub endless: bool,
    pub auto_start: bool,
    pub speed: f32,
    pub tick_rate: u32,
    pub duration: f32,
    pub balance: Balance,
    pub waves: Vec<WaveSpec>,
    pub towers: Vec<TowerSpec>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            map: MapRequest::default(),
            endless: false,
            auto_start: true,
            speed: 1.0,
            tick_rate: 60,
            duration: 300.0,
            balance: Balance::default(),
            waves: Vec::new(),
            towers: Vec::new(),
        }
    }
}

/// One authored wave.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct WaveSpec {
    pub entries: Vec<EntrySpec>,
}

/// One batch of an authored wave, referencing a bestiary template.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub(crate) struct EntrySpec {
    pub enemy: EnemyKind,
    pub count: u32,
    pub interval: f32,
    #[serde(default)]
    pub hp: Option<f32>,
}

/// Tower placed before the first wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct TowerSpec {
    pub kind: TowerKind,
    pub column: u32,
    pub row: u32,
}

impl TowerSpec {
    pub(crate) const fn cell(&self) -> CellCoord {
        CellCoord::new(self.column, self.row)
    }
}

impl Scenario {
    /// Reads a scenario from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scenario: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse scenario: {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid scenario toml")
    }

    /// Wave source for the simulation.
    ///
    /// Without authored waves a finite scenario plays the first endless waves
    /// as a short campaign.
    pub(crate) fn wave_source(&self) -> WaveSource {
        if self.endless {
            return WaveSource::Endless;
        }
        let bestiary = &self.balance.bestiary;
        if self.waves.is_empty() {
            let campaign = (1..=DEFAULT_CAMPAIGN_WAVES)
                .map(|wave| endless_wave(wave, bestiary))
                .collect();
            return WaveSource::Fixed(campaign);
        }
        WaveSource::Fixed(self.waves.iter().map(|wave| wave.build(bestiary)).collect())
    }
}

impl WaveSpec {
    fn build(&self, bestiary: &Bestiary) -> WaveConfig {
        WaveConfig::new(
            self.entries
                .iter()
                .map(|entry| {
                    let mut enemy = *bestiary.get(entry.enemy);
                    if let Some(hp) = entry.hp {
                        enemy.stats.hp = hp;
                    }
                    WaveEntry::new(entry.count, entry.interval, enemy)
                })
                .collect(),
        )
    }
}
