//! Procedural waves for endless play.

use bastion_core::{Bestiary, EnemyConfig, WaveConfig, WaveEntry};

const MAX_BASE_COUNT: u32 = 50;

/// Builds endless wave `wave` (1-based) from the templates in `bestiary`.
///
/// Hit points grow by 15% per wave, the basic batch grows by 1.2 enemies per
/// wave up to fifty, and the heavier archetypes join on fixed wave cadences.
/// Batches whose computed size is zero are left out.
#[must_use]
pub fn endless_wave(wave: u32, bestiary: &Bestiary) -> WaveConfig {
    let n = wave.max(1);
    let scale = 1.0 + f64::from(n - 1) * 0.15;
    let haste = 1.0 + n as f32 * 0.01;
    let base = MAX_BASE_COUNT.min(4 + n * 6 / 5);

    let mut entries = Vec::new();
    let mut push = |count: u32, interval: f32, enemy: EnemyConfig| {
        if count > 0 {
            entries.push(WaveEntry::new(count, interval, enemy));
        }
    };

    let basic_interval = (0.8 - f64::from(n) * 0.02).max(0.25) as f32;
    push(base, basic_interval, scaled(&bestiary.basic, scale, haste));

    if n >= 2 {
        push(base / 2, 0.5, scaled(&bestiary.fast, scale, haste));
    }
    if n >= 4 && n % 2 == 0 {
        push(n / 3, 1.2, scaled(&bestiary.tank, scale, 1.0));
    }
    if n >= 5 && n % 3 == 0 {
        push(n / 4, 1.0, scaled(&bestiary.shielded, scale, 1.0));
    }
    if n >= 6 && n % 2 == 1 {
        push((n / 4).max(2), 0.8, scaled(&bestiary.flying, scale, 1.0));
    }
    if n >= 8 && n % 4 == 0 {
        push((n / 6).max(1), 1.5, scaled(&bestiary.healer, scale, 1.0));
    }
    if n >= 10 && n % 5 == 0 {
        push((n / 8).max(1), 1.5, scaled(&bestiary.splitter, scale, 1.0));
    }
    if n >= 7 && n % 3 == 1 {
        push((n / 5).max(2), 0.8, scaled(&bestiary.stealth, scale, 1.0));
    }
    if n >= 10 && n % 10 == 0 {
        push(1 + n / 20, 2.0, scaled(&bestiary.boss, scale * 1.5, 1.0));
    }

    WaveConfig::new(entries)
}

fn scaled(template: &EnemyConfig, hp_scale: f64, speed_multiplier: f32) -> EnemyConfig {
    let hp = (f64::from(template.stats.hp) * hp_scale).round() as f32;
    template.scaled(hp, speed_multiplier)
}
