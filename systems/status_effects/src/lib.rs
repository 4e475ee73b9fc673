#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-enemy slow and poison bookkeeping.
//!
//! Every enemy embeds one [`StatusEffects`] value. Slows do not stack: the
//! strongest active factor wins and the timer is refreshed to the longer of the
//! two durations. Poison stacks up to the configured cap; at the cap the oldest
//! stack is refreshed in place instead of a new one being pushed.
//!
//! The effects are owned by the enemy and mutated in place during the enemy
//! update, before movement reads the slow factor of the same tick.

use bastion_core::PoisonConfig;

/// Independent timed poison instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoisonStack {
    damage: f32,
    tick_rate: f32,
    remaining: f32,
    accumulator: f32,
}

impl PoisonStack {
    /// Damage dealt each time the stack ticks.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Seconds between ticks.
    #[must_use]
    pub const fn tick_rate(&self) -> f32 {
        self.tick_rate
    }

    /// Seconds before the stack expires.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Seconds accumulated towards the next tick.
    #[must_use]
    pub const fn accumulator(&self) -> f32 {
        self.accumulator
    }
}

/// Summary of a single [`StatusEffects::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Poison damage dealt during the tick.
    pub poison_damage: f32,
    /// Whether at least one poison stack expired.
    pub poison_expired: bool,
    /// Whether a poison tick killed the owner.
    pub killed: bool,
}

/// Slow and poison state owned by a single enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusEffects {
    slow_factor: f32,
    slow_remaining: f32,
    poison: Vec<PoisonStack>,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self {
            slow_factor: 1.0,
            slow_remaining: 0.0,
            poison: Vec::new(),
        }
    }
}

impl StatusEffects {
    /// Creates an empty effect set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Multiplier currently applied to movement speed.
    #[must_use]
    pub const fn slow_factor(&self) -> f32 {
        self.slow_factor
    }

    /// Seconds before the active slow expires.
    #[must_use]
    pub const fn slow_remaining(&self) -> f32 {
        self.slow_remaining
    }

    /// Active poison stacks, oldest first.
    #[must_use]
    pub fn poison_stacks(&self) -> &[PoisonStack] {
        &self.poison
    }

    /// Applies a slow.
    ///
    /// The factor replaces the active one only when it is stronger or no slow
    /// is active; the remaining time becomes the longer of the two durations.
    pub fn apply_slow(&mut self, factor: f32, duration: f32) {
        let factor = factor.clamp(f32::MIN_POSITIVE, 1.0);
        if factor < self.slow_factor || self.slow_remaining <= 0.0 {
            self.slow_factor = factor;
        }
        self.slow_remaining = self.slow_remaining.max(duration);
    }

    /// Applies a poison stack, refreshing the oldest one when at the cap.
    ///
    /// A refresh overwrites damage, duration and tick rate but keeps the
    /// oldest stack's tick accumulator.
    pub fn apply_poison(&mut self, config: &PoisonConfig) {
        let cap = usize::try_from(config.max_stacks).unwrap_or(usize::MAX);
        if cap == 0 {
            return;
        }

        if self.poison.len() < cap {
            self.poison.push(PoisonStack {
                damage: config.damage,
                tick_rate: config.tick_rate,
                remaining: config.duration,
                accumulator: 0.0,
            });
        } else if let Some(oldest) = self.poison.first_mut() {
            oldest.damage = config.damage;
            oldest.tick_rate = config.tick_rate;
            oldest.remaining = config.duration;
        }
    }

    /// Advances every effect by `dt` seconds.
    ///
    /// `apply_damage` receives each poison tick and returns whether the owner
    /// is still alive; the first lethal tick ends the update immediately.
    pub fn tick(&mut self, dt: f32, mut apply_damage: impl FnMut(f32) -> bool) -> TickReport {
        let mut report = TickReport::default();

        if self.slow_remaining > 0.0 {
            self.slow_remaining -= dt;
            if self.slow_remaining <= 0.0 {
                self.slow_remaining = 0.0;
                self.slow_factor = 1.0;
            }
        }

        let mut index = 0;
        while index < self.poison.len() {
            let stack = &mut self.poison[index];
            stack.remaining -= dt;
            stack.accumulator += dt;
            if stack.accumulator >= stack.tick_rate {
                stack.accumulator -= stack.tick_rate;
                report.poison_damage += stack.damage;
                if !apply_damage(stack.damage) {
                    report.killed = true;
                    return report;
                }
            }

            if self.poison[index].remaining <= 0.0 {
                let _ = self.poison.remove(index);
                report.poison_expired = true;
            } else {
                index += 1;
            }
        }

        report
    }
}
