#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order tick pipeline tying the world, the systems and the economy
//! together.
//!
//! [`Simulation::step`] is the only place the per-tick order is spelled out.
//! Player requests go through the tower interaction methods or through
//! [`apply`], and every outcome is reported as an [`Event`].

mod clock;

use std::time::Duration;

use bastion_core::{
    Balance, CellCoord, Command, EnemyConfig, Event, MapConfig, PlacementError,
    TargetingPriority, TowerActionError, TowerId, TowerInfo, TowerKind, WaveConfig,
};
use bastion_system_economy::Ledger;
use bastion_system_tower_combat::{tick_cooldowns, TowerCombat};
use bastion_system_tower_targeting::reveal_stealth;
use bastion_system_waves::{WaveScheduler, WaveSource};
use bastion_world::World;
use tracing::{debug, trace};

pub use clock::{SimClock, MAX_RAW_DELTA, MAX_STEP, MIN_SPEED};

/// Complete game session: world, wave queue, ledger and clock.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    balance: Balance,
    clock: SimClock,
    waves: WaveScheduler,
    ledger: Ledger,
    combat: TowerCombat,
    spawns: Vec<EnemyConfig>,
    ledger_events: Vec<Event>,
    ticks: u64,
}

impl Simulation {
    /// Creates a session on `map` drawing waves from `waves`.
    #[must_use]
    pub fn new(map: MapConfig, waves: WaveSource, balance: Balance) -> Self {
        let waves = WaveScheduler::new(waves, &balance.bestiary);
        let ledger = Ledger::new(
            balance.starting_gold,
            balance.starting_lives,
            waves.total_waves(),
        );
        Self {
            world: World::new(map),
            balance,
            clock: SimClock::new(),
            waves,
            ledger,
            combat: TowerCombat::new(),
            spawns: Vec::new(),
            ledger_events: Vec::new(),
            ticks: 0,
        }
    }

    /// Advances the session by `dt` simulated seconds.
    ///
    /// Does nothing once the game is over.
    pub fn step(&mut self, dt: f32, out: &mut Vec<Event>) {
        if self.ledger.is_over() {
            return;
        }
        self.ticks += 1;
        let first = out.len();
        let goal_damage = self.balance.goal_damage;

        self.world.pulse_healers(dt);
        self.world.update_enemies(dt);
        self.world.sweep_casualties(goal_damage, out);

        let parts = self.world.parts_mut();
        reveal_stealth(parts.towers, parts.enemies);
        tick_cooldowns(parts.towers, dt);
        let fired = self
            .combat
            .fire(parts.towers, parts.enemies, parts.projectiles, parts.waypoints);
        let impacts = self
            .combat
            .update_projectiles(parts.enemies, parts.projectiles, dt);
        self.world.sweep_casualties(goal_damage, out);

        self.spawns.clear();
        let live = bastion_world::query::live_enemy_count(&self.world);
        self.waves.update(dt, live, &mut self.spawns, out);
        for config in &self.spawns {
            let _ = self.world.spawn_enemy(config, out);
        }

        self.ledger_events.clear();
        self.ledger.handle(&out[first..], &mut self.ledger_events);
        out.append(&mut self.ledger_events);

        trace!(tick = self.ticks, dt, fired, impacts, events = out.len() - first, "step");
    }

    /// Advances the session by a raw wall-clock frame, filtered through the
    /// clock.
    ///
    /// A paused clock yields a zero step; the pipeline still runs.
    pub fn advance(&mut self, raw: Duration, out: &mut Vec<Event>) {
        let dt = self.clock.effective_delta(raw);
        self.step(dt, out);
    }

    /// Clock filtering raw frames.
    pub fn clock_mut(&mut self) -> &mut SimClock {
        &mut self.clock
    }

    /// Starts the next queued wave.
    pub fn start_wave(&mut self, out: &mut Vec<Event>) -> bool {
        if self.ledger.is_over() {
            return false;
        }
        self.waves.start_wave(out)
    }

    /// Appends a wave to the queue; a finite game then needs it cleared to win.
    pub fn add_wave(&mut self, wave: WaveConfig) {
        self.waves.add_wave(wave);
        if !self.waves.is_endless() {
            self.ledger.set_total_waves(self.waves.total_waves());
        }
    }

    /// Builds a level-one tower of `kind` on `cell`, paying its cost.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        out: &mut Vec<Event>,
    ) -> Option<TowerId> {
        match self.try_place(kind, cell, out) {
            Ok(tower) => Some(tower),
            Err(reason) => {
                debug!(?kind, ?cell, %reason, "placement rejected");
                out.push(Event::TowerPlacementRejected { kind, cell, reason });
                None
            }
        }
    }

    /// Advances a tower to its next level, paying the upgrade cost.
    pub fn upgrade_tower(&mut self, tower: TowerId, out: &mut Vec<Event>) -> bool {
        match self.try_upgrade(tower, out) {
            Ok(info) => {
                out.push(Event::TowerUpgraded { info });
                true
            }
            Err(reason) => {
                reject_action(tower, reason, out);
                false
            }
        }
    }

    /// Sells a tower, refunding part of everything invested in it.
    pub fn sell_tower(&mut self, tower: TowerId, out: &mut Vec<Event>) -> Option<u32> {
        match self.try_sell(tower, out) {
            Ok(refund) => Some(refund),
            Err(reason) => {
                reject_action(tower, reason, out);
                None
            }
        }
    }

    /// Describes the tower on `cell`, if any.
    pub fn select_tower(&self, cell: CellCoord, out: &mut Vec<Event>) -> Option<TowerInfo> {
        let tower = bastion_world::query::tower_at(&self.world, cell)?;
        let info = self.describe(tower.id())?;
        out.push(Event::TowerSelected { info });
        Some(info)
    }

    /// Replaces a tower's targeting policy.
    pub fn set_targeting(
        &mut self,
        tower: TowerId,
        priority: TargetingPriority,
        out: &mut Vec<Event>,
    ) -> bool {
        let result = if self.ledger.is_over() {
            Err(TowerActionError::GameOver)
        } else if self.world.set_targeting(tower, priority) {
            Ok(())
        } else {
            Err(TowerActionError::UnknownTower)
        };

        match result {
            Ok(()) => true,
            Err(reason) => {
                reject_action(tower, reason, out);
                false
            }
        }
    }

    /// Moves a tower to the next targeting policy in the cycle and
    /// reselects it.
    pub fn cycle_targeting(
        &mut self,
        tower: TowerId,
        out: &mut Vec<Event>,
    ) -> Option<TargetingPriority> {
        let Some(current) = bastion_world::query::tower(&self.world, tower) else {
            reject_action(tower, TowerActionError::UnknownTower, out);
            return None;
        };
        let next = current.targeting().next();
        if !self.set_targeting(tower, next, out) {
            return None;
        }
        if let Some(info) = self.describe(tower) {
            out.push(Event::TowerSelected { info });
        }
        Some(next)
    }

    fn try_place(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        out: &mut Vec<Event>,
    ) -> Result<TowerId, PlacementError> {
        if self.ledger.is_over() {
            return Err(PlacementError::GameOver);
        }
        let stats = *self
            .balance
            .towers
            .level(kind, 1)
            .ok_or(PlacementError::UnknownKind)?;
        if !self.ledger.can_afford(stats.cost) {
            return Err(PlacementError::InsufficientGold);
        }

        let tower = self.world.place_tower(cell, stats)?;
        let _ = self.ledger.spend(stats.cost, out);
        debug!(tower = tower.get(), ?kind, ?cell, "tower placed");
        out.push(Event::TowerPlaced { tower, kind, cell });
        Ok(tower)
    }

    fn try_upgrade(
        &mut self,
        tower: TowerId,
        out: &mut Vec<Event>,
    ) -> Result<TowerInfo, TowerActionError> {
        if self.ledger.is_over() {
            return Err(TowerActionError::GameOver);
        }
        let current = bastion_world::query::tower(&self.world, tower)
            .ok_or(TowerActionError::UnknownTower)?;
        let next = *self
            .balance
            .towers
            .level(current.kind(), current.level() + 1)
            .ok_or(TowerActionError::MaxLevel)?;
        let cost = current
            .stats()
            .upgrade_cost
            .ok_or(TowerActionError::MaxLevel)?;

        if !self.ledger.spend(cost, out) {
            return Err(TowerActionError::InsufficientGold);
        }
        if !self.world.upgrade_tower(tower, next) {
            return Err(TowerActionError::UnknownTower);
        }
        self.describe(tower).ok_or(TowerActionError::UnknownTower)
    }

    fn try_sell(&mut self, tower: TowerId, out: &mut Vec<Event>) -> Result<u32, TowerActionError> {
        if self.ledger.is_over() {
            return Err(TowerActionError::GameOver);
        }
        let removed = self
            .world
            .remove_tower(tower)
            .ok_or(TowerActionError::UnknownTower)?;

        let refund = sell_refund(removed.total_invested(), self.balance.sell_refund_ratio);
        self.ledger.credit(refund, out);
        out.push(Event::TowerSold {
            tower,
            refund,
            cell: removed.cell(),
        });
        Ok(refund)
    }

    fn describe(&self, tower: TowerId) -> Option<TowerInfo> {
        let state = bastion_world::query::tower(&self.world, tower)?;
        Some(state.info(self.balance.towers.max_level(state.kind())))
    }
}

fn reject_action(tower: TowerId, reason: TowerActionError, out: &mut Vec<Event>) {
    debug!(tower = tower.get(), %reason, "tower action rejected");
    out.push(Event::TowerActionRejected { tower, reason });
}

/// Gold returned for a tower with `invested` gold in it, rounded down.
#[must_use]
pub fn sell_refund(invested: u32, ratio: f32) -> u32 {
    let refund = (f64::from(invested) * f64::from(ratio.max(0.0))).floor();
    refund as u32
}

/// Executes `command` against the session, appending every outcome to `out`.
pub fn apply(simulation: &mut Simulation, command: Command, out: &mut Vec<Event>) {
    match command {
        Command::StartWave => {
            let _ = simulation.start_wave(out);
        }
        Command::AddWave { wave } => simulation.add_wave(wave),
        Command::PlaceTower { kind, cell } => {
            let _ = simulation.place_tower(kind, cell, out);
        }
        Command::UpgradeTower { tower } => {
            let _ = simulation.upgrade_tower(tower, out);
        }
        Command::SellTower { tower } => {
            let _ = simulation.sell_tower(tower, out);
        }
        Command::SelectTower { cell } => {
            let _ = simulation.select_tower(cell, out);
        }
        Command::SetTargeting { tower, priority } => {
            let _ = simulation.set_targeting(tower, priority, out);
        }
        Command::CycleTargeting { tower } => {
            let _ = simulation.cycle_targeting(tower, out);
        }
        Command::SetSpeed { multiplier } => simulation.clock.set_speed(multiplier),
        Command::SetPaused { paused } => {
            if paused {
                simulation.clock.pause();
            } else {
                simulation.clock.resume();
            }
        }
        Command::Tick { dt } => simulation.advance(dt, out),
    }
}

/// Read-only access to a running session.
pub mod query {
    use bastion_core::Balance;
    use bastion_system_economy::Ledger;
    use bastion_system_waves::WaveScheduler;
    use bastion_world::World;

    use super::{SimClock, Simulation};

    /// Entity state of the session.
    #[must_use]
    pub fn world(simulation: &Simulation) -> &World {
        &simulation.world
    }

    /// Gold, lives and outcome.
    #[must_use]
    pub fn ledger(simulation: &Simulation) -> &Ledger {
        &simulation.ledger
    }

    /// Wave queue and its state.
    #[must_use]
    pub fn waves(simulation: &Simulation) -> &WaveScheduler {
        &simulation.waves
    }

    /// Clock filtering raw frames.
    #[must_use]
    pub fn clock(simulation: &Simulation) -> &SimClock {
        &simulation.clock
    }

    /// Balance tables the session was created with.
    #[must_use]
    pub fn balance(simulation: &Simulation) -> &Balance {
        &simulation.balance
    }

    /// Number of pipeline steps executed so far.
    #[must_use]
    pub fn ticks(simulation: &Simulation) -> u64 {
        simulation.ticks
    }
}
