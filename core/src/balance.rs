//! Configuration records for towers, enemies and waves plus the default balance tables.

use serde::{Deserialize, Serialize};

/// Kinds of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap single-target projectile tower.
    Arrow,
    /// Slow projectile tower dealing area damage. Cannot hit flyers.
    Cannon,
    /// Projectile tower that slows its targets.
    Frost,
    /// Projectile tower whose hits chain to nearby enemies.
    Lightning,
    /// Projectile tower that applies stacking poison.
    Poison,
    /// Long-range, slow-firing, high-damage projectile tower.
    Sniper,
    /// Pulse tower that damages every valid enemy in range at once.
    Tesla,
}

impl TowerKind {
    /// Every tower kind in catalog order.
    pub const ALL: [TowerKind; 7] = [
        TowerKind::Arrow,
        TowerKind::Cannon,
        TowerKind::Frost,
        TowerKind::Lightning,
        TowerKind::Poison,
        TowerKind::Sniper,
        TowerKind::Tesla,
    ];
}

/// Area damage around the impact point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplashConfig {
    /// Radius in world units measured from the impact point.
    pub radius: f32,
}

/// Movement slow applied on hit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowConfig {
    /// Multiplier applied to movement speed, in `(0, 1]`.
    pub factor: f32,
    /// Seconds the slow remains active.
    pub duration: f32,
}

/// Greedy chain hops following a primary hit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Maximum number of hops after the primary target.
    pub count: u32,
    /// Maximum distance between consecutive hops.
    pub range: f32,
    /// Multiplier applied to the damage before every hop.
    pub falloff: f32,
}

/// Poison stack applied on hit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoisonConfig {
    /// Damage dealt whenever the stack ticks.
    pub damage: f32,
    /// Seconds the stack remains active.
    pub duration: f32,
    /// Seconds between ticks.
    pub tick_rate: f32,
    /// Maximum number of simultaneous stacks on one enemy.
    pub max_stacks: u32,
}

/// Static stats for one level of a tower.
///
/// Delivery and on-hit behaviour are data: a tower is a pulse tower when
/// `pulse` is set, otherwise it fires projectiles whose impact applies every
/// configured modifier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerConfig {
    /// Kind of tower this level belongs to.
    pub kind: TowerKind,
    /// Damage dealt to the primary target.
    pub damage: f32,
    /// Targeting range in world units.
    pub range: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Gold required to construct the tower at this level.
    pub cost: u32,
    /// Projectile speed in world units per second. Ignored by pulse towers.
    #[serde(default)]
    pub projectile_speed: f32,
    /// Gold required to reach the next level, absent on the final level.
    #[serde(default)]
    pub upgrade_cost: Option<u32>,
    /// Whether flying enemies are valid targets.
    #[serde(default = "default_true")]
    pub can_target_flying: bool,
    /// Whether the tower damages every valid enemy in range instead of firing.
    #[serde(default)]
    pub pulse: bool,
    /// Area damage modifier.
    #[serde(default)]
    pub splash: Option<SplashConfig>,
    /// Slow modifier.
    #[serde(default)]
    pub slow: Option<SlowConfig>,
    /// Chain modifier.
    #[serde(default)]
    pub chain: Option<ChainConfig>,
    /// Poison modifier.
    #[serde(default)]
    pub poison: Option<PoisonConfig>,
}

fn default_true() -> bool {
    true
}

impl TowerConfig {
    /// Creates a projectile tower level without modifiers.
    #[must_use]
    pub const fn projectile(
        kind: TowerKind,
        damage: f32,
        range: f32,
        fire_rate: f32,
        cost: u32,
        projectile_speed: f32,
    ) -> Self {
        Self {
            kind,
            damage,
            range,
            fire_rate,
            cost,
            projectile_speed,
            upgrade_cost: None,
            can_target_flying: true,
            pulse: false,
            splash: None,
            slow: None,
            chain: None,
            poison: None,
        }
    }

    /// Creates a pulse tower level.
    #[must_use]
    pub const fn pulse(kind: TowerKind, damage: f32, range: f32, fire_rate: f32, cost: u32) -> Self {
        let mut config = Self::projectile(kind, damage, range, fire_rate, cost, 0.0);
        config.pulse = true;
        config
    }

    /// Sets the gold required to reach the next level.
    #[must_use]
    pub const fn with_upgrade_cost(mut self, upgrade_cost: u32) -> Self {
        self.upgrade_cost = Some(upgrade_cost);
        self
    }

    /// Excludes flying enemies from targeting.
    #[must_use]
    pub const fn ground_only(mut self) -> Self {
        self.can_target_flying = false;
        self
    }

    /// Adds area damage around the impact point.
    #[must_use]
    pub const fn with_splash(mut self, radius: f32) -> Self {
        self.splash = Some(SplashConfig { radius });
        self
    }

    /// Adds a slow applied on hit.
    #[must_use]
    pub const fn with_slow(mut self, factor: f32, duration: f32) -> Self {
        self.slow = Some(SlowConfig { factor, duration });
        self
    }

    /// Adds chain hops after the primary hit.
    #[must_use]
    pub const fn with_chain(mut self, count: u32, range: f32, falloff: f32) -> Self {
        self.chain = Some(ChainConfig {
            count,
            range,
            falloff,
        });
        self
    }

    /// Adds a poison stack applied on hit.
    #[must_use]
    pub const fn with_poison(mut self, poison: PoisonConfig) -> Self {
        self.poison = Some(poison);
        self
    }

    /// Squared targeting range.
    #[must_use]
    pub fn range_squared(&self) -> f32 {
        self.range * self.range
    }

    /// Seconds between shots. Towers with a non-positive fire rate never recover.
    #[must_use]
    pub fn cooldown(&self) -> f32 {
        if self.fire_rate > 0.0 {
            1.0 / self.fire_rate
        } else {
            f32::INFINITY
        }
    }
}

/// Per-level tables for every tower kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerCatalog {
    /// Arrow tower levels.
    pub arrow: Vec<TowerConfig>,
    /// Cannon tower levels.
    pub cannon: Vec<TowerConfig>,
    /// Frost tower levels.
    pub frost: Vec<TowerConfig>,
    /// Lightning tower levels.
    pub lightning: Vec<TowerConfig>,
    /// Poison tower levels.
    pub poison: Vec<TowerConfig>,
    /// Sniper tower levels.
    pub sniper: Vec<TowerConfig>,
    /// Tesla tower levels.
    pub tesla: Vec<TowerConfig>,
}

impl TowerCatalog {
    /// Every configured level for `kind`, first level first.
    #[must_use]
    pub fn levels(&self, kind: TowerKind) -> &[TowerConfig] {
        match kind {
            TowerKind::Arrow => &self.arrow,
            TowerKind::Cannon => &self.cannon,
            TowerKind::Frost => &self.frost,
            TowerKind::Lightning => &self.lightning,
            TowerKind::Poison => &self.poison,
            TowerKind::Sniper => &self.sniper,
            TowerKind::Tesla => &self.tesla,
        }
    }

    /// Stats for the 1-based `level` of `kind`.
    #[must_use]
    pub fn level(&self, kind: TowerKind, level: u32) -> Option<&TowerConfig> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        self.levels(kind).get(index)
    }

    /// Number of levels configured for `kind`.
    #[must_use]
    pub fn max_level(&self, kind: TowerKind) -> u32 {
        u32::try_from(self.levels(kind).len()).unwrap_or(u32::MAX)
    }
}

impl Default for TowerCatalog {
    fn default() -> Self {
        use TowerKind::{Arrow, Cannon, Frost, Lightning, Poison, Sniper, Tesla};

        let poison = |damage, duration, max_stacks| PoisonConfig {
            damage,
            duration,
            tick_rate: 0.5,
            max_stacks,
        };

        Self {
            arrow: vec![
                TowerConfig::projectile(Arrow, 25.0, 2.5, 1.0, 25, 6.0).with_upgrade_cost(30),
                TowerConfig::projectile(Arrow, 35.0, 2.8, 1.3, 25, 6.0).with_upgrade_cost(50),
                TowerConfig::projectile(Arrow, 50.0, 3.2, 1.6, 25, 6.0),
            ],
            cannon: vec![
                TowerConfig::projectile(Cannon, 60.0, 2.0, 0.5, 60, 5.0)
                    .with_splash(1.2)
                    .ground_only()
                    .with_upgrade_cost(50),
                TowerConfig::projectile(Cannon, 90.0, 2.3, 0.6, 60, 5.0)
                    .with_splash(1.4)
                    .ground_only()
                    .with_upgrade_cost(80),
                TowerConfig::projectile(Cannon, 130.0, 2.6, 0.7, 60, 5.0)
                    .with_splash(1.7)
                    .ground_only(),
            ],
            frost: vec![
                TowerConfig::projectile(Frost, 12.0, 2.2, 1.0, 40, 5.0)
                    .with_slow(0.5, 2.0)
                    .with_upgrade_cost(35),
                TowerConfig::projectile(Frost, 18.0, 2.5, 1.2, 40, 5.0)
                    .with_slow(0.4, 2.5)
                    .with_upgrade_cost(60),
                TowerConfig::projectile(Frost, 28.0, 2.8, 1.4, 40, 5.0).with_slow(0.3, 3.0),
            ],
            lightning: vec![
                TowerConfig::projectile(Lightning, 30.0, 2.5, 0.8, 50, 8.0)
                    .with_chain(2, 2.0, 0.7)
                    .with_upgrade_cost(45),
                TowerConfig::projectile(Lightning, 45.0, 2.8, 1.0, 50, 8.0)
                    .with_chain(3, 2.3, 0.75)
                    .with_upgrade_cost(70),
                TowerConfig::projectile(Lightning, 65.0, 3.2, 1.2, 50, 8.0).with_chain(4, 2.6, 0.8),
            ],
            poison: vec![
                TowerConfig::projectile(Poison, 10.0, 2.2, 0.9, 45, 5.0)
                    .with_poison(poison(5.0, 3.0, 3))
                    .with_upgrade_cost(40),
                TowerConfig::projectile(Poison, 15.0, 2.5, 1.1, 45, 5.0)
                    .with_poison(poison(8.0, 4.0, 4))
                    .with_upgrade_cost(65),
                TowerConfig::projectile(Poison, 22.0, 2.8, 1.3, 45, 5.0)
                    .with_poison(poison(12.0, 5.0, 5)),
            ],
            sniper: vec![
                TowerConfig::projectile(Sniper, 100.0, 5.0, 0.3, 70, 12.0).with_upgrade_cost(60),
                TowerConfig::projectile(Sniper, 170.0, 5.5, 0.35, 70, 12.0).with_upgrade_cost(90),
                TowerConfig::projectile(Sniper, 250.0, 6.0, 0.4, 70, 12.0),
            ],
            tesla: vec![
                TowerConfig::pulse(Tesla, 20.0, 1.8, 0.8, 80).with_upgrade_cost(60),
                TowerConfig::pulse(Tesla, 35.0, 2.1, 1.0, 80).with_upgrade_cost(90),
                TowerConfig::pulse(Tesla, 55.0, 2.4, 1.2, 80),
            ],
        }
    }
}

/// Stealth behaviour of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StealthConfig {
    /// Distance from a tower at which the enemy becomes visible.
    pub reveal_range: f32,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self { reveal_range: 2.0 }
    }
}

/// Healing aura of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealConfig {
    /// Radius in world units within which allies are healed.
    pub radius: f32,
    /// Hit points restored per pulse.
    pub amount: f32,
    /// Seconds between pulses.
    pub tick_rate: f32,
}

/// Stats shared by every enemy template, splitter children included.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Maximum and starting hit points.
    pub hp: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Gold granted when the enemy is killed.
    pub reward: u32,
    /// Collision radius in world units.
    pub radius: f32,
    /// Whether the enemy flies.
    #[serde(default)]
    pub flying: bool,
    /// Stealth behaviour, if any.
    #[serde(default)]
    pub stealth: Option<StealthConfig>,
    /// Healing aura, if any.
    #[serde(default)]
    pub heal: Option<HealConfig>,
}

impl EnemyStats {
    /// Creates stats for a plain ground enemy.
    #[must_use]
    pub const fn new(hp: f32, speed: f32, reward: u32, radius: f32) -> Self {
        Self {
            hp,
            speed,
            reward,
            radius,
            flying: false,
            stealth: None,
            heal: None,
        }
    }

    /// Marks the enemy as flying.
    #[must_use]
    pub const fn flying(mut self) -> Self {
        self.flying = true;
        self
    }

    /// Makes the enemy stealthed until revealed within `reveal_range` of a tower.
    #[must_use]
    pub const fn with_stealth(mut self, reveal_range: f32) -> Self {
        self.stealth = Some(StealthConfig { reveal_range });
        self
    }

    /// Gives the enemy a healing aura.
    #[must_use]
    pub const fn with_heal(mut self, radius: f32, amount: f32, tick_rate: f32) -> Self {
        self.heal = Some(HealConfig {
            radius,
            amount,
            tick_rate,
        });
        self
    }
}

/// Children spawned when a splitter dies.
///
/// The child template is plain [`EnemyStats`], so children can never split
/// again.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Number of children spawned.
    pub count: u32,
    /// Template shared by every child.
    pub child: EnemyStats,
}

/// Immutable enemy template referenced by wave entries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// Stats of the enemy itself.
    pub stats: EnemyStats,
    /// Children spawned on death, if any.
    #[serde(default)]
    pub split: Option<SplitConfig>,
}

impl EnemyConfig {
    /// Creates a template that does not split.
    #[must_use]
    pub const fn new(stats: EnemyStats) -> Self {
        Self { stats, split: None }
    }

    /// Spawns `count` children using `child` when the enemy dies.
    #[must_use]
    pub const fn with_split(mut self, count: u32, child: EnemyStats) -> Self {
        self.split = Some(SplitConfig { count, child });
        self
    }

    /// Returns a copy with scaled hit points and speed.
    #[must_use]
    pub fn scaled(mut self, hp: f32, speed_multiplier: f32) -> Self {
        self.stats.hp = hp;
        self.stats.speed *= speed_multiplier;
        self
    }
}

impl From<EnemyStats> for EnemyConfig {
    fn from(stats: EnemyStats) -> Self {
        Self::new(stats)
    }
}

/// Enemy archetypes available to wave authors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline enemy.
    Basic,
    /// Fragile runner.
    Fast,
    /// Slow, durable enemy.
    Tank,
    /// Armoured mid-tier enemy.
    Shielded,
    /// Very durable, very slow enemy.
    Boss,
    /// Enemy ignored by ground-only towers.
    Flying,
    /// Enemy that heals nearby allies.
    Healer,
    /// Enemy that splits into children on death.
    Splitter,
    /// Enemy untargetable until revealed.
    Stealth,
}

/// Templates for every enemy archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bestiary {
    /// Basic template.
    pub basic: EnemyConfig,
    /// Fast template.
    pub fast: EnemyConfig,
    /// Tank template.
    pub tank: EnemyConfig,
    /// Shielded template.
    pub shielded: EnemyConfig,
    /// Boss template.
    pub boss: EnemyConfig,
    /// Flying template.
    pub flying: EnemyConfig,
    /// Healer template.
    pub healer: EnemyConfig,
    /// Splitter template.
    pub splitter: EnemyConfig,
    /// Stealth template.
    pub stealth: EnemyConfig,
}

impl Bestiary {
    /// Template for the provided archetype.
    #[must_use]
    pub fn get(&self, kind: EnemyKind) -> &EnemyConfig {
        match kind {
            EnemyKind::Basic => &self.basic,
            EnemyKind::Fast => &self.fast,
            EnemyKind::Tank => &self.tank,
            EnemyKind::Shielded => &self.shielded,
            EnemyKind::Boss => &self.boss,
            EnemyKind::Flying => &self.flying,
            EnemyKind::Healer => &self.healer,
            EnemyKind::Splitter => &self.splitter,
            EnemyKind::Stealth => &self.stealth,
        }
    }
}

impl Default for Bestiary {
    fn default() -> Self {
        Self {
            basic: EnemyStats::new(100.0, 2.0, 10, 0.3).into(),
            fast: EnemyStats::new(50.0, 3.0, 8, 0.2).into(),
            tank: EnemyStats::new(300.0, 1.2, 20, 0.4).into(),
            shielded: EnemyStats::new(200.0, 1.6, 15, 0.3).into(),
            boss: EnemyStats::new(1000.0, 0.8, 100, 0.5).into(),
            flying: EnemyStats::new(80.0, 2.5, 12, 0.25).flying().into(),
            healer: EnemyStats::new(150.0, 1.5, 18, 0.3)
                .with_heal(2.0, 10.0, 1.0)
                .into(),
            splitter: EnemyConfig::new(EnemyStats::new(120.0, 1.8, 15, 0.32))
                .with_split(2, EnemyStats::new(40.0, 2.2, 5, 0.18)),
            stealth: EnemyStats::new(90.0, 2.0, 14, 0.25)
                .with_stealth(StealthConfig::default().reveal_range)
                .into(),
        }
    }
}

/// One homogeneous spawn batch within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveEntry {
    /// Number of enemies spawned by the entry.
    pub count: u32,
    /// Seconds between consecutive spawns.
    pub spawn_interval: f32,
    /// Template used for every enemy in the entry.
    pub enemy: EnemyConfig,
}

impl WaveEntry {
    /// Creates a new wave entry.
    #[must_use]
    pub const fn new(count: u32, spawn_interval: f32, enemy: EnemyConfig) -> Self {
        Self {
            count,
            spawn_interval,
            enemy,
        }
    }
}

/// Ordered spawn batches forming one wave.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Entries consumed in order.
    pub entries: Vec<WaveEntry>,
}

impl WaveConfig {
    /// Creates a wave from its entries.
    #[must_use]
    pub fn new(entries: Vec<WaveEntry>) -> Self {
        Self { entries }
    }

    /// Total number of enemies spawned directly by the wave.
    #[must_use]
    pub fn enemy_count(&self) -> u64 {
        self.entries.iter().map(|entry| u64::from(entry.count)).sum()
    }
}

/// Explicit balance configuration handed to the simulation at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balance {
    /// Gold available when the game starts.
    pub starting_gold: u32,
    /// Lives available when the game starts.
    pub starting_lives: u32,
    /// Share of the total investment refunded when a tower is sold.
    pub sell_refund_ratio: f32,
    /// Lives lost whenever an enemy reaches the goal.
    pub goal_damage: u32,
    /// Tower level tables.
    pub towers: TowerCatalog,
    /// Enemy templates.
    pub bestiary: Bestiary,
}

impl Default for Balance {
    fn default() -> Self {
        Self {
            starting_gold: 100,
            starting_lives: 20,
            sell_refund_ratio: 0.75,
            goal_damage: 1,
            towers: TowerCatalog::default(),
            bestiary: Bestiary::default(),
        }
    }
}
