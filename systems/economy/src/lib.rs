#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Gold, lives and win/loss bookkeeping driven by simulation events.

use bastion_core::Event;
use tracing::debug;

/// How the game currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Neither side has won yet.
    #[default]
    InProgress,
    /// Every wave was cleared.
    Won,
    /// The player ran out of lives.
    Lost,
}

/// Player resources and progress.
#[derive(Clone, Debug)]
pub struct Ledger {
    gold: u32,
    lives: u32,
    wave: u32,
    total_waves: Option<u32>,
    outcome: Outcome,
}

impl Ledger {
    /// Creates a ledger with the starting resources.
    ///
    /// `total_waves` is the number of waves that must be completed to win;
    /// `None` means the game cannot be won.
    #[must_use]
    pub const fn new(gold: u32, lives: u32, total_waves: Option<u32>) -> Self {
        Self {
            gold,
            lives,
            wave: 0,
            total_waves,
            outcome: Outcome::InProgress,
        }
    }

    /// Gold available.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Lives remaining.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Last completed wave, or zero before any wave completes.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Waves required to win, if the game can be won.
    #[must_use]
    pub const fn total_waves(&self) -> Option<u32> {
        self.total_waves
    }

    /// Current outcome.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Reports whether the game has ended either way.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    /// Replaces the number of waves required to win.
    pub fn set_total_waves(&mut self, total_waves: Option<u32>) {
        self.total_waves = total_waves;
    }

    /// Reports whether `cost` can be paid.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.gold >= cost
    }

    /// Pays `amount` if affordable, emitting [`Event::GoldChanged`].
    pub fn spend(&mut self, amount: u32, out: &mut Vec<Event>) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        self.gold -= amount;
        out.push(Event::GoldChanged { gold: self.gold });
        true
    }

    /// Adds `amount` gold, emitting [`Event::GoldChanged`].
    pub fn credit(&mut self, amount: u32, out: &mut Vec<Event>) {
        self.gold = self.gold.saturating_add(amount);
        out.push(Event::GoldChanged { gold: self.gold });
    }

    /// Reacts to the events of one tick, appending resource and game-over
    /// events to `out`.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        for event in events {
            match *event {
                Event::EnemyKilled { reward, .. } => self.credit(reward, out),
                Event::EnemyReachedGoal { damage, .. } => self.lose_lives(damage, out),
                Event::WaveCompleted { wave } => self.record_wave(wave, out),
                _ => {}
            }
        }
    }

    fn lose_lives(&mut self, damage: u32, out: &mut Vec<Event>) {
        if self.is_over() {
            return;
        }
        self.lives = self.lives.saturating_sub(damage);
        out.push(Event::LivesChanged { lives: self.lives });

        if self.lives == 0 {
            self.outcome = Outcome::Lost;
            debug!(wave = self.wave, "out of lives");
            out.push(Event::GameOver { win: false });
        }
    }

    fn record_wave(&mut self, wave: u32, out: &mut Vec<Event>) {
        self.wave = wave;
        if self.is_over() {
            return;
        }
        if self.total_waves.is_some_and(|total| wave >= total) {
            self.outcome = Outcome::Won;
            debug!(wave, "final wave cleared");
            out.push(Event::GameOver { win: true });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::EnemyId;

    fn killed(reward: u32) -> Event {
        Event::EnemyKilled {
            enemy: EnemyId::default(),
            reward,
        }
    }

    fn leaked(damage: u32) -> Event {
        Event::EnemyReachedGoal {
            enemy: EnemyId::default(),
            damage,
        }
    }

    #[test]
    fn kills_credit_gold() {
        let mut ledger = Ledger::new(100, 20, Some(3));
        let mut out = Vec::new();
        ledger.handle(&[killed(10), killed(5)], &mut out);
        assert_eq!(ledger.gold(), 115);
        assert_eq!(
            out,
            vec![Event::GoldChanged { gold: 110 }, Event::GoldChanged { gold: 115 }]
        );
    }

    #[test]
    fn spending_requires_funds() {
        let mut ledger = Ledger::new(50, 20, None);
        let mut out = Vec::new();
        assert!(!ledger.spend(60, &mut out));
        assert!(out.is_empty());
        assert!(ledger.spend(50, &mut out));
        assert_eq!(ledger.gold(), 0);
        assert_eq!(out, vec![Event::GoldChanged { gold: 0 }]);
    }

    #[test]
    fn running_out_of_lives_loses_once() {
        let mut ledger = Ledger::new(0, 2, Some(5));
        let mut out = Vec::new();
        ledger.handle(&[leaked(1), leaked(5), leaked(1)], &mut out);
        assert_eq!(ledger.lives(), 0);
        assert_eq!(ledger.outcome(), Outcome::Lost);
        assert_eq!(
            out,
            vec![
                Event::LivesChanged { lives: 1 },
                Event::LivesChanged { lives: 0 },
                Event::GameOver { win: false },
            ]
        );
    }

    #[test]
    fn clearing_the_final_wave_wins() {
        let mut ledger = Ledger::new(0, 20, Some(2));
        let mut out = Vec::new();
        ledger.handle(&[Event::WaveCompleted { wave: 1 }], &mut out);
        assert!(!ledger.is_over());
        ledger.handle(&[Event::WaveCompleted { wave: 2 }], &mut out);
        assert_eq!(ledger.outcome(), Outcome::Won);
        assert_eq!(ledger.wave(), 2);
        assert_eq!(out, vec![Event::GameOver { win: true }]);
    }

    #[test]
    fn endless_games_are_never_won() {
        let mut ledger = Ledger::new(0, 20, None);
        let mut out = Vec::new();
        ledger.handle(&[Event::WaveCompleted { wave: 500 }], &mut out);
        assert!(!ledger.is_over());
        assert!(out.is_empty());
    }

    #[test]
    fn a_lost_game_cannot_turn_into_a_win() {
        let mut ledger = Ledger::new(0, 1, Some(1));
        let mut out = Vec::new();
        ledger.handle(&[leaked(1), Event::WaveCompleted { wave: 1 }], &mut out);
        assert_eq!(ledger.outcome(), Outcome::Lost);
        assert_eq!(out.last(), Some(&Event::GameOver { win: false }));
    }
}
