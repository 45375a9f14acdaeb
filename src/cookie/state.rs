//! Cookie progression state: the only mutable aggregate of the engine.

use std::collections::{BTreeMap, BTreeSet};

use super::leveling;

/// Everything a run accumulates.
///
/// Created once (fresh or from a save), mutated only by the operations in
/// `logic`, `leveling` and `prestige`, and replaced wholesale by load/import.
#[derive(Clone, Debug, PartialEq)]
pub struct Progression {
    /// Spendable cookies.
    pub balance: f64,
    /// Cookies earned all-time. Never reduced by spending or prestige.
    pub lifetime_total: f64,
    /// Manual clicks this run.
    pub total_actions: u64,
    /// Generator id -> units owned. Zero counts are not stored.
    pub owned: BTreeMap<String, u32>,
    pub purchased_modifiers: BTreeSet<String>,
    pub level: u32,
    pub experience: f64,
    pub experience_to_next: f64,
    pub prestige_points: u64,
    /// Derived from `prestige_points`; see `prestige::multiplier_for`.
    pub prestige_multiplier: f64,
    pub achievements: BTreeSet<String>,
    pub last_save_epoch_ms: i64,
    pub start_time_ms: i64,
}

impl Progression {
    /// A brand-new game started at `now_ms`.
    pub fn new(now_ms: i64) -> Self {
        Self {
            balance: 0.0,
            lifetime_total: 0.0,
            total_actions: 0,
            owned: BTreeMap::new(),
            purchased_modifiers: BTreeSet::new(),
            level: 1,
            experience: 0.0,
            experience_to_next: leveling::threshold_for(1),
            prestige_points: 0,
            prestige_multiplier: 1.0,
            achievements: BTreeSet::new(),
            last_save_epoch_ms: now_ms,
            start_time_ms: now_ms,
        }
    }

    pub fn owned_count(&self, generator_id: &str) -> u32 {
        self.owned.get(generator_id).copied().unwrap_or(0)
    }

    pub fn has_modifier(&self, modifier_id: &str) -> bool {
        self.purchased_modifiers.contains(modifier_id)
    }

    /// Total generator units across all kinds.
    pub fn total_owned(&self) -> u64 {
        self.owned.values().map(|&c| c as u64).sum()
    }

    /// Credit a gain to balance and lifetime in lock-step.
    pub(crate) fn add_cookies(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.balance += amount;
            self.lifetime_total += amount;
        }
    }

    pub fn play_time_ms(&self, now_ms: i64) -> i64 {
        (now_ms - self.start_time_ms).max(0)
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state() {
        let s = Progression::new(1_000);
        assert_eq!(s.level, 1);
        assert!((s.experience_to_next - 100.0).abs() < f64::EPSILON);
        assert!((s.prestige_multiplier - 1.0).abs() < f64::EPSILON);
        assert_eq!(s.start_time_ms, 1_000);
        assert_eq!(s.last_save_epoch_ms, 1_000);
        assert_eq!(s.total_owned(), 0);
    }

    #[test]
    fn add_cookies_moves_balance_and_lifetime_together() {
        let mut s = Progression::default();
        s.add_cookies(12.5);
        assert!((s.balance - 12.5).abs() < f64::EPSILON);
        assert!((s.lifetime_total - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn add_cookies_ignores_garbage() {
        let mut s = Progression::default();
        s.add_cookies(-3.0);
        s.add_cookies(f64::NAN);
        s.add_cookies(f64::INFINITY);
        assert_eq!(s.balance, 0.0);
        assert_eq!(s.lifetime_total, 0.0);
    }

    #[test]
    fn owned_count_defaults_to_zero() {
        let mut s = Progression::default();
        assert_eq!(s.owned_count("cursor"), 0);
        s.owned.insert("cursor".into(), 3);
        s.owned.insert("grandma".into(), 2);
        assert_eq!(s.owned_count("cursor"), 3);
        assert_eq!(s.total_owned(), 5);
    }

    #[test]
    fn play_time_never_negative() {
        let s = Progression::new(5_000);
        assert_eq!(s.play_time_ms(8_000), 3_000);
        assert_eq!(s.play_time_ms(1_000), 0);
    }
}
