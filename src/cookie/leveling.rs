//! Experience and levels.
//!
//! One experience point per manual click, 0.1 per passively earned cookie.
//! Each level raises the threshold by 20% and adds 5% to all production.

use tracing::info;

use super::state::Progression;

/// Experience needed to advance from `level` to `level + 1`.
pub fn threshold_for(level: u32) -> f64 {
    (100.0 * 1.2_f64.powi(level.saturating_sub(1) as i32)).floor()
}

/// Add experience and run the level-up loop. Returns the number of levels
/// gained.
///
/// Non-finite or negative amounts are ignored so the loop always terminates.
pub fn gain_experience(state: &mut Progression, amount: f64) -> u32 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    state.experience += amount;
    normalize(state)
}

/// Apply every pending level-up so that `experience < experience_to_next`.
///
/// Also repairs a state whose experience fields came from an untrusted
/// source. Terminates because each pass subtracts a positive threshold and
/// the threshold only grows; once it overflows to infinity nothing is
/// subtracted any more.
pub fn normalize(state: &mut Progression) -> u32 {
    if !state.experience.is_finite() || state.experience < 0.0 {
        state.experience = 0.0;
    }
    if state.level == 0 {
        state.level = 1;
    }
    if !(state.experience_to_next.is_finite() && state.experience_to_next > 0.0) {
        state.experience_to_next = threshold_for(state.level);
    }

    let before = state.level;
    while state.experience >= state.experience_to_next && state.level < u32::MAX {
        state.experience -= state.experience_to_next;
        state.level += 1;
        state.experience_to_next = threshold_for(state.level);
    }
    let gained = state.level - before;
    if gained > 0 {
        info!(level = state.level, gained, "level up");
    }
    gained
}

/// Production bonus from the current level: +5% per level above 1.
pub fn level_multiplier(state: &Progression) -> f64 {
    1.0 + (state.level.saturating_sub(1)) as f64 * 0.05
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn thresholds() {
        assert_eq!(threshold_for(1), 100.0);
        assert_eq!(threshold_for(2), 120.0);
        assert_eq!(threshold_for(3), 144.0);
        assert_eq!(threshold_for(4), 172.0); // floor(172.8)
    }

    #[test]
    fn exactly_100_levels_to_2() {
        let mut s = Progression::default();
        assert_eq!(gain_experience(&mut s, 100.0), 1);
        assert_eq!(s.level, 2);
        assert_eq!(s.experience, 0.0);
        assert_eq!(s.experience_to_next, 120.0);
    }

    #[test]
    fn just_below_threshold_does_not_level() {
        let mut s = Progression::default();
        gain_experience(&mut s, 99.9);
        assert_eq!(s.level, 1);
    }

    #[test]
    fn large_gain_levels_multiple_times() {
        let mut s = Progression::default();
        // 100 + 120 + 144 = 364
        assert_eq!(gain_experience(&mut s, 370.0), 3);
        assert_eq!(s.level, 4);
        assert!((s.experience - 6.0).abs() < 1e-9);
        assert_eq!(s.experience_to_next, 172.0);
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut s = Progression::default();
        assert_eq!(gain_experience(&mut s, f64::INFINITY), 0);
        assert_eq!(gain_experience(&mut s, f64::NAN), 0);
        assert_eq!(gain_experience(&mut s, -50.0), 0);
        assert_eq!(s.level, 1);
        assert_eq!(s.experience, 0.0);
    }

    #[test]
    fn huge_gain_terminates() {
        let mut s = Progression::default();
        gain_experience(&mut s, 1e300);
        assert!(s.level > 1);
        assert!(s.experience < s.experience_to_next || s.experience_to_next.is_infinite());
    }

    #[test]
    fn normalize_repairs_corrupt_fields() {
        let mut s = Progression::default();
        s.level = 0;
        s.experience = f64::NAN;
        s.experience_to_next = -1.0;
        normalize(&mut s);
        assert_eq!(s.level, 1);
        assert_eq!(s.experience, 0.0);
        assert_eq!(s.experience_to_next, 100.0);
    }

    #[test]
    fn level_multiplier_five_percent_per_level() {
        let mut s = Progression::default();
        assert!((level_multiplier(&s) - 1.0).abs() < f64::EPSILON);
        s.level = 11;
        assert!((level_multiplier(&s) - 1.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_experience_below_threshold_after_gain(
            gains in proptest::collection::vec(0.0f64..5_000.0, 1..50),
        ) {
            let mut s = Progression::default();
            let mut last_level = s.level;
            for g in gains {
                gain_experience(&mut s, g);
                prop_assert!(s.experience < s.experience_to_next);
                prop_assert!(s.experience >= 0.0);
                prop_assert!(s.level >= last_level);
                last_level = s.level;
            }
        }
    }
}
