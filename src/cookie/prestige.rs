//! Prestige: trade the current run for a permanent multiplier.
//!
//! One point per million lifetime cookies. Points are a high-water mark, not
//! a currency: prestiging sets them to what lifetime cookies allow.

use tracing::info;

use super::achievements;
use super::catalog::{Catalog, PRESTIGE_UNIT};
use super::state::Progression;
use crate::error::PrestigeError;

/// Points past which each additional point is worth less.
const FULL_VALUE_POINTS: u64 = 50;

/// Points the current lifetime total is worth.
pub fn available_points(state: &Progression) -> u64 {
    let points = (state.lifetime_total / PRESTIGE_UNIT).floor();
    if points.is_finite() && points > 0.0 {
        points as u64
    } else {
        0
    }
}

/// Points a prestige right now would add.
pub fn pending_gain(state: &Progression) -> u64 {
    available_points(state).saturating_sub(state.prestige_points)
}

pub fn can_prestige(state: &Progression) -> bool {
    pending_gain(state) > 0
}

/// `1 + 10% per point for the first 50, then 7.5% per point`.
pub fn multiplier_for(points: u64) -> f64 {
    let full = points.min(FULL_VALUE_POINTS) as f64;
    let reduced = points.saturating_sub(FULL_VALUE_POINTS) as f64;
    1.0 + full * 0.10 + reduced * 0.075
}

/// Recompute the derived multiplier from the stored points.
pub fn refresh_multiplier(state: &mut Progression) {
    state.prestige_multiplier = multiplier_for(state.prestige_points);
}

/// Lifetime cookies still needed for the next point.
pub fn cookies_to_next_point(state: &Progression) -> f64 {
    let next = (available_points(state).max(state.prestige_points) + 1) as f64 * PRESTIGE_UNIT;
    (next - state.lifetime_total).max(0.0)
}

/// Everything a confirmation prompt needs.
#[derive(Clone, Debug, PartialEq)]
pub struct PrestigePreview {
    pub available_points: u64,
    pub pending_gain: u64,
    pub current_multiplier: f64,
    pub multiplier_after: f64,
    pub cookies_to_next_point: f64,
}

pub fn preview(state: &Progression) -> PrestigePreview {
    let available = available_points(state);
    PrestigePreview {
        available_points: available,
        pending_gain: pending_gain(state),
        current_multiplier: state.prestige_multiplier,
        multiplier_after: multiplier_for(available.max(state.prestige_points)),
        cookies_to_next_point: cookies_to_next_point(state),
    }
}

/// Reset the run for prestige points. Returns the points gained.
///
/// Clears balance, generators and click count; keeps lifetime cookies,
/// level and experience, purchased modifiers and achievements.
pub fn perform_prestige(state: &mut Progression, catalog: &Catalog) -> Result<u64, PrestigeError> {
    let available = available_points(state);
    let gain = pending_gain(state);
    if gain == 0 {
        return Err(PrestigeError::NotEligible {
            available,
            current: state.prestige_points,
            lifetime_total: state.lifetime_total,
        });
    }

    state.prestige_points = available;
    refresh_multiplier(state);
    state.balance = 0.0;
    state.owned.clear();
    state.total_actions = 0;
    achievements::check(state, catalog);

    info!(
        gained = gain,
        points = state.prestige_points,
        multiplier = state.prestige_multiplier,
        "prestige"
    );
    Ok(gain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn two_and_a_half_million_with_one_point() {
        let c = Catalog::standard();
        let mut s = Progression::default();
        s.lifetime_total = 2_500_000.0;
        s.prestige_points = 1;
        refresh_multiplier(&mut s);
        assert_eq!(available_points(&s), 2);
        assert_eq!(pending_gain(&s), 1);
        assert_eq!(perform_prestige(&mut s, &c), Ok(1));
        assert_eq!(s.prestige_points, 2);
        assert!((s.prestige_multiplier - 1.20).abs() < 1e-12);
    }

    #[test]
    fn prestige_resets_run_but_keeps_progress() {
        let c = Catalog::standard();
        let mut s = Progression::default();
        s.balance = 500_000.0;
        s.lifetime_total = 3_000_000.0;
        s.total_actions = 42;
        s.owned.insert("cursor".into(), 10);
        s.purchased_modifiers.insert("reinforced_index".into());
        s.level = 7;
        s.experience = 12.0;
        s.experience_to_next = crate::cookie::leveling::threshold_for(7);

        perform_prestige(&mut s, &c).unwrap();

        assert_eq!(s.balance, 0.0);
        assert!(s.owned.is_empty());
        assert_eq!(s.total_actions, 0);
        assert_eq!(s.lifetime_total, 3_000_000.0);
        assert!(s.has_modifier("reinforced_index"));
        assert_eq!(s.level, 7);
        assert_eq!(s.experience, 12.0);
        assert!(s.achievements.contains("prestige1"));
    }

    #[test]
    fn second_prestige_is_rejected() {
        let c = Catalog::standard();
        let mut s = Progression::default();
        s.lifetime_total = 1_000_000.0;
        assert_eq!(perform_prestige(&mut s, &c), Ok(1));
        let after_first = s.clone();
        assert_eq!(
            perform_prestige(&mut s, &c),
            Err(PrestigeError::NotEligible {
                available: 1,
                current: 1,
                lifetime_total: 1_000_000.0
            })
        );
        assert_eq!(s, after_first);
    }

    #[test]
    fn not_eligible_below_one_million() {
        let c = Catalog::standard();
        let mut s = Progression::default();
        s.lifetime_total = 999_999.0;
        assert!(!can_prestige(&s));
        assert!(perform_prestige(&mut s, &c).is_err());
        assert!((cookies_to_next_point(&s) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn multiplier_diminishes_after_fifty() {
        assert_eq!(multiplier_for(0), 1.0);
        assert!((multiplier_for(50) - 6.0).abs() < 1e-12);
        assert!((multiplier_for(60) - 6.75).abs() < 1e-12);
    }

    #[test]
    fn preview_reports_gain_and_next_multiplier() {
        let mut s = Progression::default();
        s.lifetime_total = 3_400_000.0;
        s.prestige_points = 1;
        refresh_multiplier(&mut s);
        let p = preview(&s);
        assert_eq!(p.available_points, 3);
        assert_eq!(p.pending_gain, 2);
        assert!((p.current_multiplier - 1.1).abs() < 1e-12);
        assert!((p.multiplier_after - 1.3).abs() < 1e-12);
        assert!((p.cookies_to_next_point - 600_000.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_multiplier_monotone_and_at_least_one(points in 0u64..10_000) {
            let a = multiplier_for(points);
            let b = multiplier_for(points + 1);
            prop_assert!(a >= 1.0);
            prop_assert!(b > a);
        }
    }
}
