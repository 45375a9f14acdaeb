//! Multiplier resolution: pure functions over state and catalog.
//!
//! Called on every tick and every read from the UI, so each one is a single
//! pass over the (small) modifier list.

use super::catalog::{Catalog, Effect};
use super::leveling;
use super::state::Progression;

pub use super::leveling::level_multiplier;

/// Effects of every purchased modifier.
fn purchased_effects<'a>(
    state: &'a Progression,
    catalog: &'a Catalog,
) -> impl Iterator<Item = &'a Effect> + 'a {
    catalog
        .modifiers
        .iter()
        .filter(move |m| state.has_modifier(&m.id))
        .map(|m| &m.effect)
}

/// Product of purchased global modifiers.
pub fn global_multiplier(state: &Progression, catalog: &Catalog) -> f64 {
    purchased_effects(state, catalog)
        .filter_map(|e| match e {
            Effect::Global { multiplier } => Some(*multiplier),
            _ => None,
        })
        .product()
}

/// Product of purchased modifiers that target `generator_id`.
pub fn generator_multiplier(state: &Progression, catalog: &Catalog, generator_id: &str) -> f64 {
    purchased_effects(state, catalog)
        .filter_map(|e| match e {
            Effect::Generator { target, multiplier } if target == generator_id => Some(*multiplier),
            _ => None,
        })
        .product()
}

/// Prestige × global × level. Applies to clicks and to all generators.
pub fn current_multiplier(state: &Progression, catalog: &Catalog) -> f64 {
    state.prestige_multiplier * global_multiplier(state, catalog) * leveling::level_multiplier(state)
}

/// Cookies gained by one manual click.
pub fn click_power(state: &Progression, catalog: &Catalog) -> f64 {
    let clicks: f64 = purchased_effects(state, catalog)
        .filter_map(|e| match e {
            Effect::Click { multiplier } => Some(*multiplier),
            _ => None,
        })
        .product();
    clicks * current_multiplier(state, catalog)
}
