//! Cookie economy logic. Pure functions over `&mut Progression`.

use tracing::debug;

use super::achievements;
use super::catalog::{Catalog, GeneratorDef, ModifierDef};
use super::leveling;
use super::multipliers;
use super::state::Progression;
use crate::error::PurchaseError;

/// Price growth per unit already owned.
pub const COST_GROWTH: f64 = 1.15;

/// Experience per passively earned cookie.
const PASSIVE_XP_RATE: f64 = 0.1;

/// Experience per manual click.
const CLICK_XP: f64 = 1.0;

/// Lifetime cookies needed before the auto-clicker works.
pub const AUTO_CLICK_UNLOCK: f64 = 1_000.0;

/// Price of the next unit: `ceil(base × 1.15^owned)`.
///
/// Always a whole number, kept as `f64` because late-game prices exceed the
/// integer range.
pub fn purchase_cost(base_cost: f64, owned: u32) -> f64 {
    (base_cost * COST_GROWTH.powi(owned.min(i32::MAX as u32) as i32)).ceil()
}

/// Next-unit price for a generator in the catalog.
pub fn generator_cost(state: &Progression, catalog: &Catalog, generator_id: &str) -> Option<f64> {
    catalog
        .generator(generator_id)
        .map(|g| purchase_cost(g.base_cost, state.owned_count(&g.id)))
}

/// Cookies per second from one generator kind, all multipliers applied.
pub fn generator_rate(state: &Progression, catalog: &Catalog, generator: &GeneratorDef) -> f64 {
    let owned = state.owned_count(&generator.id);
    if owned == 0 {
        return 0.0;
    }
    owned as f64
        * generator.base_rate
        * multipliers::generator_multiplier(state, catalog, &generator.id)
        * multipliers::current_multiplier(state, catalog)
}

/// Total cookies per second.
pub fn total_rate(state: &Progression, catalog: &Catalog) -> f64 {
    catalog
        .generators
        .iter()
        .map(|g| generator_rate(state, catalog, g))
        .sum()
}

pub fn is_generator_unlocked(state: &Progression, generator: &GeneratorDef) -> bool {
    state.lifetime_total >= generator.unlock_threshold
}

pub fn is_modifier_unlocked(state: &Progression, modifier: &ModifierDef) -> bool {
    state.lifetime_total >= modifier.unlock_threshold
}

/// Whether `id` (generator or modifier) is visible to the player.
pub fn is_unlocked(state: &Progression, catalog: &Catalog, id: &str) -> bool {
    if let Some(g) = catalog.generator(id) {
        return is_generator_unlocked(state, g);
    }
    catalog
        .modifier(id)
        .is_some_and(|m| is_modifier_unlocked(state, m))
}

/// Lowest unlock threshold among generators still locked.
pub fn next_generator_unlock<'a>(state: &Progression, catalog: &'a Catalog) -> Option<&'a GeneratorDef> {
    catalog
        .generators
        .iter()
        .filter(|g| !is_generator_unlocked(state, g))
        .min_by(|a, b| a.unlock_threshold.total_cmp(&b.unlock_threshold))
}

/// Manual click. Always succeeds; returns the cookies gained.
pub fn click(state: &mut Progression, catalog: &Catalog) -> f64 {
    let power = multipliers::click_power(state, catalog);
    state.add_cookies(power);
    state.total_actions += 1;
    leveling::gain_experience(state, CLICK_XP);
    achievements::check(state, catalog);
    power
}

/// `clicks` automatic clicks, each exactly like a manual one. Returns the
/// cookies gained. Does nothing below [`AUTO_CLICK_UNLOCK`].
pub fn auto_click(state: &mut Progression, catalog: &Catalog, clicks: u64) -> f64 {
    if state.lifetime_total < AUTO_CLICK_UNLOCK {
        return 0.0;
    }
    (0..clicks).map(|_| click(state, catalog)).sum()
}

/// Advance passive production by `dt_ms` milliseconds. Returns the cookies
/// gained.
///
/// Cost is independent of `dt_ms`: a 100ms tick and a day of catch-up are the
/// same single multiplication.
pub fn tick(state: &mut Progression, catalog: &Catalog, dt_ms: f64) -> f64 {
    if !dt_ms.is_finite() || dt_ms <= 0.0 {
        return 0.0;
    }
    let gain = total_rate(state, catalog) * dt_ms / 1000.0;
    if gain > 0.0 && gain.is_finite() {
        state.add_cookies(gain);
        leveling::gain_experience(state, gain * PASSIVE_XP_RATE);
        achievements::check(state, catalog);
        gain
    } else {
        0.0
    }
}

/// Credit passive income for time spent away. No experience is granted.
pub fn accrue_offline(state: &mut Progression, catalog: &Catalog, elapsed_ms: i64) -> f64 {
    if elapsed_ms <= 0 {
        return 0.0;
    }
    let gain = total_rate(state, catalog) * elapsed_ms as f64 / 1000.0;
    state.add_cookies(gain);
    if gain > 0.0 {
        achievements::check(state, catalog);
    }
    gain
}

/// Buy one unit of a generator. Returns the price paid.
pub fn purchase_generator(
    state: &mut Progression,
    catalog: &Catalog,
    generator_id: &str,
) -> Result<f64, PurchaseError> {
    buy_generator(state, catalog, generator_id).inspect_err(|e| {
        debug!(generator = generator_id, error = %e, "generator purchase rejected");
    })
}

fn buy_generator(
    state: &mut Progression,
    catalog: &Catalog,
    generator_id: &str,
) -> Result<f64, PurchaseError> {
    let generator = catalog
        .generator(generator_id)
        .ok_or_else(|| PurchaseError::UnknownGenerator(generator_id.to_string()))?;
    if !is_generator_unlocked(state, generator) {
        return Err(PurchaseError::Locked {
            id: generator.id.clone(),
            threshold: generator.unlock_threshold,
        });
    }
    let owned = state.owned_count(&generator.id);
    let cost = purchase_cost(generator.base_cost, owned);
    if state.balance < cost {
        return Err(PurchaseError::InsufficientFunds {
            cost,
            balance: state.balance,
        });
    }

    state.balance = (state.balance - cost).max(0.0);
    state.owned.insert(generator.id.clone(), owned.saturating_add(1));
    debug!(generator = %generator.id, cost, owned = owned + 1, "bought generator");
    achievements::check(state, catalog);
    Ok(cost)
}

/// Buy a one-time modifier. Returns the price paid.
pub fn purchase_modifier(
    state: &mut Progression,
    catalog: &Catalog,
    modifier_id: &str,
) -> Result<f64, PurchaseError> {
    buy_modifier(state, catalog, modifier_id).inspect_err(|e| {
        debug!(modifier = modifier_id, error = %e, "modifier purchase rejected");
    })
}

fn buy_modifier(
    state: &mut Progression,
    catalog: &Catalog,
    modifier_id: &str,
) -> Result<f64, PurchaseError> {
    let modifier = catalog
        .modifier(modifier_id)
        .ok_or_else(|| PurchaseError::UnknownModifier(modifier_id.to_string()))?;
    check_modifier(state, modifier)?;

    state.balance = (state.balance - modifier.cost).max(0.0);
    state.purchased_modifiers.insert(modifier.id.clone());
    debug!(modifier = %modifier.id, cost = modifier.cost, "bought modifier");
    achievements::check(state, catalog);
    Ok(modifier.cost)
}

/// Every rule a modifier purchase must pass, without mutating anything.
pub fn check_modifier(state: &Progression, modifier: &ModifierDef) -> Result<(), PurchaseError> {
    if state.has_modifier(&modifier.id) {
        return Err(PurchaseError::AlreadyPurchased(modifier.id.clone()));
    }
    if !is_modifier_unlocked(state, modifier) {
        return Err(PurchaseError::Locked {
            id: modifier.id.clone(),
            threshold: modifier.unlock_threshold,
        });
    }
    let required = modifier.prestige_tier_required();
    if state.prestige_points < required {
        return Err(PurchaseError::PrestigeTierTooLow {
            required,
            have: state.prestige_points,
        });
    }
    if state.balance < modifier.cost {
        return Err(PurchaseError::InsufficientFunds {
            cost: modifier.cost,
            balance: state.balance,
        });
    }
    Ok(())
}

/// What auto-buy picked.
#[derive(Clone, Debug, PartialEq)]
pub enum AutoPurchase {
    Modifier(String),
    Generator(String),
}

/// One auto-buy decision: the cheapest purchasable modifier, otherwise the
/// cheapest unlocked, affordable generator.
pub fn auto_buy_step(state: &mut Progression, catalog: &Catalog) -> Option<AutoPurchase> {
    let modifier = catalog
        .modifiers
        .iter()
        .filter(|m| check_modifier(state, m).is_ok())
        .min_by(|a, b| a.cost.total_cmp(&b.cost))
        .map(|m| m.id.clone());
    if let Some(id) = modifier {
        if purchase_modifier(state, catalog, &id).is_ok() {
            return Some(AutoPurchase::Modifier(id));
        }
    }

    let generator = catalog
        .generators
        .iter()
        .filter(|g| is_generator_unlocked(state, g))
        .map(|g| (purchase_cost(g.base_cost, state.owned_count(&g.id)), g))
        .filter(|(cost, _)| state.balance >= *cost)
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, g)| g.id.clone());
    if let Some(id) = generator {
        if purchase_generator(state, catalog, &id).is_ok() {
            return Some(AutoPurchase::Generator(id));
        }
    }
    None
}
