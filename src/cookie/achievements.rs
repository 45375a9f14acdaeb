//! Achievement evaluation.

use tracing::info;

use super::catalog::{AchievementRule, Catalog};
use super::state::Progression;

pub fn is_met(state: &Progression, rule: &AchievementRule) -> bool {
    match rule {
        AchievementRule::LifetimeAtLeast { amount } => state.lifetime_total >= *amount,
        AchievementRule::GeneratorOwned { generator } => state.owned_count(generator) > 0,
        AchievementRule::IdleLifetime { amount } => {
            state.lifetime_total >= *amount && state.total_actions == 0
        }
        AchievementRule::ClicksAtLeast { count } => state.total_actions >= *count,
        AchievementRule::MostlyManual { clicks, max_ratio } => {
            state.total_actions >= *clicks
                && state.lifetime_total / (state.total_actions.max(1) as f64) < *max_ratio
        }
        AchievementRule::TotalGeneratorsAtLeast { count } => state.total_owned() >= *count,
        AchievementRule::PrestigeAtLeast { points } => state.prestige_points >= *points,
        AchievementRule::LevelAtLeast { level } => state.level >= *level,
        AchievementRule::ModifiersAtLeast { count } => state.purchased_modifiers.len() >= *count,
    }
}

/// Record every achievement whose rule now holds. Returns the newly earned
/// ids; earned achievements are never revoked.
pub fn check(state: &mut Progression, catalog: &Catalog) -> Vec<String> {
    let earned: Vec<String> = catalog
        .achievements
        .iter()
        .filter(|a| !state.achievements.contains(&a.id) && is_met(state, &a.rule))
        .map(|a| a.id.clone())
        .collect();
    for id in &earned {
        info!(achievement = %id, "achievement unlocked");
        state.achievements.insert(id.clone());
    }
    earned
}
