//! Static game content: generators, modifiers and achievements.
//!
//! A catalog is built once and never mutated. Progression state only stores
//! ids and counts that refer back into it.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::CatalogError;

/// Lifetime cookies per prestige point. Also the unit of a modifier's
/// prestige tier.
pub const PRESTIGE_UNIT: f64 = 1_000_000.0;

/// A purchasable unit of passive production.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorDef {
    pub id: String,
    pub name: String,
    pub base_cost: f64,
    /// Cookies per second per unit, before multipliers.
    pub base_rate: f64,
    /// Lifetime cookies required before it shows up.
    #[serde(default)]
    pub unlock_threshold: f64,
}

/// What a modifier multiplies.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Effect {
    Click { multiplier: f64 },
    Generator { target: String, multiplier: f64 },
    Global { multiplier: f64 },
}

impl Effect {
    pub fn multiplier(&self) -> f64 {
        match self {
            Effect::Click { multiplier }
            | Effect::Generator { multiplier, .. }
            | Effect::Global { multiplier } => *multiplier,
        }
    }
}

/// A one-time purchase with a permanent multiplicative effect.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierDef {
    pub id: String,
    pub name: String,
    pub cost: f64,
    #[serde(default)]
    pub unlock_threshold: f64,
    pub effect: Effect,
}

impl ModifierDef {
    /// Prestige points needed to buy it: one per [`PRESTIGE_UNIT`] of unlock
    /// threshold.
    pub fn prestige_tier_required(&self) -> u64 {
        (self.unlock_threshold / PRESTIGE_UNIT).floor() as u64
    }
}

/// Condition under which an achievement is earned.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum AchievementRule {
    LifetimeAtLeast { amount: f64 },
    GeneratorOwned { generator: String },
    /// Lifetime reached without a single manual click.
    IdleLifetime { amount: f64 },
    ClicksAtLeast { count: u64 },
    /// Many clicks with little passive income on top.
    MostlyManual { clicks: u64, max_ratio: f64 },
    TotalGeneratorsAtLeast { count: u64 },
    PrestigeAtLeast { points: u64 },
    LevelAtLeast { level: u32 },
    ModifiersAtLeast { count: usize },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub rule: AchievementRule,
}

/// The full content set.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Catalog {
    pub generators: Vec<GeneratorDef>,
    pub modifiers: Vec<ModifierDef>,
    #[serde(default)]
    pub achievements: Vec<AchievementDef>,
}

impl Catalog {
    pub fn generator(&self, id: &str) -> Option<&GeneratorDef> {
        self.generators.iter().find(|g| g.id == id)
    }

    pub fn modifier(&self, id: &str) -> Option<&ModifierDef> {
        self.modifiers.iter().find(|m| m.id == id)
    }

    /// Load a catalog from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check ids are unique, numbers are usable and every generator-targeting
    /// modifier points at a real generator.
    pub fn validate(&self) -> Result<(), CatalogError> {
        fn positive(id: &str, field: &'static str, v: f64) -> Result<(), CatalogError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(CatalogError::InvalidNumber {
                    id: id.to_string(),
                    field,
                })
            }
        }
        fn threshold(id: &str, v: f64) -> Result<(), CatalogError> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(CatalogError::InvalidNumber {
                    id: id.to_string(),
                    field: "unlockThreshold",
                })
            }
        }

        let mut seen = HashSet::new();
        for g in &self.generators {
            if !seen.insert(g.id.as_str()) {
                return Err(CatalogError::DuplicateId(g.id.clone()));
            }
            positive(&g.id, "baseCost", g.base_cost)?;
            positive(&g.id, "baseRate", g.base_rate)?;
            threshold(&g.id, g.unlock_threshold)?;
        }

        let mut seen = HashSet::new();
        for m in &self.modifiers {
            if !seen.insert(m.id.as_str()) {
                return Err(CatalogError::DuplicateId(m.id.clone()));
            }
            positive(&m.id, "cost", m.cost)?;
            positive(&m.id, "multiplier", m.effect.multiplier())?;
            threshold(&m.id, m.unlock_threshold)?;
            if let Effect::Generator { target, .. } = &m.effect {
                if self.generator(target).is_none() {
                    return Err(CatalogError::UnknownTarget {
                        modifier: m.id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for a in &self.achievements {
            if !seen.insert(a.id.as_str()) {
                return Err(CatalogError::DuplicateId(a.id.clone()));
            }
        }
        Ok(())
    }

    /// The shipped content.
    pub fn standard() -> Self {
        Self {
            generators: standard_generators(),
            modifiers: standard_modifiers(),
            achievements: standard_achievements(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_generators() -> Vec<GeneratorDef> {
    let rows: [(&str, &str, f64, f64, f64); 12] = [
        ("cursor", "Cursor", 15.0, 0.1, 0.0),
        ("grandma", "Grandma", 80.0, 1.0, 24.0),
        ("farm", "Cookie Farm", 880.0, 8.0, 240.0),
        ("mine", "Cookie Mine", 9_600.0, 47.0, 2_000.0),
        ("factory", "Factory", 130_000.0, 260.0, 25_000.0),
        ("bank", "Bank", 1_400_000.0, 1_400.0, 200_000.0),
        ("temple", "Temple", 20_000_000.0, 7_800.0, 1_000_000.0),
        ("wizard", "Wizard Tower", 330_000_000.0, 44_000.0, 10_000_000.0),
        ("shipment", "Shipment", 5_100_000_000.0, 260_000.0, 100_000_000.0),
        ("alchemy", "Alchemy Lab", 75_000_000_000.0, 1_600_000.0, 1_000_000_000.0),
        ("portal", "Portal", 1_000_000_000_000.0, 10_000_000.0, 10_000_000_000.0),
        ("time", "Time Machine", 14_000_000_000_000.0, 65_000_000.0, 100_000_000_000.0),
    ];
    rows.iter()
        .map(|&(id, name, base_cost, base_rate, unlock_threshold)| GeneratorDef {
            id: id.into(),
            name: name.into(),
            base_cost,
            base_rate,
            unlock_threshold,
        })
        .collect()
}

fn standard_modifiers() -> Vec<ModifierDef> {
    fn click(id: &str, name: &str, cost: f64, unlock: f64, multiplier: f64) -> ModifierDef {
        ModifierDef {
            id: id.into(),
            name: name.into(),
            cost,
            unlock_threshold: unlock,
            effect: Effect::Click { multiplier },
        }
    }
    fn boost(id: &str, name: &str, cost: f64, unlock: f64, target: &str) -> ModifierDef {
        ModifierDef {
            id: id.into(),
            name: name.into(),
            cost,
            unlock_threshold: unlock,
            effect: Effect::Generator {
                target: target.into(),
                multiplier: 2.0,
            },
        }
    }
    fn global(id: &str, name: &str, cost: f64, multiplier: f64) -> ModifierDef {
        ModifierDef {
            id: id.into(),
            name: name.into(),
            cost,
            unlock_threshold: cost,
            effect: Effect::Global { multiplier },
        }
    }

    vec![
        click("reinforced_index", "Reinforced Index Finger", 80.0, 40.0, 2.0),
        click("carpal_tunnel", "Carpal Tunnel Prevention Cream", 400.0, 200.0, 2.0),
        click("ambidextrous", "Ambidextrous", 8_000.0, 3_000.0, 2.0),
        click("thousand_fingers", "Thousand Fingers", 80_000.0, 50_000.0, 5.0),
        click("million_fingers", "Million Fingers", 8_000_000.0, 4_000_000.0, 10.0),
        boost("forwards_from_grandma", "Forwards from Grandma", 1_000.0, 500.0, "grandma"),
        boost("steel_plated_rolling_pins", "Steel-plated Rolling Pins", 5_000.0, 2_500.0, "grandma"),
        boost("lubricated_dentures", "Lubricated Dentures", 50_000.0, 25_000.0, "grandma"),
        boost("prune_juice", "Prune Juice", 500_000.0, 250_000.0, "grandma"),
        boost("cheap_hoes", "Cheap Hoes", 11_000.0, 5_500.0, "farm"),
        boost("fertilizer", "Fertilizer", 55_000.0, 27_500.0, "farm"),
        boost("cookie_seeds", "Cookie Seeds", 550_000.0, 275_000.0, "farm"),
        boost("gmo_cookies", "GMO Cookies", 5_500_000.0, 2_750_000.0, "farm"),
        boost("sugar_gas", "Sugar Gas", 120_000.0, 60_000.0, "mine"),
        boost("megadrill", "Megadrill", 600_000.0, 300_000.0, "mine"),
        boost("ultradrill", "Ultradrill", 6_000_000.0, 3_000_000.0, "mine"),
        boost("sturdier_conveyor", "Sturdier Conveyor Belts", 1_300_000.0, 650_000.0, "factory"),
        boost("child_labor", "Child Labor", 6_500_000.0, 3_250_000.0, "factory"),
        boost("sweatshop", "Sweatshop", 65_000_000.0, 32_500_000.0, "factory"),
        boost("taller_tellers", "Taller Tellers", 14_000_000.0, 7_000_000.0, "bank"),
        boost(
            "scissor_resistant_credit_cards",
            "Scissor-resistant Credit Cards",
            70_000_000.0,
            35_000_000.0,
            "bank",
        ),
        global("lucky_day", "Lucky Day", 77_777.0, 1.5),
        global("serendipity", "Serendipity", 777_777.0, 1.5),
        global("get_lucky", "Get Lucky", 7_777_777.0, 2.0),
    ]
}

fn standard_achievements() -> Vec<AchievementDef> {
    use AchievementRule::*;
    let a = |id: &str, text: &str, rule: AchievementRule| AchievementDef {
        id: id.into(),
        text: text.into(),
        rule,
    };
    let owned = |g: &str| GeneratorOwned { generator: g.into() };
    vec![
        a("first10", "First 10 cookies baked!", LifetimeAtLeast { amount: 10.0 }),
        a("first100", "100 cookies baked!", LifetimeAtLeast { amount: 100.0 }),
        a("first1k", "1,000 cookies baked!", LifetimeAtLeast { amount: 1e3 }),
        a("first10k", "10,000 cookies baked!", LifetimeAtLeast { amount: 1e4 }),
        a("first100k", "100,000 cookies baked!", LifetimeAtLeast { amount: 1e5 }),
        a("first1m", "1 MILLION cookies baked!", LifetimeAtLeast { amount: 1e6 }),
        a("first1b", "1 BILLION cookies baked!", LifetimeAtLeast { amount: 1e9 }),
        a("firstGrandma", "First Grandma hired!", owned("grandma")),
        a("firstFactory", "First Factory built!", owned("factory")),
        a("firstPortal", "First Portal opened!", owned("portal")),
        a("firstTime", "Time Machine acquired!", owned("time")),
        a("idle", "True idler: 100 cookies without clicking!", IdleLifetime { amount: 100.0 }),
        a("clicker", "1,000 clicks! Dedication!", ClicksAtLeast { count: 1_000 }),
        a(
            "speedClicker",
            "Speed clicker: mostly manual!",
            MostlyManual {
                clicks: 100,
                max_ratio: 2.0,
            },
        ),
        a("bigSpender", "100 total upgrades bought!", TotalGeneratorsAtLeast { count: 100 }),
        a("prestige1", "First prestige! The journey begins.", PrestigeAtLeast { points: 1 }),
        a("prestige10", "10 prestige points! Veteran baker.", PrestigeAtLeast { points: 10 }),
        a("level5", "Level 5 reached! You're getting good at this.", LevelAtLeast { level: 5 }),
        a("level10", "Level 10 reached! Experienced baker!", LevelAtLeast { level: 10 }),
        a("level25", "Level 25 reached! Master baker!", LevelAtLeast { level: 25 }),
        a("level50", "Level 50 reached! Cookie legend!", LevelAtLeast { level: 50 }),
        a("upgrader", "5 cookie upgrades purchased!", ModifiersAtLeast { count: 5 }),
        a("collector", "15 cookie upgrades purchased! Collector!", ModifiersAtLeast { count: 15 }),
    ]
}
