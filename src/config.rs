//! Engine configuration.

use serde::Deserialize;

/// Milliseconds per simulation tick (10 ticks/sec).
pub const TICK_MS: u32 = 100;

/// Autosave interval.
pub const AUTOSAVE_MS: u32 = 10_000;

/// Shortest absence that earns an offline credit. Quick reloads earn nothing.
pub const OFFLINE_MIN_MS: i64 = 60_000;

/// How often auto-buy gets to make one purchase.
pub const AUTO_BUY_INTERVAL_MS: f64 = 1_000.0;

/// One automatic click per this many milliseconds (2 per second).
pub const AUTO_CLICK_INTERVAL_MS: f64 = 500.0;

/// Main save entry key.
pub const STORAGE_KEY: &str = "cookiesweb-save-v2";

/// Settings entry key.
pub const SETTINGS_KEY: &str = "cookiesweb-settings-v1";

/// Tunables for an [`crate::cookie::Engine`].
///
/// Every field is optional when read from JSON; missing ones keep the
/// defaults above.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub tick_ms: u32,
    pub autosave_ms: u32,
    /// Credit passive income for the time between the last save and a load.
    /// Off by default: the shipped game stopped awarding cookies while away.
    pub offline_progress: bool,
    pub offline_min_ms: i64,
    pub auto_buy_interval_ms: f64,
    pub auto_click_interval_ms: f64,
    pub storage_key: String,
    pub settings_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            autosave_ms: AUTOSAVE_MS,
            offline_progress: false,
            offline_min_ms: OFFLINE_MIN_MS,
            auto_buy_interval_ms: AUTO_BUY_INTERVAL_MS,
            auto_click_interval_ms: AUTO_CLICK_INTERVAL_MS,
            storage_key: STORAGE_KEY.to_string(),
            settings_key: SETTINGS_KEY.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Storage key of a numbered save slot.
    pub fn slot_key(&self, slot: u32) -> String {
        format!("{}-slot{}", self.storage_key, slot)
    }
}
