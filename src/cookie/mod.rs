//! Cookie progression engine.
//!
//! The submodules are pure functions over a [`Progression`]; [`Engine`] owns
//! one of them together with the catalog, settings and storage, and is the
//! only thing a UI layer needs to talk to.

pub mod achievements;
pub mod catalog;
pub mod leveling;
pub mod logic;
pub mod multipliers;
pub mod prestige;
pub mod save;
pub mod state;

mod simulator;

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{PrestigeError, PurchaseError, SaveError};
use crate::settings::Settings;
use crate::storage::SaveStore;
use crate::time::{GameTime, Interval};

pub use catalog::Catalog;
pub use logic::AutoPurchase;
pub use prestige::PrestigePreview;
pub use save::Schema;
pub use state::Progression;

/// Whether the persisted game has been read yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unloaded,
    Loaded,
}

/// What a successful load did.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub schema: Schema,
    /// Cookies credited for time away. Zero unless offline progress is on.
    pub offline_gain: f64,
}

/// What one [`Engine::frame`] call advanced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub ticks: u64,
    pub gained: f64,
    pub saved: bool,
    pub auto_clicks: u64,
    pub auto_bought: Vec<AutoPurchase>,
}

/// Result of advancing the economy once.
struct Step {
    gained: f64,
    auto_clicks: u64,
    auto_bought: Vec<AutoPurchase>,
}

pub struct Engine<S: SaveStore, C: Clock> {
    state: Progression,
    catalog: Catalog,
    config: EngineConfig,
    settings: Settings,
    store: S,
    clock: C,
    phase: Phase,
    game_time: GameTime,
    autosave: Interval,
    auto_buy: bool,
    auto_buy_timer: Interval,
    auto_click: bool,
    auto_click_timer: Interval,
}

impl<S: SaveStore, C: Clock> Engine<S, C> {
    /// A fresh, unloaded engine. Settings are read from `store` right away.
    pub fn new(catalog: Catalog, config: EngineConfig, store: S, clock: C) -> Self {
        let settings = Settings::load(&store, &config.settings_key);
        let mut autosave = Interval::new(config.autosave_ms as f64);
        if !settings.autosave {
            autosave.stop();
        }
        Self {
            state: Progression::new(clock.now_ms()),
            game_time: GameTime::new(config.tick_ms),
            auto_buy_timer: Interval::new(config.auto_buy_interval_ms),
            auto_click_timer: Interval::new(config.auto_click_interval_ms),
            autosave,
            auto_buy: false,
            auto_click: false,
            phase: Phase::Unloaded,
            catalog,
            config,
            settings,
            store,
            clock,
        }
    }

    /// `new` followed by a load of the main save. A missing or broken save
    /// starts a fresh game; either way the engine ends up loaded.
    pub fn start(catalog: Catalog, config: EngineConfig, store: S, clock: C) -> Self {
        let mut engine = Self::new(catalog, config, store, clock);
        match engine.load() {
            Ok(_) => {}
            Err(SaveError::NoSave(_)) => debug!("no save found, starting fresh"),
            Err(e) => warn!(error = %e, "save could not be loaded, starting fresh"),
        }
        engine.phase = Phase::Loaded;
        engine
    }

    // ── read accessors ──────────────────────────────────────────

    pub fn state(&self) -> &Progression {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn balance(&self) -> f64 {
        self.state.balance
    }

    pub fn lifetime_total(&self) -> f64 {
        self.state.lifetime_total
    }

    /// Cookies per second.
    pub fn rate(&self) -> f64 {
        logic::total_rate(&self.state, &self.catalog)
    }

    pub fn click_power(&self) -> f64 {
        multipliers::click_power(&self.state, &self.catalog)
    }

    /// Prestige × global × level.
    pub fn current_multiplier(&self) -> f64 {
        multipliers::current_multiplier(&self.state, &self.catalog)
    }

    /// Price of the next generator unit, or of a modifier. `None` for
    /// unknown ids.
    pub fn per_item_cost(&self, id: &str) -> Option<f64> {
        logic::generator_cost(&self.state, &self.catalog, id)
            .or_else(|| self.catalog.modifier(id).map(|m| m.cost))
    }

    pub fn owned(&self, generator_id: &str) -> u32 {
        self.state.owned_count(generator_id)
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        logic::is_unlocked(&self.state, &self.catalog, id)
    }

    pub fn next_generator_unlock(&self) -> Option<&catalog::GeneratorDef> {
        logic::next_generator_unlock(&self.state, &self.catalog)
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn experience(&self) -> f64 {
        self.state.experience
    }

    pub fn experience_to_next(&self) -> f64 {
        self.state.experience_to_next
    }

    pub fn prestige_points(&self) -> u64 {
        self.state.prestige_points
    }

    pub fn prestige_multiplier(&self) -> f64 {
        self.state.prestige_multiplier
    }

    pub fn can_prestige(&self) -> bool {
        prestige::can_prestige(&self.state)
    }

    pub fn prestige_preview(&self) -> PrestigePreview {
        prestige::preview(&self.state)
    }

    pub fn achievements(&self) -> &BTreeSet<String> {
        &self.state.achievements
    }

    pub fn play_time_ms(&self) -> i64 {
        self.state.play_time_ms(self.clock.now_ms())
    }

    pub fn auto_buy(&self) -> bool {
        self.auto_buy
    }

    pub fn auto_click(&self) -> bool {
        self.auto_click
    }

    /// Whether enough has been baked for the auto-clicker to run.
    pub fn auto_click_unlocked(&self) -> bool {
        self.state.lifetime_total >= logic::AUTO_CLICK_UNLOCK
    }

    // ── mutators ────────────────────────────────────────────────

    pub fn click(&mut self) -> f64 {
        logic::click(&mut self.state, &self.catalog)
    }

    pub fn purchase_generator(&mut self, id: &str) -> Result<f64, PurchaseError> {
        logic::purchase_generator(&mut self.state, &self.catalog, id)
    }

    pub fn purchase_modifier(&mut self, id: &str) -> Result<f64, PurchaseError> {
        logic::purchase_modifier(&mut self.state, &self.catalog, id)
    }

    pub fn perform_prestige(&mut self) -> Result<u64, PrestigeError> {
        prestige::perform_prestige(&mut self.state, &self.catalog)
    }

    /// Advance the economy by `dt_ms` of simulated time, including the
    /// auto-clicker and auto-buy. Returns the cookies produced.
    pub fn tick(&mut self, dt_ms: f64) -> f64 {
        self.step(dt_ms).gained
    }

    fn step(&mut self, dt_ms: f64) -> Step {
        let mut gained = 0.0;
        let mut auto_clicks = 0;
        if self.auto_click && self.auto_click_unlocked() {
            auto_clicks = self.auto_click_timer.advance_periods(dt_ms);
            if auto_clicks > 0 {
                gained += logic::auto_click(&mut self.state, &self.catalog, auto_clicks);
            }
        }
        gained += logic::tick(&mut self.state, &self.catalog, dt_ms);

        let mut auto_bought = Vec::new();
        if self.auto_buy && self.auto_buy_timer.advance(dt_ms) {
            if let Some(p) = logic::auto_buy_step(&mut self.state, &self.catalog) {
                debug!(purchase = ?p, "auto-buy");
                auto_bought.push(p);
            }
        }
        Step {
            gained,
            auto_clicks,
            auto_bought,
        }
    }

    /// Drive the engine from a frame callback with a monotonic timestamp.
    ///
    /// Elapsed time is converted into whole ticks; the economy advances by
    /// that many tick lengths in one step and the autosave timer sees the
    /// same time. An autosave failure is logged, never raised.
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let ticks = self.game_time.update(now_ms);
        if ticks == 0 {
            return FrameReport::default();
        }
        let dt = ticks as f64 * self.game_time.ms_per_tick();
        let step = self.step(dt);

        let mut saved = false;
        if self.autosave.advance(dt) {
            match self.save() {
                Ok(()) => saved = true,
                Err(e) => warn!(error = %e, "autosave failed"),
            }
        }
        FrameReport {
            ticks,
            gained: step.gained,
            saved,
            auto_clicks: step.auto_clicks,
            auto_bought: step.auto_bought,
        }
    }

    /// Write the main save.
    pub fn save(&mut self) -> Result<(), SaveError> {
        let key = self.config.storage_key.clone();
        self.save_to_key(&key)
    }

    /// Replace the in-memory game with the main save.
    ///
    /// On any error the current state is kept as it was.
    pub fn load(&mut self) -> Result<LoadReport, SaveError> {
        let key = self.config.storage_key.clone();
        self.load_from_key(&key)
    }

    pub fn save_to_slot(&mut self, slot: u32) -> Result<(), SaveError> {
        let key = self.config.slot_key(slot);
        self.save_to_key(&key)
    }

    pub fn load_from_slot(&mut self, slot: u32) -> Result<LoadReport, SaveError> {
        let key = self.config.slot_key(slot);
        self.load_from_key(&key)
    }

    fn save_to_key(&mut self, key: &str) -> Result<(), SaveError> {
        let previous = self.state.last_save_epoch_ms;
        self.state.last_save_epoch_ms = self.clock.now_ms();
        let result = write_record(&mut self.store, key, &self.state);
        if let Err(e) = &result {
            self.state.last_save_epoch_ms = previous;
            warn!(key, error = %e, "save failed");
        } else {
            debug!(key, "saved");
        }
        result
    }

    fn load_from_key(&mut self, key: &str) -> Result<LoadReport, SaveError> {
        let raw = self
            .store
            .read(key)?
            .ok_or_else(|| SaveError::NoSave(key.to_string()))?;
        let now = self.clock.now_ms();
        let decoded = save::deserialize(&raw, &self.catalog, now).map_err(|e| {
            warn!(key, error = %e, "save record unreadable");
            e
        })?;

        let mut state = decoded.state;
        let offline_gain = self.offline_credit(&mut state, now);
        self.install(state);
        Ok(LoadReport {
            schema: decoded.schema,
            offline_gain,
        })
    }

    fn offline_credit(&self, state: &mut Progression, now_ms: i64) -> f64 {
        if !self.config.offline_progress {
            return 0.0;
        }
        let elapsed = now_ms - state.last_save_epoch_ms;
        if elapsed < self.config.offline_min_ms {
            return 0.0;
        }
        let gain = logic::accrue_offline(state, &self.catalog, elapsed);
        info!(elapsed_ms = elapsed, gain, "offline progress credited");
        gain
    }

    fn install(&mut self, state: Progression) {
        self.state = state;
        self.phase = Phase::Loaded;
        self.game_time.reset();
    }

    /// The game as a base64 string the player can copy elsewhere.
    pub fn export_portable(&self) -> Result<String, SaveError> {
        save::export_portable(&self.state)
    }

    /// Replace the game with an exported string (or raw JSON) and save it.
    ///
    /// A rejected import, or one that can't be saved, leaves the current
    /// game untouched.
    pub fn import_portable(&mut self, text: &str) -> Result<(), SaveError> {
        let now = self.clock.now_ms();
        let decoded = save::import_portable(text, &self.catalog, now).map_err(|e| {
            warn!(error = %e, "import rejected");
            e
        })?;
        let mut state = decoded.state;
        state.last_save_epoch_ms = now;
        write_record(&mut self.store, &self.config.storage_key, &state).map_err(|e| {
            warn!(error = %e, "imported game could not be saved");
            e
        })?;
        self.install(state);
        info!(
            lifetime = self.state.lifetime_total,
            prestige_points = self.state.prestige_points,
            "game imported"
        );
        Ok(())
    }

    /// Start over: main save removed, fresh state. Settings are kept.
    ///
    /// If the save can't be removed the current game is kept.
    pub fn hard_reset(&mut self) -> Result<(), SaveError> {
        self.store.remove(&self.config.storage_key).map_err(|e| {
            warn!(error = %e, "hard reset failed");
            SaveError::from(e)
        })?;
        self.state = Progression::new(self.clock.now_ms());
        self.game_time.reset();
        info!("hard reset");
        Ok(())
    }

    /// Apply and persist new settings. The autosave timer follows
    /// `settings.autosave` even if persisting fails.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), SaveError> {
        self.settings = settings;
        if settings.autosave {
            self.autosave.start();
        } else {
            self.autosave.stop();
        }
        settings
            .save(&mut self.store, &self.config.settings_key)
            .map_err(|e| {
                warn!(error = %e, "settings not saved");
                e
            })
    }

    pub fn set_autosave(&mut self, enabled: bool) -> Result<(), SaveError> {
        self.set_settings(Settings {
            autosave: enabled,
            ..self.settings
        })
    }

    pub fn set_auto_buy(&mut self, enabled: bool) {
        if enabled && !self.auto_buy {
            self.auto_buy_timer = Interval::new(self.config.auto_buy_interval_ms);
        }
        self.auto_buy = enabled;
    }

    /// Toggle the auto-clicker: one click per `auto_click_interval_ms` of
    /// simulated time once [`logic::AUTO_CLICK_UNLOCK`] lifetime cookies
    /// have been baked.
    pub fn set_auto_click(&mut self, enabled: bool) {
        if enabled && !self.auto_click {
            self.auto_click_timer = Interval::new(self.config.auto_click_interval_ms);
        }
        self.auto_click = enabled;
    }
}

fn write_record(store: &mut impl SaveStore, key: &str, state: &Progression) -> Result<(), SaveError> {
    let json = save::serialize(state)?;
    store.write(key, &json)?;
    Ok(())
}
