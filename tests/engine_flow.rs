//! End-to-end sessions through the public `Engine` API, backed by an
//! in-memory store and a manual clock.

use cookies_web::config::{SETTINGS_KEY, STORAGE_KEY};
use cookies_web::cookie::Schema;
use cookies_web::{
    Catalog, Engine, EngineConfig, ManualClock, MemoryStore, Phase, PrestigeError, PurchaseError,
    SaveError, SaveStore,
};

const T0: i64 = 1_700_000_000_000;

fn start<'a>(
    store: &'a mut MemoryStore,
    clock: &'a ManualClock,
) -> Engine<&'a mut MemoryStore, &'a ManualClock> {
    Engine::start(Catalog::standard(), EngineConfig::default(), store, clock)
}

#[test]
fn play_save_and_resume_in_a_new_session() {
    let clock = ManualClock::new(T0);
    let mut store = MemoryStore::new();

    let (balance, lifetime, clicks) = {
        let mut e = start(&mut store, &clock);
        for _ in 0..40 {
            e.click();
        }
        assert_eq!(e.purchase_generator("cursor"), Ok(15.0));
        assert_eq!(e.per_item_cost("cursor"), Some(18.0));
        assert_eq!(e.purchase_modifier("reinforced_index"), Err(PurchaseError::InsufficientFunds {
            cost: 80.0,
            balance: 25.0,
        }));

        // A frame loop at ~60fps for 10 seconds triggers exactly one autosave.
        let mut saves = 0;
        let mut t = 0.0;
        e.frame(t);
        while t < 10_000.0 {
            t += 16.0;
            clock.advance(16);
            if e.frame(t).saved {
                saves += 1;
            }
        }
        assert_eq!(saves, 1);
        (e.balance(), e.lifetime_total(), e.state().total_actions)
    };

    let raw = store.read(STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains("\"version\":3"));

    clock.advance(5 * 60_000);
    let e = start(&mut store, &clock);
    assert_eq!(e.phase(), Phase::Loaded);
    assert_eq!(e.state().total_actions, clicks);
    assert_eq!(e.owned("cursor"), 1);
    // Offline progress is off by default: nothing accrued while away, and the
    // balance is whatever the autosave captured.
    assert!(e.balance() <= balance);
    assert!(e.lifetime_total() <= lifetime);
    assert!(e.play_time_ms() >= 5 * 60_000);
}

#[test]
fn click_then_buy_with_exact_balance() {
    let clock = ManualClock::new(T0);
    let mut store = MemoryStore::new();
    let mut e = start(&mut store, &clock);
    e.import_portable(r#"{"cookies": 14, "totalCookies": 14}"#).unwrap();

    assert_eq!(e.click(), 1.0);
    assert_eq!(e.purchase_generator("cursor"), Ok(15.0));
    assert_eq!(e.balance(), 0.0);
    assert_eq!(e.owned("cursor"), 1);
}

#[test]
fn prestige_cycle() {
    let clock = ManualClock::new(T0);
    let mut store = MemoryStore::new();
    let mut e = start(&mut store, &clock);
    e.import_portable(
        r#"{"cookies": 40000, "totalCookies": 2500000, "prestigePoints": 1,
            "upgrades": {"cursor": 20, "grandma": 5}, "cookieUpgrades": {"reinforced_index": true},
            "level": 6}"#,
    )
    .unwrap();
    assert!((e.prestige_multiplier() - 1.1).abs() < 1e-12);

    let preview = e.prestige_preview();
    assert_eq!(preview.pending_gain, 1);
    assert!((preview.multiplier_after - 1.2).abs() < 1e-12);

    assert_eq!(e.perform_prestige(), Ok(1));
    assert_eq!(e.prestige_points(), 2);
    assert!((e.prestige_multiplier() - 1.2).abs() < 1e-12);
    assert_eq!(e.balance(), 0.0);
    assert_eq!(e.owned("cursor"), 0);
    assert_eq!(e.rate(), 0.0);
    assert_eq!(e.lifetime_total(), 2_500_000.0);
    assert_eq!(e.level(), 6);
    assert!(e.state().has_modifier("reinforced_index"));
    // 2 (modifier) × 1.2 (prestige) × 1.25 (level 6)
    assert!((e.click_power() - 3.0).abs() < 1e-9);

    assert!(matches!(
        e.perform_prestige(),
        Err(PrestigeError::NotEligible { available: 2, current: 2, .. })
    ));
}

#[test]
fn export_moves_a_game_between_stores() {
    let clock = ManualClock::new(T0);
    let mut home = MemoryStore::new();
    let mut away = MemoryStore::new();

    let blob = {
        let mut e = start(&mut home, &clock);
        for _ in 0..120 {
            e.click();
        }
        e.export_portable().unwrap()
    };

    let mut e = start(&mut away, &clock);
    assert_eq!(e.balance(), 0.0);
    e.import_portable(&blob).unwrap();
    // 100 clicks at level 1, then 20 with the 5% level bonus
    assert!((e.balance() - 121.0).abs() < 1e-9);
    assert_eq!(e.level(), 2);
    drop(e);
    assert!(away.read(STORAGE_KEY).unwrap().is_some());
}

#[test]
fn legacy_save_is_migrated_on_start() {
    let clock = ManualClock::new(T0);
    let mut store = MemoryStore::new();
    store
        .write(
            STORAGE_KEY,
            r#"{"cookies": 500, "totalCookies": 900, "buildings": {"cursor": 3, "farm": 1},
                "cookieUpgrades": ["reinforced_index"], "prestigeUpgrades": [], "totalClicks": 12}"#,
        )
        .unwrap();

    let mut e = Engine::new(Catalog::standard(), EngineConfig::default(), &mut store, &clock);
    assert_eq!(e.load().unwrap().schema, Schema::Legacy);
    assert_eq!(e.owned("farm"), 1);
    e.save().unwrap();
    drop(e);

    let raw = store.read(STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains("\"upgrades\""));
    assert!(!raw.contains("buildings"));
}

#[test]
fn unreadable_save_starts_fresh_and_is_overwritten_by_next_save() {
    let clock = ManualClock::new(T0);
    let mut store = MemoryStore::new();
    store.write(STORAGE_KEY, "not even json").unwrap();

    let mut e = start(&mut store, &clock);
    assert_eq!(e.phase(), Phase::Loaded);
    assert_eq!(e.balance(), 0.0);
    e.click();
    e.save().unwrap();
    assert!(e.load().is_ok());
}

#[test]
fn settings_survive_restart_and_hard_reset() {
    let clock = ManualClock::new(T0);
    let mut store = MemoryStore::new();
    {
        let mut e = start(&mut store, &clock);
        e.set_autosave(false).unwrap();
        e.click();
        e.save().unwrap();
        e.hard_reset().unwrap();
        assert_eq!(e.balance(), 0.0);
        assert!(matches!(e.load(), Err(SaveError::NoSave(_))));
    }
    assert!(store.read(SETTINGS_KEY).unwrap().is_some());

    let e = start(&mut store, &clock);
    assert!(!e.settings().autosave);
    assert!(e.settings().sound);
}
