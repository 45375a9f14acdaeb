//! Cookie save/load.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION` is written into every record. Adding a field does not
//!   bump it: readers default anything they don't find.
//! - Every field is decoded on its own. A missing field, a field of the
//!   wrong type, a negative count or a non-finite number falls back to that
//!   field's default without failing the rest of the record.
//! - Records from the older layout (generator counts under `buildings`,
//!   `cookieUpgrades` as an id array, `prestigeUpgrades`) are migrated on
//!   read. The next save writes the current layout, so the migration runs
//!   once.
//!
//! Only a record that is not a JSON object at all fails to load, and a failed
//! load never touches the caller's state.

use std::collections::{BTreeMap, BTreeSet};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::catalog::Catalog;
use super::leveling;
use super::prestige;
use super::state::Progression;
use crate::error::SaveError;

/// Format version written by this build.
pub const SAVE_VERSION: u32 = 3;

/// What gets written to storage.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveRecord<'a> {
    version: u32,
    cookies: f64,
    total_cookies: f64,
    total_clicks: u64,
    /// Generator id -> owned count.
    upgrades: &'a BTreeMap<String, u32>,
    /// Modifier id -> purchased.
    cookie_upgrades: BTreeMap<&'a str, bool>,
    last_save: i64,
    prestige_points: u64,
    achievements: BTreeMap<&'a str, bool>,
    start_time: i64,
    level: u32,
    experience: f64,
    experience_to_next: f64,
}

/// What gets read back. Every field is optional and forgiving.
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct LoadRecord {
    #[serde(deserialize_with = "lenient_number")]
    version: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    cookies: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    total_cookies: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    total_clicks: Option<f64>,
    #[serde(deserialize_with = "lenient_counts")]
    upgrades: Option<BTreeMap<String, f64>>,
    #[serde(deserialize_with = "lenient_flags")]
    cookie_upgrades: Option<BTreeSet<String>>,
    #[serde(deserialize_with = "lenient_number")]
    last_save: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    prestige_points: Option<f64>,
    #[serde(deserialize_with = "lenient_flags")]
    achievements: Option<BTreeSet<String>>,
    #[serde(deserialize_with = "lenient_number")]
    start_time: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    level: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    experience: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    experience_to_next: Option<f64>,

    // Older layout.
    #[serde(deserialize_with = "lenient_counts")]
    buildings: Option<BTreeMap<String, f64>>,
    #[serde(deserialize_with = "lenient_value")]
    prestige_upgrades: Option<Value>,
}

/// A number, or a string that parses as one. Anything else is "absent".
fn number_of(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(number_of(&v))
}

fn lenient_value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Ok(Some(Value::deserialize(d)?))
}

/// `{id: count}`. Entries whose count isn't a number are dropped.
fn lenient_counts<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<BTreeMap<String, f64>>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Object(map) => Some(
            map.iter()
                .filter_map(|(k, v)| number_of(v).map(|n| (k.clone(), n)))
                .collect(),
        ),
        _ => None,
    })
}

/// `{id: true}` or `[id, ...]`.
fn lenient_flags<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BTreeSet<String>>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Object(map) => Some(
            map.iter()
                .filter(|(_, v)| is_truthy(v))
                .map(|(k, _)| k.clone())
                .collect(),
        ),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    })
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn non_negative(v: Option<f64>) -> Option<f64> {
    v.filter(|n| *n >= 0.0)
}

/// Clamp into an integer count; negatives and fractions are tolerated.
fn count(v: Option<f64>) -> Option<u64> {
    non_negative(v).map(|n| n.floor().min(u64::MAX as f64) as u64)
}

/// Which layout a record was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Current,
    /// The `buildings` / `prestigeUpgrades` layout.
    Legacy,
}

/// A successfully decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub state: Progression,
    pub schema: Schema,
}

/// Write a record capturing every persisted field of `state`.
pub fn serialize(state: &Progression) -> Result<String, SaveError> {
    let record = SaveRecord {
        version: SAVE_VERSION,
        cookies: state.balance,
        total_cookies: state.lifetime_total,
        total_clicks: state.total_actions,
        upgrades: &state.owned,
        cookie_upgrades: state
            .purchased_modifiers
            .iter()
            .map(|id| (id.as_str(), true))
            .collect(),
        last_save: state.last_save_epoch_ms,
        prestige_points: state.prestige_points,
        achievements: state
            .achievements
            .iter()
            .map(|id| (id.as_str(), true))
            .collect(),
        start_time: state.start_time_ms,
        level: state.level,
        experience: state.experience,
        experience_to_next: state.experience_to_next,
    };
    Ok(serde_json::to_string(&record)?)
}

/// Parse a record into a fresh state. `now_ms` stands in for missing
/// timestamps.
pub fn deserialize(json: &str, catalog: &Catalog, now_ms: i64) -> Result<Decoded, SaveError> {
    let value: Value = serde_json::from_str(json)?;
    decode_value(value, catalog, now_ms)
}

fn decode_value(value: Value, catalog: &Catalog, now_ms: i64) -> Result<Decoded, SaveError> {
    if !value.is_object() {
        return Err(SaveError::NotAnObject);
    }
    let raw: LoadRecord = serde_json::from_value(value)?;

    let (counts, schema) = match (raw.upgrades, raw.buildings) {
        (Some(upgrades), _) => (upgrades, Schema::Current),
        (None, Some(buildings)) => (buildings, Schema::Legacy),
        (None, None) => (BTreeMap::new(), Schema::Current),
    };
    if schema == Schema::Legacy {
        info!(
            version = raw.version.unwrap_or(0.0),
            had_prestige_upgrades = raw.prestige_upgrades.is_some(),
            "migrating legacy save layout"
        );
    }

    let mut state = Progression::new(now_ms);
    state.balance = non_negative(raw.cookies).unwrap_or(0.0);
    state.lifetime_total = non_negative(raw.total_cookies).unwrap_or(0.0);
    state.total_actions = count(raw.total_clicks).unwrap_or(0);
    state.owned = counts
        .into_iter()
        .filter(|(id, _)| {
            let known = catalog.generator(id).is_some();
            if !known {
                debug!(generator = %id, "dropping unknown generator from save");
            }
            known
        })
        .filter_map(|(id, n)| {
            let n = count(Some(n))?.min(u32::MAX as u64) as u32;
            (n > 0).then_some((id, n))
        })
        .collect();
    state.purchased_modifiers = raw
        .cookie_upgrades
        .unwrap_or_default()
        .into_iter()
        .filter(|id| catalog.modifier(id).is_some())
        .collect();
    state.achievements = raw
        .achievements
        .unwrap_or_default()
        .into_iter()
        .filter(|id| catalog.achievements.iter().any(|a| &a.id == id))
        .collect();
    state.prestige_points = count(raw.prestige_points).unwrap_or(0);
    state.last_save_epoch_ms = non_negative(raw.last_save).map_or(now_ms, |n| n as i64);
    state.start_time_ms = non_negative(raw.start_time).map_or(now_ms, |n| n as i64);

    state.level = count(raw.level)
        .filter(|&l| l >= 1)
        .map(|l| l.min(u32::MAX as u64) as u32)
        .unwrap_or(1);
    state.experience = non_negative(raw.experience).unwrap_or(0.0);
    state.experience_to_next = raw
        .experience_to_next
        .filter(|n| *n > 0.0)
        .unwrap_or_else(|| leveling::threshold_for(state.level));
    leveling::normalize(&mut state);
    prestige::refresh_multiplier(&mut state);

    Ok(Decoded { state, schema })
}

/// A copy-paste string: the save record, base64 encoded.
pub fn export_portable(state: &Progression) -> Result<String, SaveError> {
    Ok(STANDARD.encode(serialize(state)?))
}

/// Read an exported string, or a raw JSON record.
///
/// The balance must be present as a non-negative number; everything else is
/// as forgiving as a normal load.
pub fn import_portable(text: &str, catalog: &Catalog, now_ms: i64) -> Result<Decoded, SaveError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SaveError::Empty);
    }
    let json = STANDARD
        .decode(text)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| text.to_string());

    let value: Value = serde_json::from_str(&json)?;
    let balance_ok = value
        .get("cookies")
        .and_then(Value::as_f64)
        .is_some_and(|c| c.is_finite() && c >= 0.0);
    if !value.is_object() {
        return Err(SaveError::NotAnObject);
    }
    if !balance_ok {
        return Err(SaveError::InvalidBalance);
    }
    decode_value(value, catalog, now_ms)
}
