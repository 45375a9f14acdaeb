//! Player settings, persisted separately from the progression save.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SaveError;
use crate::storage::SaveStore;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub autosave: bool,
    pub sound: bool,
    pub haptics: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave: true,
            sound: true,
            haptics: true,
        }
    }
}

impl Settings {
    /// Read settings from `store`. Missing fields keep their defaults; a
    /// missing or unreadable record yields the defaults.
    pub fn load(store: &impl SaveStore, key: &str) -> Self {
        let raw = match store.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!(key, error = %e, "settings read failed, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(key, error = %e, "settings record unparsable, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut impl SaveStore, key: &str) -> Result<(), SaveError> {
        let json = serde_json::to_string(self)?;
        store.write(key, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_all_on() {
        let s = Settings::default();
        assert!(s.autosave && s.sound && s.haptics);
    }

    #[test]
    fn save_and_load() {
        let mut store = MemoryStore::new();
        let s = Settings {
            autosave: false,
            sound: true,
            haptics: false,
        };
        s.save(&mut store, "settings").unwrap();
        assert_eq!(Settings::load(&store, "settings"), s);
    }

    #[test]
    fn partial_record_fills_defaults() {
        let mut store = MemoryStore::new();
        store.write("settings", r#"{"sound": false}"#).unwrap();
        let s = Settings::load(&store, "settings");
        assert!(s.autosave);
        assert!(!s.sound);
        assert!(s.haptics);
    }

    #[test]
    fn garbage_record_yields_defaults() {
        let mut store = MemoryStore::new();
        store.write("settings", "not json").unwrap();
        assert_eq!(Settings::load(&store, "settings"), Settings::default());
    }
}
