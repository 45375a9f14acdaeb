//! Progression engine for an incremental cookie clicker.
//!
//! Rendering, audio and input wiring live elsewhere; they read derived
//! values from [`Engine`] and call its mutators. A browser build pairs the
//! engine with `storage::LocalStorage` and [`clock::SystemClock`] and calls
//! [`Engine::frame`] from `requestAnimationFrame`.

pub mod clock;
pub mod config;
pub mod cookie;
pub mod error;
pub mod settings;
pub mod storage;
pub mod time;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use cookie::{Catalog, Engine, FrameReport, LoadReport, Phase, PrestigePreview, Progression};
pub use error::{CatalogError, PrestigeError, PurchaseError, SaveError, StorageError};
pub use settings::Settings;
pub use storage::{MemoryStore, SaveStore};
