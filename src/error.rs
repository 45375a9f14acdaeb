//! Error types surfaced by the progression engine.
//!
//! None of these are fatal: the worst outcome is a rejected action or a
//! failed load that leaves the in-memory state untouched.

use thiserror::Error;

/// Why a generator or modifier purchase was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PurchaseError {
    #[error("unknown generator: {0}")]
    UnknownGenerator(String),

    #[error("unknown modifier: {0}")]
    UnknownModifier(String),

    #[error("{id} is locked until {threshold} lifetime cookies")]
    Locked { id: String, threshold: f64 },

    #[error("need {cost} cookies, have {balance}")]
    InsufficientFunds { cost: f64, balance: f64 },

    #[error("modifier already purchased: {0}")]
    AlreadyPurchased(String),

    #[error("requires prestige {required}, have {have}")]
    PrestigeTierTooLow { required: u64, have: u64 },
}

/// Prestige was requested without any pending points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrestigeError {
    #[error(
        "no prestige points to gain (available {available}, current {current}, lifetime {lifetime_total})"
    )]
    NotEligible {
        available: u64,
        current: u64,
        lifetime_total: f64,
    },
}

/// Failures of the key-value backend behind a [`crate::storage::SaveStore`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failures of save, load, export and import.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save record is not a JSON object")]
    NotAnObject,

    #[error("save record has no valid non-negative balance")]
    InvalidBalance,

    #[error("import text is empty")]
    Empty,

    #[error("no save found under {0}")]
    NoSave(String),
}

/// Problems found while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate catalog id: {0}")]
    DuplicateId(String),

    #[error("modifier {modifier} targets unknown generator {target}")]
    UnknownTarget { modifier: String, target: String },

    #[error("{id}: {field} must be a positive finite number")]
    InvalidNumber { id: String, field: &'static str },
}
