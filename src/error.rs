//! Error types for rarity resolution.
//!
//! Almost nothing in the engine is fatal. Signal lookups return
//! `RarityError::MissingData` and the caller folds it into a neutral value;
//! a failed recipe lookup reads as "not craftable". Only a catalog that
//! cannot be enumerated aborts a run.

use crate::item_id::ItemId;
use thiserror::Error;

/// Errors that can occur while resolving rarities.
///
/// # Examples
///
/// ```rust
/// use rarecraft::{ItemId, RarityError};
///
/// let err = RarityError::MissingData {
///     item: ItemId::from_str("diamond"),
///     signal: "spawn probability",
/// };
/// assert_eq!(err.to_string(), "No spawn probability for item: diamond");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RarityError {
    /// An external signal lookup failed or returned nothing.
    ///
    /// Always recovered locally with a neutral value.
    #[error("No {signal} for item: {item}")]
    MissingData {
        /// The item whose signal was requested.
        item: ItemId,
        /// Which signal was missing.
        signal: &'static str,
    },

    /// The catalog could not be enumerated. This is the only run-level failure.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Configuration was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for RarityError {
    fn from(err: std::io::Error) -> Self {
        RarityError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RarityError {
    fn from(err: serde_json::Error) -> Self {
        RarityError::Serialization(err.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RarityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RarityError::CatalogUnavailable("registry offline".to_string());
        assert_eq!(err.to_string(), "Catalog unavailable: registry offline");
    }

    #[test]
    fn test_json_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: RarityError = parse.into();
        assert!(matches!(err, RarityError::Serialization(_)));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RarityError = io.into();
        assert!(matches!(err, RarityError::Io(msg) if msg.contains("gone")));
    }
}
