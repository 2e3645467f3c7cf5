//! Item identifier module.
//!
//! Provides the `ItemId` type, an interned string identifier for catalog
//! entries. Uses `Arc<str>` so ids are cheap to clone while walking deep
//! recipe chains.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Interned string identifier for catalog items.
///
/// Ids are opaque to the engine: `"minecraft:iron_ingot"` and `"IRON"` are
/// treated the same way. Equal strings compare equal regardless of where
/// the id was created.
///
/// # Examples
///
/// ```rust
/// use rarecraft::ItemId;
///
/// let ingot = ItemId::from_str("iron_ingot");
/// let ingot2: ItemId = "iron_ingot".into();
/// let ingot3: ItemId = String::from("iron_ingot").into();
///
/// assert_eq!(ingot, ingot2);
/// assert_eq!(ingot, ingot3);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ItemId(Arc<str>);

impl Serialize for ItemId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ItemId::from(s))
    }
}

impl ItemId {
    /// Create a new `ItemId` from a string slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rarecraft::ItemId;
    ///
    /// let id = ItemId::from_str("stick");
    /// assert_eq!(id.as_str(), "stick");
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the string representation of this `ItemId`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_creation() {
        let id1 = ItemId::from_str("stick");
        let id2 = ItemId::from_str("stick");
        assert_eq!(id1, id2);
        assert_eq!(id1.as_str(), "stick");
    }

    #[test]
    fn test_item_id_ordering() {
        let coal = ItemId::from_str("coal");
        let iron = ItemId::from_str("iron");
        assert!(coal < iron);
    }

    #[test]
    fn test_item_id_serde_is_plain_string() {
        let id = ItemId::from_str("minecraft:torch");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"minecraft:torch\"");

        let back: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
