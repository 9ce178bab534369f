//! Change records emitted by `get_changeset`.
//!
//! A change-set is a sequence of [`Change`] records whose application to
//! the source replica produces the destination replica. The serialized
//! field names (`"Operation type"`, `"Key"`, `"Value"`, `"Source value"`,
//! `"Destination value"`) are part of the interop contract and must stay
//! stable.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{Key, Value};

/// A single reconciliation instruction.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "Operation type")
)]
#[derive(Clone, Debug, PartialEq)]
pub enum Change<K, V> {
    /// The key exists in the destination only.
    Create {
        #[cfg_attr(feature = "serde", serde(rename = "Key"))]
        key: K,
        #[cfg_attr(feature = "serde", serde(rename = "Value"))]
        value: V,
    },
    /// The key exists in the source only.
    Delete {
        #[cfg_attr(feature = "serde", serde(rename = "Key"))]
        key: K,
        #[cfg_attr(feature = "serde", serde(rename = "Value"))]
        value: V,
    },
    /// The key exists on both sides with differing values.
    Update {
        #[cfg_attr(feature = "serde", serde(rename = "Key"))]
        key: K,
        #[cfg_attr(feature = "serde", serde(rename = "Source value"))]
        source_value: V,
        #[cfg_attr(feature = "serde", serde(rename = "Destination value"))]
        destination_value: V,
    },
}

#[cfg(feature = "serde")]
impl<K: Serialize, V: Serialize> Change<K, V> {
    /// Render the record as JSON with its interop field names.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<K: Key, V: Value> Change<K, V> {
    /// The key this record concerns.
    pub fn key(&self) -> &K {
        match self {
            Change::Create { key, .. }
            | Change::Delete { key, .. }
            | Change::Update { key, .. } => key,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Change::Create { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Change::Delete { .. })
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Change::Update { .. })
    }
}

/* ---------------------------------- Tests ----------------------------------- */
