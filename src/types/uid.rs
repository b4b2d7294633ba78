// Copyright (c) 2024 Mike Tsao

//! Stable identifiers for canvas entities, and a factory that helps ensure
//! they are in fact unique.

use core::sync::atomic::{AtomicUsize, Ordering};
use serde::{Deserialize, Serialize};

/// An opaque identifier shared by a canvas entity and its audio-model
/// counterpart.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);
impl EntityId {
    #[allow(missing_docs)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Generates unique [EntityId]s of the form `prefix-N`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IdFactory {
    next_id_value: AtomicUsize,
}
impl Default for IdFactory {
    fn default() -> Self {
        Self::new(1)
    }
}
impl IdFactory {
    /// Creates a new [IdFactory] starting with the given value.
    pub fn new(first_id: usize) -> Self {
        Self {
            next_id_value: AtomicUsize::new(first_id),
        }
    }

    /// Generates the next unique id.
    pub fn mint_next(&self, prefix: &str) -> EntityId {
        let value = self.next_id_value.fetch_add(1, Ordering::Relaxed);
        EntityId(format!("{prefix}-{value}"))
    }

    /// Notifies the factory that an id exists that was created elsewhere (for
    /// example, restored from a snapshot). If it looks like one of ours, the
    /// factory skips past it so that it won't be minted again.
    pub fn notify_externally_minted_id(&self, id: &EntityId) {
        if let Some(value) = id
            .as_str()
            .rsplit_once('-')
            .and_then(|(_, n)| n.parse::<usize>().ok())
        {
            self.next_id_value.fetch_max(value + 1, Ordering::Relaxed);
        }
    }
}
