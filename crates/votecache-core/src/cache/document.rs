//! A cache document: one JSON object of `id -> entry` under one store key.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::store::KvStore;

/// Entries that remember when they were fetched.
pub trait Dated {
    fn fetched_at(&self) -> DateTime<Utc>;
}

pub(crate) struct Loaded<K, E> {
    pub entries: BTreeMap<K, E>,
    /// Size of the stored text.
    pub bytes: usize,
}

/// Reads the document under `key`.
///
/// A document that does not parse is removed from the store and treated as
/// empty.
pub(crate) fn load<K, E>(store: &dyn KvStore, key: &str) -> Result<Loaded<K, E>>
where
    K: DeserializeOwned + Ord,
    E: DeserializeOwned,
{
    let Some(text) = store.get(key)? else {
        return Ok(Loaded {
            entries: BTreeMap::new(),
            bytes: 0,
        });
    };

    match serde_json::from_str(&text) {
        Ok(entries) => Ok(Loaded {
            entries,
            bytes: text.len(),
        }),
        Err(e) => {
            warn!(key, error = %e, bytes = text.len(), "Discarding corrupted cache document");
            discard(store, key, &text);
            Ok(Loaded {
                entries: BTreeMap::new(),
                bytes: 0,
            })
        }
    }
}

/// Removes the broken text, unless a writer has replaced it meanwhile.
fn discard(store: &dyn KvStore, key: &str, broken: &str) {
    match store.get(key) {
        Ok(Some(current)) if current == broken => {
            if let Err(e) = store.remove(key) {
                warn!(key, error = %e, "Failed to remove corrupted cache document");
            }
        }
        Ok(_) => {}
        Err(e) => warn!(key, error = %e, "Failed to re-read corrupted cache document"),
    }
}

/// Writes the document and returns its size in bytes.
pub(crate) fn save<K, E>(store: &dyn KvStore, key: &str, entries: &BTreeMap<K, E>) -> Result<usize>
where
    K: Serialize,
    E: Serialize,
{
    let text = serde_json::to_string(entries)?;
    store.set(key, &text)?;
    debug!(
        key,
        entries = entries.len(),
        kb = text.len() / 1024,
        "Saved cache document"
    );
    Ok(text.len())
}

/// Keeps the `keep` most recently fetched entries and returns the keys it
/// dropped. Equal timestamps keep the smaller key.
pub(crate) fn retain_most_recent<K, E>(entries: &mut BTreeMap<K, E>, keep: usize) -> Vec<K>
where
    K: Ord + Clone,
    E: Dated,
{
    if entries.len() <= keep {
        return Vec::new();
    }

    let mut by_recency: Vec<(DateTime<Utc>, K)> = entries
        .iter()
        .map(|(k, e)| (e.fetched_at(), k.clone()))
        .collect();
    // Newest first; BTreeMap iteration already orders keys ascending and the
    // sort is stable.
    by_recency.sort_by(|a, b| b.0.cmp(&a.0));

    let dropped: Vec<K> = by_recency.into_iter().skip(keep).map(|(_, k)| k).collect();
    for key in &dropped {
        entries.remove(key);
    }
    dropped
}
