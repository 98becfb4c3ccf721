use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

/// A map whose entries are locked individually.
///
/// The outer lock is held only long enough to find or insert an entry.
/// Callers work on an entry through closures, so an entry lock is never
/// held across an `.await`.
#[derive(Debug)]
pub struct KeyedStore<K, V> {
    entries: RwLock<HashMap<K, Arc<Mutex<V>>>>,
}

impl<K, V> Default for KeyedStore<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry, replacing any entry with the same key.
    pub async fn insert(&self, key: K, value: V) {
        self.entries
            .write()
            .await
            .insert(key, Arc::new(Mutex::new(value)));
    }

    async fn entry(&self, key: &K) -> Option<Arc<Mutex<V>>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Run `f` against the entry under its lock.
    pub async fn read<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let entry = self.entry(key).await?;
        let guard = entry.lock().await;
        Some(f(&guard))
    }

    /// Run `f` against the entry with exclusive access.
    ///
    /// Everything `f` does is atomic with respect to other calls on the
    /// same key.
    pub async fn mutate<R>(&self, key: &K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let entry = self.entry(key).await?;
        let mut guard = entry.lock().await;
        Some(f(&mut guard))
    }

    /// Apply `f` to every entry, keeping the `Some` results.
    pub async fn collect<R>(&self, mut f: impl FnMut(&V) -> Option<R>) -> Vec<R> {
        let entries: Vec<Arc<Mutex<V>>> = self.entries.read().await.values().cloned().collect();
        let mut out = Vec::new();
        for entry in entries {
            if let Some(item) = f(&*entry.lock().await) {
                out.push(item);
            }
        }
        out
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
