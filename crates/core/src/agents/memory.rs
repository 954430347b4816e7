//! Per-agent TTL key/value cache.
//!
//! Every agent instance owns exactly one [`MemoryStore`]; it is never shared
//! across agents or tenants.

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// A single cached value.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    pub value: Value,
    pub stored_at: Instant,
    pub ttl: Option<Duration>,
}

impl MemoryEntry {
    /// An entry with a TTL is logically absent once strictly more than
    /// `ttl` has elapsed since it was stored.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(self.stored_at) > ttl)
    }
}

/// TTL-bearing key/value store.
///
/// Expiry is enforced lazily on read and swept opportunistically on write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, MemoryEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// A zero `ttl` is the same as none: the entry never expires. Expired
    /// entries are swept after the insert.
    pub fn save(&mut self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let now = Instant::now();
        self.entries.insert(
            key.into(),
            MemoryEntry {
                value,
                stored_at: now,
                ttl: ttl.filter(|ttl| !ttl.is_zero()),
            },
        );
        self.sweep(now);
    }

    /// Read the value stored under `key`.
    ///
    /// An expired entry is evicted and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let expired = self.entries.get(key)?.is_expired(now);
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn sweep(&mut self, now: Instant) {
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_and_get_without_ttl() {
        let mut store = MemoryStore::new();
        store.save("last_period", json!("march"), None);

        assert_eq!(store.get("last_period"), Some(json!("march")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing_key() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_save_replaces_previous_value() {
        let mut store = MemoryStore::new();
        store.save("k", json!(1), None);
        store.save("k", json!(2), None);

        assert_eq!(store.get("k"), Some(json!(2)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_evicted_on_read() {
        let mut store = MemoryStore::new();
        store.save("k", json!("v"), Some(Duration::from_secs(1)));

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert_eq!(store.get("k"), None);
        assert!(!store.contains_key("k"), "expired entry must be evicted");
        assert_eq!(store.get("k"), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_alive_until_ttl_strictly_exceeded() {
        let mut store = MemoryStore::new();
        store.save("k", json!("v"), Some(Duration::from_secs(1)));

        tokio::time::advance(Duration::from_millis(1000)).await;
        assert_eq!(store.get("k"), Some(json!("v")));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(store.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_sweeps_expired_entries() {
        let mut store = MemoryStore::new();
        store.save("short", json!(1), Some(Duration::from_secs(1)));
        store.save("forever", json!(2), None);

        tokio::time::advance(Duration::from_secs(2)).await;
        store.save("fresh", json!(3), Some(Duration::from_secs(10)));

        assert!(!store.contains_key("short"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("forever"), Some(json!(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_never_expires() {
        let mut store = MemoryStore::new();
        store.save("k", json!("v"), Some(Duration::ZERO));

        tokio::time::advance(Duration::from_secs(3600)).await;
        store.save("other", json!(1), None);

        assert_eq!(store.get("k"), Some(json!("v")));
    }

    #[test]
    fn test_clear_and_remove() {
        let mut store = MemoryStore::new();
        store.save("a", json!(1), None);
        store.save("b", json!(2), None);

        assert_eq!(store.remove("a"), Some(json!(1)));
        store.clear();
        assert!(store.is_empty());
    }
}
