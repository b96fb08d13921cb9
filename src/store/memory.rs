//! In-Memory Backend
//!
//! Concurrent map backend for single-instance deployments. Expired entries
//! are reclaimed lazily on access and eagerly by the background sweeper.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::store::backend::StoreBackend;
use crate::store::entry::StoredEntry;

// == Memory Backend ==
/// `Mutex<HashMap>` backend. The lock is never held across an await point,
/// which keeps callers from stalling each other on anything but the map
/// operations themselves.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current number of live entries, expired included until swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredEntry>> {
        // A poisoned lock means a panic mid-map-op; the map itself is
        // still structurally sound, so keep serving.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
        }
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<(), StoreError> {
        self.lock()
            .insert(key.to_string(), StoredEntry::new(value, ttl_secs));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        let mut entries = self.lock();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError> {
        let mut entries = self.lock();
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            if entries.get(key).is_some_and(|e| e.is_expired()) {
                entries.remove(key);
            }
            values.push(entries.get(key).map(|e| e.value.clone()));
        }
        Ok(values)
    }

    async fn incr(&self, key: &str, amount: i64) -> Result<i64, StoreError> {
        // Read-modify-write under the single map lock, so concurrent
        // callers serialize and no update is lost.
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
        }
        let (current, expires_at) = match entries.get(key) {
            Some(entry) => {
                let text = std::str::from_utf8(&entry.value)
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
                let n: i64 = text
                    .trim()
                    .parse()
                    .map_err(|_| StoreError::Decode(format!("not an integer: {text:?}")))?;
                (n, entry.expires_at)
            }
            None => (0, None),
        };

        // Redis rejects an INCRBY that would overflow; mirror that.
        let new_value = current.checked_add(amount).ok_or_else(|| {
            StoreError::Decode("increment or decrement would overflow".to_string())
        })?;
        let mut entry = StoredEntry::new(new_value.to_string().into_bytes(), 0);
        // Arithmetic preserves any existing expiry, matching Redis INCRBY.
        entry.expires_at = expires_at;
        entries.insert(key.to_string(), entry);
        Ok(new_value)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
        }
        Ok(entries.contains_key(key))
    }

    async fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
        }
        match entries.get(key) {
            Some(entry) => match entry.ttl_remaining_ms() {
                Some(ms) => Ok(ms.div_ceil(1000) as i64),
                None => Ok(-1),
            },
            None => Ok(-2),
        }
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
        }
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = if ttl_secs > 0 {
                Some(
                    crate::store::entry::now_ms().saturating_add(ttl_secs.saturating_mul(1000)),
                )
            } else {
                None
            };
        }
        Ok(())
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.lock();
        Ok(entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .filter(|(key, _)| glob_match(pattern.as_bytes(), key.as_bytes()))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn sweep_expired(&self) -> Result<usize, StoreError> {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        Ok(before - entries.len())
    }
}

// == Glob Matching ==
/// Redis KEYS-style glob: `*` matches any run of characters, `?` matches
/// exactly one, everything else is literal.
///
/// Two-pointer matcher with single-star backtracking: on a mismatch the
/// most recent `*` re-expands by one character. Linear-ish in practice
/// and never exponential, so caller-supplied patterns cannot stall the
/// enumeration.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let mut p = 0;
    let mut t = 0;
    let mut star: Option<usize> = None;
    let mut star_t = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == b'?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == b'*' {
            star = Some(p);
            star_t = t;
            p += 1;
        } else if let Some(sp) = star {
            p = sp + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }
    p == pattern.len()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_set_and_get() {
        let backend = MemoryBackend::new();

        backend.set("k1", b"v1".to_vec(), 0).await.unwrap();
        let value = backend.get("k1").await.unwrap();

        assert_eq!(value, Some(b"v1".to_vec()));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_get_absent() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let backend = MemoryBackend::new();

        backend.set("k1", b"v1".to_vec(), 1).await.unwrap();
        assert!(backend.get("k1").await.unwrap().is_some());

        sleep(Duration::from_millis(1100)).await;

        assert_eq!(backend.get("k1").await.unwrap(), None);
        // Lazy reclamation on access removed the entry.
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let backend = MemoryBackend::new();
        backend.delete(&["nope".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_mget_preserves_order_with_holes() {
        let backend = MemoryBackend::new();

        backend.set("a", b"1".to_vec(), 0).await.unwrap();
        backend.set("c", b"3".to_vec(), 0).await.unwrap();

        let values = backend
            .mget(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();

        assert_eq!(
            values,
            vec![Some(b"1".to_vec()), None, Some(b"3".to_vec())]
        );
    }

    #[tokio::test]
    async fn test_incr_from_absent() {
        let backend = MemoryBackend::new();

        assert_eq!(backend.incr("counter", 1).await.unwrap(), 1);
        assert_eq!(backend.incr("counter", 1).await.unwrap(), 2);
        assert_eq!(backend.incr("counter", -2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_with_huge_ttl_survives() {
        let backend = MemoryBackend::new();

        backend.set("k", b"1".to_vec(), u64::MAX).await.unwrap();

        // Saturated expiry, not a wrapped-to-the-past one.
        assert_eq!(backend.get("k").await.unwrap(), Some(b"1".to_vec()));
        assert!(backend.ttl("k").await.unwrap() > 0);

        backend.expire("k", u64::MAX).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn test_incr_overflow_is_decode_error() {
        let backend = MemoryBackend::new();

        backend
            .set("k", i64::MAX.to_string().into_bytes(), 0)
            .await
            .unwrap();
        let result = backend.incr("k", 1).await;

        assert!(matches!(result, Err(StoreError::Decode(_))));
        // The stored value is untouched.
        assert_eq!(
            backend.get("k").await.unwrap(),
            Some(i64::MAX.to_string().into_bytes())
        );
    }

    #[tokio::test]
    async fn test_incr_non_integer_is_decode_error() {
        let backend = MemoryBackend::new();

        backend.set("k", b"\"text\"".to_vec(), 0).await.unwrap();
        let result = backend.incr("k", 1).await;

        assert!(matches!(result, Err(StoreError::Decode(_))));
    }

    #[tokio::test]
    async fn test_incr_preserves_expiry() {
        let backend = MemoryBackend::new();

        backend.set("counter", b"5".to_vec(), 60).await.unwrap();
        backend.incr("counter", 1).await.unwrap();

        let ttl = backend.ttl("counter").await.unwrap();
        assert!(ttl > 0 && ttl <= 60);
    }

    #[tokio::test]
    async fn test_ttl_conventions() {
        let backend = MemoryBackend::new();

        backend.set("forever", b"v".to_vec(), 0).await.unwrap();
        backend.set("brief", b"v".to_vec(), 10).await.unwrap();

        assert_eq!(backend.ttl("missing").await.unwrap(), -2);
        assert_eq!(backend.ttl("forever").await.unwrap(), -1);
        let ttl = backend.ttl("brief").await.unwrap();
        assert!(ttl > 0 && ttl <= 10);
    }

    #[tokio::test]
    async fn test_expire_adjusts_without_touching_value() {
        let backend = MemoryBackend::new();

        backend.set("k", b"v".to_vec(), 0).await.unwrap();
        backend.expire("k", 30).await.unwrap();

        assert_eq!(backend.get("k").await.unwrap(), Some(b"v".to_vec()));
        let ttl = backend.ttl("k").await.unwrap();
        assert!(ttl > 0 && ttl <= 30);

        // Zero removes the expiry again.
        backend.expire("k", 0).await.unwrap();
        assert_eq!(backend.ttl("k").await.unwrap(), -1);
    }

    #[tokio::test]
    async fn test_expire_absent_is_noop() {
        let backend = MemoryBackend::new();
        backend.expire("nope", 30).await.unwrap();
        assert_eq!(backend.ttl("nope").await.unwrap(), -2);
    }

    #[tokio::test]
    async fn test_scan_keys_glob() {
        let backend = MemoryBackend::new();

        backend.set("user:1", b"a".to_vec(), 0).await.unwrap();
        backend.set("user:2", b"b".to_vec(), 0).await.unwrap();
        backend.set("group:1", b"c".to_vec(), 0).await.unwrap();

        let mut keys = backend.scan_keys("user:*").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["user:1", "user:2"]);

        let keys = backend.scan_keys("user:?").await.unwrap();
        assert_eq!(keys.len(), 2);

        let keys = backend.scan_keys("*").await.unwrap();
        assert_eq!(keys.len(), 3);
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let backend = MemoryBackend::new();

        backend.set("gone", b"v".to_vec(), 1).await.unwrap();
        backend.set("kept", b"v".to_vec(), 60).await.unwrap();

        sleep(Duration::from_millis(1100)).await;

        let removed = backend.sweep_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_glob_match_basics() {
        assert!(glob_match(b"*", b"anything"));
        assert!(glob_match(b"*", b""));
        assert!(glob_match(b"a*c", b"abc"));
        assert!(glob_match(b"a*c", b"ac"));
        assert!(glob_match(b"a?c", b"abc"));
        assert!(!glob_match(b"a?c", b"ac"));
        assert!(!glob_match(b"abc", b"abd"));
        assert!(glob_match(b"ratelimit:*", b"ratelimit:10.0.0.1"));
    }

    #[test]
    fn test_glob_match_star_heavy_pattern_terminates_quickly() {
        let text = vec![b'a'; 200];
        let mut pattern = Vec::new();
        for _ in 0..30 {
            pattern.extend_from_slice(b"*a");
        }
        pattern.push(b'b');

        // A backtracking-exponential matcher would hang here.
        assert!(!glob_match(&pattern, &text));

        pattern.pop();
        assert!(glob_match(&pattern, &text));
    }
}
