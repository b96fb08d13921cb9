//! Stored Entry Module
//!
//! Defines the raw entry shape held by backends, with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

// == Stored Entry ==
/// A single raw entry as held by a backend: opaque bytes plus expiry metadata.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The stored value, already serialized
    pub value: Vec<u8>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoredEntry {
    /// Creates a new entry. A TTL of zero means the entry never expires.
    /// Oversized TTLs saturate instead of wrapping; u64::MAX milliseconds
    /// is far enough out to act as "never".
    pub fn new(value: Vec<u8>, ttl_secs: u64) -> Self {
        let now = now_ms();
        let expires_at = if ttl_secs > 0 {
            Some(now.saturating_add(ttl_secs.saturating_mul(1000)))
        } else {
            None
        };

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    /// An entry is expired once the current time reaches its expiration time.
    /// Expired entries are logically absent: reads must never return them.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => now_ms() >= expires,
            None => false,
        }
    }

    /// Remaining lifetime in milliseconds, or None if the entry never expires.
    /// Returns Some(0) once expired.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let now = now_ms();
            expires.saturating_sub(now)
        })
    }
}

// == Key TTL ==
/// Result of a TTL query against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// Key does not exist (never set, deleted, or expired)
    Missing,
    /// Key exists with no expiry
    NoExpiry,
    /// Key exists and expires in this many whole seconds (rounded up)
    Remaining(u64),
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

/// Converts a millisecond duration to whole seconds, rounding up.
pub fn ms_to_secs_ceil(ms: u64) -> u64 {
    ms.div_ceil(1000)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_no_ttl_never_expires() {
        let entry = StoredEntry::new(b"v".to_vec(), 0);

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining_ms().is_none());
    }

    #[test]
    fn test_entry_with_ttl() {
        let entry = StoredEntry::new(b"v".to_vec(), 60);

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
        let remaining = entry.ttl_remaining_ms().unwrap();
        assert!(remaining <= 60_000);
        assert!(remaining >= 59_000);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = StoredEntry::new(b"v".to_vec(), 1);

        assert!(!entry.is_expired());
        sleep(Duration::from_millis(1100));
        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining_ms().unwrap(), 0);
    }

    #[test]
    fn test_expiration_boundary() {
        // Expired exactly at its expiration instant, not one ms later.
        let now = now_ms();
        let entry = StoredEntry {
            value: b"v".to_vec(),
            created_at: now,
            expires_at: Some(now),
        };

        assert!(entry.is_expired(), "entry should be expired at boundary");
    }

    #[test]
    fn test_huge_ttl_saturates_instead_of_wrapping() {
        let entry = StoredEntry::new(b"v".to_vec(), u64::MAX);

        assert_eq!(entry.expires_at, Some(u64::MAX));
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining_ms().unwrap() > 0);
    }

    #[test]
    fn test_ms_to_secs_ceil() {
        assert_eq!(ms_to_secs_ceil(0), 0);
        assert_eq!(ms_to_secs_ceil(1), 1);
        assert_eq!(ms_to_secs_ceil(1000), 1);
        assert_eq!(ms_to_secs_ceil(1001), 2);
        assert_eq!(ms_to_secs_ceil(59_999), 60);
    }
}
