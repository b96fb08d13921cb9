//! Redis Backend
//!
//! Networked backend for multi-instance deployments sharing one store.
//! Expiry is enforced server-side, so the sweeper has nothing to do here.

use async_trait::async_trait;
use redis::{AsyncCommands, ErrorKind};

use crate::error::StoreError;
use crate::store::backend::StoreBackend;

// == Redis Backend ==
/// Redis keeps expiry as milliseconds in an i64; anything near u64::MAX
/// seconds would be rejected as an invalid expire time. A century is
/// "never" for our purposes.
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

pub struct RedisBackend {
    client: redis::Client,
}

impl RedisBackend {
    /// Validates the connection URL. The actual connection is established
    /// per operation via the multiplexed async connection.
    pub fn new(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::InvalidConfig(format!("redis url: {e}")))?;
        Ok(Self { client })
    }

    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

fn map_err(e: redis::RedisError) -> StoreError {
    // A type error means the stored bytes were not what the command
    // expected (e.g. INCRBY on a non-integer); everything else is treated
    // as the medium being unavailable.
    if e.kind() == ErrorKind::TypeError {
        StoreError::Decode(e.to_string())
    } else {
        StoreError::Unavailable(e.to_string())
    }
}

#[async_trait]
impl StoreBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(map_err)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        if ttl_secs > 0 {
            let _: () = conn
                .set_ex(key, value, ttl_secs.min(MAX_TTL_SECS))
                .await
                .map_err(map_err)?;
        } else {
            let _: () = conn.set(key, value).await.map_err(map_err)?;
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        let _: usize = conn.del(keys).await.map_err(map_err)?;
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        // Plain MGET via cmd so a single key still comes back as a list.
        let mut conn = self.conn().await?;
        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(values)
    }

    async fn incr(&self, key: &str, amount: i64) -> Result<i64, StoreError> {
        // INCRBY is atomic server-side; this is the primitive the
        // admission controller relies on.
        let mut conn = self.conn().await?;
        let value: i64 = conn.incr(key, amount).await.map_err(map_err)?;
        Ok(value)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        let exists: bool = conn.exists(key).await.map_err(map_err)?;
        Ok(exists)
    }

    async fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.conn().await?;
        let ttl: i64 = conn.ttl(key).await.map_err(map_err)?;
        Ok(ttl)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        if ttl_secs > 0 {
            let _: bool = conn
                .expire(key, ttl_secs.min(MAX_TTL_SECS) as i64)
                .await
                .map_err(map_err)?;
        } else {
            let _: i64 = redis::cmd("PERSIST")
                .arg(key)
                .query_async(&mut conn)
                .await
                .map_err(map_err)?;
        }
        Ok(())
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn().await?;
        let keys: Vec<String> = conn.keys(pattern).await.map_err(map_err)?;
        Ok(keys)
    }

    async fn sweep_expired(&self) -> Result<usize, StoreError> {
        // Redis evicts expired keys itself.
        Ok(0)
    }
}

// == Unit Tests ==
// These need a live Redis; run with `cargo test -- --ignored` and
// REDIS_URL pointing at a disposable instance.
#[cfg(test)]
mod tests {
    use super::*;

    fn test_backend() -> RedisBackend {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        RedisBackend::new(&url).unwrap()
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = RedisBackend::new("not-a-url");
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[tokio::test]
    #[ignore]
    async fn test_roundtrip_against_live_redis() {
        let backend = test_backend();

        backend
            .set("gatestore:test:rt", b"42".to_vec(), 5)
            .await
            .unwrap();
        let value = backend.get("gatestore:test:rt").await.unwrap();
        assert_eq!(value, Some(b"42".to_vec()));

        let n = backend.incr("gatestore:test:rt", 1).await.unwrap();
        assert_eq!(n, 43);

        backend
            .delete(&["gatestore:test:rt".to_string()])
            .await
            .unwrap();
        assert_eq!(backend.get("gatestore:test:rt").await.unwrap(), None);
    }
}
