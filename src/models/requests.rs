//! Request DTOs for the store API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::store::MAX_KEY_LENGTH;

/// Request body for PUT /set
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The store key
    pub key: String,
    /// The value to store (arbitrary JSON)
    pub value: Value,
    /// Optional TTL in seconds; omitted = configured default, 0 = no expiry
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Returns an error message if the request is malformed, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for POST /mget
#[derive(Debug, Clone, Deserialize)]
pub struct MgetRequest {
    pub keys: Vec<String>,
}

/// Request body for PUT /mset
#[derive(Debug, Clone, Deserialize)]
pub struct MsetRequest {
    pub entries: HashMap<String, Value>,
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl MsetRequest {
    pub fn validate(&self) -> Option<String> {
        self.entries.keys().find_map(|key| validate_key(key))
    }
}

/// Request body for POST /incr/:key and POST /decr/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CounterRequest {
    /// Amount to add or subtract (default 1)
    #[serde(default)]
    pub amount: Option<i64>,
}

/// Request body for POST /expire/:key
#[derive(Debug, Clone, Deserialize)]
pub struct ExpireRequest {
    /// New TTL in seconds; 0 removes the expiry
    pub ttl: u64,
}

/// Query parameters for GET /keys
#[derive(Debug, Clone, Deserialize)]
pub struct KeysQuery {
    /// Glob pattern (default "*")
    #[serde(default)]
    pub pattern: Option<String>,
}

fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {MAX_KEY_LENGTH} bytes"
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": {"nested": true}}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert!(req.value.is_object());
        assert!(req.ttl.is_none());
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_set_request_with_ttl() {
        let json = r#"{"key": "test", "value": 1, "ttl": 60}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl, Some(60));
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetRequest {
            key: String::new(),
            value: Value::Null,
            ttl: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_oversized_key() {
        let req = SetRequest {
            key: "x".repeat(MAX_KEY_LENGTH + 1),
            value: Value::Null,
            ttl: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_mset_request_validates_every_key() {
        let mut entries = HashMap::new();
        entries.insert("ok".to_string(), Value::Bool(true));
        entries.insert(String::new(), Value::Bool(false));

        let req = MsetRequest { entries, ttl: None };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_counter_request_default_amount() {
        let req: CounterRequest = serde_json::from_str("{}").unwrap();
        assert!(req.amount.is_none());
    }
}
