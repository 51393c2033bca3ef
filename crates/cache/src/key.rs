use crate::error::CacheError;
use core_types::Endpoint;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub const KEY_PREFIX: &str = "intel";

/// Deterministic key for an endpoint and its validated options.
///
/// The options are serialized to JSON, canonicalized (object keys sorted,
/// arrays of strings sorted) and hashed, giving `intel:<endpoint>:<sha256 hex>`.
/// Two queries that differ only in parameter or list order map to the same key.
pub fn cache_key<T: Serialize>(endpoint: Endpoint, options: &T) -> Result<String, CacheError> {
    let canonical = canonicalize(serde_json::to_value(options)?);
    let encoded = serde_json::to_string(&canonical)?;

    let mut hasher = Sha256::new();
    hasher.update(encoded.as_bytes());
    Ok(format!(
        "{}:{}:{}",
        KEY_PREFIX,
        endpoint.as_str(),
        hex::encode(hasher.finalize())
    ))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => {
            let mut items: Vec<Value> = items.into_iter().map(canonicalize).collect();
            if items.iter().all(Value::is_string) {
                items.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
            }
            Value::Array(items)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_shape() {
        let key = cache_key(Endpoint::ChainEcosystem, &json!({"chain": "ethereum"})).unwrap();
        let parts: Vec<&str> = key.split(':').collect();
        assert_eq!(parts[0], "intel");
        assert_eq!(parts[1], "chain-ecosystem");
        assert_eq!(parts[2].len(), 64);
    }

    #[test]
    fn test_key_ignores_ordering() {
        let a = json!({"limit": 10, "chains": ["polygon", "ethereum"]});
        let b = json!({"chains": ["ethereum", "polygon"], "limit": 10});
        assert_eq!(
            cache_key(Endpoint::Movers, &a).unwrap(),
            cache_key(Endpoint::Movers, &b).unwrap()
        );
    }

    #[test]
    fn test_key_separates_endpoints_and_values() {
        let opts = json!({"limit": 10});
        assert_ne!(
            cache_key(Endpoint::Movers, &opts).unwrap(),
            cache_key(Endpoint::Trending, &opts).unwrap()
        );
        assert_ne!(
            cache_key(Endpoint::Movers, &opts).unwrap(),
            cache_key(Endpoint::Movers, &json!({"limit": 11})).unwrap()
        );
    }
}
