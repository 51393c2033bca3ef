use serde_json::Value;
use std::collections::BTreeMap;

/// A single untrusted query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    List(Vec<String>),
    /// Anything that is neither a string nor an array of strings.
    Other(Value),
}

/// Untyped query input, keyed by normalized parameter name.
///
/// Keys are compared case-insensitively with `_`, `-` and a trailing `[]`
/// ignored, so `minTvl`, `min_tvl` and `MINTVL` address the same field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQuery {
    params: BTreeMap<String, QueryValue>,
}

impl RawQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a query from decoded `key=value` pairs. Repeated keys become a list.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::new();
        for (key, value) in pairs {
            let is_array = key.as_ref().trim().ends_with("[]");
            let key = normalize_key(key.as_ref());
            let value = value.into();
            let merged = match query.params.remove(&key) {
                None if is_array => QueryValue::List(vec![value]),
                None => QueryValue::Text(value),
                Some(QueryValue::Text(prev)) => QueryValue::List(vec![prev, value]),
                Some(QueryValue::List(mut prev)) => {
                    prev.push(value);
                    QueryValue::List(prev)
                }
                Some(other @ QueryValue::Other(_)) => other,
            };
            query.params.insert(key, merged);
        }
        query
    }

    /// Builds a query from a JSON object, keeping non-string values as `Other`.
    pub fn from_json(value: &Value) -> Self {
        let mut query = Self::new();
        if let Value::Object(map) = value {
            for (key, v) in map {
                let parsed = match v {
                    Value::String(s) => QueryValue::Text(s.clone()),
                    Value::Array(items) if items.iter().all(Value::is_string) => QueryValue::List(
                        items
                            .iter()
                            .filter_map(|i| i.as_str().map(str::to_string))
                            .collect(),
                    ),
                    other => QueryValue::Other(other.clone()),
                };
                query.params.insert(normalize_key(key), parsed);
            }
        }
        query
    }

    pub fn insert(&mut self, key: &str, value: QueryValue) {
        self.params.insert(normalize_key(key), value);
    }

    pub fn get(&self, field: &str) -> Option<&QueryValue> {
        self.params.get(&normalize_key(field))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .trim_end_matches("[]")
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
