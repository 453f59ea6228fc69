// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The `Hash` codec: JSON over a flat list of `[dotted.path, value]` pairs.
//!
//! ```text
//! {"user": {"name": "ada", "age": 36}}
//!   ⇅
//! [["user.name", "ada"], ["user.age", 36]]
//! ```
//!
//! Arrays and scalars are leaves. Keys containing `.` do not survive the
//! round trip.

use crate::encoding::Record;
use crate::errors::EncodingError;
use serde_json::{Map, Value};

const HASH: &str = "Hash";

pub(crate) fn encode<T: Record>(value: &T) -> Result<Vec<u8>, EncodingError> {
    let value = serde_json::to_value(value).map_err(|e| EncodingError::codec(HASH, e))?;
    serde_json::to_vec(&marshal_hash(&value)).map_err(|e| EncodingError::codec(HASH, e))
}

pub(crate) fn decode<T: Record>(data: &[u8]) -> Result<T, EncodingError> {
    let pairs: Vec<(String, Value)> =
        serde_json::from_slice(data).map_err(|e| EncodingError::codec(HASH, e))?;
    serde_json::from_value(unmarshal_hash(pairs)).map_err(|e| EncodingError::codec(HASH, e))
}

/// Flatten nested objects into `(path, leaf)` pairs in document order.
pub fn marshal_hash(value: &Value) -> Vec<(String, Value)> {
    let mut pairs = Vec::new();
    flatten("", value, &mut pairs);
    pairs
}

/// Rebuild the nested value produced by [`marshal_hash`].
pub fn unmarshal_hash(pairs: Vec<(String, Value)>) -> Value {
    if pairs.len() == 1 && pairs[0].0.is_empty() {
        return pairs.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null);
    }

    let mut root = Map::new();
    for (path, value) in pairs {
        let parts: Vec<&str> = path.split('.').collect();
        insert(&mut root, &parts, value);
    }
    Value::Object(root)
}

fn flatten(prefix: &str, value: &Value, pairs: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&path, child, pairs);
            }
        }
        leaf => pairs.push((prefix.to_string(), leaf.clone())),
    }
}

fn insert(map: &mut Map<String, Value>, path: &[&str], value: Value) {
    match path {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert(child, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marshal_hash_flattens_objects() {
        let value = json!({"user": {"name": "ada", "age": 36}, "tags": ["a", "b"]});
        let pairs = marshal_hash(&value);
        assert_eq!(
            pairs,
            vec![
                ("user.name".to_string(), json!("ada")),
                ("user.age".to_string(), json!(36)),
                ("tags".to_string(), json!(["a", "b"])),
            ]
        );
        assert_eq!(unmarshal_hash(pairs), value);
    }

    #[test]
    fn test_scalars_and_empty_objects() {
        for value in [json!("text"), json!(7), json!({}), json!({"a": {}})] {
            assert_eq!(unmarshal_hash(marshal_hash(&value)), value);
        }
    }

    #[test]
    fn test_wire_form_is_pairs() {
        let data = encode(&json!({"a": {"b": 1}})).unwrap();
        assert_eq!(String::from_utf8(data).unwrap(), r#"[["a.b",1]]"#);
    }
}
