// Copyright 2026 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! In-memory store of JSON resources keyed by id.

use {crate::errors::RequestError, serde_json::Value, std::collections::HashMap};

/// Stores opaque JSON values keyed by resource id. No schema validation is
/// performed; values live only as long as the owning server.
#[derive(Debug, Default)]
pub struct ResourceStore {
    resources: HashMap<String, Value>,
}

impl ResourceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the resource with the given id.
    pub fn get(&self, id: &str) -> Result<Value, RequestError> {
        self.resources.get(id).cloned().ok_or_else(|| RequestError::NotFound(id.to_string()))
    }

    /// Creates or fully replaces the resource, returning the stored value.
    pub fn replace(&mut self, id: &str, value: Value) -> Value {
        self.resources.insert(id.to_string(), value.clone());
        value
    }

    /// Shallow-merges `patch` into the existing resource: top-level keys of
    /// `patch` overwrite, all other keys are kept. Patching never creates; an
    /// unknown id is an error. A non-object resource (stored via PUT of a
    /// scalar) has no keys to merge into, so the patch replaces it.
    pub fn merge(&mut self, id: &str, patch: Value) -> Result<Value, RequestError> {
        let patch = match patch {
            Value::Object(map) => map,
            _ => return Err(RequestError::NotAnObject),
        };
        let existing = self
            .resources
            .get_mut(id)
            .ok_or_else(|| RequestError::NotFound(id.to_string()))?;
        match &mut *existing {
            Value::Object(map) => {
                for (key, value) in patch {
                    map.insert(key, value);
                }
            }
            other => *other = Value::Object(patch),
        }
        Ok(existing.clone())
    }

    /// Removes the resource with the given id.
    pub fn delete(&mut self, id: &str) -> Result<(), RequestError> {
        self.resources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RequestError::NotFound(id.to_string()))
    }

    /// Ids of all stored resources, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids = self.resources.keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use {super::*, assert_matches::assert_matches, serde_json::json};

    #[test]
    fn replace_then_merge_overwrites_top_level_keys() {
        let mut store = ResourceStore::new();
        store.replace("dev0", json!({"a": 1, "b": {"x": 1}}));

        let merged = store.merge("dev0", json!({"b": 2, "c": 3})).unwrap();

        assert_eq!(merged, json!({"a": 1, "b": 2, "c": 3}));
        assert_eq!(store.get("dev0").unwrap(), merged);
    }

    #[test]
    fn merge_of_unknown_id_is_not_found() {
        let mut store = ResourceStore::new();
        assert_matches!(store.merge("nope", json!({})), Err(RequestError::NotFound(id)) if id == "nope");
    }

    #[test]
    fn merge_requires_an_object_patch() {
        let mut store = ResourceStore::new();
        store.replace("dev0", json!({}));
        assert_matches!(store.merge("dev0", json!(5)), Err(RequestError::NotAnObject));
    }

    #[test]
    fn merge_into_scalar_replaces_it() {
        let mut store = ResourceStore::new();
        store.replace("dev0", json!("opaque"));
        assert_eq!(store.merge("dev0", json!({"a": 1})).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn replace_overwrites_the_whole_value() {
        let mut store = ResourceStore::new();
        store.replace("dev0", json!({"a": 1}));
        assert_eq!(store.replace("dev0", json!({"b": 2})), json!({"b": 2}));
        assert_eq!(store.get("dev0").unwrap(), json!({"b": 2}));
    }

    #[test]
    fn delete_removes_the_resource() {
        let mut store = ResourceStore::new();
        store.replace("dev0", json!({}));
        store.delete("dev0").unwrap();
        assert_matches!(store.get("dev0"), Err(RequestError::NotFound(_)));
        assert_matches!(store.delete("dev0"), Err(RequestError::NotFound(_)));
    }

    #[test]
    fn ids_are_sorted() {
        let mut store = ResourceStore::new();
        store.replace("b", json!(1));
        store.replace("a", json!(2));
        assert_eq!(store.ids(), vec!["a".to_string(), "b".to_string()]);
    }
}
