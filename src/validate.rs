//! Required-key validation for loosely typed documents.
//!
//! Configuration files, artifacts, and the process environment are all checked
//! the same way before anything is deserialized or looked up.
use crate::error::{LaunchError, LaunchResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A string-keyed document whose top-level keys can be probed.
pub trait Document {
    fn has_key(&self, key: &str) -> bool;
}

impl Document for serde_json::Map<String, serde_json::Value> {
    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl<V> Document for BTreeMap<String, V> {
    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl<V, S: std::hash::BuildHasher> Document for HashMap<String, V, S> {
    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

/// Fail with every required key the document lacks, in request order.
pub fn check_required_keys<D, K>(document: &D, required_keys: &[K]) -> LaunchResult<()>
where
    D: Document + ?Sized,
    K: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    let missing: Vec<String> = required_keys
        .iter()
        .map(AsRef::as_ref)
        .filter(|key| seen.insert(*key))
        .filter(|key| !document.has_key(key))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(LaunchError::MissingKeys { keys: missing })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn reports_every_missing_key() {
        let doc = object(json!({"provider": {}}));
        let err = check_required_keys(&doc, &["type", "provider", "extra"]).unwrap_err();
        match err {
            LaunchError::MissingKeys { keys } => assert_eq!(keys, vec!["type", "extra"]),
            other => panic!("expected MissingKeys, got {other:?}"),
        }
    }

    #[test]
    fn passes_when_all_keys_present_regardless_of_order() {
        let doc = object(json!({"b": 1, "a": null, "c": false}));
        check_required_keys(&doc, &["c", "a", "b"]).expect("all present");
        check_required_keys(&doc, &[] as &[&str]).expect("nothing required");
    }

    #[test]
    fn key_match_is_case_sensitive() {
        let doc = object(json!({"Type": "fake"}));
        let err = check_required_keys(&doc, &["type"]).unwrap_err();
        assert_eq!(err.kind(), "MissingKeys");
    }

    #[test]
    fn duplicate_required_keys_are_reported_once() {
        let env: BTreeMap<String, String> = BTreeMap::new();
        let err = check_required_keys(&env, &["FOO", "FOO", "BAR"]).unwrap_err();
        assert_eq!(err.to_string(), "missing required keys: FOO, BAR");
    }

    #[test]
    fn works_with_owned_key_lists_and_hash_maps() {
        let mut env = HashMap::new();
        env.insert("HOME".to_string(), "/root".to_string());
        let keys = vec!["HOME".to_string()];
        check_required_keys(&env, &keys).expect("HOME present");
    }
}
