//! Tag map and tag change records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Resource tags, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMap(BTreeMap<String, String>);

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Copy of this map with one key added or overwritten (merge semantics).
    pub fn merged(&self, key: &str, value: &str) -> TagMap {
        let mut out = self.clone();
        out.insert(key, value);
        out
    }

    /// Compact JSON object, keys sorted.
    pub fn to_json(&self) -> String {
        // A map of strings always serializes.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parse a JSON object. `null` and empty input give an empty map.
    pub fn from_json(s: &str) -> serde_json::Result<TagMap> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(TagMap::new());
        }
        serde_json::from_str(trimmed)
    }
}

impl fmt::Display for TagMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        TagMap(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A tag applied to one VM, with the tag maps before and after.
///
/// Only created after a successful merge. `old_tags` is the complete
/// pre-change map and is what the undo replays as a full replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChange {
    pub resource_group: String,
    pub vm_name: String,
    pub resource_id: String,
    pub old_tags: TagMap,
    pub new_tags: TagMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_preserves_existing() {
        let tags: TagMap = [("env", "prod")].into_iter().collect();
        let merged = tags.merged("owner", "alice");

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("env"), Some("prod"));
        assert_eq!(merged.get("owner"), Some("alice"));
        // original untouched
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_json_is_sorted_and_compact() {
        let tags: TagMap = [("zeta", "1"), ("alpha", "2")].into_iter().collect();
        assert_eq!(tags.to_json(), r#"{"alpha":"2","zeta":"1"}"#);
        assert_eq!(TagMap::new().to_json(), "{}");
    }

    #[test]
    fn test_from_json_null_and_empty() {
        assert!(TagMap::from_json("null").unwrap().is_empty());
        assert!(TagMap::from_json("  ").unwrap().is_empty());
        assert!(TagMap::from_json("{}").unwrap().is_empty());

        let parsed = TagMap::from_json(r#"{"env":"prod"}"#).unwrap();
        assert_eq!(parsed.get("env"), Some("prod"));
        assert!(TagMap::from_json("[1,2]").is_err());
    }
}
