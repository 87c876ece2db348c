//! Flat key/value property map handed to the scanner process.

use std::collections::BTreeMap;

/// Scanner properties: unique string keys mapped to string values.
///
/// Iteration is sorted by key so the emitted JSON is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBag {
    entries: BTreeMap<String, String>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge another bag into this one. Keys from `other` win on conflict.
    pub fn merge(&mut self, other: PropertyBag) {
        self.entries.extend(other.entries);
    }

    /// Serialize to a JSON object, dropping entries with empty values.
    pub fn to_clean_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::Value::Object(map).to_string()
    }

    /// Parse user-supplied extra properties.
    ///
    /// One `key=value` pair per line, split on the first `=`. Lines starting
    /// with `#` are comments. Blank lines, lines without `=` and pairs with
    /// an empty value are ignored. Later keys overwrite earlier ones.
    pub fn parse_extra(input: &str) -> PropertyBag {
        let mut props = PropertyBag::new();
        for line in input.lines() {
            if line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                if !key.is_empty() && !value.is_empty() {
                    props.set(key, value);
                }
            }
        }
        props
    }
}

impl IntoIterator for PropertyBag {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
