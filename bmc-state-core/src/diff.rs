//! Before/after record of attribute changes.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::lan::{AttributeValue, LanAttribute};

/// Attribute values in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(LanAttribute, AttributeValue)>,
}

impl AttributeMap {
    /// Record `value` for `attr`, replacing an earlier value in place.
    pub fn insert(&mut self, attr: LanAttribute, value: AttributeValue) {
        match self.entries.iter_mut().find(|(key, _)| *key == attr) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((attr, value)),
        }
    }

    pub fn get(&self, attr: LanAttribute) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(key, _)| *key == attr)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(LanAttribute, AttributeValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AttributeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (attr, value) in &self.entries {
            map.serialize_entry(attr.name(), value)?;
        }
        map.end()
    }
}

/// Transitions applied (or planned, in check mode) to a LAN channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanDiff {
    pub before: AttributeMap,
    pub after: AttributeMap,
}

impl LanDiff {
    pub fn record(&mut self, attr: LanAttribute, before: AttributeValue, after: AttributeValue) {
        self.before.insert(attr, before);
        self.after.insert(attr, after);
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    /// Changed attributes with their old and new values, in application order.
    pub fn changes(&self) -> impl Iterator<Item = (LanAttribute, &AttributeValue, &AttributeValue)> {
        self.after.iter().filter_map(|(attr, after)| {
            self.before.get(*attr).map(|before| (*attr, before, after))
        })
    }
}
