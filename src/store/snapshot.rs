//! Ordered, owned copies of store contents and their JSON / text forms.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::models::{DateKey, MealRecord};

/// An ordered list of dated records.
///
/// Serialises as a JSON object whose member order is the list order, which
/// is how the store file and the HTTP responses are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealSnapshot(Vec<(DateKey, MealRecord)>);

impl MealSnapshot {
    pub fn new(entries: Vec<(DateKey, MealRecord)>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[(DateKey, MealRecord)] {
        &self.0
    }

    pub fn into_entries(self) -> Vec<(DateKey, MealRecord)> {
        self.0
    }

    pub fn keys(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.0.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for MealSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, record) in &self.0 {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

/// Render a multi-line listing:
///
/// ```text
/// 2024-01-10:
///    breakfast
///     - rice
///    lunch
///    dinner
/// ```
///
/// Days are separated by a blank line.
impl fmt::Display for MealSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, record)) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", key)?;
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

/// Store file contents as read from disk.
///
/// Keys that are not valid dates are collected in `rejected` instead of
/// failing the whole file.
#[derive(Debug, Default)]
pub(crate) struct StoredEntries {
    pub entries: Vec<(DateKey, MealRecord)>,
    pub rejected: Vec<String>,
}

impl<'de> Deserialize<'de> for StoredEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = StoredEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping YYYY-MM-DD to three dish lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut stored = StoredEntries::default();
                while let Some((key, record)) = map.next_entry::<String, MealRecord>()? {
                    let parsed = DateKey::parse(&key);
                    if parsed.is_defaulted() {
                        stored.rejected.push(key);
                    } else {
                        stored.entries.push((parsed.into_inner(), record));
                    }
                }
                Ok(stored)
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
