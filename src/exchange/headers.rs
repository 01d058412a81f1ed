//! Immutable message headers

use std::fmt;

use crate::protocol::{FieldTable, FieldValue};

/// Headers of a published message.
///
/// Captured once when the message is received; there is no way to mutate
/// them afterwards, so a match evaluated against a `MessageHeaders` can
/// never observe a concurrent change.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageHeaders {
    table: FieldTable,
}

impl MessageHeaders {
    /// Headers with no entries.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            table: FieldTable::new(),
        }
    }

    /// Value of header `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.table.get(name)
    }

    /// Whether header `name` is present, whatever its value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Whether every name in `names` is present.
    pub fn contains_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        names.into_iter().all(|name| self.contains(name))
    }

    /// Number of headers
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether there are no headers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Headers in wire order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.table.iter()
    }

    /// Underlying table, for re-encoding.
    #[must_use]
    pub const fn as_table(&self) -> &FieldTable {
        &self.table
    }
}

impl From<FieldTable> for MessageHeaders {
    fn from(table: FieldTable) -> Self {
        Self { table }
    }
}

impl From<Option<FieldTable>> for MessageHeaders {
    fn from(table: Option<FieldTable>) -> Self {
        table.map(Self::from).unwrap_or_default()
    }
}

impl<K, V> FromIterator<(K, V)> for MessageHeaders
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            table: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for MessageHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.table, f)
    }
}
