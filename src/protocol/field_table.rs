//! Self-describing field tables
//!
//! # Wire Format
//!
//! ```text
//! [LENGTH (4)] { [KEY (short string)] [TYPE (1)] [VALUE] }*
//! ```
//!
//! Entries keep insertion order so a decoded table re-encodes to the same
//! bytes.

use std::fmt;

use bytes::{BufMut, Bytes};

use super::wire::{
    long_string_size, read_long_string, read_short_string, read_slice, read_timestamp, read_u8,
    read_u16, read_u32, read_u64, write_long_string, write_short_string, write_timestamp,
};
use super::{Error, Result};

/// Deepest nesting of tables inside tables accepted on decode.
pub const MAX_TABLE_DEPTH: usize = 64;

/// Typed field table value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    /// `t`: boolean octet
    Boolean(bool),
    /// `b`: signed octet
    Byte(i8),
    /// `s`: signed 16-bit integer
    Short(i16),
    /// `I`: signed 32-bit integer
    Int(i32),
    /// `l`: signed 64-bit integer
    Long(i64),
    /// `f`: IEEE-754 single
    Float(f32),
    /// `d`: IEEE-754 double
    Double(f64),
    /// `S`: long string
    String(String),
    /// `T`: timestamp (32 bits of precision on the wire)
    Timestamp(u64),
    /// `F`: nested table
    Table(FieldTable),
    /// `V`: no value
    Void,
}

impl FieldValue {
    /// Wire type tag
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Boolean(_) => b't',
            Self::Byte(_) => b'b',
            Self::Short(_) => b's',
            Self::Int(_) => b'I',
            Self::Long(_) => b'l',
            Self::Float(_) => b'f',
            Self::Double(_) => b'd',
            Self::String(_) => b'S',
            Self::Timestamp(_) => b'T',
            Self::Table(_) => b'F',
            Self::Void => b'V',
        }
    }

    /// String payload, if this is a string value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check for the void value
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Encoded size of the value, excluding the type tag.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        match self {
            Self::Boolean(_) | Self::Byte(_) => 1,
            Self::Short(_) => 2,
            Self::Int(_) | Self::Float(_) => 4,
            Self::Long(_) | Self::Double(_) | Self::Timestamp(_) => 8,
            Self::String(s) => long_string_size(s.as_bytes()),
            Self::Table(table) => 4 + table.encoded_entries_size(),
            Self::Void => 0,
        }
    }

    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.tag());
        match self {
            Self::Boolean(v) => buf.put_u8(u8::from(*v)),
            Self::Byte(v) => buf.put_i8(*v),
            Self::Short(v) => buf.put_i16(*v),
            Self::Int(v) => buf.put_i32(*v),
            Self::Long(v) => buf.put_i64(*v),
            Self::Float(v) => buf.put_f32(*v),
            Self::Double(v) => buf.put_f64(*v),
            Self::String(s) => write_long_string(buf, s.as_bytes()),
            Self::Timestamp(ts) => write_timestamp(buf, *ts),
            Self::Table(table) => table.encode(buf),
            Self::Void => {}
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn decode(buf: &mut Bytes, depth: usize) -> Result<Self> {
        let tag = read_u8(buf)?;
        let value = match tag {
            b't' => Self::Boolean(read_u8(buf)? != 0),
            b'b' => Self::Byte(read_u8(buf)? as i8),
            b's' => Self::Short(read_u16(buf)? as i16),
            b'I' => Self::Int(read_u32(buf)? as i32),
            b'l' => Self::Long(read_u64(buf)? as i64),
            b'f' => Self::Float(f32::from_bits(read_u32(buf)?)),
            b'd' => Self::Double(f64::from_bits(read_u64(buf)?)),
            b'S' => Self::String(String::from_utf8(read_long_string(buf)?.to_vec())?),
            b'T' => Self::Timestamp(read_timestamp(buf)?),
            b'F' => {
                let len = read_u32(buf)? as usize;
                Self::Table(FieldTable::decode_nested(read_slice(buf, len)?, depth + 1)?)
            }
            b'V' => Self::Void,
            _ => return Err(Error::InvalidFieldType { tag }),
        };
        Ok(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<FieldTable> for FieldValue {
    fn from(value: FieldTable) -> Self {
        Self::Table(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Timestamp(ts) => write!(f, "@{ts}"),
            Self::Table(table) => write!(f, "{table}"),
            Self::Void => write!(f, "void"),
        }
    }
}

/// Insertion-ordered map from short-string key to [`FieldValue`]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldTable {
    entries: Vec<(String, FieldValue)>,
}

impl FieldTable {
    /// Create an empty table
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a value, replacing any previous value under the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        let key = key.into();
        let value = value.into();
        if let Some(index) = self.entries.iter().position(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut self.entries[index].1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Check whether a key is present
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Size of the encoded entries, excluding the 4-byte length prefix.
    #[must_use]
    pub fn encoded_entries_size(&self) -> usize {
        self.entries
            .iter()
            .map(|(k, v)| 1 + k.len() + 1 + v.encoded_size())
            .sum()
    }

    /// Write the length prefix followed by every entry.
    ///
    /// # Panics
    ///
    /// Panics if a key exceeds 255 bytes, a string value exceeds `0xFFFE`
    /// bytes, or the table does not fit a 32-bit length prefix.
    pub fn encode(&self, buf: &mut impl BufMut) {
        let size = u32::try_from(self.encoded_entries_size())
            .expect("field table exceeds u32::MAX bytes");
        buf.put_u32(size);
        for (key, value) in &self.entries {
            write_short_string(buf, Some(key.as_str()));
            value.encode(buf);
        }
    }

    /// Decode entries from a buffer holding exactly the table body.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An entry is truncated or carries an unknown type tag
    /// - A key appears twice
    /// - Nested tables go deeper than [`MAX_TABLE_DEPTH`]
    pub fn decode_entries(raw: Bytes) -> Result<Self> {
        Self::decode_nested(raw, 0)
    }

    fn decode_nested(mut raw: Bytes, depth: usize) -> Result<Self> {
        if depth > MAX_TABLE_DEPTH {
            return Err(Error::TableTooDeep {
                max: MAX_TABLE_DEPTH,
            });
        }
        let mut table = Self::new();
        while !raw.is_empty() {
            let key = read_short_string(&mut raw)?.unwrap_or_default();
            let value = FieldValue::decode(&mut raw, depth)?;
            if table.contains_key(&key) {
                return Err(Error::DuplicateFieldKey { key });
            }
            table.entries.push((key, value));
        }
        Ok(table)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}

impl fmt::Display for FieldTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn sample() -> FieldTable {
        FieldTable::new()
            .with("X-match", "any")
            .with("count", 42)
            .with("big", 1_i64 << 40)
            .with("ratio", 0.5)
            .with("enabled", true)
            .with("nested", FieldTable::new().with("inner", "value"))
            .with("marker", FieldValue::Void)
    }

    #[test]
    fn test_roundtrip_preserves_order_and_values() {
        let table = sample();
        let mut buf = BytesMut::new();
        table.encode(&mut buf);
        assert_eq!(buf.len(), 4 + table.encoded_entries_size());

        let mut bytes = buf.freeze();
        let decoded = super::super::wire::read_field_table(&mut bytes)
            .unwrap()
            .unwrap();
        assert_eq!(decoded, table);
        assert_eq!(
            decoded.keys().collect::<Vec<_>>(),
            vec!["X-match", "count", "big", "ratio", "enabled", "nested", "marker"]
        );
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut table = FieldTable::new().with("a", 1).with("b", 2);
        assert_eq!(table.insert("a", 3), Some(FieldValue::Int(1)));
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(table.get("a"), Some(&FieldValue::Int(3)));
    }

    #[test]
    fn test_string_entry_layout() {
        let table = FieldTable::new().with("A", "xy");
        let mut buf = BytesMut::new();
        table.encode(&mut buf);
        assert_eq!(
            &buf[..],
            &[0, 0, 0, 9, 1, b'A', b'S', 0, 0, 0, 2, b'x', b'y']
        );
    }

    #[test]
    fn test_unknown_type_tag_rejected() {
        let raw = Bytes::from_static(&[1, b'k', b'?', 0]);
        assert!(matches!(
            FieldTable::decode_entries(raw),
            Err(Error::InvalidFieldType { tag: b'?' })
        ));
    }

    #[test]
    fn test_entry_overrunning_table_rejected() {
        // Declares a 4-byte string inside a table body that only holds 2.
        let raw = Bytes::from_static(&[1, b'k', b'S', 0, 0, 0, 4, b'a', b'b']);
        assert!(matches!(
            FieldTable::decode_entries(raw),
            Err(Error::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_repeated_key_rejected() {
        let raw = Bytes::from_static(&[
            1, b'A', b'S', 0, 0, 0, 1, b'1',
            1, b'A', b'S', 0, 0, 0, 1, b'2',
        ]);
        assert!(matches!(
            FieldTable::decode_entries(raw),
            Err(Error::DuplicateFieldKey { key }) if key == "A"
        ));
    }

    /// Body of `depth` tables each holding one entry `k: F{...}`.
    fn nested_body(depth: usize) -> Bytes {
        let mut buf = BytesMut::with_capacity(7 * depth);
        for level in 0..depth {
            buf.put_slice(&[1, b'k', b'F']);
            buf.put_u32(u32::try_from(7 * (depth - level - 1)).unwrap());
        }
        buf.freeze()
    }

    #[test]
    fn test_deep_nesting_rejected() {
        assert!(matches!(
            FieldTable::decode_entries(nested_body(10_000)),
            Err(Error::TableTooDeep { max: MAX_TABLE_DEPTH })
        ));
    }

    #[test]
    fn test_nesting_at_limit_accepted() {
        let mut table = FieldTable::decode_entries(nested_body(MAX_TABLE_DEPTH)).unwrap();
        let mut levels = 0;
        while let Some(FieldValue::Table(inner)) = table.remove("k") {
            table = inner;
            levels += 1;
        }
        assert_eq!(levels, MAX_TABLE_DEPTH);
        assert!(table.is_empty());

        assert!(matches!(
            FieldTable::decode_entries(nested_body(MAX_TABLE_DEPTH + 1)),
            Err(Error::TableTooDeep { .. })
        ));
    }

    #[test]
    fn test_remove() {
        let mut table = sample();
        assert_eq!(table.remove("X-match"), Some(FieldValue::from("any")));
        assert!(!table.contains_key("X-match"));
        assert_eq!(table.remove("X-match"), None);
    }

    #[test]
    fn test_display() {
        let table = FieldTable::new().with("A", "v").with("n", 1);
        assert_eq!(table.to_string(), r#"{A: "v", n: 1}"#);
    }
}
