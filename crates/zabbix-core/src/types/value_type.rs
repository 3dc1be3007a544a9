//! Item value type.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Zabbix's classification of a monitored item's data type.
///
/// Selects the history/trend storage table a value lives in; the client
/// groups history and trend requests by this type. The API returns it as
/// a string-encoded number (`"value_type": "3"`), so deserialization
/// accepts both strings and numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    /// Numeric float (history table 0).
    Float,
    /// Character (history table 1).
    Character,
    /// Log (history table 2).
    Log,
    /// Numeric unsigned (history table 3).
    Unsigned,
    /// Text (history table 4).
    Text,
}

impl ValueType {
    /// The numeric code used on the wire.
    pub fn as_u8(self) -> u8 {
        match self {
            ValueType::Float => 0,
            ValueType::Character => 1,
            ValueType::Log => 2,
            ValueType::Unsigned => 3,
            ValueType::Text => 4,
        }
    }

    /// Parse the numeric code used on the wire.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(ValueType::Float),
            1 => Some(ValueType::Character),
            2 => Some(ValueType::Log),
            3 => Some(ValueType::Unsigned),
            4 => Some(ValueType::Text),
            _ => None,
        }
    }

    /// True for the numeric types that have trend aggregates.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Float | ValueType::Unsigned)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Serialize for ValueType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

struct ValueTypeVisitor;

impl Visitor<'_> for ValueTypeVisitor {
    type Value = ValueType;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a value type code between 0 and 4, as a number or string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ValueType, E> {
        ValueType::from_code(v).ok_or_else(|| E::custom(format!("unknown value type {v}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ValueType, E> {
        u64::try_from(v)
            .ok()
            .and_then(ValueType::from_code)
            .ok_or_else(|| E::custom(format!("unknown value type {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ValueType, E> {
        v.parse::<u64>()
            .ok()
            .and_then(ValueType::from_code)
            .ok_or_else(|| E::custom(format!("unknown value type '{v}'")))
    }
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueTypeVisitor)
    }
}
