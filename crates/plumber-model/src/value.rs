//! Typed configuration values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A coerced configuration value.
///
/// Values come out of the INI layer as raw strings and are promoted to the
/// first matching type (see [`crate::coerce::coerce`]). Comma-separated
/// values become a [`ConfigValue::List`] of coerced elements; a key with no
/// value at all is [`ConfigValue::Null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
    Null,
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// View the value as a list of display strings.
    ///
    /// A scalar is a one-element list, so `sites = Amplero` and
    /// `sites = Amplero, Tumba` read the same way. A null value is an empty
    /// list.
    pub fn as_str_list(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.iter().map(ToString::to_string).collect(),
            Self::Null => Vec::new(),
            other => vec![other.to_string()],
        }
    }

    /// View the value as a list of integers, if every element is one.
    pub fn as_i64_list(&self) -> Option<Vec<i64>> {
        match self {
            Self::List(items) => items.iter().map(Self::as_i64).collect(),
            Self::Int(value) => Some(vec![*value]),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "{value}"),
            Self::Null => write!(f, "none"),
            Self::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_reads_as_singleton_list() {
        let value = ConfigValue::Str("Amplero".to_string());
        assert_eq!(value.as_str_list(), vec!["Amplero".to_string()]);
    }

    #[test]
    fn null_reads_as_empty_list() {
        assert!(ConfigValue::Null.as_str_list().is_empty());
    }

    #[test]
    fn int_widens_to_f64() {
        assert_eq!(ConfigValue::Int(-3).as_f64(), Some(-3.0));
        assert_eq!(ConfigValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(ConfigValue::Str("2.5".to_string()).as_f64(), None);
    }

    #[test]
    fn json_round_trip_keeps_variants() {
        let value = ConfigValue::List(vec![
            ConfigValue::Int(1),
            ConfigValue::Float(0.5),
            ConfigValue::Bool(true),
            ConfigValue::Null,
            ConfigValue::Str("x".to_string()),
        ]);
        let text = serde_json::to_string(&value).unwrap();
        let back: ConfigValue = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }
}
