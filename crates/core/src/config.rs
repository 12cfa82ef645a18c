//! Hierarchical key-value configuration.
//!
//! A [`ParameterList`] maps string keys to [`Value`]s, where a value may itself
//! be a nested list. Lists serialize transparently, so a configuration can be
//! written in any self-describing format serde supports:
//!
//! ```rust
//! use braid_core::ParameterList;
//!
//! let config: ParameterList = serde_json::from_str(
//!     r#"{
//!         "Solver Sublist Name": "Outer",
//!         "Outer": { "Type": "Block Jacobi", "Name": "outer" }
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.get_str("Solver Sublist Name").unwrap(), "Outer");
//! assert!(config.is_sublist("Outer"));
//! ```

use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single configuration entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(ParameterList),
}

impl Value {
    /// Returns a short name for the value's type, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "sublist",
        }
    }

    /// Coerces `self` to the type of `expected`, if the types are compatible.
    ///
    /// An integer is accepted where a double is expected.
    fn conform_to(&self, expected: &Value) -> Option<Value> {
        match (self, expected) {
            #[allow(clippy::cast_precision_loss)]
            (Value::Int(i), Value::Double(_)) => Some(Value::Double(*i as f64)),
            (Value::Bool(_), Value::Bool(_))
            | (Value::Int(_), Value::Int(_))
            | (Value::Double(_), Value::Double(_))
            | (Value::String(_), Value::String(_))
            | (Value::List(_), Value::List(_)) => Some(self.clone()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ParameterList> for Value {
    fn from(value: ParameterList) -> Self {
        Value::List(value)
    }
}

/// Errors raised while reading or validating a configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("the \"{key}\" key must be specified but is missing")]
    MissingKey { key: String },

    #[error("the \"{key}\" entry must be a {expected}, found a {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("the sublist \"{name}\" requested by \"{key}\" does not exist")]
    MissingSublist { key: String, name: String },

    #[error("unknown key \"{key}\"; valid keys are: [{}]", .valid.join(", "))]
    UnknownKey { key: String, valid: Vec<String> },

    #[error(
        "top-level entry \"{key}\" is not valid; all top-level entries must be sublists or one of \"Solver Sublist Name\" or \"Status Test Sublist Name\""
    )]
    InvalidTopLevelEntry { key: String },

    #[error("the \"Type\" key must be specified for the sublist \"{sublist}\"")]
    MissingType { sublist: String },

    #[error("solver \"Type\" \"{type_name}\" is not supported by the solver factory")]
    UnsupportedSolverType { type_name: String },

    #[error("status test \"Type\" \"{type_name}\" is not supported by the status test factory")]
    UnsupportedStatusTestType { type_name: String },

    #[error("sublist \"{name}\" refers back to itself through \"{key}\"")]
    CyclicSublist { key: String, name: String },

    #[error("invalid value for \"{key}\": {reason}")]
    InvalidValue { key: String, reason: String },
}

/// An ordered, hierarchical map of configuration entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterList {
    entries: BTreeMap<String, Value>,
}

impl ParameterList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the list with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key` to `value`, replacing any previous entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Removes and returns the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the nested sublists in key order.
    pub fn sublists(&self) -> impl Iterator<Item = (&str, &ParameterList)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            Value::List(list) => Some((k.as_str(), list)),
            _ => None,
        })
    }

    /// Returns true if `key` holds a nested list.
    #[must_use]
    pub fn is_sublist(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::List(_)))
    }

    /// Returns true if `key` holds a string.
    #[must_use]
    pub fn is_string(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::String(_)))
    }

    /// Returns the string stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or does not hold a string.
    pub fn get_str(&self, key: &str) -> Result<&str, ConfigError> {
        match self.require(key)? {
            Value::String(s) => Ok(s),
            other => Err(wrong_type(key, "string", other)),
        }
    }

    /// Returns the boolean stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or does not hold a bool.
    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        match self.require(key)? {
            Value::Bool(b) => Ok(*b),
            other => Err(wrong_type(key, "bool", other)),
        }
    }

    /// Returns the number stored at `key`, accepting integers.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or does not hold a number.
    pub fn get_f64(&self, key: &str) -> Result<f64, ConfigError> {
        match self.require(key)? {
            Value::Double(x) => Ok(*x),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(i) => Ok(*i as f64),
            other => Err(wrong_type(key, "double", other)),
        }
    }

    /// Returns the non-negative integer stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing, does not hold an integer, or
    /// holds a negative integer.
    pub fn get_usize(&self, key: &str) -> Result<usize, ConfigError> {
        match self.require(key)? {
            Value::Int(i) => usize::try_from(*i).map_err(|_| ConfigError::InvalidValue {
                key: key.to_owned(),
                reason: format!("expected a non-negative integer, found {i}"),
            }),
            other => Err(wrong_type(key, "int", other)),
        }
    }

    /// Returns the nested list stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or does not hold a list.
    pub fn sublist(&self, key: &str) -> Result<&ParameterList, ConfigError> {
        match self.require(key)? {
            Value::List(list) => Ok(list),
            other => Err(wrong_type(key, "sublist", other)),
        }
    }

    /// Reads the string at `key` and returns the sublist it names.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is missing or not a string, or if the named
    /// sublist does not exist in this list.
    pub fn referenced_sublist(&self, key: &str) -> Result<(&str, &ParameterList), ConfigError> {
        let name = self.get_str(key)?;
        match self.get(name) {
            Some(Value::List(list)) => Ok((name, list)),
            _ => Err(ConfigError::MissingSublist {
                key: key.to_owned(),
                name: name.to_owned(),
            }),
        }
    }

    /// Validates entries against `valid` and fills in its defaults.
    ///
    /// Every key in `self` must appear in `valid` with a compatible type.
    /// Keys present in `valid` but missing from `self` are copied over.
    ///
    /// # Errors
    ///
    /// Returns an error for the first unknown key or mistyped entry.
    pub fn validate_and_set_defaults(&mut self, valid: &ParameterList) -> Result<(), ConfigError> {
        for (key, value) in &mut self.entries {
            let Some(expected) = valid.get(key) else {
                return Err(ConfigError::UnknownKey {
                    key: key.clone(),
                    valid: valid.entries.keys().cloned().collect(),
                });
            };
            let conformed = value
                .conform_to(expected)
                .ok_or_else(|| wrong_type(key, expected.type_name(), value))?;
            *value = conformed;
            if let (Value::List(list), Value::List(expected)) = (&mut *value, expected) {
                list.validate_and_set_defaults(expected)?;
            }
        }

        for (key, default) in &valid.entries {
            if let btree_map::Entry::Vacant(slot) = self.entries.entry(key.clone()) {
                slot.insert(default.clone());
            }
        }

        Ok(())
    }

    fn require(&self, key: &str) -> Result<&Value, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingKey {
            key: key.to_owned(),
        })
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::WrongType {
        key: key.to_owned(),
        expected,
        found: found.type_name(),
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
