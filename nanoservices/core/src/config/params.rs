use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("missing required parameter '{0}'")]
    Missing(String),
    #[error("parameter '{name}' must be {expected}, got {found}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("unexpected parameter '{0}'")]
    Unexpected(String),
    #[error("parameter '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

/// A scalar parameter value from the configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "a boolean",
            ParamValue::Int(_) => "an integer",
            ParamValue::Str(_) => "a string",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => write!(f, "null"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Constructor arguments declared for a component, in document order.
///
/// Values are not checked against the component when the document is
/// loaded; each constructor pulls what it needs through the typed getters
/// and reports mismatches when it is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(IndexMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Optional string; absent and null both read as `None`.
    pub fn str(&self, name: &str) -> Result<Option<&str>, ParamError> {
        match self.0.get(name) {
            None | Some(ParamValue::Null) => Ok(None),
            Some(ParamValue::Str(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(wrong_type(name, "a string", other)),
        }
    }

    pub fn require_str(&self, name: &str) -> Result<&str, ParamError> {
        self.str(name)?
            .ok_or_else(|| ParamError::Missing(name.to_string()))
    }

    pub fn int(&self, name: &str) -> Result<Option<i64>, ParamError> {
        match self.0.get(name) {
            None | Some(ParamValue::Null) => Ok(None),
            Some(ParamValue::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(wrong_type(name, "an integer", other)),
        }
    }

    pub fn bool(&self, name: &str) -> Result<Option<bool>, ParamError> {
        match self.0.get(name) {
            None | Some(ParamValue::Null) => Ok(None),
            Some(ParamValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(wrong_type(name, "a boolean", other)),
        }
    }

    /// Comma-separated string split into trimmed, non-empty items.
    pub fn list(&self, name: &str) -> Result<Vec<String>, ParamError> {
        Ok(self
            .str(name)?
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// A single-byte delimiter such as `,` or `|`.
    pub fn delimiter(&self, name: &str) -> Result<Option<u8>, ParamError> {
        match self.str(name)? {
            None => Ok(None),
            Some(s) if s.len() == 1 => Ok(Some(s.as_bytes()[0])),
            Some(s) => Err(ParamError::Invalid {
                name: name.to_string(),
                reason: format!("expected a single ASCII character, got '{s}'"),
            }),
        }
    }

    /// Reject any parameter not in `allowed`.
    pub fn expect_only(&self, allowed: &[&str]) -> Result<(), ParamError> {
        match self.0.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(unexpected) => Err(ParamError::Unexpected(unexpected.clone())),
            None => Ok(()),
        }
    }
}

fn wrong_type(name: &str, expected: &'static str, found: &ParamValue) -> ParamError {
    ParamError::WrongType {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}
