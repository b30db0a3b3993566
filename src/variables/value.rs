use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value held by the variable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableValue {
    Text(String),
    /// Multi-valued variables, e.g. from a multi-select. `contains` tests membership.
    List(Vec<String>),
}

impl VariableValue {
    /// True for empty text, whitespace-only text, and empty lists.
    pub fn is_blank(&self) -> bool {
        match self {
            VariableValue::Text(text) => text.trim().is_empty(),
            VariableValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            VariableValue::List(items) => Some(items),
            VariableValue::Text(_) => None,
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Text(text) => write!(f, "{}", text),
            VariableValue::List(items) => write!(f, "{}", items.iter().join(", ")),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Text(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Text(value)
    }
}

impl From<Vec<String>> for VariableValue {
    fn from(items: Vec<String>) -> Self {
        VariableValue::List(items)
    }
}

impl From<Vec<&str>> for VariableValue {
    fn from(items: Vec<&str>) -> Self {
        VariableValue::List(items.into_iter().map(str::to_string).collect())
    }
}
