//! Attribute trees as a plan framework sees them.
//!
//! Besides the JSON shapes every attribute can be [`Value::Unknown`]: its
//! value is only determined while applying the plan.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Serialize;
use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to convert the attributes into a tree"))]
    Convert { source: serde_json::Error },

    #[snafu(display("cannot set {path}: {reason}"))]
    InvalidPath { path: AttributePath, reason: &'static str },
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Value {
    /// Not known until the plan is applied.
    Unknown,
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

static UNKNOWN: Value = Value::Unknown;

impl Value {
    /// Converts a serializable model, e.g. a [`crate::deployment::Deployment`].
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value).map(Self::from).context(ConvertSnafu)
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Object(entries.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns whether neither the value nor anything nested in it is
    /// unknown.
    pub fn is_fully_known(&self) -> bool {
        match self {
            Self::Unknown => false,
            Self::List(items) => items.iter().all(Self::is_fully_known),
            Self::Object(members) => members.values().all(Self::is_fully_known),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value at `path`.
    ///
    /// Everything below an unknown value is unknown. [`None`] means the path
    /// leads through a null, a missing member or a value of another shape.
    pub fn get(&self, path: &AttributePath) -> Option<&Self> {
        let mut current = self;
        for step in &path.0 {
            current = match (current, step) {
                (Self::Unknown, _) => return Some(&UNKNOWN),
                (Self::Object(members), PathStep::Attribute(name)) => members.get(name)?,
                (Self::List(items), PathStep::Index(index)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Replaces the value at `path`. Missing object members are created, every
    /// other step has to exist.
    pub fn set(&mut self, path: &AttributePath, value: Self) -> Result<()> {
        let Some((last, parents)) = path.0.split_last() else {
            *self = value;
            return Ok(());
        };

        let invalid = |reason| InvalidPathSnafu {
            path: path.clone(),
            reason,
        };

        let mut current = self;
        for step in parents {
            current = match (current, step) {
                (Self::Object(members), PathStep::Attribute(name)) => members
                    .get_mut(name)
                    .ok_or_else(|| invalid("missing parent attribute").build())?,
                (Self::List(items), PathStep::Index(index)) => items
                    .get_mut(*index)
                    .ok_or_else(|| invalid("index out of range").build())?,
                _ => return invalid("parent is not a collection").fail(),
            };
        }

        match (current, last) {
            (Self::Object(members), PathStep::Attribute(name)) => {
                members.insert(name.clone(), value);
            }
            (Self::List(items), PathStep::Index(index)) => {
                let item = items
                    .get_mut(*index)
                    .ok_or_else(|| invalid("index out of range").build())?;
                *item = value;
            }
            _ => return invalid("parent is not a collection").fail(),
        }
        Ok(())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(value) => Self::Number(value),
            serde_json::Value::String(value) => Self::String(value),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(members) => Self::Object(
                members
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = Value;

    /// Fails with the original value when it contains unknown values.
    fn try_from(value: Value) -> Result<Self, Value> {
        if !value.is_fully_known() {
            return Err(value);
        }
        Ok(known_to_json(value))
    }
}

fn known_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Unknown | Value::Null => serde_json::Value::Null,
        Value::Bool(value) => serde_json::Value::Bool(value),
        Value::Number(value) => serde_json::Value::Number(value),
        Value::String(value) => serde_json::Value::String(value),
        Value::List(items) => {
            serde_json::Value::Array(items.into_iter().map(known_to_json).collect())
        }
        Value::Object(members) => serde_json::Value::Object(
            members
                .into_iter()
                .map(|(key, value)| (key, known_to_json(value)))
                .collect(),
        ),
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PathStep {
    Attribute(String),
    Index(usize),
}

/// Dot separated path of an attribute, e.g. `elasticsearch.hot.size`.
/// Numeric steps index into lists.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AttributePath(Vec<PathStep>);

impl AttributePath {
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.0.push(PathStep::Attribute(name.into()));
        self
    }

    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathStep::Index(index));
        self
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    /// The path of the enclosing attribute, [`None`] for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }
}

impl FromStr for AttributePath {
    type Err = std::convert::Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            input
                .split('.')
                .filter(|step| !step.is_empty())
                .map(|step| match step.parse() {
                    Ok(index) => PathStep::Index(index),
                    Err(_) => PathStep::Attribute(step.to_owned()),
                })
                .collect(),
        ))
    }
}

impl From<&str> for AttributePath {
    fn from(input: &str) -> Self {
        let Ok(path) = input.parse::<Self>();
        path
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, step) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str(".")?;
            }
            match step {
                PathStep::Attribute(name) => f.write_str(name)?,
                PathStep::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}
