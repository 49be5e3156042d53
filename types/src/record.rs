use std::{collections::BTreeMap, fmt::Display, hash::Hash};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Value};

/// A partial set of field values to write onto a row.
pub type Patch = BTreeMap<String, Value>;

/// One row of domain data keyed by a stable unique id.
pub trait Row: Clone {
    type Id: Clone + Eq + Hash + Display;

    fn id(&self) -> Self::Id;

    /// The value of `name`, or [`Value::Null`] if the row has no such field.
    fn field(&self, name: &str) -> Value;

    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;

    /// Apply every entry of `patch`, stopping at the first rejected field.
    fn apply(&mut self, patch: &Patch) -> Result<()> {
        for (name, value) in patch {
            self.set_field(name, value.clone())?;
        }
        Ok(())
    }
}

pub const ID_FIELD: &str = "id";

/// An application-defined mapping from field name to scalar value.
///
/// The id lives in the `"id"` field; numeric ids are stringified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl Row for Record {
    type Id = String;

    fn id(&self) -> String {
        self.get(ID_FIELD)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    fn field(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or_default()
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        if name == ID_FIELD {
            return Err(Error::invalid_field(name, "the id cannot be changed"));
        }
        self.fields.insert(name.to_string(), value);
        Ok(())
    }
}
