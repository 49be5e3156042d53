use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, Row, Value};

/// An operator-managed user account as listed by the users endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub uuid: Uuid,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub active: bool,
}

impl Row for Person {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.uuid
    }

    fn field(&self, name: &str) -> Value {
        match name {
            "uuid" | "id" => self.uuid.to_string().into(),
            "name" => self.name.as_str().into(),
            "display_name" => self.display_name.as_str().into(),
            "mail" => self.mail.as_deref().into(),
            "groups" => self.groups.join(", ").into(),
            "active" => self.active.into(),
            _ => Value::Null,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        match (name, value) {
            ("name", Value::String(s)) => self.name = s,
            ("display_name", Value::String(s)) => self.display_name = s,
            ("mail", Value::String(s)) => self.mail = Some(s),
            ("mail", Value::Null) => self.mail = None,
            ("active", Value::Bool(b)) => self.active = b,
            ("uuid" | "id" | "groups", _) => {
                return Err(Error::invalid_field(name, "field is read-only"));
            }
            ("name" | "display_name" | "mail" | "active", other) => {
                return Err(Error::invalid_field(
                    name,
                    format!("unexpected value '{other}'"),
                ));
            }
            _ => return Err(Error::invalid_field(name, "no such field")),
        }
        Ok(())
    }
}
