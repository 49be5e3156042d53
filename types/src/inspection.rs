use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, Row, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Scheduled,
    Passed,
    Failed,
}

impl InspectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InspectionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            other => Err(Error::invalid_field(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inspection {
    pub id: u64,
    pub site: String,
    #[serde(default)]
    pub inspector: Option<String>,
    pub status: InspectionStatus,
    pub scheduled_at: Timestamp,
    #[serde(default)]
    pub score: Option<f64>,
}

impl Row for Inspection {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> Value {
        match name {
            "id" => self.id.into(),
            "site" => self.site.as_str().into(),
            "inspector" => self.inspector.as_deref().into(),
            "status" => self.status.as_str().into(),
            "scheduled_at" => self.scheduled_at.to_string().into(),
            "score" => self.score.into(),
            _ => Value::Null,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        match (name, value) {
            ("site", Value::String(s)) => self.site = s,
            ("inspector", Value::String(s)) => self.inspector = Some(s),
            ("inspector", Value::Null) => self.inspector = None,
            ("status", Value::String(s)) => self.status = s.parse()?,
            ("scheduled_at", Value::String(s)) => {
                self.scheduled_at = s
                    .parse()
                    .map_err(|e| Error::invalid_field(name, format!("{e}")))?;
            }
            ("score", Value::Number(n)) => self.score = Some(n),
            ("score", Value::Int(n)) => self.score = Some(n as f64),
            ("score", Value::Null) => self.score = None,
            ("id", _) => return Err(Error::invalid_field(name, "field is read-only")),
            ("site" | "inspector" | "status" | "scheduled_at" | "score", other) => {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn inspection() -> Inspection {
        Inspection {
            id: 12,
            site: "North Yard".into(),
            inspector: None,
            status: InspectionStatus::Scheduled,
            scheduled_at: "2024-05-01T09:30:00Z".parse().unwrap(),
            score: None,
        }
    }

    #[test]
    fn scheduled_at_reads_as_a_date() {
        let value = inspection().field("scheduled_at");
        assert_eq!(value.as_timestamp(), Some(inspection().scheduled_at));
    }

    #[test]
    fn status_round_trips_through_fields() {
        let mut i = inspection();
        i.set_field("status", Value::from("passed")).unwrap();
        assert_eq!(i.status, InspectionStatus::Passed);
        assert!(i.set_field("status", Value::from("lost")).is_err());
    }

    #[test]
    fn score_accepts_null() {
        let mut i = inspection();
        i.set_field("score", Value::Number(88.0)).unwrap();
        assert_eq!(i.field("score"), Value::Number(88.0));
        i.set_field("score", Value::Null).unwrap();
        assert_eq!(i.score, None);
        i.set_field("score", Value::Int(91)).unwrap();
        assert_eq!(i.score, Some(91.0));
    }

    #[test]
    fn id_field_is_exact() {
        let i = Inspection {
            id: 9_007_199_254_740_993,
            ..inspection()
        };
        assert_eq!(i.field("id").to_string(), "9007199254740993");
        assert_eq!(i.field("id").to_string(), i.id().to_string());
    }
}
