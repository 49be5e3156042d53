mod error;
mod inspection;
mod person;
mod record;
pub mod session;
mod value;

pub use error::{Error, Result};
pub use inspection::{Inspection, InspectionStatus};
pub use person::Person;
pub use record::{ID_FIELD, Patch, Record, Row};
pub use session::{Access, AuthHeader, UserSession};
pub use value::Value;
