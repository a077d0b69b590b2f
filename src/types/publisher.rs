use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{Fields, Path, Policy, Record, ValidationError, Violations};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Publisher {
    name: String,
}

impl Publisher {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let mut violations = Violations::default();
        violations.non_empty_str(Path::default().key("name"), &name);
        violations.finish(Self::NAME, Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Record for Publisher {
    const NAME: &'static str = "Publisher";
    const FIELDS: &'static [&'static str] = &["name"];

    fn read(fields: &mut Fields<'_>) -> Self {
        Self {
            name: fields.string("name", Policy::NonEmpty),
        }
    }
}

impl TryFrom<Value> for Publisher {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl Display for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
