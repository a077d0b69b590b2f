use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{Fields, Path, Policy, Record, ValidationError, Violations};

/// Provenance of a bibliographic entry, e.g. `marc:marc_loc_2016/BooksAll.2016.part25.utf8:1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct SourceRecord {
    record: String,
}

impl SourceRecord {
    pub fn new(record: impl Into<String>) -> Result<Self, ValidationError> {
        let record = record.into();
        let mut violations = Violations::default();
        violations.non_empty_str(Path::default().key("record"), &record);
        violations.finish(Self::NAME, Self { record })
    }

    pub fn record(&self) -> &str {
        &self.record
    }
}

impl Record for SourceRecord {
    const NAME: &'static str = "SourceRecord";
    const FIELDS: &'static [&'static str] = &["record"];

    fn read(fields: &mut Fields<'_>) -> Self {
        Self {
            record: fields.string("record", Policy::NonEmpty),
        }
    }
}

impl TryFrom<Value> for SourceRecord {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}
