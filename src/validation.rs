//! Field-level validation for records built from loosely-structured JSON.
//!
//! Every check appends to a shared [Violations] list instead of returning early, so a
//! single construction attempt reports every problem it finds.

use std::fmt::Display;

use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Location of a field inside a (possibly nested) record.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Path(pub Vec<PathSegment>);

impl Path {
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "__root__");
        }
        let mut segments = self.0.iter().peekable();
        while let Some(segment) = segments.next() {
            write!(f, "{segment}")?;
            if segments.peek().is_some() {
                write!(f, " -> ")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    WrongType { expected: &'static str },
    EmptyString,
    EmptyList,
    InvalidDate,
    ExtraField,
}

impl Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationKind::Missing => write!(f, "field required"),
            ViolationKind::WrongType { expected } => write!(f, "value is not a valid {expected}"),
            ViolationKind::EmptyString => write!(f, "must not be an empty string"),
            ViolationKind::EmptyList => write!(f, "list must not be empty"),
            ViolationKind::InvalidDate => write!(f, "invalid date format"),
            ViolationKind::ExtraField => write!(f, "extra fields not permitted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: Path,
    pub kind: ViolationKind,
}

/// Every constraint a single construction attempt violated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render(.model, .violations))]
pub struct ValidationError {
    pub model:      &'static str,
    pub violations: Vec<Violation>,
}

fn render(model: &str, violations: &[Violation]) -> String {
    let count = violations.len();
    let plural = if count == 1 { "" } else { "s" };
    let mut s = format!("{count} validation error{plural} for {model}");
    for violation in violations {
        s.push_str(&format!("\n{}\n  {}", violation.path, violation.kind));
    }
    s
}

impl ValidationError {
    pub fn new(model: &'static str, violations: Vec<Violation>) -> Self {
        Self { model, violations }
    }

    /// First violation recorded at exactly `path`, if any.
    pub fn at(&self, path: &[&str]) -> Option<&Violation> {
        self.violations.iter().find(|v| {
            v.path.0.len() == path.len()
                && v.path.0.iter().zip(path).all(|(segment, expected)| match segment {
                    PathSegment::Key(key) => key == expected,
                    PathSegment::Index(index) => index.to_string() == *expected,
                })
        })
    }
}

#[derive(Default, Debug)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn push(&mut self, path: Path, kind: ViolationKind) {
        self.0.push(Violation { path, kind });
    }

    pub fn non_empty_str(&mut self, path: Path, s: &str) {
        if s.is_empty() {
            self.push(path, ViolationKind::EmptyString);
        }
    }

    pub fn non_empty_list<T>(&mut self, path: Path, list: &[T]) {
        if list.is_empty() {
            self.push(path, ViolationKind::EmptyList);
        }
    }

    /// Hands back `value` only when nothing was violated.
    pub fn finish<T>(self, model: &'static str, value: T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError::new(model, self.0))
        }
    }
}

/// Whether keys a record does not declare are tolerated.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Any,
    NonEmpty,
}

/// Reads declared fields out of one JSON object, recording violations under `path`.
///
/// Readers always hand back a value, falling back to an empty one on failure; the
/// record built from them is discarded by [Record::from_value_with] whenever a
/// violation was recorded.
pub struct Fields<'a> {
    object:     &'a Map<String, Value>,
    path:       Path,
    mode:       Mode,
    violations: &'a mut Violations,
}

impl<'a> Fields<'a> {
    pub fn new(object: &'a Map<String, Value>, path: Path, mode: Mode, violations: &'a mut Violations) -> Self {
        Self { object, path, mode, violations }
    }

    pub fn path(&self, name: &str) -> Path {
        self.path.key(name)
    }

    pub fn violations(&mut self) -> &mut Violations {
        &mut *self.violations
    }

    fn wrong_type(&mut self, name: &str, expected: &'static str) {
        let path = self.path(name);
        self.violations.push(path, ViolationKind::WrongType { expected });
    }

    fn required(&mut self, name: &str) -> Option<&'a Value> {
        let object = self.object;
        let value = object.get(name);
        if value.is_none() {
            let path = self.path(name);
            self.violations.push(path, ViolationKind::Missing);
        }
        value
    }

    /// Optional fields read explicit `null` the same as absence.
    pub fn optional(&self, name: &str) -> Option<&'a Value> {
        let object = self.object;
        object.get(name).filter(|v| !v.is_null())
    }

    pub fn string(&mut self, name: &str, policy: Policy) -> String {
        let Some(value) = self.required(name) else {
            return String::new();
        };
        let path = self.path(name);
        match value.as_str() {
            Some(s) => {
                if policy == Policy::NonEmpty {
                    self.violations.non_empty_str(path, s);
                }
                s.to_string()
            }
            None => {
                self.violations.push(path, ViolationKind::WrongType { expected: "string" });
                String::new()
            }
        }
    }

    pub fn optional_string(&mut self, name: &str) -> Option<String> {
        let value = self.optional(name)?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.wrong_type(name, "string");
                None
            }
        }
    }

    pub fn optional_int(&mut self, name: &str) -> Option<i64> {
        let value = self.optional(name)?;
        let int = value.as_i64();
        if int.is_none() {
            self.wrong_type(name, "integer");
        }
        int
    }

    /// Untyped mapping; absent reads as empty.
    pub fn map(&mut self, name: &str) -> Map<String, Value> {
        let Some(value) = self.optional(name) else {
            debug!("{} absent, defaulting to an empty map", self.path(name));
            return Map::new();
        };
        match value.as_object() {
            Some(map) => map.clone(),
            None => {
                self.wrong_type(name, "object");
                Map::new()
            }
        }
    }

    pub fn optional_record<T: Record>(&mut self, name: &str) -> Option<T> {
        let value = self.optional(name)?;
        read_record::<T>(value, self.path(name), self.mode, &mut *self.violations)
    }

    pub fn records<T: Record>(&mut self, name: &str, policy: Policy) -> Vec<T> {
        let Some(value) = self.required(name) else {
            return Vec::new();
        };
        let path = self.path(name);
        let Some(items) = value.as_array() else {
            self.violations.push(path, ViolationKind::WrongType { expected: "list" });
            return Vec::new();
        };
        if policy == Policy::NonEmpty {
            self.violations.non_empty_list(path.clone(), items);
        }
        self.items(&path, items, read_record::<T>)
    }

    /// Optional list whose elements are decoded by `item`; absent reads as empty.
    pub fn list<T>(
        &mut self,
        name: &str,
        item: impl FnMut(&'a Value, Path, Mode, &mut Violations) -> Option<T>,
    ) -> Vec<T> {
        let path = self.path(name);
        let Some(value) = self.optional(name) else {
            debug!("{path} absent, defaulting to an empty list");
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.violations.push(path, ViolationKind::WrongType { expected: "list" });
            return Vec::new();
        };
        self.items(&path, items, item)
    }

    pub fn strings(&mut self, name: &str) -> Vec<String> {
        self.list(name, |value, path, _, violations| match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                violations.push(path, ViolationKind::WrongType { expected: "string" });
                None
            }
        })
    }

    pub fn ints(&mut self, name: &str) -> Vec<i64> {
        self.list(name, |value, path, _, violations| {
            let int = value.as_i64();
            if int.is_none() {
                violations.push(path, ViolationKind::WrongType { expected: "integer" });
            }
            int
        })
    }

    fn items<T>(
        &mut self,
        path: &Path,
        items: &'a [Value],
        mut item: impl FnMut(&'a Value, Path, Mode, &mut Violations) -> Option<T>,
    ) -> Vec<T> {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, value)| item(value, path.index(i), self.mode, &mut *self.violations))
            .collect()
    }

    /// Strict mode: flag every key the record does not declare.
    fn reject_extra(&mut self, declared: &[&str]) {
        if self.mode != Mode::Strict {
            return;
        }
        let object = self.object;
        for key in object.keys() {
            if !declared.contains(&key.as_str()) {
                let path = self.path(key);
                self.violations.push(path, ViolationKind::ExtraField);
            }
        }
    }
}

/// Reads one nested record at `path`; `None` when `value` is not an object.
pub fn read_record<T: Record>(value: &Value, path: Path, mode: Mode, violations: &mut Violations) -> Option<T> {
    let Value::Object(object) = value else {
        violations.push(path, ViolationKind::WrongType { expected: "object" });
        return None;
    };
    let mut fields = Fields::new(object, path, mode, violations);
    let record = T::read(&mut fields);
    fields.reject_extra(T::FIELDS);
    Some(record)
}

/// A schema record constructed, all or nothing, from a JSON object.
pub trait Record: Sized {
    const NAME: &'static str;
    /// Declared field names in declaration order.
    const FIELDS: &'static [&'static str];

    fn read(fields: &mut Fields<'_>) -> Self;

    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        Self::from_value_with(value, Mode::default())
    }

    fn from_value_with(value: &Value, mode: Mode) -> Result<Self, ValidationError> {
        let mut violations = Violations::default();
        let record = read_record::<Self>(value, Path::default(), mode, &mut violations);
        match record {
            Some(record) => violations.finish(Self::NAME, record),
            None => Err(ValidationError::new(Self::NAME, violations.0)),
        }
    }

    fn from_json(s: &str) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Ok(Self::from_value(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn path_display() {
        let path = Path::default().key("source_records").index(0).key("record");
        assert_eq!(path.to_string(), "source_records -> 0 -> record");
        assert_eq!(Path::default().to_string(), "__root__");
    }

    #[test]
    fn error_display_lists_each_violation() {
        let mut violations = Violations::default();
        violations.push(Path::default().key("authors"), ViolationKind::EmptyList);
        violations.push(Path::default().key("publishers"), ViolationKind::EmptyList);
        let err = violations.finish("Book", ()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "2 validation errors for Book\nauthors\n  list must not be empty\npublishers\n  list must not be empty"
        );
        let err: &dyn std::error::Error = &err;
        assert!(err.source().is_none());
        assert!(err.to_string().starts_with("2 validation errors"));
    }

    #[test]
    fn optional_readers_collect_every_violation() {
        let object = match serde_json::json!({
            "covers": [8739161, "x", 2],
            "isbn_10": "0140328726",
            "revision": "many",
            "ocaid": null
        }) {
            Value::Object(object) => object,
            _ => unreachable!(),
        };
        let mut violations = Violations::default();
        let mut fields = Fields::new(&object, Path::default(), Mode::Lenient, &mut violations);
        assert_eq!(fields.ints("covers"), vec![8739161, 2]);
        assert_eq!(fields.strings("isbn_10"), Vec::<String>::new());
        assert_eq!(fields.optional_int("revision"), None);
        assert_eq!(fields.optional_string("ocaid"), None);
        assert_eq!(fields.strings("publishers"), Vec::<String>::new());
        assert!(fields.map("classifications").is_empty());
        let err = violations.finish("Work", ()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "3 validation errors for Work\n\
             covers -> 1\n  value is not a valid integer\n\
             isbn_10\n  value is not a valid list\n\
             revision\n  value is not a valid integer"
        );
    }

    #[test]
    fn finish_without_violations() {
        assert_eq!(Violations::default().finish("Author", 7), Ok(7));
    }
}
