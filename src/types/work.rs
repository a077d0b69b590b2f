use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::FetchError,
    traits::Fetch,
    validation::{read_record, Fields, Mode, Path, Policy, Record, ValidationError, Violations},
};

/// Back-reference to another remote record. Only resolved on request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct OlId {
    pub key: String,
}

impl Record for OlId {
    const NAME: &'static str = "OlId";
    const FIELDS: &'static [&'static str] = &["key"];

    fn read(fields: &mut Fields<'_>) -> Self {
        Self {
            key: fields.string("key", Policy::NonEmpty),
        }
    }
}

/// Tagged value such as `{"type": "/type/datetime", "value": "2008-04-01T03:28:50.625462"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct OlType {
    #[serde(rename = "type")]
    pub kind:  String,
    pub value: String,
}

impl Record for OlType {
    const NAME: &'static str = "OlType";
    const FIELDS: &'static [&'static str] = &["type", "value"];

    fn read(fields: &mut Fields<'_>) -> Self {
        Self {
            kind:  fields.string("type", Policy::Any),
            value: fields.string("value", Policy::Any),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Identifier {
    pub goodreads:    Vec<String>,
    pub librarything: Vec<String>,
}

impl Record for Identifier {
    const NAME: &'static str = "Identifier";
    const FIELDS: &'static [&'static str] = &["goodreads", "librarything"];

    fn read(fields: &mut Fields<'_>) -> Self {
        Self {
            goodreads:    fields.strings("goodreads"),
            librarything: fields.strings("librarything"),
        }
    }
}

/// A reference slot: either the bare key or the record fetched for it.
///
/// A slot reads back as [Reference::Resolved] only when the object carries more than
/// its `key`, so a fetched record consisting of nothing but a key comes back as
/// [Reference::Key].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reference {
    Key(OlId),
    Resolved(Map<String, Value>),
}

impl Reference {
    pub fn key(&self) -> Option<&str> {
        match self {
            Reference::Key(olid) => Some(&olid.key),
            Reference::Resolved(record) => record.get("key").and_then(Value::as_str),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Reference::Resolved(_))
    }

    fn read(value: &Value, path: Path, mode: Mode, violations: &mut Violations) -> Option<Self> {
        if let Value::Object(record) = value {
            if record.len() > 1 && record.get("key").is_some_and(Value::is_string) {
                return Some(Reference::Resolved(record.clone()));
            }
        }
        read_record::<OlId>(value, path, mode, violations).map(Reference::Key)
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let mut violations = Violations::default();
        let reference = Reference::read(&value, Path::default(), Mode::default(), &mut violations);
        violations
            .finish("Reference", reference)
            .map_err(serde::de::Error::custom)?
            .ok_or_else(|| serde::de::Error::custom("unreadable reference"))
    }
}

/// Edition record as served by `https://openlibrary.org/isbn/<isbn>.json`.
///
/// Only `key` and `title` are required. Absent sequences and `classifications` read as
/// empty, absent scalars as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Work {
    pub authors:         Vec<Reference>,
    pub classifications: Map<String, Value>,
    pub contributions:   Vec<String>,
    pub covers:          Vec<i64>,
    pub created:         Option<OlType>,
    pub first_sentence:  Option<OlType>,
    pub identifiers:     Option<Identifier>,
    pub isbn_10:         Vec<String>,
    pub isbn_13:         Vec<String>,
    pub key:             String,
    pub languages:       Vec<Reference>,
    pub last_modified:   Option<OlType>,
    pub latest_revision: Option<i64>,
    pub local_id:        Vec<String>,
    pub number_of_pages: Option<i64>,
    pub ocaid:           Option<String>,
    pub publish_date:    Option<String>,
    pub publishers:      Vec<String>,
    pub revision:        Option<i64>,
    pub source_records:  Vec<String>,
    pub title:           String,
    #[serde(rename = "type")]
    pub kind:            Option<OlId>,
    pub works:           Vec<Reference>,
}

impl Record for Work {
    const NAME: &'static str = "Work";
    const FIELDS: &'static [&'static str] = &[
        "authors",
        "classifications",
        "contributions",
        "covers",
        "created",
        "first_sentence",
        "identifiers",
        "isbn_10",
        "isbn_13",
        "key",
        "languages",
        "last_modified",
        "latest_revision",
        "local_id",
        "number_of_pages",
        "ocaid",
        "publish_date",
        "publishers",
        "revision",
        "source_records",
        "title",
        "type",
        "works",
    ];

    fn read(fields: &mut Fields<'_>) -> Self {
        Self {
            authors:         fields.list("authors", Reference::read),
            classifications: fields.map("classifications"),
            contributions:   fields.strings("contributions"),
            covers:          fields.ints("covers"),
            created:         fields.optional_record("created"),
            first_sentence:  fields.optional_record("first_sentence"),
            identifiers:     fields.optional_record("identifiers"),
            isbn_10:         fields.strings("isbn_10"),
            isbn_13:         fields.strings("isbn_13"),
            key:             fields.string("key", Policy::NonEmpty),
            languages:       fields.list("languages", Reference::read),
            last_modified:   fields.optional_record("last_modified"),
            latest_revision: fields.optional_int("latest_revision"),
            local_id:        fields.strings("local_id"),
            number_of_pages: fields.optional_int("number_of_pages"),
            ocaid:           fields.optional_string("ocaid"),
            publish_date:    fields.optional_string("publish_date"),
            publishers:      fields.strings("publishers"),
            revision:        fields.optional_int("revision"),
            source_records:  fields.strings("source_records"),
            title:           fields.string("title", Policy::Any),
            kind:            fields.optional_record("type"),
            works:           fields.list("works", Reference::read),
        }
    }
}

macro_rules! try_from_value {
    ($($ty:ty),*) => {
        $(impl TryFrom<Value> for $ty {
            type Error = ValidationError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                Self::from_value(&value)
            }
        })*
    };
}

try_from_value!(OlId, OlType, Identifier, Work);

impl Work {
    pub fn hydrate_authors(&mut self, fetcher: &impl Fetch) -> Result<usize, FetchError> {
        hydrate(&mut self.authors, fetcher)
    }

    pub fn hydrate_languages(&mut self, fetcher: &impl Fetch) -> Result<usize, FetchError> {
        hydrate(&mut self.languages, fetcher)
    }

    pub fn hydrate_works(&mut self, fetcher: &impl Fetch) -> Result<usize, FetchError> {
        hydrate(&mut self.works, fetcher)
    }
}

/// Replaces each unresolved reference with the record fetched for its key, in order.
///
/// One request per reference, even when keys repeat. Stops at the first failure; slots
/// replaced before it stay replaced.
fn hydrate(references: &mut [Reference], fetcher: &impl Fetch) -> Result<usize, FetchError> {
    let mut resolved = 0;
    for reference in references.iter_mut() {
        let Reference::Key(olid) = reference else {
            continue;
        };
        debug!("Lazy loading {}", olid.key);
        let record = fetcher.fetch(&olid.key)?;
        *reference = Reference::Resolved(record);
        resolved += 1;
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::validation::ViolationKind;

    struct Recorder {
        calls:   RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl Recorder {
        fn new() -> Self {
            Self { calls: RefCell::new(vec![]), fail_on: None }
        }
    }

    impl Fetch for Recorder {
        fn fetch(&self, olid: &str) -> Result<Map<String, Value>, FetchError> {
            self.calls.borrow_mut().push(olid.to_string());
            if self.fail_on == Some(olid) {
                return Err(FetchError::NotFound { url: olid.to_string() });
            }
            match json!({"key": olid, "name": format!("resolved {olid}")}) {
                Value::Object(record) => Ok(record),
                _ => unreachable!(),
            }
        }
    }

    fn edition() -> Value {
        json!({
            "authors": [{"key": "/authors/OL34184A"}, {"key": "/authors/OL2A"}, {"key": "/authors/OL34184A"}],
            "classifications": {},
            "covers": [8739161],
            "created": {"type": "/type/datetime", "value": "2008-04-01T03:28:50.625462"},
            "isbn_10": ["0140328726"],
            "key": "/books/OL7353617M",
            "languages": [{"key": "/languages/eng"}],
            "number_of_pages": 96,
            "publish_date": "October 1, 1988",
            "publishers": ["Puffin"],
            "title": "Fantastic Mr. Fox",
            "type": {"key": "/type/edition"},
            "works": [{"key": "/works/OL45804W"}],
            "physical_format": "Paperback"
        })
    }

    #[test]
    fn decodes_edition() {
        let work = Work::from_value(&edition()).unwrap();
        assert_eq!(work.title, "Fantastic Mr. Fox");
        assert_eq!(work.kind, Some(OlId { key: "/type/edition".into() }));
        assert_eq!(work.created.unwrap().kind, "/type/datetime");
        assert_eq!(work.authors[1].key(), Some("/authors/OL2A"));
        assert!(work.contributions.is_empty());
        assert_eq!(work.ocaid, None);
    }

    #[test]
    fn reports_path_of_bad_field() {
        let mut value = edition();
        value["covers"] = json!([8739161, "cover"]);
        let err = Work::from_value(&value).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].path.to_string(), "covers -> 1");
        assert_eq!(err.violations[0].kind, ViolationKind::WrongType { expected: "integer" });
    }

    #[test]
    fn reports_every_bad_field() {
        let err = Work::from_value(&json!({"covers": ["x"], "number_of_pages": "many"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "4 validation errors for Work\n\
             covers -> 0\n  value is not a valid integer\n\
             key\n  field required\n\
             number_of_pages\n  value is not a valid integer\n\
             title\n  field required"
        );
    }

    #[test]
    fn nested_values_are_checked() {
        let mut value = edition();
        value["created"] = json!({"type": "/type/datetime"});
        value["identifiers"] = json!({"goodreads": [1]});
        value["authors"] = json!([{"key": "/authors/OL34184A"}, {"name": "no key"}, "OL2A"]);
        value["type"] = json!({"key": ""});
        let err = Work::from_value(&value).unwrap_err();
        let found = err
            .violations
            .iter()
            .map(|v| (v.path.to_string(), v.kind.clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            found,
            vec![
                ("authors -> 1 -> key".to_string(), ViolationKind::Missing),
                ("authors -> 2".to_string(), ViolationKind::WrongType { expected: "object" }),
                ("created -> value".to_string(), ViolationKind::Missing),
                (
                    "identifiers -> goodreads -> 0".to_string(),
                    ViolationKind::WrongType { expected: "string" }
                ),
                ("type -> key".to_string(), ViolationKind::EmptyString),
            ]
        );
    }

    #[test]
    fn absent_sequences_default_to_empty() {
        let work = Work::from_value(&json!({"key": "/books/OL1M", "title": ""})).unwrap();
        assert!(work.authors.is_empty());
        assert!(work.classifications.is_empty());
        assert_eq!(work.kind, None);
        let err = Work::from_value(&json!({"key": "/books/OL1M", "title": "", "authors": null, "works": {}}))
            .unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.at(&["works"]).unwrap().kind, ViolationKind::WrongType { expected: "list" });
    }

    #[test]
    fn key_only_record_reads_back_as_key() {
        let reference: Reference = serde_json::from_value(json!({"key": "/languages/eng"})).unwrap();
        assert_eq!(reference, Reference::Key(OlId { key: "/languages/eng".into() }));
        let reference: Reference =
            serde_json::from_value(json!({"key": "/languages/eng", "name": "English"})).unwrap();
        assert!(reference.is_resolved());
        assert!(serde_json::from_value::<Reference>(json!({"name": "English"})).is_err());
    }

    #[test]
    fn hydrates_in_order_without_memoizing() {
        let mut work = Work::from_value(&edition()).unwrap();
        let recorder = Recorder::new();
        assert_eq!(work.hydrate_authors(&recorder).unwrap(), 3);
        assert_eq!(work.hydrate_languages(&recorder).unwrap(), 1);
        assert_eq!(
            *recorder.calls.borrow(),
            vec!["/authors/OL34184A", "/authors/OL2A", "/authors/OL34184A", "/languages/eng"]
        );
        assert!(work.authors.iter().all(Reference::is_resolved));
        assert!(!work.works[0].is_resolved());

        // Already resolved slots are left alone.
        assert_eq!(work.hydrate_authors(&recorder).unwrap(), 0);
        assert_eq!(recorder.calls.borrow().len(), 4);
    }

    #[test]
    fn hydration_stops_at_first_failure() {
        let mut work = Work::from_value(&edition()).unwrap();
        let recorder = Recorder { fail_on: Some("/authors/OL2A"), ..Recorder::new() };
        assert!(matches!(work.hydrate_authors(&recorder), Err(FetchError::NotFound { .. })));
        assert!(work.authors[0].is_resolved());
        assert!(!work.authors[1].is_resolved());
        assert!(!work.authors[2].is_resolved());
        assert_eq!(recorder.calls.borrow().len(), 2);
    }

    #[test]
    fn resolved_references_round_trip() {
        let mut work = Work::from_value(&edition()).unwrap();
        work.hydrate_works(&Recorder::new()).unwrap();
        let value = serde_json::to_value(&work).unwrap();
        assert_eq!(value["type"], json!({"key": "/type/edition"}));
        assert_eq!(Work::from_value(&value).unwrap(), work);
    }
}
