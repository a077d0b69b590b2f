use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    types::{author::Author, date::parse_date, publisher::Publisher, source_record::SourceRecord},
    validation::{Fields, Path, Policy, Record, ValidationError, Violations},
};

/// A bibliographic entry with at least one source record, author and publisher.
///
/// `author` and `publisher` are free-form legacy fields and are never validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Book {
    title:          String,
    source_records: Vec<SourceRecord>,
    authors:        Vec<Author>,
    publishers:     Vec<Publisher>,
    publish_date:   Option<NaiveDate>,
    author:         String,
    publisher:      String,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        source_records: Vec<SourceRecord>,
        authors: Vec<Author>,
        publishers: Vec<Publisher>,
        publish_date: Option<NaiveDate>,
        author: impl Into<String>,
        publisher: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let root = Path::default();
        let mut violations = Violations::default();
        violations.non_empty_list(root.key("source_records"), &source_records);
        violations.non_empty_list(root.key("authors"), &authors);
        violations.non_empty_list(root.key("publishers"), &publishers);
        violations.finish(
            Self::NAME,
            Self {
                title: title.into(),
                source_records,
                authors,
                publishers,
                publish_date,
                author: author.into(),
                publisher: publisher.into(),
            },
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source_records(&self) -> &[SourceRecord] {
        &self.source_records
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn publishers(&self) -> &[Publisher] {
        &self.publishers
    }

    pub fn publish_date(&self) -> Option<NaiveDate> {
        self.publish_date
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }
}

impl Record for Book {
    const NAME: &'static str = "Book";
    const FIELDS: &'static [&'static str] = &[
        "title",
        "source_records",
        "authors",
        "publishers",
        "publish_date",
        "author",
        "publisher",
    ];

    fn read(fields: &mut Fields<'_>) -> Self {
        let title = fields.string("title", Policy::Any);
        let source_records = fields.records("source_records", Policy::NonEmpty);
        let authors = fields.records("authors", Policy::NonEmpty);
        let publishers = fields.records("publishers", Policy::NonEmpty);
        let publish_date = match fields.optional("publish_date").map(parse_date) {
            None => None,
            Some(Ok(date)) => date,
            Some(Err(kind)) => {
                let path = fields.path("publish_date");
                fields.violations().push(path, kind);
                None
            }
        };
        Self {
            title,
            source_records,
            authors,
            publishers,
            publish_date,
            author: fields.string("author", Policy::Any),
            publisher: fields.string("publisher", Policy::Any),
        }
    }
}

impl TryFrom<Value> for Book {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}
