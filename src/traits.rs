use serde_json::{Map, Value};

use crate::error::FetchError;

/// Resolves an identifier to the raw record behind it.
pub trait Fetch {
    fn fetch(&self, olid: &str) -> Result<Map<String, Value>, FetchError>;
}
