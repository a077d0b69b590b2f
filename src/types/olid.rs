use std::{fmt::Display, str::FromStr};

use crate::error::FetchError;

/// Open Library identifier in its canonical `<namespace>/<id>` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Olid(String);

impl Olid {
    pub fn namespace(&self) -> &str {
        self.split().0
    }

    pub fn id(&self) -> &str {
        self.split().1
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn split(&self) -> (&str, &str) {
        // Shape is checked on construction.
        self.0.split_once('/').unwrap_or((&self.0, ""))
    }
}

impl FromStr for Olid {
    type Err = FetchError;

    /// Strips surrounding whitespace, then surrounding slashes, and requires exactly
    /// one separator in what remains.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_matches('/');
        if normalized.matches('/').count() != 1 {
            return Err(FetchError::InvalidIdentifier(s.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

impl Display for Olid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
