//! Blocking client for the Open Library JSON endpoints.
//!
//! Every call is a single GET with a bounded timeout. Nothing is retried; the caller
//! decides what to do with a failure.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::FetchError,
    traits::Fetch,
    types::{olid::Olid, work::Work},
    validation::Record,
};

#[derive(Debug, Clone)]
pub struct Client {
    http:     reqwest::blocking::Client,
    base_url: String,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, olid: &Olid) -> String {
        format!("{}/{olid}.json", self.base_url)
    }

    pub fn fetch_olid(&self, olid: &Olid) -> Result<Map<String, Value>, FetchError> {
        let url = self.url_for(olid);
        info!("Gathering data from {url}.");
        let resp = match self.http.get(&url).send() {
            Ok(resp) => resp,
            Err(source) => return Err(FetchError::Transport { url, source }),
        };
        let status = resp.status();
        debug!("{url} answered {status}");
        if status == StatusCode::NOT_FOUND {
            warn!("Nothing found at {url}.");
            return Err(FetchError::NotFound { url });
        }
        if !status.is_success() {
            warn!("{url} answered {status}.");
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = match resp.text() {
            Ok(body) => body,
            Err(source) => return Err(FetchError::Transport { url, source }),
        };
        match serde_json::from_str(&body) {
            Ok(Value::Object(record)) => Ok(record),
            Ok(_) => Err(FetchError::NotAnObject { url }),
            Err(source) => Err(FetchError::Decode { url, source }),
        }
    }

    /// Fetches an edition and decodes it as a [Work]. References are left unresolved.
    pub fn fetch_work(&self, olid: &str) -> Result<Work, FetchError> {
        let record = self.fetch(olid)?;
        Ok(Work::from_value(&Value::Object(record))?)
    }
}

impl Fetch for Client {
    fn fetch(&self, olid: &str) -> Result<Map<String, Value>, FetchError> {
        let olid: Olid = olid.parse()?;
        self.fetch_olid(&olid)
    }
}
