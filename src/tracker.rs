//! Catalog Tracker: polls the catalog and detects changes by version hash.
//!
//! The tracker owns the only piece of state that survives between cycles,
//! the last committed hash. [`CatalogTracker::poll`] never moves it; callers
//! [`commit`](CatalogTracker::commit) once the new catalog has been handled,
//! so a failed render is retried on the next poll.

use crate::catalog::{CatalogSnapshot, PayloadError};
use crate::config::FortniteApiConfig;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog endpoint answered HTTP {status}")]
    Status { status: u16 },
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog payload has no version hash")]
    MissingHash,
}

impl From<PayloadError> for TrackerError {
    fn from(e: PayloadError) -> Self {
        match e {
            PayloadError::Json(e) => TrackerError::Parse(e),
            PayloadError::MissingHash => TrackerError::MissingHash,
        }
    }
}

/// Where catalog payloads come from.
pub trait CatalogSource {
    /// Fetch the current catalog as raw JSON.
    fn fetch(&self) -> Result<Value, TrackerError>;
}

/// The catalog HTTP API: `GET <endpoint>?language=<lang>` with an `x-api-key` header.
pub struct HttpCatalogSource {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    language: String,
}

impl HttpCatalogSource {
    pub fn new(api: &FortniteApiConfig, language: &str) -> Result<Self, TrackerError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("item-shop/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: api.endpoint.clone(),
            api_key: api.api_key.clone(),
            language: language.to_string(),
        })
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(&self) -> Result<Value, TrackerError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .query(&[("language", &self.language)])
            .send()?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(TrackerError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Result of one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Poll {
    /// Set when the catalog hash differs from the last committed one.
    pub new_hash: Option<String>,
    pub snapshot: CatalogSnapshot,
}

impl Poll {
    pub fn has_update(&self) -> bool {
        self.new_hash.is_some()
    }
}

pub struct CatalogTracker<S> {
    source: S,
    last_hash: Option<String>,
}

impl<S: CatalogSource> CatalogTracker<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            last_hash: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn last_hash(&self) -> Option<&str> {
        self.last_hash.as_deref()
    }

    /// Fetch the catalog and compare its hash with the committed one.
    pub fn poll(&self) -> Result<Poll, TrackerError> {
        let snapshot = CatalogSnapshot::from_payload(self.source.fetch()?)?;
        let new_hash = match &self.last_hash {
            Some(last) if *last == snapshot.hash => None,
            _ => Some(snapshot.hash.clone()),
        };
        Ok(Poll { new_hash, snapshot })
    }

    /// Record `hash` as handled.
    pub fn commit(&mut self, hash: impl Into<String>) {
        let hash = hash.into();
        tracing::debug!(hash = %hash, "committed catalog hash");
        self.last_hash = Some(hash);
    }

    /// Poll once and commit whatever hash comes back, without handling it.
    pub fn prime(&mut self) -> Result<String, TrackerError> {
        let poll = self.poll()?;
        let hash = poll.snapshot.hash;
        self.commit(hash.clone());
        Ok(hash)
    }
}
