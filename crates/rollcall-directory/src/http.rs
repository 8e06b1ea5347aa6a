//! HTTP directory client
//!
//! Queries `GET {base_url}/{badge_id}` and expects `{"name": "..."}`. A 404
//! means the badge is unknown; any other failure means the directory is
//! unavailable. The blocking client runs on tokio's blocking pool.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::DirectoryResolver;
use crate::error::DirectoryError;

/// Default per-request timeout
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct NameRecord {
    #[serde(default)]
    name: Option<String>,
}

/// Directory reached over HTTP
#[derive(Clone)]
pub struct HttpDirectory {
    base_url: Url,
    agent: ureq::Agent,
}

impl HttpDirectory {
    pub fn new(base_url: &str) -> Result<Self, DirectoryError> {
        Self::with_timeout(base_url, DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let base_url =
            Url::parse(base_url).map_err(|e| DirectoryError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::InvalidUrl(format!(
                "{base_url} cannot be a base"
            )));
        }

        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Ok(Self { base_url, agent })
    }

    /// Lookup URL for a badge; the identifier is percent-encoded as one segment
    pub fn lookup_url(&self, badge_id: &str) -> Result<Url, DirectoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DirectoryError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(badge_id);
        Ok(url)
    }

    fn fetch(agent: &ureq::Agent, url: &Url) -> Result<Option<String>, DirectoryError> {
        match agent
            .get(url.as_str())
            .set("Accept", "application/json")
            .call()
        {
            Ok(response) => {
                let record: NameRecord = response
                    .into_json()
                    .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;
                Ok(record.name.filter(|name| !name.trim().is_empty()))
            }
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(ureq::Error::Status(code, _)) => {
                Err(DirectoryError::Unavailable(format!("HTTP {code}")))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(DirectoryError::Unavailable(transport.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for HttpDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDirectory")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DirectoryResolver for HttpDirectory {
    async fn resolve(&self, badge_id: &str) -> Result<Option<String>, DirectoryError> {
        let url = self.lookup_url(badge_id)?;
        let agent = self.agent.clone();

        debug!(url = %url, "Querying directory");
        let result = tokio::task::spawn_blocking(move || Self::fetch(&agent, &url))
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        if let Err(e) = &result {
            warn!(badge_id = %badge_id, error = %e, "Directory lookup failed");
        }
        result
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
