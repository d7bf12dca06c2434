//! HTTP client for the Delphi Epidata API.

use crate::epiweek::{EpiRange, EpiweekSpec};
use crate::error::{EpidataError, Result};
use crate::observation::Observation;
use crate::query::{EpidataQuery, Revision};
use crate::response::{parse_fluview, parse_rows};
use crate::source::EpidataSource;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Public Epidata endpoint accepting `source=...` style queries.
pub const DEFAULT_BASE_URL: &str = "https://api.delphi.cmu.edu/epidata/api.php";

/// Connection and retry settings for [`EpidataClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct EpidataConfig {
    pub base_url: String,
    /// Attempts per request, including the first one
    pub max_tries: u32,
    /// Delay before the first retry; doubles after every failed attempt
    pub initial_backoff: Duration,
    pub timeout: Duration,
}

impl Default for EpidataConfig {
    fn default() -> Self {
        EpidataConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tries: 3,
            initial_backoff: Duration::from_millis(1000),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Epidata API client. Transport failures are retried with exponential
/// backoff; API-level refusals are returned immediately.
#[derive(Debug, Clone)]
pub struct EpidataClient {
    client: Client,
    config: EpidataConfig,
}

impl EpidataClient {
    pub fn new(config: EpidataConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("flusight/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EpidataError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(EpidataClient { client, config })
    }

    pub fn config(&self) -> &EpidataConfig {
        &self.config
    }

    async fn get_body_once(&self, query: &EpidataQuery) -> Result<String> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(query.params())
            .send()
            .await
            .map_err(|e| EpidataError::Transport(format!("request failed: {e}")))?;
        if response.status() != StatusCode::OK {
            return Err(EpidataError::Transport(format!(
                "bad response status: {}",
                response.status()
            )));
        }
        response
            .text()
            .await
            .map_err(|e| EpidataError::Transport(format!("failed to read response body: {e}")))
    }

    /// Fetch the raw response body for a query, retrying transport failures.
    pub async fn get_body(&self, query: &EpidataQuery) -> Result<String> {
        let max_tries = self.config.max_tries.max(1);
        let mut backoff = self.config.initial_backoff;
        let mut attempt = 1;
        loop {
            debug!("Attempt {}/{}: {}", attempt, max_tries, query.describe());
            match self.get_body_once(query).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < max_tries => {
                    warn!("Attempt {}/{} failed: {}", attempt, max_tries, e);
                    info!(
                        "Sleeping for {} milliseconds before retry",
                        backoff.as_millis()
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    warn!("All attempts failed for {}", query.describe());
                    return Err(e);
                }
            }
        }
    }

    /// Run any query and decode its rows as `T`. Used for the `ilinet` and
    /// `stateili` sources, whose rows are passed through as is.
    pub async fn rows<T: DeserializeOwned>(&self, query: &EpidataQuery) -> Result<Vec<T>> {
        let body = self.get_body(query).await?;
        parse_rows(&body)
    }

    /// Run a `fluview` query and normalize the rows into observations.
    pub async fn fluview<R: AsRef<str>>(
        &self,
        regions: &[R],
        epiweeks: &[EpiweekSpec],
        revision: &Revision,
    ) -> Result<Vec<Observation>> {
        let query = EpidataQuery::fluview(regions, epiweeks, revision)?;
        let body = self.get_body(&query).await?;
        parse_fluview(&body, query.lag())
    }
}

impl EpidataSource for EpidataClient {
    async fn fetch(
        &self,
        regions: &[String],
        range: EpiRange,
        lag: Option<u32>,
    ) -> Result<Vec<Observation>> {
        let revision = lag.map_or(Revision::Latest, Revision::Lag);
        self.fluview(regions, &[EpiweekSpec::Range(range)], &revision)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epiweek::EpiWeek;

    #[test]
    fn test_default_config() {
        let config = EpidataConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_tries, 3);
        assert_eq!(config.initial_backoff, Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = EpidataClient::new(EpidataConfig {
            base_url: "http://127.0.0.1:9/epidata/api.php".to_string(),
            max_tries: 2,
            initial_backoff: Duration::from_millis(1),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        let week = EpiWeek::from_raw(201501);
        let err = client
            .fluview(&["nat"], &[EpiweekSpec::Single(week)], &Revision::Lag(0))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
