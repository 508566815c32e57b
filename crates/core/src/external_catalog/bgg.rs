//! BoardGameGeek XML API v2 client.
//!
//! BGG asks clients to space their requests; consecutive calls made through
//! one client are at least `rate_limit_ms` apart.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use super::parser::{parse_search_response, parse_thing_response};
use super::types::{SearchMatch, ThingDetails};
use super::{BggError, BoardGameCatalog};
use crate::config::BggConfig;
use crate::metrics::{BGG_REQUESTS, BGG_REQUEST_DURATION};

/// BoardGameGeek API client.
pub struct BggClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    search_type: String,
    last_request: Arc<Mutex<Option<Instant>>>,
    rate_limit: Duration,
}

impl BggClient {
    /// Create a new BGG client.
    pub fn new(config: &BggConfig) -> Result<Self, BggError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
            search_type: config.search_type.clone(),
            last_request: Arc::new(Mutex::new(None)),
            rate_limit: Duration::from_millis(config.rate_limit_ms),
        })
    }

    /// Wait for rate limit if needed.
    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.rate_limit {
                let wait_time = self.rate_limit - elapsed;
                debug!("BGG rate limit: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// GET `{base_url}/{endpoint}` and return the raw XML body.
    async fn get_xml(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<String, BggError> {
        self.wait_for_rate_limit().await;

        let url = format!("{}/{}", self.base_url, endpoint);
        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/xml")
            .query(query);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let timer = BGG_REQUEST_DURATION
            .with_label_values(&[endpoint])
            .start_timer();
        let result = self.send(request).await;
        timer.observe_duration();

        let status = match &result {
            Ok(_) => "success",
            Err(BggError::RateLimitExceeded) => "rate_limited",
            Err(_) => "error",
        };
        BGG_REQUESTS.with_label_values(&[endpoint, status]).inc();

        result
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, BggError> {
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("BGG rate limit exceeded");
            return Err(BggError::RateLimitExceeded);
        }
        // BGG answers 202 when the request was queued for later processing.
        if status == StatusCode::ACCEPTED {
            return Err(BggError::ApiError {
                status: status.as_u16(),
                message: "request queued by BGG, retry later".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BggError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl BoardGameCatalog for BggClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchMatch>, BggError> {
        debug!("BGG search: query='{}', type={}", query, self.search_type);

        let body = self
            .get_xml("search", &[("query", query), ("type", self.search_type.as_str())])
            .await?;

        parse_search_response(&body)
    }

    async fn fetch_things(&self, ids: &[String]) -> Result<Vec<ThingDetails>, BggError> {
        let joined = ids.join(",");
        debug!("BGG thing fetch: {} id(s) [{}]", ids.len(), joined);

        let body = self.get_xml("thing", &[("id", joined.as_str())]).await?;

        parse_thing_response(&body)
    }
}
