//! Backend REST API client
//!
//! Typed wrapper over the test-execution service's HTTP API. The store and
//! poller depend on the [`SuiteApi`] trait rather than the concrete client,
//! so tests can substitute an in-memory backend.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{Job, SuiteComplete, TestSuite};

/// Transport and protocol errors surfaced by the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Backend operations the synchronization layer depends on.
#[async_trait]
pub trait SuiteApi: Send + Sync {
    /// Composite read of a suite and everything it references.
    async fn suite_complete(
        &self,
        project_id: i64,
        suite_id: i64,
    ) -> Result<SuiteComplete, ApiError>;

    /// Full-suite replacement; returns the authoritative server state.
    async fn update_suite(
        &self,
        project_key: &str,
        suite: &TestSuite,
    ) -> Result<TestSuite, ApiError>;

    /// Schedule a suite execution; yields the opaque job uuid.
    async fn schedule_execution(
        &self,
        project_id: i64,
        suite_id: i64,
        inputs: &HashMap<String, String>,
    ) -> Result<String, ApiError>;

    /// Latest status snapshot for a job.
    async fn job_status(&self, uuid: &str) -> Result<Job, ApiError>;
}

/// HTTP client for the test-execution backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    timeout_secs: u64,
}

impl ApiClient {
    /// Create a client with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, 30)
    }

    /// Create a client with a custom timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_token: None,
            timeout_secs,
        })
    }

    /// Authenticate requests with a bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v2{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else if error.is_connect() {
            ApiError::ConnectionRefused(url.to_string())
        } else {
            ApiError::RequestFailed(error.to_string())
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: String,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.classify(&url, e))?;

        let status = response.status();
        debug!("Response: {} from {}", status.as_u16(), url);

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response.json::<T>().await.map_err(|e| ApiError::Decode {
            url,
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("Sending GET request to {}", url);
        self.execute(url.clone(), self.client.get(&url)).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("Sending POST request to {}", url);
        self.execute(url.clone(), self.client.post(&url).json(body))
            .await
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("Sending PUT request to {}", url);
        self.execute(url.clone(), self.client.put(&url).json(body))
            .await
    }
}

#[async_trait]
impl SuiteApi for ApiClient {
    async fn suite_complete(
        &self,
        project_id: i64,
        suite_id: i64,
    ) -> Result<SuiteComplete, ApiError> {
        self.get_json(&format!("/project/{project_id}/suites/{suite_id}/complete"))
            .await
    }

    async fn update_suite(
        &self,
        project_key: &str,
        suite: &TestSuite,
    ) -> Result<TestSuite, ApiError> {
        self.put_json(&format!("/testing/project/{project_key}/suites"), suite)
            .await
    }

    async fn schedule_execution(
        &self,
        project_id: i64,
        suite_id: i64,
        inputs: &HashMap<String, String>,
    ) -> Result<String, ApiError> {
        self.post_json(
            &format!("/project/{project_id}/suites/{suite_id}/schedule-execution"),
            inputs,
        )
        .await
    }

    async fn job_status(&self, uuid: &str) -> Result<Job, ApiError> {
        self.get_json(&format!("/jobs/{uuid}")).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:9000/").unwrap();
        assert_eq!(
            client.url("/jobs/abc"),
            "http://localhost:9000/api/v2/jobs/abc"
        );

        let client = ApiClient::new("http://localhost:9000").unwrap();
        assert_eq!(
            client.url("/project/1/suites/2/complete"),
            "http://localhost:9000/api/v2/project/1/suites/2/complete"
        );
    }

    #[test]
    fn test_bearer_token_builder() {
        let client = ApiClient::new("http://localhost:9000")
            .unwrap()
            .bearer_token("secret");
        assert_eq!(client.api_token.as_deref(), Some("secret"));
    }
}
