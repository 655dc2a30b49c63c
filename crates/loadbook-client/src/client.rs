//! HTTP client for communicating with the load & booking API

use crate::api::LoadBookingApi;
use crate::query::{BookingFilters, LoadFilters, build_query};
use async_trait::async_trait;
use loadbook_core::config::{ApiConfig, normalize_base_url};
use loadbook_core::types::ApiErrorBody;
use loadbook_core::{Booking, BookingPayload, Error, Load, LoadPayload, Page, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info};

/// API client for making HTTP requests to the load & booking server
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client with default transport settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(&base_url.into()),
        }
    }

    /// Create a client from configuration (base URL, timeout, JSON headers)
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the TLS backend fails to initialize.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {e}")))?;

        let api = Self {
            client,
            base_url: normalize_base_url(&config.base_url),
        };
        // Surface a malformed base URL now rather than on the first request
        api.endpoint(&[], "")?;
        Ok(api)
    }

    /// Base URL every resource path is appended to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `segments` under the base URL, escaping each one
    fn endpoint(&self, segments: &[&str], query: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::configuration(format!("Invalid API base URL '{}': {e}", self.base_url))
        })?;

        url.path_segments_mut()
            .map_err(|()| {
                Error::configuration(format!("API base URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.set_query(Some(query));
        }
        Ok(url)
    }

    /// Issue one request; non-2xx statuses become [`Error::Http`]
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        info!(method = %method, url = %url, "Making {method} request");

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(method = %method, url = %url, error = %e, "API request failed");
            Error::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(method = %method, url = %url, status = status.as_u16(), "API request succeeded");
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&raw)
            .ok()
            .and_then(|body| body.message)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| status.to_string());

        error!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            message = %message,
            "API error"
        );

        Err(Error::Http {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a JSON response body
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            error!(error = %e, "Failed to parse response");
            Error::Decode(e.to_string())
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let url = self.endpoint(segments, query)?;
        let response = self.send(method, url, body).await?;
        Self::decode(response).await
    }

    async fn execute(&self, method: Method, segments: &[&str]) -> Result<()> {
        let url = self.endpoint(segments, "")?;
        self.send(method, url, None).await.map(drop)
    }
}

#[async_trait]
impl LoadBookingApi for ApiClient {
    async fn list_loads(&self, filters: &LoadFilters) -> Result<Page<Load>> {
        let query = build_query(&filters.query_pairs())?;
        self.fetch(Method::GET, &["load"], &query, None).await
    }

    async fn get_load(&self, id: &str) -> Result<Load> {
        self.fetch(Method::GET, &["load", id], "", None).await
    }

    async fn create_load(&self, payload: &LoadPayload) -> Result<Load> {
        let body = serde_json::to_value(payload)?;
        self.fetch(Method::POST, &["load"], "", Some(body)).await
    }

    async fn update_load(&self, id: &str, payload: &LoadPayload) -> Result<Load> {
        let body = serde_json::to_value(payload)?;
        self.fetch(Method::PUT, &["load", id], "", Some(body)).await
    }

    async fn delete_load(&self, id: &str) -> Result<()> {
        self.execute(Method::DELETE, &["load", id]).await
    }

    async fn list_bookings(&self, filters: &BookingFilters) -> Result<Vec<Booking>> {
        let query = build_query(&filters.query_pairs())?;
        self.fetch(Method::GET, &["booking"], &query, None).await
    }

    async fn get_booking(&self, id: &str) -> Result<Booking> {
        self.fetch(Method::GET, &["booking", id], "", None).await
    }

    async fn create_booking(&self, payload: &BookingPayload) -> Result<Booking> {
        let body = serde_json::to_value(payload)?;
        self.fetch(Method::POST, &["booking"], "", Some(body)).await
    }

    async fn update_booking(&self, id: &str, payload: &BookingPayload) -> Result<Booking> {
        let body = serde_json::to_value(payload)?;
        self.fetch(Method::PUT, &["booking", id], "", Some(body)).await
    }

    async fn accept_booking(&self, id: &str) -> Result<Booking> {
        self.fetch(Method::PUT, &["booking", id, "accept"], "", None)
            .await
    }

    async fn reject_booking(&self, id: &str) -> Result<Booking> {
        self.fetch(Method::PUT, &["booking", id, "reject"], "", None)
            .await
    }

    async fn delete_booking(&self, id: &str) -> Result<()> {
        self.execute(Method::DELETE, &["booking", id]).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_joins_segments_under_base_path() {
        let client = ApiClient::new("http://localhost:8080/api/");

        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(
            client.endpoint(&["booking", "b-1", "accept"], "").unwrap().as_str(),
            "http://localhost:8080/api/booking/b-1/accept"
        );
        assert_eq!(
            client.endpoint(&["load"], "status=POSTED").unwrap().as_str(),
            "http://localhost:8080/api/load?status=POSTED"
        );
    }

    #[test]
    fn test_endpoint_escapes_identifiers() {
        let client = ApiClient::new("http://localhost:8080/api");
        assert_eq!(
            client.endpoint(&["load", "a/b c"], "").unwrap().as_str(),
            "http://localhost:8080/api/load/a%2Fb%20c"
        );
    }

    #[test]
    fn test_from_config_rejects_unparseable_base_url() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            timeout_seconds: 5,
            page_size: 10,
        };
        assert!(matches!(
            ApiClient::from_config(&config),
            Err(Error::Configuration { .. })
        ));
    }
}
